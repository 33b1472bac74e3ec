mod settings;

pub use settings::{
    CheckerSettings, FixtureSettings, ReportSettings, SettingsError, SettingsStore,
    DEFAULT_EXTENSIONS, DEFAULT_SETTINGS_FILE,
};
