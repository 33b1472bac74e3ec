use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use themecheck_report::{ReportConfig, DEFAULT_THRESHOLD};
use tracing::debug;

const SETTINGS_VERSION: u32 = 1;

/// File name looked up in the working directory when no `--config` is given.
pub const DEFAULT_SETTINGS_FILE: &str = "themecheck.json";

pub const DEFAULT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize settings {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write settings {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to prepare directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckerSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub fixtures: FixtureSettings,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

impl Default for CheckerSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            report: ReportSettings::default(),
            fixtures: FixtureSettings::default(),
        }
    }
}

impl CheckerSettings {
    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = SETTINGS_VERSION;
        }
        self.report.sanitize();
        self.fixtures.sanitize();
    }

    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            threshold: self.report.threshold,
            distinguish_styles: self.report.distinguish_styles,
            strict_annotations: self.report.strict_annotations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub distinguish_styles: bool,
    #[serde(default)]
    pub strict_annotations: bool,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            distinguish_styles: false,
            strict_annotations: false,
        }
    }
}

impl ReportSettings {
    fn sanitize(&mut self) {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            self.threshold = default_threshold();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureSettings {
    /// Catalog override file applied on top of the built-in catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
    /// Extensions picked up when a directory is checked.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

impl Default for FixtureSettings {
    fn default() -> Self {
        Self {
            catalog: None,
            extensions: default_extensions(),
        }
    }
}

impl FixtureSettings {
    fn sanitize(&mut self) {
        if self
            .catalog
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            self.catalog = None;
        }
        let mut extensions: Vec<String> = Vec::new();
        for ext in &self.extensions {
            let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
            if !ext.is_empty() && !extensions.contains(&ext) {
                extensions.push(ext);
            }
        }
        if extensions.is_empty() {
            extensions = default_extensions();
        }
        self.extensions = extensions;
    }

    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            })
    }
}

#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    data: CheckerSettings,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>, settings: CheckerSettings) -> Self {
        Self {
            path: path.into(),
            data: settings,
        }
    }

    /// Loads settings from `path`; a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            debug!(path = %path.display(), "settings file absent, using defaults");
            let mut data = CheckerSettings::default();
            data.sanitize();
            return Ok(Self { path, data });
        }

        let contents = fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;
        let mut data: CheckerSettings =
            serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
                path: path.clone(),
                source,
            })?;
        data.sanitize();
        debug!(path = %path.display(), "settings loaded");
        Ok(Self { path, data })
    }

    pub fn settings(&self) -> &CheckerSettings {
        &self.data
    }

    pub fn update<F>(&mut self, mut op: F) -> Result<(), SettingsError>
    where
        F: FnMut(&mut CheckerSettings),
    {
        op(&mut self.data);
        self.data.sanitize();
        self.save()
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SettingsError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let payload =
            serde_json::to_string_pretty(&self.data).map_err(|source| SettingsError::Serialize {
                path: self.path.clone(),
                source,
            })?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, payload.as_bytes()).map_err(|source| SettingsError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| SettingsError::Write {
            path: self.path.clone(),
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The catalog override named by the settings. A relative path is taken from the
    /// directory holding the settings file.
    pub fn catalog_path(&self) -> Option<PathBuf> {
        let catalog = self.data.fixtures.catalog.as_ref()?;
        match self.path.parent() {
            Some(dir) if catalog.is_relative() => Some(dir.join(catalog)),
            _ => Some(catalog.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_normalises_extensions() {
        let mut settings = CheckerSettings::default();
        settings.fixtures.extensions = vec![".TS".into(), " mts ".into(), "ts".into(), "".into()];
        settings.sanitize();
        assert_eq!(settings.fixtures.extensions, vec!["ts", "mts"]);

        settings.fixtures.extensions.clear();
        settings.sanitize();
        assert_eq!(settings.fixtures.extensions, default_extensions());
    }

    #[test]
    fn sanitize_rejects_unusable_thresholds() {
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let mut settings = CheckerSettings::default();
            settings.report.threshold = bad;
            settings.sanitize();
            assert_eq!(settings.report.threshold, DEFAULT_THRESHOLD);
        }
        let mut settings = CheckerSettings::default();
        settings.report.threshold = 0.0;
        settings.sanitize();
        assert_eq!(settings.report.threshold, 0.0);
    }

    #[test]
    fn extension_matching_ignores_case() {
        let fixtures = FixtureSettings::default();
        assert!(fixtures.matches(Path::new("sample.TS")));
        assert!(fixtures.matches(Path::new("dir/app.jsx")));
        assert!(!fixtures.matches(Path::new("notes.md")));
        assert!(!fixtures.matches(Path::new("Makefile")));
    }
}
