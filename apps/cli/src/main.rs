use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use themecheck_catalog::{Catalog, CatalogOverride};
use themecheck_report::{render_text, report_with_annotations, ReportConfig, ReportSummary};
use themecheck_scanner::{annotations, Scanner, Span};
use themecheck_settings::{
    CheckerSettings, FixtureSettings, SettingsStore, DEFAULT_SETTINGS_FILE,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

const LOG_ENV: &str = "THEMECHECK_LOG";

#[derive(Parser)]
#[command(
    name = "themecheck",
    about = "Checks that theme fixtures exercise every highlight category",
    author,
    version
)]
struct Cli {
    /// 設定檔路徑；預設為目前目錄下的 themecheck.json。 / Settings file (defaults to themecheck.json in the current directory).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// 輸出更詳細的記錄，可重複使用。 / Log more detail; repeat for more.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 檢查範例檔案是否涵蓋所有分類。 / Check fixtures for category coverage and color collisions.
    Check(CheckArgs),
    /// 列出單一檔案的分類區段。 / Print the classified spans of a single file.
    Scan(ScanArgs),
    /// 檢視或匯出分類目錄。 / Inspect or export the category catalog.
    #[command(subcommand)]
    Catalog(CatalogCommand),
    /// 管理設定檔。 / Manage the settings file.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args)]
struct CheckArgs {
    /// 範例檔案或資料夾。 / Fixture files or directories to walk.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// 套用於內建目錄之上的覆寫檔。 / Catalog override file applied on top of the built-in catalog.
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// 視為顏色衝突的最大色差。 / Largest color difference still reported as a collision.
    #[arg(long, value_name = "DELTA_E")]
    threshold: Option<f64>,

    /// 樣式修飾不同的分類不視為衝突。 / Do not report colliding categories whose style modifiers differ.
    #[arg(long)]
    distinguish_styles: bool,

    /// 註解中的顏色與目錄不符時判定失敗。 / Fail when an in-fixture color annotation disagrees with the catalog.
    #[arg(long)]
    strict_annotations: bool,

    /// 輸出格式。 / Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// 將報告寫入檔案而非標準輸出。 / Write the report to a file instead of stdout.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ScanArgs {
    /// 要分析的檔案。 / File to classify.
    file: PathBuf,

    /// 套用於內建目錄之上的覆寫檔。 / Catalog override file applied on top of the built-in catalog.
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// 輸出格式。 / Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum CatalogCommand {
    /// 列出分類與其顏色。 / List categories with their resolved colors.
    List(CatalogListArgs),
    /// 匯出目錄為覆寫檔。 / Export the catalog as an override file.
    Export(CatalogExportArgs),
}

#[derive(Args)]
struct CatalogListArgs {
    /// 套用於內建目錄之上的覆寫檔。 / Catalog override file applied on top of the built-in catalog.
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,
}

#[derive(Args)]
struct CatalogExportArgs {
    /// 匯出的目標檔案。 / Destination file.
    #[arg(long, value_name = "FILE")]
    output: PathBuf,

    /// 套用於內建目錄之上的覆寫檔。 / Catalog override file applied on top of the built-in catalog.
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// 建立預設設定檔。 / Write a settings file with the default values.
    Init(ConfigInitArgs),
    /// 顯示生效中的設定。 / Print the effective settings.
    Show,
}

#[derive(Args)]
struct ConfigInitArgs {
    /// 覆寫既有的設定檔。 / Overwrite an existing settings file.
    #[arg(long)]
    force: bool,
}

enum Outcome {
    Passed,
    Failed,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli) {
        Ok(Outcome::Passed) => ExitCode::SUCCESS,
        Ok(Outcome::Failed) => ExitCode::from(1),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<Outcome> {
    let Cli {
        config, command, ..
    } = cli;
    let config_path = config.unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    match command {
        Commands::Check(args) => {
            let store = load_settings(&config_path)?;
            execute_check(args, &store)
        }
        Commands::Scan(args) => {
            let store = load_settings(&config_path)?;
            execute_scan(args, &store).map(|()| Outcome::Passed)
        }
        Commands::Catalog(subcommand) => {
            let store = load_settings(&config_path)?;
            execute_catalog_command(subcommand, &store).map(|()| Outcome::Passed)
        }
        Commands::Config(subcommand) => {
            execute_config_command(subcommand, &config_path).map(|()| Outcome::Passed)
        }
    }
}

fn load_settings(path: &Path) -> Result<SettingsStore> {
    SettingsStore::load(path).with_context(|| format!("failed to load settings {}", path.display()))
}

fn load_catalog(explicit: Option<&Path>, store: &SettingsStore) -> Result<Catalog> {
    let catalog = Catalog::builtin();
    let Some(path) = explicit
        .map(Path::to_path_buf)
        .or_else(|| store.catalog_path())
    else {
        return Ok(catalog);
    };
    let overrides = CatalogOverride::from_path(&path)
        .with_context(|| format!("failed to load catalog {}", path.display()))?;
    let catalog = catalog
        .with_overrides(&overrides)
        .with_context(|| format!("failed to apply catalog {}", path.display()))?;
    debug!(path = %path.display(), categories = catalog.len(), "catalog overrides applied");
    Ok(catalog)
}

fn report_config(args: &CheckArgs, settings: &CheckerSettings) -> Result<ReportConfig> {
    let mut config = settings.report_config();
    if let Some(threshold) = args.threshold {
        if !threshold.is_finite() || threshold < 0.0 {
            bail!("threshold must be a non-negative number, got {threshold}");
        }
        config.threshold = threshold;
    }
    config.distinguish_styles |= args.distinguish_styles;
    config.strict_annotations |= args.strict_annotations;
    Ok(config)
}

fn execute_check(args: CheckArgs, store: &SettingsStore) -> Result<Outcome> {
    let catalog = load_catalog(args.catalog.as_deref(), store)?;
    let config = report_config(&args, store.settings())?;
    let fixtures = collect_fixtures(&args.paths, &store.settings().fixtures)?;
    if fixtures.is_empty() {
        bail!("no fixtures found");
    }

    let scanner = Scanner::new(&catalog);
    let mut passed = true;
    let mut text = String::new();
    let mut summaries = Vec::new();
    for fixture in &fixtures {
        let source = fs::read_to_string(fixture)
            .with_context(|| format!("failed to read {}", fixture.display()))?;
        let spans = scanner
            .scan(&source)
            .with_context(|| format!("failed to scan {}", fixture.display()))?;
        let notes = annotations(&source)
            .with_context(|| format!("failed to read annotations in {}", fixture.display()))?;
        let report = report_with_annotations(&catalog, &spans, &notes, &config)
            .with_context(|| format!("failed to report on {}", fixture.display()))?;
        info!(
            fixture = %fixture.display(),
            seen = report.seen_count(),
            missing = report.missing_categories().len(),
            collisions = report.color_collisions().len(),
            passed = report.passed(),
            "fixture checked"
        );
        passed &= report.passed();

        let label = fixture.display().to_string();
        match args.format {
            OutputFormat::Text => {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&render_text(&report, Some(&label)));
            }
            OutputFormat::Json => summaries.push(ReportSummary::new(&report).with_fixture(label)),
        }
    }

    let rendered = match args.format {
        OutputFormat::Text => text,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&summaries)
                .context("failed to serialize reports")?;
            json.push('\n');
            json
        }
    };
    emit(&rendered, args.output.as_deref())?;

    Ok(if passed {
        Outcome::Passed
    } else {
        Outcome::Failed
    })
}

fn execute_scan(args: ScanArgs, store: &SettingsStore) -> Result<()> {
    let catalog = load_catalog(args.catalog.as_deref(), store)?;
    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let spans = Scanner::new(&catalog)
        .scan(&source)
        .with_context(|| format!("failed to scan {}", args.file.display()))?;
    match args.format {
        OutputFormat::Text => {
            for span in &spans {
                println!("{}", format_span(span));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&spans).context("failed to serialize spans")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn format_span(span: &Span) -> String {
    format!(
        "{}:{}-{} {} {:?}",
        span.line, span.columns.start, span.columns.end, span.category, span.text
    )
}

fn execute_catalog_command(command: CatalogCommand, store: &SettingsStore) -> Result<()> {
    match command {
        CatalogCommand::List(args) => list_catalog(args, store),
        CatalogCommand::Export(args) => export_catalog(args, store),
    }
}

fn list_catalog(args: CatalogListArgs, store: &SettingsStore) -> Result<()> {
    let catalog = load_catalog(args.catalog.as_deref(), store)?;
    for (category, color) in catalog.entries() {
        let modifiers = category
            .modifiers()
            .iter()
            .map(|modifier| modifier.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let line = format!("{:<24} {} {}", category.name(), color, modifiers);
        println!("{}", line.trim_end());
    }
    Ok(())
}

fn export_catalog(args: CatalogExportArgs, store: &SettingsStore) -> Result<()> {
    let catalog = load_catalog(args.catalog.as_deref(), store)?;
    if let Some(parent) = args.output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    catalog
        .to_override()
        .save(&args.output)
        .with_context(|| format!("failed to export catalog to {}", args.output.display()))?;
    println!(
        "Exported {} categories to {}",
        catalog.len(),
        args.output.display()
    );
    Ok(())
}

fn execute_config_command(command: ConfigCommand, path: &Path) -> Result<()> {
    match command {
        ConfigCommand::Init(args) => {
            if path.exists() && !args.force {
                bail!(
                    "settings file {} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            let store = SettingsStore::new(path, CheckerSettings::default());
            store
                .save()
                .with_context(|| format!("failed to write settings {}", path.display()))?;
            println!("Wrote default settings to {}", store.path().display());
            Ok(())
        }
        ConfigCommand::Show => {
            let store = load_settings(path)?;
            let json = serde_json::to_string_pretty(store.settings())
                .context("failed to serialize settings")?;
            println!("{json}");
            Ok(())
        }
    }
}

fn emit(rendered: &str, output: Option<&Path>) -> Result<()> {
    let Some(path) = output else {
        print!("{rendered}");
        return Ok(());
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote report to {}", path.display());
    Ok(())
}

/// Explicit files are always checked; directories contribute files whose extension the
/// settings accept.
fn collect_fixtures(paths: &[PathBuf], fixtures: &FixtureSettings) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry =
                    entry.with_context(|| format!("failed to walk {}", path.display()))?;
                if entry.file_type().is_file() && fixtures.matches(entry.path()) {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else {
            bail!("fixture {} does not exist", path.display());
        }
    }
    Ok(files)
}
