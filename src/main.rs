//! Command-line front end for `.ts` catalogs.

use std::io::{
    self,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};
use std::process::ExitCode;

use clap::{
    Parser,
    Subcommand,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use ts_catalog::check::{
    Severity,
    check_document,
    stats,
};
use ts_catalog::config::{
    CatalogSettings,
    ConfigError,
    ConfigManager,
};
use ts_catalog::indexer::{
    CatalogDirectory,
    IndexerError,
};
use ts_catalog::input::load_document;
use ts_catalog::output::save_document;
use ts_catalog::{
    CatalogParseError,
    CatalogStore,
    LocaleId,
    Translator,
};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "TS_CATALOG_LOG";

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "ts-catalog")]
#[command(about = "Inspect and resolve Qt Linguist .ts translation catalogs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Settings file (default: `.ts-catalog.json` in the working directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve one message the way the application would
    Lookup {
        /// A catalog file, or a directory to pick one from
        catalog: PathBuf,
        /// Context (class or dialog name)
        #[arg(short = 'x', long)]
        context: String,
        /// Source text
        source: String,
        /// Disambiguation comment
        #[arg(short = 'm', long)]
        comment: Option<String>,
        /// Count for plural messages
        #[arg(short, long)]
        n: Option<i64>,
        /// Locale to pick when `catalog` is a directory (default: system locale)
        #[arg(short, long)]
        locale: Option<LocaleId>,
    },

    /// Show message counts per catalog
    Stats {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Report placeholder, line break and review problems
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Load and save a catalog again in canonical layout
    Normalize {
        input: PathBuf,
        /// Output file (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the catalogs of a directory and their locales
    Locales {
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

/// Errors that end a command.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parse(#[from] CatalogParseError),

    #[error(transparent)]
    Indexer(#[from] IndexerError),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("No catalog in '{}' for locale {requested}", dir.display())]
    NoCatalog { dir: PathBuf, requested: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_logging(cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(error) => {
            let _ = writeln!(io::stderr(), "Cannot open log file: {error}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(error) => {
            tracing::error!(%error, "Failed to start runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(code) => code,
        Err(error) => {
            tracing::error!(%error, "Command failed");
            let _ = writeln!(io::stderr(), "error: {error}");
            ExitCode::FAILURE
        }
    }
}

/// tracing を初期化する
///
/// `TS_CATALOG_LOG` でフィルタを指定（デフォルト: `warn`）。
/// ファイル出力時はガードを返すので、終了まで保持すること。
fn init_logging(log_file: Option<&Path>) -> io::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let Some(path) = log_file else {
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
        return Ok(None);
    };

    let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).init();
    Ok(Some(guard))
}

/// Settings from `--config`, or from the working directory.
fn load_settings(config: Option<&Path>) -> Result<CatalogSettings, ConfigError> {
    let mut manager = ConfigManager::new();
    match config {
        Some(path) => manager.load_file(path)?,
        None => manager.load_settings(&std::env::current_dir()?)?,
    }
    Ok(manager.get_settings().clone())
}

/// Runs one subcommand, writing results to stdout.
async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let settings = load_settings(cli.config.as_deref())?;
    let mut out = io::stdout().lock();

    match cli.command {
        Command::Lookup { catalog, context, source, comment, n, locale } => {
            let path = if catalog.is_dir() {
                pick_catalog(&catalog, locale, &settings)?
            } else {
                catalog
            };

            let translator = Translator::new(settings.resolve_options());
            translator.switch_locale(&path)?;
            let resolver = translator.resolver();
            let text = match n {
                Some(n) => resolver.translate_n(&context, &source, comment.as_deref(), n),
                None => resolver.translate(&context, &source, comment.as_deref()),
            };
            writeln!(out, "{text}")?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Stats { files } => {
            for path in files {
                let document = load_document(&path)?;
                writeln!(out, "{}: {}", path.display(), stats(&document))?;
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Check { files } => {
            let mut warnings = 0;
            for path in files {
                let document = load_document(&path)?;
                for diagnostic in check_document(&document) {
                    if diagnostic.severity == Severity::Warning {
                        warnings += 1;
                    }
                    writeln!(out, "{}: {diagnostic}", path.display())?;
                }
            }
            Ok(if warnings == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }

        Command::Normalize { input, output } => {
            // Validates keys before rewriting.
            let store = CatalogStore::load(&input)?;
            let output = output.unwrap_or(input);
            save_document(&output, store.document())?;
            tracing::info!(path = %output.display(), "Wrote catalog");
            Ok(ExitCode::SUCCESS)
        }

        Command::Locales { dir } => {
            let directory = CatalogDirectory::scan(&dir, &settings)?;
            let loaded = directory.load_all().await;
            for catalog in &loaded.catalogs {
                let locale = catalog.locale().map_or_else(|| "?".to_string(), ToString::to_string);
                writeln!(out, "{locale}\t{}\t{}", catalog.file.path.display(), catalog.store.len())?;
            }
            for failure in &loaded.failures {
                writeln!(out, "!\t{failure}")?;
            }
            Ok(if loaded.failures.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
    }
}

/// Picks the catalog for `requested`, the system locale or a configured fallback.
fn pick_catalog(
    dir: &Path,
    requested: Option<LocaleId>,
    settings: &CatalogSettings,
) -> Result<PathBuf, CliError> {
    let requested = requested.or_else(LocaleId::system);
    let directory = CatalogDirectory::scan(dir, settings)?;
    let fallbacks = settings.fallback_locale_ids();

    directory
        .find_with_fallbacks(requested.as_ref(), &fallbacks)
        .map(|file| file.path.clone())
        .ok_or_else(|| CliError::NoCatalog {
            dir: dir.to_path_buf(),
            requested: requested.map_or_else(|| "(none)".to_string(), |l| l.to_string()),
        })
}
