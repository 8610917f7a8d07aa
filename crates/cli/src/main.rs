// covmap CLI - control coverage mapping for compliance spreadsheets

mod annotate;
mod catalogue;
mod effects;
mod exit_codes;
mod lookup;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use covmap_config::{ConfigError, Settings};
use covmap_io::IoError;
use covmap_recon::report::CoverageReport;
use covmap_recon::{assemble, Catalogue, CoverageError, LineKind};

use exit_codes::{
    config_exit_code, coverage_exit_code, io_exit_code, EXIT_ERROR, EXIT_IO, EXIT_SUCCESS,
    EXIT_USAGE,
};

/// Environment variable holding the log filter (`warn`, `covmap_io=debug`, ...).
const LOG_ENV: &str = "COVMAP_LOG";

#[derive(Parser)]
#[command(name = "covmap")]
#[command(about = "Annotate compliance control lists with policy coverage")]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/covmap/config.toml)
    #[arg(long, global = true, env = "COVMAP_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Catalogue TOML to use instead of the embedded one
    #[arg(long, global = true, value_name = "PATH")]
    catalogue: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append coverage columns to a control list
    #[command(after_help = "\
Examples:
  covmap annotate controls.xlsx
  covmap annotate controls.xlsx --sheet 'NIST 800-53' -o mapped.xlsx
  covmap annotate controls.csv --in-place
  covmap annotate controls.xlsx --no-spacers --json")]
    Annotate(annotate::AnnotateArgs),

    /// Print coverage statistics and priority actions for the catalogue
    #[command(after_help = "\
Examples:
  covmap summary
  covmap summary --json
  covmap --catalogue custom.toml summary")]
    Summary {
        /// Output JSON to stdout instead of the human summary
        #[arg(long)]
        json: bool,
    },

    /// Look up free-text control identifiers in the catalogue
    #[command(after_help = "\
Examples:
  covmap lookup AC-6
  covmap lookup 'AC-6(10) Privileged Functions' CP-9
  covmap lookup SI-10 --json")]
    Lookup {
        /// Cell texts containing a control identifier
        #[arg(required = true)]
        text: Vec<String>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Inspect or validate a catalogue
    #[command(subcommand)]
    Catalogue(catalogue::CatalogueCommands),

    /// Fill empty prod/nonprod policy effects in a parameter CSV
    #[command(after_help = "\
Examples:
  covmap effects params.csv
  covmap effects params.csv --prod Deny --nonprod Audit
  covmap effects params.csv -o params.csv --backup")]
    Effects(effects::EffectsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = Context::load(cli.config.as_deref(), cli.catalogue).and_then(|ctx| {
        match cli.command {
            Commands::Annotate(args) => annotate::cmd_annotate(&ctx, args),
            Commands::Summary { json } => cmd_summary(&ctx, json),
            Commands::Lookup { text, json } => lookup::cmd_lookup(&ctx, &text, json),
            Commands::Catalogue(cmd) => catalogue::cmd_catalogue(&ctx, cmd),
            Commands::Effects(args) => effects::cmd_effects(args),
        }
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Install the stderr subscriber. Library crates log through `log`; the
/// subscriber's log bridge picks those records up.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Keep an already-installed global subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Catalogue or effects-engine failure.
    pub fn coverage(err: CoverageError) -> Self {
        let code = coverage_exit_code(&err);
        let hint = match &err {
            CoverageError::CatalogueParse(_)
            | CoverageError::InvalidControlId(_)
            | CoverageError::InvalidRecord { .. } => {
                Some("check the file with: covmap catalogue validate <FILE>".to_string())
            }
            CoverageError::MissingColumn { .. } => {
                Some("the CSV needs prodEffect and nonprodEffect columns".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Document read/write failure.
    pub fn document(err: IoError) -> Self {
        let code = io_exit_code(&err);
        let hint = match &err {
            IoError::SheetNotFound { available, .. } => {
                Some(format!("available sheets: {}", available.join(", ")))
            }
            IoError::UnsupportedFormat(_) => {
                Some("supported: .csv .txt .tsv .tab .xlsx .xlsm .xls .xlsb .ods".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    pub fn config(err: ConfigError) -> Self {
        let code = config_exit_code(&err);
        let hint = match &err {
            ConfigError::Parse { .. } | ConfigError::Invalid(_) => Some(format!(
                "sections are [columns], [output], [report]; default location {}",
                Settings::config_path_display()
            )),
            ConfigError::Read { .. } => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// Shared context
// ============================================================================

/// Settings plus the catalogue source every command resolves against.
pub struct Context {
    pub settings: Settings,
    catalogue_path: Option<PathBuf>,
}

impl Context {
    /// `--config` wins over the platform settings file; `--catalogue` wins over
    /// the settings' `catalogue` key, which wins over the embedded catalogue.
    fn load(config: Option<&Path>, catalogue: Option<PathBuf>) -> Result<Self, CliError> {
        let settings = match config {
            Some(path) => Settings::load_from(path),
            None => Settings::load(),
        }
        .map_err(CliError::config)?;

        let catalogue_path = catalogue.or_else(|| settings.catalogue.clone());
        Ok(Self { settings, catalogue_path })
    }

    pub fn catalogue_path(&self) -> Option<&Path> {
        self.catalogue_path.as_deref()
    }

    pub fn catalogue(&self) -> Result<Catalogue, CliError> {
        let catalogue = match &self.catalogue_path {
            Some(path) => {
                log::debug!("loading catalogue {}", path.display());
                Catalogue::load(path)
            }
            None => Catalogue::builtin(),
        };
        catalogue.map_err(CliError::coverage)
    }

    pub fn report(&self, catalogue: &Catalogue) -> CoverageReport {
        assemble(
            catalogue,
            chrono::Local::now().naive_local(),
            self.settings.report.max_actions,
        )
    }
}

pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::internal(format!("JSON serialization error: {e}")))
}

// ============================================================================
// summary
// ============================================================================

fn cmd_summary(ctx: &Context, json: bool) -> Result<(), CliError> {
    let catalogue = ctx.catalogue()?;
    let report = ctx.report(&catalogue);

    if json {
        println!("{}", to_json(&report)?);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

/// Human rendering of the summary lines on stderr.
pub fn print_report(report: &CoverageReport) {
    for line in report.lines() {
        match line.kind {
            LineKind::Title => {
                eprintln!("{}", line.label);
                eprintln!("{}", "=".repeat(line.label.chars().count()));
            }
            LineKind::Section => eprintln!("{}", line.label),
            LineKind::Blank => eprintln!(),
            LineKind::Item if line.value.is_empty() => eprintln!("  {}", line.label),
            LineKind::Item => eprintln!("  {:<44} {}", line.label, line.value),
            LineKind::Critical | LineKind::High => {
                eprintln!("  {}", line.label);
                eprintln!("     {}", line.value);
            }
        }
    }
}
