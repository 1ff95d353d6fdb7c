// assetrec CLI - physical asset count reconciliation
// Every command prints exactly one JSON value on stdout; summaries and logs
// go to stderr.

mod exit_codes;
mod import;
mod lookup;
mod record;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use assetrec_config::{Settings, SettingsError};
use assetrec_io::RecordError;
use assetrec_recon::{AssetResolver, AssetStore, ReconError, StoreError};

use exit_codes::{recon_exit_code, EXIT_ERROR, EXIT_RECORD, EXIT_STORE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "assetrec")]
#[command(about = "Physical asset count reconciliation against the asset book")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Asset store: SQLite database, or a .csv register export
    #[arg(long, global = true, env = "ASSETREC_STORE", value_name = "PATH")]
    store: Option<PathBuf>,

    /// Settings file (default: <config dir>/assetrec/settings.toml)
    #[arg(long, global = true, env = "ASSETREC_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a scanned barcode or typed identifier to one asset
    #[command(after_help = "\
Matching order: custom barcode, asset identifier, item barcode.
Prints {} when nothing matches.

Examples:
  assetrec scan AST-0007 --store assets.sqlite
  assetrec scan 5901234123457 --company 'Acme Ltd' --location 'Warehouse A'
  assetrec scan AST-0007 --record count.json")]
    Scan {
        /// Barcode or asset identifier
        search_value: String,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        location: Option<String>,

        /// Count the asset on this record file (increment or insert a line)
        #[arg(long, value_name = "RECORD")]
        record: Option<PathBuf>,
    },

    /// List a company's active assets at a location
    #[command(after_help = "\
Examples:
  assetrec by-location 'Warehouse A' --company 'Acme Ltd'")]
    ByLocation {
        location: String,

        #[arg(long)]
        company: Option<String>,
    },

    /// List a company's assets by location, category and status
    #[command(after_help = "\
Without --status, disposed assets (Sold, Scrapped, Capitalized) are left out.

Examples:
  assetrec by-filters --company 'Acme Ltd'
  assetrec by-filters --company 'Acme Ltd' --category 'IT Equipment'
  assetrec by-filters --company 'Acme Ltd' --status Sold")]
    ByFilters {
        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        status: Option<String>,
    },

    /// Expected quantity and value for an item code or single asset
    #[command(after_help = "\
Prints {} when neither --item-code nor --asset is given.

Examples:
  assetrec system-data --item-code DRILL-18V --location 'Warehouse A'
  assetrec system-data --asset AST-0007")]
    SystemData {
        #[arg(long)]
        item_code: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        asset: Option<String>,
    },

    /// Validate a record and recompute its line and total values
    #[command(after_help = "\
Fails with exit code 3 when an asset appears on two lines.

Examples:
  assetrec reconcile count.json
  assetrec reconcile count.json --in-place
  assetrec reconcile count.json --output checked.json")]
    Reconcile {
        /// Reconciliation record (JSON)
        record: PathBuf,

        /// Write the recalculated record here
        #[arg(long, short = 'o', conflicts_with = "in_place")]
        output: Option<PathBuf>,

        /// Overwrite the input record
        #[arg(long)]
        in_place: bool,
    },

    /// Replace a record's lines with the company's assets
    #[command(after_help = "\
The record's company is required. The location defaults to the record's own.

Examples:
  assetrec fetch count.json
  assetrec fetch count.json --location 'Warehouse B' --output count-b.json")]
    Fetch {
        /// Reconciliation record (JSON), rewritten unless --output is given
        record: PathBuf,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Load a CSV register export into a SQLite asset store
    #[command(after_help = "\
A sibling <stem>.barcodes.csv (barcode,item_code) is imported as well.

Examples:
  assetrec import register.csv --store assets.sqlite
  assetrec import register.csv --store assets.sqlite --depreciation entries.csv")]
    Import {
        /// Register export (CSV)
        register: PathBuf,

        /// Posted depreciation entries (asset,amount)
        #[arg(long, value_name = "CSV")]
        depreciation: Option<PathBuf>,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  assetrec-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: assetrec <command> [options]");
            eprintln!("       assetrec --help for more information");
            Ok(())
        }
        Some(command) => Context::new(cli.store, cli.config).and_then(|ctx| run(ctx, command)),
    };

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

fn run(ctx: Context, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Scan {
            search_value,
            company,
            location,
            record,
        } => lookup::cmd_scan(&ctx, &search_value, company, location, record),
        Commands::ByLocation { location, company } => {
            lookup::cmd_by_location(&ctx, &location, company)
        }
        Commands::ByFilters {
            company,
            location,
            category,
            status,
        } => lookup::cmd_by_filters(&ctx, company, location, category, status),
        Commands::SystemData {
            item_code,
            location,
            company,
            asset,
        } => lookup::cmd_system_data(&ctx, item_code, location, company, asset),
        Commands::Reconcile {
            record,
            output,
            in_place,
        } => record::cmd_reconcile(&ctx, &record, output, in_place),
        Commands::Fetch {
            record,
            location,
            category,
            output,
        } => record::cmd_fetch(&ctx, &record, location, category, output),
        Commands::Import {
            register,
            depreciation,
        } => import::cmd_import(&ctx, &register, depreciation),
    }
}

/// Settings plus the store location every command works against.
pub struct Context {
    pub settings: Settings,
    store_path: Option<PathBuf>,
}

impl Context {
    fn new(store: Option<PathBuf>, config: Option<PathBuf>) -> Result<Self, CliError> {
        let settings = Settings::resolve(config.as_deref()).map_err(CliError::settings)?;
        let store_path = store.or_else(|| settings.store.path.clone());
        Ok(Self {
            settings,
            store_path,
        })
    }

    pub fn store_path(&self) -> Result<&Path, CliError> {
        self.store_path.as_deref().ok_or_else(|| {
            CliError::usage("no asset store configured")
                .with_hint("pass --store <path> or set [store] path in settings.toml")
        })
    }

    pub fn open_store(&self) -> Result<Box<dyn AssetStore>, CliError> {
        let path = self.store_path()?;
        log::debug!("opening asset store {}", path.display());
        assetrec_io::open_store(path).map_err(CliError::store)
    }

    pub fn resolver<'s>(
        &self,
        store: &'s (dyn AssetStore + 's),
    ) -> AssetResolver<'s, dyn AssetStore + 's> {
        let resolver = AssetResolver::new(store);
        match &self.settings.lookup.excluded_statuses {
            Some(statuses) => resolver.with_excluded_statuses(statuses.clone()),
            None => resolver,
        }
    }

    /// Flag value, else the settings default.
    pub fn company(&self, flag: Option<String>) -> Option<String> {
        flag.or_else(|| self.settings.defaults.company.clone())
    }

    pub fn location(&self, flag: Option<String>) -> Option<String> {
        flag.or_else(|| self.settings.defaults.location.clone())
    }
}

/// Print `value` as the command's single JSON result.
pub fn emit<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
    println!("{json}");
    Ok(())
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn store(err: StoreError) -> Self {
        Self { code: EXIT_STORE, message: err.to_string(), hint: None }
    }

    pub fn record(err: RecordError) -> Self {
        Self { code: EXIT_RECORD, message: err.to_string(), hint: None }
    }

    pub fn settings(err: SettingsError) -> Self {
        Self { code: EXIT_USAGE, message: err.to_string(), hint: None }
    }

    /// Create error from an engine error with the matching exit code.
    pub fn recon(err: ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            ReconError::DuplicateAsset { .. } => {
                Some("remove or merge the repeated line; the record was not written".to_string())
            }
            ReconError::MissingCompany => {
                Some("pass --company or set [defaults] company in settings.toml".to_string())
            }
            ReconError::Store(_) => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        Self::recon(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes::EXIT_MISSING_COMPANY;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn missing_company_carries_hint() {
        let err = CliError::recon(ReconError::MissingCompany);
        assert_eq!(err.code, EXIT_MISSING_COMPANY);
        assert!(err.hint.is_some());
    }

    #[test]
    fn reconcile_output_conflicts_with_in_place() {
        let parsed = Cli::try_parse_from([
            "assetrec", "reconcile", "r.json", "--in-place", "--output", "x.json",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn store_flag_is_global() {
        let cli = Cli::try_parse_from(["assetrec", "scan", "AST-1", "--store", "a.sqlite"]).unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("a.sqlite")));
    }
}
