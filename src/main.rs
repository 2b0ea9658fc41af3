//! # QsoLog CLI (`qso`)
//!
//! The `qso` binary is the primary interface for QsoLog. It provides
//! commands for database initialization, ADIF and LoTW import, duplicate
//! merging, and ADIF export.
//!
//! ## Usage
//!
//! ```bash
//! qso --config ./config/qso.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `qso init` | Create the SQLite database and run schema migrations |
//! | `qso import file <PATH>` | Import contacts from an ADIF file |
//! | `qso import lotw` | Import confirmed contacts from LoTW |
//! | `qso export` | Write contacts to an ADIF file |
//! | `qso dedup` | Merge stored contacts with the same callsign, date, and time |

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use qsolog::config;
use qsolog::dedup;
use qsolog::export::{self, ExportArgs};
use qsolog::import::{self, ImportOutput, LotwImportArgs};
use qsolog::logging;
use qsolog::migrate;
use qsolog::progress::ProgressMode;
use qsolog_core::models::ImportPolicy;

/// QsoLog CLI: an ADIF contact logbook with LoTW import.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file.
#[derive(Parser)]
#[command(
    name = "qso",
    about = "QsoLog: an ADIF contact logbook with LoTW import",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/qso.toml`.
    #[arg(long, global = true, default_value = "./config/qso.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the contacts table. Running it
    /// more than once is safe.
    Init,

    /// Import contacts.
    Import {
        #[command(subcommand)]
        source: ImportSource,
    },

    /// Export contacts as ADIF.
    Export {
        /// Output file. `-` writes to stdout. Defaults to a name derived
        /// from the date range.
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Only contacts on or after this date (YYYY-MM-DD).
        #[arg(long)]
        start_date: Option<String>,

        /// Only contacts on or before this date (YYYY-MM-DD).
        #[arg(long)]
        end_date: Option<String>,
    },

    /// Merge stored contacts that share callsign, date, and start time.
    ///
    /// Keeps the earliest stored contact of each group and fills its empty
    /// fields from the others.
    Dedup,
}

#[derive(Subcommand)]
enum ImportSource {
    /// Import an ADIF file.
    File {
        /// Path to the .adi file.
        path: PathBuf,

        #[command(flatten)]
        opts: ImportOpts,
    },

    /// Import confirmed contacts from ARRL Logbook of the World.
    Lotw {
        /// LoTW account name. Falls back to LOTW_USERNAME, then lotw.username.
        #[arg(long)]
        username: Option<String>,

        /// LoTW password. Falls back to LOTW_PASSWORD.
        #[arg(long)]
        password: Option<String>,

        /// Only QSLs since this date (YYYY-MM-DD). Defaults to lotw.default_start_date.
        #[arg(long)]
        start_date: Option<String>,

        /// Only QSLs up to this date (YYYY-MM-DD).
        #[arg(long)]
        end_date: Option<String>,

        #[command(flatten)]
        opts: ImportOpts,
    },
}

/// Options shared by every import source.
#[derive(Args)]
struct ImportOpts {
    /// Skip records that match an existing contact.
    #[arg(long, overrides_with = "no_merge_duplicates")]
    merge_duplicates: bool,

    /// Insert every record, even when import.merge_duplicates is set.
    #[arg(long, overrides_with = "merge_duplicates")]
    no_merge_duplicates: bool,

    /// Overwrite existing contacts with matching records.
    #[arg(long, overrides_with = "no_update_existing")]
    update_existing: bool,

    /// Leave existing contacts untouched, even when import.update_existing is set.
    #[arg(long, overrides_with = "update_existing")]
    no_update_existing: bool,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,

    /// Progress on stderr: off, human, or json. Default: human when stderr is a TTY.
    #[arg(long, value_parser = parse_progress)]
    progress: Option<ProgressMode>,
}

impl ImportOpts {
    /// The configured policy with any explicit flag taking precedence.
    fn policy(&self, configured: ImportPolicy) -> ImportPolicy {
        ImportPolicy {
            merge_duplicates: flag(
                self.merge_duplicates,
                self.no_merge_duplicates,
                configured.merge_duplicates,
            ),
            update_existing: flag(
                self.update_existing,
                self.no_update_existing,
                configured.update_existing,
            ),
        }
    }

    fn output(&self) -> ImportOutput {
        ImportOutput {
            json: self.json,
            progress: self.progress.unwrap_or_else(ProgressMode::default_for_tty),
        }
    }
}

fn flag(on: bool, off: bool, configured: bool) -> bool {
    match (on, off) {
        (true, _) => true,
        (_, true) => false,
        _ => configured,
    }
}

fn parse_progress(value: &str) -> Result<ProgressMode, String> {
    ProgressMode::parse(value).ok_or_else(|| {
        format!(
            "invalid progress mode '{}': expected off, human, or json",
            value
        )
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Import { source } => match source {
            ImportSource::File { path, opts } => {
                import::run_import_file(&cfg, &path, opts.policy(cfg.import), opts.output())
                    .await?;
            }
            ImportSource::Lotw {
                username,
                password,
                start_date,
                end_date,
                opts,
            } => {
                let args = LotwImportArgs {
                    username,
                    password,
                    start_date,
                    end_date,
                };
                import::run_import_lotw(&cfg, args, opts.policy(cfg.import), opts.output())
                    .await?;
            }
        },
        Commands::Export {
            output,
            start_date,
            end_date,
        } => {
            export::run_export(
                &cfg,
                ExportArgs {
                    output,
                    start_date,
                    end_date,
                },
            )
            .await?;
        }
        Commands::Dedup => {
            dedup::run_dedup(&cfg).await?;
        }
    }

    Ok(())
}
