//! oxide-dialect CLI
//!
//! Command-line tool for inspecting the community SQL dialects.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use oxide_dialect_core::ast::{Size, SqlTypeCode};
use oxide_dialect_core::dialect::{LockMode, TemporalUnit};
use oxide_dialect_core::pagination::Limit;
use serde::Serialize;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_dialect_cli::commands::{self, parse_setting, DialectSelector};

/// Inspect community SQL dialects.
#[derive(Parser)]
#[command(name = "oxide-dialect")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database name (altibase, cockroach, cubrid, db2, derby, firebird,
    /// gaussdb, h2, hsql, informix, iris, oracle, singlestore, sinodb,
    /// spanner, sqlserver, sybase, teradata).
    #[arg(short, long, env = "OXIDE_DIALECT", global = true)]
    database: Option<String>,

    /// Database version, e.g. 12.10.FC8 or DSN12015.
    #[arg(long, env = "OXIDE_DIALECT_VERSION", global = true)]
    dialect_version: Option<String>,

    /// JDBC URL, used to pick the database when no name is given.
    #[arg(short, long, env = "DATABASE_URL", global = true)]
    url: Option<String>,

    /// Dialect setting as key=value, may be repeated.
    #[arg(short, long = "setting", value_parser = parse_setting_arg, global = true)]
    settings: Vec<(String, String)>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the dialect for a product name or URL.
    Resolve {
        /// Product name reported by the driver.
        #[arg(short, long, default_value = "")]
        product_name: String,

        /// Product version reported by the driver.
        #[arg(long)]
        product_version: Option<String>,
    },

    /// Print the capability snapshot.
    Capabilities,

    /// Render the column type of a type code.
    ColumnType {
        /// Type code, e.g. varchar or timestamp_with_timezone.
        code: SqlTypeCode,

        /// Length for character and binary types.
        #[arg(long)]
        length: Option<u32>,

        /// Precision for numeric and temporal types.
        #[arg(long)]
        precision: Option<u32>,

        /// Scale for exact numeric types.
        #[arg(long)]
        scale: Option<i32>,
    },

    /// Show the temporal patterns.
    Patterns {
        /// Only this unit.
        #[arg(long)]
        unit: Option<TemporalUnit>,
    },

    /// Classify a vendor error.
    Classify {
        /// Vendor error code.
        #[arg(long, allow_hyphen_values = true)]
        error_code: i32,

        /// SQL state.
        #[arg(long)]
        sql_state: Option<String>,

        /// Driver message.
        #[arg(long, default_value = "")]
        message: String,
    },

    /// Translate a JSON encoded statement.
    Translate {
        /// Statement file, or - for stdin.
        statement: PathBuf,

        /// Rows to skip.
        #[arg(long)]
        offset: Option<u64>,

        /// Rows to return.
        #[arg(long)]
        limit: Option<u64>,

        /// Lock mode, e.g. pessimistic_write.
        #[arg(long)]
        lock: Option<LockMode>,
    },

    /// Show the statements for a sequence.
    Sequence {
        /// Sequence name.
        name: String,

        /// Initial value.
        #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
        start: i64,

        /// Increment.
        #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
        increment: i64,
    },
}

fn parse_setting_arg(setting: &str) -> Result<(String, String), String> {
    parse_setting(setting).map_err(|e| e.to_string())
}

fn print_json(report: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let selector = DialectSelector {
        database: cli.database,
        version: cli.dialect_version,
        url: cli.url,
        settings: cli.settings,
    };

    if let Commands::Resolve {
        product_name,
        product_version,
    } = &cli.command
    {
        let resolution = commands::resolve(&selector, product_name, product_version.as_deref())?;
        return print_json(&resolution);
    }

    let dialect = selector.select()?;
    debug!(dialect = dialect.name(), version = %dialect.version(), "selected dialect");

    match cli.command {
        Commands::Resolve { .. } => Ok(()),
        Commands::Capabilities => print_json(&commands::capabilities(dialect.as_ref())),
        Commands::ColumnType {
            code,
            length,
            precision,
            scale,
        } => {
            let size = Size {
                length,
                precision,
                scale,
            };
            print_json(&commands::column_type(dialect.as_ref(), code, size))
        }
        Commands::Patterns { unit } => print_json(&commands::patterns(dialect.as_ref(), unit)),
        Commands::Classify {
            error_code,
            sql_state,
            message,
        } => print_json(&commands::classify(
            dialect.as_ref(),
            error_code,
            sql_state.as_deref(),
            &message,
        )),
        Commands::Translate {
            statement,
            offset,
            limit,
            lock,
        } => {
            let statement = commands::read_statement(&statement)?;
            let operation =
                commands::translate(dialect.as_ref(), &statement, Limit::new(offset, limit), lock)?;
            print_json(&operation)
        }
        Commands::Sequence {
            name,
            start,
            increment,
        } => print_json(&commands::sequence(dialect.as_ref(), &name, start, increment)),
    }
}
