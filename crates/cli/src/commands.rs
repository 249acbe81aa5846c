use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a JSON load plan
    Load {
        #[arg(long, help = "Load plan file path")]
        plan: PathBuf,

        #[arg(long, help = "Overrides the plan's data directory")]
        data_dir: Option<PathBuf>,

        #[arg(long, help = "Reads variables from this file instead of ./.env")]
        env_file: Option<PathBuf>,

        #[arg(long, help = "If specified, writes the JSON report to this file")]
        report: Option<PathBuf>,
    },
    /// Load every CSV file of a directory into its own table
    Discover {
        #[arg(long, help = "Directory holding the CSV files")]
        data_dir: PathBuf,

        #[arg(long, help = "Target database, required when DB_NAME is unset")]
        database: Option<String>,

        #[arg(long, help = "Create the target database when it is missing")]
        ensure_db: bool,

        #[arg(long, help = "Retry the initial connection (5 attempts, 2s apart)")]
        retry: bool,

        #[arg(long, help = "Reads variables from this file instead of ./.env")]
        env_file: Option<PathBuf>,

        #[arg(long, help = "If specified, writes the JSON report to this file")]
        report: Option<PathBuf>,
    },
    /// Parse and validate a plan, then print it as JSON
    Validate {
        #[arg(long, help = "Load plan file path")]
        plan: PathBuf,
    },
    /// Show how a CSV file would be loaded, without a database
    Inspect {
        #[arg(long, help = "CSV file path")]
        file: PathBuf,

        #[arg(long, value_delimiter = ',', help = "Columns parsed as dates")]
        dates: Vec<String>,

        #[arg(long, value_delimiter = ',', help = "Columns coerced to integer years")]
        years: Vec<String>,
    },
    /// Connect to the configured database and ping it
    TestConn {
        #[arg(long, help = "Reads variables from this file instead of ./.env")]
        env_file: Option<PathBuf>,

        #[arg(long, help = "Database to connect to when DB_NAME is unset")]
        database: Option<String>,

        #[arg(long, default_value_t = 1)]
        attempts: usize,

        #[arg(long, default_value_t = 2000)]
        delay_ms: u64,
    },
}
