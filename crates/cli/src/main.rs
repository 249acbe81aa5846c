use crate::{
    conn::{ConnectionPinger, PostgresConnectionPinger},
    env::EnvManager,
    error::CliError,
};
use clap::Parser;
use commands::Commands;
use connectors::file::csv::discovery::list_csv_files;
use engine_core::{
    connection::{ConnectionConfig, ENV_NAME},
    retry::RetryPolicy,
};
use engine_runtime::{
    error::LoadError,
    execution::{executor, prepare::prepare_table},
};
use model::transform::{coercion::Coercions, infer::infer_schema};
use planner::plan::{DatabaseDefaults, LoadPlan, RetrySettings, TableJob};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    process::ExitCode,
    time::Duration,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod conn;
mod env;
mod error;
mod output;

const DEFAULT_DATABASE: &str = "postgres";

#[derive(Parser)]
#[command(
    name = "csvload",
    version = "0.1.0",
    about = "Loads CSV files into PostgreSQL tables"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Load {
            plan,
            data_dir,
            env_file,
            report,
        } => {
            let mut plan = load_plan(&plan).await?;
            if let Some(dir) = data_dir {
                plan.data_dir = dir;
            }

            let env = EnvManager::load(env_file.as_deref())?;
            let config = ConnectionConfig::resolve(env.all(), &plan.database, &plan.name)?;

            let result = executor::run(&plan, &config).await?;
            output::emit_report(&result, report.as_deref()).await?;
        }
        Commands::Discover {
            data_dir,
            database,
            ensure_db,
            retry,
            env_file,
            report,
        } => {
            let env = EnvManager::load(env_file.as_deref())?;
            let database = discover_database(env.all(), database)?;

            let files = list_csv_files(&data_dir).map_err(|source| LoadError::File {
                path: data_dir.display().to_string(),
                source,
            })?;
            if files.is_empty() {
                println!("No CSV files found in {}", data_dir.display());
                return Ok(());
            }
            info!("Found {} CSV files in {}", files.len(), data_dir.display());

            let defaults = DatabaseDefaults {
                name: Some(database),
                ensure_exists: ensure_db,
                ..DatabaseDefaults::default()
            };
            let retry = retry.then(RetrySettings::default);
            let plan = LoadPlan::discover("discover", &data_dir, &files, defaults, retry)?;
            let config = ConnectionConfig::resolve(env.all(), &plan.database, &plan.name)?;

            let result = executor::run(&plan, &config).await?;
            output::emit_report(&result, report.as_deref()).await?;
        }
        Commands::Validate { plan } => {
            info!("Validating load plan: {}", plan.display());
            let plan = load_plan(&plan).await?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Commands::Inspect { file, dates, years } => inspect(&file, dates, years)?,
        Commands::TestConn {
            env_file,
            database,
            attempts,
            delay_ms,
        } => {
            let env = EnvManager::load(env_file.as_deref())?;
            let defaults = DatabaseDefaults {
                name: database,
                ..DatabaseDefaults::default()
            };
            let config = ConnectionConfig::resolve(env.all(), &defaults, DEFAULT_DATABASE)?;
            let policy = RetryPolicy::new(attempts, Duration::from_millis(delay_ms));

            PostgresConnectionPinger { config, policy }.ping().await?;
            println!("Connection OK");
        }
    }

    Ok(())
}

async fn load_plan(path: &Path) -> Result<LoadPlan, CliError> {
    let source = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::FileRead {
            path: path.display().to_string(),
            source,
        })?;
    Ok(planner::plan::parse(&source)?)
}

/// Reads and coerces one CSV the way `load` would, then prints the inferred
/// bulk column types.
fn inspect(file: &Path, dates: Vec<String>, years: Vec<String>) -> Result<(), CliError> {
    let data_dir = file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = file.file_name().map(PathBuf::from).unwrap_or_default();

    let job = TableJob {
        coerce: Coercions {
            dates,
            years,
            year_suffixes: Vec::new(),
        },
        ..TableJob::bulk(file_name)
    };
    let plan = LoadPlan {
        name: "inspect".to_string(),
        data_dir,
        database: DatabaseDefaults::default(),
        retry: None,
        tables: vec![job.clone()],
    };

    let prepared = prepare_table(&plan, &job)?;
    let columns = infer_schema(&prepared.dataset, &prepared.coercions);
    output::print_inspection(
        &plan.csv_path(&job),
        &prepared.table,
        prepared.dataset.row_count(),
        &columns,
    );
    Ok(())
}

/// `discover` has no plan to name the database, so it must come from
/// `--database` or `DB_NAME`.
fn discover_database(
    env: &HashMap<String, String>,
    database: Option<String>,
) -> Result<String, CliError> {
    env.get(ENV_NAME)
        .filter(|name| !name.is_empty())
        .cloned()
        .or(database.filter(|name| !name.is_empty()))
        .ok_or_else(|| {
            CliError::Config(format!("discover needs --database or {ENV_NAME} to be set"))
        })
}
