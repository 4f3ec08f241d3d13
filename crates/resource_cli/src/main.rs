//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `resource_core` linkage (`ping`).
//! - Drive one create/index/update/delete cycle against a real database
//!   (`demo`), printing the status code of every step.

use clap::{Parser, Subcommand};
use log::error;
use resource_core::db::{open_db, open_db_in_memory};
use resource_core::{
    init_logging_from_config, AppConfig, Attributes, DbConnections, DispatchError,
    DispatcherBuilder, HttpResponse, IndexRequest, RepositoryHandler, ResourceObject,
    SearchParameters, ServiceContainer, SqliteHydrator, SqliteStore,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const DEMO_RESOURCE_TYPE: &str = "posts";
const DEMO_HYDRATOR_SERVICE: &str = "hydrators.posts";

#[derive(Parser)]
#[command(name = "resource_cli")]
#[command(about = "Smoke checks for the resource action dispatcher")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print ping and core version.
    Ping,
    /// Run create, index, update and delete against a demo resource type.
    Demo {
        /// TOML config file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// SQLite file; overrides `[database] path`.
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Ping => {
            println!("resource_core ping={}", resource_core::ping());
            println!("resource_core version={}", resource_core::core_version());
            Ok(())
        }
        Command::Demo { config, db } => run_demo(config, db),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_demo module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_demo(config_path: Option<PathBuf>, db_path: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let mut config = match config_path {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    if db_path.is_some() {
        config.database.path = db_path;
    }
    init_logging_from_config(&config.logging)?;

    let conn = match config.database.path.as_deref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let mut connections = DbConnections::new(conn);
    if let Some(name) = config.dispatch.connection.as_deref() {
        let extra = match config.database.path.as_deref() {
            Some(path) => open_db(path)?,
            None => open_db_in_memory()?,
        };
        connections = connections.with_connection(name, extra);
    }

    let mut container = ServiceContainer::new();
    container.register(
        DEMO_HYDRATOR_SERVICE,
        Arc::new(SqliteHydrator::new(DEMO_RESOURCE_TYPE)),
    )?;
    let dispatcher = DispatcherBuilder::new(RepositoryHandler)
        .hydrator_service(DEMO_HYDRATOR_SERVICE)
        .config(config.dispatch.clone())
        .build(&container)?;

    let mut attributes = Attributes::new();
    attributes.insert("title".to_string(), serde_json::json!("Hello"));
    let created = dispatcher.create(
        &mut connections,
        &ResourceObject::new(DEMO_RESOURCE_TYPE, attributes),
    )?;
    print_step("create", &created);
    let record = created
        .record()
        .cloned()
        .ok_or_else(|| DispatchError::runtime("create returned no record"))?;

    let listed = dispatcher.index(
        &mut connections,
        &SqliteStore,
        &IndexRequest::new(DEMO_RESOURCE_TYPE, SearchParameters::default()),
    )?;
    print_step("index", &listed);

    let mut changes = Attributes::new();
    changes.insert("title".to_string(), serde_json::json!("Hello again"));
    let updated = dispatcher.update(
        &mut connections,
        &ResourceObject::new(DEMO_RESOURCE_TYPE, changes),
        record,
    )?;
    print_step("update", &updated);
    let record = updated
        .record()
        .cloned()
        .ok_or_else(|| DispatchError::runtime("update returned no record"))?;

    let deleted = dispatcher.delete(&mut connections, record)?;
    print_step("delete", &deleted);
    Ok(())
}

fn print_step(step: &str, response: &HttpResponse) {
    let body = response
        .data
        .as_ref()
        .and_then(|data| serde_json::to_string(data).ok())
        .unwrap_or_default();
    println!("{step} status={} body={body}", response.status);
}
