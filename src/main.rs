use mdblink::catalog::{filter_for_legacy_format, installed_drivers, OdbcInstIni};
use mdblink::config::{default_config_path, Settings};
use mdblink::core::db::SqliteExecutor;
use mdblink::template::create_database;
use mdblink::{AccessDatabase, MdbError, Result};
use std::path::Path;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage:
  mdblink drivers
  mdblink candidates <path> [--json]
  mdblink create <target> [--overwrite]";

fn main() -> ExitCode {
    // Initialize the logging system using tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    info!("Starting mdblink...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("drivers") => {
            let catalog = OdbcInstIni::from_env();
            for driver in filter_for_legacy_format(&installed_drivers(&catalog)) {
                println!("{}", driver);
            }
            Ok(())
        }
        Some("candidates") => {
            let path = args.get(1).ok_or_else(usage)?;
            let json = args.iter().skip(2).any(|a| a == "--json");

            // The executor is never used: resolving candidates needs no connection.
            let db = AccessDatabase::from_settings(SqliteExecutor::new(), load_settings()?);
            let spec = db.connection_spec(path);
            if json {
                println!("{}", serde_json::to_string_pretty(&spec)?);
            } else {
                for connection_string in &spec.connection_strings {
                    println!("{}", connection_string);
                }
            }
            Ok(())
        }
        Some("create") => {
            let target = args.get(1).ok_or_else(usage)?;
            let overwrite = args.iter().skip(2).any(|a| a == "--overwrite");
            let template = load_settings()?.database.template.ok_or_else(|| {
                MdbError::Config("no [database] template configured".to_string())
            })?;

            if create_database(&template, Path::new(target), overwrite)? {
                println!("Created {}", target);
            } else {
                println!("{} already exists (use --overwrite)", target);
            }
            Ok(())
        }
        _ => Err(usage()),
    }
}

fn load_settings() -> Result<Settings> {
    Settings::load(default_config_path()?)
}

fn usage() -> MdbError {
    MdbError::Config(USAGE.to_string())
}
