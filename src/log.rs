use std::fs::{File, OpenOptions};
use std::path::Path;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::JsonFields;
use tracing_subscriber::prelude::*;

use crate::config;

/// Filter applied when RUST_LOG is not set
const DEFAULT_FILTER: &str = "info";

pub fn init() -> anyhow::Result<()> {
    let log_file = open_log_file(&config::data_dir(), &config::log_path())?;

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(log_file)
        .fmt_fields(JsonFields::default());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .init();

    Ok(())
}

/// Create the data directory if needed and open the log file for appending.
/// Stdout belongs to the LSP transport, so failures go to stderr before
/// propagating.
fn open_log_file(data_dir: &Path, log_path: &Path) -> anyhow::Result<File> {
    std::fs::create_dir_all(data_dir).inspect_err(|e| {
        eprintln!("Failed to create data directory: {}", e);
    })?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .inspect_err(|e| {
            eprintln!("Failed to open log file {:?}: {}", log_path, e);
        })?;

    Ok(file)
}
