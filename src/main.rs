//! Session store admin tool
//!
//! Inspects and cleans up the session documents kept by the Zentinel
//! session store.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};

use zentinel_session_store::{
    extract_booking_ids, RedbDocumentStore, RequestContext, SessionBackend, SessionCache,
    SessionStore, StoreConfig, StoreConfigJson,
};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "session-admin")]
#[command(about = "Inspect and clean up Zentinel session documents")]
struct Args {
    /// Path to the session store (redb database file)
    #[arg(long, env = "SESSION_STORE_PATH")]
    store_path: Option<String>,

    /// JSON file with store configuration overrides
    #[arg(long, env = "SESSION_STORE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, env = "SESSION_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the stored values of a session as JSON
    Show { name: String },
    /// Print the booking IDs stored in a session
    Bookings { name: String },
    /// Delete every document in a session collection
    Purge { name: String },
}

fn load_config(args: &Args) -> Result<StoreConfig> {
    let mut config = StoreConfig::default();

    if let Some(ref path) = args.config {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let overrides: StoreConfigJson = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file: {:?}", path))?;
        overrides.apply_to(&mut config);
    }

    if let Some(ref path) = args.store_path {
        config.store_path = path.clone();
    }

    config.validate().map_err(|e| anyhow::anyhow!(e))?;
    Ok(config)
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "{}={},zentinel_session_store={}",
            env!("CARGO_CRATE_NAME"),
            log_level,
            log_level
        ))
        .json()
        .init();

    let config = load_config(&args)?;
    debug!(
        store_path = %config.store_path,
        cache_capacity = config.cache_capacity,
        request_timeout_secs = config.request_timeout_secs,
        "Configuration loaded"
    );

    let documents = RedbDocumentStore::open(&config.store_path)?;
    let store = SessionStore::new(documents, SessionCache::new(config.cache_capacity));
    let ctx = match config.request_timeout() {
        Some(timeout) => RequestContext::with_timeout(timeout),
        None => RequestContext::background(),
    };

    match args.command {
        Command::Show { name } => {
            let session = store
                .get(&ctx, &name)
                .with_context(|| format!("Failed to read session '{}'", name))?;
            if session.is_new {
                info!(name = %name, "Session not found");
                return Ok(());
            }
            println!("{}", serde_json::to_string_pretty(&session.values)?);
        }
        Command::Bookings { name } => {
            let session = store
                .get(&ctx, &name)
                .with_context(|| format!("Failed to read session '{}'", name))?;
            match extract_booking_ids(Some(&session))? {
                Some(ids) => {
                    for id in ids.iter() {
                        println!("{}", id);
                    }
                }
                None => info!(name = %name, "Session has no booking IDs"),
            }
        }
        Command::Purge { name } => {
            let deleted = store.cleanup(&ctx, &name);
            info!(name = %name, deleted, "Session collection purged");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_show() {
        let args = Args::try_parse_from([
            "session-admin",
            "--store-path",
            "/tmp/s.redb",
            "show",
            "testname",
        ])
        .unwrap();
        assert_eq!(args.store_path.as_deref(), Some("/tmp/s.redb"));
        assert!(matches!(args.command, Command::Show { ref name } if name == "testname"));
    }

    #[test]
    fn test_store_path_flag_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("store.json");
        std::fs::write(
            &config_path,
            r#"{"store-path": "/from/file.redb", "cache-capacity": 8}"#,
        )
        .unwrap();

        let args = Args::try_parse_from([
            "session-admin",
            "--config",
            config_path.to_str().unwrap(),
            "--store-path",
            "/from/flag.redb",
            "purge",
            "testname",
        ])
        .unwrap();

        let config = load_config(&args).unwrap();
        assert_eq!(config.store_path, "/from/flag.redb");
        assert_eq!(config.cache_capacity, 8);
    }

    #[test]
    fn test_invalid_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("store.json");
        std::fs::write(&config_path, "not json").unwrap();

        let args = Args::try_parse_from([
            "session-admin",
            "--config",
            config_path.to_str().unwrap(),
            "bookings",
            "testname",
        ])
        .unwrap();

        assert!(load_config(&args).is_err());
    }
}
