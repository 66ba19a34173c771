//! Resolve short names the way services do and report the container key.
//!
//! `locate [--uri /questions?order=-vote_count] NAME...`
//!
//! One JSON line per name on stdout; logs go to stderr. Exits non-zero when
//! any name is not found.

use std::io;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use configs::AppConfig;
use serde_json::json;
use service::bootstrap::{build_app_container, request_scope};
use service::infra::Request;
use service::Locator;
use tracing::{error, info};
use uuid::Uuid;

/// Resolve service-locator names against the configured container
#[derive(Parser, Debug)]
#[command(name = "locate")]
#[command(version)]
struct Cli {
    /// Request URI to bind as `request`, e.g. `/questions?order=-vote_count`
    #[arg(long)]
    uri: Option<String>,

    /// Names to resolve (`user`, `questionService`, `cache`, ...)
    #[arg(required = true)]
    names: Vec<String>,
}

/// Export `.env` into the process environment. An explicit file must exist and
/// overrides variables already set; the default `.env` is optional and does not.
fn load_env(file: Option<&Path>) -> anyhow::Result<()> {
    match file {
        Some(path) => {
            dotenvy::from_path_override(path).with_context(|| format!("cannot read {}", path.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }
    Ok(())
}

/// Environment first (`CONFIG_PATH`, `STORAGE_ROOT`, `RUST_LOG`), then the
/// config file, then logging in the configured format, then validation so
/// its warnings are visible.
fn load_config(env_file: Option<&Path>) -> anyhow::Result<AppConfig> {
    load_env(env_file)?;
    let loaded = configs::load_default();
    let format = loaded.as_ref().map(|cfg| cfg.logging.format).unwrap_or_default();
    common::utils::logging::init_logging_to(format.as_str(), io::stderr);
    AppConfig::validated_or_default(loaded)
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let cfg = load_config(None)?;

    let run_id = Uuid::new_v4();
    info!(service = "locate", event = "start", %run_id, names = cli.names.len(), "resolving names");

    let app = build_app_container(&cfg)?;
    let container = match cli.uri {
        Some(uri) => request_scope(&app, Request::parse(&uri)?),
        None => app,
    };
    let locator = Locator::new(container);

    let mut all_found = true;
    for name in &cli.names {
        let line = match locator.locate_key(name) {
            Ok(key) => json!({ "name": name, "key": key }),
            Err(e) => {
                all_found = false;
                json!({ "name": name, "error": e.to_string() })
            }
        };
        println!("{line}");
    }
    Ok(all_found)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(service = "locate", event = "run_failed", error = %e, "locate failed");
            eprintln!("locate: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_flag_needs_a_value() {
        assert!(Cli::try_parse_from(["locate", "cache", "--uri"]).is_err());
        assert!(Cli::try_parse_from(["locate"]).is_err());
    }

    #[test]
    fn parses_uri_and_names() {
        let cli = Cli::try_parse_from(["locate", "--uri", "/questions?order=-vote_count", "user", "cache"]).unwrap();
        assert_eq!(cli.uri.as_deref(), Some("/questions?order=-vote_count"));
        assert_eq!(cli.names, vec!["user", "cache"]);
    }

    #[test]
    fn dotenv_is_applied_before_config() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("from_dotenv");
        let config = tmp.path().join("forum.toml");
        std::fs::write(&config, "[cache]\nmax_capacity = 7\n").unwrap();
        let env_file = tmp.path().join(".env");
        std::fs::write(
            &env_file,
            format!("CONFIG_PATH={}\nSTORAGE_ROOT={}\n", config.display(), root.display()),
        )
        .unwrap();

        let cfg = load_config(Some(&env_file)).unwrap();
        assert_eq!(cfg.cache.max_capacity, 7);
        assert_eq!(cfg.storage.root, root.display().to_string());

        build_app_container(&cfg).unwrap();
        assert!(root.is_dir());
    }
}
