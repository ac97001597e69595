use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::Context;

/// Identifier reported by `/health` and used as the log component tag.
pub const SERVICE_NAME: &str = "duplexer-webhook";

const DEFAULT_PORT: u16 = 8083;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PENDING_DIR: &str = "/logs/pending";
const DEFAULT_LOGFILE: &str = "/logs/duplexer.log";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: IpAddr,
    /// Directory holding `<token>.pending`, `APPROVE_<token>` and `REJECT_<token>` markers.
    pub pending_dir: PathBuf,
    /// Mirror of the log output. `None` when `LOGFILE` is set to an empty string.
    pub logfile: Option<PathBuf>,
    /// `EnvFilter` directive, taken from `RUST_LOG`.
    pub log_filter: String,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();
    load_from(|key| std::env::var(key).ok())
}

/// Resolve the configuration through `lookup` instead of the process environment.
pub fn load_from<F>(lookup: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let port = match lookup("WEBHOOK_PORT") {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid WEBHOOK_PORT: {raw:?}"))?,
        None => DEFAULT_PORT,
    };

    let host = lookup("WEBHOOK_HOST").unwrap_or_else(|| DEFAULT_HOST.into());
    let host = host
        .trim()
        .parse()
        .with_context(|| format!("invalid WEBHOOK_HOST: {host:?}"))?;

    let logfile = match lookup("LOGFILE") {
        Some(path) if path.trim().is_empty() => None,
        Some(path) => Some(PathBuf::from(path)),
        None => Some(PathBuf::from(DEFAULT_LOGFILE)),
    };

    Ok(Config {
        port,
        host,
        pending_dir: lookup("PENDING_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PENDING_DIR)),
        logfile,
        log_filter: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.into()),
    })
}
