//! Process configuration from flags, environment and `.env`.

use arca_core::{default_log_level, LogTarget};
use clap::Parser;
use log::info;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Serves the building-interior model of one tabular store over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "arca_server", version)]
pub struct Config {
    /// SQLite file holding the tabular store. Created and migrated when
    /// missing.
    #[arg(long, env = "ARCA_DB_PATH", value_name = "PATH")]
    pub db_path: PathBuf,

    #[arg(
        long,
        env = "ARCA_SERVER_ADDRESS",
        value_name = "HOST:PORT",
        default_value = "127.0.0.1:8080"
    )]
    pub server_address: SocketAddr,

    /// One of trace, debug, info, warn, error.
    #[arg(long, env = "ARCA_LOG_LEVEL", default_value = default_log_level())]
    pub log_level: String,

    /// Absolute directory for rotated log files. Logs go to stderr when
    /// unset.
    #[arg(long, env = "ARCA_LOG_DIR", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Upper bound on the work done for one request.
    #[arg(
        long,
        env = "ARCA_REQUEST_TIMEOUT_SECS",
        value_name = "SECONDS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn log_target(&self) -> LogTarget {
        match &self.log_dir {
            Some(dir) => LogTarget::Directory(dir.clone()),
            None => LogTarget::Stderr,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn log_summary(&self) {
        info!(
            "event=config_load module=server status=ok db_path={} address={} log_target={} request_timeout_secs={}",
            self.db_path.display(),
            self.server_address,
            self.log_target(),
            self.request_timeout_secs
        );
    }
}
