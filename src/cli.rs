use std::net::SocketAddr;
use std::num::NonZeroUsize;

use clap::Parser;

use crate::server::{DEFAULT_LISTEN, DEFAULT_MAX_UPLOAD_BYTES, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "replay-ingest")]
#[command(version)]
#[command(about = "Decode uploaded game replays over HTTP", long_about = None)]
#[command(after_help = "Endpoints:\n  \
  GET  /test     liveness probe\n  \
  POST /round    decode one replay sent in the `file` form field\n  \
  POST /replay   decode every replay in a zip archive sent in the `file` form field")]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "REPLAY_INGEST_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: SocketAddr,

    /// Archive entries decoded concurrently per request
    #[arg(long, env = "REPLAY_INGEST_WORKERS", default_value_t = NonZeroUsize::MIN)]
    pub workers: NonZeroUsize,

    /// Largest accepted upload, in bytes
    #[arg(long, env = "REPLAY_INGEST_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Do not send cross-origin headers
    #[arg(long, env = "REPLAY_INGEST_NO_CORS")]
    pub no_cors: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            listen: self.listen,
            workers: self.workers,
            max_upload_bytes: self.max_upload_bytes,
            cors: !self.no_cors,
        }
    }

    /// Log level used when `RUST_LOG` is not set
    pub fn default_log_level(&self) -> &'static str {
        match self.quiet {
            0 => "info",
            1 => "warn",
            _ => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["replay-ingest"]).unwrap();
        let config = cli.server_config();

        assert_eq!(config.listen, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.workers.get(), 1);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(config.cors);
        assert_eq!(cli.default_log_level(), "info");
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "replay-ingest",
            "--listen",
            "127.0.0.1:9000",
            "--workers",
            "4",
            "--no-cors",
            "-qq",
        ])
        .unwrap();
        let config = cli.server_config();

        assert_eq!(config.listen.port(), 9000);
        assert_eq!(config.workers.get(), 4);
        assert!(!config.cors);
        assert_eq!(cli.default_log_level(), "error");
    }

    #[test]
    fn zero_workers_is_rejected() {
        assert!(Cli::try_parse_from(["replay-ingest", "--workers", "0"]).is_err());
    }
}
