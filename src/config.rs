use std::{path::PathBuf, time::Duration};

use clap::Parser;

/// Terminal kanban board for a remote task API.
#[derive(Debug, Parser)]
#[command(name = "kanban", version, about)]
pub struct Args {
    /// Base URL of the task API.
    #[arg(long, env = "KANBAN_API_URL", default_value = "http://127.0.0.1:8000")]
    pub api_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "KANBAN_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Where log output goes while the board owns the terminal.
    #[arg(long, env = "KANBAN_LOG_FILE", default_value = "kanban.log")]
    pub log_file: PathBuf,
}

impl Args {
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let args = Args::try_parse_from(["kanban"]).unwrap();
        assert_eq!(args.base_url(), "http://127.0.0.1:8000");
        assert_eq!(args.timeout(), Duration::from_secs(10));
        assert_eq!(args.log_file, PathBuf::from("kanban.log"));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let args =
            Args::try_parse_from(["kanban", "--api-url", "http://tasks.local:9000/"]).unwrap();
        assert_eq!(args.base_url(), "http://tasks.local:9000");
    }
}
