use clap::Parser;
use std::path::PathBuf;

use crate::error::ShuffleError;
use crate::history::JsonFileHistory;

pub const DEFAULT_MAX_PLAYLIST_SIZE: u64 = 1_000_000;

#[derive(Debug, Clone, Parser)]
#[command(name = "shuffler", version, about = "Playlist shuffle service")]
pub struct Config {
    /// Server bind address
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0:8000")]
    pub bind_address: String,

    /// Path of the shuffle history log (defaults to log.json next to the executable)
    #[arg(long, env = "SHUFFLE_LOG_PATH")]
    pub log_path: Option<PathBuf>,

    /// Largest playlist a client may ask for
    #[arg(long, env = "MAX_PLAYLIST_SIZE", default_value_t = DEFAULT_MAX_PLAYLIST_SIZE)]
    pub max_playlist_size: u64,

    /// Fixed RNG seed for reproducible shuffles
    #[arg(long, env = "SHUFFLE_SEED")]
    pub seed: Option<u64>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Return a JSON error body on internal failures instead of a bare 500
    #[arg(long, env = "STRUCTURED_INTERNAL_ERRORS")]
    pub structured_internal_errors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            log_path: None,
            max_playlist_size: DEFAULT_MAX_PLAYLIST_SIZE,
            seed: None,
            log_level: "info".to_string(),
            structured_internal_errors: false,
        }
    }
}

impl Config {
    /// Load configuration from command line arguments and environment variables.
    /// Exits the process on `--help`, `--version` or unparseable arguments.
    pub fn load() -> Result<Self, ShuffleError> {
        let config = Config::parse();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ShuffleError> {
        if self.bind_address.is_empty() || !self.bind_address.contains(':') {
            return Err(ShuffleError::Config(
                "Bind address must be in host:port format".to_string(),
            ));
        }

        if self.max_playlist_size == 0 {
            return Err(ShuffleError::Config(
                "Max playlist size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolved history log location
    pub fn history_path(&self) -> Result<PathBuf, ShuffleError> {
        match &self.log_path {
            Some(path) => Ok(path.clone()),
            None => Ok(JsonFileHistory::default_path()?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_args() {
        let config = Config::try_parse_from(["shuffler"]).unwrap();
        assert_eq!(config.max_playlist_size, DEFAULT_MAX_PLAYLIST_SIZE);
        assert!(!config.structured_internal_errors);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = Config::try_parse_from([
            "shuffler",
            "--bind-address",
            "127.0.0.1:9000",
            "--log-path",
            "/tmp/history.json",
            "--seed",
            "42",
            "--structured-internal-errors",
        ])
        .unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.seed, Some(42));
        assert!(config.structured_internal_errors);
        assert_eq!(
            config.history_path().unwrap(),
            PathBuf::from("/tmp/history.json")
        );
    }

    #[test]
    fn test_invalid_config() {
        let config = Config {
            max_playlist_size: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            bind_address: "localhost".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_history_path_is_log_json() {
        let path = Config::default().history_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "log.json");
    }
}
