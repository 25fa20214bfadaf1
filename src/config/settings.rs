use crate::error::{FactomError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_FACTOMD_SERVER: &str = "http://localhost:8088/v2";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_WALLET_PATH: &str = "factom_wallet";

const FACTOMD_SERVER_KEY: &str = "FACTOMD_SERVER";
const WALLET_PATH_KEY: &str = "FACTOM_WALLET_PATH";
const WALLET_PASSWORD_KEY: &str = "FACTOM_WALLET_PASSWORD";
const REQUEST_TIMEOUT_KEY: &str = "FACTOM_REQUEST_TIMEOUT";

/// Endpoints and wallet location, passed explicitly to whatever needs them
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub factomd_server: String,
    pub request_timeout_secs: u64,
    pub wallet_path: PathBuf,
    /// Encrypts the key store when set
    pub wallet_password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            factomd_server: DEFAULT_FACTOMD_SERVER.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            wallet_path: PathBuf::from(DEFAULT_WALLET_PATH),
            wallet_password: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("factomd_server", &self.factomd_server)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("wallet_path", &self.wallet_path)
            .field(
                "wallet_password",
                &self.wallet_password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Config {
    /// Read a TOML file; missing keys take their defaults
    pub fn load(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path).map_err(|e| {
            FactomError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        toml::from_str(&contents)
            .map_err(|e| FactomError::Config(format!("Failed to parse {}: {e}", path.display())))
    }

    pub fn load_or_default(path: &Path) -> Result<Config> {
        if path.exists() {
            Config::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Defaults, then the optional file, then the process environment
    pub fn resolve(path: Option<&Path>) -> Result<Config> {
        let mut config = match path {
            Some(path) => Config::load_or_default(path)?,
            None => Config::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        debug!("Resolved configuration: {config:?}");
        Ok(config)
    }

    /// Apply overrides from any key lookup shaped like the environment
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(server) = lookup(FACTOMD_SERVER_KEY) {
            self.factomd_server = server;
        }
        if let Some(path) = lookup(WALLET_PATH_KEY) {
            self.wallet_path = PathBuf::from(path);
        }
        if let Some(password) = lookup(WALLET_PASSWORD_KEY) {
            self.wallet_password = Some(password);
        }
        if let Some(timeout) = lookup(REQUEST_TIMEOUT_KEY) {
            self.request_timeout_secs = timeout.parse().map_err(|_| {
                FactomError::Config(format!("{REQUEST_TIMEOUT_KEY} is not a number: {timeout}"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.factomd_server.is_empty() {
            return Err(FactomError::Config("factomd_server is empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(FactomError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.factomd_server, DEFAULT_FACTOMD_SERVER);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(config.wallet_password.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("factom.toml");
        fs::write(
            &path,
            "factomd_server = \"http://courtesy-node.factom.com/v2\"\nrequest_timeout_secs = 30\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.factomd_server, "http://courtesy-node.factom.com/v2");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.wallet_path, PathBuf::from(DEFAULT_WALLET_PATH));
    }

    #[test]
    fn test_missing_file_is_default_but_bad_file_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert_eq!(Config::load_or_default(&missing).unwrap(), Config::default());

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "request_timeout_secs = \"soon\"").unwrap();
        assert!(matches!(Config::load(&bad), Err(FactomError::Config(_))));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let vars: HashMap<&str, &str> = [
            ("FACTOMD_SERVER", "http://10.0.0.1:8088/v2"),
            ("FACTOM_WALLET_PASSWORD", "correct horse"),
            ("FACTOM_REQUEST_TIMEOUT", "3"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.factomd_server, "http://10.0.0.1:8088/v2");
        assert_eq!(config.wallet_password.as_deref(), Some("correct horse"));
        assert_eq!(config.request_timeout_secs, 3);

        let mut config = Config::default();
        let result = config.apply_overrides(|key| {
            (key == "FACTOM_REQUEST_TIMEOUT").then(|| "forever".to_string())
        });
        assert!(matches!(result, Err(FactomError::Config(_))));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = Config {
            wallet_password: Some("hunter2hunter2".to_string()),
            ..Config::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }
}
