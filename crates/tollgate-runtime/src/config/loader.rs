//! Layered configuration loading.

use super::ConfigError;
use crate::broker::AckMode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tollgate_types::Role;
use tracing::debug;

/// Environment variable overriding the queue depth.
pub const ENV_QUEUE_DEPTH: &str = "TOLLGATE_QUEUE_DEPTH";
/// Environment variable overriding the ack mode.
pub const ENV_ACK_MODE: &str = "TOLLGATE_ACK_MODE";
/// Environment variable overriding the policy file path.
pub const ENV_POLICY_PATH: &str = "TOLLGATE_POLICY_PATH";

const DEFAULT_QUEUE_DEPTH: usize = 64;

/// Resolved gateway settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Capacity of every pipeline queue.
    pub queue_depth: usize,

    /// Acknowledgement timing for pipeline queues.
    pub ack_mode: AckMode,

    /// Permission policy file. `None` means the built-in reference
    /// policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_path: Option<PathBuf>,

    /// Token-to-role mapping override. `None` means the built-in
    /// reference tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<HashMap<String, Role>>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            queue_depth: DEFAULT_QUEUE_DEPTH,
            ack_mode: AckMode::OnComplete,
            policy_path: None,
            tokens: None,
        }
    }
}

impl GatewayConfig {
    /// Checks internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a zero queue depth.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_depth == 0 {
            return Err(ConfigError::invalid_value(
                "queue_depth",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Builder over the three configuration layers.
///
/// ```no_run
/// use tollgate_runtime::config::ConfigLoader;
///
/// let config = ConfigLoader::new().load()?;
/// # Ok::<(), tollgate_runtime::config::ConfigError>(())
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    path: Option<PathBuf>,
    skip_env: bool,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the file layer from an explicit path instead of the
    /// default location. The file must exist.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Ignores `TOLLGATE_*` variables. Used by tests.
    #[must_use]
    pub fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Resolves the layers into a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file layer cannot be read or
    /// parsed, an environment override does not parse, or the merged
    /// result fails validation.
    pub fn load(self) -> Result<GatewayConfig, ConfigError> {
        let mut config = match &self.path {
            Some(path) => Self::load_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_file(&path)?,
                _ => GatewayConfig::default(),
            },
        };

        if !self.skip_env {
            Self::apply_env(&mut config)?;
        }

        config.validate()?;
        debug!(
            queue_depth = config.queue_depth,
            ack_mode = config.ack_mode.as_str(),
            "configuration resolved"
        );
        Ok(config)
    }

    /// Default file location: `~/.tollgate/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".tollgate").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::read(path.to_path_buf(), source))?;
        toml::from_str(&raw).map_err(|err| ConfigError::parse(path.to_path_buf(), err.to_string()))
    }

    fn apply_env(config: &mut GatewayConfig) -> Result<(), ConfigError> {
        if let Ok(depth) = std::env::var(ENV_QUEUE_DEPTH) {
            config.queue_depth = depth
                .parse()
                .map_err(|_| ConfigError::invalid_env(ENV_QUEUE_DEPTH, &depth))?;
        }
        if let Ok(mode) = std::env::var(ENV_ACK_MODE) {
            config.ack_mode = mode
                .parse()
                .map_err(|_| ConfigError::invalid_env(ENV_ACK_MODE, &mode))?;
        }
        if let Ok(path) = std::env::var(ENV_POLICY_PATH) {
            config.policy_path = Some(PathBuf::from(path));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tollgate_types::ErrorCode;

    #[test]
    fn defaults_are_valid() {
        let config = GatewayConfig::default();
        assert_eq!(config.queue_depth, 64);
        assert_eq!(config.ack_mode, AckMode::OnComplete);
        assert!(config.policy_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_depth_fails_validation() {
        let config = GatewayConfig {
            queue_depth: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), "CONFIG_INVALID_VALUE");
    }

    #[test]
    fn file_layer_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "queue_depth = 8\nack_mode = \"early\"").unwrap();

        let config = ConfigLoader::new()
            .with_path(&path)
            .skip_env()
            .load()
            .unwrap();
        assert_eq!(config.queue_depth, 8);
        assert_eq!(config.ack_mode, AckMode::Early);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "queue_depth = 16\n").unwrap();

        let config = ConfigLoader::new()
            .with_path(&path)
            .skip_env()
            .load()
            .unwrap();
        assert_eq!(config.queue_depth, 16);
        assert_eq!(config.ack_mode, AckMode::OnComplete);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = ConfigLoader::new()
            .with_path("/nonexistent/tollgate.toml")
            .skip_env()
            .load()
            .unwrap_err();
        assert_eq!(err.code(), "CONFIG_READ_FAILED");
    }

    #[test]
    fn unparseable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "queue_depth = \"lots\"\n").unwrap();

        let err = ConfigLoader::new()
            .with_path(&path)
            .skip_env()
            .load()
            .unwrap_err();
        assert_eq!(err.code(), "CONFIG_PARSE_FAILED");
    }

    #[test]
    fn tokens_table_loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[tokens]\n\"token_ops\" = \"full\"\n\"token_probe\" = \"revoked\"\n",
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_path(&path)
            .skip_env()
            .load()
            .unwrap();
        let tokens = config.tokens.unwrap();
        assert_eq!(tokens.get("token_ops"), Some(&tollgate_types::Role::Full));
        assert_eq!(tokens.get("token_probe"), Some(&tollgate_types::Role::Revoked));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = GatewayConfig {
            queue_depth: 32,
            ack_mode: AckMode::Early,
            policy_path: Some(PathBuf::from("/etc/tollgate/policy.toml")),
            tokens: None,
        };
        let raw = toml::to_string(&config).unwrap();
        let back: GatewayConfig = toml::from_str(&raw).unwrap();
        assert_eq!(back, config);
    }
}
