//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;
use tollgate_types::ErrorCode;

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`GatewayConfig`](super::GatewayConfig).
    #[error("failed to parse config file {path}: {detail}")]
    Parse { path: PathBuf, detail: String },

    /// An environment override did not parse.
    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidEnv { name: &'static str, value: String },

    /// The merged configuration is inconsistent.
    #[error("invalid config value for {field}: {detail}")]
    InvalidValue {
        field: &'static str,
        detail: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn read(path: PathBuf, source: std::io::Error) -> Self {
        ConfigError::Read { path, source }
    }

    pub(crate) fn parse(path: PathBuf, detail: impl Into<String>) -> Self {
        ConfigError::Parse {
            path,
            detail: detail.into(),
        }
    }

    pub(crate) fn invalid_env(name: &'static str, value: impl Into<String>) -> Self {
        ConfigError::InvalidEnv {
            name,
            value: value.into(),
        }
    }

    pub(crate) fn invalid_value(field: &'static str, detail: &'static str) -> Self {
        ConfigError::InvalidValue { field, detail }
    }
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "CONFIG_READ_FAILED",
            ConfigError::Parse { .. } => "CONFIG_PARSE_FAILED",
            ConfigError::InvalidEnv { .. } => "CONFIG_INVALID_ENV",
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE",
        }
    }

    fn is_recoverable(&self) -> bool {
        // a missing file may appear; bad values need operator action
        matches!(self, ConfigError::Read { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tollgate_types::assert_error_codes;

    #[test]
    fn error_codes_are_stable() {
        let variants = vec![
            ConfigError::read(PathBuf::from("/x"), std::io::Error::other("gone")),
            ConfigError::parse(PathBuf::from("/x"), "bad toml"),
            ConfigError::invalid_env("TOLLGATE_QUEUE_DEPTH", "lots"),
            ConfigError::invalid_value("queue_depth", "must be at least 1"),
        ];
        assert_error_codes(&variants, "CONFIG_");

        assert_eq!(variants[0].code(), "CONFIG_READ_FAILED");
        assert_eq!(variants[1].code(), "CONFIG_PARSE_FAILED");
        assert_eq!(variants[2].code(), "CONFIG_INVALID_ENV");
        assert_eq!(variants[3].code(), "CONFIG_INVALID_VALUE");
    }

    #[test]
    fn only_read_is_recoverable() {
        assert!(
            ConfigError::read(PathBuf::from("/x"), std::io::Error::other("gone"))
                .is_recoverable()
        );
        assert!(!ConfigError::invalid_value("queue_depth", "zero").is_recoverable());
    }
}
