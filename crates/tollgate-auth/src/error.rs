//! Policy load errors.
//!
//! All fatal at startup: the decision engine refuses to run without a
//! valid table, since neither default-allow nor a silently empty table
//! is safe.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tollgate_types::ErrorCode;

/// Failure to load or validate the permission policy.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The policy file could not be read.
    #[error("failed to read policy file {path}: {source}")]
    Read {
        /// Offending path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The policy text is not valid TOML of the expected shape.
    #[error("failed to parse policy: {0}")]
    Parse(String),

    /// A role name outside the closed set.
    #[error("unknown role in policy: '{0}'")]
    UnknownRole(String),

    /// A category name outside the fixed mapping.
    #[error("unknown category in policy: '{0}'")]
    UnknownCategory(String),

    /// An action other than `read` / `write`.
    #[error("unknown action in policy: '{0}'")]
    UnknownAction(String),
}

impl PolicyError {
    pub(crate) fn read(path: &Path, source: std::io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(err: toml::de::Error) -> Self {
        Self::Parse(err.to_string())
    }

    pub(crate) fn unknown_role(name: &str) -> Self {
        Self::UnknownRole(name.to_string())
    }

    pub(crate) fn unknown_category(name: &str) -> Self {
        Self::UnknownCategory(name.to_string())
    }

    pub(crate) fn unknown_action(name: &str) -> Self {
        Self::UnknownAction(name.to_string())
    }
}

impl ErrorCode for PolicyError {
    fn code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "POLICY_READ_FAILED",
            Self::Parse(_) => "POLICY_PARSE_FAILED",
            Self::UnknownRole(_) => "POLICY_UNKNOWN_ROLE",
            Self::UnknownCategory(_) => "POLICY_UNKNOWN_CATEGORY",
            Self::UnknownAction(_) => "POLICY_UNKNOWN_ACTION",
        }
    }

    fn is_recoverable(&self) -> bool {
        // A missing file may appear on retry; a bad file will not.
        matches!(self, Self::Read { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tollgate_types::assert_error_codes;

    #[test]
    fn all_error_codes_valid() {
        let variants = vec![
            PolicyError::Read {
                path: PathBuf::from("x"),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "x"),
            },
            PolicyError::Parse("x".into()),
            PolicyError::UnknownRole("x".into()),
            PolicyError::UnknownCategory("x".into()),
            PolicyError::UnknownAction("x".into()),
        ];
        assert_error_codes(&variants, "POLICY_");
    }
}
