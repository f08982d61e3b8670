//! Request methods and the action classes they map to.
//!
//! The permission table is written in terms of [`Action`] (`read` /
//! `write`), not raw methods. The mapping is:
//!
//! | Method | Action |
//! |--------|--------|
//! | `GET` | `Read` |
//! | `POST`, `PUT`, `DELETE` | `Write` |
//! | anything else | `Write` |
//!
//! An unrecognized method classifying as `Write` is a deliberate
//! conservative default: an unknown verb must never slip through a
//! read-only grant.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize, Serializer};

/// HTTP-style request method carried by an envelope.
///
/// Parsing is case-insensitive and total — `Other` preserves the
/// original spelling so the executor can report it verbatim.
///
/// # Example
///
/// ```
/// use tollgate_types::{Action, Method};
///
/// assert_eq!(Method::parse("get"), Method::Get);
/// assert_eq!(Method::parse("POST").action(), Action::Write);
/// assert_eq!(Method::parse("PATCH"), Method::Other("PATCH".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read a set of records.
    Get,
    /// Create a record.
    Post,
    /// Overwrite an existing record's payload.
    Put,
    /// Remove an existing record.
    Delete,
    /// Any unrecognized verb, original spelling preserved.
    Other(String),
}

impl Method {
    /// Parses a method string case-insensitively.
    ///
    /// Total: unrecognized input becomes [`Method::Other`], never an error.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            _ => Self::Other(s.to_string()),
        }
    }

    /// Returns the canonical spelling (`Other` returns the original).
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Other(s) => s,
        }
    }

    /// Returns `true` for the four recognized CRUD methods.
    ///
    /// The controller router forwards only CRUD envelopes to the data
    /// subsystem; everything else is a defined no-op.
    #[must_use]
    pub fn is_crud(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Maps the method to its action class.
    ///
    /// `GET` is the only read. Everything else — including unrecognized
    /// methods — classifies as [`Action::Write`] so that an unknown verb
    /// can never pass on a read-only grant.
    #[must_use]
    pub fn action(&self) -> Action {
        match self {
            Self::Get => Action::Read,
            _ => Action::Write,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Method {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Method {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Method::parse(&s))
    }
}

/// Action class a permission grant is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Retrieval only.
    Read,
    /// Any mutation.
    Write,
}

impl Action {
    /// Returns the lowercase name used in policy files.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
