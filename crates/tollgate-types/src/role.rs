//! Access roles derived from credential tokens.

use serde::{Deserialize, Serialize};

/// Access-level classification of a requester.
///
/// Roles form a small closed set plus the distinguished [`Role::Unknown`]
/// value that every unmapped token resolves to. A role is always derived
/// from the credential token by the resolver — it is never read from an
/// envelope, so a tampered message between hops cannot elevate itself.
///
/// Grants come from the permission policy, not from the role itself;
/// nothing here implies any access. In the reference policy:
///
/// | Role | Grants |
/// |------|--------|
/// | [`Full`](Self::Full) | read + write on every category |
/// | [`Restricted`](Self::Restricted) | read + write on one category |
/// | [`Revoked`](Self::Revoked) | none (known token, all access withdrawn) |
/// | [`Unknown`](Self::Unknown) | none (token not in the mapping) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full-access role.
    Full,
    /// Partial-access role.
    Restricted,
    /// Known token whose access has been withdrawn.
    Revoked,
    /// No-privilege role for every unmapped token.
    Unknown,
}

impl Role {
    /// Returns the lowercase name used in policy files.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Restricted => "restricted",
            Self::Revoked => "revoked",
            Self::Unknown => "unknown",
        }
    }

    /// Parses a lowercase role name, as written in policy files.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Some(Self::Full),
            "restricted" => Some(Self::Restricted),
            "revoked" => Some(Self::Revoked),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_role() {
        for role in [Role::Full, Role::Restricted, Role::Revoked, Role::Unknown] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn parse_tolerates_case_and_whitespace() {
        assert_eq!(Role::parse(" Full "), Some(Role::Full));
    }
}
