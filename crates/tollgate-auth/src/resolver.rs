//! Token → role resolution.

use std::collections::HashMap;
use tollgate_types::Role;

/// Total mapping from opaque credential tokens to roles.
///
/// `resolve` never fails: the token is trimmed and case-folded, looked
/// up in the fixed mapping, and anything unmapped — including the empty
/// string — becomes [`Role::Unknown`]. No state, no I/O, no side
/// effects.
///
/// # Example
///
/// ```
/// use tollgate_auth::RoleResolver;
/// use tollgate_types::Role;
///
/// let resolver = RoleResolver::default();
/// assert_eq!(resolver.resolve("  Token_App_1 "), Role::Full);
/// assert_eq!(resolver.resolve("stranger"), Role::Unknown);
/// assert_eq!(resolver.resolve(""), Role::Unknown);
/// ```
#[derive(Debug, Clone)]
pub struct RoleResolver {
    mapping: HashMap<String, Role>,
}

impl RoleResolver {
    /// Builds a resolver from an explicit token mapping.
    ///
    /// Keys are normalized (trim + ASCII lowercase) at construction so
    /// lookup stays a plain map hit.
    #[must_use]
    pub fn with_mapping(mapping: impl IntoIterator<Item = (String, Role)>) -> Self {
        Self {
            mapping: mapping
                .into_iter()
                .map(|(token, role)| (normalize(&token), role))
                .collect(),
        }
    }

    /// Resolves a token to its role. Total function.
    #[must_use]
    pub fn resolve(&self, token: &str) -> Role {
        self.mapping
            .get(&normalize(token))
            .copied()
            .unwrap_or(Role::Unknown)
    }

    /// Number of known tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Returns `true` if no tokens are mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

impl Default for RoleResolver {
    /// The reference deployment's token set.
    fn default() -> Self {
        Self::with_mapping([
            ("token_app_1".to_string(), Role::Full),
            ("token_app_2".to_string(), Role::Restricted),
            ("token_malicious".to_string(), Role::Revoked),
        ])
    }
}

fn normalize(token: &str) -> String {
    token.trim().to_ascii_lowercase()
}
