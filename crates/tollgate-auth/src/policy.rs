//! The declarative permission table.

use crate::PolicyError;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tollgate_types::{Action, Category, Role};

/// Immutable `(role, category) → {read, write}` table.
///
/// Loaded once at process start and injected by value into the
/// decision engine — there is no global table and no runtime reload.
/// Absence of an entry is the empty grant set, so every lookup path
/// denies by default.
///
/// # Policy file
///
/// One TOML table per role, one array of actions per category:
///
/// ```toml
/// [full]
/// animals = ["read", "write"]
/// plants = ["read", "write"]
///
/// [restricted]
/// plants = ["read", "write"]
///
/// [revoked]
/// ```
///
/// Unknown role names, category names, or actions fail the load — a
/// typo in a policy file must stop startup, not silently deny (or
/// worse, silently drop a revocation).
#[derive(Debug, Clone)]
pub struct PermissionPolicy {
    rules: HashMap<Role, HashMap<Category, HashSet<Action>>>,
}

impl PermissionPolicy {
    /// Builds a policy from explicit grants.
    #[must_use]
    pub fn from_grants(
        grants: impl IntoIterator<Item = (Role, Category, Action)>,
    ) -> Self {
        let mut rules: HashMap<Role, HashMap<Category, HashSet<Action>>> = HashMap::new();
        for (role, category, action) in grants {
            rules
                .entry(role)
                .or_default()
                .entry(category)
                .or_default()
                .insert(action);
        }
        Self { rules }
    }

    /// The reference deployment's rule set.
    ///
    /// Full: everything on every category. Restricted: plants only.
    /// Revoked: present in the table with no grants (explicitly
    /// stripped, not merely absent).
    #[must_use]
    pub fn reference() -> Self {
        let mut policy = Self::from_grants([
            (Role::Full, Category::Animals, Action::Read),
            (Role::Full, Category::Animals, Action::Write),
            (Role::Full, Category::Plants, Action::Read),
            (Role::Full, Category::Plants, Action::Write),
            (Role::Restricted, Category::Plants, Action::Read),
            (Role::Restricted, Category::Plants, Action::Write),
        ]);
        policy.rules.entry(Role::Revoked).or_default();
        policy
    }

    /// Parses a policy from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] on invalid TOML or on any unknown role,
    /// category, or action name.
    pub fn from_toml(text: &str) -> Result<Self, PolicyError> {
        // role -> category -> actions; BTreeMap keeps error output stable
        let raw: BTreeMap<String, BTreeMap<String, Vec<String>>> =
            toml::from_str(text).map_err(PolicyError::parse)?;

        let mut rules: HashMap<Role, HashMap<Category, HashSet<Action>>> = HashMap::new();
        for (role_name, categories) in raw {
            let role =
                Role::parse(&role_name).ok_or_else(|| PolicyError::unknown_role(&role_name))?;
            let entry = rules.entry(role).or_default();
            for (category_name, actions) in categories {
                let category = Category::parse(&category_name)
                    .map_err(|_| PolicyError::unknown_category(&category_name))?;
                let mut set = HashSet::new();
                for action_name in actions {
                    let action = match action_name.as_str() {
                        "read" => Action::Read,
                        "write" => Action::Write,
                        other => return Err(PolicyError::unknown_action(other)),
                    };
                    set.insert(action);
                }
                entry.insert(category, set);
            }
        }
        Ok(Self { rules })
    }

    /// Loads a policy file.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] if the file cannot be read or parsed.
    /// Callers treat this as fatal at startup.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| PolicyError::read(path, e))?;
        Self::from_toml(&text)
    }

    /// Category-scoped lookup: may `role` perform `action` on
    /// `category`?
    ///
    /// Deny path: role absent → `false`; category absent under the
    /// role → `false`; else membership of `action` in the grant set.
    #[must_use]
    pub fn allows(&self, role: Role, category: Category, action: Action) -> bool {
        self.rules
            .get(&role)
            .and_then(|categories| categories.get(&category))
            .is_some_and(|actions| actions.contains(&action))
    }

    /// Coarse lookup: does `role` hold `action` on *any* category?
    ///
    /// This is the first-tier check, performed before the storage
    /// category has been derived. It can only turn requests away — a
    /// pass here still faces the category-scoped check downstream.
    #[must_use]
    pub fn allows_any(&self, role: Role, action: Action) -> bool {
        Category::all()
            .into_iter()
            .any(|category| self.allows(role, category, action))
    }

    /// Number of roles with entries (including empty ones).
    #[must_use]
    pub fn role_count(&self) -> usize {
        self.rules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE_TOML: &str = r#"
[full]
animals = ["read", "write"]
plants = ["read", "write"]

[restricted]
plants = ["read", "write"]

[revoked]
"#;

    #[test]
    fn reference_grants() {
        let p = PermissionPolicy::reference();
        assert!(p.allows(Role::Full, Category::Animals, Action::Write));
        assert!(p.allows(Role::Restricted, Category::Plants, Action::Write));
        assert!(!p.allows(Role::Restricted, Category::Animals, Action::Read));
        assert!(!p.allows(Role::Revoked, Category::Plants, Action::Read));
    }

    #[test]
    fn deny_by_default_for_absent_roles() {
        let p = PermissionPolicy::reference();
        for category in Category::all() {
            for action in [Action::Read, Action::Write] {
                assert!(!p.allows(Role::Unknown, category, action));
            }
        }
    }

    #[test]
    fn empty_policy_denies_everything() {
        let p = PermissionPolicy::from_grants([]);
        for role in [Role::Full, Role::Restricted, Role::Revoked, Role::Unknown] {
            assert!(!p.allows_any(role, Action::Read));
            assert!(!p.allows_any(role, Action::Write));
        }
    }

    #[test]
    fn coarse_check_matches_any_category() {
        let p = PermissionPolicy::reference();
        assert!(p.allows_any(Role::Restricted, Action::Write)); // via plants
        assert!(!p.allows_any(Role::Revoked, Action::Write));
        assert!(!p.allows_any(Role::Unknown, Action::Read));
    }

    #[test]
    fn toml_matches_reference() {
        let parsed = PermissionPolicy::from_toml(REFERENCE_TOML).unwrap();
        let reference = PermissionPolicy::reference();
        for role in [Role::Full, Role::Restricted, Role::Revoked, Role::Unknown] {
            for category in Category::all() {
                for action in [Action::Read, Action::Write] {
                    assert_eq!(
                        parsed.allows(role, category, action),
                        reference.allows(role, category, action),
                        "{role}/{category}/{action}"
                    );
                }
            }
        }
    }

    #[test]
    fn unknown_role_fails_the_load() {
        let err = PermissionPolicy::from_toml("[admin]\nplants = [\"read\"]\n").unwrap_err();
        assert!(err.to_string().contains("admin"));
    }

    #[test]
    fn unknown_category_fails_the_load() {
        let err = PermissionPolicy::from_toml("[full]\nminerals = [\"read\"]\n").unwrap_err();
        assert!(err.to_string().contains("minerals"));
    }

    #[test]
    fn unknown_action_fails_the_load() {
        let err = PermissionPolicy::from_toml("[full]\nplants = [\"execute\"]\n").unwrap_err();
        assert!(err.to_string().contains("execute"));
    }

    #[test]
    fn from_file_reads_and_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.toml");
        std::fs::write(&path, REFERENCE_TOML).unwrap();

        let p = PermissionPolicy::from_file(&path).unwrap();
        assert!(p.allows(Role::Full, Category::Plants, Action::Read));
    }

    #[test]
    fn from_file_missing_is_an_error() {
        let err = PermissionPolicy::from_file("/nonexistent/policy.toml").unwrap_err();
        assert!(err.to_string().contains("policy.toml"));
    }
}
