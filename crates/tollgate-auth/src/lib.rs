//! Role resolution and permission evaluation for Tollgate.
//!
//! # Two pure pieces
//!
//! ```text
//! token ──► RoleResolver ──► Role ─┐
//!                                  ├──► PermissionPolicy ──► allow | deny
//! (category, action) ─────────────┘
//! ```
//!
//! - [`RoleResolver`] — total token→role mapping. No state, no I/O,
//!   never fails; unmapped tokens become the no-privilege role.
//! - [`PermissionPolicy`] — immutable `(role, category) → {read, write}`
//!   table, loaded once at startup and injected by value into the
//!   decision engine. Deny-by-default: a missing role or category entry
//!   is the empty grant set.
//!
//! A load failure at startup is fatal ([`PolicyError`]) — the engine
//! cannot safely default-allow, and it must not silently start with an
//! empty table either.
//!
//! # Security posture
//!
//! Both lookups are recomputed at every entitlement check from the
//! message's own token. No role is cached across hops or trusted from
//! any message field, so tampering between hops cannot elevate a
//! request.

mod error;
mod policy;
mod resolver;

pub use error::PolicyError;
pub use policy::PermissionPolicy;
pub use resolver::RoleResolver;
