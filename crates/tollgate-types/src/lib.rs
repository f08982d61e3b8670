//! Core types for the Tollgate request gateway.
//!
//! This crate is the bottom of the workspace dependency graph:
//!
//! ```text
//! tollgate-types      : identifiers, Method/Action, Role, Category  ◄── HERE
//!     ↑           ↑
//! tollgate-envelope   tollgate-auth
//! (messages)          (RoleResolver, PermissionPolicy)
//!     ↑           ↑
//!     tollgate-runtime (broker, services, storage, gateway)
//! ```
//!
//! # Identity vs. privilege
//!
//! Types here describe *what a message claims*, never what it is allowed
//! to do. A [`Role`] is only ever produced by the resolver in
//! `tollgate-auth` from the credential token; an envelope cannot assert
//! its own role, and every entitlement check recomputes it.
//!
//! # Error Handling
//!
//! All tollgate error enums implement [`ErrorCode`] for unified handling:
//!
//! ```
//! use tollgate_types::{Category, ErrorCode};
//!
//! let err = Category::parse("minerals").unwrap_err();
//! assert_eq!(err.code(), "TYPE_UNMAPPED_CATEGORY");
//! assert!(!err.is_recoverable());
//! ```

mod category;
mod error;
mod id;
mod method;
mod role;

pub use category::{Category, UnmappedCategory};
pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{DeliveryId, RecordId, RequestId};
pub use method::{Action, Method};
pub use role::Role;
