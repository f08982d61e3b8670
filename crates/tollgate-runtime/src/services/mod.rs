//! Pipeline consumer loops.
//!
//! Three services own all the stages between ingress and output:
//!
//! - [`ControllerRouter`] parses raw bodies and filters for CRUD.
//! - [`EntitlementEngine`] decides pass or deny; one instance runs the
//!   coarse tier, a second the category-scoped tier. The decision logic
//!   is shared, the tiers differ only in what the envelope carries.
//! - [`DataService`] derives the storage table and executes cleared
//!   requests against the [`RecordStore`](crate::storage::RecordStore).
//!
//! Each `serve`/`route` method is one consumer loop, intended to run in
//! its own task. All loops exit on the shutdown broadcast or when
//! their input queue closes.

mod controller;
mod data;
mod entitlement;

pub use controller::ControllerRouter;
pub use data::DataService;
pub use entitlement::{Decision, EntitlementEngine};
