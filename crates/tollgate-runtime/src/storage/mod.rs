//! Record persistence behind the gateway.
//!
//! The executor talks to storage only through [`RecordStore`], so the
//! backend is swappable. The crate ships [`MemoryStore`]; a process
//! embedding the gateway can bring its own.
//!
//! Every operation is atomic on its own: an `Err` leaves the store
//! exactly as it was.

mod error;
mod memory;
mod store;

pub use error::StorageError;
pub use memory::MemoryStore;
pub use store::{NewRecord, RecordStore};
