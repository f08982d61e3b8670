//! # tollgate-runtime
//!
//! Asynchronous runtime for the tollgate request gateway. Wires the
//! checkpoint pipeline out of named, bounded queues and runs one task
//! per consumer loop.
//!
//! ## Pipeline
//!
//! ```text
//!            raw JSON
//!               |
//!               v
//!          [ ingress ]
//!               |
//!       ControllerRouter ---- malformed ----> [ output ]
//!               |
//!               v
//!        [ coarse-check ]
//!               |
//!       EntitlementEngine --- denied -------> [ rejected ] + [ output ]
//!               |
//!               v
//!        [ coarse-pass ]
//!               |
//!       ControllerRouter (non-CRUD dropped)
//!               |
//!               v
//!        [ data-ingress ]
//!               |
//!          DataService ------ unmapped -----> [ output ]
//!               |
//!               v
//!       [ category-check ]
//!               |
//!       EntitlementEngine --- denied -------> [ rejected ] + [ output ]
//!               |
//!               v
//!        [ category-pass ]
//!               |
//!          DataService (executes against RecordStore)
//!               |
//!               v
//!           [ output ]
//! ```
//!
//! ## Modules
//!
//! | Module    | Provides                                              |
//! |-----------|-------------------------------------------------------|
//! | `broker`  | Named bounded queues, ack modes, redelivery           |
//! | `storage` | `RecordStore` trait and the in-memory backend         |
//! | `services`| Controller, entitlement, and data consumer loops      |
//! | `output`  | Terminal sink with per-request waiting                |
//! | `config`  | Layered gateway configuration                         |
//! | `gateway` | One-call wiring of the whole pipeline                 |

pub mod broker;
pub mod config;
pub mod gateway;
pub mod output;
pub mod services;
pub mod storage;

pub use broker::{
    queue, AckMode, BrokerError, Delivery, QueueReceiver, QueueSender, DEFAULT_MAX_REDELIVERIES,
};
pub use config::{ConfigError, ConfigLoader, GatewayConfig};
pub use gateway::{Gateway, GatewayHandle};
pub use output::OutputSink;
pub use services::{ControllerRouter, DataService, Decision, EntitlementEngine};
pub use storage::{MemoryStore, NewRecord, RecordStore, StorageError};
