//! Gateway configuration.
//!
//! Settings resolve in three layers, later layers winning:
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  1. Built-in defaults                    │
//! ├──────────────────────────────────────────┤
//! │  2. TOML file (~/.tollgate/config.toml   │
//! │     or an explicit path)                 │
//! ├──────────────────────────────────────────┤
//! │  3. TOLLGATE_* environment variables     │
//! └──────────────────────────────────────────┘
//! ```

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::{ConfigLoader, GatewayConfig};
