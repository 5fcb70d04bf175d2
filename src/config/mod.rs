//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BalancerConfig (validated, immutable)
//!     → selector / forwarder / server built from it once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the endpoint set never changes at runtime
//! - Routing fields are required, plumbing fields default
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, read_config, ConfigError};
pub use schema::{BalancerConfig, HealthCheckConfig, ListenerConfig, ObservabilityConfig};
pub use validation::{validate_config, ValidationError};
