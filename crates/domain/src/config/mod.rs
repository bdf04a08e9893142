//! Configuration module for delve-dns
//!
//! - `root`: Main configuration and CLI overrides
//! - `resolver`: Resolution settings, forward zones and root hints
//! - `static_records`: Permanent local records
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod errors;
pub mod logging;
pub mod resolver;
pub mod root;
pub mod static_records;

pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use resolver::{ForwardZone, ResolverConfig, ROOT_HINTS};
pub use root::{CliOverrides, Config};
pub use static_records::StaticRecord;
