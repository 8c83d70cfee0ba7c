//! Loggly Log Adapter Library
//!
//! This library forwards container log records to Loggly, one HTTP event per
//! record, enriched with metadata taken from the container's environment.

pub mod adapter;
pub mod config;
pub mod environment;
pub mod errors;
pub mod message;
pub mod router;
pub mod source;
pub mod transport;

pub use adapter::{InstanceIdSource, LogAdapter, LogStream, LogglyAdapter};
pub use config::Config;
pub use environment::EnvironmentIndex;
pub use errors::{AdapterError, Result};
pub use message::{ContainerInfo, LogRecord, OutboundEvent};
pub use router::{AdapterRegistry, Route};
