//! Foundational error handling, tracing setup, and HTTP plumbing shared by
//! the mockademy crates.

pub mod error;
pub mod http;
pub mod server;
pub mod tracing;

// Re-export commonly used types for convenience
pub use error::{ErrorKind, MockademyError, MockademyResult, ResultExt};
