pub mod config;
pub mod error;
pub mod http;
pub mod logger;
pub mod persist;
pub mod runner;
pub mod utils;

// Re-export commonly used types
pub use error::{PingfileError, Result};
