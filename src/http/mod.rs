pub mod builder;
pub mod client;
pub mod response;
pub mod types;

// Re-export commonly used types for convenient access
pub use builder::build_request;
pub use client::Dispatcher;
pub use response::ExecutionResult;
pub use types::{BuildError, CredentialKind, NetworkError};
