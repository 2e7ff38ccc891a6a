pub mod env;
pub mod format;
pub mod resolver;
pub mod settings;
pub mod types;

// Re-export commonly used types
pub use format::Format;
pub use resolver::resolve;
pub use settings::{RunSettings, SettingsLoader};
pub use types::{
    Attachment, ConfigError, ConfigShape, Credentials, RequestGroup, RequestSpec, absolute_url,
};
