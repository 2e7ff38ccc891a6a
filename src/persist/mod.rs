pub mod cookies;
pub mod model;
pub mod response;
pub mod serialization;

use std::path::PathBuf;

// Re-export commonly used types
pub use cookies::{CookieJar, merge_cookies, read_jar};
pub use model::{CookieRecord, RequestDetails, ResponseDetails, SavedExchange};
pub use response::{default_response_path, response_path_for, save_response};

/// 写入响应文件或 cookie jar 时的错误
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("unsupported file extension '{extension}', please use .json, .yaml or .pkfile")]
    UnsupportedExtension { extension: String },

    #[error("failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
