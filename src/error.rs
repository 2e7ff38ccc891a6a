use thiserror::Error;

use crate::config::ConfigError;
use crate::http::{BuildError, NetworkError};
use crate::persist::PersistenceError;

#[derive(Error, Debug)]
pub enum PingfileError {
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("请求构建失败: {0}")]
    Build(#[from] BuildError),

    #[error("网络错误: {0}")]
    Network(#[from] NetworkError),

    #[error("持久化失败: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Result type for pingfile crate
pub type Result<T> = std::result::Result<T, PingfileError>;
