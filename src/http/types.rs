use std::path::PathBuf;
use std::str::FromStr;

/// 支持的凭据类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// RFC 7617 `user:pass` Base64 编码
    Basic,
    /// `Authorization: Bearer <token>`
    Bearer,
}

impl FromStr for CredentialKind {
    type Err = BuildError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(CredentialKind::Basic),
            "bearer" => Ok(CredentialKind::Bearer),
            _ => Err(BuildError::UnsupportedCredential(s.to_string())),
        }
    }
}

/// 构建请求时的错误，发生在任何网络操作之前
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("HTTP method not specified")]
    MissingMethod,

    #[error("URL not specified")]
    MissingUrl,

    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header '{name}': {message}")]
    InvalidHeader { name: String, message: String },

    #[error("unsupported credential type: '{0}'")]
    UnsupportedCredential(String),

    #[error("failed to open file {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create request: {0}")]
    Request(#[source] reqwest::Error),
}

/// 传输层错误（DNS、连接、TLS、读取响应体）
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("failed to initialise HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read response from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}
