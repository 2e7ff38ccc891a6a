use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::env::expand_env;

/// 携带 HTTP 方法的伪 header，发送前会被剔除
pub const METHOD_HEADER: &str = "Method";

/// 单个请求定义，与文件格式无关
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// 显式为 false 时跳过该请求（仅对 group 成员生效），未设置视为启用
    #[serde(rename = "run", alias = "enabled", default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// 请求 URL；group 内可为相对路径，缺失时为空，构建请求时报错
    #[serde(default)]
    pub url: String,

    /// Headers，其中 `Method` 为伪 header
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// JSON 请求体；有附件时作为 multipart 文本字段
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Map<String, Value>>,

    /// 附件列表，非空时强制使用 multipart/form-data
    #[serde(rename = "file", alias = "attachments", default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,

    /// 缺失时为零值，下游无需判空
    #[serde(default, skip_serializing_if = "Credentials::is_unset")]
    pub credentials: Credentials,

    #[serde(rename = "includeCredentials", default)]
    pub include_credentials: bool,

    /// 未设置时默认携带 cookie
    #[serde(
        rename = "includeCookie",
        alias = "includeCookies",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub include_cookies: Option<bool>,

    #[serde(rename = "saveResponse", default)]
    pub save_response: bool,

    #[serde(
        rename = "filePath",
        alias = "responseFilePath",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub response_file_path: Option<PathBuf>,
}

impl RequestSpec {
    /// 创建一个只有 URL 的请求定义
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            enabled: None,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            attachments: Vec::new(),
            credentials: Credentials::default(),
            include_credentials: false,
            include_cookies: None,
            save_response: false,
            response_file_path: None,
        }
    }

    /// 设置 `Method` 伪 header
    pub fn with_method(mut self, method: &str) -> Self {
        self.headers
            .insert(METHOD_HEADER.to_string(), method.to_string());
        self
    }

    /// HTTP 方法（来自伪 header，key 不区分大小写），缺失时返回空串
    pub fn method(&self) -> &str {
        self.headers
            .iter()
            .find(|(k, _)| is_method_header(k))
            .map(|(_, v)| v.trim())
            .unwrap_or("")
    }

    /// 需要真正发送的 headers（剔除 `Method`）
    pub fn real_headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .filter(|(k, _)| !is_method_header(k))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 只有显式 `run: false` 才会禁用
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// 只有显式 `includeCookie: false` 才不携带 cookie
    pub fn includes_cookies(&self) -> bool {
        self.include_cookies.unwrap_or(true)
    }

    /// 请求名称（如果有）
    pub fn display_name(&self) -> Option<&str> {
        if self.name.is_empty() {
            None
        } else {
            Some(&self.name)
        }
    }

    /// 对凭据字段做环境变量展开
    pub fn expand_credentials(&mut self) {
        let creds = &mut self.credentials;
        creds.username = expand_env(&creds.username);
        creds.password = expand_env(&creds.password);
        creds.token = expand_env(&creds.token);
    }
}

fn is_method_header(key: &str) -> bool {
    key.eq_ignore_ascii_case(METHOD_HEADER)
}

/// multipart 附件：字段名 + 本地文件路径
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub path: PathBuf,
}

/// 请求凭据，用户名/密码/token 支持 `$VAR` / `${VAR}` 展开
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// `basic` 或 `bearer`，其余值在构建请求时报错
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub token: String,
}

impl Credentials {
    /// 文件中没有给出任何凭据
    pub fn is_unset(&self) -> bool {
        self.kind.is_empty()
            && self.username.is_empty()
            && self.password.is_empty()
            && self.token.is_empty()
    }
}

/// 共享 base URL 的一组请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestGroup {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    #[serde(rename = "baseUrl", default)]
    pub base_url: String,

    #[serde(rename = "apis", alias = "requests", default)]
    pub requests: Vec<RequestSpec>,
}

impl RequestGroup {
    /// 将所有相对 URL 拼接到 base URL 上；已是绝对 URL 的保持不变
    pub fn resolve_urls(&mut self) {
        for request in &mut self.requests {
            request.url = absolute_url(&self.base_url, &request.url);
        }
    }
}

/// `http://` / `https://` 开头的 URL 原样返回，其余直接拼接在 base 后面
pub fn absolute_url(base_url: &str, url: &str) -> String {
    if has_http_scheme(url) {
        url.to_string()
    } else {
        format!("{}{}", base_url, url)
    }
}

fn has_http_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// 一个配置文件解析出的形态
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigShape {
    Single(RequestSpec),
    Group(RequestGroup),
}

impl ConfigShape {
    /// 展开凭据中的环境变量，并把 group 内的相对 URL 变成绝对 URL
    pub fn normalize(&mut self) {
        match self {
            ConfigShape::Single(spec) => spec.expand_credentials(),
            ConfigShape::Group(group) => {
                group.resolve_urls();
                for spec in &mut group.requests {
                    spec.expand_credentials();
                }
            }
        }
    }

    /// 按声明顺序返回所有请求
    pub fn requests(&self) -> Vec<&RequestSpec> {
        match self {
            ConfigShape::Single(spec) => vec![spec],
            ConfigShape::Group(group) => group.requests.iter().collect(),
        }
    }
}

/// 配置解析错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 路径为空
    #[error("file path is empty")]
    EmptyPath,

    /// 文件不存在
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// 不支持的扩展名
    #[error("unsupported file format '{extension}'; supported formats: json, yaml/yml, pkfile")]
    UnsupportedFormat { extension: String },

    /// 读取失败
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// group 和单请求两种形态都无法解析
    #[error("invalid format in {path}: {message}")]
    InvalidFormat { path: PathBuf, message: String },
}
