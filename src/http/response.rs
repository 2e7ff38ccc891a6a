use std::borrow::Cow;
use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, SET_COOKIE};

/// 一次请求的完整结果，创建后不再修改
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    status_code: u16,
    status_text: String,
    headers: BTreeMap<String, Vec<String>>,
    body: Vec<u8>,
    duration: Duration,
}

impl ExecutionResult {
    pub fn new(
        status_code: u16,
        status_text: impl Into<String>,
        headers: BTreeMap<String, Vec<String>>,
        body: Vec<u8>,
        duration: Duration,
    ) -> Self {
        Self {
            status_code,
            status_text: status_text.into(),
            headers,
            body,
            duration,
        }
    }

    /// 从 reqwest 的响应部件构造，header 名统一小写，同名多值按出现顺序保留
    pub fn from_parts(
        status: StatusCode,
        headers: &HeaderMap,
        body: Vec<u8>,
        duration: Duration,
    ) -> Self {
        let mut collected: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in headers {
            collected
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        Self::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown"),
            collected,
            body,
            duration,
        )
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// 形如 `404 Not Found`
    pub fn status_line(&self) -> String {
        format!("{} {}", self.status_code, self.status_text)
    }

    pub fn headers(&self) -> &BTreeMap<String, Vec<String>> {
        &self.headers
    }

    /// 按名称查找 header（不区分大小写）
    pub fn header(&self, name: &str) -> Option<&[String]> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
    }

    /// 所有 `Set-Cookie` 的原始值
    pub fn set_cookie_headers(&self) -> &[String] {
        self.header(SET_COOKIE.as_str()).unwrap_or_default()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status_code)
    }

    pub fn is_client_error(&self) -> bool {
        (400..=499).contains(&self.status_code)
    }

    pub fn is_server_error(&self) -> bool {
        (500..=599).contains(&self.status_code)
    }

    /// 状态码 >= 400，调用方据此额外报告错误
    pub fn is_error(&self) -> bool {
        self.status_code >= 400
    }
}
