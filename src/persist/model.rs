use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use cookie::Cookie;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::RequestSpec;
use crate::http::ExecutionResult;
use crate::persist::serialization;

/// cookie jar 中的一条记录，jar 内按 name 唯一
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieRecord {
    pub name: String,

    #[serde(default)]
    pub value: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,

    /// 以 RFC1123 字符串存储
    #[serde(
        rename = "expires",
        default,
        skip_serializing_if = "Option::is_none",
        with = "serialization::rfc1123_option"
    )]
    pub expiry: Option<DateTime<Utc>>,

    #[serde(default)]
    pub secure: bool,

    #[serde(default)]
    pub http_only: bool,
}

impl CookieRecord {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: String::new(),
            domain: String::new(),
            expiry: None,
            secure: false,
            http_only: false,
        }
    }

    /// 解析一个 `Set-Cookie` 值，`Max-Age` 优先于 `Expires`
    pub fn from_set_cookie(header: &str) -> Option<Self> {
        let parsed = Cookie::parse(header).ok()?;

        let expiry = parsed
            .max_age()
            .and_then(|age| TimeDelta::try_seconds(age.whole_seconds()))
            .and_then(|age| Utc::now().checked_add_signed(age))
            .or_else(|| {
                parsed
                    .expires_datetime()
                    .and_then(|t| DateTime::from_timestamp(t.unix_timestamp(), 0))
            });

        Some(Self {
            name: parsed.name().to_string(),
            value: parsed.value().to_string(),
            path: parsed.path().unwrap_or_default().to_string(),
            domain: parsed.domain().unwrap_or_default().to_string(),
            expiry,
            secure: parsed.secure().unwrap_or(false),
            http_only: parsed.http_only().unwrap_or(false),
        })
    }

    /// name 和 value 都非空才会被发送
    pub fn is_sendable(&self) -> bool {
        !self.name.is_empty() && !self.value.is_empty()
    }

    /// `name=value`
    pub fn pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// 保存到响应文件中的请求/响应快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedExchange {
    pub request: RequestDetails,
    pub response: ResponseDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestDetails {
    #[serde(rename = "URL")]
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseDetails {
    pub status: String,
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: String,
}

impl SavedExchange {
    pub fn new(spec: &RequestSpec, result: &ExecutionResult) -> Self {
        Self {
            request: RequestDetails {
                url: spec.url.clone(),
                headers: spec.headers.clone(),
                body: spec.body.clone(),
            },
            response: ResponseDetails {
                status: result.status_line(),
                headers: result.headers().clone(),
                body: result.body_text().into_owned(),
            },
        }
    }
}
