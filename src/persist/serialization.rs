use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// `Expires` 使用的 RFC1123 格式，例如 `Mon, 02 Jan 2006 15:04:05 GMT`
const RFC1123: &str = "%a, %d %b %Y %H:%M:%S GMT";

pub fn format_rfc1123(time: &DateTime<Utc>) -> String {
    time.format(RFC1123).to_string()
}

/// 解析失败返回 None
pub fn parse_rfc1123(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(s.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

pub mod rfc1123_option {
    use super::*;

    pub fn serialize<S>(time: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => serializer.serialize_str(&format_rfc1123(t)),
            None => serializer.serialize_none(),
        }
    }

    /// 无法解析的时间按未设置处理
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_rfc1123))
    }
}
