use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::types::{ConfigShape, RequestGroup, RequestSpec};

/// 支持的文件格式，按扩展名选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    /// `.pkfile`，内容与 JSON 兼容
    Pkfile,
}

impl Format {
    /// 根据扩展名（不区分大小写）识别格式；无法识别时返回小写的扩展名
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            "pkfile" => Ok(Format::Pkfile),
            _ => Err(if extension.is_empty() {
                String::new()
            } else {
                format!(".{}", extension)
            }),
        }
    }

    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, String> {
        match self {
            Format::Json | Format::Pkfile => {
                serde_json::from_slice(bytes).map_err(|e| e.to_string())
            }
            Format::Yaml => serde_yaml::from_slice(bytes).map_err(|e| e.to_string()),
        }
    }

    /// JSON 和 pkfile 使用带缩进的 JSON，YAML 使用 serde_yaml
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<String, String> {
        match self {
            Format::Json | Format::Pkfile => {
                serde_json::to_string_pretty(value).map_err(|e| e.to_string())
            }
            Format::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
        }
    }
}

/// 先尝试 group 形态，得到非空的请求列表才采用；否则回退到单请求形态
///
/// 两种形态都失败时返回单请求形态的错误信息。
pub fn decode_shape(format: Format, bytes: &[u8]) -> Result<ConfigShape, String> {
    if let Ok(group) = format.decode::<RequestGroup>(bytes)
        && !group.requests.is_empty()
    {
        return Ok(ConfigShape::Group(group));
    }

    format
        .decode::<RequestSpec>(bytes)
        .map(ConfigShape::Single)
}
