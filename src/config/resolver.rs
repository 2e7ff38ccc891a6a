use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::format::{Format, decode_shape};
use crate::config::types::{ConfigError, ConfigShape};

/// 读取并规范化一个请求定义文件
///
/// 1. 校验路径、存在性和扩展名
/// 2. 先按 group 解析，失败或为空则按单请求解析
/// 3. 展开凭据中的环境变量，拼接 group 内的相对 URL
pub fn resolve<P: AsRef<Path>>(path: P) -> Result<ConfigShape, ConfigError> {
    let path = path.as_ref();

    if path.as_os_str().is_empty() {
        return Err(ConfigError::EmptyPath);
    }

    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let format = Format::from_path(path)
        .map_err(|extension| ConfigError::UnsupportedFormat { extension })?;

    let bytes = fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut shape =
        decode_shape(format, &bytes).map_err(|message| ConfigError::InvalidFormat {
            path: path.to_path_buf(),
            message,
        })?;

    shape.normalize();

    debug!(
        file = %path.display(),
        requests = shape.requests().len(),
        "Resolved request file"
    );

    Ok(shape)
}
