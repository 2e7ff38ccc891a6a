use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::config::{Format, RequestSpec};
use crate::persist::PersistenceError;
use crate::persist::model::SavedExchange;

/// 按目标文件扩展名选择编码并写入（覆盖已有内容）
pub fn save_response(path: &Path, exchange: &SavedExchange) -> Result<(), PersistenceError> {
    let format = Format::from_path(path)
        .map_err(|extension| PersistenceError::UnsupportedExtension { extension })?;

    let content = format
        .encode(exchange)
        .map_err(|message| PersistenceError::Encode {
            path: path.to_path_buf(),
            message,
        })?;

    let io_err = |source: std::io::Error| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    fs::write(path, content).map_err(io_err)
}

/// 未指定 `filePath` 时的默认文件名：
/// `response_<METHOD>_<url>_<YYYYmmdd_HHMMSS>.pkfile`，URL 中的 `/` 和 `:` 替换为 `_`
pub fn default_response_path(dir: &Path, spec: &RequestSpec, now: DateTime<Local>) -> PathBuf {
    let url: String = spec
        .url
        .chars()
        .map(|c| if c == '/' || c == ':' { '_' } else { c })
        .collect();
    let file_name = format!(
        "response_{}_{}_{}.pkfile",
        spec.method(),
        url,
        now.format("%Y%m%d_%H%M%S")
    );
    dir.join(file_name)
}

/// `filePath` 优先，否则在输出目录下生成默认文件名
pub fn response_path_for(spec: &RequestSpec, dir: &Path) -> PathBuf {
    match &spec.response_file_path {
        Some(path) if !path.as_os_str().is_empty() => path.clone(),
        _ => default_response_path(dir, spec, Local::now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ExecutionResult;
    use chrono::TimeZone;
    use std::collections::BTreeMap;
    use std::time::Duration;
    use tempfile::TempDir;

    fn exchange() -> SavedExchange {
        let mut spec = RequestSpec::new("https://api.example/users").with_method("POST");
        spec.body = Some(serde_json::json!({"name": "alice"}).as_object().cloned().unwrap());

        let mut headers = BTreeMap::new();
        headers.insert(
            "content-type".to_string(),
            vec!["application/json".to_string()],
        );
        let result = ExecutionResult::new(
            201,
            "Created",
            headers,
            br#"{"id":1}"#.to_vec(),
            Duration::from_millis(3),
        );
        SavedExchange::new(&spec, &result)
    }

    #[test]
    fn test_save_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");

        save_response(&path, &exchange()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["request"]["URL"], "https://api.example/users");
        assert_eq!(value["request"]["Headers"]["Method"], "POST");
        assert_eq!(value["request"]["Body"]["name"], "alice");
        assert_eq!(value["response"]["Status"], "201 Created");
        assert_eq!(value["response"]["Body"], r#"{"id":1}"#);
    }

    #[test]
    fn test_save_yaml_and_pkfile() {
        let dir = TempDir::new().unwrap();

        let yaml = dir.path().join("out.yaml");
        save_response(&yaml, &exchange()).unwrap();
        let back: SavedExchange =
            serde_yaml::from_str(&fs::read_to_string(&yaml).unwrap()).unwrap();
        assert_eq!(back, exchange());

        let pk = dir.path().join("out.pkfile");
        save_response(&pk, &exchange()).unwrap();
        let back: SavedExchange =
            serde_json::from_str(&fs::read_to_string(&pk).unwrap()).unwrap();
        assert_eq!(back, exchange());
    }

    #[test]
    fn test_save_overwrites_longer_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        fs::write(&path, "x".repeat(10_000)).unwrap();

        save_response(&path, &exchange()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&content).is_ok());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let err = save_response(&dir.path().join("out.txt"), &exchange()).unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::UnsupportedExtension { ref extension } if extension == ".txt"
        ));
        assert!(!dir.path().join("out.txt").exists());
    }

    #[test]
    fn test_default_response_path() {
        let spec = RequestSpec::new("https://api.example/users/1").with_method("GET");
        let now = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();

        let path = default_response_path(Path::new("out"), &spec, now);
        assert_eq!(
            path,
            Path::new("out").join("response_GET_https___api.example_users_1_20240305_140709.pkfile")
        );
    }

    #[test]
    fn test_explicit_file_path_wins() {
        let mut spec = RequestSpec::new("https://api.example/users").with_method("GET");
        spec.response_file_path = Some(PathBuf::from("saved/users.yaml"));

        assert_eq!(
            response_path_for(&spec, Path::new("ignored")),
            PathBuf::from("saved/users.yaml")
        );
    }
}
