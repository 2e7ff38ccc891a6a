use std::path::PathBuf;

use pingfile::config::{ConfigError, resolve};
use pingfile::http::BuildError;
use pingfile::persist::PersistenceError;
use pingfile::{PingfileError, Result};

#[test]
fn test_unsupported_format_lists_supported() {
    let err = ConfigError::UnsupportedFormat {
        extension: ".txt".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "unsupported file format '.txt'; supported formats: json, yaml/yml, pkfile"
    );
}

#[test]
fn test_config_error_wrapped() {
    let err: PingfileError = ConfigError::NotFound(PathBuf::from("a.json")).into();
    assert_eq!(err.to_string(), "配置错误: file not found: a.json");
}

#[test]
fn test_build_error_wrapped() {
    let err: PingfileError = BuildError::UnsupportedCredential("digest".to_string()).into();
    assert_eq!(
        err.to_string(),
        "请求构建失败: unsupported credential type: 'digest'"
    );
}

#[test]
fn test_persistence_error_wrapped() {
    let err: PingfileError = PersistenceError::UnsupportedExtension {
        extension: ".csv".to_string(),
    }
    .into();
    assert!(err.to_string().starts_with("持久化失败: "));
    assert!(err.to_string().contains(".csv"));
}

#[test]
fn test_resolver_errors_propagate_with_question_mark() {
    fn load(path: &str) -> Result<usize> {
        Ok(resolve(path)?.requests().len())
    }

    match load("") {
        Err(PingfileError::Config(ConfigError::EmptyPath)) => {}
        other => panic!("Expected EmptyPath, got {:?}", other),
    }
    match load("/definitely/not/here.json") {
        Err(PingfileError::Config(ConfigError::NotFound(_))) => {}
        other => panic!("Expected NotFound, got {:?}", other),
    }
}
