use std::fs;

use pingfile::config::{ConfigShape, Format, RequestGroup, RequestSpec, resolve};
use tempfile::TempDir;

/// 同一份 group 在三种格式下解析结果一致
#[test]
fn test_formats_resolve_identically() {
    let mut spec = RequestSpec::new("/users").with_method("POST");
    spec.name = "create".to_string();
    spec.enabled = Some(false);
    spec.body = Some(serde_json::from_str(r#"{"name":"bob","age":3}"#).unwrap());
    spec.include_cookies = Some(false);

    let group = RequestGroup {
        name: "users".to_string(),
        description: "user api".to_string(),
        version: "1".to_string(),
        base_url: "https://api.example".to_string(),
        requests: vec![spec, RequestSpec::new("/health").with_method("GET")],
    };

    let temp_dir = TempDir::new().unwrap();
    let mut shapes = Vec::new();
    for name in ["group.json", "group.yaml", "group.yml", "group.pkfile"] {
        let path = temp_dir.path().join(name);
        let format = Format::from_path(&path).unwrap();
        fs::write(&path, format.encode(&group).unwrap()).unwrap();
        shapes.push(resolve(&path).unwrap());
    }

    let ConfigShape::Group(resolved) = &shapes[0] else {
        panic!("expected group");
    };
    assert_eq!(resolved.requests[0].url, "https://api.example/users");
    assert_eq!(resolved.requests[1].url, "https://api.example/health");
    assert!(!resolved.requests[0].is_enabled());
    assert!(resolved.requests[1].is_enabled());

    for shape in &shapes[1..] {
        assert_eq!(shape, &shapes[0]);
    }
}

/// 没有 `apis` 的文件按单请求解析
#[test]
fn test_single_request_shape() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("single.yaml");
    fs::write(
        &path,
        "name: ping\nurl: https://api.example/ping\nheaders:\n  Method: GET\n  Accept: text/plain\n",
    )
    .unwrap();

    match resolve(&path).unwrap() {
        ConfigShape::Single(spec) => {
            assert_eq!(spec.method(), "GET");
            assert_eq!(spec.url, "https://api.example/ping");
            assert_eq!(spec.real_headers().count(), 1);
        }
        other => panic!("expected single request, got {:?}", other),
    }
}

/// 空 group 且没有 url 时按单请求解析，url 为空
#[test]
fn test_empty_group_without_url_resolves_to_empty_single() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("empty.json");
    fs::write(&path, r#"{"name":"nothing","apis":[]}"#).unwrap();

    match resolve(&path).unwrap() {
        ConfigShape::Single(spec) => assert!(spec.url.is_empty()),
        other => panic!("expected single request, got {:?}", other),
    }
}

/// group 成员缺少 url 时解析为 baseUrl
#[test]
fn test_group_member_without_url_uses_base_url() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("group.yaml");
    fs::write(
        &path,
        "baseUrl: https://api.example/root\napis:\n  - headers:\n      Method: GET\n  - url: /b\n    headers:\n      Method: GET\n",
    )
    .unwrap();

    let ConfigShape::Group(group) = resolve(&path).unwrap() else {
        panic!("expected group");
    };
    assert_eq!(group.requests[0].url, "https://api.example/root");
    assert_eq!(group.requests[1].url, "https://api.example/root/b");
}
