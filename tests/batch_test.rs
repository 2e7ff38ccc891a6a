use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pingfile::http::Dispatcher;
use pingfile::persist::{CookieJar, read_jar};
use pingfile::runner::{
    ApiExecutor, BatchRunner, BatchSummary, ExecuteOptions, ExecutionMode, OutcomeKind, Reporter,
};
use pingfile::utils::ResponseFormat;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 收集 BatchRunner 的输出
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn runner(dir: &Path, mode: ExecutionMode, buffer: SharedBuffer) -> BatchRunner {
    let jar = CookieJar::empty(dir.join("root.cookie.pkfile"));
    let executor = ApiExecutor::new(
        Dispatcher::new().unwrap(),
        Arc::new(jar),
        Reporter::new(ResponseFormat::Compact, false),
        ExecuteOptions::default(),
    );
    BatchRunner::new(executor, mode).with_output(Box::new(buffer))
}

fn write_get(dir: &Path, name: &str, url: String) -> PathBuf {
    let file = dir.join(name);
    fs::write(
        &file,
        format!(r#"{{"url":"{}","headers":{{"Method":"GET"}}}}"#, url),
    )
    .unwrap();
    file
}

#[tokio::test]
async fn test_sequential_batch_keeps_order() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let files: Vec<PathBuf> = (0..3)
        .map(|i| {
            write_get(
                temp_dir.path(),
                &format!("f{}.json", i),
                format!("{}/seq/{}", mock_server.uri(), i),
            )
        })
        .collect();

    let buffer = SharedBuffer::default();
    let reports = runner(temp_dir.path(), ExecutionMode::Sequential, buffer.clone())
        .run(&files)
        .await;

    let paths: Vec<&PathBuf> = reports.iter().map(|r| &r.path).collect();
    assert_eq!(paths, files.iter().collect::<Vec<_>>());

    let output = buffer.contents();
    let first = output.find("f0.json").unwrap();
    let second = output.find("f1.json").unwrap();
    let third = output.find("f2.json").unwrap();
    assert!(first < second && second < third);
}

/// 并发执行时每个文件的输出完整且不交错，报告按输入顺序返回
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_batch_reports_in_input_order() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(150)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let mut files = Vec::new();
    for i in 0..6 {
        let endpoint = if i % 2 == 0 { "slow" } else { "fast" };
        files.push(write_get(
            temp_dir.path(),
            &format!("c{}.json", i),
            format!("{}/{}", mock_server.uri(), endpoint),
        ));
    }

    let buffer = SharedBuffer::default();
    let reports = runner(
        temp_dir.path(),
        ExecutionMode::Concurrent { workers: 3 },
        buffer.clone(),
    )
    .run(&files)
    .await;

    assert_eq!(reports.len(), 6);
    for (report, file) in reports.iter().zip(&files) {
        assert_eq!(&report.path, file);
        assert_eq!(report.outcomes[0].status, Some(200));
    }

    // 每个文件的输出以连续块出现
    let output = buffer.contents();
    for report in &reports {
        assert!(output.contains(&report.output));
    }

    let summary = BatchSummary::from_reports(&reports);
    assert_eq!(summary.total, 6);
    assert_eq!(summary.succeeded, 6);
    assert!(!summary.has_errors());
}

#[tokio::test]
async fn test_batch_continues_after_bad_file() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let broken = temp_dir.path().join("broken.json");
    fs::write(&broken, "{ not json").unwrap();
    let missing = temp_dir.path().join("missing.yaml");
    let good = write_get(
        temp_dir.path(),
        "good.json",
        format!("{}/status", mock_server.uri()),
    );

    let files = vec![broken, missing, good];
    let reports = runner(
        temp_dir.path(),
        ExecutionMode::Concurrent { workers: 2 },
        SharedBuffer::default(),
    )
    .run(&files)
    .await;

    assert_eq!(reports[0].outcomes[0].kind, OutcomeKind::Failed);
    assert_eq!(reports[1].outcomes[0].kind, OutcomeKind::Failed);
    assert_eq!(reports[2].outcomes[0].status, Some(503));

    let summary = BatchSummary::from_reports(&reports);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.http_errors, 1);
    assert!(summary.has_errors());
}

/// 多个 worker 同时写入 jar 时不会丢失 cookie
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_cookie_writes_are_merged() {
    let mock_server = MockServer::start().await;
    for i in 0..8 {
        Mock::given(method("GET"))
            .and(path(format!("/c/{}", i)))
            .respond_with(
                ResponseTemplate::new(200).insert_header("set-cookie", format!("k{}=v{}", i, i)),
            )
            .mount(&mock_server)
            .await;
    }

    let temp_dir = TempDir::new().unwrap();
    let files: Vec<PathBuf> = (0..8)
        .map(|i| {
            write_get(
                temp_dir.path(),
                &format!("k{}.json", i),
                format!("{}/c/{}", mock_server.uri(), i),
            )
        })
        .collect();

    runner(
        temp_dir.path(),
        ExecutionMode::Concurrent { workers: 4 },
        SharedBuffer::default(),
    )
    .run(&files)
    .await;

    let stored = read_jar(&temp_dir.path().join("root.cookie.pkfile")).unwrap();
    assert_eq!(stored.len(), 8);
    for i in 0..8 {
        assert!(
            stored
                .iter()
                .any(|c| c.name == format!("k{}", i) && c.value == format!("v{}", i))
        );
    }
}
