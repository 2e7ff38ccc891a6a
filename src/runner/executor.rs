use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::PingfileError;
use crate::config::{ConfigShape, RequestSpec, resolve};
use crate::http::{Dispatcher, ExecutionResult};
use crate::persist::{CookieJar, CookieRecord, SavedExchange, response_path_for, save_response};
use crate::runner::reporter::Reporter;
use crate::runner::types::{FileReport, RequestOutcome};

/// 单次执行的持久化选项
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// 等同于每个请求都设置了 `saveResponse: true`
    pub save_responses: bool,
    /// 默认响应文件所在目录
    pub response_dir: PathBuf,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            save_responses: false,
            response_dir: PathBuf::from("."),
        }
    }
}

/// 执行一个文件中的全部请求：resolve → build → dispatch → 持久化
pub struct ApiExecutor {
    dispatcher: Dispatcher,
    jar: Arc<CookieJar>,
    reporter: Reporter,
    options: ExecuteOptions,
}

impl ApiExecutor {
    pub fn new(
        dispatcher: Dispatcher,
        jar: Arc<CookieJar>,
        reporter: Reporter,
        options: ExecuteOptions,
    ) -> Self {
        Self {
            dispatcher,
            jar,
            reporter,
            options,
        }
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// 执行一个文件，输出全部写入返回的报告中
    ///
    /// group 中某个请求失败不会影响后续请求。
    pub async fn run_file(&self, path: &Path) -> FileReport {
        let mut report = FileReport::new(path.to_path_buf());

        let shape = match resolve(path) {
            Ok(shape) => shape,
            Err(e) => {
                error!(file = %path.display(), "Error parsing file: {}", e);
                let message = PingfileError::from(e).to_string();
                self.reporter
                    .write_failure(&mut report.output, path, "parse", &message);
                report.outcomes.push(RequestOutcome::failed(
                    path.to_path_buf(),
                    None,
                    String::new(),
                    String::new(),
                    message,
                ));
                return report;
            }
        };

        match shape {
            ConfigShape::Single(spec) => {
                let outcome = self.execute(path, &spec, &mut report.output).await;
                report.outcomes.push(outcome);
            }
            ConfigShape::Group(group) => {
                info!(
                    file = %path.display(),
                    group = %group.name,
                    requests = group.requests.len(),
                    "Running request group"
                );
                for spec in &group.requests {
                    if !spec.is_enabled() {
                        info!(file = %path.display(), url = %spec.url, "Request disabled, skipping");
                        self.reporter.write_skipped(&mut report.output, path, spec);
                        report.outcomes.push(RequestOutcome::skipped(
                            path.to_path_buf(),
                            spec.display_name().map(str::to_string),
                            spec.method().to_string(),
                            spec.url.clone(),
                        ));
                        continue;
                    }

                    let outcome = self.execute(path, spec, &mut report.output).await;
                    report.outcomes.push(outcome);
                }
            }
        }

        report
    }

    /// 执行单个请求
    pub async fn execute(&self, source: &Path, spec: &RequestSpec, out: &mut String) -> RequestOutcome {
        let method = spec.method().to_string();
        let url = spec.url.clone();
        let name = spec.display_name().map(str::to_string);

        let cookies = if spec.includes_cookies() {
            self.jar.snapshot()
        } else {
            Vec::new()
        };

        let request = match self.dispatcher.build(spec, &cookies).await {
            Ok(request) => request,
            Err(e) => return self.fail(source, name, method, url, out, e.into()),
        };

        let result = match self.dispatcher.dispatch(request).await {
            Ok(result) => result,
            Err(e) => return self.fail(source, name, method, url, out, e.into()),
        };

        self.reporter.write_result(out, source, spec, &result);

        if self.options.save_responses || spec.save_response {
            self.persist_response(spec, &result, out);
        }

        self.store_cookies(&result, out);

        if result.is_error() {
            error!(
                file = %source.display(),
                %url,
                status = result.status_code(),
                "Request returned {}",
                result.status_line()
            );
        }

        self.reporter.write_end(out);

        RequestOutcome::executed(
            source.to_path_buf(),
            name,
            method,
            url,
            result.status_code(),
            result.duration(),
        )
    }

    fn fail(
        &self,
        source: &Path,
        name: Option<String>,
        method: String,
        url: String,
        out: &mut String,
        err: PingfileError,
    ) -> RequestOutcome {
        error!(file = %source.display(), %url, "Request execution failed: {}", err);
        let target = format!("{} {}", method, url);
        self.reporter
            .write_failure(out, source, target.trim(), &err.to_string());
        RequestOutcome::failed(source.to_path_buf(), name, method, url, err.to_string())
    }

    /// 保存失败只告警，不影响请求本身的成功
    fn persist_response(&self, spec: &RequestSpec, result: &ExecutionResult, out: &mut String) {
        let path = response_path_for(spec, &self.options.response_dir);
        match save_response(&path, &SavedExchange::new(spec, result)) {
            Ok(()) => self.reporter.write_saved(out, &path),
            Err(e) => {
                warn!(path = %path.display(), "Failed to save response: {}", e);
                self.reporter
                    .write_warning(out, &format!("failed to save response: {}", e));
            }
        }
    }

    fn store_cookies(&self, result: &ExecutionResult, out: &mut String) {
        let received: Vec<CookieRecord> = result
            .set_cookie_headers()
            .iter()
            .filter_map(|h| CookieRecord::from_set_cookie(h))
            .collect();
        if received.is_empty() {
            return;
        }

        if let Err(e) = self.jar.merge(received) {
            warn!(jar = %self.jar.path().display(), "Failed to save cookies: {}", e);
            self.reporter
                .write_warning(out, &format!("failed to save cookies: {}", e));
        }
    }
}
