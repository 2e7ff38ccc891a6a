use std::path::PathBuf;
use std::time::Duration;

/// 单个请求的最终状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// 已发送并收到响应（包括 >= 400 的状态码）
    Executed,
    /// group 成员显式 `run: false`
    Skipped,
    /// 解析、构建或网络失败
    Failed,
}

/// 单个请求的执行结果
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    /// 来源文件
    pub source: PathBuf,

    /// 请求名称（如果有）
    pub name: Option<String>,

    /// HTTP 方法
    pub method: String,

    /// 请求 URL（group 内为拼接后的绝对 URL）
    pub url: String,

    /// 响应状态码（如果收到响应）
    pub status: Option<u16>,

    pub kind: OutcomeKind,

    /// 错误消息（失败或状态码 >= 400 时）
    pub error: Option<String>,

    /// 执行耗时
    pub duration: Duration,
}

impl RequestOutcome {
    pub fn executed(
        source: PathBuf,
        name: Option<String>,
        method: String,
        url: String,
        status: u16,
        duration: Duration,
    ) -> Self {
        let error = if status >= 400 {
            Some(format!("HTTP status {}", status))
        } else {
            None
        };

        Self {
            source,
            name,
            method,
            url,
            status: Some(status),
            kind: OutcomeKind::Executed,
            error,
            duration,
        }
    }

    pub fn failed(
        source: PathBuf,
        name: Option<String>,
        method: String,
        url: String,
        error: String,
    ) -> Self {
        Self {
            source,
            name,
            method,
            url,
            status: None,
            kind: OutcomeKind::Failed,
            error: Some(error),
            duration: Duration::ZERO,
        }
    }

    pub fn skipped(source: PathBuf, name: Option<String>, method: String, url: String) -> Self {
        Self {
            source,
            name,
            method,
            url,
            status: None,
            kind: OutcomeKind::Skipped,
            error: None,
            duration: Duration::ZERO,
        }
    }

    /// 收到了 >= 400 的响应
    pub fn is_http_error(&self) -> bool {
        self.status.is_some_and(|s| s >= 400)
    }

    /// 失败或 HTTP 错误都算作错误
    pub fn is_error(&self) -> bool {
        self.kind == OutcomeKind::Failed || self.is_http_error()
    }
}

/// 一个输入文件的完整报告
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,

    /// 该文件的全部控制台输出，作为整体打印
    pub output: String,

    /// 按声明顺序排列
    pub outcomes: Vec<RequestOutcome>,
}

impl FileReport {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            output: String::new(),
            outcomes: Vec::new(),
        }
    }
}

/// 整批执行的摘要
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub files: usize,
    pub total: usize,
    pub succeeded: usize,
    pub http_errors: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_duration: Duration,
}

impl BatchSummary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let outcomes: Vec<&RequestOutcome> = reports.iter().flat_map(|r| &r.outcomes).collect();

        let failed = outcomes
            .iter()
            .filter(|o| o.kind == OutcomeKind::Failed)
            .count();
        let skipped = outcomes
            .iter()
            .filter(|o| o.kind == OutcomeKind::Skipped)
            .count();
        let http_errors = outcomes.iter().filter(|o| o.is_http_error()).count();

        Self {
            files: reports.len(),
            total: outcomes.len(),
            succeeded: outcomes.len() - failed - skipped - http_errors,
            http_errors,
            failed,
            skipped,
            total_duration: outcomes.iter().map(|o| o.duration).sum(),
        }
    }

    /// 是否存在失败或 >= 400 的响应
    pub fn has_errors(&self) -> bool {
        self.failed > 0 || self.http_errors > 0
    }
}
