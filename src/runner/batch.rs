use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::config::RunSettings;
use crate::runner::executor::ApiExecutor;
use crate::runner::types::FileReport;

/// 文件之间的调度方式；同一文件内的请求始终按顺序执行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Sequential,
    Concurrent { workers: usize },
}

impl ExecutionMode {
    pub fn from_settings(settings: &RunSettings) -> Self {
        if settings.multithread.unwrap_or(false) {
            ExecutionMode::Concurrent {
                workers: settings.workers_or_default(),
            }
        } else {
            ExecutionMode::Sequential
        }
    }
}

type SharedOutput = Arc<Mutex<Box<dyn Write + Send>>>;

/// 批量执行多个文件
///
/// 每个文件的输出先写入独立缓冲区，执行完后一次性写出，
/// 并发模式下不同文件的输出不会交错。
#[derive(Clone)]
pub struct BatchRunner {
    executor: Arc<ApiExecutor>,
    mode: ExecutionMode,
    output: SharedOutput,
}

impl BatchRunner {
    pub fn new(executor: ApiExecutor, mode: ExecutionMode) -> Self {
        Self {
            executor: Arc::new(executor),
            mode,
            output: Arc::new(Mutex::new(Box::new(std::io::stdout()))),
        }
    }

    /// 替换输出目标（默认 stdout）
    pub fn with_output(mut self, output: Box<dyn Write + Send>) -> Self {
        self.output = Arc::new(Mutex::new(output));
        self
    }

    pub fn executor(&self) -> &ApiExecutor {
        &self.executor
    }

    /// 执行所有文件，返回按输入顺序排列的报告
    pub async fn run(&self, files: &[PathBuf]) -> Vec<FileReport> {
        match self.mode {
            ExecutionMode::Sequential => self.run_sequential(files).await,
            ExecutionMode::Concurrent { workers } => self.run_concurrent(files, workers).await,
        }
    }

    async fn run_sequential(&self, files: &[PathBuf]) -> Vec<FileReport> {
        let mut reports = Vec::with_capacity(files.len());
        for path in files {
            let report = self.executor.run_file(path).await;
            self.emit(&report);
            reports.push(report);
        }
        reports
    }

    /// 固定数量的 worker 从队列中取文件，每个 worker 完整执行一个文件后再取下一个
    async fn run_concurrent(&self, files: &[PathBuf], workers: usize) -> Vec<FileReport> {
        let (tx, rx) = mpsc::unbounded_channel::<(usize, PathBuf)>();
        for job in files.iter().cloned().enumerate() {
            if tx.send(job).is_err() {
                break;
            }
        }
        drop(tx);

        let queue = Arc::new(tokio::sync::Mutex::new(rx));
        let worker_count = workers.max(1).min(files.len().max(1));

        let mut set = JoinSet::new();
        for worker in 0..worker_count {
            let queue = queue.clone();
            let runner = self.clone();
            set.spawn(async move {
                let mut done = Vec::new();
                loop {
                    let job = queue.lock().await.recv().await;
                    let Some((index, path)) = job else {
                        break;
                    };
                    debug!(worker, file = %path.display(), "Worker picked up file");

                    let report = runner.executor.run_file(&path).await;
                    runner.emit(&report);
                    done.push((index, report));
                }
                done
            });
        }

        let mut indexed = Vec::with_capacity(files.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(done) => indexed.extend(done),
                Err(e) => error!("Worker task failed: {}", e),
            }
        }

        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, report)| report).collect()
    }

    /// 整块写出一个文件的输出
    fn emit(&self, report: &FileReport) {
        let mut output = self.output.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = output
            .write_all(report.output.as_bytes())
            .and_then(|()| output.flush())
        {
            warn!(file = %report.path.display(), "Failed to write report: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_settings() {
        let sequential = RunSettings::default();
        assert_eq!(
            ExecutionMode::from_settings(&sequential),
            ExecutionMode::Sequential
        );

        let concurrent = RunSettings {
            multithread: Some(true),
            ..RunSettings::default()
        };
        assert_eq!(
            ExecutionMode::from_settings(&concurrent),
            ExecutionMode::Concurrent { workers: 4 }
        );

        let sized = RunSettings {
            multithread: Some(true),
            workers: Some(2),
            ..RunSettings::default()
        };
        assert_eq!(
            ExecutionMode::from_settings(&sized),
            ExecutionMode::Concurrent { workers: 2 }
        );
    }
}
