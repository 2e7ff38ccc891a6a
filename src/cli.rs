use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use pingfile::config::{RunSettings, SettingsLoader};
use pingfile::http::Dispatcher;
use pingfile::persist::CookieJar;
use pingfile::runner::{
    ApiExecutor, BatchRunner, BatchSummary, ExecuteOptions, ExecutionMode, Reporter,
};
use pingfile::utils::ResponseFormat;
use tracing::{info, warn};

pub type Result<T> = std::result::Result<T, anyhow::Error>;

#[derive(Parser)]
#[command(author, version, about = "Run HTTP requests declared in json/yaml/pkfile files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 执行一个或多个请求文件
    Run(RunArgs),
    /// 把当前可执行文件复制到系统 bin 目录
    Install,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// 请求文件（.json / .yaml / .yml / .pkfile）
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// 保存每个请求的响应
    #[arg(short, long)]
    pub save: bool,

    /// 文件之间并发执行
    #[arg(short, long)]
    pub multithread: bool,

    /// 并发 worker 数量
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// cookie jar 文件路径
    #[arg(long)]
    pub cookie_jar: Option<PathBuf>,

    /// 默认响应文件目录
    #[arg(long)]
    pub response_dir: Option<PathBuf>,

    /// 有请求失败或返回 >= 400 时以非零状态退出
    #[arg(long)]
    pub fail_on_http_error: bool,

    /// 精简输出，不打印响应头
    #[arg(long)]
    pub compact: bool,

    /// 指定 pingfile.toml，不再自动查找
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl RunArgs {
    /// 命令行参数覆盖配置文件
    fn merge_into(&self, mut settings: RunSettings) -> RunSettings {
        if self.save {
            settings.save_responses = Some(true);
        }
        if self.multithread {
            settings.multithread = Some(true);
        }
        if self.workers.is_some() {
            settings.workers = self.workers;
        }
        if self.cookie_jar.is_some() {
            settings.cookie_jar = self.cookie_jar.clone();
        }
        if self.response_dir.is_some() {
            settings.response_dir = self.response_dir.clone();
        }
        if self.fail_on_http_error {
            settings.fail_on_http_error = Some(true);
        }
        if self.compact {
            settings.compact = Some(true);
        }
        settings
    }

    fn load_settings(&self) -> Result<RunSettings> {
        let file_settings = match &self.config {
            Some(path) => SettingsLoader::load_from_path(path).map_err(|e| anyhow!(e))?,
            None => SettingsLoader::find_and_load().unwrap_or_default(),
        };
        Ok(self.merge_into(file_settings))
    }
}

pub async fn run(args: RunArgs) -> Result<ExitCode> {
    let settings = args.load_settings()?;

    let jar_path = settings.cookie_jar_or_default();
    let jar = match CookieJar::open(&jar_path) {
        Ok(jar) => jar,
        Err(e) => {
            warn!(jar = %jar_path.display(), "Failed to read cookie jar, starting empty: {}", e);
            CookieJar::empty(&jar_path)
        }
    };

    let format = if settings.compact.unwrap_or(false) {
        ResponseFormat::Compact
    } else {
        ResponseFormat::Verbose
    };
    let reporter = Reporter::new(format, true);
    let options = ExecuteOptions {
        save_responses: settings.save_responses.unwrap_or(false),
        response_dir: settings.response_dir_or_default(),
    };

    let dispatcher = Dispatcher::new().context("Failed to create HTTP client")?;
    let executor = ApiExecutor::new(dispatcher, Arc::new(jar), reporter, options);
    let mode = ExecutionMode::from_settings(&settings);
    let runner = BatchRunner::new(executor, mode);

    print_banner(&args.files, mode);
    info!(files = args.files.len(), ?mode, "Starting batch");

    let reports = runner.run(&args.files).await;
    let summary = BatchSummary::from_reports(&reports);

    let reporter = runner.executor().reporter();
    println!();
    println!("{}", reporter.summary_table(&reports));
    println!("{}", reporter.summary_line(&summary));

    if settings.fail_on_http_error.unwrap_or(false) && summary.has_errors() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn print_banner(files: &[PathBuf], mode: ExecutionMode) {
    let mode_text = match mode {
        ExecutionMode::Sequential => "sequential".to_string(),
        ExecutionMode::Concurrent { workers } => format!("concurrent, {} workers", workers),
    };
    println!(
        "{} {} file(s) ({})",
        "pingfile".cyan().bold(),
        files.len(),
        mode_text.dimmed()
    );
}

/// 安装目标目录
fn install_dir() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        Ok(PathBuf::from("/usr/local/bin"))
    } else if cfg!(any(target_os = "macos", target_os = "windows")) {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))?;
        Ok(home.join("bin"))
    } else {
        bail!("Unsupported OS: {}", std::env::consts::OS)
    }
}

pub fn install() -> Result<ExitCode> {
    let exe = std::env::current_exe().context("Failed to locate current executable")?;
    let dir = install_dir()?;
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let file_name = exe
        .file_name()
        .ok_or_else(|| anyhow!("Invalid executable path: {}", exe.display()))?;
    let target = dir.join(file_name);
    fs::copy(&exe, &target).with_context(|| format!("Failed to copy to {}", target.display()))?;

    println!("{} {}", "Installed to".green(), target.display());
    Ok(ExitCode::SUCCESS)
}
