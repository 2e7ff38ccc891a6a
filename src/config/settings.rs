use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// 默认的 cookie jar 文件名
pub const DEFAULT_COOKIE_JAR: &str = "root.cookie.pkfile";
/// 并发模式下默认的 worker 数量
pub const DEFAULT_WORKERS: usize = 4;

/// `pingfile.toml` 中的运行设置，所有字段可选
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub workers: Option<usize>,
    pub multithread: Option<bool>,
    pub save_responses: Option<bool>,
    pub cookie_jar: Option<PathBuf>,
    pub response_dir: Option<PathBuf>,
    pub fail_on_http_error: Option<bool>,
    pub compact: Option<bool>,
}

impl RunSettings {
    /// worker 数量，0 或未设置时取默认值
    pub fn workers_or_default(&self) -> usize {
        match self.workers {
            Some(n) if n > 0 => n,
            _ => DEFAULT_WORKERS,
        }
    }

    pub fn cookie_jar_or_default(&self) -> PathBuf {
        self.cookie_jar
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_COOKIE_JAR))
    }

    pub fn response_dir_or_default(&self) -> PathBuf {
        self.response_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// 配置文件加载器
pub struct SettingsLoader;

impl SettingsLoader {
    /// 配置文件名
    const CONFIG_FILE: &'static str = "pingfile.toml";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<RunSettings, String> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// 查找并加载配置文件
    /// 查找顺序：
    /// 1. 当前目录及其父目录
    /// 2. 用户配置目录 ~/.config/pingfile/
    pub fn find_and_load() -> Option<RunSettings> {
        Self::try_load_from_current_dir().or_else(Self::try_load_from_user_dir)
    }

    fn try_load_from_current_dir() -> Option<RunSettings> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let config_path = current.join(Self::CONFIG_FILE);
            if config_path.exists() {
                return Self::load_from_path(&config_path).ok();
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    fn try_load_from_user_dir() -> Option<RunSettings> {
        let home = dirs::home_dir()?;
        let config_path = home
            .join(".config")
            .join("pingfile")
            .join(Self::CONFIG_FILE);

        if config_path.exists() {
            Self::load_from_path(&config_path).ok()
        } else {
            None
        }
    }
}
