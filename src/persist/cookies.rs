use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use fs2::FileExt;
use tracing::debug;

use crate::persist::PersistenceError;
use crate::persist::model::CookieRecord;

/// 持久化的 cookie jar
///
/// # Concurrency Strategy
/// 所有写入都经过同一个 `CookieJar`：进程内用 `Mutex` 串行化，
/// 进程间用 `fs2::lock_exclusive` 保护 read-merge-write 整个周期，
/// 并发 worker 不会丢失彼此写入的 cookie。
#[derive(Debug)]
pub struct CookieJar {
    path: PathBuf,
    cookies: Mutex<Vec<CookieRecord>>,
}

impl CookieJar {
    /// 打开 jar；文件不存在视为空 jar
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self, PersistenceError> {
        let path = path.into();
        let cookies = read_jar(&path)?;
        Ok(Self {
            path,
            cookies: Mutex::new(cookies),
        })
    }

    /// 不读取磁盘，直接以空 jar 开始
    pub fn empty<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            cookies: Mutex::new(Vec::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 当前 jar 内容的快照
    pub fn snapshot(&self) -> Vec<CookieRecord> {
        self.cookies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 合并新收到的 cookie 并写回磁盘，同名时新值覆盖旧值
    pub fn merge(&self, incoming: Vec<CookieRecord>) -> Result<(), PersistenceError> {
        if incoming.is_empty() {
            return Ok(());
        }

        let mut cookies = self
            .cookies
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let merged = merge_into_file(&self.path, incoming)?;
        *cookies = merged;

        debug!(jar = %self.path.display(), cookies = cookies.len(), "Cookie jar updated");
        Ok(())
    }
}

/// 读取 jar 文件，跳过 name 或 value 为空的记录
pub fn read_jar(path: &Path) -> Result<Vec<CookieRecord>, PersistenceError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_jar(path, &content)
}

fn parse_jar(path: &Path, content: &str) -> Result<Vec<CookieRecord>, PersistenceError> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let cookies: Vec<CookieRecord> =
        serde_json::from_str(content).map_err(|e| PersistenceError::Encode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(cookies.into_iter().filter(CookieRecord::is_sendable).collect())
}

/// 按 name 合并：保留已有顺序，同名记录原地覆盖，新名字追加在末尾
pub fn merge_cookies(
    existing: Vec<CookieRecord>,
    incoming: impl IntoIterator<Item = CookieRecord>,
) -> Vec<CookieRecord> {
    let mut merged: Vec<CookieRecord> = Vec::with_capacity(existing.len());
    for cookie in existing.into_iter().chain(incoming) {
        match merged.iter_mut().find(|c| c.name == cookie.name) {
            Some(slot) => *slot = cookie,
            None => merged.push(cookie),
        }
    }
    merged
}

/// 在排他文件锁下完成 read-merge-write，返回合并后的完整 jar
pub fn merge_into_file(
    path: &Path,
    incoming: Vec<CookieRecord>,
) -> Result<Vec<CookieRecord>, PersistenceError> {
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

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(io_err)?;

    file.lock_exclusive().map_err(io_err)?;

    let mut content = String::new();
    file.read_to_string(&mut content).map_err(io_err)?;
    let existing = parse_jar(path, &content)?;

    let merged = merge_cookies(existing, incoming);
    let json = serde_json::to_string_pretty(&merged).map_err(|e| PersistenceError::Encode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    // 先截断再从头写入，持有同一个句柄保证锁有效
    file.set_len(0).map_err(io_err)?;
    file.seek(SeekFrom::Start(0)).map_err(io_err)?;
    file.write_all(json.as_bytes()).map_err(io_err)?;
    file.write_all(b"\n").map_err(io_err)?;
    file.flush().map_err(io_err)?;

    // 锁随 file drop 释放
    Ok(merged)
}
