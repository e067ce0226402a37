use crate::domain::model::{ArchiveReceipt, RawSubmission};
use crate::domain::ports::{Storage, VersionedStore};
use crate::utils::error::{ReportError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;

pub const LEDGER_FILE: &str = "ledger.jsonl";

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    /// 讀取報表檔案，檔名取路徑最後一段
    pub async fn read_submission(&self, path: &str) -> Result<RawSubmission> {
        let data = self.read_file(path).await?;
        let content = String::from_utf8(data).map_err(|e| {
            ReportError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;

        let file_name = Path::new(path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(path)
            .to_string();

        Ok(RawSubmission::new(content, file_name))
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub path: String,
    pub message: String,
    pub branch: String,
    pub bytes: usize,
    pub created_at: DateTime<Utc>,
}

/// 本地檔案系統上的只追加歸檔：`<root>/<branch>/<path>`，
/// 每次寫入在 `<root>/<branch>/ledger.jsonl` 追加一行紀錄。
#[derive(Debug, Clone)]
pub struct LocalArchiveStore {
    root: PathBuf,
}

impl LocalArchiveStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ledger_path(&self, branch: &str) -> PathBuf {
        self.root.join(branch).join(LEDGER_FILE)
    }

    pub async fn read_ledger(&self, branch: &str) -> Result<Vec<LedgerEntry>> {
        let content = match tokio::fs::read_to_string(self.ledger_path(branch)).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(ReportError::from))
            .collect()
    }

    async fn write_new(&self, full_path: &Path, content: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(full_path)
            .await?;

        let written = async {
            file.write_all(content).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            // 寫到一半失敗就移除，避免留下不完整的歸檔
            drop(file);
            let _ = tokio::fs::remove_file(full_path).await;
            return Err(e);
        }
        Ok(())
    }

    async fn append_ledger(&self, entry: &LedgerEntry) -> Result<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut ledger = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.ledger_path(&entry.branch))
            .await?;
        ledger.write_all(line.as_bytes()).await?;
        ledger.flush().await?;
        Ok(())
    }
}

fn is_plain_relative(path: &str) -> bool {
    !path.is_empty() && Path::new(path).components().all(|c| matches!(c, Component::Normal(_)))
}

#[async_trait]
impl VersionedStore for LocalArchiveStore {
    async fn create_file(
        &self,
        path: &str,
        message: &str,
        content: &[u8],
        branch: &str,
    ) -> Result<ArchiveReceipt> {
        if !is_plain_relative(path) || !is_plain_relative(branch) {
            return Err(ReportError::ArchiveWriteError {
                path: path.to_string(),
                detail: "path and branch must be plain relative paths".to_string(),
            });
        }

        let full_path = self.root.join(branch).join(path);
        tracing::debug!("Writing archive file {}", full_path.display());

        self.write_new(&full_path, content).await.map_err(|e| {
            let detail = if e.kind() == std::io::ErrorKind::AlreadyExists {
                "path already exists in archive".to_string()
            } else {
                e.to_string()
            };
            ReportError::ArchiveWriteError {
                path: path.to_string(),
                detail,
            }
        })?;

        let entry = LedgerEntry {
            path: path.to_string(),
            message: message.to_string(),
            branch: branch.to_string(),
            bytes: content.len(),
            created_at: Utc::now(),
        };
        if let Err(e) = self.append_ledger(&entry).await {
            // 檔案與 ledger 必須一致，ledger 寫不進去就撤回檔案
            if let Err(cleanup) = tokio::fs::remove_file(&full_path).await {
                tracing::warn!(
                    "⚠️ Could not remove {} after ledger failure: {}",
                    full_path.display(),
                    cleanup
                );
            }
            return Err(ReportError::ArchiveWriteError {
                path: path.to_string(),
                detail: format!("ledger update failed, nothing was archived: {}", e),
            });
        }

        Ok(ArchiveReceipt {
            path: path.to_string(),
            branch: branch.to_string(),
            revision: None,
        })
    }

    async fn check_connection(&self) -> Result<String> {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => {
                Ok(format!("Connected to: local archive {}", self.root.display()))
            }
            Ok(_) => Err(ReportError::StoreConnectionError {
                detail: format!("{} is not a directory", self.root.display()),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(format!(
                "Connected to: local archive {} (will be created on first write)",
                self.root.display()
            )),
            Err(e) => Err(ReportError::StoreConnectionError {
                detail: e.to_string(),
            }),
        }
    }
}
