use crate::domain::model::{ArchiveEntry, ArchiveReceipt, RawSubmission};
use crate::domain::ports::VersionedStore;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveSettings {
    pub folder: String,
    pub branch: String,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            folder: "upload".to_string(),
            branch: "main".to_string(),
        }
    }
}

/// `<folder>/<YYYYMMDD_HHMMSS>_<file_name>`，時間為 UTC
pub fn archive_path(folder: &str, timestamp: DateTime<Utc>, file_name: &str) -> String {
    let stamped = format!("{}_{}", timestamp.format(TIMESTAMP_FORMAT), file_name);
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        stamped
    } else {
        format!("{}/{}", folder, stamped)
    }
}

pub fn commit_message(file_name: &str) -> String {
    format!("Archive report submission: {}", file_name)
}

/// 將原始報表原封不動寫入版本化儲存。
///
/// 每次呼叫都建立一筆新的歸檔紀錄，路徑以呼叫當下的時間命名，
/// 同樣內容也不去重。失敗不重試，儲存端的錯誤原樣回傳給呼叫端。
pub struct ArchiveWriter<S: VersionedStore + ?Sized = dyn VersionedStore> {
    settings: ArchiveSettings,
    store: Box<S>,
}

impl<S: VersionedStore + ?Sized> ArchiveWriter<S> {
    pub fn new(store: Box<S>, settings: ArchiveSettings) -> Self {
        Self { settings, store }
    }

    pub fn settings(&self) -> &ArchiveSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn entry_for(
        &self,
        submission: &RawSubmission,
        archived_at: DateTime<Utc>,
    ) -> ArchiveEntry {
        ArchiveEntry {
            path: archive_path(&self.settings.folder, archived_at, submission.file_name()),
            message: commit_message(submission.file_name()),
            branch: self.settings.branch.clone(),
            content: submission.content().to_string(),
        }
    }

    pub async fn archive(&self, submission: &RawSubmission) -> Result<ArchiveReceipt> {
        self.archive_at(submission, Utc::now()).await
    }

    /// 以指定時間命名歸檔路徑
    pub async fn archive_at(
        &self,
        submission: &RawSubmission,
        archived_at: DateTime<Utc>,
    ) -> Result<ArchiveReceipt> {
        let entry = self.entry_for(submission, archived_at);
        tracing::info!(
            "🗄️ Archiving '{}' to {} on branch {}",
            submission.file_name(),
            entry.path,
            entry.branch
        );

        match self
            .store
            .create_file(
                &entry.path,
                &entry.message,
                entry.content.as_bytes(),
                &entry.branch,
            )
            .await
        {
            Ok(receipt) => {
                tracing::info!("✅ Archived submission at {}", receipt.path);
                Ok(receipt)
            }
            Err(e) => {
                tracing::error!("❌ Archive write failed for {}: {}", entry.path, e);
                Err(e)
            }
        }
    }
}
