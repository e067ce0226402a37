use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 使用者上傳的原始報表，內容逐位元組保留
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSubmission {
    content: String,
    file_name: String,
    submitted_at: DateTime<Utc>,
}

impl RawSubmission {
    pub fn new(content: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self::submitted_at(content, file_name, Utc::now())
    }

    pub fn submitted_at(
        content: impl Into<String>,
        file_name: impl Into<String>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            content: content.into(),
            file_name: file_name.into(),
            submitted_at,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

/// 解析後、驗證前的一行資料
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRow {
    pub fields: Vec<String>,
    /// 原始檔案中的行號（從 1 開始）
    pub line: u64,
}

impl CandidateRow {
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceLine {
    pub id: String,
    pub name: String,
    pub total_homes: u64,
    pub active_homes: u64,
    pub active_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_homes_passed: u64,
    pub total_active_homes: u64,
    pub overall_penetration: f64,
}

/// 被捨棄的資料行原因。這是診斷資訊，不是流程錯誤。
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowError {
    #[error("missing column {index} ({field})")]
    MissingField { field: String, index: usize },

    #[error("{field} is not a non-negative integer: '{value}'")]
    InvalidNumber { field: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRejection {
    pub line: u64,
    pub reason: RowError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub lines: Vec<ServiceLine>,
    pub summary: ReportSummary,
    pub rejections: Vec<RowRejection>,
}

impl Report {
    /// 沒有任何可用資料行
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn dropped_rows(&self) -> usize {
        self.rejections.len()
    }

    pub fn view(&self) -> ReportView<'_> {
        ReportView {
            lines: &self.lines,
            summary: self.summary,
            dropped_rows: self.dropped_rows(),
        }
    }
}

/// 提供給呈現層的唯讀資料契約
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReportView<'a> {
    pub lines: &'a [ServiceLine],
    pub summary: ReportSummary,
    pub dropped_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub message: String,
    pub branch: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveReceipt {
    pub path: String,
    pub branch: String,
    /// 版本庫回報的 commit 識別（本地儲存則為 None）
    pub revision: Option<String>,
}
