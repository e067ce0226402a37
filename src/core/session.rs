use crate::core::archive::ArchiveWriter;
use crate::core::report::ReportBuilder;
use crate::domain::model::{ArchiveReceipt, RawSubmission, Report};
use crate::domain::ports::VersionedStore;
use crate::utils::error::{ReportError, Result};
use chrono::{DateTime, Utc};

/// 一個使用者工作階段：最多持有一份報表，新的上傳會取代舊的狀態。
///
/// 產生報表與歸檔是兩個獨立動作，任何一邊失敗都不影響另一邊。
#[derive(Debug, Default)]
pub struct Session {
    builder: ReportBuilder,
    submission: Option<RawSubmission>,
    report: Option<Report>,
}

impl Session {
    pub fn new(builder: ReportBuilder) -> Self {
        Self {
            builder,
            submission: None,
            report: None,
        }
    }

    pub fn upload(&mut self, submission: RawSubmission) {
        if let Some(previous) = &self.submission {
            tracing::debug!(
                "Replacing session submission '{}' with '{}'",
                previous.file_name(),
                submission.file_name()
            );
        }
        self.submission = Some(submission);
        self.report = None;
    }

    pub fn submission(&self) -> Option<&RawSubmission> {
        self.submission.as_ref()
    }

    /// 目前上傳內容的報表，第一次呼叫時計算並快取
    pub fn report(&mut self) -> Option<&Report> {
        let submission = self.submission.as_ref()?;
        if self.report.is_none() {
            self.report = Some(self.builder.build_submission(submission));
        }
        self.report.as_ref()
    }

    /// 歸檔目前的上傳內容，每次呼叫都以當下時間產生新路徑
    pub async fn archive<S: VersionedStore + ?Sized>(
        &self,
        writer: &ArchiveWriter<S>,
    ) -> Result<ArchiveReceipt> {
        self.archive_at(writer, Utc::now()).await
    }

    pub async fn archive_at<S: VersionedStore + ?Sized>(
        &self,
        writer: &ArchiveWriter<S>,
        archived_at: DateTime<Utc>,
    ) -> Result<ArchiveReceipt> {
        let submission = self.submission.as_ref().ok_or(ReportError::NoSubmission)?;
        writer.archive_at(submission, archived_at).await
    }
}
