use crate::core::aggregator::summarize;
use crate::core::normalizer::RowNormalizer;
use crate::core::parser::parse_records;
use crate::domain::model::{RawSubmission, Report};

/// 解析 → 驗證 → 彙總。壞掉的資料行只會被排除，這裡不會失敗。
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    normalizer: RowNormalizer,
}

impl ReportBuilder {
    pub fn new(normalizer: RowNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn build(&self, text: &str) -> Report {
        let (lines, rejections) = self.normalizer.normalize_all(parse_records(text));
        let summary = summarize(&lines);

        if !rejections.is_empty() {
            tracing::warn!(
                "⚠️ Dropped {} malformed row(s) while building report",
                rejections.len()
            );
        }

        if lines.is_empty() {
            tracing::warn!("📭 No usable rows in submission, reporting an empty table");
        } else {
            tracing::info!(
                "📊 Report built: {} lines, {} homes passed, {} active ({:.2}%)",
                lines.len(),
                summary.total_homes_passed,
                summary.total_active_homes,
                summary.overall_penetration
            );
        }

        Report {
            lines,
            summary,
            rejections,
        }
    }

    pub fn build_submission(&self, submission: &RawSubmission) -> Report {
        tracing::debug!("Building report for '{}'", submission.file_name());
        self.build(submission.content())
    }
}
