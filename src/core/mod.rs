pub mod aggregator;
pub mod archive;
pub mod normalizer;
pub mod parser;
pub mod report;
pub mod session;

pub use crate::domain::model::{
    ArchiveReceipt, CandidateRow, RawSubmission, Report, ReportSummary, ReportView, ServiceLine,
};
pub use crate::domain::ports::{ReportPresenter, Storage, VersionedStore};
pub use crate::utils::error::Result;
