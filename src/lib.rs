pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{github::GitHubStore, local::LocalArchiveStore, local::LocalStorage};
pub use config::AppConfig;
pub use crate::core::{archive::ArchiveWriter, report::ReportBuilder, session::Session};
pub use domain::model::{RawSubmission, Report, ReportSummary, ServiceLine};
pub use utils::error::{ReportError, Result};
