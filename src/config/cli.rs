use crate::app::presenter::OutputFormat;
use crate::config::toml_config::{AppConfig, Backend};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "homes-report")]
#[command(about = "Homes passed / homes active report ingestion and archival")]
pub struct CliConfig {
    /// Path to TOML configuration file (defaults to ./homes-report.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Override archive backend from config
    #[arg(long, global = true, value_enum)]
    pub backend: Option<Backend>,

    /// Override archive branch from config
    #[arg(long, global = true)]
    pub branch: Option<String>,

    /// Override archive folder from config
    #[arg(long, global = true)]
    pub folder: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Parse a submission and print its KPI report
    Report(ReportArgs),
    /// Archive a submission verbatim to the versioned store
    Archive(ArchiveArgs),
    /// Test the connection to the versioned store
    Check,
}

#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    /// Report file to ingest
    pub file: String,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write the rendered report to this path instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Also archive the raw submission after rendering
    #[arg(long)]
    pub archive: bool,

    /// List rows that were dropped and why
    #[arg(long)]
    pub show_dropped: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ArchiveArgs {
    /// Report file to archive
    pub file: String,

    /// File name to record in the archive (defaults to the file's own name)
    #[arg(long)]
    pub name: Option<String>,
}

impl CliConfig {
    /// 命令列參數覆蓋設定檔
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(backend) = self.backend {
            config.archive.backend = backend;
        }
        if let Some(branch) = &self.branch {
            config.archive.branch = branch.clone();
        }
        if let Some(folder) = &self.folder {
            config.archive.folder = folder.clone();
        }
    }
}
