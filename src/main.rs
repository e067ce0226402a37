use clap::Parser;
use homes_report::config::cli::{ArchiveArgs, Command, ReportArgs};
use homes_report::core::Storage;
use homes_report::utils::error::ErrorSeverity;
use homes_report::utils::validation::{validate_file_name, Validate};
use homes_report::utils::logger;
use homes_report::{AppConfig, CliConfig, LocalStorage, RawSubmission, Session};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting homes-report");

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    if cli.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    let result = match &cli.command {
        Command::Report(args) => run_report(&config, args).await,
        Command::Archive(args) => run_archive(&config, args).await,
        Command::Check => run_check(&config).await,
    };

    if let Err(e) = result {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

fn load_config(cli: &CliConfig) -> homes_report::Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    tracing::info!("✅ Configuration loaded and validated successfully");
    Ok(config)
}

async fn read_submission(path: &str) -> homes_report::Result<RawSubmission> {
    tracing::info!("📁 Reading submission from: {}", path);
    LocalStorage::new(".".to_string()).read_submission(path).await
}

async fn run_report(config: &AppConfig, args: &ReportArgs) -> homes_report::Result<()> {
    let submission = read_submission(&args.file).await?;

    let mut session = Session::new(config.report_builder());
    session.upload(submission);

    let Some(report) = session.report() else {
        return Ok(());
    };

    if report.is_empty() {
        eprintln!("⚠️ No usable rows found in {}", args.file);
    }
    if args.show_dropped {
        for rejection in &report.rejections {
            eprintln!("  line {}: {}", rejection.line, rejection.reason);
        }
    }

    let rendered = args.format.presenter().present(&report.view())?;
    match &args.output {
        Some(output) => {
            LocalStorage::new(".".to_string())
                .write_file(output, rendered.as_bytes())
                .await?;
            tracing::info!("📁 Report saved to: {}", output);
        }
        None => print!("{}", rendered),
    }

    // 歸檔失敗不影響已經輸出的報表，只反映在退出碼；stdout 只留給報表本身
    if args.archive {
        let writer = config.archive_writer()?;
        let receipt = session.archive(&writer).await?;
        eprintln!("🗄️ Archived to {} ({})", receipt.path, receipt.branch);
    }

    Ok(())
}

async fn run_archive(config: &AppConfig, args: &ArchiveArgs) -> homes_report::Result<()> {
    let mut submission = read_submission(&args.file).await?;
    if let Some(name) = &args.name {
        submission = RawSubmission::submitted_at(
            submission.content(),
            name.as_str(),
            submission.timestamp(),
        );
    }
    validate_file_name("name", submission.file_name())?;

    let writer = config.archive_writer()?;
    let receipt = writer.archive(&submission).await?;

    match &receipt.revision {
        Some(revision) => println!(
            "✅ Archived {} on {} (commit {})",
            receipt.path, receipt.branch, revision
        ),
        None => println!("✅ Archived {} on {}", receipt.path, receipt.branch),
    }
    Ok(())
}

async fn run_check(config: &AppConfig) -> homes_report::Result<()> {
    let writer = config.archive_writer()?;
    let status = writer.store().check_connection().await?;
    println!("{}", status);
    Ok(())
}
