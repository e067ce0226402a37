use crate::adapters::github::{GitHubStore, DEFAULT_API_BASE};
use crate::adapters::local::LocalArchiveStore;
use crate::core::archive::{ArchiveSettings, ArchiveWriter};
use crate::core::normalizer::{ColumnMapping, RowNormalizer};
use crate::core::report::ReportBuilder;
use crate::domain::ports::VersionedStore;
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "homes-report.toml";
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub report: ReportConfig,
    pub archive: ArchiveConfig,
    pub github: Option<GitHubConfig>,
    pub local: LocalConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub columns: ColumnMapping,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Github,
    #[default]
    Local,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub backend: Backend,
    pub folder: String,
    pub branch: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        let settings = ArchiveSettings::default();
        Self {
            backend: Backend::default(),
            folder: settings.folder,
            branch: settings.branch,
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubConfig {
    pub repository: String,
    pub token: Option<String>,
    pub api_base: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("repository", &self.repository)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("api_base", &self.api_base)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    pub root: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            root: "./archive".to_string(),
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReportError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 指定路徑就必須存在；沒指定時找預設檔，找不到就用預設值
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => {
                tracing::debug!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
                Ok(Self::default())
            }
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GITHUB_TOKEN})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReportError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn archive_settings(&self) -> ArchiveSettings {
        ArchiveSettings {
            folder: self.archive.folder.clone(),
            branch: self.archive.branch.clone(),
        }
    }

    pub fn report_builder(&self) -> ReportBuilder {
        ReportBuilder::new(RowNormalizer::new(self.report.columns))
    }

    pub fn build_store(&self) -> Result<Box<dyn VersionedStore>> {
        match self.archive.backend {
            Backend::Local => {
                tracing::debug!("Using local archive store at {}", self.local.root);
                Ok(Box::new(LocalArchiveStore::new(&self.local.root)))
            }
            Backend::Github => {
                let github = validation::validate_required_field("github", &self.github)?;
                let token = github.resolve_token()?;
                let mut store = GitHubStore::new(&github.repository, token)?
                    .with_api_base(github.api_base.as_deref().unwrap_or(DEFAULT_API_BASE))?;
                if let Some(timeout) = github.timeout_seconds {
                    store = store.with_timeout(Duration::from_secs(timeout));
                }
                tracing::debug!("Using GitHub archive store {}", github.repository);
                Ok(Box::new(store))
            }
        }
    }

    pub fn archive_writer(&self) -> Result<ArchiveWriter> {
        Ok(ArchiveWriter::new(self.build_store()?, self.archive_settings()))
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_distinct_offsets("report.columns", &self.report.columns.offsets())?;
        validation::validate_non_empty_string("archive.branch", &self.archive.branch)?;

        if self.archive.folder.contains('\0')
            || self.archive.folder.split('/').any(|segment| segment == "..")
        {
            return Err(ReportError::InvalidConfigValueError {
                field: "archive.folder".to_string(),
                value: self.archive.folder.clone(),
                reason: "Folder must stay inside the archive".to_string(),
            });
        }

        match self.archive.backend {
            Backend::Local => validation::validate_path("local.root", &self.local.root)?,
            Backend::Github => {
                let github = validation::validate_required_field("github", &self.github)?;
                validation::validate_repository("github.repository", &github.repository)?;
                if let Some(api_base) = &github.api_base {
                    validation::validate_url("github.api_base", api_base)?;
                }
                if let Some(timeout) = github.timeout_seconds {
                    validation::validate_range("github.timeout_seconds", timeout, 1, 300)?;
                }
            }
        }

        Ok(())
    }
}

impl GitHubConfig {
    /// 設定檔優先，其次是 GITHUB_TOKEN 環境變數
    pub fn resolve_token(&self) -> Result<String> {
        let configured = self
            .token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty() && !token.starts_with("${"));

        if let Some(token) = configured {
            return Ok(token.to_string());
        }

        std::env::var(TOKEN_ENV_VAR)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| ReportError::MissingConfigError {
                field: format!("github.token (or {})", TOKEN_ENV_VAR),
            })
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.report.columns, ColumnMapping::default());
        assert_eq!(config.archive.backend, Backend::Local);
        assert_eq!(config.archive.folder, "upload");
        assert_eq!(config.archive.branch, "main");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[report.columns]
id = 0
name = 1
total_homes = 2
active_homes = 3

[archive]
backend = "github"
folder = "reports"
branch = "audit"

[github]
repository = "pwngithub/pwnhomes"
token = "ghp_literal"
timeout_seconds = 20
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.report.columns.total_homes, 2);
        assert_eq!(config.archive.backend, Backend::Github);
        assert_eq!(
            config.archive_settings(),
            ArchiveSettings {
                folder: "reports".to_string(),
                branch: "audit".to_string(),
            }
        );
        let github = config.github.as_ref().unwrap();
        assert_eq!(github.resolve_token().unwrap(), "ghp_literal");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("HOMES_REPORT_TEST_REPO", "acme/homes");

        let toml_content = r#"
[archive]
backend = "github"

[github]
repository = "${HOMES_REPORT_TEST_REPO}"
token = "${HOMES_REPORT_TEST_UNSET_TOKEN}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        let github = config.github.unwrap();
        assert_eq!(github.repository, "acme/homes");
        assert_eq!(
            github.token.as_deref(),
            Some("${HOMES_REPORT_TEST_UNSET_TOKEN}")
        );

        std::env::remove_var("HOMES_REPORT_TEST_REPO");
    }

    #[test]
    fn test_github_backend_requires_section() {
        let config = AppConfig::from_toml_str("[archive]\nbackend = \"github\"\n").unwrap();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ReportError::MissingConfigError { .. }));
    }

    #[test]
    fn test_duplicate_column_offsets_rejected() {
        let toml_content = r#"
[report.columns]
id = 2
name = 2
total_homes = 6
active_homes = 7
"#;
        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_repository_and_folder() {
        let mut config = AppConfig::default();
        config.archive.backend = Backend::Github;
        config.github = Some(GitHubConfig {
            repository: "no-owner".to_string(),
            token: None,
            api_base: None,
            timeout_seconds: None,
        });
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.archive.folder = "../outside".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let github = GitHubConfig {
            repository: "a/b".to_string(),
            token: Some("ghp_secret".to_string()),
            api_base: None,
            timeout_seconds: None,
        };

        let rendered = format!("{:?}", github);
        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(AppConfig::from_toml_str("[archive]\nbackend = \"s3\"\n").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[archive]\nfolder = \"incoming\"\n\n[local]\nroot = \"/tmp/homes\"\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.archive.folder, "incoming");
        assert_eq!(config.local.root, "/tmp/homes");
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        assert!(AppConfig::load(Some("/definitely/not/here.toml")).is_err());
    }
}
