use crate::domain::model::ArchiveReceipt;
use crate::domain::ports::VersionedStore;
use crate::utils::error::{ReportError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";

/// GitHub contents API 實作的版本化儲存。每次寫入都是一個 commit。
#[derive(Clone)]
pub struct GitHubStore {
    client: Client,
    api_base: Url,
    owner: String,
    repo: String,
    token: String,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for GitHubStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubStore")
            .field("api_base", &self.api_base.as_str())
            .field("repository", &self.repository())
            .field("token", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct CreateFileResponse {
    content: Option<ContentInfo>,
    commit: CommitInfo,
}

#[derive(Debug, Deserialize)]
struct ContentInfo {
    path: String,
}

#[derive(Debug, Deserialize)]
struct CommitInfo {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryInfo {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GitHubStore {
    pub fn new(repository: &str, token: impl Into<String>) -> Result<Self> {
        let (owner, repo) =
            repository
                .split_once('/')
                .ok_or_else(|| ReportError::InvalidConfigValueError {
                    field: "github.repository".to_string(),
                    value: repository.to_string(),
                    reason: "Repository must look like 'owner/name'".to_string(),
                })?;

        let client = Client::builder()
            .user_agent(concat!("homes-report/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_base: parse_api_base(DEFAULT_API_BASE)?,
            owner: owner.to_string(),
            repo: repo.to_string(),
            token: token.into(),
            timeout: None,
        })
    }

    pub fn with_api_base(mut self, api_base: &str) -> Result<Self> {
        self.api_base = parse_api_base(api_base)?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    fn endpoint(&self, extra: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| ReportError::ConfigError {
                message: format!("GitHub API base cannot hold a path: {}", self.api_base),
            })?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str()])
            .extend(extra.iter().copied());
        Ok(url)
    }

    fn contents_url(&self, path: &str) -> Result<Url> {
        let mut segments = vec!["contents"];
        segments.extend(path.split('/').filter(|segment| !segment.is_empty()));
        self.endpoint(&segments)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);

        match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }
}

fn parse_api_base(api_base: &str) -> Result<Url> {
    Url::parse(api_base).map_err(|e| ReportError::InvalidConfigValueError {
        field: "github.api_base".to_string(),
        value: api_base.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })
}

/// 錯誤回應轉成字串，盡量保留 GitHub 原本的訊息
async fn error_detail(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) => format!("{}: {}", status, parsed.message),
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => format!("{}: {}", status, body.trim()),
    }
}

#[async_trait]
impl VersionedStore for GitHubStore {
    async fn create_file(
        &self,
        path: &str,
        message: &str,
        content: &[u8],
        branch: &str,
    ) -> Result<ArchiveReceipt> {
        let url = self.contents_url(path)?;
        tracing::debug!("PUT {} (branch {}, {} bytes)", url, branch, content.len());

        // 不帶 sha，所以路徑已存在時 GitHub 會拒絕，不會覆寫
        let body = serde_json::json!({
            "message": message,
            "content": general_purpose::STANDARD.encode(content),
            "branch": branch,
        });

        let response = self
            .authorized(self.client.put(url))
            .json(&body)
            .send()
            .await
            .map_err(|e| ReportError::ArchiveWriteError {
                path: path.to_string(),
                detail: e.to_string(),
            })?;

        tracing::debug!("GitHub response status: {}", response.status());

        if !response.status().is_success() {
            return Err(ReportError::ArchiveWriteError {
                path: path.to_string(),
                detail: error_detail(response).await,
            });
        }

        let created: CreateFileResponse =
            response
                .json()
                .await
                .map_err(|e| ReportError::ArchiveWriteError {
                    path: path.to_string(),
                    detail: format!("unreadable response: {}", e),
                })?;

        Ok(ArchiveReceipt {
            path: created
                .content
                .map(|content| content.path)
                .unwrap_or_else(|| path.to_string()),
            branch: branch.to_string(),
            revision: Some(created.commit.sha),
        })
    }

    async fn check_connection(&self) -> Result<String> {
        let url = self.endpoint(&[])?;
        tracing::debug!("GET {}", url);

        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|e| ReportError::StoreConnectionError {
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ReportError::StoreConnectionError {
                detail: error_detail(response).await,
            });
        }

        let repository: RepositoryInfo =
            response
                .json()
                .await
                .map_err(|e| ReportError::StoreConnectionError {
                    detail: format!("unreadable response: {}", e),
                })?;

        Ok(format!("Connected to: {}", repository.full_name))
    }
}
