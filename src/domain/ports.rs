use crate::domain::model::{ArchiveReceipt, ReportView};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 只追加的版本化儲存。`create_file` 只建立新檔，路徑已存在時必須失敗。
#[async_trait]
pub trait VersionedStore: Send + Sync {
    async fn create_file(
        &self,
        path: &str,
        message: &str,
        content: &[u8],
        branch: &str,
    ) -> Result<ArchiveReceipt>;

    async fn check_connection(&self) -> Result<String>;
}

pub trait ReportPresenter {
    fn present(&self, view: &ReportView<'_>) -> Result<String>;
}
