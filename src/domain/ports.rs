use crate::domain::model::{RemoteAccount, RetryRecord, TargetList};
use crate::utils::error::{ApiError, Result};
use async_trait::async_trait;

/// Operations the batch needs from the remote social service.
#[async_trait]
pub trait SocialApi: Send + Sync {
    async fn search_accounts(
        &self,
        query: &str,
        limit: usize,
    ) -> std::result::Result<Vec<RemoteAccount>, ApiError>;

    async fn follow(&self, account_id: &str) -> std::result::Result<(), ApiError>;

    async fn add_to_list(
        &self,
        list_id: &str,
        account_id: &str,
    ) -> std::result::Result<(), ApiError>;

    async fn lists(&self) -> std::result::Result<Vec<TargetList>, ApiError>;

    async fn create_list(&self, title: &str) -> std::result::Result<TargetList, ApiError>;
}

/// Destination for records that must be retried.
pub trait RetrySink {
    fn write(&mut self, record: &RetryRecord) -> Result<()>;
}

impl RetrySink for Vec<RetryRecord> {
    fn write(&mut self, record: &RetryRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

pub trait ConfigProvider: Send + Sync {
    fn list_name(&self) -> &str;
    fn source_path(&self) -> &str;
    fn retry_path(&self) -> &str;
}
