use crate::adapters::storage::{RetryWriter, SourceFile};
use crate::core::follower::BatchFollower;
use crate::core::{ConfigProvider, SocialApi};
use crate::domain::model::RunSummary;
use crate::utils::error::Result;

/// Runs one batch: read the source file, resolve the list, follow everyone.
pub struct FollowEngine<A: SocialApi, C: ConfigProvider> {
    follower: BatchFollower<A>,
    config: C,
}

impl<A: SocialApi, C: ConfigProvider> FollowEngine<A, C> {
    pub fn new(follower: BatchFollower<A>, config: C) -> Self {
        Self { follower, config }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!(
            "🚀 Following accounts from {} into list '{}'",
            self.config.source_path(),
            self.config.list_name()
        );

        let source = SourceFile::open(self.config.source_path())?;
        tracing::info!("📊 Read {} records", source.len());

        let list = self.follower.resolve_list(self.config.list_name()).await?;

        let mut retry = RetryWriter::create(self.config.retry_path(), source.headers())?;
        let summary = self
            .follower
            .process_records(source.records(), &list, &mut retry)
            .await?;

        if summary.has_failures() {
            tracing::info!(
                "📁 {} records written to {}",
                summary.failed,
                self.config.retry_path()
            );
        }
        Ok(summary)
    }
}

/// Reads and checks the source file without contacting the server.
/// Returns the number of records a real run would process.
pub fn dry_run<C: ConfigProvider>(config: &C) -> Result<usize> {
    let source = SourceFile::open(config.source_path())?;
    for record in source.records() {
        tracing::debug!("{}: would follow {}", record.line, record.account_address);
    }

    let blank = source
        .records()
        .iter()
        .filter(|r| r.account_address.is_empty())
        .count();
    if blank > 0 {
        tracing::warn!("{} records have an empty account address", blank);
    }

    tracing::info!(
        "🔍 DRY RUN: {} records would be added to list '{}'",
        source.len(),
        config.list_name()
    );
    Ok(source.len())
}
