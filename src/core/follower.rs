use crate::domain::model::{RecordOutcome, RetryRecord, RunSummary, SourceRecord, TargetList};
use crate::domain::ports::{RetrySink, SocialApi};
use crate::utils::error::{ApiError, BatchError, Result};
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Upper bound for a single follow or list-add call.
pub const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause between two records so the server does not throttle the token.
pub const RATE_LIMIT_PAUSE: Duration = Duration::from_secs(1);

const SEARCH_LIMIT: usize = 1;

/// Follows accounts one record at a time and adds them to a list.
pub struct BatchFollower<A: SocialApi> {
    api: A,
    call_timeout: Duration,
    pause: Duration,
}

impl<A: SocialApi> BatchFollower<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            call_timeout: CALL_TIMEOUT,
            pause: RATE_LIMIT_PAUSE,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Finds the user's list titled `name`, creating it when absent.
    pub async fn resolve_list(&self, name: &str) -> Result<TargetList> {
        let to_error = |source: ApiError| BatchError::ListResolution {
            list_name: name.to_string(),
            source,
        };

        let lists = self.api.lists().await.map_err(to_error)?;
        if let Some(list) = lists.into_iter().find(|l| l.title == name) {
            tracing::info!("📋 Using list '{}' ({})", list.title, list.id);
            return Ok(list);
        }

        let list = self.api.create_list(name).await.map_err(to_error)?;
        tracing::info!("📋 Created list '{}' ({})", list.title, list.id);
        Ok(list)
    }

    /// Processes `records` in order, handing every failed one to `sink`.
    ///
    /// Per-record failures never abort the batch; only a sink write error does.
    pub async fn process_records<S: RetrySink>(
        &self,
        records: &[SourceRecord],
        list: &TargetList,
        sink: &mut S,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for (index, record) in records.iter().enumerate() {
            tracing::info!("{}: Working on: {}", index, record.account_address);

            let outcome = self.process_record(record, list).await;
            summary.record(&outcome);

            if let Some(error_reason) = outcome.retry_reason() {
                tracing::warn!("{}: {}", record.account_address, error_reason);
                sink.write(&RetryRecord {
                    source: record.clone(),
                    error_reason,
                })?;
            }

            if index + 1 < records.len() {
                sleep(self.pause).await;
            }
        }

        tracing::info!(
            "📊 Processed {} records: {} followed, {} already listed, {} to retry",
            summary.processed,
            summary.succeeded,
            summary.already_listed,
            summary.failed
        );
        Ok(summary)
    }

    /// Runs lookup, follow and list-add for one record.
    pub async fn process_record(&self, record: &SourceRecord, list: &TargetList) -> RecordOutcome {
        let address = record.account_address.as_str();
        if address.is_empty() {
            return RecordOutcome::NotFound;
        }

        tracing::debug!(line = record.line, "looking up {}", address);
        let account = match self.api.search_accounts(address, SEARCH_LIMIT).await {
            Ok(accounts) => match accounts.into_iter().next() {
                Some(account) => account,
                None => return RecordOutcome::NotFound,
            },
            Err(e) => {
                tracing::error!("error working on {}: {}", address, e);
                return RecordOutcome::Unclassified {
                    address: address.to_string(),
                    detail: e.to_string(),
                };
            }
        };

        tracing::info!("Following {} ({})", account.acct, account.id);
        match timeout(self.call_timeout, self.api.follow(&account.id)).await {
            Err(_) => return RecordOutcome::FollowTimeout,
            Ok(Err(e)) if e.is_timeout() => return RecordOutcome::FollowTimeout,
            Ok(Err(e)) => {
                return RecordOutcome::FollowFailed {
                    acct: account.acct,
                    detail: e.to_string(),
                }
            }
            Ok(Ok(())) => {}
        }

        tracing::info!("Add {} to list", account.acct);
        match timeout(self.call_timeout, self.api.add_to_list(&list.id, &account.id)).await {
            Err(_) => RecordOutcome::ListAddTimeout,
            Ok(Err(e)) if e.is_conflict() => {
                tracing::info!("Account {} already in list.", account.acct);
                RecordOutcome::AlreadyListed
            }
            Ok(Err(e)) if e.is_timeout() => RecordOutcome::ListAddTimeout,
            Ok(Err(e)) => RecordOutcome::ListAddFailed {
                acct: account.acct,
                detail: e.to_string(),
            },
            Ok(Ok(())) => {
                tracing::debug!(line = record.line, "done");
                RecordOutcome::Done
            }
        }
    }
}
