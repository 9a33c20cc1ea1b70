use crate::utils::error::{BatchError, Result};
use serde::Deserialize;

/// Header of the column holding the account to follow.
pub const ACCOUNT_ADDRESS_COLUMN: &str = "Account address";

/// Header of the column appended to the retry file.
pub const ERROR_REASON_COLUMN: &str = "error_reason";

/// One data row of the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    /// 1-based data row index, used in progress logs.
    pub line: usize,
    pub account_address: String,
    /// Every column value of the row, in header order.
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteAccount {
    pub id: String,
    pub acct: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TargetList {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryRecord {
    pub source: SourceRecord,
    pub error_reason: String,
}

/// Terminal state of one processed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Done,
    AlreadyListed,
    NotFound,
    FollowFailed { acct: String, detail: String },
    FollowTimeout,
    ListAddFailed { acct: String, detail: String },
    ListAddTimeout,
    Unclassified { address: String, detail: String },
}

impl RecordOutcome {
    /// Reason written to the retry file, `None` when the record needs no retry.
    pub fn retry_reason(&self) -> Option<String> {
        match self {
            RecordOutcome::Done | RecordOutcome::AlreadyListed => None,
            RecordOutcome::NotFound => Some("account not found".to_string()),
            RecordOutcome::FollowFailed { acct, detail } => {
                Some(format!("error following {}: {}", acct, detail))
            }
            RecordOutcome::FollowTimeout | RecordOutcome::ListAddTimeout => {
                Some("timeout".to_string())
            }
            RecordOutcome::ListAddFailed { acct, detail } => {
                Some(format!("error adding {} to list: {}", acct, detail))
            }
            RecordOutcome::Unclassified { address, detail } => {
                Some(format!("error working on {}: {}", address, detail))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub already_listed: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &RecordOutcome) {
        self.processed += 1;
        match outcome {
            RecordOutcome::Done => self.succeeded += 1,
            RecordOutcome::AlreadyListed => self.already_listed += 1,
            _ => self.failed += 1,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Fails with `RecordsFailed` when any record went to the retry file.
    pub fn ensure_complete(&self, retry_path: &str) -> Result<()> {
        if self.has_failures() {
            return Err(BatchError::RecordsFailed {
                failed: self.failed,
                processed: self.processed,
                retry_path: retry_path.to_string(),
            });
        }
        Ok(())
    }
}
