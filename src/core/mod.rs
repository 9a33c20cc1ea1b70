pub mod engine;
pub mod follower;

pub use crate::domain::model::{RecordOutcome, RetryRecord, RunSummary, SourceRecord, TargetList};
pub use crate::domain::ports::{ConfigProvider, RetrySink, SocialApi};
pub use crate::utils::error::Result;
