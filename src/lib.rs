pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::ClientConfig;

pub use adapters::{MastodonClient, RetryWriter, SourceFile};
pub use core::{engine::FollowEngine, follower::BatchFollower};
pub use utils::error::{ApiError, BatchError, Result};
