// Adapters layer: concrete implementations for the remote service and the CSV files.

pub mod http;
pub mod storage;

pub use http::MastodonClient;
pub use storage::{RetryWriter, SourceFile};
