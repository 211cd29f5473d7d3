// Orchestration service access
//
// `api` is the blocking HTTP client, `feed` decodes the live attack
// stream, and `worker` runs both off the UI thread.

pub mod api;
pub mod feed;
pub mod worker;

pub use api::ApiClient;
pub use worker::{Command, ControlWorker, FeedEvent, FeedWorker, Update};
