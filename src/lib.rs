//! nudge-client
//!
//! Client-side asynchronous operation layer for the nudge investing assistant:
//! request executors with observable lifecycle state, a process-wide
//! device/location enrichment cache, and the chat message ledger that drives
//! optimistic sends and manual retries on top of them.
#![deny(unsafe_code)]

pub mod chat;
pub mod defaults;
pub mod enrichment;
pub mod error;
pub mod execution;

pub use chat::{
    ChatConfig, DeliveryOutcome, MessageId, MessageRecord, MessageRetryLedger, MessageStatus,
    Origin,
};
pub use enrichment::{EnrichmentCache, EnrichmentSnapshot};
pub use error::FetchError;
pub use execution::executors::{AutoFetchExecutor, RequestExecutor, SubmitExecutor};
pub use execution::state::RequestState;
