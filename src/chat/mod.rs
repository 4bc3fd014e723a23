//! Chat Surface
//!
//! The message ledger behind the nudge chat: optimistic local records, a POST
//! per message enriched with device/location context, in-place retry of
//! failed sends, and a single auto-expiring failure notice.

pub mod annotation;
pub mod config;
pub mod ledger;
pub mod notice;
pub mod types;

pub use config::ChatConfig;
pub use ledger::{DeliveryOutcome, MessageRetryLedger};
pub use notice::{Notice, NoticeBoard};
pub use types::{
    ChatContext, ChatRequestBody, MessageId, MessageRecord, MessageStatus, NudgeResponse, Origin,
};
