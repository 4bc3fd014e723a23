//! Execution Layer
//!
//! Request configuration, the injectable HTTP transport, observable request
//! state, and the executors that tie them together.

pub mod executors;
pub mod http;
pub mod request;
pub mod state;

pub use request::{HttpMethod, RequestConfig, RequestOverrides};
pub use state::{Listener, RequestState, SubscriptionId};
