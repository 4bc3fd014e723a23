//! Executors Layer
//!
//! `RequestExecutor` performs one configured call and tracks its lifecycle;
//! `AutoFetchExecutor` (GET) and `SubmitExecutor` (POST) specialize it.

pub mod auto_fetch;
pub mod request;
pub mod submit;

pub use auto_fetch::AutoFetchExecutor;
pub use request::{ErrorCallback, RequestExecutor, RequestExecutorBuilder, SuccessCallback};
pub use submit::SubmitExecutor;
