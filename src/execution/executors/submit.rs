//! POST executor driven by explicit submissions.

use super::request::RequestExecutor;
use crate::error::FetchError;
use crate::execution::http::HttpTransport;
use crate::execution::request::{HttpMethod, RequestConfig, RequestOverrides};
use crate::execution::state::{Listener, RequestState, SubscriptionId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;

/// Wraps a [`RequestExecutor`] and always issues POST with the submitted payload.
pub struct SubmitExecutor<T> {
    executor: RequestExecutor<T>,
}

impl<T> Clone for SubmitExecutor<T> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
        }
    }
}

impl<T> SubmitExecutor<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(transport: Arc<dyn HttpTransport>, config: RequestConfig) -> Self {
        Self::from_executor(RequestExecutor::new(
            transport,
            config.with_method(HttpMethod::Post),
        ))
    }

    pub fn from_executor(executor: RequestExecutor<T>) -> Self {
        Self { executor }
    }

    /// POST `payload` as the JSON body.
    ///
    /// The payload is serialized and the call started before this returns.
    /// A payload that fails to serialize settles as a failed call.
    pub fn submit<P>(
        &self,
        payload: &P,
    ) -> impl Future<Output = Result<T, FetchError>> + Send + use<T, P>
    where
        P: Serialize + ?Sized,
    {
        let overrides = serde_json::to_value(payload)
            .map(|body| {
                RequestOverrides::new()
                    .with_method(HttpMethod::Post)
                    .with_body(body)
            })
            .map_err(FetchError::from);
        self.executor.start(overrides)
    }

    pub fn reset(&self) {
        self.executor.reset();
    }

    pub fn state(&self) -> RequestState<T> {
        self.executor.state()
    }

    pub fn subscribe(&self, listener: Listener<RequestState<T>>) -> SubscriptionId {
        self.executor.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.executor.unsubscribe(id)
    }

    pub fn executor(&self) -> &RequestExecutor<T> {
        &self.executor
    }
}
