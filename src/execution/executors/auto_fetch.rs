//! GET executor that fetches once on activation.

use super::request::RequestExecutor;
use crate::error::FetchError;
use crate::execution::http::HttpTransport;
use crate::execution::request::{HttpMethod, RequestConfig, RequestOverrides};
use crate::execution::state::{Listener, RequestState, SubscriptionId};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;

/// Wraps a [`RequestExecutor`] in GET mode and optionally fetches when activated.
pub struct AutoFetchExecutor<T> {
    executor: RequestExecutor<T>,
    auto_fetch: bool,
    activated: Arc<AtomicBool>,
}

impl<T> Clone for AutoFetchExecutor<T> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            auto_fetch: self.auto_fetch,
            activated: self.activated.clone(),
        }
    }
}

impl<T> AutoFetchExecutor<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// `auto_fetch` defaults to true.
    pub fn new(transport: Arc<dyn HttpTransport>, config: RequestConfig) -> Self {
        Self::from_executor(RequestExecutor::new(
            transport,
            config.with_method(HttpMethod::Get),
        ))
    }

    /// Wrap an executor built elsewhere (e.g. with callbacks attached).
    pub fn from_executor(executor: RequestExecutor<T>) -> Self {
        Self {
            executor,
            auto_fetch: true,
            activated: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_auto_fetch(mut self, auto_fetch: bool) -> Self {
        self.auto_fetch = auto_fetch;
        self
    }

    pub fn auto_fetch(&self) -> bool {
        self.auto_fetch
    }

    /// Run the automatic fetch, at most once per executor.
    ///
    /// The fetch starts when this is called. Never fails: a failed fetch is
    /// only visible through `error` state.
    pub fn activate(&self) -> impl Future<Output = ()> + Send + use<T> {
        let call = (self.auto_fetch && !self.activated.swap(true, Ordering::SeqCst))
            .then(|| self.executor.execute(get()));
        let target = self.executor.config().target.clone();
        async move {
            let Some(call) = call else {
                return;
            };
            if let Err(e) = call.await {
                tracing::debug!(target: "nudge_client::executor", target_url=%target, err=%e, "automatic fetch failed");
            }
        }
    }

    /// Start [`Self::activate`] and drive it on the current Tokio runtime.
    pub fn mount(&self) -> JoinHandle<()> {
        tokio::spawn(self.activate())
    }

    /// Re-issue the GET manually.
    pub fn refetch(&self) -> impl Future<Output = Result<T, FetchError>> + Send + use<T> {
        self.executor.execute(get())
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

    /// The wrapped executor.
    pub fn executor(&self) -> &RequestExecutor<T> {
        &self.executor
    }
}

fn get() -> RequestOverrides {
    RequestOverrides::new().with_method(HttpMethod::Get)
}
