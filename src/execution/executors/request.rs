//! Generic request executor
//!
//! Wraps one configured HTTP operation and owns its `{data, loading, error}`
//! state. Each `execute` takes a fresh call generation at call time, before
//! the returned future is polled; only the call holding the current
//! generation may write state or fire callbacks when it settles, so a newer
//! `execute` or a `reset` silently discards late results.

use crate::error::{FetchError, classify_response, normalize_message};
use crate::execution::http::{HttpTransport, HttpTransportRequest, HttpTransportResponse};
use crate::execution::request::{RequestConfig, RequestOverrides};
use crate::execution::state::{Listener, Listeners, RequestState, SubscriptionId, lock};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Invoked with the payload of a successful, current settle.
pub type SuccessCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;
/// Invoked with the failure of a current settle.
pub type ErrorCallback = Arc<dyn Fn(&FetchError) + Send + Sync>;

struct Tracked<T> {
    generation: u64,
    /// Bumped on every transition; stamps listener snapshots.
    version: u64,
    state: RequestState<T>,
}

impl<T: Clone> Tracked<T> {
    fn transition(&mut self, apply: impl FnOnce(&mut RequestState<T>)) -> (u64, RequestState<T>) {
        apply(&mut self.state);
        self.version += 1;
        (self.version, self.state.clone())
    }
}

struct Inner<T> {
    transport: Arc<dyn HttpTransport>,
    config: RequestConfig,
    on_success: Option<SuccessCallback<T>>,
    on_error: Option<ErrorCallback>,
    tracked: Mutex<Tracked<T>>,
    listeners: Listeners<RequestState<T>>,
}

/// Executor for one configured request. Cloning shares the same state.
pub struct RequestExecutor<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for RequestExecutor<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> std::fmt::Debug for RequestExecutor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("config", &self.inner.config)
            .field("listeners", &self.inner.listeners.len())
            .finish()
    }
}

impl<T> RequestExecutor<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(transport: Arc<dyn HttpTransport>, config: RequestConfig) -> Self {
        Self::builder(transport, config).build()
    }

    pub fn builder(
        transport: Arc<dyn HttpTransport>,
        config: RequestConfig,
    ) -> RequestExecutorBuilder<T> {
        RequestExecutorBuilder {
            transport,
            config,
            on_success: None,
            on_error: None,
        }
    }

    /// Base configuration every call starts from.
    pub fn config(&self) -> &RequestConfig {
        &self.inner.config
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> RequestState<T> {
        lock(&self.inner.tracked).state.clone()
    }

    pub fn data(&self) -> Option<T> {
        lock(&self.inner.tracked).state.data.clone()
    }

    pub fn error(&self) -> Option<String> {
        lock(&self.inner.tracked).state.error.clone()
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.inner.tracked).state.loading
    }

    /// Register a listener notified with a snapshot after every transition.
    pub fn subscribe(&self, listener: Listener<RequestState<T>>) -> SubscriptionId {
        self.inner.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.listeners.unsubscribe(id)
    }

    /// Issue the request with `overrides` merged over the base configuration.
    ///
    /// The call starts immediately: `loading` is set and the call generation
    /// taken before this returns, so a `reset` issued before the future is
    /// first polled still discards its result. State is updated and the
    /// failure is also returned, so callers can either observe state or
    /// handle the `Result`.
    pub fn execute(
        &self,
        overrides: RequestOverrides,
    ) -> impl Future<Output = Result<T, FetchError>> + Send + use<T> {
        self.start(Ok(overrides))
    }

    /// Start a call whose overrides may have failed to build. A build failure
    /// settles through the same path as a failed request.
    pub(crate) fn start(
        &self,
        overrides: Result<RequestOverrides, FetchError>,
    ) -> impl Future<Output = Result<T, FetchError>> + Send + use<T> {
        let request = overrides.map(|overrides| self.inner.config.merged(overrides));
        let generation = self.begin();
        if let Ok(request) = &request {
            tracing::debug!(target: "nudge_client::executor", generation, method=%request.method, target_url=%request.target, "execute");
        }

        let this = self.clone();
        async move {
            let result = match request {
                Ok(request) => this.perform(request).await,
                Err(error) => Err(error),
            };
            match &result {
                Ok(data) => this.settle_success(generation, data),
                Err(error) => this.settle_failure(generation, error),
            }
            result
        }
    }

    /// Return to the idle state, abandoning observation of any in-flight call.
    pub fn reset(&self) {
        let (version, snapshot) = {
            let mut tracked = lock(&self.inner.tracked);
            tracked.generation += 1;
            tracked.transition(|state| *state = RequestState::default())
        };
        self.inner.listeners.notify(version, snapshot);
    }

    fn begin(&self) -> u64 {
        let (generation, version, snapshot) = {
            let mut tracked = lock(&self.inner.tracked);
            tracked.generation += 1;
            let generation = tracked.generation;
            let (version, snapshot) = tracked.transition(RequestState::begin);
            (generation, version, snapshot)
        };
        self.inner.listeners.notify(version, snapshot);
        generation
    }

    async fn perform(&self, request: RequestConfig) -> Result<T, FetchError> {
        if request.target.trim().is_empty() {
            return Err(FetchError::InvalidInput(
                "request target must not be empty".into(),
            ));
        }
        let response = self
            .inner
            .transport
            .send(HttpTransportRequest::from_config(request))
            .await?;
        decode_response(&response)
    }

    fn settle_success(&self, generation: u64, data: &T) {
        let (version, snapshot) = {
            let mut tracked = lock(&self.inner.tracked);
            if tracked.generation != generation {
                tracing::debug!(target: "nudge_client::executor", generation, current = tracked.generation, "discarding superseded success");
                return;
            }
            tracked.transition(|state| state.succeed(data.clone()))
        };
        self.inner.listeners.notify(version, snapshot);
        if let Some(cb) = &self.inner.on_success {
            cb(data);
        }
    }

    fn settle_failure(&self, generation: u64, error: &FetchError) {
        let message = normalize_message(error);
        let (version, snapshot) = {
            let mut tracked = lock(&self.inner.tracked);
            if tracked.generation != generation {
                tracing::debug!(target: "nudge_client::executor", generation, current = tracked.generation, "discarding superseded failure");
                return;
            }
            tracked.transition(|state| state.fail(message.clone()))
        };
        tracing::warn!(target: "nudge_client::executor", generation, status = ?error.status(), error = %message, "request failed");
        self.inner.listeners.notify(version, snapshot);
        if let Some(cb) = &self.inner.on_error {
            cb(error);
        }
    }
}

/// Decode a transport response into `T`, classifying non-2xx statuses.
pub(crate) fn decode_response<T: DeserializeOwned>(
    response: &HttpTransportResponse,
) -> Result<T, FetchError> {
    if !response.is_success() {
        return Err(classify_response(response.status, &response.body));
    }
    let decoded = if response.body.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(serde_json::Value::Null)
    } else {
        serde_json::from_slice(&response.body)
    };
    decoded.map_err(|e| FetchError::ParseError(e.to_string()))
}

/// Builder for [`RequestExecutor`].
pub struct RequestExecutorBuilder<T> {
    transport: Arc<dyn HttpTransport>,
    config: RequestConfig,
    on_success: Option<SuccessCallback<T>>,
    on_error: Option<ErrorCallback>,
}

impl<T> RequestExecutorBuilder<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn on_success(mut self, callback: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&FetchError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }

    pub fn build(self) -> RequestExecutor<T> {
        RequestExecutor {
            inner: Arc::new(Inner {
                transport: self.transport,
                config: self.config,
                on_success: self.on_success,
                on_error: self.on_error,
                tracked: Mutex::new(Tracked {
                    generation: 0,
                    version: 0,
                    state: RequestState::default(),
                }),
                listeners: Listeners::default(),
            }),
        }
    }
}
