//! Observable request state
//!
//! `RequestState` is the `{data, loading, error}` triple each executor owns.
//! `Listeners` is the small observer registry used to push every transition
//! to subscribers (UI bindings, tests, the chat ledger).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Lifecycle state of a single executor.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestState<T> {
    /// Last successful payload.
    pub data: Option<T>,
    /// True exactly while a tracked call is in flight.
    pub loading: bool,
    /// Normalized message of the last failed settle.
    pub error: Option<String>,
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> RequestState<T> {
    /// Neither loading nor holding data or an error.
    pub fn is_idle(&self) -> bool {
        self.data.is_none() && !self.loading && self.error.is_none()
    }

    pub(crate) fn begin(&mut self) {
        self.data = None;
        self.loading = true;
        self.error = None;
    }

    pub(crate) fn succeed(&mut self, data: T) {
        self.data = Some(data);
        self.loading = false;
        self.error = None;
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.data = None;
        self.loading = false;
        self.error = Some(message);
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked with a snapshot after every transition.
pub type Listener<S> = Arc<dyn Fn(&S) + Send + Sync>;

/// Registry of state listeners.
///
/// Every snapshot carries the version its owner stamped on it while holding
/// its state lock. Delivery is serialized: a snapshot whose version is not
/// newer than one already accepted is dropped, and a snapshot arriving while
/// another thread is delivering is handed to that thread, which delivers it
/// once the current round of callbacks returns. Subscribers therefore always
/// end on the newest state, though concurrent bursts may be coalesced.
pub struct Listeners<S> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(SubscriptionId, Listener<S>)>>,
    dispatch: Mutex<Dispatch<S>>,
}

struct Dispatch<S> {
    accepted: u64,
    pending: Option<S>,
    delivering: bool,
}

/// Clears `delivering` if a listener panics mid-round.
struct DeliveryGuard<'a, S>(&'a Mutex<Dispatch<S>>);

impl<S> Drop for DeliveryGuard<'_, S> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut dispatch = lock(self.0);
            dispatch.delivering = false;
            dispatch.pending = None;
        }
    }
}

impl<S> Default for Listeners<S> {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: Mutex::new(Vec::new()),
            dispatch: Mutex::new(Dispatch {
                accepted: 0,
                pending: None,
                delivering: false,
            }),
        }
    }
}

impl<S> Listeners<S> {
    pub fn subscribe(&self, listener: Listener<S>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.entries).push((id, listener));
        id
    }

    /// Returns false if the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `snapshot`, stamped with `version`, to every listener.
    ///
    /// Versions must increase with each transition of the owning state.
    /// Listeners are called without any lock held, so they may subscribe,
    /// unsubscribe or trigger further transitions re-entrantly.
    pub fn notify(&self, version: u64, snapshot: S) {
        let mut dispatch = lock(&self.dispatch);
        if version <= dispatch.accepted {
            return;
        }
        dispatch.accepted = version;
        dispatch.pending = Some(snapshot);
        if dispatch.delivering {
            return;
        }
        dispatch.delivering = true;

        let _guard = DeliveryGuard(&self.dispatch);
        while let Some(snapshot) = dispatch.pending.take() {
            drop(dispatch);
            let listeners: Vec<Listener<S>> = lock(&self.entries)
                .iter()
                .map(|(_, listener)| listener.clone())
                .collect();
            for listener in listeners {
                listener(&snapshot);
            }
            dispatch = lock(&self.dispatch);
        }
        dispatch.delivering = false;
    }
}

/// Lock a mutex, recovering the guard if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
