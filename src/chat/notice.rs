//! Transient failure notice.
//!
//! Holds at most one notice. Showing a new one cancels the previous expiry
//! timer before arming a fresh one, and dropping the board cancels any armed
//! timer, so expiry never touches a board that is gone.

use crate::execution::state::{Listener, Listeners, SubscriptionId, lock};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub message: String,
    pub shown_at: DateTime<Utc>,
}

#[derive(Default)]
struct Slot {
    current: Option<Notice>,
    timer: Option<CancellationToken>,
    next_id: u64,
    /// Bumped on every change; stamps listener snapshots.
    version: u64,
}

impl Slot {
    fn changed(&mut self) -> (u64, Option<Notice>) {
        self.version += 1;
        (self.version, self.current.clone())
    }
}

struct BoardInner {
    ttl: Duration,
    slot: Mutex<Slot>,
    listeners: Listeners<Option<Notice>>,
}

impl BoardInner {
    /// Clear the notice if `id` is still the one showing.
    fn expire(&self, id: u64) {
        let (version, snapshot) = {
            let mut slot = lock(&self.slot);
            if slot.current.as_ref().map(|n| n.id) != Some(id) {
                return;
            }
            slot.current = None;
            slot.timer = None;
            slot.changed()
        };
        tracing::debug!(target: "nudge_client::chat", notice_id = id, "notice expired");
        self.listeners.notify(version, snapshot);
    }
}

pub struct NoticeBoard {
    inner: Arc<BoardInner>,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(BoardInner {
                ttl,
                slot: Mutex::new(Slot::default()),
                listeners: Listeners::default(),
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Show `message`, replacing any current notice and restarting expiry.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn show(&self, message: impl Into<String>) -> Notice {
        let token = CancellationToken::new();
        let (notice, version) = {
            let mut slot = lock(&self.inner.slot);
            if let Some(previous) = slot.timer.take() {
                previous.cancel();
            }
            slot.next_id += 1;
            let notice = Notice {
                id: slot.next_id,
                message: message.into(),
                shown_at: Utc::now(),
            };
            slot.current = Some(notice.clone());
            slot.timer = Some(token.clone());
            let (version, _) = slot.changed();
            (notice, version)
        };

        let weak: Weak<BoardInner> = Arc::downgrade(&self.inner);
        let ttl = self.inner.ttl;
        let id = notice.id;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(ttl) => {
                    if let Some(inner) = weak.upgrade() {
                        inner.expire(id);
                    }
                }
            }
        });

        self.inner.listeners.notify(version, Some(notice.clone()));
        notice
    }

    /// Clear the current notice immediately.
    pub fn dismiss(&self) {
        let change = {
            let mut slot = lock(&self.inner.slot);
            if let Some(timer) = slot.timer.take() {
                timer.cancel();
            }
            slot.current.take().map(|_| slot.changed())
        };
        if let Some((version, snapshot)) = change {
            self.inner.listeners.notify(version, snapshot);
        }
    }

    pub fn current(&self) -> Option<Notice> {
        lock(&self.inner.slot).current.clone()
    }

    pub fn subscribe(&self, listener: Listener<Option<Notice>>) -> SubscriptionId {
        self.inner.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.listeners.unsubscribe(id)
    }
}

impl Drop for NoticeBoard {
    fn drop(&mut self) {
        if let Some(timer) = lock(&self.inner.slot).timer.take() {
            timer.cancel();
        }
    }
}
