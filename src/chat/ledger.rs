//! Message retry ledger
//!
//! Ordered, append-only list of chat records. `send` appends a pending local
//! record and posts it; `retry` flips a failed record back to pending and
//! posts it again under the same id. Records are mutated in place, never
//! reordered or duplicated.

use super::config::ChatConfig;
use super::notice::{Notice, NoticeBoard};
use super::types::{
    ChatContext, ChatRequestBody, MessageId, MessageRecord, MessageStatus, NudgeResponse,
};
use crate::enrichment::EnrichmentCache;
use crate::error::{FetchError, normalize_message};
use crate::execution::executors::SubmitExecutor;
use crate::execution::http::HttpTransport;
use crate::execution::request::RequestConfig;
use crate::execution::state::{Listener, Listeners, SubscriptionId, lock};
use std::sync::{Arc, Mutex};

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    Delivered {
        id: MessageId,
        reply_id: MessageId,
        response: NudgeResponse,
    },
    Failed {
        id: MessageId,
        error: FetchError,
    },
}

impl DeliveryOutcome {
    /// Id of the local message this attempt was for.
    pub fn id(&self) -> &MessageId {
        match self {
            Self::Delivered { id, .. } | Self::Failed { id, .. } => id,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

struct LedgerInner {
    executor: SubmitExecutor<NudgeResponse>,
    enrichment: Arc<EnrichmentCache>,
    config: ChatConfig,
    records: Mutex<Records>,
    notices: NoticeBoard,
    listeners: Listeners<Vec<MessageRecord>>,
}

#[derive(Default)]
struct Records {
    /// Bumped on every mutation; stamps listener snapshots.
    version: u64,
    list: Vec<MessageRecord>,
}

/// Chat message ledger. Cloning shares the same records.
#[derive(Clone)]
pub struct MessageRetryLedger {
    inner: Arc<LedgerInner>,
}

impl std::fmt::Debug for MessageRetryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageRetryLedger")
            .field("endpoint", &self.inner.config.endpoint)
            .field("records", &lock(&self.inner.records).list.len())
            .finish()
    }
}

impl MessageRetryLedger {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        enrichment: Arc<EnrichmentCache>,
        config: ChatConfig,
    ) -> Self {
        let executor = SubmitExecutor::new(transport, RequestConfig::new(config.endpoint.clone()));
        Self::with_executor(executor, enrichment, config)
    }

    /// Build around an existing executor; `config.endpoint` is then unused.
    pub fn with_executor(
        executor: SubmitExecutor<NudgeResponse>,
        enrichment: Arc<EnrichmentCache>,
        config: ChatConfig,
    ) -> Self {
        Self {
            inner: Arc::new(LedgerInner {
                executor,
                enrichment,
                notices: NoticeBoard::new(config.notice_ttl),
                config,
                records: Mutex::new(Records::default()),
                listeners: Listeners::default(),
            }),
        }
    }

    /// Append a local message and deliver it.
    ///
    /// Fails only for blank input, in which case nothing is recorded.
    /// Delivery failures are reported through the returned outcome, the
    /// record's status and the notice board.
    pub async fn send(&self, text: impl Into<String>) -> Result<DeliveryOutcome, FetchError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(FetchError::InvalidInput("message must not be blank".into()));
        }

        let id = MessageId::new();
        self.mutate(|records| records.push(MessageRecord::local(id.clone(), text.clone())));
        tracing::debug!(target: "nudge_client::chat", message_id = %id, "message queued");

        Ok(self.deliver(id, text).await)
    }

    /// Resend a failed message under its original id and original text.
    ///
    /// Returns `None` without side effects unless the record exists and is
    /// currently failed.
    pub async fn retry(&self, id: &MessageId) -> Option<DeliveryOutcome> {
        let text = self.mutate_if(|records| {
            let record = records.iter_mut().find(|r| &r.id == id)?;
            if !record.status.can_transition_to(MessageStatus::Pending) {
                return None;
            }
            record.status = MessageStatus::Pending;
            Some(record.text.clone())
        });

        let Some(text) = text else {
            tracing::debug!(target: "nudge_client::chat", message_id = %id, "retry ignored: message is not failed");
            return None;
        };
        tracing::debug!(target: "nudge_client::chat", message_id = %id, "retrying message");
        Some(self.deliver(id.clone(), text).await)
    }

    async fn deliver(&self, id: MessageId, text: String) -> DeliveryOutcome {
        let snapshot = self.inner.enrichment.resolve().await;
        let body = ChatRequestBody {
            message: &text,
            context: ChatContext {
                enrichment: &snapshot,
                extra: &self.inner.config.context,
            },
        };

        match self.inner.executor.submit(&body).await {
            Ok(response) => {
                let reply = MessageRecord::remote(response.nudge.clone());
                let reply_id = reply.id.clone();
                self.mutate(|records| {
                    set_status(records, &id, MessageStatus::Settled);
                    records.push(reply);
                });
                tracing::debug!(target: "nudge_client::chat", message_id = %id, reply_id = %reply_id, "message settled");
                DeliveryOutcome::Delivered {
                    id,
                    reply_id,
                    response,
                }
            }
            Err(error) => {
                let message = normalize_message(&error);
                self.mutate(|records| set_status(records, &id, MessageStatus::Failed));
                tracing::warn!(target: "nudge_client::chat", message_id = %id, error = %message, "message failed to send");
                self.inner.notices.show(message);
                DeliveryOutcome::Failed { id, error }
            }
        }
    }

    /// Apply `f` to the records and notify listeners with the result.
    fn mutate(&self, f: impl FnOnce(&mut Vec<MessageRecord>)) {
        self.mutate_if(|records| {
            f(records);
            Some(())
        });
    }

    /// Like [`Self::mutate`], but a `None` from `f` means nothing changed and
    /// listeners are not notified.
    fn mutate_if<R>(&self, f: impl FnOnce(&mut Vec<MessageRecord>) -> Option<R>) -> Option<R> {
        let (out, version, snapshot) = {
            let mut records = lock(&self.inner.records);
            let out = f(&mut records.list)?;
            records.version += 1;
            (out, records.version, records.list.clone())
        };
        self.inner.listeners.notify(version, snapshot);
        Some(out)
    }

    /// All records in creation order.
    pub fn records(&self) -> Vec<MessageRecord> {
        lock(&self.inner.records).list.clone()
    }

    pub fn get(&self, id: &MessageId) -> Option<MessageRecord> {
        lock(&self.inner.records)
            .list
            .iter()
            .find(|r| &r.id == id)
            .cloned()
    }

    /// Rendered text of a record, annotated when its send failed.
    pub fn display_text(&self, id: &MessageId) -> Option<String> {
        self.get(id)
            .map(|r| r.display_text_with(&self.inner.config.failure_suffix))
    }

    pub fn len(&self) -> usize {
        lock(&self.inner.records).list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The failure notice currently showing, if any.
    pub fn notice(&self) -> Option<Notice> {
        self.inner.notices.current()
    }

    pub fn dismiss_notice(&self) {
        self.inner.notices.dismiss();
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.inner.notices
    }

    pub fn subscribe(&self, listener: Listener<Vec<MessageRecord>>) -> SubscriptionId {
        self.inner.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.listeners.unsubscribe(id)
    }

    pub fn executor(&self) -> &SubmitExecutor<NudgeResponse> {
        &self.inner.executor
    }
}

fn set_status(records: &mut [MessageRecord], id: &MessageId, next: MessageStatus) {
    let Some(record) = records.iter_mut().find(|r| &r.id == id) else {
        return;
    };
    if record.status.can_transition_to(next) {
        record.status = next;
    } else {
        tracing::warn!(target: "nudge_client::chat", message_id = %id, from = ?record.status, to = ?next, "ignoring invalid status transition");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::{EnvironmentProbe, UnavailableGeolocation};
    use crate::execution::http::{HttpTransportRequest, HttpTransportResponse};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::time::Duration;

    struct Probe;

    impl EnvironmentProbe for Probe {
        fn user_agent(&self) -> String {
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile Safari/604.1".into()
        }

        fn timezone(&self) -> Option<String> {
            Some("America/New_York".into())
        }
    }

    #[derive(Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<HttpTransportResponse>>,
        bodies: Mutex<Vec<Value>>,
    }

    impl ScriptedTransport {
        fn with(replies: Vec<HttpTransportResponse>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                bodies: Mutex::default(),
            })
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn send(
            &self,
            request: HttpTransportRequest,
        ) -> Result<HttpTransportResponse, FetchError> {
            self.bodies
                .lock()
                .unwrap()
                .push(request.body.unwrap_or(Value::Null));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| FetchError::TransportError("no scripted reply".into()))
        }
    }

    fn ledger(transport: Arc<ScriptedTransport>) -> MessageRetryLedger {
        let enrichment = Arc::new(EnrichmentCache::new(
            Arc::new(Probe),
            Arc::new(UnavailableGeolocation),
        ));
        MessageRetryLedger::new(
            transport,
            enrichment,
            ChatConfig::new().with_context("lessonId", json!("etf-101")),
        )
    }

    fn ok(nudge: &str) -> HttpTransportResponse {
        HttpTransportResponse::json(200, &json!({ "nudge": nudge }))
    }

    fn fail(error: &str) -> HttpTransportResponse {
        HttpTransportResponse::json(500, &json!({ "error": error }))
    }

    #[tokio::test(start_paused = true)]
    async fn send_then_retry_preserves_identity() {
        let transport = ScriptedTransport::with(vec![fail("rate_limited"), ok("Noted.")]);
        let ledger = ledger(transport.clone());

        let outcome = ledger.send("Buy AAPL").await.unwrap();
        let id = outcome.id().clone();
        assert!(!outcome.is_delivered());
        assert_eq!(ledger.get(&id).unwrap().status, MessageStatus::Failed);
        assert_eq!(ledger.display_text(&id).as_deref(), Some("Buy AAPL (Failed to send)"));
        assert_eq!(ledger.notice().map(|n| n.message).as_deref(), Some("rate_limited"));

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(ledger.notice().is_none());

        let retried = ledger.retry(&id).await.unwrap();
        assert!(retried.is_delivered());
        assert_eq!(retried.id(), &id);

        let records = ledger.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].status, MessageStatus::Settled);
        assert_eq!(records[0].display_text(), "Buy AAPL");
        assert_eq!(records[1].origin, crate::chat::Origin::Remote);
        assert_eq!(records[1].text, "Noted.");
        assert_eq!(records[1].status, MessageStatus::Settled);

        let bodies = transport.bodies.lock().unwrap();
        assert_eq!(bodies[1]["message"], "Buy AAPL");
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_failure_keeps_single_annotation() {
        let transport = ScriptedTransport::with(vec![fail("down"), fail("still down")]);
        let ledger = ledger(transport);

        let id = ledger.send("Sell TSLA").await.unwrap().id().clone();
        let second = ledger.retry(&id).await.unwrap();

        assert!(!second.is_delivered());
        assert_eq!(second.id(), &id);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.display_text(&id).as_deref(), Some("Sell TSLA (Failed to send)"));
        assert_eq!(ledger.get(&id).unwrap().text, "Sell TSLA");
        assert_eq!(ledger.notice().map(|n| n.message).as_deref(), Some("still down"));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_is_guarded() {
        let transport = ScriptedTransport::with(vec![ok("Hi!")]);
        let ledger = ledger(transport.clone());

        let outcome = ledger.send("Hello").await.unwrap();
        assert!(outcome.is_delivered());

        assert!(ledger.retry(outcome.id()).await.is_none());
        assert!(ledger.retry(&MessageId::from("missing")).await.is_none());
        assert_eq!(transport.bodies.lock().unwrap().len(), 1);
        assert_eq!(ledger.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_resends_the_composed_text_verbatim() {
        let typed = "Why did my order say (Failed to send)";
        let transport = ScriptedTransport::with(vec![fail("down"), ok("Let me check.")]);
        let ledger = ledger(transport.clone());

        let id = ledger.send(typed).await.unwrap().id().clone();
        assert_eq!(ledger.get(&id).unwrap().text, typed);

        assert!(ledger.retry(&id).await.unwrap().is_delivered());
        assert_eq!(ledger.get(&id).unwrap().text, typed);

        let bodies = transport.bodies.lock().unwrap();
        assert_eq!(bodies[0]["message"], typed);
        assert_eq!(bodies[1]["message"], typed);
    }

    #[tokio::test(start_paused = true)]
    async fn ignored_retry_does_not_notify() {
        let transport = ScriptedTransport::with(vec![ok("Hi!")]);
        let ledger = ledger(transport);
        let id = ledger.send("Hello").await.unwrap().id().clone();

        let calls = Arc::new(Mutex::new(0));
        let sink = calls.clone();
        ledger.subscribe(Arc::new(move |_: &Vec<MessageRecord>| *sink.lock().unwrap() += 1));

        assert!(ledger.retry(&id).await.is_none());
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn failed_send_is_logged() {
        let transport = ScriptedTransport::with(vec![fail("rate_limited")]);
        let ledger = ledger(transport);

        ledger.send("Buy AAPL").await.unwrap();

        assert!(logs_contain("message failed to send"));
        assert!(logs_contain("rate_limited"));
    }

    #[tokio::test(start_paused = true)]
    async fn blank_message_is_rejected() {
        let transport = ScriptedTransport::with(vec![]);
        let ledger = ledger(transport.clone());

        let err = ledger.send("   ").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidInput(_)));
        assert!(ledger.is_empty());
        assert!(transport.bodies.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn payload_carries_enrichment_and_caller_context() {
        let transport = ScriptedTransport::with(vec![ok("ok")]);
        let ledger = ledger(transport.clone());
        ledger.send("What is an ETF?").await.unwrap();

        let bodies = transport.bodies.lock().unwrap();
        assert_eq!(
            bodies[0],
            json!({
                "message": "What is an ETF?",
                "context": {
                    "deviceInfo": { "class": "mobile", "os": "iOS", "agent": "Safari" },
                    "location": { "timezone": "America/New_York" },
                    "lessonId": "etf-101"
                }
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn listeners_observe_pending_before_settle() {
        let transport = ScriptedTransport::with(vec![ok("Sure.")]);
        let ledger = ledger(transport);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        ledger.subscribe(Arc::new(move |records: &Vec<MessageRecord>| {
            sink.lock()
                .unwrap()
                .push(records.iter().map(|r| r.status).collect::<Vec<_>>());
        }));

        ledger.send("Rebalance?").await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                vec![MessageStatus::Pending],
                vec![MessageStatus::Settled, MessageStatus::Settled],
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_sends_keep_creation_order() {
        let transport = ScriptedTransport::with(vec![ok("one"), ok("two")]);
        let ledger = ledger(transport);

        let (a, b) = tokio::join!(ledger.send("first"), ledger.send("second"));
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(a.is_delivered() && b.is_delivered());

        let records = ledger.records();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].id, *a.id());
        assert_eq!(records[1].id, *b.id());
        assert!(records.iter().all(|r| r.status == MessageStatus::Settled));
    }
}
