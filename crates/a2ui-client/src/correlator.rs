//! Request/response correlation.
//!
//! Each outbound request that expects an answer parks a oneshot sender
//! here under its id. The first response carrying that id settles it;
//! anything else is stale and dropped by the caller.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use a2ui_core::{ErrorBody, IdGenerator, RequestId, ResponseEnvelope};
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::ClientError;

/// Outcome delivered to a waiting caller.
pub type Outcome = Result<Value, ClientError>;
/// Waiting caller.
pub type PendingTx = oneshot::Sender<Outcome>;

/// Pending-request table plus the id source for one channel.
#[derive(Debug)]
pub struct Correlator {
    ids: Arc<IdGenerator>,
    pending: HashMap<RequestId, PendingTx>,
}

impl Correlator {
    /// Empty table drawing ids from `ids`.
    pub fn new(ids: Arc<IdGenerator>) -> Self {
        Self {
            ids,
            pending: HashMap::new(),
        }
    }

    /// Next request id.
    pub fn next_id(&self) -> RequestId {
        self.ids.next_id()
    }

    /// Register `id` and return the receiver its outcome will arrive on.
    pub fn register(&mut self, id: RequestId) -> oneshot::Receiver<Outcome> {
        let (tx, rx) = oneshot::channel();
        let _ = self.insert(id, tx);
        rx
    }

    /// Park an existing sender under `id`.
    ///
    /// Entries whose caller has gone away are pruned first. If `id` is
    /// still pending after that, the earlier waiter keeps it and `tx` is
    /// failed with [`ClientError::DuplicateId`].
    pub fn insert(&mut self, id: RequestId, tx: PendingTx) -> bool {
        self.pending.retain(|_, waiting| !waiting.is_closed());
        match self.pending.entry(id) {
            Entry::Occupied(entry) => {
                let _ = tx.send(Err(ClientError::DuplicateId(entry.key().clone())));
                false
            }
            Entry::Vacant(entry) => {
                let _ = entry.insert(tx);
                true
            }
        }
    }

    /// Settle `id` successfully. `false` if nothing was waiting.
    pub fn resolve(&mut self, id: &RequestId, result: Value) -> bool {
        self.settle(id, Ok(result))
    }

    /// Settle `id` with an error. `false` if nothing was waiting.
    pub fn reject(&mut self, id: &RequestId, error: ErrorBody) -> bool {
        self.settle(id, Err(error.into()))
    }

    /// Settle from an inbound response: an `error` field always rejects,
    /// otherwise the result (null when absent) resolves.
    pub fn complete(&mut self, response: ResponseEnvelope) -> bool {
        let id = response.id.clone();
        match response.into_outcome() {
            Ok(result) => self.resolve(&id, result),
            Err(error) => self.reject(&id, error),
        }
    }

    /// Stop waiting for `id`. A later response for it will be stale.
    pub fn forget(&mut self, id: &RequestId) -> bool {
        self.pending.remove(id).is_some()
    }

    /// Fail every pending request with an error built by `make_err`.
    pub fn reject_all(&mut self, make_err: impl Fn() -> ClientError) -> usize {
        let count = self.pending.len();
        for (_, tx) in self.pending.drain() {
            let _ = tx.send(Err(make_err()));
        }
        count
    }

    /// Whether `id` is waiting.
    pub fn is_pending(&self, id: &RequestId) -> bool {
        self.pending.contains_key(id)
    }

    /// Number of waiting requests.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn settle(&mut self, id: &RequestId, outcome: Outcome) -> bool {
        match self.pending.remove(id) {
            Some(tx) => {
                // The caller may have stopped listening; that is not our concern.
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn correlator() -> Correlator {
        Correlator::new(Arc::new(IdGenerator::new()))
    }

    #[test]
    fn ids_increase() {
        let c = correlator();
        assert_eq!(c.next_id().as_str(), "req_1");
        assert_eq!(c.next_id().as_str(), "req_2");
    }

    #[tokio::test]
    async fn response_resolves_matching_waiter() {
        let mut c = correlator();
        let id = c.next_id();
        let rx = c.register(id.clone());
        assert!(c.complete(ResponseEnvelope::success(id, json!({"ok": true}))));
        assert_eq!(rx.await.unwrap().unwrap(), json!({"ok": true}));
        assert!(c.is_empty());
    }

    #[tokio::test]
    async fn error_field_rejects() {
        let mut c = correlator();
        let id = c.next_id();
        let rx = c.register(id.clone());
        assert!(c.complete(ResponseEnvelope::failure(id, -32000, "boom")));
        assert_matches!(
            rx.await.unwrap(),
            Err(ClientError::Rpc { code: -32000, message, .. }) if message == "boom"
        );
    }

    #[tokio::test]
    async fn missing_result_resolves_null() {
        let mut c = correlator();
        let rx = c.register("req_9".into());
        let response: ResponseEnvelope =
            serde_json::from_value(json!({"version": "2.0", "id": "req_9"})).unwrap();
        assert!(c.complete(response));
        assert_eq!(rx.await.unwrap().unwrap(), Value::Null);
    }

    #[test]
    fn unknown_and_repeated_ids_are_stale() {
        let mut c = correlator();
        let _rx = c.register("req_1".into());
        assert!(!c.resolve(&"req_2".into(), json!(1)));
        assert!(c.resolve(&"req_1".into(), json!(1)));
        assert!(!c.resolve(&"req_1".into(), json!(2)));
    }

    #[tokio::test]
    async fn duplicate_registration_fails_newcomer() {
        let mut c = correlator();
        let first = c.register("req_1".into());
        let second = c.register("req_1".into());
        assert_matches!(second.await.unwrap(), Err(ClientError::DuplicateId(_)));
        assert!(c.resolve(&"req_1".into(), json!("first")));
        assert_eq!(first.await.unwrap().unwrap(), json!("first"));
    }

    #[test]
    fn forgotten_ids_become_stale() {
        let mut c = correlator();
        let _rx = c.register("req_1".into());
        assert!(c.forget(&"req_1".into()));
        assert!(!c.is_pending(&"req_1".into()));
        assert!(!c.resolve(&"req_1".into(), json!(null)));
    }

    #[tokio::test]
    async fn reject_all_drains() {
        let mut c = correlator();
        let a = c.register("a".into());
        let b = c.register("b".into());
        assert_eq!(c.reject_all(|| ClientError::Disconnected), 2);
        assert_matches!(a.await.unwrap(), Err(ClientError::Disconnected));
        assert_matches!(b.await.unwrap(), Err(ClientError::Disconnected));
        assert_eq!(c.len(), 0);
    }

    #[test]
    fn dropped_receiver_still_counts_as_settled() {
        let mut c = correlator();
        drop(c.register("req_1".into()));
        assert!(c.resolve(&"req_1".into(), json!(1)));
    }

    #[test]
    fn abandoned_waiters_are_pruned_on_insert() {
        let mut c = correlator();
        let dropped = c.register(RequestId::from("req_1"));
        let kept = c.register(RequestId::from("req_2"));
        drop(dropped);

        let _next = c.register(RequestId::from("req_3"));
        assert_eq!(c.len(), 2);
        assert!(!c.is_pending(&RequestId::from("req_1")));
        assert!(c.is_pending(&RequestId::from("req_2")));
        drop(kept);
    }

    #[test]
    fn abandoned_id_can_be_reused() {
        let mut c = correlator();
        drop(c.register(RequestId::from("custom")));
        let rx = c.register(RequestId::from("custom"));
        assert!(c.resolve(&RequestId::from("custom"), json!(7)));
        assert_eq!(rx.blocking_recv().unwrap().unwrap(), json!(7));
    }
}
