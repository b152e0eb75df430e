//! Pending-request table.
//!
//! Maps each outstanding correlation ID to the oneshot sender its caller is
//! awaiting. An entry leaves the table exactly once: when its response
//! arrives, when the caller gives up, or in bulk when the connection dies.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use tokio::sync::oneshot;

use crate::error::{ClientError, Result};
use crate::protocol::{CorrelationIds, Opcode};

/// Receiving side handed to the caller.
pub type ResponseReceiver = oneshot::Receiver<Result<Bytes>>;

struct Entry {
    opcode: Opcode,
    tx: oneshot::Sender<Result<Bytes>>,
}

#[derive(Default)]
struct Inner {
    ids: CorrelationIds,
    entries: HashMap<u32, Entry>,
    closed: bool,
}

/// Correlation ID to waiting caller.
#[derive(Default)]
pub struct PendingTable {
    inner: Mutex<Inner>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocate a correlation ID and register a waiter for it.
    ///
    /// Fails with `ConnectionClosed` once [`fail_all`](Self::fail_all) has run.
    pub fn register(&self, opcode: Opcode) -> Result<(u32, ResponseReceiver)> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(ClientError::ConnectionClosed);
        }

        let Inner { ids, entries, .. } = &mut *inner;
        let id = ids
            .allocate(|id| entries.contains_key(&id))
            .ok_or_else(|| ClientError::Protocol("No free correlation ID".to_string()))?;

        let (tx, rx) = oneshot::channel();
        entries.insert(id, Entry { opcode, tx });
        tracing::trace!(correlation_id = id, %opcode, "Registered pending request");
        Ok((id, rx))
    }

    /// Deliver a response payload. Returns `false` if nobody waits for `id`.
    pub fn complete(&self, id: u32, payload: Bytes) -> bool {
        let Some(entry) = self.lock().entries.remove(&id) else {
            return false;
        };
        if entry.tx.send(Ok(payload)).is_err() {
            tracing::debug!(correlation_id = id, opcode = %entry.opcode, "Caller went away before its response");
        }
        true
    }

    /// Drop the waiter for `id`. Safe to call more than once.
    pub fn cancel(&self, id: u32) -> bool {
        self.lock().entries.remove(&id).is_some()
    }

    /// Fail every waiter with `ConnectionClosed` and refuse new registrations.
    ///
    /// Returns the number of callers that were failed.
    pub fn fail_all(&self) -> usize {
        let drained: Vec<(u32, Entry)> = {
            let mut inner = self.lock();
            inner.closed = true;
            inner.entries.drain().collect()
        };

        let count = drained.len();
        for (id, entry) in drained {
            tracing::trace!(correlation_id = id, opcode = %entry.opcode, "Failing pending request");
            let _ = entry.tx.send(Err(ClientError::ConnectionClosed));
        }
        count
    }

    /// Number of outstanding requests.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Removes its entry from the table when dropped.
///
/// Covers every way a caller can stop waiting: explicit cancellation,
/// timeout, or its future being dropped. After a normal completion the
/// entry is already gone and the removal is a no-op.
pub struct PendingGuard<'a> {
    table: &'a PendingTable,
    id: u32,
}

impl<'a> PendingGuard<'a> {
    pub fn new(table: &'a PendingTable, id: u32) -> Self {
        Self { table, id }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.table.cancel(self.id) {
            tracing::debug!(correlation_id = self.id, "Abandoned pending request");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_complete() {
        let table = PendingTable::new();
        let (id, rx) = table.register(Opcode::JoinLobby).unwrap();
        assert_eq!(id, 2);
        assert_eq!(table.len(), 1);

        assert!(table.complete(id, Bytes::from_static(b"ok")));
        assert!(table.is_empty());
        assert_eq!(rx.await.unwrap().unwrap(), Bytes::from_static(b"ok"));
    }

    #[test]
    fn test_complete_unknown_id() {
        let table = PendingTable::new();
        assert!(!table.complete(99, Bytes::new()));
    }

    #[test]
    fn test_ids_are_distinct() {
        let table = PendingTable::new();
        let (a, _ra) = table.register(Opcode::Heartbeat).unwrap();
        let (b, _rb) = table.register(Opcode::Heartbeat).unwrap();
        assert_ne!(a, b);
        assert!(a > 1 && b > 1);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let table = PendingTable::new();
        let (id, _rx) = table.register(Opcode::SetTile).unwrap();
        assert!(table.cancel(id));
        assert!(!table.cancel(id));
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_fail_all_closes_table() {
        let table = PendingTable::new();
        let (_, rx1) = table.register(Opcode::Connect).unwrap();
        let (_, rx2) = table.register(Opcode::ListLobby).unwrap();

        assert_eq!(table.fail_all(), 2);
        assert!(table.is_empty());
        assert!(matches!(rx1.await.unwrap(), Err(ClientError::ConnectionClosed)));
        assert!(matches!(rx2.await.unwrap(), Err(ClientError::ConnectionClosed)));

        let err = table.register(Opcode::Heartbeat).unwrap_err();
        assert!(matches!(err, ClientError::ConnectionClosed));
    }

    #[test]
    fn test_guard_removes_entry_on_drop() {
        let table = PendingTable::new();
        let (id, _rx) = table.register(Opcode::Cancel).unwrap();
        {
            let _guard = PendingGuard::new(&table, id);
        }
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_guard_after_completion_is_noop() {
        let table = PendingTable::new();
        let (id, rx) = table.register(Opcode::Ready).unwrap();
        let guard = PendingGuard::new(&table, id);
        assert!(table.complete(id, Bytes::new()));
        drop(guard);
        assert!(rx.await.unwrap().unwrap().is_empty());
    }
}
