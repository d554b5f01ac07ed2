//! Instance-allocation completion notification.
//!
//! The compiler's task graph is scheduled by an external runtime that
//! acquires worker instances asynchronously. The contract here is small but
//! strict: every outstanding request receives **exactly one** completion,
//! carrying its correlation id's descriptor, and the completion must be
//! deliverable from a context other than the call path that placed the
//! request — the scheduler treats "resource ready" plus its own transition
//! of the pending task as one atomic step, so the allocator must never be
//! able to re-enter the requester synchronously.
//!
//! Each request is a one-shot completion channel keyed by a correlation id.
//! [`InstanceNotifier::notify`] hands the descriptor to the ticket's channel
//! and forgets the request, so a second completion for the same id is
//! rejected instead of delivered twice; the requester blocks only on its own
//! [`AllocationTicket`], never on the allocator.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Correlation identifier of one allocation request.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RequestId(u64);

impl RequestId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Descriptor of an allocated worker instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceDescriptor {
    /// Instance name or address, as reported by the resource manager.
    pub name: String,
    /// Number of parallel task slots the instance offers.
    pub slots: usize,
}

/// The requester's half of one outstanding allocation.
pub struct AllocationTicket {
    id: RequestId,
    rx: Receiver<InstanceDescriptor>,
}

impl AllocationTicket {
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Block until the allocation completes.
    ///
    /// Returns `None` if the notifier was dropped with the request still
    /// outstanding.
    pub fn wait(self) -> Option<InstanceDescriptor> {
        self.rx.recv().ok()
    }

    /// Non-blocking probe for an already-delivered completion.
    pub fn try_wait(&self) -> Option<InstanceDescriptor> {
        self.rx.try_recv().ok()
    }
}

/// Tracks outstanding allocation requests and delivers their completions.
#[derive(Default)]
pub struct InstanceNotifier {
    next_id: AtomicU64,
    pending: Mutex<HashMap<RequestId, Sender<InstanceDescriptor>>>,
}

impl InstanceNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new outstanding request and return its ticket.
    pub fn register(&self) -> AllocationTicket {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = bounded(1);
        self.pending
            .lock()
            .expect("allocation table poisoned")
            .insert(id, tx);
        debug!(request = id.raw(), "allocation requested");
        AllocationTicket { id, rx }
    }

    /// Deliver the completion for `id`.
    ///
    /// Exactly-once: the request is removed before the descriptor is sent,
    /// so a repeated completion for the same id returns `false` and delivers
    /// nothing. The send never blocks (the channel holds one slot and only
    /// ever sees one send), so this is safe to call from any context — in
    /// particular it cannot re-enter or stall the requesting call path.
    pub fn notify(&self, id: RequestId, instance: InstanceDescriptor) -> bool {
        let tx = self
            .pending
            .lock()
            .expect("allocation table poisoned")
            .remove(&id);
        match tx {
            Some(tx) => {
                debug!(request = id.raw(), instance = %instance.name, "allocation completed");
                // A dropped ticket makes the send fail; the request is still
                // considered consumed.
                tx.try_send(instance).is_ok()
            }
            None => false,
        }
    }

    /// Number of requests still awaiting completion.
    pub fn outstanding(&self) -> usize {
        self.pending
            .lock()
            .expect("allocation table poisoned")
            .len()
    }
}
