//! Broker engine
//!
//! This module contains the in-memory broker responsible for:
//! - handing published messages to consumers through a single delivery queue
//! - tracking every delivery that has not been acknowledged yet
//! - requeueing a delivery under a new id when asked to, or when its TTL
//!   expires without an acknowledgement
//!
//! Concurrency and usage notes:
//! - `Broker` is a cheap clonable handle; all clones share the same state.
//! - The pending table, the closed flag and the queue sender live in one
//!   `State` behind one mutex. The lock is never held across an `.await`;
//!   the queue is unbounded so enqueueing under the lock cannot block.
//! - Each published delivery spawns one watchdog task on the Tokio runtime
//!   the broker was created in, so producers may run on plain threads.
//!   A watchdog is neutralized by removing its id from the pending table,
//!   so its check runs under the same lock as `acknowledge`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use rand::Rng;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info, trace};

use crate::broker::context::Context;
use crate::broker::message::{Delivery, DeliveryId, Message};
use crate::broker::stream::DeliveryStream;
use crate::utils::error::{BrokerError, Result};

#[derive(Debug)]
struct State {
    closed: bool,
    pending: HashMap<DeliveryId, Message>,
    sender: Option<UnboundedSender<Delivery>>,
}

impl State {
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(BrokerError::Closed)
        } else {
            Ok(())
        }
    }

    /// Random non-negative id not currently pending.
    fn next_id(&self) -> DeliveryId {
        let mut rng = rand::thread_rng();
        loop {
            let id = rng.gen_range(0..=DeliveryId::MAX);
            if !self.pending.contains_key(&id) {
                return id;
            }
            debug!(id, "delivery id collision, regenerating");
        }
    }

    fn enqueue(&mut self, message: Message) -> Result<DeliveryId> {
        self.ensure_open()?;
        let sender = self.sender.as_ref().ok_or(BrokerError::Closed)?;

        let id = self.next_id();
        sender
            .send(Delivery::new(id, message.clone()))
            .map_err(|_| BrokerError::Closed)?;
        self.pending.insert(id, message);
        Ok(id)
    }

    fn take(&mut self, id: DeliveryId) -> Result<Message> {
        self.ensure_open()?;
        self.pending.remove(&id).ok_or(BrokerError::InvalidId(id))
    }

    fn requeue(&mut self, id: DeliveryId) -> Result<DeliveryId> {
        let message = self.take(id)?;
        self.enqueue(message)
    }
}

#[derive(Debug)]
struct Inner {
    state: Mutex<State>,
    deliveries: DeliveryStream,
    ttl: Duration,
    runtime: Handle,
}

/// At-least-once, in-memory message broker with a single global queue.
#[derive(Debug, Clone)]
pub struct Broker {
    inner: Arc<Inner>,
}

impl Broker {
    /// Create a broker whose deliveries are requeued after `ttl` unless
    /// acknowledged first.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime. Use `with_runtime` to
    /// build a broker from a plain thread.
    pub fn new(ttl: Duration) -> Self {
        Self::with_runtime(ttl, Handle::current())
    }

    /// Create a broker whose watchdogs run on `runtime`.
    pub fn with_runtime(ttl: Duration, runtime: Handle) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    closed: false,
                    pending: HashMap::new(),
                    sender: Some(sender),
                }),
                deliveries: DeliveryStream::new(receiver),
                ttl,
                runtime,
            }),
        }
    }

    /// How long a delivery may stay unacknowledged before it is requeued.
    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of deliveries published but not yet acknowledged.
    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Publish `message` and return the id of its first delivery.
    ///
    /// Returns once the delivery is enqueued, not once it is consumed.
    /// May be called from any thread; the delivery's watchdog is spawned
    /// on the broker's runtime.
    pub fn publish(&self, ctx: &Context, message: Message) -> Result<DeliveryId> {
        ctx.check()?;
        let id = self.lock().enqueue(message)?;
        debug!(id, "published");
        self.arm_watchdog(id);
        Ok(id)
    }

    /// Get a handle on the delivery queue.
    ///
    /// All handles share the same queue; closing the broker ends every one
    /// of them.
    pub fn subscribe(&self, ctx: &Context) -> Result<DeliveryStream> {
        ctx.check()?;
        self.lock().ensure_open()?;
        Ok(self.inner.deliveries.clone())
    }

    /// Mark delivery `id` as handled. Its watchdog will not requeue it.
    pub fn acknowledge(&self, ctx: &Context, id: DeliveryId) -> Result<()> {
        ctx.check()?;
        self.lock().take(id)?;
        debug!(id, "acknowledged");
        Ok(())
    }

    /// Put the message of delivery `id` back on the queue under a new id,
    /// which is returned. `id` stops being valid.
    pub fn requeue(&self, ctx: &Context, id: DeliveryId) -> Result<DeliveryId> {
        ctx.check()?;
        let new_id = self.lock().requeue(id)?;
        debug!(id, new_id, "requeued");
        self.arm_watchdog(new_id);
        Ok(new_id)
    }

    /// Shut the broker down.
    ///
    /// Every later operation fails with `Closed`, pending deliveries are
    /// dropped, and consumers see the end of the delivery stream once the
    /// already-buffered deliveries are drained. Closing twice returns
    /// `Closed`.
    pub fn close(&self) -> Result<()> {
        let mut state = self.lock();
        state.ensure_open()?;
        state.closed = true;
        state.sender = None;
        let dropped = state.pending.len();
        state.pending.clear();
        drop(state);

        info!(dropped, "broker closed");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn arm_watchdog(&self, id: DeliveryId) {
        let inner = Arc::downgrade(&self.inner);
        let ttl = self.inner.ttl;
        self.inner.runtime.spawn(async move {
            tokio::time::sleep(ttl).await;
            Self::on_ttl_expired(inner, id);
        });
    }

    fn on_ttl_expired(inner: Weak<Inner>, id: DeliveryId) {
        let Some(inner) = inner.upgrade() else {
            return;
        };
        let broker = Broker { inner };

        // Acknowledged or already requeued deliveries are gone from the
        // table, which turns this into a no-op.
        match broker.requeue(&Context::background(), id) {
            Ok(new_id) => debug!(id, new_id, "ttl expired, redelivering"),
            Err(err) => trace!(id, %err, "watchdog found nothing to requeue"),
        }
    }
}
