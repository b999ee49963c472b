//! Shard-ordered dispatch over an async transport.
//!
//! Envelopes are routed by `partition_key % lane_count` into per-lane FIFO
//! queues, each drained by a single worker task. One partition always maps
//! to one lane, so its proposals reach the transport in send order;
//! envelopes on different lanes may interleave arbitrarily.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::dispatcher::{Dispatcher, Envelope};

/// Backend that actually moves an envelope to its recipient.
///
/// Delivery failures are terminal from the dispatcher's point of view:
/// they are logged and the envelope is dropped, never retried.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn deliver(&self, envelope: Envelope) -> anyhow::Result<()>;
}

/// Fire-and-forget dispatcher with per-shard ordering.
pub struct ShardedDispatcher {
    lanes: Vec<mpsc::UnboundedSender<Envelope>>,
    workers: Vec<JoinHandle<()>>,
}

impl ShardedDispatcher {
    /// Spawn `lane_count` worker tasks draining into `transport`.
    ///
    /// Must be called from within a tokio runtime. A lane count of zero is
    /// bumped to one.
    pub fn new(transport: Arc<dyn Transport>, lane_count: usize) -> Self {
        let lane_count = lane_count.max(1);
        let mut lanes = Vec::with_capacity(lane_count);
        let mut workers = Vec::with_capacity(lane_count);

        for lane in 0..lane_count {
            let (tx, rx) = mpsc::unbounded_channel();
            lanes.push(tx);
            workers.push(tokio::spawn(drain_lane(lane, rx, Arc::clone(&transport))));
        }

        Self { lanes, workers }
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Close all lanes and wait for the workers to finish delivering what
    /// was already queued.
    pub async fn shutdown(self) {
        drop(self.lanes);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

impl Dispatcher for ShardedDispatcher {
    fn send(&self, envelope: Envelope) {
        let lane = (envelope.partition_key % self.lanes.len() as u64) as usize;
        if self.lanes[lane].send(envelope).is_err() {
            warn!(lane, "dispatch lane closed, proposal dropped");
        }
    }
}

async fn drain_lane(
    lane: usize,
    mut rx: mpsc::UnboundedReceiver<Envelope>,
    transport: Arc<dyn Transport>,
) {
    while let Some(envelope) = rx.recv().await {
        let recipient = envelope.recipient.clone();
        debug!(lane, recipient = %recipient, key = envelope.partition_key, "delivering envelope");
        if let Err(error) = transport.deliver(envelope).await {
            warn!(lane, recipient = %recipient, error = %error, "delivery failed, envelope dropped");
        }
    }
}
