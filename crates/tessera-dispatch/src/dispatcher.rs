//! The dispatcher seam and its wire shape.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Kind of a dispatched message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// A configuration-change proposal for one partition.
    ConfigProposal,
}

/// One message handed to a dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Address of the node that should process the message.
    pub recipient: String,
    pub kind: MessageKind,
    /// Serialized message body; the dispatcher never inspects it.
    pub payload: Vec<u8>,
    /// Routing key: envelopes with the same key are delivered in send
    /// order relative to each other.
    pub partition_key: u64,
}

/// One-way, unacknowledged message delivery.
///
/// `send` must not block on the network and offers the caller no delivery
/// signal of any kind; detecting non-effect and re-issuing a proposal is
/// the reconfiguration driver's job.
pub trait Dispatcher: Send + Sync {
    fn send(&self, envelope: Envelope);
}

/// Dispatcher that records every envelope instead of delivering it.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<Envelope>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything sent so far, in send order.
    pub fn sent(&self) -> Vec<Envelope> {
        self.sent.lock().expect("recorder lock").clone()
    }

    /// Drain the recorded envelopes.
    pub fn take(&self) -> Vec<Envelope> {
        std::mem::take(&mut *self.sent.lock().expect("recorder lock"))
    }

    pub fn len(&self) -> usize {
        self.sent.lock().expect("recorder lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Dispatcher for RecordingDispatcher {
    fn send(&self, envelope: Envelope) {
        self.sent.lock().expect("recorder lock").push(envelope);
    }
}
