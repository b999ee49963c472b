//! tessera-dispatch — one-way delivery of configuration proposals.
//!
//! The meta server's placement engine hands fully-formed proposals to a
//! [`Dispatcher`] and never hears back: no acknowledgement, no delivery
//! guarantee, no retry. What the dispatcher does guarantee is ordering
//! within a shard — all envelopes carrying the same partition key are
//! delivered in the order they were sent, so a node never observes two
//! proposals for one partition out of order.
//!
//! [`ShardedDispatcher`] provides that guarantee over any async
//! [`Transport`]; [`RecordingDispatcher`] captures envelopes for tests and
//! embedders.

pub mod dispatcher;
pub mod sharded;

pub use dispatcher::{Dispatcher, Envelope, MessageKind, RecordingDispatcher};
pub use sharded::{ShardedDispatcher, Transport};
