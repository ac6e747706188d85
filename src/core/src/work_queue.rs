//! Work handoff between a remote operator and a single worker.
//!
//! The operator submits one unit of content; the worker reads it with
//! `peek_latest` and then either acknowledges or interrupts it. Until that
//! happens the queue is locked and further submissions are refused.
//!
//! Components:
//! - `queue`: the plain `{sequence, lock flag}` state and item types.
//! - `handshake`: [`AckHandshake`], which owns that state behind a mutex and
//!   enforces the submit → lock → ack/interrupt → unlock transitions.

pub mod handshake;
pub mod queue;

pub use handshake::{AckHandshake, HandshakeState};
pub use queue::{QueueState, QueueStatus, WorkItem};
