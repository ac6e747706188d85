//! Credential checking.
//!
//! Every operation exposed over HTTP is gated by a single shared secret.
//! The comparison itself lives behind [`CredentialVerifier`] so that a
//! different scheme can be plugged into [`AuthGate`] without touching the
//! queue or the screenshot channel.
//!
//! Re-exports:
//! - [`AuthGate`]: entry point used by the HTTP handlers.
//! - [`CredentialVerifier`], [`StaticSecret`]: the verification seam and
//!   its default implementation.

pub mod credential;
pub mod gate;

pub use credential::{CredentialVerifier, StaticSecret};
pub use gate::AuthGate;
