//! Shared types for the forwarding pipeline.

use async_trait::async_trait;

use crate::error::{SendError, StoreError};
use crate::mapping::ResolvedRecipient;

// ── Forward request ─────────────────────────────────────────────────

/// The unit of work: one resolved recipient key, its destinations, and
/// the CC list shared across all recipients of one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardRequest {
    /// Normalized recipient key; the envelope sender of the forward.
    pub key: String,
    /// Envelope destinations, map order preserved.
    pub destinations: Vec<String>,
    /// CC addresses from the trigger event (may be empty).
    pub cc: Vec<String>,
}

impl ForwardRequest {
    pub fn new(resolved: ResolvedRecipient, cc: Vec<String>) -> Self {
        Self {
            key: resolved.key,
            destinations: resolved.destinations,
            cc,
        }
    }
}

// ── Outcome ─────────────────────────────────────────────────────────

/// Successful result of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// No recipient matched any forwarding rule. Valid input, zero I/O.
    NoTargets,
    /// Every forwarded copy was sent and the stored message deleted.
    Forwarded { sent: usize },
}

impl ForwardOutcome {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoTargets => "no_targets",
            Self::Forwarded { .. } => "forwarded",
        }
    }
}

// ── External collaborators ──────────────────────────────────────────

/// Blob store holding raw inbound messages, keyed by message id.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Fetch the raw message bytes (lossily decoded to text).
    async fn fetch(&self, message_id: &str) -> Result<String, StoreError>;

    /// Delete the stored message. Called once, after all sends succeed.
    async fn delete(&self, message_id: &str) -> Result<(), StoreError>;
}

/// Transport that accepts a raw message with an explicit envelope.
///
/// `envelope_from` must be an address the transport has verified
/// ownership of — the pipeline always passes the recipient key.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(
        &self,
        envelope_from: &str,
        envelope_to: &[String],
        raw_message: &str,
    ) -> Result<(), SendError>;
}
