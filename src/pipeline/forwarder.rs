//! Forwarding pipeline — drives one trigger event to completion.
//!
//! Sequential state machine passing immutable values between stages:
//!
//! `Start → Resolved → NoTargets | RewrittenAll → Dispatched | Failed`
//!
//! Resolution and rewriting are pure CPU work; the only suspension
//! points are the store fetch, the sends, and the final delete. Per-key
//! work operates on disjoint data, so dispatch runs concurrently and
//! the pipeline waits for every send before deciding the outcome.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::config::ForwarderConfig;
use crate::error::{Error, SendError};
use crate::event::TriggerEvent;
use crate::mapping;
use crate::message::RawMessage;
use crate::pipeline::types::{ForwardOutcome, ForwardRequest, MailSender, MessageStore};
use crate::rewrite;

/// The pipeline owns the configuration and its two external
/// collaborators for the lifetime of the process; each `run` is one
/// independent invocation with no shared mutable state.
pub struct ForwardingPipeline {
    config: ForwarderConfig,
    store: Arc<dyn MessageStore>,
    sender: Arc<dyn MailSender>,
}

impl ForwardingPipeline {
    pub fn new(
        config: ForwarderConfig,
        store: Arc<dyn MessageStore>,
        sender: Arc<dyn MailSender>,
    ) -> Self {
        Self {
            config,
            store,
            sender,
        }
    }

    /// Process one trigger event end to end.
    ///
    /// Returns `ForwardOutcome::NoTargets` without touching the store or
    /// the sender when no recipient matches a rule. Any fetch, rewrite,
    /// or send failure fails the whole invocation; a send failure for
    /// one key never stops the other sends from being attempted.
    pub async fn run(&self, event: TriggerEvent) -> Result<ForwardOutcome, Error> {
        let record = event.into_record()?;

        let resolved = mapping::resolve(
            &record.recipients,
            &self.config.mapping,
            self.config.allow_plus_sign,
        );
        if resolved.is_empty() {
            info!(
                message_id = %record.message_id,
                recipients = record.recipients.len(),
                "No forward targets for any recipient, finishing"
            );
            return Ok(ForwardOutcome::NoTargets);
        }

        info!(
            message_id = %record.message_id,
            keys = resolved.len(),
            "Fetching stored message"
        );
        let raw_text = self.store.fetch(&record.message_id).await?;
        let original = RawMessage::parse(&raw_text);

        let requests: Vec<ForwardRequest> = resolved
            .into_iter()
            .map(|r| ForwardRequest::new(r, record.cc.clone()))
            .collect();

        // Rewrite every copy before dispatching anything: a rewrite
        // failure aborts the invocation with zero sends issued.
        let mut rewritten = Vec::with_capacity(requests.len());
        for request in &requests {
            let copy = rewrite::rewrite(
                &original,
                &request.key,
                &request.destinations,
                &request.cc,
                &self.config.subject_prefix,
            )
            .map_err(|e| {
                error!(
                    message_id = %record.message_id,
                    key = %request.key,
                    error = %e,
                    "Rewrite failed, aborting invocation"
                );
                e
            })?;
            rewritten.push(copy.to_string());
        }

        let sends = requests.iter().zip(&rewritten).map(|(request, raw)| {
            let sender = Arc::clone(&self.sender);
            let message_id = record.message_id.clone();
            async move {
                info!(
                    message_id = %message_id,
                    key = %request.key,
                    destinations = request.destinations.len(),
                    "Dispatching forwarded copy"
                );
                sender
                    .send(&request.key, &request.destinations, raw)
                    .await
                    .map_err(|e| {
                        error!(
                            message_id = %message_id,
                            key = %request.key,
                            error = %e,
                            "Send failed"
                        );
                        e
                    })
            }
        });

        let results = join_all(sends).await;
        let attempted = results.len();
        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            return Err(SendError::Failed { failed, attempted }.into());
        }

        if let Err(e) = self.store.delete(&record.message_id).await {
            // The forwards already went out; the caller has to assume
            // duplicates if it redelivers this event.
            warn!(
                message_id = %record.message_id,
                sent = attempted,
                error = %e,
                "All sends succeeded but deleting the stored message failed"
            );
            return Err(e.into());
        }

        info!(
            message_id = %record.message_id,
            sent = attempted,
            "Invocation finished successfully"
        );
        Ok(ForwardOutcome::Forwarded { sent: attempted })
    }
}
