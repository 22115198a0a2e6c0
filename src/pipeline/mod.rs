//! Forwarding pipeline.
//!
//! One trigger event flows through:
//! 1. Envelope validation — reject malformed events before any I/O
//! 2. `mapping::resolve()` — original recipients → forward requests
//! 3. `MessageStore::fetch()` — single read of the raw message
//! 4. `rewrite::rewrite()` — one rewritten copy per resolved key
//! 5. `MailSender::send()` — concurrent dispatch, one send per key
//! 6. `MessageStore::delete()` — only after every send succeeded

pub mod forwarder;
pub mod types;

pub use forwarder::ForwardingPipeline;
pub use types::{ForwardOutcome, ForwardRequest, MailSender, MessageStore};
