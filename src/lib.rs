//! remail — rule-based email forwarding core.
//!
//! Resolves the original recipients of a stored raw MIME message
//! against a forwarding map, rewrites the headers of one copy per
//! resolved recipient so a verified-sender-only transport will accept
//! it, and dispatches the copies.

pub mod address;
pub mod config;
pub mod error;
pub mod event;
pub mod fs_store;
pub mod mapping;
pub mod message;
pub mod pipeline;
pub mod rewrite;
pub mod smtp;
