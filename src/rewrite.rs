//! Header rewriting for forwarded messages.
//!
//! The sending service only accepts mail from verified addresses, so the
//! forwarded copy is sent *from* the original recipient's match key and
//! the original sender is preserved in Reply-To and X-Forwarded-For.
//!
//! The whole transformation is one pass over the parsed header list:
//! each original field is kept, replaced, or dropped, then the
//! synthesized fields are appended. The body is carried over untouched.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::address;
use crate::error::RewriteError;
use crate::message::{HeaderField, RawMessage};

/// Address inside angle brackets, e.g. `Name <user@domain>`.
static ANGLE_ADDR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^>]+)>").unwrap());

/// Header names that never survive a forward. DKIM signatures would be
/// invalid after the From rewrite anyway; List-Id and X-Forwarded-For
/// are regenerated so exactly one instance of each remains.
const STRIPPED: &[&str] = &[
    "Return-Path",
    "Sender",
    "Message-ID",
    "DKIM-Signature",
    "List-Id",
    "X-Forwarded-For",
];

/// The original sender as extracted from a From header value.
#[derive(Debug, Clone, Default)]
struct OriginalSender {
    /// Normalized bare address, empty when no From header was found.
    address: String,
    /// Display portion of the From value (everything outside `<...>`).
    display: String,
}

/// Produce the forwarded copy of `original` for one resolved recipient.
///
/// `key` is the recipient's normalized match key, used as the new header
/// From (and by the caller as the envelope sender). `destinations`
/// replaces To; a non-empty `cc` replaces Cc. Pure and deterministic:
/// the same inputs always yield the same bytes.
pub fn rewrite(
    original: &RawMessage,
    key: &str,
    destinations: &[String],
    cc: &[String],
    subject_prefix: &str,
) -> Result<RawMessage, RewriteError> {
    if destinations.is_empty() {
        return Err(RewriteError::MissingDestinations {
            key: key.to_string(),
        });
    }

    let sender = extract_sender(original);
    let key = address::normalize(key);
    let had_reply_to = original.has("Reply-To");
    let had_cc = original.has("Cc");

    let from_value = format!(
        "\"{} via {}\" <{}>",
        sender.display,
        address::local_part(&key),
        key
    );
    let to_value = join_normalized(destinations);
    let cc_value = join_normalized(cc);

    let mut headers = Vec::with_capacity(original.headers.len() + 3);
    for field in &original.headers {
        if STRIPPED.iter().any(|name| field.is(name)) {
            debug!(header = field.name(), "Stripped header");
            continue;
        }
        if field.is("From") {
            headers.push(HeaderField::new("From", &from_value));
        } else if field.is("To") {
            headers.push(HeaderField::new("To", &to_value));
        } else if field.is("Subject") && !subject_prefix.is_empty() {
            headers.push(HeaderField::new(
                "Subject",
                format!("{}{}", subject_prefix, field.value()),
            ));
        } else if field.is("Cc") && !cc.is_empty() {
            headers.push(HeaderField::new("Cc", &cc_value));
        } else {
            headers.push(field.clone());
        }
    }

    if !cc.is_empty() && !had_cc {
        headers.push(HeaderField::new("Cc", &cc_value));
    }

    if !had_reply_to {
        if sender.address.is_empty() {
            info!("Reply-To not added: From address could not be extracted");
        } else {
            headers.push(HeaderField::new(
                "Reply-To",
                format!("\"Original Sender\" <{}>", sender.address),
            ));
            debug!(reply_to = %sender.address, "Added Reply-To for original sender");
        }
    }

    let domain = address::domain_part(&key);
    headers.push(HeaderField::new(
        "List-Id",
        format!("Forwarded emails via {domain} <bounce.{domain}>"),
    ));
    headers.push(HeaderField::new("X-Forwarded-For", &sender.address));

    Ok(RawMessage::from_parts(headers, original.body().to_string()))
}

/// Extract the original sender from the first From header.
///
/// The bare address is the content of `<...>`, falling back to the whole
/// trimmed value when there are no angle brackets. Both parts come back
/// empty when the message has no From header at all.
fn extract_sender(original: &RawMessage) -> OriginalSender {
    let Some(from) = original.first("From") else {
        return OriginalSender::default();
    };
    let value = from.value();
    let addr = ANGLE_ADDR
        .captures(&value)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| value.trim().to_string());
    let display = ANGLE_ADDR
        .replace(&value, "")
        .trim()
        .trim_matches('"')
        .trim()
        .to_string();
    OriginalSender {
        address: address::normalize(&addr),
        display,
    }
}

fn join_normalized(addresses: &[String]) -> String {
    addresses
        .iter()
        .map(|a| address::normalize(a))
        .collect::<Vec<_>>()
        .join(",")
}
