//! Forwarding map and recipient resolution.
//!
//! The map is built once from configuration and stays immutable for the
//! lifetime of an invocation. Key forms, most specific first:
//! - `user@domain` — exact address
//! - `@domain`     — every address on a domain
//! - `user`        — a mailbox name on any domain
//! - `@`           — catch-all

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use tracing::debug;

use crate::address;

/// Rule key → ordered destination list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ForwardMap(HashMap<String, Vec<String>>);

impl ForwardMap {
    pub fn new(rules: HashMap<String, Vec<String>>) -> Self {
        Self(rules)
    }

    /// Build a map from `(key, destinations)` pairs. Duplicate keys keep
    /// the last entry, matching plain JSON object semantics.
    pub fn from_rules<K, D>(rules: impl IntoIterator<Item = (K, Vec<D>)>) -> Self
    where
        K: Into<String>,
        D: Into<String>,
    {
        Self(
            rules
                .into_iter()
                .map(|(k, v)| (k.into(), v.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up the destinations for one recipient key, applying the
    /// four-level precedence: exact → domain → user → catch-all.
    pub fn lookup(&self, key: &str) -> Option<&[String]> {
        if let Some(dests) = self.get(key) {
            return Some(dests);
        }
        let (user, domain) = address::split_user_domain(key);
        if let Some(dests) = domain.and_then(|d| self.get(d)) {
            return Some(dests);
        }
        if let Some(dests) = self.get(user) {
            return Some(dests);
        }
        self.get("@")
    }
}

/// One resolved original recipient: its match key and where it forwards.
///
/// `destinations` is never empty — recipients that match no rule are
/// dropped during resolution rather than carried as empty entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRecipient {
    /// Normalized match key. Doubles as the verified envelope sender for
    /// the forwarded copy.
    pub key: String,
    /// Forward destinations, in map order.
    pub destinations: Vec<String>,
}

/// Resolve every original recipient against the map.
///
/// Recipients that normalize to the same key collapse into one entry
/// (one forwarded copy per key). Recipients with no matching rule and no
/// catch-all produce nothing. An empty result means the invocation
/// should finish successfully without touching the store or the sender.
pub fn resolve(
    recipients: &[String],
    map: &ForwardMap,
    allow_plus_sign: bool,
) -> Vec<ResolvedRecipient> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();

    for original in recipients {
        let key = address::match_key(original, allow_plus_sign);
        if !seen.insert(key.clone()) {
            continue;
        }
        match map.lookup(&key) {
            Some(destinations) if !destinations.is_empty() => {
                debug!(
                    recipient = %key,
                    destinations = destinations.len(),
                    "Resolved forward destinations"
                );
                resolved.push(ResolvedRecipient {
                    key,
                    destinations: destinations.to_vec(),
                });
            }
            _ => {
                debug!(recipient = %key, "No forwarding rule matched");
            }
        }
    }

    resolved
}
