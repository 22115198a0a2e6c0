//! Address canonicalization.
//!
//! Two layers of cleanup, both pure and total:
//! - `normalize` makes an address safe to embed in a header (no
//!   whitespace or control characters anywhere).
//! - `match_key` additionally lower-cases and strips plus-addressing
//!   suffixes, producing the key used against the forwarding map.
//!
//! No address format is ever rejected — malformed input is cleaned up
//! best-effort. An address without `@` normalizes to itself and later
//! matches as a user-only key.

use std::sync::LazyLock;

use regex::Regex;

/// Whitespace and control characters, anywhere in the string.
static STRIP_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\p{Cc}]+").unwrap());

/// Plus suffix in the local part: everything from `+` to the next `@`.
static PLUS_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+[^@]*@").unwrap());

/// Remove all whitespace, tabs, newlines and control characters, then trim.
pub fn normalize(address: &str) -> String {
    STRIP_CHARS.replace_all(address, "").trim().to_string()
}

/// Compute the lookup key for an address: normalized, lower-cased, and
/// with the `+suffix` removed from the local part when plus-addressing
/// support is enabled (`user+tag@domain` → `user@domain`).
pub fn match_key(address: &str, allow_plus_sign: bool) -> String {
    let key = normalize(address).to_lowercase();
    if allow_plus_sign {
        PLUS_SUFFIX.replacen(&key, 1, "@").into_owned()
    } else {
        key
    }
}

/// Split a key at its last `@` into (user, domain-with-leading-`@`).
///
/// The domain is `None` when the key contains no `@`, in which case the
/// whole key is the user part.
pub fn split_user_domain(key: &str) -> (&str, Option<&str>) {
    match key.rfind('@') {
        Some(pos) => (&key[..pos], Some(&key[pos..])),
        None => (key, None),
    }
}

/// The part before the last `@`, or the whole string if there is none.
pub fn local_part(key: &str) -> &str {
    split_user_domain(key).0
}

/// The part after the last `@`, or empty if there is none.
pub fn domain_part(key: &str) -> &str {
    split_user_domain(key)
        .1
        .map(|d| &d[1..])
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── normalize ───────────────────────────────────────────────────

    #[test]
    fn normalize_strips_whitespace_everywhere() {
        assert_eq!(normalize(" user @ example.com "), "user@example.com");
        assert_eq!(normalize("user@exa\tmple.com"), "user@example.com");
        assert_eq!(normalize("user@example.com\r\n"), "user@example.com");
    }

    #[test]
    fn normalize_strips_control_characters() {
        assert_eq!(normalize("user\u{0}@exam\u{7f}ple.com"), "user@example.com");
    }

    #[test]
    fn normalize_keeps_case() {
        assert_eq!(normalize("User@Example.COM"), "User@Example.COM");
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in [" a b@c.d ", "x@y.z", "no-at-sign", "\tweird\r\n"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn normalize_without_at_sign_is_identity_after_cleanup() {
        assert_eq!(normalize("info"), "info");
    }

    // ── match_key ───────────────────────────────────────────────────

    #[test]
    fn match_key_lowercases() {
        assert_eq!(match_key("User@Example.COM", true), "user@example.com");
    }

    #[test]
    fn match_key_strips_plus_suffix_when_enabled() {
        assert_eq!(match_key("user+tag@example.com", true), "user@example.com");
        assert_eq!(
            match_key("user+a+b@example.com", true),
            "user@example.com"
        );
    }

    #[test]
    fn match_key_keeps_plus_suffix_when_disabled() {
        assert_eq!(
            match_key("user+tag@example.com", false),
            "user+tag@example.com"
        );
    }

    #[test]
    fn match_key_no_at_sign() {
        assert_eq!(match_key("Info", true), "info");
    }

    #[test]
    fn match_key_is_idempotent() {
        let once = match_key("User+Tag@Example.com", true);
        assert_eq!(match_key(&once, true), once);
    }

    // ── split helpers ───────────────────────────────────────────────

    #[test]
    fn split_at_last_at_sign() {
        let (user, domain) = split_user_domain("a@b@c.com");
        assert_eq!(user, "a@b");
        assert_eq!(domain, Some("@c.com"));
    }

    #[test]
    fn split_without_at_sign() {
        let (user, domain) = split_user_domain("info");
        assert_eq!(user, "info");
        assert_eq!(domain, None);
    }

    #[test]
    fn local_and_domain_parts() {
        assert_eq!(local_part("user@example.com"), "user");
        assert_eq!(domain_part("user@example.com"), "example.com");
        assert_eq!(local_part("bare"), "bare");
        assert_eq!(domain_part("bare"), "");
    }
}
