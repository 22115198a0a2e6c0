//! Raw MIME message parsing and serialization.
//!
//! A message is an ordered header block, a blank-line separator, and an
//! opaque body. The header block is parsed exactly once into a list of
//! fields that keep their raw folded text, so pass-through fields
//! serialize byte-for-byte and relative order is preserved. The body is
//! never interpreted or altered.

/// One header field, stored as its raw text (name, colon, value, and any
/// folded continuation lines with their original line breaks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    raw: String,
}

impl HeaderField {
    /// Build a fresh single-line field.
    pub fn new(name: &str, value: impl AsRef<str>) -> Self {
        Self {
            raw: format!("{}: {}", name, value.as_ref()),
        }
    }

    /// The raw field text, without a trailing line break.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Field name: text before the first colon, trimmed. A malformed
    /// line without a colon yields the whole line as its name.
    pub fn name(&self) -> &str {
        match self.raw.find(':') {
            Some(pos) => self.raw[..pos].trim(),
            None => self.raw.trim(),
        }
    }

    /// Case-insensitive name check.
    pub fn is(&self, name: &str) -> bool {
        self.name().eq_ignore_ascii_case(name)
    }

    /// Unfolded value: text after the colon with continuation lines
    /// joined by a single space. Empty for a malformed colon-less line.
    pub fn value(&self) -> String {
        let after_colon = match self.raw.find(':') {
            Some(pos) => &self.raw[pos + 1..],
            None => return String::new(),
        };
        after_colon
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A parsed raw message: ordered header fields plus an untouched body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub headers: Vec<HeaderField>,
    body: String,
}

impl RawMessage {
    /// Parse a raw message. Total: any input produces a message. Content
    /// with no blank-line separator is treated as all-header with an
    /// empty body.
    pub fn parse(text: &str) -> Self {
        let mut headers = Vec::new();
        let mut field_start: Option<usize> = None;
        let mut body = "";

        let mut pos = 0;
        while pos < text.len() {
            let line_end = text[pos..]
                .find('\n')
                .map(|i| pos + i + 1)
                .unwrap_or(text.len());
            let content = text[pos..line_end].trim_end_matches(['\r', '\n']);

            if content.is_empty() {
                // Blank line: headers end here, body is everything after
                if let Some(start) = field_start.take() {
                    headers.push(field_from_span(text, start, pos));
                }
                body = &text[line_end..];
                break;
            }

            let continuation = content.starts_with(' ') || content.starts_with('\t');
            if !(continuation && field_start.is_some()) {
                if let Some(start) = field_start {
                    headers.push(field_from_span(text, start, pos));
                }
                field_start = Some(pos);
            }
            pos = line_end;
        }

        if let Some(start) = field_start {
            headers.push(field_from_span(text, start, text.len()));
        }

        Self {
            headers,
            body: body.to_string(),
        }
    }

    /// The body bytes, exactly as they appeared after the separator.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// First header field with the given name (case-insensitive).
    pub fn first(&self, name: &str) -> Option<&HeaderField> {
        self.headers.iter().find(|h| h.is(name))
    }

    /// Whether any header field has the given name (case-insensitive).
    pub fn has(&self, name: &str) -> bool {
        self.first(name).is_some()
    }

    /// Assemble a message from an already-built header list and a body.
    pub fn from_parts(headers: Vec<HeaderField>, body: String) -> Self {
        Self { headers, body }
    }
}

impl std::fmt::Display for RawMessage {
    /// Serialize: each field on its own CRLF-terminated line(s), then the
    /// blank separator, then the body unchanged.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for h in &self.headers {
            write!(f, "{}\r\n", h.raw())?;
        }
        write!(f, "\r\n{}", self.body)
    }
}

fn field_from_span(text: &str, start: usize, end: usize) -> HeaderField {
    HeaderField {
        raw: text[start..end].trim_end_matches(['\r', '\n']).to_string(),
    }
}
