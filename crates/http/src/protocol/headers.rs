//! Case-insensitive header collection.
//!
//! [`Headers`] stores every field name in lowercase and keeps a single value per
//! name. A name seen more than once while parsing is folded into one value,
//! joined with `", "` in the order the lines arrived (RFC 9110 section 5.2).
//!
//! Parsing is line oriented and restartable: [`Headers::parse`] consumes every
//! complete line it is given and reports how far it got, so the caller can feed
//! the remainder again once more bytes have arrived.

use std::collections::HashMap;
use std::collections::hash_map;

use tracing::trace;

use crate::protocol::HeaderError;
use crate::utils::{CRLF, find_crlf};
use crate::ensure;

/// Punctuation allowed in a header name besides ASCII letters and digits.
const NAME_PUNCTUATION: &[u8] = b"!#$%^&*-_=+~.'";

/// A mapping from lowercase header name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    inner: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Default::default()
    }

    /// The headers the server sends when a handler has nothing more specific:
    /// `content-length`, `connection: close` and a plain text content type.
    pub fn default_response(content_len: usize) -> Self {
        let mut headers = Self::new();
        headers.set("content-length", content_len.to_string());
        headers.set("connection", "close");
        headers.set("content-type", mime::TEXT_PLAIN.as_ref());
        headers
    }

    /// Looks up `name` ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Stores `value` under the lowercased `name`, replacing any previous value,
    /// and returns the stored value.
    pub fn set<V: Into<String>>(&mut self, name: &str, value: V) -> &str {
        match self.inner.entry(name.to_ascii_lowercase()) {
            hash_map::Entry::Occupied(mut entry) => {
                entry.insert(value.into());
                entry.into_mut().as_str()
            }
            hash_map::Entry::Vacant(entry) => entry.insert(value.into()).as_str(),
        }
    }

    pub fn unset(&mut self, name: &str) {
        self.inner.remove(&name.to_ascii_lowercase());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates `(name, value)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Parses as many complete `name: value\r\n` lines from `data` as possible.
    ///
    /// # Returns
    ///
    /// `(consumed, done)` where `consumed` counts the bytes of every applied line
    /// and `done` is true once the empty line ending the header block was seen
    /// (its CRLF is included in `consumed`). An incomplete trailing line is left
    /// untouched for the next call.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError`] for the first invalid line. That line is never
    /// applied, but lines before it in the same call are.
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool), HeaderError> {
        let mut consumed = 0;

        while let Some(end_of_line) = find_crlf(&data[consumed..]) {
            if end_of_line == 0 {
                return Ok((consumed + CRLF.len(), true));
            }

            let line = &data[consumed..consumed + end_of_line];
            let (name, value) = split_field(line)?;

            self.append(name, value);
            consumed += end_of_line + CRLF.len();
        }

        Ok((consumed, false))
    }

    fn append(&mut self, name: String, value: &str) {
        trace!(name = %name, value = %value, "parsed header");
        match self.inner.entry(name) {
            hash_map::Entry::Occupied(mut entry) => {
                let folded = entry.get_mut();
                folded.push_str(", ");
                folded.push_str(value);
            }
            hash_map::Entry::Vacant(entry) => {
                entry.insert(value.to_owned());
            }
        }
    }
}

/// Splits one header line into its lowercased name and trimmed value.
fn split_field(line: &[u8]) -> Result<(String, &str), HeaderError> {
    let colon = line.iter().position(|b| *b == b':').ok_or(HeaderError::MissingColon)?;
    let (name, value) = (&line[..colon], &line[colon + 1..]);

    ensure!(!name.iter().any(u8::is_ascii_whitespace), HeaderError::WhitespaceBeforeColon);
    ensure!(!name.is_empty(), HeaderError::EmptyName);
    if let Some(&byte) = name.iter().find(|b| !is_name_byte(**b)) {
        return Err(HeaderError::InvalidCharacter { byte });
    }

    let value = std::str::from_utf8(value.trim_ascii()).map_err(|_e| HeaderError::NonUtf8Value)?;

    // the name is plain ascii at this point
    let name = name.iter().map(|b| char::from(b.to_ascii_lowercase())).collect();
    Ok((name, value))
}

#[inline]
pub(crate) fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || NAME_PUNCTUATION.contains(&byte)
}
