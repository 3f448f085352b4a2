//! Text payloads of the element tree.
//!
//! Every piece of text is stored already JSON-escaped, so the emitter can copy parts
//! verbatim between a pair of quotes. Parts are borrowed from the input whenever the
//! source bytes need no rewriting, and owned only when the decoder had to produce new
//! bytes (numeric character references, `\u00XX` escapes).

use std::borrow::Cow;
use std::fmt;

/// One decoded-or-raw fragment of a text run or attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuePart<'a> {
    text: Cow<'a, str>,
}

impl<'a> ValuePart<'a> {
    /// A zero-copy slice of the input, or a static replacement such as `\n`.
    pub fn borrowed(text: &'a str) -> Self {
        ValuePart {
            text: Cow::Borrowed(text),
        }
    }

    /// A buffer produced by the decoder.
    pub fn owned(text: String) -> Self {
        ValuePart {
            text: Cow::Owned(text),
        }
    }

    pub fn as_str(&self) -> &str {
        self.text.as_ref()
    }

    pub fn is_owned(&self) -> bool {
        matches!(self.text, Cow::Owned(_))
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// One text run, possibly interrupted by skipped markup: the concatenation of its parts is the escaped JSON payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Value<'a> {
    parts: Vec<ValuePart<'a>>,
}

impl<'a> Value<'a> {
    pub fn new() -> Self {
        Value { parts: Vec::new() }
    }

    /// Empty parts carry no bytes and are dropped.
    pub fn push(&mut self, part: ValuePart<'a>) {
        if !part.is_empty() {
            self.parts.push(part);
        }
    }

    pub fn parts(&self) -> &[ValuePart<'a>] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Length in bytes of the escaped payload, without quotes.
    pub fn escaped_len(&self) -> usize {
        self.parts.iter().map(ValuePart::len).sum()
    }
}

impl<'a> Extend<ValuePart<'a>> for Value<'a> {
    fn extend<I: IntoIterator<Item = ValuePart<'a>>>(&mut self, parts: I) {
        for part in parts {
            self.push(part);
        }
    }
}

impl<'a> IntoIterator for Value<'a> {
    type Item = ValuePart<'a>;
    type IntoIter = std::vec::IntoIter<ValuePart<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.into_iter()
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            f.write_str(part.as_str())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub name: &'a str,
    pub value: Value<'a>,
}
