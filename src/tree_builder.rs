//! Single-pass scanner that turns XML text into a [`Document`].
//!
//! The scanner is deliberately forgiving: it never validates, never fails, and every construct
//! scans at most to the end of the input. Names and plain text are borrowed from the input;
//! escapes are decoded into owned parts by [`crate::utils::escape`].
//!
//! Skipped constructs: processing instructions (including the XML declaration), comments,
//! CDATA sections and `<!...>` declarations with an optional bracketed internal subset.
//! They do not end a text run: `<a>foo<!--x-->bar</a>` holds the single value `foobar`.

use crate::model::{Attribute, Document, ElementId, Value};
use crate::utils::escape::split_value;
use log::trace;
use memchr::{memchr, memmem};

/// Build the element tree of `xml`.
pub fn build(xml: &str) -> Document<'_> {
    TreeBuilder::new(xml).run()
}

#[inline]
fn is_xml_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0C)
}

struct TreeBuilder<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    doc: Document<'a>,
    /// Element that receives new children and text runs.
    current: ElementId,
    /// Text of `current` seen since the last element tag.
    pending: Value<'a>,
    pending_has_content: bool,
}

impl<'a> TreeBuilder<'a> {
    fn new(input: &'a str) -> Self {
        let doc = Document::new();
        let current = doc.root();
        TreeBuilder {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            doc,
            current,
            pending: Value::new(),
            pending_has_content: false,
        }
    }

    fn run(mut self) -> Document<'a> {
        self.skip_whitespace();

        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] == b'<' {
                self.markup();
            } else {
                self.text();
            }
        }

        self.end_text_run();
        self.doc
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_xml_whitespace) {
            self.pos += 1;
        }
    }

    /// Moves past the first occurrence of `needle` at or after `from`, or to the end.
    fn skip_past(&mut self, from: usize, needle: &[u8]) {
        let from = from.min(self.bytes.len());
        self.pos = match memmem::find(&self.bytes[from..], needle) {
            Some(offset) => from + offset + needle.len(),
            None => self.bytes.len(),
        };
    }

    fn markup(&mut self) {
        let rest = &self.bytes[self.pos..];

        if rest.starts_with(b"<?") {
            trace!("skipping processing instruction at {}", self.pos);
            self.skip_past(self.pos + 2, b"?>");
        } else if rest.starts_with(b"<!--") {
            trace!("skipping comment at {}", self.pos);
            self.skip_past(self.pos + 4, b"-->");
        } else if rest.starts_with(b"<![CDATA[") {
            trace!("skipping CDATA section at {}", self.pos);
            self.skip_past(self.pos + 9, b"]]>");
        } else if rest.starts_with(b"<!") {
            self.skip_declaration();
        } else if rest.starts_with(b"</") {
            self.close_tag();
        } else {
            self.open_tag();
        }
    }

    /// `<!DOCTYPE ...>` and friends. A `>` inside the `[...]` internal subset does not end it.
    fn skip_declaration(&mut self) {
        trace!("skipping declaration at {}", self.pos);
        let mut depth = 0usize;
        let mut pos = self.pos + 2;

        while pos < self.bytes.len() {
            match self.bytes[pos] {
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => {
                    self.pos = pos + 1;
                    return;
                }
                _ => {}
            }
            pos += 1;
        }
        self.pos = self.bytes.len();
    }

    fn close_tag(&mut self) {
        self.skip_past(self.pos + 2, b">");
        self.end_text_run();

        // A stray closing tag at top level has nothing to close.
        if let Some(parent) = self.doc.parent(self.current) {
            trace!("closing <{}>", self.doc.element(self.current).name);
            self.current = parent;
        }
    }

    fn open_tag(&mut self) {
        let name_start = self.pos + 1;
        let mut pos = name_start;
        while pos < self.bytes.len()
            && !is_xml_whitespace(self.bytes[pos])
            && !matches!(self.bytes[pos], b'/' | b'>')
        {
            pos += 1;
        }

        if pos == name_start {
            trace!("ignoring nameless tag at {}", self.pos);
            self.skip_past(name_start, b">");
            return;
        }

        let name = &self.input[name_start..pos];
        self.pos = pos;
        self.end_text_run();
        let element = self.doc.append_element(self.current, name);
        trace!(
            "opened <{}> at depth {}",
            name,
            self.doc.element(element).depth
        );

        loop {
            self.skip_whitespace();
            match self.peek() {
                // Unterminated start tag: keep the element open.
                None => {
                    self.current = element;
                    return;
                }
                Some(b'>') => {
                    self.pos += 1;
                    self.current = element;
                    return;
                }
                Some(b'/') | Some(b'?') => {
                    self.skip_past(self.pos, b">");
                    return;
                }
                Some(_) => self.attribute(element),
            }
        }
    }

    fn attribute(&mut self, element: ElementId) {
        let name_start = self.pos;
        while self.peek().is_some_and(|b| {
            !is_xml_whitespace(b) && !matches!(b, b'=' | b'>' | b'/')
        }) {
            self.pos += 1;
        }
        let name = &self.input[name_start..self.pos];

        self.skip_whitespace();
        let value = if self.peek() == Some(b'=') {
            self.pos += 1;
            self.skip_whitespace();
            self.attribute_value()
        } else {
            Value::new()
        };

        if name.is_empty() {
            trace!("dropping nameless attribute at {}", name_start);
            return;
        }

        self.doc
            .element_mut(element)
            .attributes
            .push(Attribute { name, value });
    }

    fn attribute_value(&mut self) -> Value<'a> {
        match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                let start = self.pos + 1;
                let end = match memchr(quote, &self.bytes[start..]) {
                    Some(offset) => start + offset,
                    None => self.bytes.len(),
                };
                self.pos = (end + 1).min(self.bytes.len());
                split_value(self.input, start, end)
            }
            Some(_) => {
                let start = self.pos;
                while let Some(b) = self.peek() {
                    if is_xml_whitespace(b)
                        || b == b'>'
                        || (b == b'/' && self.bytes.get(self.pos + 1) == Some(&b'>'))
                    {
                        break;
                    }
                    self.pos += 1;
                }
                split_value(self.input, start, self.pos)
            }
            None => Value::new(),
        }
    }

    fn text(&mut self) {
        let start = self.pos;
        let end = match memchr(b'<', &self.bytes[start..]) {
            Some(offset) => start + offset,
            None => self.bytes.len(),
        };
        self.pos = end;

        if self.current == self.doc.root() {
            trace!("discarding text outside of any element at {}", start);
            return;
        }

        if !self.bytes[start..end].iter().all(|&b| is_xml_whitespace(b)) {
            self.pending_has_content = true;
        }
        self.pending.extend(split_value(self.input, start, end));
    }

    /// Records the pending run on `current`. Whitespace-only runs are dropped.
    fn end_text_run(&mut self) {
        let value = std::mem::take(&mut self.pending);
        if std::mem::take(&mut self.pending_has_content) {
            self.doc.element_mut(self.current).values.push(value);
        }
    }
}
