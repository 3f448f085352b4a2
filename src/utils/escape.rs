//! Decoding of XML escapes into JSON-safe text.
//!
//! The scanner hands over every byte that cannot be copied verbatim into a JSON string:
//! - entity references: `&amp;` `&gt;` `&lt;` `&quot;` `&apos;`, `&#NN;` and `&#xHH;`
//! - control characters below 0x20
//! - `"` and `\`
//!
//! Each is replaced by a single [`ValuePart`]. Static replacements are borrowed; numeric
//! references and `\u00XX` escapes produce owned buffers.

use crate::model::{Value, ValuePart};
use memchr::memchr;

/// Longest entity body looked at before the `&` is treated as a literal.
const MAX_ENTITY_LEN: usize = 32;

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// True for bytes that must go through [`decode_special`].
#[inline]
pub fn is_special(b: u8) -> bool {
    matches!(b, b'&' | b'"' | b'\\') || b < 0x20
}

/// Decode the special byte at `text[pos]`.
///
/// Returns the JSON-safe replacement and the number of source bytes it consumed. A byte
/// that is not special comes back as its whole character, unchanged. `None` when `pos` is
/// past the end of `text` or not on a character boundary.
pub fn decode_special(text: &str, pos: usize) -> Option<(ValuePart<'_>, usize)> {
    let rest = text.get(pos..).filter(|rest| !rest.is_empty())?;

    let decoded = match rest.as_bytes()[0] {
        b'&' => decode_entity(text, pos),
        b'"' => (ValuePart::borrowed("\\\""), 1),
        b'\\' => (ValuePart::borrowed("\\\\"), 1),
        b if b < 0x20 => (control_escape(b), 1),
        _ => {
            let len = rest.chars().next().map_or(1, char::len_utf8);
            (ValuePart::borrowed(&rest[..len]), len)
        }
    };
    Some(decoded)
}

/// Split `text[start..end]` into verbatim runs and decoded parts.
pub fn split_value(text: &str, start: usize, end: usize) -> Value<'_> {
    let text = &text[..end];
    let bytes = text.as_bytes();
    let mut value = Value::new();

    let mut run_start = start;
    let mut pos = start;
    while pos < end {
        let decoded = if is_special(bytes[pos]) {
            decode_special(text, pos)
        } else {
            None
        };
        match decoded {
            Some((part, consumed)) => {
                value.push(ValuePart::borrowed(&text[run_start..pos]));
                value.push(part);
                pos += consumed;
                run_start = pos;
            }
            None => pos += 1,
        }
    }
    value.push(ValuePart::borrowed(&text[run_start..end]));

    value
}

fn decode_entity(text: &str, pos: usize) -> (ValuePart<'_>, usize) {
    let bytes = text.as_bytes();
    let body_start = pos + 1;
    let window_end = (body_start + MAX_ENTITY_LEN + 1).min(bytes.len());

    let semicolon = match memchr(b';', &bytes[body_start..window_end]) {
        Some(offset) => body_start + offset,
        None => return literal(text, pos, 1),
    };

    let body = &bytes[body_start..semicolon];
    if !body.iter().all(|&b| is_entity_name_byte(b)) {
        return literal(text, pos, 1);
    }

    let consumed = semicolon + 1 - pos;
    let replacement = match body {
        b"amp" => "&",
        b"gt" => ">",
        b"lt" => "<",
        b"quot" => "\\\"",
        b"apos" => "'",
        [b'#', digits @ ..] => {
            return match decode_char_reference(digits) {
                Some(ch) => (escape_char(ch), consumed),
                None => literal(text, pos, consumed),
            };
        }
        // Unknown entity: keep it as written so the information isn't lost.
        _ => return literal(text, pos, consumed),
    };

    (ValuePart::borrowed(replacement), consumed)
}

#[inline]
fn is_entity_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'#' | b'_' | b'-' | b'.' | b':')
}

fn literal(text: &str, pos: usize, len: usize) -> (ValuePart<'_>, usize) {
    (ValuePart::borrowed(&text[pos..pos + len]), len)
}

/// Parses the digits of `&#NN;` / `&#xHH;` into a Unicode scalar value.
fn decode_char_reference(digits: &[u8]) -> Option<char> {
    let (radix, digits) = match digits {
        [b'x' | b'X', rest @ ..] => (16, rest),
        _ => (10, digits),
    };
    if digits.is_empty() {
        return None;
    }

    let mut code: u32 = 0;
    for &d in digits {
        let v = char::from(d).to_digit(radix)?;
        code = code.checked_mul(radix)?.checked_add(v)?;
    }
    char::from_u32(code)
}

fn escape_char(ch: char) -> ValuePart<'static> {
    let mut out = String::with_capacity(6);
    match ch {
        '"' => out.push_str("\\\""),
        '\\' => out.push_str("\\\\"),
        c if (c as u32) < 0x20 => out.push_str(control_escape(c as u8).as_str()),
        c => out.push(c),
    }
    ValuePart::owned(out)
}

fn control_escape(b: u8) -> ValuePart<'static> {
    match b {
        0x08 => ValuePart::borrowed("\\b"),
        b'\t' => ValuePart::borrowed("\\t"),
        b'\n' => ValuePart::borrowed("\\n"),
        0x0C => ValuePart::borrowed("\\f"),
        b'\r' => ValuePart::borrowed("\\r"),
        _ => {
            let mut out = String::with_capacity(6);
            out.push_str("\\u00");
            out.push(char::from(HEX[(b >> 4) as usize]));
            out.push(char::from(HEX[(b & 0x0F) as usize]));
            ValuePart::owned(out)
        }
    }
}
