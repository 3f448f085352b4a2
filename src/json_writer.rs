use std::io::{Result as IoResult, Write};

const SPACES: &[u8; 64] = b"                                                                ";
const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Whitespace policy of the JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Indent {
    /// No whitespace at all.
    #[default]
    Compact,
    /// One entry per line, `n` spaces per nesting level and a space after every `:`.
    Spaces(usize),
}

impl Indent {
    /// Negative widths select compact output.
    pub fn from_signed(width: i32) -> Self {
        match usize::try_from(width) {
            Ok(n) => Indent::Spaces(n),
            Err(_) => Indent::Compact,
        }
    }

    pub fn is_pretty(self) -> bool {
        matches!(self, Indent::Spaces(_))
    }
}

/// Minimal JSON writer used by the emitter.
///
/// Responsibilities:
/// - Tracks open containers so separators, newlines and indentation are placed
///   automatically
/// - Escapes keys while streaming them, without intermediate buffers
/// - Writes pre-escaped string payloads verbatim
pub struct JsonWriter<W: Write> {
    writer: W,
    indent: Indent,
    /// One entry per open container, `true` while it has no entries yet.
    frames: Vec<bool>,
}

impl<W: Write> JsonWriter<W> {
    #[inline]
    pub fn new(writer: W, indent: Indent) -> Self {
        Self {
            writer,
            indent,
            frames: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    #[inline]
    pub fn flush(&mut self) -> IoResult<()> {
        self.writer.flush()
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> IoResult<()> {
        self.writer.write_all(bytes)
    }

    fn newline_and_indent(&mut self) -> IoResult<()> {
        let Indent::Spaces(width) = self.indent else {
            return Ok(());
        };

        self.write_bytes(b"\n")?;
        let mut remaining = width * self.frames.len();
        while remaining > 0 {
            let chunk = remaining.min(SPACES.len());
            self.write_bytes(&SPACES[..chunk])?;
            remaining -= chunk;
        }
        Ok(())
    }

    /// Separator and line break before an entry of the innermost container.
    fn begin_entry(&mut self) -> IoResult<()> {
        let Some(first) = self.frames.last_mut() else {
            return Ok(());
        };

        let needs_comma = !*first;
        *first = false;
        if needs_comma {
            self.write_bytes(b",")?;
        }
        self.newline_and_indent()
    }

    fn open(&mut self, bracket: &[u8]) -> IoResult<()> {
        self.write_bytes(bracket)?;
        self.frames.push(true);
        Ok(())
    }

    fn close(&mut self, bracket: &[u8]) -> IoResult<()> {
        let empty = self.frames.pop().unwrap_or(true);
        if !empty {
            self.newline_and_indent()?;
        }
        self.write_bytes(bracket)
    }

    #[inline]
    pub fn open_object(&mut self) -> IoResult<()> {
        self.open(b"{")
    }

    #[inline]
    pub fn close_object(&mut self) -> IoResult<()> {
        self.close(b"}")
    }

    #[inline]
    pub fn open_array(&mut self) -> IoResult<()> {
        self.open(b"[")
    }

    #[inline]
    pub fn close_array(&mut self) -> IoResult<()> {
        self.close(b"]")
    }

    /// Starts the next element of the innermost array.
    #[inline]
    pub fn begin_element(&mut self) -> IoResult<()> {
        self.begin_entry()
    }

    /// Writes `"key":` (or `"key": ` when indenting) as the next member of the innermost object.
    pub fn write_key(&mut self, key: &str) -> IoResult<()> {
        self.write_prefixed_key(b"", key)
    }

    /// Like [`JsonWriter::write_key`], for attribute members named `@key`.
    pub fn write_attribute_key(&mut self, key: &str) -> IoResult<()> {
        self.write_prefixed_key(b"@", key)
    }

    fn write_prefixed_key(&mut self, prefix: &[u8], key: &str) -> IoResult<()> {
        self.begin_entry()?;
        self.write_bytes(b"\"")?;
        self.write_bytes(prefix)?;
        self.write_escaped_str(key)?;
        if self.indent.is_pretty() {
            self.write_bytes(b"\": ")
        } else {
            self.write_bytes(b"\":")
        }
    }

    /// Writes a string whose payload is already JSON-escaped, given as consecutive parts.
    pub fn write_escaped_parts<'p, I>(&mut self, parts: I) -> IoResult<()>
    where
        I: IntoIterator<Item = &'p str>,
    {
        self.write_bytes(b"\"")?;
        for part in parts {
            self.write_bytes(part.as_bytes())?;
        }
        self.write_bytes(b"\"")
    }

    #[inline]
    pub fn write_null(&mut self) -> IoResult<()> {
        self.write_bytes(b"null")
    }

    /// Streams `s` with JSON escaping applied, without quotes.
    fn write_escaped_str(&mut self, s: &str) -> IoResult<()> {
        let bytes = s.as_bytes();
        let mut run_start = 0usize;

        for (i, &b) in bytes.iter().enumerate() {
            let escape: &[u8] = match b {
                b'"' => b"\\\"",
                b'\\' => b"\\\\",
                0x08 => b"\\b",
                b'\t' => b"\\t",
                b'\n' => b"\\n",
                0x0C => b"\\f",
                b'\r' => b"\\r",
                0x00..=0x1F => {
                    if run_start < i {
                        self.write_bytes(&bytes[run_start..i])?;
                    }
                    let esc = [
                        b'\\',
                        b'u',
                        b'0',
                        b'0',
                        HEX[(b >> 4) as usize],
                        HEX[(b & 0x0F) as usize],
                    ];
                    self.write_bytes(&esc)?;
                    run_start = i + 1;
                    continue;
                }
                _ => continue,
            };

            if run_start < i {
                self.write_bytes(&bytes[run_start..i])?;
            }
            self.write_bytes(escape)?;
            run_start = i + 1;
        }

        if run_start < bytes.len() {
            self.write_bytes(&bytes[run_start..])?;
        }
        Ok(())
    }
}

/// A sink that only counts what is written to it.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByteCounter {
    count: usize,
}

impl ByteCounter {
    pub fn new() -> Self {
        ByteCounter::default()
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl Write for ByteCounter {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        self.count += buf.len();
        Ok(buf.len())
    }

    #[inline]
    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}
