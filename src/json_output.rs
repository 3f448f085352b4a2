//! JSON rendering for analyzed element trees.
//!
//! The same [`JsonEmitter`] runs twice per conversion: over a [`ByteCounter`] to learn the
//! exact output length, then over the real sink. Every element renders according to its
//! [`Shape`]:
//!
//! - `null` for an element with no attributes, text or children;
//! - a string for a single text run;
//! - otherwise an object with `@attribute` members, a `#text` member (a string, or an array
//!   for mixed content) and the child members.
//!
//! Children that belong to an array group are emitted as one `"name": [...]` member opened by
//! the group's first member and closed after the member flagged `is_array_end`.

use crate::err::Result;
use crate::json_writer::{ByteCounter, Indent, JsonWriter};
use crate::model::{Document, ElementId, Shape, Value};
use indextree::NodeEdge;
use std::io::Write;

/// Exact number of bytes [`render`] will write for `doc`.
pub fn measure(doc: &Document<'_>, indent: Indent) -> Result<usize> {
    let mut emitter = JsonEmitter::new(doc, ByteCounter::new(), indent);
    emitter.emit_document()?;
    Ok(emitter.into_inner().count())
}

/// Render `doc` into `writer`.
pub fn render<W: Write>(doc: &Document<'_>, indent: Indent, writer: W) -> Result<()> {
    let mut emitter = JsonEmitter::new(doc, writer, indent);
    emitter.emit_document()?;
    emitter.writer.flush()?;
    Ok(())
}

struct JsonEmitter<'d, 'a, W: Write> {
    doc: &'d Document<'a>,
    writer: JsonWriter<W>,
}

impl<'d, 'a, W: Write> JsonEmitter<'d, 'a, W> {
    fn new(doc: &'d Document<'a>, writer: W, indent: Indent) -> Self {
        JsonEmitter {
            doc,
            writer: JsonWriter::new(writer, indent),
        }
    }

    fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    /// Walks the tree with `traverse` start/end events, so nesting depth never grows the
    /// call stack.
    fn emit_document(&mut self) -> Result<()> {
        let doc = self.doc;
        let root = doc.root();

        for edge in root.traverse(doc.arena()) {
            match edge {
                NodeEdge::Start(id) if id == root => self.writer.open_object()?,
                NodeEdge::End(id) if id == root => self.writer.close_object()?,
                NodeEdge::Start(id) => self.start_element(id)?,
                NodeEdge::End(id) => self.end_element(id)?,
            }
        }

        Ok(())
    }

    /// Writes the member key (or array slot) of `id` and everything of its body that comes
    /// before the children.
    fn start_element(&mut self, id: ElementId) -> Result<()> {
        let doc = self.doc;
        let element = doc.element(id);

        match element.array_rank {
            0 => self.writer.write_key(element.name)?,
            1 => {
                self.writer.write_key(element.name)?;
                self.writer.open_array()?;
                self.writer.begin_element()?;
            }
            _ => self.writer.begin_element()?,
        }

        match element.shape() {
            Shape::Null => self.writer.write_null()?,
            Shape::Scalar => self.emit_value(&element.values[0])?,
            Shape::Object => {
                self.writer.open_object()?;

                for attribute in &element.attributes {
                    self.writer.write_attribute_key(attribute.name)?;
                    self.emit_value(&attribute.value)?;
                }

                match element.values.as_slice() {
                    [] => {}
                    [value] => {
                        self.writer.write_key("#text")?;
                        self.emit_value(value)?;
                    }
                    values => {
                        self.writer.write_key("#text")?;
                        self.writer.open_array()?;
                        for value in values {
                            self.writer.begin_element()?;
                            self.emit_value(value)?;
                        }
                        self.writer.close_array()?;
                    }
                }
            }
        }

        Ok(())
    }

    fn end_element(&mut self, id: ElementId) -> Result<()> {
        let doc = self.doc;
        let element = doc.element(id);

        // Only objects have children, so only they were left open by `start_element`.
        if element.shape() == Shape::Object {
            self.writer.close_object()?;
        }
        if element.is_array_member() && element.is_array_end {
            self.writer.close_array()?;
        }

        Ok(())
    }

    fn emit_value(&mut self, value: &Value<'_>) -> Result<()> {
        self.writer
            .write_escaped_parts(value.parts().iter().map(|part| part.as_str()))?;
        Ok(())
    }
}
