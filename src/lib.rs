//! Converts XML documents into JSON.
//!
//! Elements become object members keyed by tag name, attributes become `@name` members,
//! text becomes a string (or a `#text` member next to attributes and children) and repeated
//! sibling tags are grouped into arrays, even when other siblings sit between them.
//!
//! ```
//! let json = xml_to_json::xml_to_json("<a><b>1</b><c/><b>2</b></a>", -1).unwrap();
//! assert_eq!(json, r#"{"a":{"b":["1","2"],"c":null}}"#);
//! ```

pub mod analyzer;
pub mod converter;
pub mod err;
pub mod json_output;
pub mod json_writer;
pub mod model;
pub mod tree_builder;
pub mod utils;

pub use analyzer::AnalysisStats;
pub use converter::{ConverterSettings, XmlToJson};
pub use err::{Result, XmlToJsonError};
pub use json_writer::Indent;
pub use model::{Document, Element, ElementId};

/// Convert `xml` to JSON, indenting by `indent` spaces per level, or compact when negative.
pub fn xml_to_json(xml: &str, indent: i32) -> Result<String> {
    XmlToJson::new()
        .with_configuration(ConverterSettings::from_indent(indent))
        .convert(xml)
}
