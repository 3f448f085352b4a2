use crate::analyzer::analyze;
use crate::err::{Result, XmlToJsonError};
use crate::json_output;
use crate::json_writer::Indent;
use crate::model::Document;
use crate::tree_builder;
use log::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConverterSettings {
    indent: Indent,
}

impl ConverterSettings {
    /// Compact output.
    pub fn new() -> Self {
        ConverterSettings::default()
    }

    /// Settings for an indentation width given as a signed number; negative means compact.
    pub fn from_indent(width: i32) -> Self {
        ConverterSettings::new().indent(Indent::from_signed(width))
    }

    pub fn indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    pub fn get_indent(&self) -> Indent {
        self.indent
    }

    pub fn should_indent(&self) -> bool {
        self.indent.is_pretty()
    }
}

/// Converts XML documents to JSON.
///
/// ```
/// use xml_to_json::{ConverterSettings, Indent, XmlToJson};
///
/// let converter = XmlToJson::new().with_configuration(ConverterSettings::new().indent(Indent::Spaces(2)));
/// let json = converter.convert("<x>hello world</x>").unwrap();
/// assert_eq!(json, "{\n  \"x\": \"hello world\"\n}");
/// ```
#[derive(Debug, Clone, Default)]
pub struct XmlToJson {
    config: ConverterSettings,
}

impl XmlToJson {
    pub fn new() -> Self {
        XmlToJson::default()
    }

    pub fn with_configuration(mut self, configuration: ConverterSettings) -> Self {
        self.config = configuration;
        self
    }

    pub fn settings(&self) -> &ConverterSettings {
        &self.config
    }

    pub fn convert(&self, xml: &str) -> Result<String> {
        let doc = self.parse(xml)?;
        self.render(&doc)
    }

    /// Like [`XmlToJson::convert`], for input that has not been checked to be UTF-8 yet.
    pub fn convert_bytes(&self, xml: &[u8]) -> Result<String> {
        let xml = std::str::from_utf8(xml)?;
        self.convert(xml)
    }

    /// Builds and analyzes the element tree without rendering it.
    pub fn parse<'a>(&self, xml: &'a str) -> Result<Document<'a>> {
        let mut doc = tree_builder::build(xml);
        trace!("built {} elements from {} input bytes", doc.len(), xml.len());

        analyze(&mut doc)?;
        Ok(doc)
    }

    /// Renders an analyzed tree into an exactly sized buffer.
    pub fn render(&self, doc: &Document<'_>) -> Result<String> {
        let indent = self.config.get_indent();
        let measured = json_output::measure(doc, indent)?;

        let mut buffer: Vec<u8> = Vec::new();
        buffer
            .try_reserve_exact(measured)
            .map_err(|source| XmlToJsonError::OutputAllocation {
                requested: measured,
                source,
            })?;

        json_output::render(doc, indent, &mut buffer)?;

        if buffer.len() != measured {
            return Err(XmlToJsonError::OutputSizeMismatch {
                measured,
                written: buffer.len(),
            });
        }

        debug!("rendered {} bytes of JSON", measured);
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_settings_builder() {
        assert_eq!(ConverterSettings::new().get_indent(), Indent::Compact);
        assert!(!ConverterSettings::from_indent(-1).should_indent());
        assert_eq!(
            ConverterSettings::from_indent(3).get_indent(),
            Indent::Spaces(3)
        );
        assert_eq!(
            ConverterSettings::new().indent(Indent::Spaces(2)),
            ConverterSettings::from_indent(2)
        );
    }

    #[test]
    fn test_convert_bytes_rejects_invalid_utf8() {
        let err = XmlToJson::new()
            .convert_bytes(b"<a>\xff</a>")
            .unwrap_err();
        assert!(matches!(err, XmlToJsonError::InvalidUtf8Input(_)));
    }

    #[test]
    fn test_convert_bytes_matches_convert() {
        let converter = XmlToJson::new().with_configuration(ConverterSettings::from_indent(1));
        let xml = "<a><b>1</b><b>2</b></a>";
        assert_eq!(
            converter.convert_bytes(xml.as_bytes()).unwrap(),
            converter.convert(xml).unwrap()
        );
    }

    #[test]
    fn test_parse_then_render() {
        let converter = XmlToJson::new();
        let doc = converter.parse("<a><b/><c/><b/></a>").unwrap();
        assert_eq!(doc.len(), 4);
        assert_eq!(converter.render(&doc).unwrap(), r#"{"a":{"b":[null,null],"c":null}}"#);
    }

    #[test]
    fn test_output_has_exact_capacity() {
        let converter = XmlToJson::new().with_configuration(ConverterSettings::from_indent(2));
        let json = converter.convert("<r a='1'><x>t</x><x/></r>").unwrap();
        assert_eq!(json.len(), json.capacity());
    }
}
