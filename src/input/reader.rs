//! Pull parser for Qt Linguist `.ts` documents.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{
    BytesStart,
    Event,
};

use super::error::{
    Block,
    CatalogParseError,
};
use crate::types::{
    ContextBlock,
    DEFAULT_TS_VERSION,
    LineRef,
    Location,
    Message,
    MessageStatus,
    Translation,
    TsDocument,
};

/// Reads and parses a `.ts` file.
///
/// # Errors
/// Returns `CatalogParseError::Io` when the file cannot be read, otherwise
/// see [`parse_document`].
pub fn load_document(path: &Path) -> Result<TsDocument, CatalogParseError> {
    tracing::debug!(path = %path.display(), "Loading catalog document");

    let text = std::fs::read_to_string(path)
        .map_err(|source| CatalogParseError::Io { path: path.to_path_buf(), source })?;

    parse_document(&text)
}

/// Parses the text of a `.ts` document.
///
/// Text content is kept verbatim, including leading and trailing whitespace.
///
/// # Errors
/// Returns an error naming the offending block when the XML is malformed or
/// the element structure does not match the catalog format.
pub fn parse_document(text: &str) -> Result<TsDocument, CatalogParseError> {
    let mut parser = Parser::new(text);
    let document = parser.parse()?;

    tracing::debug!(
        language = ?document.language,
        contexts = document.contexts.len(),
        "Parsed catalog document"
    );

    Ok(document)
}

/// Event-level state of one parse.
struct Parser<'a> {
    reader: Reader<&'a [u8]>,
    /// Block errors are attributed to.
    block: Block,
}

impl<'a> Parser<'a> {
    /// Reader over `text`, keeping whitespace inside elements.
    fn new(text: &'a str) -> Self {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(false);
        Self { reader, block: Block::Document }
    }

    /// Structural error at the current position.
    fn structure_error(&self, message: impl Into<String>) -> CatalogParseError {
        CatalogParseError::Structure {
            block: self.block.clone(),
            position: self.reader.buffer_position(),
            message: message.into(),
        }
    }

    /// Wraps a quick-xml failure with the current block.
    fn xml_error(&self, source: impl Into<quick_xml::Error>) -> CatalogParseError {
        CatalogParseError::Xml {
            block: self.block.clone(),
            position: self.reader.error_position(),
            source: source.into(),
        }
    }

    /// Next event that is not a declaration, doctype, comment or processing instruction.
    fn next_event(&mut self) -> Result<Event<'a>, CatalogParseError> {
        loop {
            match self.reader.read_event() {
                Ok(Event::Decl(_) | Event::DocType(_) | Event::Comment(_) | Event::PI(_)) => {}
                Ok(event) => return Ok(event),
                Err(e) => return Err(self.xml_error(e)),
            }
        }
    }

    /// Like [`Self::next_event`], but also drops indentation between elements.
    fn next_structural(&mut self) -> Result<Event<'a>, CatalogParseError> {
        loop {
            match self.next_event()? {
                Event::Text(text) => {
                    if !text.iter().all(u8::is_ascii_whitespace) {
                        return Err(self.structure_error("unexpected text between elements"));
                    }
                }
                Event::CData(_) => {
                    return Err(self.structure_error("unexpected CDATA between elements"));
                }
                event => return Ok(event),
            }
        }
    }

    /// Parses the whole document.
    fn parse(&mut self) -> Result<TsDocument, CatalogParseError> {
        let mut document = loop {
            match self.next_structural()? {
                Event::Start(start) if start.name().as_ref() == b"TS" => {
                    break self.parse_ts_attributes(&start)?;
                }
                Event::Empty(start) if start.name().as_ref() == b"TS" => {
                    let document = self.parse_ts_attributes(&start)?;
                    self.expect_eof()?;
                    return Ok(document);
                }
                Event::Start(start) | Event::Empty(start) => {
                    return Err(self.structure_error(format!(
                        "expected <TS> root element, found <{}>",
                        element_name(&start)
                    )));
                }
                Event::Eof => return Err(self.structure_error("missing <TS> root element")),
                _ => return Err(self.structure_error("expected <TS> root element")),
            }
        };

        loop {
            match self.next_structural()? {
                Event::Start(start) if start.name().as_ref() == b"context" => {
                    let context = self.parse_context(document.contexts.len())?;
                    document.contexts.push(context);
                    self.block = Block::Document;
                }
                Event::Empty(start) if start.name().as_ref() == b"context" => {
                    self.block = Block::Context { index: document.contexts.len(), name: None };
                    return Err(self.structure_error("context without <name>"));
                }
                Event::Start(start) => self.skip_element(&start)?,
                Event::Empty(start) => {
                    tracing::debug!(element = %element_name(&start), "Ignoring empty element");
                }
                Event::End(_) => break,
                Event::Eof => return Err(self.structure_error("unexpected end of document")),
                _ => return Err(self.structure_error("unexpected content in <TS>")),
            }
        }

        self.expect_eof()?;
        Ok(document)
    }

    /// Fails if anything but whitespace follows `</TS>`.
    fn expect_eof(&mut self) -> Result<(), CatalogParseError> {
        match self.next_structural()? {
            Event::Eof => Ok(()),
            _ => Err(self.structure_error("content after </TS>")),
        }
    }

    /// Header attributes of `<TS>`.
    fn parse_ts_attributes(&self, start: &BytesStart<'a>) -> Result<TsDocument, CatalogParseError> {
        Ok(TsDocument {
            version: self
                .attribute(start, b"version")?
                .unwrap_or_else(|| DEFAULT_TS_VERSION.to_string()),
            language: self.attribute(start, b"language")?.filter(|l| !l.is_empty()),
            source_language: self.attribute(start, b"sourcelanguage")?.filter(|l| !l.is_empty()),
            contexts: Vec::new(),
        })
    }

    /// Parses one `<context>` after its start tag.
    fn parse_context(&mut self, index: usize) -> Result<ContextBlock, CatalogParseError> {
        self.block = Block::Context { index, name: None };

        let mut name: Option<String> = None;
        let mut comment = None;
        let mut messages = Vec::new();

        loop {
            match self.next_structural()? {
                Event::Start(start) => match start.name().as_ref() {
                    b"name" => {
                        let value = self.read_text(&start)?;
                        self.block = Block::Context { index, name: Some(value.clone()) };
                        name = Some(value);
                    }
                    b"comment" => comment = Some(self.read_text(&start)?),
                    b"message" => {
                        let message = self.parse_message(&start, name.as_deref(), messages.len())?;
                        messages.push(message);
                        self.block = Block::Context { index, name: name.clone() };
                    }
                    _ => self.skip_element(&start)?,
                },
                Event::Empty(start) => match start.name().as_ref() {
                    b"name" => {
                        self.block = Block::Context { index, name: Some(String::new()) };
                        name = Some(String::new());
                    }
                    b"comment" => comment = Some(String::new()),
                    b"message" => {
                        self.block = Block::Message {
                            context: name.clone(),
                            index: messages.len(),
                            source: None,
                        };
                        return Err(self.structure_error("message without <source>"));
                    }
                    _ => tracing::debug!(element = %element_name(&start), "Ignoring empty element"),
                },
                Event::End(_) => break,
                Event::Eof => return Err(self.structure_error("unexpected end of document")),
                _ => return Err(self.structure_error("unexpected content in <context>")),
            }
        }

        let Some(name) = name else {
            return Err(self.structure_error("context without <name>"));
        };

        Ok(ContextBlock { name, comment, messages })
    }

    /// Parses one `<message>` after its start tag.
    fn parse_message(
        &mut self,
        start: &BytesStart<'a>,
        context: Option<&str>,
        index: usize,
    ) -> Result<Message, CatalogParseError> {
        self.block = Block::Message { context: context.map(str::to_string), index, source: None };

        let id = self.attribute(start, b"id")?;
        let numerus = self.attribute(start, b"numerus")?.is_some_and(|v| v == "yes");

        let mut message = Message { id, ..Message::default() };
        let mut source = None;
        let mut translation_seen = false;

        loop {
            match self.next_structural()? {
                Event::Start(child) => match child.name().as_ref() {
                    b"source" => {
                        let text = self.read_text(&child)?;
                        self.block = Block::Message {
                            context: context.map(str::to_string),
                            index,
                            source: Some(text.clone()),
                        };
                        source = Some(text);
                    }
                    b"oldsource" => message.old_source = Some(self.read_text(&child)?),
                    b"comment" => message.comment = Some(self.read_text(&child)?),
                    b"oldcomment" => message.old_comment = Some(self.read_text(&child)?),
                    b"extracomment" => message.extra_comment = Some(self.read_text(&child)?),
                    b"translatorcomment" => {
                        message.translator_comment = Some(self.read_text(&child)?);
                    }
                    b"translation" => {
                        message.status = self.translation_status(&child)?;
                        message.translation = if numerus {
                            Translation::Numerus(self.read_numerus_forms()?)
                        } else {
                            Translation::Single(self.read_text(&child)?)
                        };
                        translation_seen = true;
                    }
                    b"location" => {
                        message.locations.push(self.parse_location(&child)?);
                        self.skip_element(&child)?;
                    }
                    _ => self.skip_element(&child)?,
                },
                Event::Empty(child) => match child.name().as_ref() {
                    b"location" => message.locations.push(self.parse_location(&child)?),
                    b"translation" => {
                        message.status = self.translation_status(&child)?;
                        message.translation = if numerus {
                            Translation::Numerus(Vec::new())
                        } else {
                            Translation::Single(String::new())
                        };
                        translation_seen = true;
                    }
                    b"source" => source = Some(String::new()),
                    b"comment" => message.comment = Some(String::new()),
                    b"extracomment" => message.extra_comment = Some(String::new()),
                    b"translatorcomment" => message.translator_comment = Some(String::new()),
                    _ => tracing::debug!(element = %element_name(&child), "Ignoring empty element"),
                },
                Event::End(_) => break,
                Event::Eof => return Err(self.structure_error("unexpected end of document")),
                _ => return Err(self.structure_error("unexpected content in <message>")),
            }
        }

        let Some(source) = source else {
            return Err(self.structure_error("message without <source>"));
        };
        message.source = source;

        if !translation_seen {
            // Nothing has been translated yet; never treat this as an intentional empty string.
            message.status = MessageStatus::Unfinished;
            if numerus {
                message.translation = Translation::Numerus(Vec::new());
            }
        }

        Ok(message)
    }

    /// Status from the `type` attribute of `<translation>`.
    fn translation_status(
        &self,
        start: &BytesStart<'a>,
    ) -> Result<MessageStatus, CatalogParseError> {
        let value = self.attribute(start, b"type")?;
        MessageStatus::from_type_attr(value.as_deref()).ok_or_else(|| {
            self.structure_error(format!(
                "unknown translation type '{}'",
                value.unwrap_or_default()
            ))
        })
    }

    /// Reads a `<location>` element.
    fn parse_location(&self, start: &BytesStart<'a>) -> Result<Location, CatalogParseError> {
        let filename = self.attribute(start, b"filename")?;
        let line = match self.attribute(start, b"line")? {
            Some(value) => Some(LineRef::parse(&value).ok_or_else(|| {
                self.structure_error(format!("invalid location line '{value}'"))
            })?),
            None => None,
        };
        Ok(Location { filename, line })
    }

    /// Reads the `<numerusform>` children of a plural `<translation>`.
    fn read_numerus_forms(&mut self) -> Result<Vec<String>, CatalogParseError> {
        let mut forms = Vec::new();
        loop {
            match self.next_structural()? {
                Event::Start(start) if start.name().as_ref() == b"numerusform" => {
                    forms.push(self.read_text(&start)?);
                }
                Event::Empty(start) if start.name().as_ref() == b"numerusform" => {
                    forms.push(String::new());
                }
                Event::Start(start) => self.skip_element(&start)?,
                Event::Empty(_) => {}
                Event::End(_) => return Ok(forms),
                Event::Eof => return Err(self.structure_error("unexpected end of document")),
                _ => return Err(self.structure_error("unexpected content in plural <translation>")),
            }
        }
    }

    /// Collects the text content of `start` up to its end tag.
    fn read_text(&mut self, start: &BytesStart<'a>) -> Result<String, CatalogParseError> {
        let mut text = String::new();
        loop {
            match self.next_event()? {
                Event::Text(chunk) => {
                    let chunk = chunk.unescape().map_err(|e| self.xml_error(e))?;
                    text.push_str(&chunk);
                }
                Event::CData(chunk) => {
                    let chunk = chunk.decode().map_err(|e| self.xml_error(e))?;
                    text.push_str(&chunk);
                }
                Event::Empty(byte) if byte.name().as_ref() == b"byte" => {
                    text.push(self.parse_byte(&byte)?);
                }
                Event::End(_) => return Ok(text),
                Event::Eof => return Err(self.structure_error("unexpected end of document")),
                Event::Start(child) | Event::Empty(child) => {
                    return Err(self.structure_error(format!(
                        "unexpected <{}> inside <{}>",
                        element_name(&child),
                        element_name(start)
                    )));
                }
                _ => {}
            }
        }
    }

    /// Decodes `<byte value="x1b"/>`, which stands for a character XML cannot carry.
    fn parse_byte(&self, start: &BytesStart<'a>) -> Result<char, CatalogParseError> {
        let value = self.attribute(start, b"value")?.unwrap_or_default();
        let code = value.strip_prefix('x').map_or_else(
            || value.parse::<u32>().ok(),
            |hex| u32::from_str_radix(hex, 16).ok(),
        );
        code.and_then(char::from_u32)
            .ok_or_else(|| self.structure_error(format!("invalid byte value '{value}'")))
    }

    /// Skips an unknown element with all its children.
    fn skip_element(&mut self, start: &BytesStart<'a>) -> Result<(), CatalogParseError> {
        let name = start.name();
        if !matches!(name.as_ref(), b"location" | b"defaultcodec" | b"dependencies") {
            tracing::warn!(element = %element_name(start), block = %self.block, "Skipping unknown element");
        }
        self.reader.read_to_end(name).map_err(|e| self.xml_error(e))?;
        Ok(())
    }

    /// Unescaped value of attribute `name`.
    fn attribute(
        &self,
        start: &BytesStart<'a>,
        name: &[u8],
    ) -> Result<Option<String>, CatalogParseError> {
        for attr in start.attributes() {
            let attr = attr.map_err(|e| self.xml_error(e))?;
            if attr.key.as_ref() == name {
                let value = attr.unescape_value().map_err(|e| self.xml_error(e))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }
}

/// Element name for messages.
fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    const GERMAN: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="de_DE">
<context>
    <name>AboutDialog</name>
    <message>
        <source>Ok</source>
        <translation type="obsolete">Ok</translation>
    </message>
    <message>
        <location filename="../aboutdialog.cpp" line="106"/>
        <source>Credits</source>
        <comment>Help-&gt;About vym dialog</comment>
        <translation>Danke</translation>
    </message>
</context>
<context>
    <name>AboutTextBrowser</name>
    <message>
        <location filename="../aboutdialog.cpp" line="247"/>
        <source>Couldn&apos;t find a viewer to open %1.
</source>
        <comment>About window</comment>
        <translation>Konnte kein Programm zum Öffnen von %1 finden.</translation>
    </message>
</context>
</TS>
"#;

    #[googletest::test]
    fn test_parse_header_and_contexts() {
        let doc = parse_document(GERMAN).unwrap();

        expect_that!(doc.version, eq("2.1"));
        expect_that!(doc.language, some(eq("de_DE")));
        expect_that!(doc.source_language, none());
        expect_that!(doc.contexts.len(), eq(2));
        expect_that!(doc.contexts[0].name, eq("AboutDialog"));
        expect_that!(doc.contexts[0].messages.len(), eq(2));
    }

    #[googletest::test]
    fn test_parse_message_fields() {
        let doc = parse_document(GERMAN).unwrap();
        let obsolete = &doc.contexts[0].messages[0];
        let credits = &doc.contexts[0].messages[1];

        expect_that!(obsolete.status, eq(MessageStatus::Obsolete));
        expect_that!(obsolete.locations, is_empty());

        expect_that!(credits.source, eq("Credits"));
        expect_that!(credits.comment, some(eq("Help->About vym dialog")));
        expect_that!(credits.translation.text(), eq("Danke"));
        expect_that!(credits.status, eq(MessageStatus::Finished));
        assert_eq!(credits.locations, vec![Location::new("../aboutdialog.cpp", 106)]);
    }

    #[googletest::test]
    fn test_parse_keeps_trailing_newline_and_unescapes() {
        let doc = parse_document(GERMAN).unwrap();
        let message = &doc.contexts[1].messages[0];

        expect_that!(message.source, eq("Couldn't find a viewer to open %1.\n"));
        expect_that!(message.translation.text(), eq("Konnte kein Programm zum Öffnen von %1 finden."));
    }

    #[googletest::test]
    fn test_parse_empty_translation_is_finished() {
        let text = r#"<TS version="2.1" language="de_DE"><context><name>HistoryWindow</name>
<message><source>Time</source><translation></translation></message>
<message><source>Comment</source><translation/></message>
</context></TS>"#;

        let doc = parse_document(text).unwrap();

        for message in &doc.contexts[0].messages {
            expect_that!(message.status, eq(MessageStatus::Finished));
            expect_that!(message.translation.text(), eq(""));
        }
    }

    #[googletest::test]
    fn test_parse_missing_translation_is_unfinished() {
        let text = "<TS><context><name>A</name><message><source>x</source></message></context></TS>";

        let doc = parse_document(text).unwrap();

        expect_that!(doc.contexts[0].messages[0].status, eq(MessageStatus::Unfinished));
        expect_that!(doc.version, eq(DEFAULT_TS_VERSION));
        expect_that!(doc.language, none());
    }

    #[googletest::test]
    fn test_parse_numerus_forms() {
        let text = r#"<TS version="2.1" language="de_DE"><context><name>MainWindow</name>
<message numerus="yes">
    <source>%n file(s)</source>
    <translation type="unfinished">
        <numerusform>%n Datei</numerusform>
        <numerusform>%n Dateien</numerusform>
    </translation>
</message>
</context></TS>"#;

        let doc = parse_document(text).unwrap();
        let message = &doc.contexts[0].messages[0];

        expect_that!(message.is_numerus(), eq(true));
        expect_that!(message.status, eq(MessageStatus::Unfinished));
        assert_eq!(
            message.translation,
            Translation::Numerus(vec!["%n Datei".to_string(), "%n Dateien".to_string()])
        );
    }

    #[googletest::test]
    fn test_parse_byte_elements_and_char_refs() {
        let text = r#"<TS><context><name>A</name><message>
<source>Esc<byte value="x1b"/>[0m &#x263A;</source><translation>ok</translation>
</message></context></TS>"#;

        let doc = parse_document(text).unwrap();

        expect_that!(doc.contexts[0].messages[0].source, eq("Esc\u{1b}[0m \u{263a}"));
    }

    #[googletest::test]
    fn test_parse_relative_locations_and_comments() {
        let text = r#"<TS version="2.1" language="ja_JP"><context><name>A</name><message>
<location filename="../a.cpp" line="+12"/>
<location line="-3"/>
<source>x</source>
<extracomment>Linestyle in Edit XLink dialog</extracomment>
<translatorcomment>check later</translatorcomment>
<translation>y</translation>
</message></context></TS>"#;

        let doc = parse_document(text).unwrap();
        let message = &doc.contexts[0].messages[0];

        assert_eq!(
            message.locations,
            vec![
                Location { filename: Some("../a.cpp".to_string()), line: Some(LineRef::Relative(12)) },
                Location { filename: None, line: Some(LineRef::Relative(-3)) },
            ]
        );
        expect_that!(message.extra_comment, some(eq("Linestyle in Edit XLink dialog")));
        expect_that!(message.translator_comment, some(eq("check later")));
    }

    #[googletest::test]
    fn test_parse_skips_unknown_elements() {
        let text = r#"<TS><context><name>A</name><message>
<source>x</source><userdata>whatever<b>nested</b></userdata><translation>y</translation>
</message></context></TS>"#;

        let doc = parse_document(text).unwrap();

        expect_that!(doc.contexts[0].messages[0].translation.text(), eq("y"));
    }

    #[rstest]
    #[case::no_root("", "missing <TS> root")]
    #[case::wrong_root("<catalog/>", "expected <TS> root")]
    #[case::context_without_name(
        "<TS><context><message><source>a</source></message></context></TS>",
        "context without <name>"
    )]
    #[case::message_without_source(
        "<TS><context><name>A</name><message><translation>b</translation></message></context></TS>",
        "message without <source>"
    )]
    #[case::unknown_type(
        r#"<TS><context><name>A</name><message><source>a</source><translation type="done">b</translation></message></context></TS>"#,
        "unknown translation type 'done'"
    )]
    #[case::bad_line(
        r#"<TS><context><name>A</name><message><location filename="a" line="x"/><source>a</source></message></context></TS>"#,
        "invalid location line 'x'"
    )]
    #[case::stray_text("<TS>hello<context/></TS>", "unexpected text")]
    #[case::nested_markup(
        "<TS><context><name>A<b/></name></context></TS>",
        "unexpected <b> inside <name>"
    )]
    fn test_parse_structure_errors(#[case] text: &str, #[case] expected: &str) {
        let error = parse_document(text).unwrap_err();

        assert!(matches!(error, CatalogParseError::Structure { .. }), "{error}");
        assert_that!(error.to_string(), contains_substring(expected));
    }

    #[rstest]
    #[case("<TS><context><name>A</name>")]
    #[case("<TS><context><name>A</name><message><source>x</source>")]
    fn test_parse_truncated_document_fails(#[case] text: &str) {
        assert!(parse_document(text).is_err());
    }

    #[googletest::test]
    fn test_parse_error_names_offending_block() {
        let text = r#"<TS><context><name>A</name></context><context><name>LockedFileDialog</name>
<message><source>Open readonly</source><translation type="bogus">x</translation></message>
</context></TS>"#;

        let error = parse_document(text).unwrap_err();

        assert_eq!(
            error.block(),
            Some(&Block::Message {
                context: Some("LockedFileDialog".to_string()),
                index: 0,
                source: Some("Open readonly".to_string()),
            })
        );
    }

    #[googletest::test]
    fn test_parse_mismatched_tags_is_xml_error() {
        let text = "<TS><context><name>A</context></TS>";

        let error = parse_document(text).unwrap_err();

        expect_that!(matches!(error, CatalogParseError::Xml { .. }), eq(true));
    }

    #[googletest::test]
    fn test_load_document_missing_file() {
        let error = load_document(Path::new("/nonexistent/vym.de_DE.ts")).unwrap_err();

        expect_that!(matches!(error, CatalogParseError::Io { .. }), eq(true));
        expect_that!(error.to_string(), contains_substring("vym.de_DE.ts"));
    }
}
