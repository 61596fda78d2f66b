//! Serializes a [`TsDocument`] in the layout Qt's lupdate produces.

use std::path::Path;

use quick_xml::escape::escape;

use crate::types::{
    ContextBlock,
    Location,
    Message,
    Translation,
    TsDocument,
};

/// Renders `document` as `.ts` XML.
///
/// Reading the output back with [`crate::input::parse_document`] yields a
/// document equal to `document`.
#[must_use]
pub fn write_document(document: &TsDocument) -> String {
    let mut out = String::with_capacity(4096);

    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n<TS");
    push_attribute(&mut out, "version", &document.version);
    if let Some(language) = &document.language {
        push_attribute(&mut out, "language", language);
    }
    if let Some(source_language) = &document.source_language {
        push_attribute(&mut out, "sourcelanguage", source_language);
    }
    out.push_str(">\n");

    for context in &document.contexts {
        write_context(&mut out, context);
    }

    out.push_str("</TS>\n");
    out
}

/// Writes `document` to `path`, replacing any existing file.
///
/// # Errors
/// Returns the underlying I/O error.
pub fn save_document(path: &Path, document: &TsDocument) -> std::io::Result<()> {
    tracing::debug!(path = %path.display(), "Saving catalog document");
    std::fs::write(path, write_document(document))
}

/// Writes one `<context>` block.
fn write_context(out: &mut String, context: &ContextBlock) {
    out.push_str("<context>\n");
    push_element(out, 1, "name", &context.name);
    if let Some(comment) = &context.comment {
        push_element(out, 1, "comment", comment);
    }
    for message in &context.messages {
        write_message(out, message);
    }
    out.push_str("</context>\n");
}

/// Writes one `<message>` in lupdate element order.
fn write_message(out: &mut String, message: &Message) {
    indent(out, 1);
    out.push_str("<message");
    if let Some(id) = &message.id {
        push_attribute(out, "id", id);
    }
    if message.is_numerus() {
        push_attribute(out, "numerus", "yes");
    }
    out.push_str(">\n");

    for location in &message.locations {
        write_location(out, location);
    }
    push_element(out, 2, "source", &message.source);

    let optional = [
        ("oldsource", &message.old_source),
        ("comment", &message.comment),
        ("oldcomment", &message.old_comment),
        ("extracomment", &message.extra_comment),
        ("translatorcomment", &message.translator_comment),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            push_element(out, 2, name, value);
        }
    }

    indent(out, 2);
    out.push_str("<translation");
    if let Some(kind) = message.status.type_attr() {
        push_attribute(out, "type", kind);
    }
    out.push('>');
    match &message.translation {
        Translation::Single(text) => push_text(out, text),
        Translation::Numerus(forms) => {
            out.push('\n');
            for form in forms {
                push_element(out, 3, "numerusform", form);
            }
            indent(out, 2);
        }
    }
    out.push_str("</translation>\n");

    indent(out, 1);
    out.push_str("</message>\n");
}

/// Writes a `<location/>` element.
fn write_location(out: &mut String, location: &Location) {
    indent(out, 2);
    out.push_str("<location");
    if let Some(filename) = &location.filename {
        push_attribute(out, "filename", filename);
    }
    if let Some(line) = location.line {
        push_attribute(out, "line", &line.to_string());
    }
    out.push_str("/>\n");
}

/// Four spaces per level.
fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("    ");
    }
}

/// Writes `<name>text</name>` on its own line.
fn push_element(out: &mut String, level: usize, name: &str, text: &str) {
    indent(out, level);
    out.push('<');
    out.push_str(name);
    out.push('>');
    push_text(out, text);
    out.push_str("</");
    out.push_str(name);
    out.push_str(">\n");
}

/// Writes ` name="value"`; control characters become character references.
fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    let mut rest = value;
    while let Some(pos) = rest.find(|c: char| c.is_ascii_control()) {
        let (plain, tail) = rest.split_at(pos);
        out.push_str(&escape(plain));
        let mut chars = tail.chars();
        if let Some(c) = chars.next() {
            out.push_str(&format!("&#x{:x};", u32::from(c)));
        }
        rest = chars.as_str();
    }
    out.push_str(&escape(rest));
    out.push('"');
}

/// Escapes markup characters; control characters become `<byte>` elements.
fn push_text(out: &mut String, text: &str) {
    let mut rest = text;
    while let Some(pos) = rest.find(is_control) {
        let (plain, tail) = rest.split_at(pos);
        out.push_str(&escape(plain));
        let mut chars = tail.chars();
        if let Some(c) = chars.next() {
            out.push_str(&format!("<byte value=\"x{:x}\"/>", u32::from(c)));
        }
        rest = chars.as_str();
    }
    out.push_str(&escape(rest));
}

/// Characters that must be written as `<byte>`.
const fn is_control(c: char) -> bool {
    c.is_ascii_control() && !matches!(c, '\t' | '\n' | '\r')
}
