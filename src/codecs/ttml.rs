//! TTML family (TTML / DFXP / SMPTE-TT): XML `<p>` elements with
//! `begin`/`end`/`dur`, `<span>` runs, `<head><styling>`/`<layout>`
//! (spec.md §4.3.9).

use roxmltree::Document as XmlDocument;

use crate::codecs::{ParseOptions, ParseResult, SerializeOptions};
use crate::error::{ErrorCode, SubforgeError};
use crate::model::{Document, Event, Style, TextSegment};
use crate::primitives::color::AbgrColor;
use crate::primitives::encoding::decode;
use crate::primitives::timecode::parse_ttml;

pub fn parse(bytes: &[u8], opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
    let text = decode(bytes, opts.encoding);
    let xml = XmlDocument::parse(&text)
        .map_err(|e| SubforgeError::new(ErrorCode::InvalidFormat, format!("XML parse error: {e}")))?;

    let mut doc = Document::new();
    let default_fps = 30.0;

    for node in xml.descendants() {
        if node.tag_name().name().eq_ignore_ascii_case("style") {
            let Some(id) = node.attribute("xml:id").or_else(|| node.attribute("id")) else { continue };
            let mut style = Style::named(id);
            if let Some(color) = node.attribute("tts:color").or_else(|| node.attribute("color")) {
                if let Some(c) = AbgrColor::parse_css(color) {
                    style.primary_color = c;
                }
            }
            if let Some(size) = node.attribute("tts:fontSize") {
                style.font_size = size.trim_end_matches("px").parse().unwrap_or(style.font_size);
            }
            doc.styles.insert(style);
        }
    }

    for node in xml.descendants() {
        if !node.tag_name().name().eq_ignore_ascii_case("p") {
            continue;
        }
        let begin_attr = node.attribute("begin");
        let end_attr = node.attribute("end");
        let dur_attr = node.attribute("dur");

        let Some(start_ms) = begin_attr.and_then(|b| parse_ttml(b, default_fps)) else {
            continue;
        };
        let end_ms = end_attr
            .and_then(|e| parse_ttml(e, default_fps))
            .or_else(|| dur_attr.and_then(|d| parse_ttml(d, default_fps)).map(|d| start_ms + d))
            .unwrap_or(start_ms);

        let style_name = node.attribute("style").map(str::to_string);
        let (text, segments) = flatten_paragraph(node);
        let mut event = Event::new(0, start_ms, end_ms, text);
        if let Some(name) = style_name {
            event.style = name;
        }
        if segments.len() > 1 || segments.iter().any(|s| s.style.is_some()) {
            event.set_segments(segments);
        }
        doc.add_event(event);
    }

    Ok(ParseResult::ok(doc))
}

fn flatten_paragraph(node: roxmltree::Node) -> (String, Vec<TextSegment>) {
    let mut plain = String::new();
    let mut segments = Vec::new();
    collect_text(node, &mut plain, &mut segments, None);
    (plain.trim().to_string(), segments)
}

fn collect_text(
    node: roxmltree::Node,
    plain: &mut String,
    segments: &mut Vec<TextSegment>,
    inherited_style: Option<String>,
) {
    for child in node.children() {
        if child.is_text() {
            if let Some(t) = child.text() {
                plain.push_str(t);
                segments.push(TextSegment {
                    text: t.to_string(),
                    style: None,
                    effects: Vec::new(),
                });
            }
        } else if child.tag_name().name().eq_ignore_ascii_case("br") {
            plain.push('\n');
            segments.push(TextSegment::plain("\n"));
        } else if child.tag_name().name().eq_ignore_ascii_case("span") {
            let style = child.attribute("style").map(str::to_string).or_else(|| inherited_style.clone());
            collect_text(child, plain, segments, style);
        }
    }
}

pub fn serialize(doc: &Document, opts: &SerializeOptions) -> String {
    let mut out = String::new();
    if opts.include_head {
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str("<tt xmlns=\"http://www.w3.org/ns/ttml\">\n<head>\n<styling>\n");
        for style in doc.styles.iter() {
            out.push_str(&format!(
                "<style xml:id=\"{}\" tts:color=\"{}\"/>\n",
                style.name,
                format_css_color(style.primary_color)
            ));
        }
        out.push_str("</styling>\n</head>\n<body><div>\n");
    } else {
        out.push_str("<tt><body><div>\n");
    }
    for event in &doc.events {
        out.push_str(&format!(
            "<p begin=\"{}\" end=\"{}\">{}</p>\n",
            format_ttml_clock(event.start_ms),
            format_ttml_clock(event.end_ms),
            event.effective_text().replace('\n', "<br/>")
        ));
    }
    out.push_str("</div></body></tt>\n");
    out
}

fn format_ttml_clock(ms: i64) -> String {
    crate::primitives::timecode::format_ttml(ms)
}

fn format_css_color(c: AbgrColor) -> String {
    format!("#{:02X}{:02X}{:02X}", c.r(), c.g(), c.b())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clock_time_paragraphs() {
        let input = r#"<tt><body><div><p begin="00:00:01.000" end="00:00:05.000">Hello</p></div></body></tt>"#;
        let result = parse(input.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(result.document.events.len(), 1);
        assert_eq!(result.document.events[0].start_ms, 1000);
        assert_eq!(result.document.events[0].end_ms, 5000);
        assert_eq!(result.document.events[0].text, "Hello");
    }

    #[test]
    fn dur_attribute_computes_end() {
        let input = r#"<tt><body><div><p begin="1s" dur="2s">Hi</p></div></body></tt>"#;
        let result = parse(input.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(result.document.events[0].start_ms, 1000);
        assert_eq!(result.document.events[0].end_ms, 3000);
    }

    #[test]
    fn br_becomes_newline() {
        let input = r#"<tt><body><div><p begin="0s" end="1s">line1<br/>line2</p></div></body></tt>"#;
        let result = parse(input.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(result.document.events[0].text, "line1\nline2");
    }

    #[test]
    fn invalid_xml_is_invalid_format() {
        let err = parse(b"<tt><body>", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
    }
}
