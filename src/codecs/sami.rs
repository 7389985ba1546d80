//! SAMI (SMI): SGML-ish, `<STYLE>` CSS classes, `<SYNC Start=...><P>...`
//! cues (spec.md §4.3.7).

use crate::codecs::{ParseOptions, ParseResult, SerializeOptions};
use crate::error::SubforgeError;
use crate::model::{Document, Event, Style};
use crate::primitives::color::AbgrColor;
use crate::primitives::encoding::decode;
use crate::tags::html::{parse_html_tags, serialize_html_tags};

pub fn parse(bytes: &[u8], opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
    let text = decode(bytes, opts.encoding);
    let mut doc = Document::new();

    if let Some(style_block) = extract_tag_body(&text, "STYLE") {
        for style in parse_css_classes(&style_block) {
            doc.styles.insert(style);
        }
    }

    let sync_positions = find_tag_positions(&text, "<SYNC");
    for (i, &start) in sync_positions.iter().enumerate() {
        let Some(tag_end) = text[start..].find('>').map(|p| start + p + 1) else { continue };
        let start_ms = extract_attr_ms(&text[start..tag_end], "Start").unwrap_or(0);

        let body_end = sync_positions.get(i + 1).copied().unwrap_or(text.len());
        let body = &text[tag_end..body_end];
        let cleaned = strip_p_tag(body);
        let decoded = decode_entities(&cleaned);
        let trimmed = decoded.trim();

        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("&nbsp;") {
            continue;
        }

        let segments = parse_html_tags(trimmed, false);
        let mut event = Event::new(0, start_ms, start_ms, trimmed.to_string());
        if segments.len() > 1 || segments.iter().any(|s| s.style.is_some()) {
            event.set_segments(segments);
        }
        doc.add_event(event);
    }

    // Close each event at the next event's start time.
    let starts: Vec<i64> = doc.events.iter().map(|e| e.start_ms).collect();
    for i in 0..doc.events.len() {
        doc.events[i].end_ms = starts.get(i + 1).copied().unwrap_or(doc.events[i].start_ms + 2000);
    }

    Ok(ParseResult::ok(doc))
}

fn extract_tag_body(text: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}");
    let start = text.to_ascii_uppercase().find(&open.to_ascii_uppercase())?;
    let content_start = text[start..].find('>')? + start + 1;
    let close = format!("</{tag}>");
    let end = text[content_start..].to_ascii_uppercase().find(&close.to_ascii_uppercase())? + content_start;
    Some(text[content_start..end].to_string())
}

fn parse_css_classes(css: &str) -> Vec<Style> {
    let mut styles = Vec::new();
    let mut rest = css;
    while let Some(dot) = rest.find('.') {
        let after_dot = &rest[dot + 1..];
        let Some(brace) = after_dot.find('{') else { break };
        let name = after_dot[..brace].trim().to_string();
        let Some(close) = after_dot.find('}') else { break };
        let body = &after_dot[brace + 1..close];
        let mut style = Style::named(name);
        for decl in body.split(';') {
            if let Some((prop, value)) = decl.split_once(':') {
                match prop.trim().to_ascii_lowercase().as_str() {
                    "color" => {
                        if let Some(c) = AbgrColor::parse_css(value.trim()) {
                            style.primary_color = c;
                        }
                    }
                    "font-family" => style.font_name = value.trim().to_string(),
                    "font-size" => style.font_size = value.trim().trim_end_matches("pt").parse().unwrap_or(20.0),
                    _ => {}
                }
            }
        }
        styles.push(style);
        rest = &after_dot[close + 1..];
    }
    styles
}

fn find_tag_positions(text: &str, tag: &str) -> Vec<usize> {
    let upper = text.to_ascii_uppercase();
    let tag_upper = tag.to_ascii_uppercase();
    let mut positions = Vec::new();
    let mut i = 0;
    while let Some(pos) = upper[i..].find(&tag_upper) {
        positions.push(i + pos);
        i += pos + tag_upper.len();
    }
    positions
}

fn extract_attr_ms(tag: &str, attr: &str) -> Option<i64> {
    let upper = tag.to_ascii_uppercase();
    let idx = upper.find(&attr.to_ascii_uppercase())?;
    let rest = &tag[idx + attr.len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

fn strip_p_tag(body: &str) -> String {
    let upper = body.to_ascii_uppercase();
    if let Some(p_start) = upper.find("<P") {
        if let Some(gt) = body[p_start..].find('>') {
            let inner_start = p_start + gt + 1;
            let inner = &body[inner_start..];
            let end = upper[inner_start..].find("</P").map(|p| inner_start + p).unwrap_or(body.len());
            return body[inner_start..end.min(body.len())].to_string();
        }
    }
    body.to_string()
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

pub fn serialize(doc: &Document, _opts: &SerializeOptions) -> String {
    let mut out = String::from("<SAMI>\n<HEAD>\n<STYLE TYPE=\"text/css\">\n<!--\n");
    for style in doc.styles.iter() {
        out.push_str(&format!(
            ".{} {{ Color: {}; font-family: {}; font-size: {}pt; }}\n",
            style.name,
            format_css_color(style.primary_color),
            style.font_name,
            style.font_size as i64
        ));
    }
    out.push_str("-->\n</STYLE>\n</HEAD>\n<BODY>\n");
    for event in &doc.events {
        out.push_str(&format!("<SYNC Start={}>\n<P Class={}>", event.start_ms, event.style));
        if event.dirty {
            out.push_str(&serialize_html_tags(&event.segments));
        } else {
            out.push_str(&event.text);
        }
        out.push('\n');
    }
    out.push_str("</BODY>\n</SAMI>\n");
    out
}

fn format_css_color(c: AbgrColor) -> String {
    format!("#{:02X}{:02X}{:02X}", c.r(), c.g(), c.b())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sync_and_closes_on_next_sync() {
        let input = "<SAMI><BODY><SYNC Start=1000><P Class=ENCC>First<SYNC Start=3000><P Class=ENCC>Second</BODY></SAMI>";
        let result = parse(input.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(result.document.events.len(), 2);
        assert_eq!(result.document.events[0].start_ms, 1000);
        assert_eq!(result.document.events[0].end_ms, 3000);
        assert_eq!(result.document.events[0].text, "First");
    }

    #[test]
    fn nbsp_body_emits_no_event() {
        let input = "<SAMI><BODY><SYNC Start=1000><P Class=ENCC>&nbsp;<SYNC Start=2000><P Class=ENCC>Text</BODY></SAMI>";
        let result = parse(input.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(result.document.events.len(), 1);
        assert_eq!(result.document.events[0].text, "Text");
    }

    #[test]
    fn style_classes_become_styles() {
        let input = "<SAMI><HEAD><STYLE TYPE=\"text/css\">.ENCC { color: #FF0000; } </STYLE></HEAD><BODY></BODY></SAMI>";
        let result = parse(input.as_bytes(), &ParseOptions::default()).unwrap();
        assert!(result.document.styles.contains("ENCC"));
    }
}
