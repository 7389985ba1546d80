//! RealText (.rt): XML-ish, `<window>` required, `<time begin="...">` opens
//! a cue running until the next `<time>` or `<clear/>` (spec.md §4.3.8).

use crate::codecs::{ParseOptions, ParseResult, SerializeOptions};
use crate::error::{ErrorCode, SubforgeError};
use crate::model::{Document, Event};
use crate::primitives::encoding::decode;
use crate::primitives::timecode::{format_realtext, parse_realtext};

pub fn parse(bytes: &[u8], opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
    let text = decode(bytes, opts.encoding);
    if !text.to_ascii_lowercase().contains("<window") {
        return Err(SubforgeError::at_line(ErrorCode::InvalidFormat, 1, "missing <window> element"));
    }
    let mut doc = Document::new();

    let lower = text.to_ascii_lowercase();
    let mut time_positions: Vec<usize> = Vec::new();
    let mut i = 0;
    while let Some(p) = lower[i..].find("<time") {
        time_positions.push(i + p);
        i += p + 5;
    }

    for (idx, &pos) in time_positions.iter().enumerate() {
        let Some(tag_end) = text[pos..].find('>').map(|p| pos + p + 1) else { continue };
        let start_ms = extract_begin(&text[pos..tag_end]).unwrap_or(0);

        let body_end = time_positions.get(idx + 1).copied().unwrap_or(text.len());
        let mut body = &text[tag_end..body_end];
        if let Some(clear) = lower[tag_end..body_end].find("<clear") {
            body = &text[tag_end..tag_end + clear];
        }
        let rendered = body.replace("<br/>", "\n").replace("<br>", "\n").replace("<BR/>", "\n");
        let trimmed = rendered.trim();
        if trimmed.is_empty() {
            continue;
        }
        doc.add_event(Event::new(0, start_ms, start_ms, trimmed.to_string()));
    }

    let starts: Vec<i64> = doc.events.iter().map(|e| e.start_ms).collect();
    for i in 0..doc.events.len() {
        doc.events[i].end_ms = starts.get(i + 1).copied().unwrap_or(doc.events[i].start_ms + 4000);
    }

    Ok(ParseResult::ok(doc))
}

fn extract_begin(tag: &str) -> Option<i64> {
    let lower = tag.to_ascii_lowercase();
    let idx = lower.find("begin")?;
    let rest = &tag[idx + 5..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next()?;
    let rest = if quote == '"' || quote == '\'' { &rest[1..] } else { rest };
    let end = rest.find(['"', '\'']).unwrap_or(rest.len());
    parse_realtext(&rest[..end])
}

pub fn serialize(doc: &Document, _opts: &SerializeOptions) -> String {
    let mut out = String::from("<window duration=\"1:00:00.00\" bgcolor=\"black\">\n");
    for event in &doc.events {
        out.push_str(&format!("<time begin=\"{}\"/>", format_realtext(event.start_ms)));
        out.push_str(&event.text.replace('\n', "<br/>"));
        out.push('\n');
    }
    out.push_str("</window>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_window_element() {
        let err = parse(b"<time begin=\"0:00:01.00\"/>Hi", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
    }

    #[test]
    fn cue_runs_until_next_time() {
        let input = "<window>\n<time begin=\"0:00:01.00\"/>First<time begin=\"0:00:03.00\"/>Second\n</window>";
        let result = parse(input.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(result.document.events.len(), 2);
        assert_eq!(result.document.events[0].end_ms, 3000);
    }

    #[test]
    fn br_tag_becomes_newline() {
        let input = "<window><time begin=\"0:00:01.00\"/>line1<br/>line2</window>";
        let result = parse(input.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(result.document.events[0].text, "line1\nline2");
    }
}
