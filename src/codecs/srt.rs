//! SubRip (SRT): blank-line-separated `<index>\n<start> --> <end>\n<text>`
//! blocks (spec.md §4.3.2).

use crate::codecs::{handle_error, ParseOptions, ParseResult, SerializeOptions};
use crate::error::{ErrorCode, SubforgeError};
use crate::model::{Document, Event};
use crate::primitives::encoding::decode;
use crate::primitives::timecode::{format_srt, parse_srt};
use crate::tags::html::{parse_html_tags, serialize_html_tags};

pub fn parse(bytes: &[u8], opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
    let text = decode(bytes, opts.encoding);
    let mut doc = Document::new();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut line_no = 1usize;
    for block in split_blocks(&normalized) {
        let block_start_line = line_no;
        line_no += block.lines().count() + 1;
        let mut lines = block.lines();
        let mut first = match lines.next() {
            Some(l) => l,
            None => continue,
        };

        // Index line is optional and only consumed if purely digits.
        if first.trim().chars().all(|c| c.is_ascii_digit()) && !first.trim().is_empty() {
            first = match lines.next() {
                Some(l) => l,
                None => {
                    let err = SubforgeError::at_line(
                        ErrorCode::MalformedEvent,
                        block_start_line,
                        "block has an index line but no timing line",
                    );
                    handle_error(opts, &mut errors, err)?;
                    continue;
                }
            };
        }

        let Some((start_str, end_str)) = first.split_once("-->") else {
            let err = SubforgeError::at_line(ErrorCode::MalformedEvent, block_start_line, "missing --> timing line")
                .with_raw(first.to_string());
            handle_error(opts, &mut errors, err)?;
            continue;
        };
        let (Some(start_ms), Some(end_ms)) = (
            parse_srt(start_str.trim()),
            parse_srt(end_str.split_whitespace().next().unwrap_or("")),
        ) else {
            let err = SubforgeError::at_line(ErrorCode::InvalidTimestamp, block_start_line, "malformed SRT timestamp")
                .with_raw(first.to_string());
            handle_error(opts, &mut errors, err)?;
            continue;
        };

        let text_lines: Vec<&str> = lines.collect();
        let text = text_lines.join("\n").trim().to_string();

        let mut event = Event::new(0, start_ms, end_ms, text);
        event.style = "Default".to_string();
        doc.add_event(event);
    }

    let mut result = ParseResult::ok(doc);
    result.errors = errors;
    result.warnings = warnings;
    Ok(result)
}

fn split_blocks(text: &str) -> Vec<&str> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .collect()
}

pub fn serialize(doc: &Document, _opts: &SerializeOptions) -> String {
    let mut out = String::new();
    for (i, event) in doc.events.iter().enumerate() {
        out.push_str(&(i + 1).to_string());
        out.push('\n');
        out.push_str(&format_srt(event.start_ms));
        out.push_str(" --> ");
        out.push_str(&format_srt(event.end_ms));
        out.push('\n');
        if event.dirty {
            out.push_str(&serialize_html_tags(&event.segments));
        } else {
            out.push_str(&event.text);
        }
        out.push_str("\n\n");
    }
    out
}

/// Lazily parse an event's `text` into HTML-like segments (serializers to
/// other formats call this on demand; SRT's own round-trip never needs it).
pub fn lazy_segments(event_text: &str) -> Vec<crate::model::TextSegment> {
    parse_html_tags(event_text, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_a_srt_basic() {
        let input = "1\n00:00:01,000 --> 00:00:05,000\nHello world\n\n2\n00:00:06,000 --> 00:00:10,000\nGoodbye world\n";
        let opts = ParseOptions::default();
        let result = parse(input.as_bytes(), &opts).unwrap();
        assert_eq!(result.document.events.len(), 2);
        assert_eq!(result.document.events[0].start_ms, 1000);
        assert_eq!(result.document.events[0].end_ms, 5000);
        assert_eq!(result.document.events[0].text, "Hello world");
        assert_eq!(result.document.events[0].style, "Default");
        assert_eq!(result.document.events[1].start_ms, 6000);
    }

    #[test]
    fn tolerates_missing_index_line() {
        let input = "00:00:01,000 --> 00:00:02,000\nNo index\n";
        let result = parse(input.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(result.document.events.len(), 1);
        assert_eq!(result.document.events[0].text, "No index");
    }

    #[test]
    fn round_trip_preserves_count_and_text() {
        let input = "1\n00:00:01,000 --> 00:00:05,000\nHello\n\n2\n00:00:06,000 --> 00:00:10,000\nBye\n";
        let parsed = parse(input.as_bytes(), &ParseOptions::default()).unwrap();
        let serialized = serialize(&parsed.document, &SerializeOptions::default());
        let reparsed = parse(serialized.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(reparsed.document.events.len(), 2);
        assert_eq!(reparsed.document.events[0].text, "Hello");
        assert_eq!(reparsed.document.events[0].start_ms, 1000);
    }

    #[test]
    fn crlf_line_endings_accepted() {
        let input = "1\r\n00:00:01,000 --> 00:00:02,000\r\nHi\r\n\r\n";
        let result = parse(input.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(result.document.events.len(), 1);
        assert_eq!(result.document.events[0].text, "Hi");
    }
}
