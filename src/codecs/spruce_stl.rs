//! Spruce STL (text flavor): `HH:MM:SS:FF , HH:MM:SS:FF , <text>` per line
//! (spec.md §4.3.12).

use crate::codecs::{handle_error, ParseOptions, ParseResult, SerializeOptions};
use crate::error::{ErrorCode, SubforgeError};
use crate::model::{Document, Event};
use crate::primitives::encoding::decode;
use crate::primitives::timecode::{format_frame_timecode, parse_frame_timecode};

pub fn parse(bytes: &[u8], opts: &ParseOptions, frame_rate: f64) -> Result<ParseResult, SubforgeError> {
    let text = decode(bytes, opts.encoding);
    let mut doc = Document::new();
    let mut errors = Vec::new();

    for (i, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.splitn(3, ',').map(str::trim).collect();
        if parts.len() != 3 {
            let err = SubforgeError::at_line(ErrorCode::MalformedEvent, i + 1, "expected 3 comma-separated fields");
            handle_error(opts, &mut errors, err)?;
            continue;
        }
        let (Some(start_ms), Some(end_ms)) =
            (parse_frame_timecode(parts[0], frame_rate), parse_frame_timecode(parts[1], frame_rate))
        else {
            let err = SubforgeError::at_line(ErrorCode::InvalidTimestamp, i + 1, "malformed Spruce STL timecode");
            handle_error(opts, &mut errors, err)?;
            continue;
        };
        doc.add_event(Event::new(0, start_ms, end_ms, parts[2].replace('|', "\n")));
    }

    let mut result = ParseResult::ok(doc);
    result.errors = errors;
    Ok(result)
}

pub fn serialize(doc: &Document, opts: &SerializeOptions) -> String {
    let fps = opts.fps.unwrap_or(25.0);
    let mut out = String::new();
    for event in &doc.events {
        out.push_str(&format_frame_timecode(event.start_ms, fps));
        out.push_str(" , ");
        out.push_str(&format_frame_timecode(event.end_ms, fps));
        out.push_str(" , ");
        out.push_str(&event.text.replace('\n', "|"));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_delimited_line() {
        let input = "00:00:01:00 , 00:00:05:00 , Hello|world\n";
        let result = parse(input.as_bytes(), &ParseOptions::default(), 25.0).unwrap();
        assert_eq!(result.document.events.len(), 1);
        assert_eq!(result.document.events[0].text, "Hello\nworld");
    }

    #[test]
    fn round_trips_via_serialize() {
        let input = "00:00:01:00 , 00:00:05:00 , Hi\n";
        let parsed = parse(input.as_bytes(), &ParseOptions::default(), 25.0).unwrap();
        let out = serialize(&parsed.document, &SerializeOptions { fps: Some(25.0), ..Default::default() });
        let reparsed = parse(out.as_bytes(), &ParseOptions::default(), 25.0).unwrap();
        assert_eq!(reparsed.document.events[0].start_ms, 1000);
    }
}
