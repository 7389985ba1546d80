//! MicroDVD: `{startFrame}{endFrame}<text>` per line, `fps`-driven
//! frame/millisecond conversion (spec.md §4.3.5).

use crate::codecs::{handle_error, ParseOptions, ParseResult, SerializeOptions};
use crate::error::{ErrorCode, SubforgeError};
use crate::model::{Document, Event};
use crate::primitives::encoding::decode;
use crate::primitives::timecode::{frame_to_ms, ms_to_frame};
use crate::tags::microdvd::{parse_microdvd_tags, serialize_microdvd_tags};

pub fn parse(bytes: &[u8], opts: &ParseOptions, fps: f64) -> Result<ParseResult, SubforgeError> {
    let text = decode(bytes, opts.encoding);
    let mut doc = Document::new();
    let mut errors = Vec::new();

    for (i, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let Some(rest) = line.strip_prefix('{') else {
            let err = SubforgeError::at_line(ErrorCode::MalformedEvent, i + 1, "expected '{startFrame}'");
            handle_error(opts, &mut errors, err)?;
            continue;
        };
        let Some(end1) = rest.find('}') else {
            let err = SubforgeError::at_line(ErrorCode::MalformedEvent, i + 1, "unterminated frame field");
            handle_error(opts, &mut errors, err)?;
            continue;
        };
        let start_frame: i64 = match rest[..end1].parse() {
            Ok(f) => f,
            Err(_) => {
                let err = SubforgeError::at_line(ErrorCode::InvalidTimestamp, i + 1, "non-numeric start frame");
                handle_error(opts, &mut errors, err)?;
                continue;
            }
        };
        let rest2 = &rest[end1 + 1..];
        let Some(rest2) = rest2.strip_prefix('{') else {
            let err = SubforgeError::at_line(ErrorCode::MalformedEvent, i + 1, "expected '{endFrame}'");
            handle_error(opts, &mut errors, err)?;
            continue;
        };
        let Some(end2) = rest2.find('}') else {
            let err = SubforgeError::at_line(ErrorCode::MalformedEvent, i + 1, "unterminated frame field");
            handle_error(opts, &mut errors, err)?;
            continue;
        };
        let end_frame: i64 = match rest2[..end2].parse() {
            Ok(f) => f,
            Err(_) => {
                let err = SubforgeError::at_line(ErrorCode::InvalidTimestamp, i + 1, "non-numeric end frame");
                handle_error(opts, &mut errors, err)?;
                continue;
            }
        };
        let body = &rest2[end2 + 1..];

        let mut event = Event::new(0, frame_to_ms(start_frame, fps), frame_to_ms(end_frame, fps), body.replace('|', "\n"));
        let segments = parse_microdvd_tags(body);
        if segments.len() > 1 || segments.first().map(|s| s.style.is_some()).unwrap_or(false) {
            event.set_segments(segments);
        }
        doc.add_event(event);
    }

    let mut result = ParseResult::ok(doc);
    result.errors = errors;
    Ok(result)
}

pub fn serialize(doc: &Document, opts: &SerializeOptions) -> String {
    let fps = opts.fps.unwrap_or(25.0);
    let mut out = String::new();
    for event in &doc.events {
        out.push('{');
        out.push_str(&ms_to_frame(event.start_ms, fps).to_string());
        out.push('}');
        out.push('{');
        out.push_str(&ms_to_frame(event.end_ms, fps).to_string());
        out.push('}');
        if event.dirty {
            out.push_str(&serialize_microdvd_tags(&event.segments));
        } else {
            out.push_str(&event.text.replace('\n', "|"));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_frame_based_timing() {
        let input = "{0}{30}Hello|world";
        let result = parse(input.as_bytes(), &ParseOptions::default(), 30.0).unwrap();
        assert_eq!(result.document.events.len(), 1);
        assert_eq!(result.document.events[0].start_ms, 0);
        assert_eq!(result.document.events[0].end_ms, 1000);
        assert_eq!(result.document.events[0].text, "Hello\nworld");
    }

    #[test]
    fn inline_tags_produce_dirty_segments() {
        let input = "{0}{30}{y:b}Bold text";
        let result = parse(input.as_bytes(), &ParseOptions::default(), 30.0).unwrap();
        assert!(result.document.events[0].dirty);
        assert_eq!(result.document.events[0].segments[0].style.as_ref().unwrap().bold, Some(true));
    }

    #[test]
    fn round_trip_preserves_frames() {
        let input = "{0}{30}Hello\n{60}{90}Bye\n";
        let parsed = parse(input.as_bytes(), &ParseOptions::default(), 30.0).unwrap();
        let out = serialize(&parsed.document, &SerializeOptions { fps: Some(30.0), ..Default::default() });
        let reparsed = parse(out.as_bytes(), &ParseOptions::default(), 30.0).unwrap();
        assert_eq!(reparsed.document.events.len(), 2);
        assert_eq!(reparsed.document.events[1].start_ms, 2000);
    }
}
