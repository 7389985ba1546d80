//! CaptionMAX CAP: `$`-prefixed header lines, then
//! `HH:MM:SS:FF\tHH:MM:SS:FF\n<text>\n\n` entries (spec.md §4.3.11).

use crate::codecs::{handle_error, ParseOptions, ParseResult, SerializeOptions};
use crate::error::{ErrorCode, SubforgeError, Warning};
use crate::model::{Document, Event};
use crate::primitives::encoding::decode;
use crate::primitives::timecode::{format_frame_timecode, parse_frame_timecode};

pub fn parse(bytes: &[u8], opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
    let text = decode(bytes, opts.encoding);
    let mut doc = Document::new();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let mut fps = 25.0;
    let mut fps_was_defaulted = true;
    let mut body_start = 0usize;
    let lines: Vec<&str> = text.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        if let Some(rest) = line.strip_prefix("$VideoStandard") {
            let standard = rest.trim();
            fps = if standard.eq_ignore_ascii_case("NTSC") { 29.97 } else { 25.0 };
            fps_was_defaulted = false;
        }
        if !line.trim_start().starts_with('$') {
            body_start = i;
            break;
        }
    }
    if fps_was_defaulted {
        tracing::warn!("$VideoStandard not found, fps defaulted to 25 (PAL)");
        warnings.push(Warning::new(1, "fps defaulted to 25 (PAL); $VideoStandard not found"));
    }

    let body = lines[body_start..].join("\n");
    let mut line_no = body_start + 1;
    for block in body.split("\n\n") {
        let block = block.trim();
        let start_line = line_no;
        line_no += block.lines().count() + 1;
        if block.is_empty() {
            continue;
        }
        let mut block_lines = block.lines();
        let Some(timing) = block_lines.next() else { continue };
        let Some((start_str, end_str)) = timing.split_once('\t').or_else(|| timing.split_once("  ")) else {
            let err = SubforgeError::at_line(ErrorCode::MalformedEvent, start_line, "missing timing separator");
            handle_error(opts, &mut errors, err)?;
            continue;
        };
        let (Some(start_ms), Some(end_ms)) = (
            parse_frame_timecode(start_str.trim(), fps),
            parse_frame_timecode(end_str.trim(), fps),
        ) else {
            let err = SubforgeError::at_line(ErrorCode::InvalidTimestamp, start_line, "malformed CAP timecode");
            handle_error(opts, &mut errors, err)?;
            continue;
        };
        let body_text = block_lines.collect::<Vec<_>>().join("\n");
        doc.add_event(Event::new(0, start_ms, end_ms, body_text));
    }

    let mut result = ParseResult::ok(doc);
    result.errors = errors;
    result.warnings = warnings;
    Ok(result)
}

pub fn serialize(doc: &Document, opts: &SerializeOptions) -> String {
    let fps = opts.fps.unwrap_or(25.0);
    let standard = if (fps - 29.97).abs() < 0.01 { "NTSC" } else { "PAL" };
    let mut out = format!("$CaptionMAX\n$VideoStandard {standard}\n\n");
    for event in &doc.events {
        out.push_str(&format_frame_timecode(event.start_ms, fps));
        out.push('\t');
        out.push_str(&format_frame_timecode(event.end_ms, fps));
        out.push('\n');
        out.push_str(&event.text);
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_d_cap_ntsc_frames() {
        let input = "$CaptionMAX\n$VideoStandard NTSC\n\n00:00:01:15\t00:00:02:00\nHello\n\n";
        let result = parse(input.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(result.document.events.len(), 1);
        assert_eq!(result.document.events[0].start_ms, 1501);
        assert_eq!(result.document.events[0].end_ms, 2000);
    }

    #[test]
    fn defaults_to_pal_with_warning_when_standard_missing() {
        let input = "$CaptionMAX\n\n00:00:01:00\t00:00:02:00\nHi\n\n";
        let result = parse(input.as_bytes(), &ParseOptions::default()).unwrap();
        assert!(!result.warnings.is_empty());
        assert_eq!(result.document.events[0].start_ms, 1000);
    }

    #[test]
    fn serialize_then_parse_round_trips_ntsc_event() {
        let mut doc = Document::new();
        doc.add_event(Event::new(0, 1501, 2000, "Hello".to_string()));

        let opts = SerializeOptions { fps: Some(29.97), ..SerializeOptions::default() };
        let out = serialize(&doc, &opts);
        let result = parse(out.as_bytes(), &ParseOptions::default()).unwrap();

        assert_eq!(result.document.events.len(), 1);
        assert_eq!(result.document.events[0].start_ms, 1501);
        assert_eq!(result.document.events[0].end_ms, 2000);
        assert_eq!(result.document.events[0].text, "Hello");
    }
}
