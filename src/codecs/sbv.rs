//! YouTube SBV: `H:MM:SS.mmm,H:MM:SS.mmm\n<text>\n\n`, no index line
//! (spec.md §4.3.4).

use crate::codecs::{handle_error, ParseOptions, ParseResult, SerializeOptions};
use crate::error::{ErrorCode, SubforgeError};
use crate::model::{Document, Event};
use crate::primitives::encoding::decode;
use crate::primitives::timecode::{format_sbv, parse_sbv};

pub fn parse(bytes: &[u8], opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
    let text = decode(bytes, opts.encoding);
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut doc = Document::new();
    let mut errors = Vec::new();

    let mut line_no = 1;
    for block in normalized.split("\n\n") {
        let block = block.trim();
        let start_line = line_no;
        line_no += block.lines().count() + 1;
        if block.is_empty() {
            continue;
        }
        let mut lines = block.lines();
        let Some(timing) = lines.next() else { continue };
        let Some((start_str, end_str)) = timing.split_once(',') else {
            let err = SubforgeError::at_line(ErrorCode::MalformedEvent, start_line, "missing ',' timing separator");
            handle_error(opts, &mut errors, err)?;
            continue;
        };
        let (Some(start_ms), Some(end_ms)) = (parse_sbv(start_str), parse_sbv(end_str)) else {
            let err = SubforgeError::at_line(ErrorCode::InvalidTimestamp, start_line, "malformed SBV timestamp");
            handle_error(opts, &mut errors, err)?;
            continue;
        };
        let text = lines.collect::<Vec<_>>().join("\n");
        doc.add_event(Event::new(0, start_ms, end_ms, text));
    }

    let mut result = ParseResult::ok(doc);
    result.errors = errors;
    Ok(result)
}

pub fn serialize(doc: &Document, _opts: &SerializeOptions) -> String {
    let mut out = String::new();
    for event in &doc.events {
        out.push_str(&format_sbv(event.start_ms));
        out.push(',');
        out.push_str(&format_sbv(event.end_ms));
        out.push('\n');
        out.push_str(&event.text);
        out.push_str("\n\n");
    }
    out
}
