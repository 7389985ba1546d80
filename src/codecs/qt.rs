//! QuickTime Text: plain-text cues separated by `[timestamp]` markers in
//! `HH:MM:SS.mmm` form, one marker per cue start.

use crate::codecs::{ParseOptions, ParseResult, SerializeOptions};
use crate::error::SubforgeError;
use crate::model::{Document, Event};
use crate::primitives::encoding::decode;
use crate::primitives::timecode::{format_srt, parse_srt};

pub fn parse(bytes: &[u8], opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
    let text = decode(bytes, opts.encoding);
    let mut doc = Document::new();

    let mut positions = Vec::new();
    let mut i = 0;
    let bytes_t = text.as_bytes();
    while i < bytes_t.len() {
        if bytes_t[i] == b'[' {
            if let Some(end) = text[i..].find(']') {
                let inner = &text[i + 1..i + end];
                if let Some(ms) = parse_qt_timestamp(inner) {
                    positions.push((i, i + end + 1, ms));
                }
                i += end + 1;
                continue;
            }
        }
        i += 1;
    }

    for (idx, &(_, body_start, start_ms)) in positions.iter().enumerate() {
        let body_end = positions.get(idx + 1).map(|p| p.0).unwrap_or(text.len());
        let body = text[body_start..body_end].trim();
        if body.is_empty() {
            continue;
        }
        doc.add_event(Event::new(0, start_ms, start_ms, body.to_string()));
    }

    let starts: Vec<i64> = doc.events.iter().map(|e| e.start_ms).collect();
    for i in 0..doc.events.len() {
        doc.events[i].end_ms = starts.get(i + 1).copied().unwrap_or(doc.events[i].start_ms + 3000);
    }

    Ok(ParseResult::ok(doc))
}

fn parse_qt_timestamp(s: &str) -> Option<i64> {
    parse_srt(&s.replace('.', ","))
}

pub fn serialize(doc: &Document, _opts: &SerializeOptions) -> String {
    let mut out = String::new();
    for event in &doc.events {
        out.push('[');
        out.push_str(&format_srt(event.start_ms).replace(',', "."));
        out.push_str("]\n");
        out.push_str(&event.text);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracketed_timestamps_mark_cue_starts() {
        let input = "[00:00:01.000]\nHello\n[00:00:04.000]\nWorld\n";
        let result = parse(input.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(result.document.events.len(), 2);
        assert_eq!(result.document.events[0].start_ms, 1000);
        assert_eq!(result.document.events[0].end_ms, 4000);
        assert_eq!(result.document.events[1].text, "World");
    }
}
