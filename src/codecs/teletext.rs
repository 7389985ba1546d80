//! Teletext (Level 1, subtitle pages): 40-byte, odd-parity-checked rows
//! decoded with the Latin G0 teletext character set. Teletext streams carry
//! no event-local timing of their own, so callers must supply one PTS per
//! page via `page_timing`; without it parsing fails with `MISSING_FIELD`
//! rather than guessing (spec.md §4.3.18, §9 Open Question 2).

use crate::codecs::{handle_error, ParseOptions, ParseResult, SerializeOptions};
use crate::error::{ErrorCode, SubforgeError};
use crate::model::{Document, Event};

const ROW_LEN: usize = 40;
const ROWS_PER_PAGE: usize = 24;
const PAGE_LEN: usize = ROW_LEN * ROWS_PER_PAGE;

/// One subtitle page's presentation window, in milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct PageTiming {
    pub start_ms: i64,
    pub end_ms: i64,
}

pub fn parse(
    bytes: &[u8],
    opts: &ParseOptions,
    page_timing: Option<&[PageTiming]>,
) -> Result<ParseResult, SubforgeError> {
    let Some(page_timing) = page_timing else {
        return Err(SubforgeError::new(
            ErrorCode::MissingField,
            "teletext streams require an externally supplied page timing map",
        ));
    };

    let mut doc = Document::new();
    let mut errors = Vec::new();
    let pages = bytes.chunks(PAGE_LEN);
    for (i, page) in pages.enumerate() {
        if page.len() < PAGE_LEN {
            let err = SubforgeError::new(ErrorCode::MalformedEvent, "truncated teletext page");
            handle_error(opts, &mut errors, err)?;
            continue;
        }
        let Some(timing) = page_timing.get(i) else {
            let err = SubforgeError::new(ErrorCode::MissingField, "no timing entry for teletext page");
            handle_error(opts, &mut errors, err)?;
            continue;
        };

        let mut lines = Vec::new();
        for row in page.chunks(ROW_LEN) {
            let decoded = decode_row(row);
            if !decoded.trim().is_empty() {
                lines.push(decoded.trim_end().to_string());
            }
        }
        if lines.is_empty() {
            continue;
        }
        doc.add_event(Event::new(0, timing.start_ms, timing.end_ms, lines.join("\n")));
    }

    let mut result = ParseResult::ok(doc);
    result.errors = errors;
    Ok(result)
}

fn decode_row(row: &[u8]) -> String {
    let mut out = String::new();
    for &byte in row {
        let ch = strip_parity(byte);
        out.push(g0_char(ch));
    }
    out
}

fn strip_parity(byte: u8) -> u8 {
    byte & 0x7F
}

/// Maps the teletext Latin G0 set's national-option-free positions; the
/// handful of codes teletext diverges from ASCII on are remapped, everything
/// else passes through.
fn g0_char(code: u8) -> char {
    match code {
        0x23 => '\u{00A3}', // £
        0x24 => '$',
        0x5F => '#',
        0x60 => '\u{2014}',
        0x20..=0x7E => code as char,
        _ => ' ',
    }
}

pub fn serialize(doc: &Document, _opts: &SerializeOptions) -> Vec<u8> {
    let mut out = Vec::new();
    for event in &doc.events {
        let mut page = vec![b' '; PAGE_LEN];
        for (row_idx, line) in event.effective_text().lines().take(ROWS_PER_PAGE).enumerate() {
            let row_start = row_idx * ROW_LEN;
            for (col, ch) in line.chars().take(ROW_LEN).enumerate() {
                page[row_start + col] = reverse_g0(ch);
            }
        }
        out.extend(page);
    }
    out
}

fn reverse_g0(ch: char) -> u8 {
    match ch {
        '\u{00A3}' => 0x23,
        '\u{2014}' => 0x60,
        '#' => 0x5F,
        c if c.is_ascii() => c as u8,
        _ => b'?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_page() -> Vec<u8> {
        let mut page = vec![b' '; PAGE_LEN];
        let text = b"Hello";
        page[..text.len()].copy_from_slice(text);
        page
    }

    #[test]
    fn missing_timing_map_is_missing_field() {
        let page = sample_page();
        let err = parse(&page, &ParseOptions::default(), None).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);
    }

    #[test]
    fn decodes_first_row_with_supplied_timing() {
        let page = sample_page();
        let timing = [PageTiming { start_ms: 1000, end_ms: 4000 }];
        let result = parse(&page, &ParseOptions::default(), Some(&timing)).unwrap();
        assert_eq!(result.document.events.len(), 1);
        assert_eq!(result.document.events[0].text, "Hello");
        assert_eq!(result.document.events[0].start_ms, 1000);
    }

    #[test]
    fn truncated_page_is_malformed_event() {
        let page = vec![b' '; 10];
        let err = parse(&page, &ParseOptions::default(), Some(&[])).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedEvent);
    }

    #[test]
    fn serialize_then_parse_round_trips_special_characters() {
        let mut doc = Document::new();
        doc.add_event(Event::new(0, 1000, 4000, "£5 #1 caf\u{2014}".to_string()));

        let bytes = serialize(&doc, &SerializeOptions::default());
        let timing = [PageTiming { start_ms: 1000, end_ms: 4000 }];
        let result = parse(&bytes, &ParseOptions::default(), Some(&timing)).unwrap();

        assert_eq!(result.document.events.len(), 1);
        assert_eq!(result.document.events[0].text, "£5 #1 caf\u{2014}");
    }
}
