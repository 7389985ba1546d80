//! PAC: 24-byte header, then per-subtitle BCD start/end timecodes, a
//! vertical-position byte, a 16-bit big-endian text length and Latin-1 text
//! carrying italic/underline/color control bytes (spec.md §4.3.13).

use crate::binary::bcd::{decode_bcd_timecode, encode_bcd_timecode};
use crate::codecs::{ParseOptions, ParseResult, SerializeOptions};
use crate::error::{ErrorCode, SubforgeError};
use crate::model::{Document, Event};

const HEADER_LEN: usize = 24;

pub fn parse(bytes: &[u8], _opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
    if bytes.len() < HEADER_LEN {
        return Err(SubforgeError::new(ErrorCode::InvalidFormat, "input shorter than the PAC header"));
    }
    let fps = if bytes[4] == 1 { 29.97 } else { 25.0 };

    let mut doc = Document::new();
    let mut offset = HEADER_LEN;
    while offset + 11 <= bytes.len() {
        let start_tc: [u8; 4] = bytes[offset..offset + 4].try_into().unwrap();
        let end_tc: [u8; 4] = bytes[offset + 4..offset + 8].try_into().unwrap();
        let _vpos = bytes[offset + 8];
        let text_len = u16::from_be_bytes([bytes[offset + 9], bytes[offset + 10]]) as usize;
        let text_start = offset + 11;
        if text_start + text_len > bytes.len() {
            break;
        }
        let text_bytes = &bytes[text_start..text_start + text_len];
        let text = decode_pac_text(text_bytes);

        let start_ms = decode_bcd_timecode(start_tc, fps);
        let end_ms = decode_bcd_timecode(end_tc, fps);
        doc.add_event(Event::new(0, start_ms, end_ms, text));

        offset = text_start + text_len;
    }

    Ok(ParseResult::ok(doc))
}

fn decode_pac_text(bytes: &[u8]) -> String {
    let mut out = String::new();
    for &b in bytes {
        match b {
            0x0A | 0x0B | 0x0C | 0x0D => {} // italic/underline toggles, dropped from plain text
            0xE0..=0xEF => {}               // color escapes
            0x20..=0xFF => out.push(b as char),
            _ => {}
        }
    }
    out
}

fn encode_pac_text(text: &str) -> Vec<u8> {
    text.chars().map(|c| if c.is_ascii() { c as u8 } else { b'?' }).collect()
}

pub fn serialize(doc: &Document, opts: &SerializeOptions) -> Vec<u8> {
    let fps = opts.fps.unwrap_or(25.0);
    let mut out = vec![0u8; HEADER_LEN];
    out[0] = 1;
    out[4] = if (fps - 29.97).abs() < 0.01 { 1 } else { 0 };

    for event in &doc.events {
        out.extend_from_slice(&encode_bcd_timecode(event.start_ms, fps));
        out.extend_from_slice(&encode_bcd_timecode(event.end_ms, fps));
        out.push(20);
        let text_bytes = encode_pac_text(&event.effective_text());
        out.extend_from_slice(&(text_bytes.len() as u16).to_be_bytes());
        out.extend_from_slice(&text_bytes);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_sample() -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_LEN];
        bytes[0] = 1;
        bytes[4] = 0; // PAL
        bytes.extend_from_slice(&encode_bcd_timecode(1000, 25.0));
        bytes.extend_from_slice(&encode_bcd_timecode(5000, 25.0));
        bytes.push(20);
        let text = b"Hello";
        bytes.extend_from_slice(&(text.len() as u16).to_be_bytes());
        bytes.extend_from_slice(text);
        bytes
    }

    #[test]
    fn parses_single_entry() {
        let bytes = build_sample();
        let result = parse(&bytes, &ParseOptions::default()).unwrap();
        assert_eq!(result.document.events.len(), 1);
        assert_eq!(result.document.events[0].start_ms, 1000);
        assert_eq!(result.document.events[0].text, "Hello");
    }

    #[test]
    fn too_short_input_is_invalid_format() {
        let err = parse(&[0u8; 5], &ParseOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
    }
}
