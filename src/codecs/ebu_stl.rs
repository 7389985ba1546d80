//! EBU-STL binary codec: parses the GSI block + TTI records into events,
//! and serializes the reverse (spec.md §4.3.12).

use crate::binary::bcd::{decode_bcd_timecode, encode_bcd_timecode};
use crate::binary::ebu_stl::{decode_text, encode_text, format_tti, parse_gsi, parse_tti, TtiRecord, GSI_BLOCK_LEN};
use crate::codecs::{ParseOptions, ParseResult, SerializeOptions};
use crate::error::{ErrorCode, SubforgeError};
use crate::model::{Document, Event};

pub fn parse(bytes: &[u8], _opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
    if bytes.len() < GSI_BLOCK_LEN {
        return Err(SubforgeError::new(ErrorCode::InvalidFormat, "input shorter than the GSI block"));
    }
    let gsi = parse_gsi(&bytes[..GSI_BLOCK_LEN])
        .ok_or_else(|| SubforgeError::new(ErrorCode::InvalidFormat, "malformed GSI block"))?;

    let mut doc = Document::new();
    let mut offset = GSI_BLOCK_LEN;
    while offset + 128 <= bytes.len() {
        let Some(tti) = parse_tti(&bytes[offset..offset + 128]) else { break };
        offset += 128;
        let start_ms = decode_bcd_timecode(tti.time_in, gsi.frame_rate);
        let end_ms = decode_bcd_timecode(tti.time_out, gsi.frame_rate);
        let text = decode_text(&tti.text);
        if text.trim().is_empty() {
            continue;
        }
        doc.add_event(Event::new(0, start_ms, end_ms, text));
    }

    Ok(ParseResult::ok(doc))
}

pub fn serialize(doc: &Document, opts: &SerializeOptions) -> Vec<u8> {
    let fps = opts.fps.unwrap_or(25.0);
    let mut gsi = vec![0x20u8; GSI_BLOCK_LEN];
    let code = if (fps - 29.97).abs() < 0.01 { b"STL30.01" } else { b"STL25.01" };
    gsi[3..11].copy_from_slice(code);

    let mut out = gsi;
    for (i, event) in doc.events.iter().enumerate() {
        let tti = TtiRecord {
            subtitle_group_number: 0,
            subtitle_number: i as u16,
            cumulative_status: 0,
            time_in: encode_bcd_timecode(event.start_ms, fps),
            time_out: encode_bcd_timecode(event.end_ms, fps),
            vertical_position: 20,
            justification_code: 2,
            comment_flag: 0,
            text: encode_text(&event.effective_text()),
        };
        out.extend(format_tti(&tti));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_sample() -> Vec<u8> {
        let mut bytes = vec![0x20u8; GSI_BLOCK_LEN];
        bytes[3..11].copy_from_slice(b"STL25.01");
        let tti = TtiRecord {
            subtitle_group_number: 0,
            subtitle_number: 0,
            cumulative_status: 0,
            time_in: encode_bcd_timecode(1000, 25.0),
            time_out: encode_bcd_timecode(5000, 25.0),
            vertical_position: 20,
            justification_code: 2,
            comment_flag: 0,
            text: encode_text("Hello"),
        };
        bytes.extend(format_tti(&tti));
        bytes
    }

    #[test]
    fn parses_gsi_and_single_tti_record() {
        let bytes = build_sample();
        let result = parse(&bytes, &ParseOptions::default()).unwrap();
        assert_eq!(result.document.events.len(), 1);
        assert_eq!(result.document.events[0].start_ms, 1000);
        assert_eq!(result.document.events[0].text, "Hello");
    }

    #[test]
    fn too_short_input_is_invalid_format() {
        let err = parse(&[0u8; 10], &ParseOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
    }

    #[test]
    fn serialize_then_parse_round_trips_event() {
        let mut doc = Document::new();
        doc.add_event(Event::new(0, 1000, 5000, "Hello".to_string()));

        let opts = SerializeOptions { fps: Some(25.0), ..SerializeOptions::default() };
        let bytes = serialize(&doc, &opts);
        let result = parse(&bytes, &ParseOptions::default()).unwrap();

        assert_eq!(result.document.events.len(), 1);
        assert_eq!(result.document.events[0].start_ms, 1000);
        assert_eq!(result.document.events[0].end_ms, 5000);
        assert_eq!(result.document.events[0].text, "Hello");
    }
}
