//! DVB subtitling (ETSI EN 300 743): sync byte `0x0F`, then page/region/
//! CLUT/object segments addressing 2/4/8-bit pixel codes (spec.md §4.3.16).
//! Shares the byte-oriented object RLE scheme with PGS.

use crate::binary::rle::{decode_object_rle, encode_object_rle};
use crate::codecs::{ParseOptions, ParseResult};
use crate::error::{ErrorCode, SubforgeError};
use crate::model::event::Image;
use crate::model::{Document, Event};
use crate::primitives::color::AbgrColor;

const SYNC_BYTE: u8 = 0x0F;
const SEG_PAGE: u8 = 0x10;
const SEG_REGION: u8 = 0x11;
const SEG_CLUT: u8 = 0x12;
const SEG_OBJECT: u8 = 0x13;
const SEG_END_OF_DISPLAY: u8 = 0x80;

struct Segment<'a> {
    kind: u8,
    payload: &'a [u8],
}

fn split_segments(bytes: &[u8]) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut i = 0;
    while i + 6 <= bytes.len() {
        if bytes[i] != SYNC_BYTE {
            break;
        }
        let kind = bytes[i + 1];
        let len = u16::from_be_bytes([bytes[i + 4], bytes[i + 5]]) as usize;
        let start = i + 6;
        if start + len > bytes.len() {
            break;
        }
        out.push(Segment { kind, payload: &bytes[start..start + len] });
        i = start + len;
    }
    out
}

/// Only the 8-bit-per-channel CLUT entry form is decoded; the packed
/// 2/4-bit entry variants fall back to an opaque black entry.
fn parse_clut(payload: &[u8]) -> Vec<AbgrColor> {
    let mut palette = vec![AbgrColor::from_rgba(0, 0, 0, 0); 256];
    let mut i = 2; // clut_id(1) + version(1)
    while i + 6 <= payload.len() {
        let entry_id = payload[i] as usize;
        let flags = payload[i + 1];
        let full_range = flags & 0x01 != 0;
        if !full_range {
            i += 4;
            continue;
        }
        let (y, cr, cb, t) = (payload[i + 2], payload[i + 3], payload[i + 4], payload[i + 5]);
        let a = 255u8.saturating_sub(t);
        let y = y as f64;
        let cb = cb as f64 - 128.0;
        let cr = cr as f64 - 128.0;
        let r = (y + 1.402 * cr).clamp(0.0, 255.0) as u8;
        let g = (y - 0.344136 * cb - 0.714136 * cr).clamp(0.0, 255.0) as u8;
        let b = (y + 1.772 * cb).clamp(0.0, 255.0) as u8;
        if entry_id < palette.len() {
            palette[entry_id] = AbgrColor::from_rgba(r, g, b, a);
        }
        i += 6;
    }
    palette
}

struct ObjectData {
    width: u32,
    height: u32,
    indexed: Vec<u8>,
}

fn parse_object(payload: &[u8]) -> Option<ObjectData> {
    if payload.len() < 7 {
        return None;
    }
    // object_id(2) version+coding(1) top_field_len(2) bottom_field_len(2)
    let top_len = u16::from_be_bytes([payload[3], payload[4]]) as usize;
    let data = &payload[7..];
    if data.len() < top_len {
        return None;
    }
    let indexed = decode_object_rle(&data[..top_len]);
    let width = indexed.len().min(720) as u32;
    Some(ObjectData { width: width.max(1), height: (indexed.len() as u32 / width.max(1)).max(1), indexed })
}

pub fn parse(bytes: &[u8], _opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
    let segments = split_segments(bytes);
    if segments.is_empty() {
        return Err(SubforgeError::new(ErrorCode::InvalidFormat, "no DVB segments found"));
    }

    let mut doc = Document::new();
    let mut palette = Vec::new();
    let mut object: Option<ObjectData> = None;
    let mut page_seen = false;

    for seg in &segments {
        match seg.kind {
            SEG_PAGE => page_seen = true,
            SEG_CLUT => palette = parse_clut(seg.payload),
            SEG_OBJECT => object = parse_object(seg.payload),
            SEG_END_OF_DISPLAY => {
                if let Some(obj) = object.take() {
                    let mut event = Event::new(0, 0, 0, String::new());
                    event.image = Some(Image {
                        width: obj.width,
                        height: obj.height,
                        x: 0,
                        y: 0,
                        indexed: Some(obj.indexed),
                        palette: palette.clone(),
                        rgba: None,
                    });
                    doc.add_event(event);
                }
            }
            _ => {}
        }
    }
    if !page_seen {
        return Err(SubforgeError::new(ErrorCode::MissingField, "no page composition segment found"));
    }

    Ok(ParseResult::ok(doc))
}

/// Re-encode each event's image into a single-page DVB segment sequence
/// (CLUT + object + end-of-display), run-length encoded through
/// [`encode_object_rle`] the same way [`pgs::serialize`] encodes its object
/// data.
pub fn serialize(doc: &Document) -> Vec<u8> {
    let mut out = Vec::new();
    for event in &doc.events {
        let Some(image) = &event.image else { continue };
        let Some(indexed) = &image.indexed else { continue };

        push_segment(&mut out, SEG_PAGE, &[0, 0]);

        let mut clut_payload = vec![0u8, 0u8];
        for (id, color) in image.palette.iter().enumerate().take(255) {
            let (r, g, b, a) = (color.r(), color.g(), color.b(), color.a());
            let y = (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) as u8;
            let cb = (128.0 - 0.168736 * r as f64 - 0.331264 * g as f64 + 0.5 * b as f64) as u8;
            let cr = (128.0 + 0.5 * r as f64 - 0.418688 * g as f64 - 0.081312 * b as f64) as u8;
            clut_payload.extend([id as u8, 0x01, y, cr, cb, 255 - a]);
        }
        push_segment(&mut out, SEG_CLUT, &clut_payload);

        let encoded = encode_object_rle(indexed);
        let mut obj_payload = vec![0u8, 0u8, 0u8];
        let top_len = encoded.len() as u16;
        obj_payload.extend(top_len.to_be_bytes());
        obj_payload.extend(0u16.to_be_bytes());
        obj_payload.extend(encoded);
        push_segment(&mut out, SEG_OBJECT, &obj_payload);

        push_segment(&mut out, SEG_END_OF_DISPLAY, &[]);
    }
    out
}

fn push_segment(out: &mut Vec<u8>, kind: u8, payload: &[u8]) {
    out.push(SYNC_BYTE);
    out.push(kind);
    out.extend(0u16.to_be_bytes()); // page_id, unused by this round trip
    out.extend((payload.len() as u16).to_be_bytes());
    out.extend(payload);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_invalid_format() {
        let err = parse(&[], &ParseOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
    }

    #[test]
    fn missing_page_segment_is_missing_field() {
        let mut bytes = Vec::new();
        bytes.push(SYNC_BYTE);
        bytes.push(SEG_END_OF_DISPLAY);
        bytes.extend(0u16.to_be_bytes());
        bytes.extend(0u16.to_be_bytes());
        let err = parse(&bytes, &ParseOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);
    }

    #[test]
    fn serialize_then_parse_round_trips_indexed_bitmap() {
        let mut doc = Document::new();
        let mut event = Event::new(0, 1000, 4000, String::new());
        let indexed = vec![1u8, 0, 0, 0, 0, 0, 0, 0, 2, 3, 0, 0];
        event.image = Some(Image {
            width: 4,
            height: 3,
            x: 0,
            y: 0,
            indexed: Some(indexed.clone()),
            palette: vec![
                AbgrColor::from_rgb(0, 0, 0),
                AbgrColor::from_rgb(255, 255, 255),
                AbgrColor::from_rgb(255, 0, 0),
                AbgrColor::from_rgb(0, 255, 0),
            ],
            rgba: None,
        });
        doc.add_event(event);

        let bytes = serialize(&doc);
        let parsed = parse(&bytes, &ParseOptions::default()).unwrap();

        assert_eq!(parsed.document.events.len(), 1);
        let image = parsed.document.events[0].image.as_ref().unwrap();
        assert_eq!(image.indexed.as_deref(), Some(&indexed[..]));
    }
}
