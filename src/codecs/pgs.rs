//! HDMV/PGS (Blu-ray bitmap subtitles): `PG`-prefixed segments (PDS/ODS/PCS/
//! WDS/END) carrying a YCbCr+alpha palette and an RLE-coded bitmap object.
//! Each presentation composition becomes one event scoped to its own epoch
//! (spec.md §4.3.15, §9 Open Question 1); multi-epoch timing reconstruction
//! is out of scope.

use crate::binary::rle::{decode_object_rle, encode_object_rle};
use crate::codecs::{ParseOptions, ParseResult};
use crate::error::{ErrorCode, SubforgeError};
use crate::model::event::{Image, Sidecar};
use crate::model::{Document, Event};
use crate::primitives::color::AbgrColor;

const SEG_PDS: u8 = 0x14;
const SEG_ODS: u8 = 0x15;
const SEG_PCS: u8 = 0x16;
const SEG_WDS: u8 = 0x17;
const SEG_END: u8 = 0x80;

struct Segment<'a> {
    kind: u8,
    pts_ms: i64,
    payload: &'a [u8],
}

fn split_segments(bytes: &[u8]) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut i = 0;
    while i + 13 <= bytes.len() {
        if &bytes[i..i + 2] != b"PG" {
            break;
        }
        let pts_90k = u32::from_be_bytes(bytes[i + 2..i + 6].try_into().unwrap());
        let kind = bytes[i + 10];
        let len = u16::from_be_bytes([bytes[i + 11], bytes[i + 12]]) as usize;
        let start = i + 13;
        if start + len > bytes.len() {
            break;
        }
        out.push(Segment { kind, pts_ms: pts_90k as i64 / 90, payload: &bytes[start..start + len] });
        i = start + len;
    }
    out
}

fn ycbcr_to_abgr(y: u8, cb: u8, cr: u8, a: u8) -> AbgrColor {
    let y = y as f64;
    let cb = cb as f64 - 128.0;
    let cr = cr as f64 - 128.0;
    let r = (y + 1.402 * cr).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344136 * cb - 0.714136 * cr).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * cb).clamp(0.0, 255.0) as u8;
    AbgrColor::from_rgba(r, g, b, a)
}

fn parse_pds(payload: &[u8]) -> Vec<AbgrColor> {
    let mut palette = vec![AbgrColor::from_rgba(0, 0, 0, 0); 256];
    // Skip palette_id (1) + version (1); entries are 5 bytes: id,y,cr,cb,a.
    let mut i = 2;
    while i + 5 <= payload.len() {
        let id = payload[i] as usize;
        let y = payload[i + 1];
        let cr = payload[i + 2];
        let cb = payload[i + 3];
        let a = payload[i + 4];
        if id < palette.len() {
            palette[id] = ycbcr_to_abgr(y, cb, cr, a);
        }
        i += 5;
    }
    palette
}

struct ObjectData {
    width: u32,
    height: u32,
    indexed: Vec<u8>,
}

fn parse_ods(payload: &[u8]) -> Option<ObjectData> {
    if payload.len() < 11 {
        return None;
    }
    // object_id(2) version(1) last_in_seq_flag(1) data_len(3) width(2) height(2)
    let width = u16::from_be_bytes([payload[7], payload[8]]) as u32;
    let height = u16::from_be_bytes([payload[9], payload[10]]) as u32;
    let rle_data = &payload[11..];
    let indexed = decode_object_rle(rle_data);
    Some(ObjectData { width, height, indexed })
}

pub fn parse(bytes: &[u8], _opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
    let segments = split_segments(bytes);
    if segments.is_empty() {
        return Err(SubforgeError::new(ErrorCode::InvalidFormat, "no PG segments found"));
    }

    let mut doc = Document::new();
    let mut palette: Vec<AbgrColor> = Vec::new();
    let mut object: Option<ObjectData> = None;
    let mut comp_start: Option<(i64, u16)> = None;
    let mut window_number = 0u8;

    for seg in &segments {
        match seg.kind {
            SEG_PDS => palette = parse_pds(seg.payload),
            SEG_ODS => object = parse_ods(seg.payload),
            SEG_WDS => {
                if seg.payload.len() >= 1 {
                    window_number = seg.payload[0];
                }
            }
            SEG_PCS => {
                let composition_number = if seg.payload.len() >= 4 {
                    u16::from_be_bytes([seg.payload[2], seg.payload[3]])
                } else {
                    0
                };
                let has_object = seg.payload.get(10).copied().unwrap_or(0) > 0;
                if has_object {
                    comp_start = Some((seg.pts_ms, composition_number));
                } else if let Some((start_ms, composition_number)) = comp_start.take() {
                    emit_event(&mut doc, start_ms, seg.pts_ms, &palette, object.take(), composition_number, window_number);
                }
            }
            SEG_END => {
                if let Some((start_ms, composition_number)) = comp_start.take() {
                    emit_event(&mut doc, start_ms, seg.pts_ms, &palette, object.take(), composition_number, window_number);
                }
            }
            _ => {}
        }
    }

    Ok(ParseResult::ok(doc))
}

fn emit_event(
    doc: &mut Document,
    start_ms: i64,
    end_ms: i64,
    palette: &[AbgrColor],
    object: Option<ObjectData>,
    composition_number: u16,
    window_number: u8,
) {
    let Some(obj) = object else { return };
    let mut event = Event::new(0, start_ms, end_ms, String::new());
    event.image = Some(Image {
        width: obj.width,
        height: obj.height,
        x: 0,
        y: 0,
        indexed: Some(obj.indexed),
        palette: palette.to_vec(),
        rgba: None,
    });
    event.sidecar = Some(Sidecar::Pgs { composition_number, window_number });
    doc.add_event(event);
}

/// Re-encode each event's image back into a single-epoch PG segment
/// sequence (PDS + ODS + PCS + END). The bitmap is run-length encoded
/// through [`encode_object_rle`]; lossless for the indexed data but not
/// byte-identical to an original encoder's output.
pub fn serialize(doc: &Document) -> Vec<u8> {
    let mut out = Vec::new();
    for event in &doc.events {
        let Some(image) = &event.image else { continue };
        let Some(indexed) = &image.indexed else { continue };

        let mut pds_payload = vec![0u8, 0u8];
        for (id, color) in image.palette.iter().enumerate().take(255) {
            pds_payload.push(id as u8);
            let (r, g, b, a) = (color.r(), color.g(), color.b(), color.a());
            let y = (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) as u8;
            let cb = (128.0 - 0.168736 * r as f64 - 0.331264 * g as f64 + 0.5 * b as f64) as u8;
            let cr = (128.0 + 0.5 * r as f64 - 0.418688 * g as f64 - 0.081312 * b as f64) as u8;
            pds_payload.extend([y, cr, cb, a]);
        }
        push_segment(&mut out, SEG_PDS, event.start_ms, &pds_payload);

        let mut ods_payload = vec![0u8, 0u8, 0u8, 1u8, 0u8, 0u8, 0u8];
        ods_payload.extend((image.width as u16).to_be_bytes());
        ods_payload.extend((image.height as u16).to_be_bytes());
        ods_payload.extend(encode_object_rle(indexed));
        push_segment(&mut out, SEG_ODS, event.start_ms, &ods_payload);

        let mut pcs_payload = vec![0u8; 11];
        pcs_payload[10] = 1;
        push_segment(&mut out, SEG_PCS, event.start_ms, &pcs_payload);
        push_segment(&mut out, SEG_END, event.end_ms, &[]);
    }
    out
}

fn push_segment(out: &mut Vec<u8>, kind: u8, pts_ms: i64, payload: &[u8]) {
    out.extend(b"PG");
    out.extend(((pts_ms * 90) as u32).to_be_bytes());
    out.extend(0u32.to_be_bytes());
    out.push(kind);
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
    fn split_segments_reads_pg_header_fields() {
        let mut bytes = Vec::new();
        bytes.extend(b"PG");
        bytes.extend(90_000u32.to_be_bytes()); // pts = 1000ms
        bytes.extend(0u32.to_be_bytes()); // dts, unused
        bytes.push(SEG_END);
        bytes.extend(0u16.to_be_bytes()); // zero-length payload
        let segs = split_segments(&bytes);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].pts_ms, 1000);
        assert_eq!(segs[0].kind, SEG_END);
    }

    #[test]
    fn ycbcr_white_maps_to_rgb_white() {
        let c = ycbcr_to_abgr(255, 128, 128, 255);
        assert_eq!((c.r(), c.g(), c.b()), (255, 255, 255));
    }

    #[test]
    fn serialize_then_parse_round_trips_indexed_bitmap() {
        let mut doc = Document::new();
        let mut event = Event::new(0, 1000, 4000, String::new());
        event.image = Some(Image {
            width: 4,
            height: 2,
            x: 0,
            y: 0,
            indexed: Some(vec![1, 0, 0, 0, 0, 0, 2, 3]),
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
        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!(image.indexed.as_deref(), Some(&[1u8, 0, 0, 0, 0, 0, 2, 3][..]));
    }
}
