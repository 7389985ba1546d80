//! VobSub (DVD bitmap subtitles): a text `.idx` sidecar (palette + per-
//! subtitle timestamps/file offsets) plus an MPEG-PS `.sub` stream carrying
//! one SPU packet per event. The SPU's control sequence states its own
//! offset into the packet; that stated offset is honored rather than
//! heuristically rescanning for a plausible command byte (spec.md §4.3.17,
//! §9 Open Question 4).

use crate::binary::pes::{demux_ps_stream, mux_ps_packet, reassemble_subtitle_packet, PesPacket};
use crate::binary::rle::{decode_vobsub_rle, encode_vobsub_rle};
use crate::codecs::ParseOptions;
use crate::error::{ErrorCode, SubforgeError};
use crate::model::event::{Image, Sidecar};
use crate::model::{Document, Event};
use crate::primitives::color::AbgrColor;
use crate::primitives::timecode::{format_vobsub_idx, parse_vobsub_idx};

/// Bytes preceding the RLE plane in a reassembled subtitle packet: the
/// 16-bit total-size field and the 16-bit control-sequence offset.
const PACKET_HEADER_LEN: usize = 4;

/// One `.idx` entry: the timestamp at which the matching `.sub` packet
/// should be displayed.
#[derive(Debug, Clone, Copy)]
struct IdxEntry {
    start_ms: i64,
}

struct IdxFile {
    width: u32,
    height: u32,
    palette: Vec<AbgrColor>,
    entries: Vec<IdxEntry>,
}

fn parse_idx(text: &str) -> IdxFile {
    let mut width = 720;
    let mut height = 480;
    let mut palette = Vec::new();
    let mut entries = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("size:") {
            if let Some((w, h)) = rest.trim().split_once('x') {
                width = w.trim().parse().unwrap_or(width);
                height = h.trim().parse().unwrap_or(height);
            }
        } else if let Some(rest) = line.strip_prefix("palette:") {
            palette = rest
                .split(',')
                .filter_map(|hex| {
                    let hex = hex.trim();
                    u32::from_str_radix(hex, 16).ok().map(|v| {
                        AbgrColor::from_rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
                    })
                })
                .collect();
        } else if let Some(rest) = line.strip_prefix("timestamp:") {
            if let Some((ts, _rest)) = rest.split_once(',') {
                if let Some(ms) = parse_vobsub_idx(ts.trim()) {
                    entries.push(IdxEntry { start_ms: ms });
                }
            }
        }
    }

    IdxFile { width, height, palette, entries }
}

/// Parse the SPU control sequence at `offset`, extracting the display area
/// (`SET_DAREA`, command `0x04`) and the packet's end timestamp (`0x02`
/// relative delay in the control-sequence header, in PTS 90kHz ticks),
/// stopping at the `0xFF` terminator.
fn parse_control_sequence(packet: &[u8], offset: usize) -> Option<(u32, u32, u32, u32)> {
    let mut i = offset;
    // Control sequence header: date(2) next_offset(2), then commands.
    if i + 4 > packet.len() {
        return None;
    }
    i += 4;
    let mut area = None;
    while i < packet.len() {
        let cmd = packet[i];
        i += 1;
        match cmd {
            0x00 | 0x01 => {} // FSTA_DSP / FEND_DSP, no operand
            0x02 => {}        // SET_COLOR placeholder, 2-byte operand
            0x03 => i += 2,   // SET_CONTR
            0x04 => {
                if i + 6 > packet.len() {
                    break;
                }
                let x1 = ((packet[i] as u32) << 4) | (packet[i + 1] as u32 >> 4);
                let x2 = (((packet[i + 1] as u32) & 0x0F) << 8) | packet[i + 2] as u32;
                let y1 = ((packet[i + 3] as u32) << 4) | (packet[i + 4] as u32 >> 4);
                let y2 = (((packet[i + 4] as u32) & 0x0F) << 8) | packet[i + 5] as u32;
                area = Some((x1, y1, x2.saturating_sub(x1) + 1, y2.saturating_sub(y1) + 1));
                i += 6;
            }
            0x05 => i += 4, // SET_PXD offsets to the two RLE planes
            0x06 => i += 4, // SET_DSPXA_T delay fields
            0xFF => break,
            _ => break,
        }
    }
    area
}

pub fn parse(idx_text: &str, sub_bytes: &[u8], _opts: &ParseOptions) -> Result<Document, SubforgeError> {
    let idx = parse_idx(idx_text);
    if idx.entries.is_empty() {
        return Err(SubforgeError::new(ErrorCode::MissingField, "idx file has no timestamp entries"));
    }

    let packets = demux_ps_stream(sub_bytes);
    let groups = group_by_pts(packets);

    let mut doc = Document::new();
    for (i, group) in groups.iter().enumerate() {
        let Some((pts_ms, data, control_offset)) = reassemble_subtitle_packet(group) else { continue };
        let start_ms = idx.entries.get(i).map(|e| e.start_ms).unwrap_or(pts_ms);
        let end_ms = idx.entries.get(i + 1).map(|e| e.start_ms).unwrap_or(start_ms + 3000);

        let (width, height) = parse_control_sequence(&data, control_offset)
            .map(|(_, _, w, h)| (w.max(1), h.max(1)))
            .unwrap_or((idx.width, idx.height));
        let rle_plane = data.get(PACKET_HEADER_LEN..).unwrap_or(&[]);
        let indexed = decode_vobsub_rle(rle_plane, width as usize, height as usize);

        let mut event = Event::new(0, start_ms, end_ms, String::new());
        event.image = Some(Image {
            width,
            height,
            x: 0,
            y: 0,
            indexed: Some(indexed),
            palette: idx.palette.clone(),
            rgba: None,
        });
        event.sidecar = Some(Sidecar::VobSub { forced: false, original_track_index: None });
        doc.add_event(event);
    }

    Ok(doc)
}

fn group_by_pts(packets: Vec<PesPacket>) -> Vec<Vec<PesPacket>> {
    let mut groups: Vec<Vec<PesPacket>> = Vec::new();
    for packet in packets {
        match groups.last_mut() {
            Some(last) if last.last().map(|p| p.pts_ms) == Some(packet.pts_ms) => last.push(packet),
            _ => groups.push(vec![packet]),
        }
    }
    groups
}

/// Serialize a document's image events into a paired `.idx`/`.sub` stream.
/// VobSub has no single-buffer representation; callers that need one byte
/// stream should join these with the usual sidecar naming convention
/// (`foo.idx` next to `foo.sub`).
pub fn serialize(doc: &Document) -> (String, Vec<u8>) {
    let (width, height, palette) = doc
        .events
        .iter()
        .find_map(|e| e.image.as_ref())
        .map(|img| (img.width, img.height, img.palette.clone()))
        .unwrap_or((720, 480, Vec::new()));

    let mut idx = String::new();
    idx.push_str(&format!("size: {width}x{height}\n"));
    if !palette.is_empty() {
        let hex: Vec<String> = palette
            .iter()
            .map(|c| format!("{:02x}{:02x}{:02x}", c.r(), c.g(), c.b()))
            .collect();
        idx.push_str(&format!("palette: {}\n", hex.join(", ")));
    }

    let mut sub = Vec::new();
    for event in &doc.events {
        let Some(image) = &event.image else { continue };
        let Some(indexed) = &image.indexed else { continue };

        idx.push_str(&format!(
            "timestamp: {}, filepos: {:09x}\n",
            format_vobsub_idx(event.start_ms),
            sub.len()
        ));

        let rle = encode_vobsub_rle(indexed, image.width as usize, image.height as usize);
        let (x1, y1) = (image.x, image.y);
        let x2 = x1 + image.width.saturating_sub(1);
        let y2 = y1 + image.height.saturating_sub(1);

        let mut control = vec![0u8, 0u8, 0u8, 0u8]; // date + next_offset, unused on replay
        control.push(0x04); // SET_DAREA
        control.push((x1 >> 4) as u8);
        control.push((((x1 & 0xF) << 4) | (x2 >> 8)) as u8);
        control.push((x2 & 0xFF) as u8);
        control.push((y1 >> 4) as u8);
        control.push((((y1 & 0xF) << 4) | (y2 >> 8)) as u8);
        control.push((y2 & 0xFF) as u8);
        control.push(0xFF);

        let control_offset = (PACKET_HEADER_LEN + rle.len()) as u16;
        let total_size = (PACKET_HEADER_LEN + rle.len() + control.len()) as u16;
        let mut payload = Vec::with_capacity(total_size as usize);
        payload.extend(total_size.to_be_bytes());
        payload.extend(control_offset.to_be_bytes());
        payload.extend(&rle);
        payload.extend(&control);

        sub.extend(mux_ps_packet(event.start_ms, 0x20, &payload));
    }

    (idx, sub)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_then_parse_round_trips_one_event() {
        let mut doc = Document::new();
        let mut event = Event::new(0, 1000, 4000, String::new());
        event.image = Some(Image {
            width: 4,
            height: 2,
            x: 10,
            y: 20,
            indexed: Some(vec![1, 0, 2, 3, 3, 2, 0, 1]),
            palette: vec![
                AbgrColor::from_rgb(0, 0, 0),
                AbgrColor::from_rgb(255, 255, 255),
                AbgrColor::from_rgb(255, 0, 0),
                AbgrColor::from_rgb(0, 255, 0),
            ],
            rgba: None,
        });
        doc.add_event(event);

        let (idx_text, sub_bytes) = serialize(&doc);
        let parsed = parse(&idx_text, &sub_bytes, &ParseOptions::default()).unwrap();

        assert_eq!(parsed.events.len(), 1);
        let image = parsed.events[0].image.as_ref().unwrap();
        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!(image.indexed.as_deref(), Some(&[1u8, 0, 2, 3, 3, 2, 0, 1][..]));
    }

    #[test]
    fn parses_idx_size_palette_and_timestamps() {
        let idx = "size: 720x480\npalette: 000000, ffffff\ntimestamp: 00:00:01:000, filepos: 000000000\n";
        let parsed = parse_idx(idx);
        assert_eq!(parsed.width, 720);
        assert_eq!(parsed.palette.len(), 2);
        assert_eq!(parsed.entries[0].start_ms, 1000);
    }

    #[test]
    fn empty_idx_is_missing_field() {
        let err = parse("", &[], &ParseOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);
    }
}
