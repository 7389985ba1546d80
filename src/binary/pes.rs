//! MPEG-PS/PES packet assembly and demux, as used by VobSub `.sub` streams
//! (spec.md §4.3.17).

/// One demuxed private-stream-1 packet: presentation timestamp (90kHz units,
/// converted to ms) and the substream payload bytes (after the 1-byte
/// substream-id header).
#[derive(Debug, Clone, PartialEq)]
pub struct PesPacket {
    pub pts_ms: i64,
    pub substream_id: u8,
    pub payload: Vec<u8>,
}

/// Scan an MPEG-PS byte stream for pack headers (`00 00 01 BA`) followed by
/// private-stream-1 PES packets (`00 00 01 BD`), returning each demuxed
/// packet in stream order.
pub fn demux_ps_stream(data: &[u8]) -> Vec<PesPacket> {
    let mut packets = Vec::new();
    let mut i = 0;
    while i + 4 <= data.len() {
        if data[i..i + 3] != [0x00, 0x00, 0x01] {
            i += 1;
            continue;
        }
        match data[i + 3] {
            0xBA => {
                // Pack header: fixed 14 bytes (MPEG-2 PS, no stuffing handled here).
                i += 14;
            }
            0xBD => {
                if let Some((packet, consumed)) = parse_pes_packet(&data[i..]) {
                    packets.push(packet);
                    i += consumed;
                } else {
                    break;
                }
            }
            _ => i += 4,
        }
    }
    packets
}

fn parse_pes_packet(data: &[u8]) -> Option<(PesPacket, usize)> {
    if data.len() < 9 {
        return None;
    }
    let pes_len = u16::from_be_bytes([data[4], data[5]]) as usize;
    if data.len() < 6 + pes_len {
        return None;
    }
    let header_flags = data[7];
    let header_data_len = data[8] as usize;
    let has_pts = header_flags & 0x80 != 0;
    let pts_ms = if has_pts && 9 + 5 <= data.len() {
        parse_pts(&data[9..14])
    } else {
        0
    };
    let payload_start = 9 + header_data_len;
    if payload_start >= 6 + pes_len || payload_start >= data.len() {
        return Some((
            PesPacket { pts_ms, substream_id: 0, payload: Vec::new() },
            6 + pes_len,
        ));
    }
    let substream_id = data[payload_start];
    let payload = data[payload_start + 1..6 + pes_len].to_vec();
    Some((PesPacket { pts_ms, substream_id, payload }, 6 + pes_len))
}

/// Parse a 5-byte 90kHz PTS field into milliseconds.
fn parse_pts(bytes: &[u8]) -> i64 {
    let b0 = bytes[0] as u64;
    let b1 = bytes[1] as u64;
    let b2 = bytes[2] as u64;
    let b3 = bytes[3] as u64;
    let b4 = bytes[4] as u64;
    let pts = ((b0 >> 1) & 0x07) << 30 | (b1 << 22) | ((b2 >> 1) << 15) | (b3 << 7) | (b4 >> 1);
    (pts as f64 / 90.0).round() as i64
}

/// Reassemble a VobSub subtitle packet's payload across one or more PES
/// packets sharing the same presentation timestamp: the first packet's
/// payload begins with a 16-bit total-size field and a 16-bit offset to the
/// control sequence; subsequent packets for the same PTS are concatenated.
pub fn reassemble_subtitle_packet(packets: &[PesPacket]) -> Option<(i64, Vec<u8>, usize)> {
    let first = packets.first()?;
    tracing::debug!("reassembling subtitle packet from {} PES fragments at pts={}", packets.len(), first.pts_ms);
    if first.payload.len() < 4 {
        return None;
    }
    let total_size = u16::from_be_bytes([first.payload[0], first.payload[1]]) as usize;
    let control_offset = u16::from_be_bytes([first.payload[2], first.payload[3]]) as usize;
    let mut data = Vec::with_capacity(total_size);
    for p in packets {
        data.extend_from_slice(&p.payload);
    }
    data.truncate(total_size.max(data.len()).min(data.len()));
    Some((first.pts_ms, data, control_offset))
}

/// Mux one private-stream-1 PES packet (with a minimal preceding pack
/// header) carrying `payload` under `substream_id`, timestamped `pts_ms`.
/// The inverse of [`demux_ps_stream`] + [`parse_pes_packet`] for a single
/// packet per presentation timestamp.
pub fn mux_ps_packet(pts_ms: i64, substream_id: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend([0x00, 0x00, 0x01, 0xBA]);
    out.extend([0u8; 10]);

    let ticks = (pts_ms.max(0) as f64 * 90.0).round() as u64;
    let b0 = 0x21 | (((ticks >> 30) & 0x07) << 1) as u8;
    let b1 = ((ticks >> 22) & 0xFF) as u8;
    let b2 = ((((ticks >> 15) & 0x7F) << 1) | 1) as u8;
    let b3 = ((ticks >> 7) & 0xFF) as u8;
    let b4 = (((ticks & 0x7F) << 1) | 1) as u8;

    let header_data_len = 5u8;
    let pes_len = (3 + header_data_len as usize + 1 + payload.len()) as u16;

    out.extend([0x00, 0x00, 0x01, 0xBD]);
    out.extend(pes_len.to_be_bytes());
    out.push(0x81);
    out.push(0x80);
    out.push(header_data_len);
    out.extend([b0, b1, b2, b3, b4]);
    out.push(substream_id);
    out.extend(payload);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mux_then_demux_round_trips_payload_and_pts() {
        let payload = [1u8, 2, 3, 4, 5];
        let stream = mux_ps_packet(1000, 0x20, &payload);
        let packets = demux_ps_stream(&stream);
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].pts_ms, 1000);
        assert_eq!(packets[0].substream_id, 0x20);
        assert_eq!(packets[0].payload, payload);
    }

    #[test]
    fn parse_pts_known_value() {
        // 90000 ticks = 1000ms. Encode with marker bits per the PES PTS-only pattern.
        let ticks: u64 = 90000;
        let b0 = 0x21 | (((ticks >> 30) & 0x07) << 1) as u8;
        let b1 = ((ticks >> 22) & 0xFF) as u8;
        let b2 = (((ticks >> 15) & 0x7F) << 1 | 1) as u8;
        let b3 = ((ticks >> 7) & 0xFF) as u8;
        let b4 = (((ticks & 0x7F) << 1) | 1) as u8;
        let ms = parse_pts(&[b0, b1, b2, b3, b4]);
        assert_eq!(ms, 1000);
    }

    #[test]
    fn demux_skips_unrelated_bytes() {
        let packets = demux_ps_stream(&[0xFF, 0xFF, 0x00, 0x00, 0x01, 0xBA]);
        assert!(packets.is_empty());
    }
}
