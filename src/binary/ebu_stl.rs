//! EBU-STL binary record layout: 1024-byte General Subtitle Information
//! (GSI) block plus 128-byte Text-and-Timing Information (TTI) records
//! (spec.md §4.3.12).

pub const GSI_BLOCK_LEN: usize = 1024;
pub const TTI_RECORD_LEN: usize = 128;
pub const TEXT_TERMINATOR: u8 = 0x8F;
pub const LINE_BREAK: u8 = 0x8A;

/// Parsed GSI header fields the codec needs (the rest round-trips as an
/// opaque block when re-serializing, since nothing downstream mutates it).
#[derive(Debug, Clone)]
pub struct GsiBlock {
    pub disk_format_code: String,
    pub frame_rate: f64,
    pub raw: [u8; GSI_BLOCK_LEN],
}

/// Parse the fixed 1024-byte GSI block. `disk_format_code` (bytes 3..11)
/// distinguishes STL25.01 (PAL, 25fps) from STL30.01 (NTSC, 29.97/30fps).
pub fn parse_gsi(block: &[u8]) -> Option<GsiBlock> {
    if block.len() < GSI_BLOCK_LEN {
        return None;
    }
    let disk_format_code = String::from_utf8_lossy(&block[3..11]).trim().to_string();
    let frame_rate = if disk_format_code.starts_with("STL30") {
        29.97
    } else {
        25.0
    };
    let mut raw = [0u8; GSI_BLOCK_LEN];
    raw.copy_from_slice(&block[..GSI_BLOCK_LEN]);
    Some(GsiBlock { disk_format_code, frame_rate, raw })
}

/// One 128-byte TTI record.
#[derive(Debug, Clone)]
pub struct TtiRecord {
    pub subtitle_group_number: u8,
    pub subtitle_number: u16,
    pub cumulative_status: u8,
    /// SMPTE timecode bytes `HH MM SS FF`.
    pub time_in: [u8; 4],
    pub time_out: [u8; 4],
    pub vertical_position: u8,
    pub justification_code: u8,
    pub comment_flag: u8,
    /// Raw teletext character bytes, terminated by `0x8F` padding.
    pub text: Vec<u8>,
}

pub fn parse_tti(record: &[u8]) -> Option<TtiRecord> {
    if record.len() < TTI_RECORD_LEN {
        return None;
    }
    let text_end = record[16..112]
        .iter()
        .position(|&b| b == TEXT_TERMINATOR)
        .map(|p| 16 + p)
        .unwrap_or(112);
    Some(TtiRecord {
        subtitle_group_number: record[0],
        subtitle_number: u16::from_le_bytes([record[1], record[2]]),
        cumulative_status: record[3],
        time_in: [record[4], record[5], record[6], record[7]],
        time_out: [record[8], record[9], record[10], record[11]],
        vertical_position: record[12],
        justification_code: record[13],
        comment_flag: record[14],
        text: record[16..text_end].to_vec(),
    })
}

pub fn format_tti(rec: &TtiRecord) -> Vec<u8> {
    let mut out = vec![0u8; TTI_RECORD_LEN];
    out[0] = rec.subtitle_group_number;
    out[1..3].copy_from_slice(&rec.subtitle_number.to_le_bytes());
    out[3] = rec.cumulative_status;
    out[4..8].copy_from_slice(&rec.time_in);
    out[8..12].copy_from_slice(&rec.time_out);
    out[12] = rec.vertical_position;
    out[13] = rec.justification_code;
    out[14] = rec.comment_flag;
    out[15] = 0;
    let end = (16 + rec.text.len()).min(out.len());
    out[16..end].copy_from_slice(&rec.text[..end - 16]);
    if end < out.len() {
        out[end] = TEXT_TERMINATOR;
        for b in out.iter_mut().skip(end + 1) {
            *b = TEXT_TERMINATOR;
        }
    }
    out
}

/// Decode EBU-STL text bytes (teletext Latin character set, `0x8A` line
/// breaks) to a plain string. Only the printable Latin range and line
/// breaks are handled; control codes outside that range are skipped.
pub fn decode_text(bytes: &[u8]) -> String {
    let mut out = String::new();
    for &b in bytes {
        match b {
            LINE_BREAK => out.push('\n'),
            TEXT_TERMINATOR => break,
            0x20..=0x7E => out.push(b as char),
            _ => {}
        }
    }
    out
}

pub fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for ch in text.chars() {
        if ch == '\n' {
            out.push(LINE_BREAK);
        } else if ch.is_ascii() {
            out.push(ch as u8);
        } else {
            out.push(b'?');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gsi_detects_ntsc_frame_rate() {
        let mut block = vec![0u8; GSI_BLOCK_LEN];
        block[3..11].copy_from_slice(b"STL30.01");
        let gsi = parse_gsi(&block).unwrap();
        assert_eq!(gsi.frame_rate, 29.97);
    }

    #[test]
    fn tti_text_round_trips() {
        let rec = TtiRecord {
            subtitle_group_number: 0,
            subtitle_number: 1,
            cumulative_status: 0,
            time_in: [0, 0, 0, 0],
            time_out: [0, 0, 1, 0],
            vertical_position: 20,
            justification_code: 2,
            comment_flag: 0,
            text: encode_text("Hello\nworld"),
        };
        let bytes = format_tti(&rec);
        let parsed = parse_tti(&bytes).unwrap();
        assert_eq!(decode_text(&parsed.text), "Hello\nworld");
    }
}
