//! Per-format timecode parsing and formatting.
//!
//! All functions operate over plain byte/digit scanning (no regex) since
//! timecodes sit on the hot path of every text-format parser, and all
//! return/accept integer milliseconds.

/// Parse `H:MM:SS.cc` (ASS) — also accepts a 3-digit fractional part.
pub fn parse_ass(s: &str) -> Option<i64> {
    let s = s.trim();
    let (h, m, sec, frac) = split_hms_frac(s, ':', '.')?;
    Some(hms_to_ms(h, m, sec, frac))
}

pub fn format_ass(ms: i64) -> String {
    let ms = ms.max(0);
    let (h, m, s, cs) = split_ms(ms, 10); // centiseconds
    format!("{}:{:02}:{:02}.{:02}", h, m, s, cs)
}

/// Parse fixed-width `HH:MM:SS,mmm` (SRT, exactly 12 characters).
pub fn parse_srt(s: &str) -> Option<i64> {
    let s = s.trim();
    let (h, m, sec, frac) = split_hms_frac_sep(s, ':', ',')?;
    Some(hms_to_ms(h, m, sec, frac))
}

pub fn format_srt(ms: i64) -> String {
    let ms = ms.max(0);
    let (h, m, s, milli) = split_ms(ms, 1);
    format!("{:02}:{:02}:{:02},{:03}", h, m, s, milli)
}

/// Parse `HH:MM:SS.mmm` or `MM:SS.mmm` (WebVTT).
pub fn parse_vtt(s: &str) -> Option<i64> {
    let s = s.trim();
    let parts: Vec<&str> = s.split(':').collect();
    match parts.len() {
        3 => {
            let (h, m, sec, frac) = split_hms_frac(s, ':', '.')?;
            Some(hms_to_ms(h, m, sec, frac))
        }
        2 => {
            let m: i64 = parts[0].parse().ok()?;
            let sec_parts: Vec<&str> = parts[1].split('.').collect();
            let sec: i64 = sec_parts.first()?.parse().ok()?;
            let frac = parse_fraction(sec_parts.get(1).copied().unwrap_or("0"))?;
            Some(hms_to_ms(0, m, sec, frac))
        }
        _ => None,
    }
}

pub fn format_vtt(ms: i64) -> String {
    let ms = ms.max(0);
    let (h, m, s, milli) = split_ms(ms, 1);
    format!("{:02}:{:02}:{:02}.{:03}", h, m, s, milli)
}

/// Parse `H:MM:SS.mmm` (SBV).
pub fn parse_sbv(s: &str) -> Option<i64> {
    parse_ass_style_dot(s)
}

pub fn format_sbv(ms: i64) -> String {
    let ms = ms.max(0);
    let (h, m, s, milli) = split_ms(ms, 1);
    format!("{}:{:02}:{:02}.{:03}", h, m, s, milli)
}

fn parse_ass_style_dot(s: &str) -> Option<i64> {
    let s = s.trim();
    let (h, m, sec, frac) = split_hms_frac(s, ':', '.')?;
    Some(hms_to_ms(h, m, sec, frac))
}

/// Parse LRC `[MM:SS.cc]`/`[MM:SS.mmm]` or enhanced `<MM:SS.cc>` (brackets
/// are stripped by the caller; this parses just the `MM:SS.frac` body).
pub fn parse_lrc(s: &str) -> Option<i64> {
    let s = s.trim();
    let (m, rest) = s.split_once(':')?;
    let m: i64 = m.parse().ok()?;
    let sec_parts: Vec<&str> = rest.split('.').collect();
    let sec: i64 = sec_parts.first()?.parse().ok()?;
    let frac = parse_fraction(sec_parts.get(1).copied().unwrap_or("0"))?;
    Some(hms_to_ms(0, m, sec, frac))
}

pub fn format_lrc(ms: i64) -> String {
    let ms = ms.max(0);
    let (h, m, s, cs) = split_ms(ms, 10);
    let total_m = h * 60 + m;
    format!("{:02}:{:02}.{:02}", total_m, s, cs)
}

/// Convert a MicroDVD frame number to milliseconds given an fps.
pub fn frame_to_ms(frame: i64, fps: f64) -> i64 {
    ((frame as f64) * 1000.0 / fps).round() as i64
}

/// Convert milliseconds to a MicroDVD frame number given an fps.
pub fn ms_to_frame(ms: i64, fps: f64) -> i64 {
    ((ms as f64) * fps / 1000.0).round() as i64
}

/// Parse a TTML clock time `HH:MM:SS.mmm` / `HH:MM:SS:FF`, or an offset
/// expression `N[hms|ms]`. `fps` is used for the frame form.
pub fn parse_ttml(s: &str, fps: f64) -> Option<i64> {
    let s = s.trim();
    if let Some(v) = s.strip_suffix("ms") {
        return Some(v.parse::<f64>().ok()?.round() as i64);
    }
    if let Some(v) = s.strip_suffix('s') {
        return Some((v.parse::<f64>().ok()? * 1000.0).round() as i64);
    }
    if let Some(v) = s.strip_suffix('h') {
        return Some((v.parse::<f64>().ok()? * 3_600_000.0).round() as i64);
    }
    if let Some(v) = s.strip_suffix('m') {
        return Some((v.parse::<f64>().ok()? * 60_000.0).round() as i64);
    }
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let h: i64 = parts[0].parse().ok()?;
    let m: i64 = parts[1].parse().ok()?;
    if parts.len() == 4 {
        let sec: i64 = parts[2].parse().ok()?;
        let frame: i64 = parts[3].parse().ok()?;
        Some(h * 3_600_000 + m * 60_000 + sec * 1000 + frame_to_ms(frame, fps))
    } else {
        let sec_parts: Vec<&str> = parts[2].split('.').collect();
        let sec: i64 = sec_parts.first()?.parse().ok()?;
        let frac = parse_fraction(sec_parts.get(1).copied().unwrap_or("0"))?;
        Some(hms_to_ms(h, m, sec, frac))
    }
}

pub fn format_ttml(ms: i64) -> String {
    format_srt(ms).replace(',', ".")
}

/// Parse `HH:MM:SS:FF` (CAP, Spruce STL), with frame rate in `fps`.
pub fn parse_frame_timecode(s: &str, fps: f64) -> Option<i64> {
    let s = s.trim();
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 4 {
        return None;
    }
    let h: i64 = parts[0].parse().ok()?;
    let m: i64 = parts[1].parse().ok()?;
    let sec: i64 = parts[2].parse().ok()?;
    let frame: i64 = parts[3].parse().ok()?;
    Some(h * 3_600_000 + m * 60_000 + sec * 1000 + frame_to_ms(frame, fps))
}

pub fn format_frame_timecode(ms: i64, fps: f64) -> String {
    let ms = ms.max(0);
    let total_sec = ms / 1000;
    let rem_ms = ms % 1000;
    let h = total_sec / 3600;
    let m = (total_sec / 60) % 60;
    let s = total_sec % 60;
    let frame = ms_to_frame(rem_ms, fps);
    format!("{:02}:{:02}:{:02}:{:02}", h, m, s, frame)
}

/// Parse drop-frame `HH:MM:SS;FF` (SCC, 29.97fps) using the strict SMPTE
/// drop-frame formula (spec.md §9 open question 3 prefers this over the
/// floor-based approximation).
pub fn parse_scc_dropframe(s: &str) -> Option<i64> {
    let s = s.trim();
    let (hms, frame) = s.rsplit_once(';')?;
    let parts: Vec<&str> = hms.split(':').collect();
    if parts.len() != 3 {
        return None;
    }
    let h: i64 = parts[0].parse().ok()?;
    let m: i64 = parts[1].parse().ok()?;
    let s_: i64 = parts[2].parse().ok()?;
    let f: i64 = frame.parse().ok()?;

    // Strict SMPTE drop-frame: 2 frames dropped per minute except every 10th.
    const FPS: i64 = 30;
    let total_minutes = h * 60 + m;
    let dropped = 2 * (total_minutes - total_minutes / 10);
    let frame_number = FPS * 3600 * h + FPS * 60 * m + FPS * s_ + f - dropped;
    Some((frame_number as f64 * 1000.0 / 29.97).round() as i64)
}

pub fn format_scc_dropframe(ms: i64) -> String {
    const FPS: f64 = 29.97;
    let total_frames = (ms as f64 * FPS / 1000.0).round() as i64;
    let drop_frames_per_min = 2i64;
    let frames_per_10min = 17982; // 10 * 60 * 30 - 9 * 2
    let d = total_frames / frames_per_10min;
    let m_frames = total_frames % frames_per_10min;
    let frame_number = total_frames
        + drop_frames_per_min * 9 * d
        + if m_frames > 1 {
            drop_frames_per_min * ((m_frames - 2) / 1798)
        } else {
            0
        };
    let f = frame_number % 30;
    let total_sec = frame_number / 30;
    let s = total_sec % 60;
    let total_min = total_sec / 60;
    let m = total_min % 60;
    let h = total_min / 60;
    format!("{:02}:{:02}:{:02};{:02}", h, m, s, f)
}

/// Parse VobSub `.idx` `HH:MM:SS:mmm` (colon before milliseconds).
pub fn parse_vobsub_idx(s: &str) -> Option<i64> {
    let s = s.trim();
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 4 {
        return None;
    }
    let h: i64 = parts[0].parse().ok()?;
    let m: i64 = parts[1].parse().ok()?;
    let sec: i64 = parts[2].parse().ok()?;
    let milli: i64 = parts[3].parse().ok()?;
    Some(h * 3_600_000 + m * 60_000 + sec * 1000 + milli)
}

pub fn format_vobsub_idx(ms: i64) -> String {
    let ms = ms.max(0);
    let (h, m, s, milli) = split_ms(ms, 1);
    format!("{:02}:{:02}:{:02}:{:03}", h, m, s, milli)
}

/// Parse `HH:MM:SS.cc` (RealText, centiseconds).
pub fn parse_realtext(s: &str) -> Option<i64> {
    let s = s.trim();
    let (h, m, sec, frac) = split_hms_frac(s, ':', '.')?;
    Some(hms_to_ms(h, m, sec, frac))
}

pub fn format_realtext(ms: i64) -> String {
    format_ass(ms)
}

// --- shared helpers -------------------------------------------------------

fn parse_fraction(frac_str: &str) -> Option<i64> {
    if frac_str.is_empty() {
        return Some(0);
    }
    let frac_val: i64 = frac_str.parse().ok()?;
    Some(match frac_str.len() {
        1 => frac_val * 100,
        2 => frac_val * 10,
        3 => frac_val,
        n if n > 3 => frac_val / 10i64.pow((n - 3) as u32),
        _ => 0,
    })
}

fn split_hms_frac(s: &str, hms_sep: char, frac_sep: char) -> Option<(i64, i64, i64, i64)> {
    let parts: Vec<&str> = s.split(hms_sep).collect();
    if parts.len() != 3 {
        return None;
    }
    let h: i64 = parts[0].parse().ok()?;
    let m: i64 = parts[1].parse().ok()?;
    let sec_parts: Vec<&str> = parts[2].splitn(2, frac_sep).collect();
    let sec: i64 = sec_parts.first()?.parse().ok()?;
    let frac = parse_fraction(sec_parts.get(1).copied().unwrap_or("0"))?;
    Some((h, m, sec, frac))
}

fn split_hms_frac_sep(s: &str, hms_sep: char, frac_sep: char) -> Option<(i64, i64, i64, i64)> {
    split_hms_frac(s, hms_sep, frac_sep)
}

fn hms_to_ms(h: i64, m: i64, s: i64, frac_ms: i64) -> i64 {
    h * 3_600_000 + m * 60_000 + s * 1000 + frac_ms
}

/// Split milliseconds into `(hours, minutes, seconds, fraction)` where
/// `fraction` is in units of `1000/divisor` ms (`divisor=1` -> ms,
/// `divisor=10` -> centiseconds).
fn split_ms(ms: i64, divisor: i64) -> (i64, i64, i64, i64) {
    let total_sec = ms / 1000;
    let rem_ms = ms % 1000;
    let frac = rem_ms / divisor;
    let s = total_sec % 60;
    let total_min = total_sec / 60;
    let m = total_min % 60;
    let h = total_min / 60;
    (h, m, s, frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ass_parses_and_formats() {
        assert_eq!(parse_ass("0:00:01.50"), Some(1500));
        assert_eq!(format_ass(1500), "0:00:01.50");
        assert_eq!(parse_ass("1:02:03.04"), Some(3_723_040));
    }

    #[test]
    fn srt_is_fixed_width() {
        assert_eq!(parse_srt("00:00:01,000"), Some(1000));
        assert_eq!(format_srt(1000), "00:00:01,000");
    }

    #[test]
    fn vtt_accepts_short_and_long_forms() {
        assert_eq!(parse_vtt("00:01.000"), Some(1000));
        assert_eq!(parse_vtt("00:00:01.000"), Some(1000));
    }

    #[test]
    fn lrc_centiseconds_and_millis() {
        assert_eq!(parse_lrc("00:12.50"), Some(12500));
        assert_eq!(parse_lrc("00:12.500"), Some(12500));
    }

    #[test]
    fn microdvd_frame_roundtrip() {
        let ms = frame_to_ms(30, 30.0);
        assert_eq!(ms, 1000);
        assert_eq!(ms_to_frame(ms, 30.0), 30);
    }

    #[test]
    fn cap_ntsc_scenario_d() {
        // 00:00:01:15 at NTSC (29.97fps) -> round(1000 + 15/29.97*1000)
        let ms = parse_frame_timecode("00:00:01:15", 29.97).unwrap();
        assert_eq!(ms, 1501);
        let ms_end = parse_frame_timecode("00:00:02:00", 29.97).unwrap();
        assert_eq!(ms_end, 2000);
    }

    #[test]
    fn scc_dropframe_multiples_of_ten_minutes_round_trip() {
        let s = "00:10:00;00";
        let ms = parse_scc_dropframe(s).unwrap();
        let back = format_scc_dropframe(ms);
        assert_eq!(back, s);
    }

    #[test]
    fn ttml_offset_forms() {
        assert_eq!(parse_ttml("1500ms", 30.0), Some(1500));
        assert_eq!(parse_ttml("1.5s", 30.0), Some(1500));
    }

    #[test]
    fn vobsub_idx_colon_before_ms() {
        assert_eq!(parse_vobsub_idx("00:00:01:500"), Some(1500));
        assert_eq!(format_vobsub_idx(1500), "00:00:01:500");
    }
}
