//! LRC lyric files: `[MM:SS.xx]text` lines, metadata tags, and enhanced
//! per-word karaoke timing via `<MM:SS.xx>` (spec.md §4.3.6).

use crate::codecs::{ParseOptions, ParseResult, SerializeOptions};
use crate::error::SubforgeError;
use crate::model::{Document, Effect, Event, KaraokeMode, TextSegment};
use crate::primitives::encoding::decode;
use crate::primitives::timecode::{format_lrc, parse_lrc};

pub fn parse(bytes: &[u8], opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
    let text = decode(bytes, opts.encoding);
    let mut doc = Document::new();

    for raw_line in text.lines() {
        let line = raw_line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let Some(first_close) = line.find(']') else { continue };
        let first_tag = &line[1..first_close];
        let is_timestamp = first_tag.split(':').next().map(|p| p.chars().all(|c| c.is_ascii_digit())).unwrap_or(false)
            && first_tag.starts_with(|c: char| c.is_ascii_digit());

        if !is_timestamp {
            // Metadata line, e.g. [ti:Title], [offset:123] — preserved in script_info.custom.
            if let Some((key, value)) = first_tag.split_once(':') {
                doc.script_info.custom.insert(key.trim().to_lowercase(), value.trim().to_string());
            }
            continue;
        }

        // Collect every leading `[MM:SS.xx]` timestamp on the line.
        let mut timestamps = Vec::new();
        let mut rest = line;
        while let Some(stripped) = rest.strip_prefix('[') {
            let Some(end) = stripped.find(']') else { break };
            let tag = &stripped[..end];
            if let Some(ms) = parse_lrc(tag) {
                timestamps.push(ms);
                rest = &stripped[end + 1..];
            } else {
                break;
            }
        }
        if timestamps.is_empty() {
            continue;
        }

        let (segments, dirty) = parse_enhanced(rest);
        for start_ms in &timestamps {
            let mut event = Event::new(0, *start_ms, *start_ms, rest.to_string());
            if dirty {
                event.set_segments(segments.clone());
            }
            doc.add_event(event);
        }
    }

    // End-time pass: adjacent plain lyric events get their end time set to
    // the next event's start.
    doc.events.sort_by_key(|e| e.start_ms);
    let starts: Vec<i64> = doc.events.iter().map(|e| e.start_ms).collect();
    for i in 0..doc.events.len() {
        if i + 1 < starts.len() {
            doc.events[i].end_ms = starts[i + 1];
        } else {
            let karaoke_end = doc.events[i].start_ms
                + doc.events[i]
                    .segments
                    .iter()
                    .flat_map(|s| s.effects.iter())
                    .filter_map(|e| if let Effect::Karaoke { duration_ms, .. } = e { Some(*duration_ms as i64) } else { None })
                    .sum::<i64>();
            doc.events[i].end_ms = karaoke_end.max(doc.events[i].start_ms);
        }
    }

    Ok(ParseResult::ok(doc))
}

/// Parse enhanced LRC `<MM:SS.xx>word` runs into karaoke segments. Returns
/// `(segments, true)` when at least one `<...>` marker was found, else
/// `(vec![], false)`.
fn parse_enhanced(text: &str) -> (Vec<TextSegment>, bool) {
    if !text.contains('<') {
        return (Vec::new(), false);
    }
    let mut markers = Vec::new();
    let mut rest = text;
    let mut offset = 0usize;
    while let Some(start) = rest[offset..].find('<') {
        let abs = offset + start;
        let Some(end) = rest[abs..].find('>') else { break };
        let tag = &rest[abs + 1..abs + end];
        if let Some(ms) = parse_lrc(tag) {
            markers.push((abs, abs + end + 1, ms));
        }
        offset = abs + end + 1;
    }
    if markers.is_empty() {
        return (Vec::new(), false);
    }

    let mut segments = Vec::new();
    for (i, &(_, word_start, ms)) in markers.iter().enumerate() {
        let word_end = markers.get(i + 1).map(|m| m.0).unwrap_or(rest.len());
        let word = &rest[word_start..word_end];
        let duration = markers.get(i + 1).map(|m| m.2 - ms).unwrap_or(0).max(0) as u64;
        segments.push(TextSegment {
            text: word.to_string(),
            style: None,
            effects: vec![Effect::Karaoke { duration_ms: duration, mode: KaraokeMode::Fill }],
        });
    }
    (segments, true)
}

pub fn serialize(doc: &Document, opts: &SerializeOptions) -> String {
    let mut out = String::new();
    for (key, value) in &doc.script_info.custom {
        out.push_str(&format!("[{}:{}]\n", key, value));
    }
    for event in &doc.events {
        out.push('[');
        out.push_str(&format_lrc(event.start_ms));
        out.push(']');
        if opts.use_centiseconds && event.dirty {
            let mut cursor = event.start_ms;
            for seg in &event.segments {
                out.push('<');
                out.push_str(&format_lrc(cursor));
                out.push('>');
                out.push_str(&seg.text);
                if let Some(Effect::Karaoke { duration_ms, .. }) =
                    seg.effects.iter().find(|e| matches!(e, Effect::Karaoke { .. }))
                {
                    cursor += *duration_ms as i64;
                }
            }
        } else {
            out.push_str(&event.text);
        }
        out.push('\n');
    }
    out
}
