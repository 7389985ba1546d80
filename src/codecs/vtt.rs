//! WebVTT: `WEBVTT` header, optional `NOTE`/`STYLE`/`REGION` blocks, then
//! cues (spec.md §4.3.3).

use crate::codecs::{handle_error, ParseOptions, ParseResult, SerializeOptions};
use crate::error::{ErrorCode, SubforgeError};
use crate::model::{Document, Event, ScrollMode, VttRegion};
use crate::primitives::encoding::decode;
use crate::primitives::timecode::{format_vtt, parse_vtt};
use crate::tags::html::{parse_html_tags, serialize_html_tags};

pub fn parse(bytes: &[u8], opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
    let text = decode(bytes, opts.encoding);
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut doc = Document::new();
    let mut errors = Vec::new();
    let warnings = Vec::new();

    if !normalized.trim_start().starts_with("WEBVTT") {
        let err = SubforgeError::at_line(ErrorCode::InvalidFormat, 1, "missing WEBVTT header");
        return Err(err);
    }

    let body = normalized.splitn(2, '\n').nth(1).unwrap_or("");
    let mut line_no = 2usize;
    for block in body.split("\n\n") {
        let block = block.trim_matches('\n');
        let start_line = line_no;
        line_no += block.lines().count() + 1;
        if block.trim().is_empty() {
            continue;
        }
        let mut lines = block.lines().peekable();
        let first = *lines.peek().unwrap_or(&"");
        if first.starts_with("NOTE") {
            continue;
        }
        if first.starts_with("STYLE") {
            continue;
        }
        if first.starts_with("REGION") {
            lines.next();
            doc.regions.push(parse_region(lines));
            continue;
        }

        // Optional cue identifier line before the timing line.
        let mut first_line = lines.next().unwrap_or("");
        if !first_line.contains("-->") {
            first_line = match lines.next() {
                Some(l) => l,
                None => continue,
            };
        }

        let Some((start_str, rest)) = first_line.split_once("-->") else {
            let err = SubforgeError::at_line(ErrorCode::MalformedEvent, start_line, "missing --> timing line");
            handle_error(opts, &mut errors, err)?;
            continue;
        };
        let end_str = rest.split_whitespace().next().unwrap_or("");
        let (Some(start_ms), Some(end_ms)) = (parse_vtt(start_str.trim()), parse_vtt(end_str)) else {
            let err = SubforgeError::at_line(ErrorCode::InvalidTimestamp, start_line, "malformed VTT timestamp")
                .with_raw(first_line.to_string());
            handle_error(opts, &mut errors, err)?;
            continue;
        };

        let text: String = lines.collect::<Vec<_>>().join("\n");
        doc.add_event(Event::new(0, start_ms, end_ms, text));
    }

    let mut result = ParseResult::ok(doc);
    result.errors = errors;
    result.warnings = warnings;
    Ok(result)
}

fn parse_region<'a>(lines: impl Iterator<Item = &'a str>) -> VttRegion {
    let mut region = VttRegion::default();
    for line in lines {
        if let Some((key, value)) = line.split_once(':') {
            match key.trim() {
                "id" => region.id = value.trim().to_string(),
                "width" => region.width = value.trim().to_string(),
                "lines" => region.lines = value.trim().parse().unwrap_or(3),
                "regionanchor" => region.region_anchor = parse_anchor(value),
                "viewportanchor" => region.viewport_anchor = parse_anchor(value),
                "scroll" => {
                    region.scroll = if value.trim() == "up" { ScrollMode::Up } else { ScrollMode::None };
                }
                _ => {}
            }
        }
    }
    region
}

fn parse_anchor(s: &str) -> (f64, f64) {
    let parts: Vec<&str> = s.trim().split(',').collect();
    if parts.len() == 2 {
        (parts[0].parse().unwrap_or(0.0), parts[1].parse().unwrap_or(0.0))
    } else {
        (0.0, 100.0)
    }
}

pub fn serialize(doc: &Document, _opts: &SerializeOptions) -> String {
    let mut out = String::from("WEBVTT\n\n");
    for region in &doc.regions {
        out.push_str("REGION\n");
        out.push_str(&format!("id:{}\n", region.id));
        out.push_str(&format!("width:{}\n", region.width));
        out.push_str(&format!("lines:{}\n", region.lines));
        out.push_str(&format!("regionanchor:{},{}\n", region.region_anchor.0, region.region_anchor.1));
        out.push_str(&format!("viewportanchor:{},{}\n", region.viewport_anchor.0, region.viewport_anchor.1));
        if region.scroll == ScrollMode::Up {
            out.push_str("scroll:up\n");
        }
        out.push('\n');
    }
    for event in &doc.events {
        out.push_str(&format_vtt(event.start_ms));
        out.push_str(" --> ");
        out.push_str(&format_vtt(event.end_ms));
        out.push('\n');
        if event.dirty {
            out.push_str(&serialize_html_tags(&event.segments));
        } else {
            out.push_str(&event.text);
        }
        out.push_str("\n\n");
    }
    out
}

pub fn lazy_segments(event_text: &str) -> Vec<crate::model::TextSegment> {
    parse_html_tags(event_text, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_b_mm_ss_form() {
        let input = "WEBVTT\n\n00:01.000 --> 00:05.000\nHi";
        let result = parse(input.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(result.document.events.len(), 1);
        assert_eq!(result.document.events[0].start_ms, 1000);
        assert_eq!(result.document.events[0].end_ms, 5000);
        assert_eq!(result.document.events[0].text, "Hi");
    }

    #[test]
    fn missing_header_is_invalid_format() {
        let err = parse(b"not a vtt file", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
    }

    #[test]
    fn cue_identifier_line_is_optional() {
        let input = "WEBVTT\n\ncue-1\n00:00:01.000 --> 00:00:02.000\nWith id";
        let result = parse(input.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(result.document.events[0].text, "With id");
    }

    #[test]
    fn note_blocks_are_skipped() {
        let input = "WEBVTT\n\nNOTE this is a comment\n\n00:00:01.000 --> 00:00:02.000\nReal cue";
        let result = parse(input.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(result.document.events.len(), 1);
    }

    #[test]
    fn region_block_round_trips() {
        let input = "WEBVTT\n\nREGION\nid:fred\nwidth:40%\nlines:3\nregionanchor:0,100\nviewportanchor:10,90\nscroll:up\n\n00:00:01.000 --> 00:00:02.000\nHi";
        let result = parse(input.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(result.document.regions.len(), 1);
        assert_eq!(result.document.regions[0].id, "fred");
        assert_eq!(result.document.regions[0].scroll, ScrollMode::Up);
    }
}
