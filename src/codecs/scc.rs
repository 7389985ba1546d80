//! Scenarist SCC: `Scenarist_SCC V1.0` header, then `TC\tHEX HEX ...`
//! blocks decoded via the CEA-608 character/control tables
//! (spec.md §4.3.10).

use crate::binary::cea608::{classify_control, standard_char, ControlCode};
use crate::codecs::{handle_error, ParseOptions, ParseResult, SerializeOptions};
use crate::error::{ErrorCode, SubforgeError};
use crate::model::{Document, Event};
use crate::primitives::encoding::decode;
use crate::primitives::timecode::{format_scc_dropframe, parse_scc_dropframe};

pub fn parse(bytes: &[u8], opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
    let text = decode(bytes, opts.encoding);
    if !text.trim_start().starts_with("Scenarist_SCC") {
        return Err(SubforgeError::at_line(ErrorCode::InvalidFormat, 1, "missing Scenarist_SCC header"));
    }
    let mut doc = Document::new();
    let mut errors = Vec::new();

    let mut current: Option<(i64, String)> = None;
    for (i, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with("Scenarist_SCC") {
            continue;
        }
        let Some((tc, hex)) = line.split_once('\t').or_else(|| line.split_once("  ")) else {
            let err = SubforgeError::at_line(ErrorCode::MalformedEvent, i + 1, "missing timecode/hex separator");
            handle_error(opts, &mut errors, err)?;
            continue;
        };
        let Some(ms) = parse_scc_dropframe(tc.trim()) else {
            let err = SubforgeError::at_line(ErrorCode::InvalidTimestamp, i + 1, "malformed SCC drop-frame timecode");
            handle_error(opts, &mut errors, err)?;
            continue;
        };

        let pairs = parse_hex_pairs(hex.trim());
        let mut text_buf = String::new();
        let mut pending_control = None;
        for (b1, b2) in &pairs {
            let stripped1 = b1 & 0x7F;
            let stripped2 = b2 & 0x7F;
            if (0x10..=0x1F).contains(&stripped1) {
                let control = classify_control(stripped1, stripped2);
                match control {
                    ControlCode::EraseDisplayedMemory | ControlCode::EndOfCaption => {
                        if let Some((start, body)) = current.take() {
                            if !body.trim().is_empty() {
                                doc.add_event(Event::new(0, start, ms, body.trim().to_string()));
                            }
                        }
                        pending_control = Some(ms);
                    }
                    ControlCode::CarriageReturn => text_buf.push('\n'),
                    _ => {}
                }
                continue;
            }
            if stripped1 >= 0x20 {
                text_buf.push(standard_char(stripped1));
            }
            if stripped2 >= 0x20 {
                text_buf.push(standard_char(stripped2));
            }
        }

        if !text_buf.trim().is_empty() {
            match &mut current {
                Some((_, body)) => body.push_str(&text_buf),
                None => current = Some((ms, text_buf)),
            }
        } else if let Some(start) = pending_control {
            let _ = start;
        }
    }
    if let Some((start, body)) = current {
        if !body.trim().is_empty() {
            doc.add_event(Event::new(0, start, start + 2000, body.trim().to_string()));
        }
    }

    let mut result = ParseResult::ok(doc);
    result.errors = errors;
    Ok(result)
}

fn parse_hex_pairs(s: &str) -> Vec<(u8, u8)> {
    let mut pairs = Vec::new();
    for token in s.split_whitespace() {
        if token.len() == 4 {
            if let (Ok(b1), Ok(b2)) = (u8::from_str_radix(&token[0..2], 16), u8::from_str_radix(&token[2..4], 16)) {
                pairs.push((b1, b2));
            }
        }
    }
    pairs
}

pub fn serialize(doc: &Document, _opts: &SerializeOptions) -> String {
    let mut out = String::from("Scenarist_SCC V1.0\n\n");
    for event in &doc.events {
        out.push_str(&format_scc_dropframe(event.start_ms));
        out.push('\t');
        out.push_str("9420 9420 ");
        for ch in event.effective_text().chars() {
            if let Some(code) = reverse_standard_char(ch) {
                out.push_str(&format!("{:02x}{:02x} ", code, 0x80));
            }
        }
        out.push_str("942f 942f\n\n");
    }
    out
}

/// Inverse of [`standard_char`]. Ten ASCII punctuation marks (`' * \ ^ _ \` { | } ~`)
/// have no code point of their own in the standard CEA-608 charset — their
/// codes were reassigned to accented letters and symbols — so they have no
/// inverse and are dropped rather than mis-encoded as the wrong glyph.
fn reverse_standard_char(ch: char) -> Option<u8> {
    match ch {
        '\u{2019}' => Some(0x27),
        '\u{00E1}' => Some(0x2A),
        '\u{00E9}' => Some(0x5C),
        '\u{00ED}' => Some(0x5E),
        '\u{00F3}' => Some(0x5F),
        '\u{00FA}' => Some(0x60),
        '\u{00E7}' => Some(0x7B),
        '\u{00F7}' => Some(0x7C),
        '\u{00D1}' => Some(0x7D),
        '\u{00F1}' => Some(0x7E),
        '\u{2588}' => Some(0x7F),
        '\'' | '*' | '\\' | '^' | '_' | '`' | '{' | '|' | '}' | '~' => None,
        c if (0x20..=0x7E).contains(&(c as u32)) => Some(c as u8),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_scenarist_header() {
        let err = parse(b"not an scc file", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
    }

    #[test]
    fn decodes_simple_caption_text() {
        // 9420=RCL, 9420 (dup), then "Hi" as bytes 0x48 0x69 each +0x80 parity bit
        // set for realism but we only check the low 7 bits, then EOC.
        let input = "Scenarist_SCC V1.0\n\n00:00:01;00\t9420 9420 c869 942f 942f\n\n";
        let result = parse(input.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(result.document.events.len(), 1);
        assert_eq!(result.document.events[0].text, "Hi");
    }

    #[test]
    fn serialize_then_parse_round_trips_special_chars() {
        let mut doc = Document::new();
        doc.add_event(Event::new(0, 1000, 4000, "Hi \u{2019}caf\u{00E9}\u{2588}".to_string()));

        let out = serialize(&doc, &SerializeOptions::default());
        let result = parse(out.as_bytes(), &ParseOptions::default()).unwrap();

        assert_eq!(result.document.events.len(), 1);
        assert_eq!(result.document.events[0].text, "Hi \u{2019}caf\u{00E9}\u{2588}");
    }

    #[test]
    fn reverse_standard_char_has_no_inverse_for_reassigned_ascii_punctuation() {
        assert_eq!(reverse_standard_char('\''), None);
        assert_eq!(reverse_standard_char('*'), None);
        assert_eq!(reverse_standard_char('\u{2019}'), Some(0x27));
    }
}
