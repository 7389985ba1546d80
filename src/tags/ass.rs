//! ASS `{\tag}` inline override parsing and serialization.
//!
//! Produces/consumes an ordered `Vec<TextSegment>` from ASS override-block
//! text. Each `{...}` block updates a running `InlineStyle`/effect state
//! that applies to the plain-text run following it, per spec.md §4.3.1 and
//! §9 ("Tag parsing").

use crate::model::{ClipRect, Effect, InlineStyle, KaraokeMode, TextSegment};
use crate::primitives::color::AbgrColor;

/// Parse ASS text (override blocks + plain runs) into segments.
pub fn parse_tags(text: &str) -> Vec<TextSegment> {
    let mut segments = Vec::new();
    let mut style = InlineStyle::default();
    let mut pending_effects: Vec<Effect> = Vec::new();
    let mut plain = String::new();

    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            if !plain.is_empty() {
                segments.push(TextSegment {
                    text: std::mem::take(&mut plain),
                    style: if style.is_empty() { None } else { Some(style.clone()) },
                    effects: std::mem::take(&mut pending_effects),
                });
            }
            if let Some(end) = text[i..].find('}') {
                let block = &text[i + 1..i + end];
                apply_override_block(block, &mut style, &mut pending_effects);
                i += end + 1;
            } else {
                // Unclosed tag: treat the rest as the block, per spec's
                // tolerant-recovery guidance (caller may still report
                // UNCLOSED_TAG via the codec layer).
                let block = &text[i + 1..];
                apply_override_block(block, &mut style, &mut pending_effects);
                i = bytes.len();
            }
            continue;
        }
        if text[i..].starts_with("\\N") || text[i..].starts_with("\\n") {
            plain.push('\n');
            i += 2;
            continue;
        }
        if text[i..].starts_with("\\h") {
            plain.push('\u{00A0}');
            i += 2;
            continue;
        }
        let ch = text[i..].chars().next().unwrap();
        plain.push(ch);
        i += ch.len_utf8();
    }

    if !plain.is_empty() || segments.is_empty() {
        segments.push(TextSegment {
            text: plain,
            style: if style.is_empty() { None } else { Some(style) },
            effects: pending_effects,
        });
    }
    segments
}

/// Apply every `\tag` inside one `{...}` block to the running style/effect
/// state.
fn apply_override_block(block: &str, style: &mut InlineStyle, effects: &mut Vec<Effect>) {
    for tag in split_tags(block) {
        apply_tag(&tag, style, effects);
    }
}

/// Split a `{...}` block's interior into individual `\tag(...)` chunks,
/// respecting nested parens (needed for `\t(...)`).
fn split_tags(block: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for ch in block.chars() {
        match ch {
            '\\' if depth == 0 && !current.is_empty() => {
                out.push(std::mem::take(&mut current));
                current.push(ch);
            }
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth -= 1;
                current.push(ch);
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn apply_tag(raw: &str, style: &mut InlineStyle, effects: &mut Vec<Effect>) {
    let raw = raw.trim();
    let Some(rest) = raw.strip_prefix('\\') else { return };
    let (name, arg) = split_name_arg(rest);

    match name {
        "b" => style.bold = Some(arg == "1"),
        "i" => style.italic = Some(arg == "1"),
        "u" => style.underline = Some(arg == "1"),
        "s" => style.strikeout = Some(arg == "1"),
        "fn" => style.font_name = Some(arg.to_string()),
        "fs" => style.font_size = arg.parse().ok(),
        "c" | "1c" => style.primary_color = AbgrColor::parse_ass(arg),
        "2c" => style.secondary_color = AbgrColor::parse_ass(arg),
        "3c" => style.outline_color = AbgrColor::parse_ass(arg),
        "4c" => style.back_color = AbgrColor::parse_ass(arg),
        "alpha" => {
            if let Some(c) = style.primary_color {
                style.primary_color = c.with_ass_alpha(arg);
            }
        }
        "1a" => {
            if let Some(c) = style.primary_color {
                style.primary_color = c.with_ass_alpha(arg);
            }
        }
        "2a" => {
            if let Some(c) = style.secondary_color {
                style.secondary_color = c.with_ass_alpha(arg);
            }
        }
        "3a" => {
            if let Some(c) = style.outline_color {
                style.outline_color = c.with_ass_alpha(arg);
            }
        }
        "4a" => {
            if let Some(c) = style.back_color {
                style.back_color = c.with_ass_alpha(arg);
            }
        }
        "bord" => {
            style.border = arg.parse().ok();
            if let Some(v) = style.border {
                effects.push(Effect::Border(v));
            }
        }
        "shad" => {
            style.shadow = arg.parse().ok();
            if let Some(v) = style.shadow {
                effects.push(Effect::Shadow(v));
            }
        }
        "blur" | "be" => {
            if let Ok(v) = arg.parse() {
                effects.push(Effect::Blur(v));
            }
        }
        "fscx" => style.scale_x = arg.parse().ok(),
        "fscy" => style.scale_y = arg.parse().ok(),
        "fsp" => style.spacing = arg.parse().ok(),
        "frx" => set_rotation(style, 0, arg),
        "fry" => set_rotation(style, 1, arg),
        "frz" | "fr" => set_rotation(style, 2, arg),
        "fax" | "fay" => {
            if let Ok(v) = arg.parse::<f64>() {
                let (x, y) = if name == "fax" { (v, 0.0) } else { (0.0, v) };
                effects.push(Effect::Shear { x, y });
            }
        }
        "pos" => style.pos = parse_xy(arg),
        "org" => style.org = parse_xy(arg),
        "an" => style.alignment = arg.parse().ok(),
        "a" => style.alignment = arg.parse::<i32>().ok().map(legacy_align_to_numpad),
        "q" => {}
        "r" => effects.push(Effect::Reset {
            style: if arg.is_empty() { None } else { Some(arg.to_string()) },
        }),
        "move" => effects.push(parse_move(arg)),
        "fad" => {
            let parts: Vec<&str> = arg.split(',').collect();
            if parts.len() == 2 {
                if let (Ok(a), Ok(b)) = (parts[0].trim().parse(), parts[1].trim().parse()) {
                    effects.push(Effect::Fade { in_ms: a, out_ms: b });
                }
            }
        }
        "fade" => {
            let p: Vec<&str> = arg.split(',').map(str::trim).collect();
            if p.len() == 7 {
                if let (Ok(a1), Ok(a2), Ok(a3), Ok(t1), Ok(t2), Ok(t3), Ok(t4)) = (
                    p[0].parse(),
                    p[1].parse(),
                    p[2].parse(),
                    p[3].parse(),
                    p[4].parse(),
                    p[5].parse(),
                    p[6].parse(),
                ) {
                    effects.push(Effect::FadeComplex { a1, a2, a3, t1, t2, t3, t4 });
                }
            }
        }
        "clip" => {
            if let Some(rect) = parse_clip(arg) {
                style.clip = Some(rect);
                effects.push(Effect::Clip(rect));
            }
        }
        "iclip" => {
            if let Some(rect) = parse_clip(arg) {
                effects.push(Effect::Clip(rect));
            }
        }
        "p" => {
            if let Ok(scale) = arg.parse::<i32>() {
                if scale > 0 {
                    style.drawing = Some(String::new());
                }
            }
        }
        "k" => push_karaoke(effects, arg, KaraokeMode::Fill),
        "kf" | "K" => push_karaoke(effects, arg, KaraokeMode::Outline),
        "ko" => push_karaoke(effects, arg, KaraokeMode::Swap),
        "t" => effects.push(parse_animate(arg)),
        _ => effects.push(Effect::Unknown {
            name: name.to_string(),
            raw: raw.to_string(),
        }),
    }
}

fn split_name_arg(rest: &str) -> (&str, &str) {
    if let Some(open) = rest.find('(') {
        if rest.ends_with(')') {
            return (&rest[..open], &rest[open + 1..rest.len() - 1]);
        }
    }
    let split_at = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    rest.split_at(split_at)
}

fn set_rotation(style: &mut InlineStyle, axis: usize, arg: &str) {
    let Ok(v) = arg.parse::<f64>() else { return };
    let mut rot = style.rotation.unwrap_or((0.0, 0.0, 0.0));
    match axis {
        0 => rot.0 = v,
        1 => rot.1 = v,
        _ => rot.2 = v,
    }
    style.rotation = Some(rot);
}

fn parse_xy(arg: &str) -> Option<(f64, f64)> {
    let parts: Vec<&str> = arg.split(',').collect();
    if parts.len() != 2 {
        return None;
    }
    Some((parts[0].trim().parse().ok()?, parts[1].trim().parse().ok()?))
}

fn parse_clip(arg: &str) -> Option<ClipRect> {
    let parts: Vec<f64> = arg.split(',').filter_map(|p| p.trim().parse().ok()).collect();
    if parts.len() == 4 {
        Some(ClipRect { x1: parts[0], y1: parts[1], x2: parts[2], y2: parts[3] })
    } else {
        None
    }
}

fn parse_move(arg: &str) -> Effect {
    let parts: Vec<&str> = arg.split(',').map(str::trim).collect();
    let f = |i: usize| parts.get(i).and_then(|p| p.parse::<f64>().ok()).unwrap_or(0.0);
    let t1 = parts.get(4).and_then(|p| p.parse::<u32>().ok());
    let t2 = parts.get(5).and_then(|p| p.parse::<u32>().ok());
    Effect::Move { x1: f(0), y1: f(1), x2: f(2), y2: f(3), t1, t2 }
}

fn push_karaoke(effects: &mut Vec<Effect>, arg: &str, mode: KaraokeMode) {
    if let Ok(cs) = arg.trim().parse::<u64>() {
        effects.push(Effect::Karaoke { duration_ms: cs * 10, mode });
    }
}

fn parse_animate(arg: &str) -> Effect {
    let parts: Vec<&str> = arg.splitn(4, ',').collect();
    match parts.len() {
        1 => Effect::Animate { t1: None, t2: None, accel: None, child_tags: parts[0].to_string() },
        2 => Effect::Animate {
            t1: parts[0].trim().parse().ok(),
            t2: None,
            accel: parts[1].trim().parse().ok(),
            child_tags: String::new(),
        },
        3 => Effect::Animate {
            t1: parts[0].trim().parse().ok(),
            t2: parts[1].trim().parse().ok(),
            accel: None,
            child_tags: parts[2].to_string(),
        },
        4 => Effect::Animate {
            t1: parts[0].trim().parse().ok(),
            t2: parts[1].trim().parse().ok(),
            accel: parts[2].trim().parse().ok(),
            child_tags: parts[3].to_string(),
        },
        _ => Effect::Animate { t1: None, t2: None, accel: None, child_tags: arg.to_string() },
    }
}

fn legacy_align_to_numpad(a: i32) -> u8 {
    crate::model::Style::ssa_alignment_to_numpad(match a {
        1 => 1,
        2 => 2,
        3 => 3,
        5 => 1,
        6 => 2,
        7 => 3,
        9 => 9,
        10 => 10,
        11 => 11,
        _ => 2,
    })
}

/// Serialize segments back to ASS override-block text.
pub fn serialize_tags(segments: &[TextSegment]) -> String {
    let mut out = String::new();
    let mut prev_style = InlineStyle::default();
    for seg in segments {
        let cur = seg.style.clone().unwrap_or_default();
        let mut block = String::new();
        emit_diff(&prev_style, &cur, &mut block);
        for effect in &seg.effects {
            emit_effect(effect, &mut block);
        }
        if !block.is_empty() {
            out.push('{');
            out.push_str(&block);
            out.push('}');
        }
        out.push_str(&seg.text.replace('\n', "\\N"));
        prev_style = cur;
    }
    out
}

fn emit_diff(prev: &InlineStyle, cur: &InlineStyle, out: &mut String) {
    if cur.bold.is_some() && cur.bold != prev.bold {
        out.push_str(&format!("\\b{}", if cur.bold == Some(true) { 1 } else { 0 }));
    }
    if cur.italic.is_some() && cur.italic != prev.italic {
        out.push_str(&format!("\\i{}", if cur.italic == Some(true) { 1 } else { 0 }));
    }
    if cur.underline.is_some() && cur.underline != prev.underline {
        out.push_str(&format!("\\u{}", if cur.underline == Some(true) { 1 } else { 0 }));
    }
    if cur.strikeout.is_some() && cur.strikeout != prev.strikeout {
        out.push_str(&format!("\\s{}", if cur.strikeout == Some(true) { 1 } else { 0 }));
    }
    if let Some(c) = cur.primary_color {
        if cur.primary_color != prev.primary_color {
            out.push_str(&format!("\\c{}", c.format_ass()));
        }
    }
    if let Some(fname) = &cur.font_name {
        if cur.font_name != prev.font_name {
            out.push_str(&format!("\\fn{}", fname));
        }
    }
    if let Some(size) = cur.font_size {
        if cur.font_size != prev.font_size {
            out.push_str(&format!("\\fs{}", size));
        }
    }
    if let Some((x, y)) = cur.pos {
        if cur.pos != prev.pos {
            out.push_str(&format!("\\pos({},{})", x, y));
        }
    }
    if let Some(a) = cur.alignment {
        if cur.alignment != prev.alignment {
            out.push_str(&format!("\\an{}", a));
        }
    }
}

fn emit_effect(effect: &Effect, out: &mut String) {
    match effect {
        Effect::Karaoke { duration_ms, mode } => {
            let tag = match mode {
                KaraokeMode::Fill => "\\k",
                KaraokeMode::Outline => "\\kf",
                KaraokeMode::Swap => "\\ko",
            };
            out.push_str(&format!("{}{}", tag, duration_ms / 10));
        }
        Effect::Fade { in_ms, out_ms } => out.push_str(&format!("\\fad({},{})", in_ms, out_ms)),
        Effect::Move { x1, y1, x2, y2, t1, t2 } => match (t1, t2) {
            (Some(a), Some(b)) => out.push_str(&format!("\\move({},{},{},{},{},{})", x1, y1, x2, y2, a, b)),
            _ => out.push_str(&format!("\\move({},{},{},{})", x1, y1, x2, y2)),
        },
        Effect::Clip(rect) => {
            out.push_str(&format!("\\clip({},{},{},{})", rect.x1, rect.y1, rect.x2, rect.y2))
        }
        Effect::Reset { style } => {
            out.push_str("\\r");
            if let Some(name) = style {
                out.push_str(name);
            }
        }
        Effect::Animate { t1, t2, accel, child_tags } => {
            out.push_str("\\t(");
            let mut parts = Vec::new();
            if let Some(t1) = t1 {
                parts.push(t1.to_string());
            }
            if let Some(t2) = t2 {
                parts.push(t2.to_string());
            }
            if let Some(a) = accel {
                parts.push(a.to_string());
            }
            for p in &parts {
                out.push_str(p);
                out.push(',');
            }
            out.push_str(child_tags);
            out.push(')');
        }
        Effect::Unknown { raw, .. } => out.push_str(raw),
        _ => {}
    }
}

/// Parse an ASS UU-encoded attachment blob concatenated from 80-char
/// continuation lines (fonts/graphics sections).
pub fn decode_uu_lines(lines: &[&str]) -> Vec<u8> {
    let joined: String = lines.iter().flat_map(|l| l.chars()).collect();
    // ASS attachments use a variant of uuencoding where each printable
    // byte is offset by 33 ('!'); 4 encoded chars -> 3 decoded bytes.
    let chars: Vec<u8> = joined
        .bytes()
        .filter(|&b| b >= 33)
        .map(|b| b.wrapping_sub(33))
        .collect();
    let mut out = Vec::new();
    for chunk in chars.chunks(4) {
        if chunk.len() < 2 {
            break;
        }
        let mut buf = [0u8; 4];
        buf[..chunk.len()].copy_from_slice(chunk);
        let b0 = (buf[0] << 2) | (buf[1] >> 4);
        out.push(b0);
        if chunk.len() >= 3 {
            let b1 = (buf[1] << 4) | (buf[2] >> 2);
            out.push(b1);
        }
        if chunk.len() == 4 {
            let b2 = (buf[2] << 6) | buf[3];
            out.push(b2);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_with_no_tags() {
        let segs = parse_tags("hello world");
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].text, "hello world");
        assert!(segs[0].style.is_none());
    }

    #[test]
    fn bold_italic_toggle_segments() {
        let segs = parse_tags("{\\b1}bold{\\b0}plain");
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].text, "bold");
        assert_eq!(segs[0].style.as_ref().unwrap().bold, Some(true));
        assert_eq!(segs[1].text, "plain");
        assert_eq!(segs[1].style.as_ref().unwrap().bold, Some(false));
    }

    #[test]
    fn newline_tag_becomes_literal_newline() {
        let segs = parse_tags("line1\\Nline2");
        assert_eq!(segs[0].text, "line1\nline2");
    }

    #[test]
    fn unknown_tag_preserved() {
        let segs = parse_tags("{\\xyz42}text");
        assert_eq!(segs[0].effects.len(), 1);
        assert!(matches!(&segs[0].effects[0], Effect::Unknown { name, .. } if name == "xyz"));
    }

    #[test]
    fn karaoke_duration_in_centiseconds_times_ten() {
        let segs = parse_tags("{\\k50}Hi");
        assert!(matches!(segs[0].effects[0], Effect::Karaoke { duration_ms: 500, .. }));
    }

    #[test]
    fn animate_transition_captures_child_tags() {
        let segs = parse_tags("{\\t(0,500,\\fscx150)}grow");
        match &segs[0].effects[0] {
            Effect::Animate { t1, t2, child_tags, .. } => {
                assert_eq!(*t1, Some(0));
                assert_eq!(*t2, Some(500));
                assert!(child_tags.contains("fscx150"));
            }
            other => panic!("expected animate effect, got {other:?}"),
        }
    }

    #[test]
    fn pos_tag_sets_absolute_position() {
        let segs = parse_tags("{\\pos(100,200)}positioned");
        assert_eq!(segs[0].style.as_ref().unwrap().pos, Some((100.0, 200.0)));
    }
}
