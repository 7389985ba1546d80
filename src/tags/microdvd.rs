//! MicroDVD `{tag:value}` inline markup: `{y:...}`, `{c:$BBGGRR}`, `{f:...}`,
//! `{s:...}`.

use crate::model::{InlineStyle, TextSegment};
use crate::primitives::color::AbgrColor;

pub fn parse_microdvd_tags(text: &str) -> Vec<TextSegment> {
    let mut style = InlineStyle::default();
    let mut rest = text;
    while let Some(stripped) = rest.strip_prefix('{') {
        let Some(end) = stripped.find('}') else { break };
        let block = &stripped[..end];
        apply_block(block, &mut style);
        rest = &stripped[end + 1..];
    }
    vec![TextSegment {
        text: rest.replace('|', "\n"),
        style: if style.is_empty() { None } else { Some(style) },
        effects: Vec::new(),
    }]
}

fn apply_block(block: &str, style: &mut InlineStyle) {
    let Some((key, value)) = block.split_once(':') else { return };
    match key.to_ascii_lowercase().as_str() {
        "y" => {
            for flag in value.split(',') {
                match flag.trim().to_ascii_lowercase().as_str() {
                    "b" => style.bold = Some(true),
                    "i" => style.italic = Some(true),
                    "u" => style.underline = Some(true),
                    "s" => style.strikeout = Some(true),
                    _ => {}
                }
            }
        }
        "c" => {
            let value = value.trim_start_matches('$');
            if let Ok(bgr) = u32::from_str_radix(value, 16) {
                let b = (bgr >> 16) as u8;
                let g = (bgr >> 8) as u8;
                let r = bgr as u8;
                style.primary_color = Some(AbgrColor::from_rgb(r, g, b));
            }
        }
        "f" => style.font_name = Some(value.to_string()),
        "s" => style.font_size = value.trim().parse().ok(),
        _ => {}
    }
}

pub fn serialize_microdvd_tags(segments: &[TextSegment]) -> String {
    let mut out = String::new();
    for (i, seg) in segments.iter().enumerate() {
        if i > 0 {
            out.push('|');
        }
        if let Some(style) = &seg.style {
            let mut flags = Vec::new();
            if style.bold == Some(true) {
                flags.push("b");
            }
            if style.italic == Some(true) {
                flags.push("i");
            }
            if style.underline == Some(true) {
                flags.push("u");
            }
            if !flags.is_empty() {
                out.push_str(&format!("{{y:{}}}", flags.join(",")));
            }
            if let Some(c) = style.primary_color {
                out.push_str(&format!("{{c:${:02X}{:02X}{:02X}}}", c.b(), c.g(), c.r()));
            }
        }
        out.push_str(&seg.text.replace('\n', "|"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_italic_flags_parsed() {
        let segs = parse_microdvd_tags("{y:b,i}Hello");
        let style = segs[0].style.as_ref().unwrap();
        assert_eq!(style.bold, Some(true));
        assert_eq!(style.italic, Some(true));
        assert_eq!(segs[0].text, "Hello");
    }

    #[test]
    fn color_tag_bgr_order() {
        let segs = parse_microdvd_tags("{c:$0000FF}Red");
        assert_eq!(segs[0].style.as_ref().unwrap().primary_color, Some(AbgrColor::from_rgb(255, 0, 0)));
    }

    #[test]
    fn pipe_is_line_break() {
        let segs = parse_microdvd_tags("line1|line2");
        assert_eq!(segs[0].text, "line1\nline2");
    }
}
