//! Shared HTML-like inline markup for SRT, WebVTT and SAMI: `<b>`, `<i>`,
//! `<u>`, `<font color=...>`, WebVTT `<c.class>` and `<v Speaker>`.

use crate::model::{InlineStyle, TextSegment};
use crate::primitives::color::AbgrColor;

/// Parse a run of HTML-like markup into segments. `vtt_extensions` enables
/// `<c.class>` and `<v Speaker>` (WebVTT-only; SRT/SAMI callers pass
/// `false`).
pub fn parse_html_tags(text: &str, vtt_extensions: bool) -> Vec<TextSegment> {
    let mut segments = Vec::new();
    let mut stack: Vec<InlineStyle> = vec![InlineStyle::default()];
    let mut voice: Option<String> = None;
    let mut plain = String::new();

    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'<' {
            if let Some(end) = text[i..].find('>') {
                let tag = &text[i + 1..i + end];
                flush(&mut segments, &mut plain, stack.last().unwrap(), &voice);
                apply_html_tag(tag, &mut stack, &mut voice, vtt_extensions);
                i += end + 1;
                continue;
            }
        }
        if text[i..].starts_with("&amp;") {
            plain.push('&');
            i += 5;
            continue;
        }
        if text[i..].starts_with("&lt;") {
            plain.push('<');
            i += 4;
            continue;
        }
        if text[i..].starts_with("&gt;") {
            plain.push('>');
            i += 4;
            continue;
        }
        let ch = text[i..].chars().next().unwrap();
        plain.push(ch);
        i += ch.len_utf8();
    }
    flush(&mut segments, &mut plain, stack.last().unwrap(), &voice);

    if segments.is_empty() {
        segments.push(TextSegment::plain(String::new()));
    }
    segments
}

fn flush(segments: &mut Vec<TextSegment>, plain: &mut String, style: &InlineStyle, voice: &Option<String>) {
    if plain.is_empty() {
        return;
    }
    let mut text = std::mem::take(plain);
    if let Some(v) = voice {
        text = format!("{v}: {text}");
    }
    segments.push(TextSegment {
        text,
        style: if style.is_empty() { None } else { Some(style.clone()) },
        effects: Vec::new(),
    });
}

fn apply_html_tag(tag: &str, stack: &mut Vec<InlineStyle>, voice: &mut Option<String>, vtt: bool) {
    let closing = tag.starts_with('/');
    let body = tag.trim_start_matches('/');
    let name_end = body.find(char::is_whitespace).unwrap_or(body.len());
    let (name, attrs) = body.split_at(name_end);
    let name = name.split('.').next().unwrap_or(name).to_ascii_lowercase();

    if closing {
        if stack.len() > 1 {
            stack.pop();
        }
        if name == "v" {
            *voice = None;
        }
        return;
    }

    let mut style = stack.last().cloned().unwrap_or_default();
    match name.as_str() {
        "b" => style.bold = Some(true),
        "i" => style.italic = Some(true),
        "u" => style.underline = Some(true),
        "font" => {
            if let Some(color) = extract_attr(attrs, "color") {
                style.primary_color = AbgrColor::parse_css(&color);
            }
        }
        "c" if vtt => {}
        "v" if vtt => {
            *voice = Some(body[name_end..].trim().to_string());
        }
        _ => {}
    }
    stack.push(style);
}

fn extract_attr(attrs: &str, key: &str) -> Option<String> {
    let idx = attrs.find(key)?;
    let rest = &attrs[idx + key.len()..];
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('=')?.trim_start();
    if let Some(quoted) = rest.strip_prefix('"') {
        let end = quoted.find('"')?;
        Some(quoted[..end].to_string())
    } else {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        Some(rest[..end].to_string())
    }
}

/// Serialize segments back to HTML-like markup (`<b>`/`<i>`/`<u>` only;
/// `<font>`/`<c>`/`<v>` are format-specific and handled by the codec).
pub fn serialize_html_tags(segments: &[TextSegment]) -> String {
    let mut out = String::new();
    for seg in segments {
        let style = seg.style.clone().unwrap_or_default();
        let mut open = String::new();
        let mut close = String::new();
        if style.bold == Some(true) {
            open.push_str("<b>");
            close = format!("</b>{close}");
        }
        if style.italic == Some(true) {
            open.push_str("<i>");
            close = format!("</i>{close}");
        }
        if style.underline == Some(true) {
            open.push_str("<u>");
            close = format!("</u>{close}");
        }
        out.push_str(&open);
        out.push_str(&escape_html(&seg.text));
        out.push_str(&close);
    }
    out
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_tag_sets_style() {
        let segs = parse_html_tags("<b>hi</b> there", false);
        assert_eq!(segs[0].text, "hi");
        assert_eq!(segs[0].style.as_ref().unwrap().bold, Some(true));
        assert_eq!(segs[1].text, " there");
        assert!(segs[1].style.is_none());
    }

    #[test]
    fn font_color_attribute_parsed() {
        let segs = parse_html_tags("<font color=\"#ff0000\">red</font>", false);
        assert_eq!(
            segs[0].style.as_ref().unwrap().primary_color,
            AbgrColor::parse_css("#ff0000")
        );
    }

    #[test]
    fn vtt_voice_tag_prefixes_speaker() {
        let segs = parse_html_tags("<v Roger>Hello</v>", true);
        assert_eq!(segs[0].text, "Roger: Hello");
    }

    #[test]
    fn entities_decoded() {
        let segs = parse_html_tags("Tom &amp; Jerry", false);
        assert_eq!(segs[0].text, "Tom & Jerry");
    }

    #[test]
    fn serialize_round_trips_bold() {
        let segs = parse_html_tags("<b>hi</b>", false);
        assert_eq!(serialize_html_tags(&segs), "<b>hi</b>");
    }
}
