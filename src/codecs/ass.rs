//! Advanced SubStation Alpha (ASS/SSA v4+): `[Script Info]`, `[V4+ Styles]`,
//! `[Events]` and `[Fonts]`/`[Graphics]` sections (spec.md §4.3.1, §4.3.2).
//!
//! `parse`/`serialize` implement ASS (`ScaledBorderAndShadow`, numpad
//! alignment, `[V4+ Styles]`); [`ssa`](crate::codecs::ssa) wraps this module
//! with the legacy section name and alignment scheme.

use std::collections::HashMap;

use crate::codecs::{handle_error, ParseOptions, ParseResult, SerializeOptions};
use crate::error::{ErrorCode, SubforgeError, Warning};
use crate::model::document::{EmbeddedBlob, WrapStyle};
use crate::model::event::Comment;
use crate::model::style::BorderStyle;
use crate::model::{Document, Event, Style};
use crate::primitives::color::AbgrColor;
use crate::primitives::encoding::decode;
use crate::primitives::timecode::{format_ass, parse_ass};
use crate::tags::ass::{decode_uu_lines, parse_tags, serialize_tags};

pub(crate) const STYLES_SECTION: &str = "V4+ Styles";
pub(crate) const SCRIPT_TYPE: &str = "v4.00+";

/// Which alignment scheme a style/tag's numbers use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AlignmentScheme {
    Numpad,
    LegacySsa,
}

pub fn parse(bytes: &[u8], opts: &ParseOptions) -> Result<ParseResult, SubforgeError> {
    parse_with_scheme(bytes, opts, STYLES_SECTION, AlignmentScheme::Numpad)
}

pub fn serialize(doc: &Document, opts: &SerializeOptions) -> String {
    serialize_with_scheme(doc, opts, STYLES_SECTION, SCRIPT_TYPE, AlignmentScheme::Numpad)
}

pub(crate) fn parse_with_scheme(
    bytes: &[u8],
    opts: &ParseOptions,
    styles_section: &str,
    scheme: AlignmentScheme,
) -> Result<ParseResult, SubforgeError> {
    let text = decode(bytes, opts.encoding);
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut doc = Document::new();
    doc.styles = crate::model::document::StyleMap::default();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let mut current_section = String::new();
    let mut style_format: Vec<String> = Vec::new();
    let mut event_format: Vec<String> = Vec::new();
    let mut seen_style_names = std::collections::HashSet::new();
    let mut font_lines: HashMap<String, Vec<String>> = HashMap::new();
    let mut graphic_lines: HashMap<String, Vec<String>> = HashMap::new();
    let mut current_blob_name: Option<String> = None;

    for (i, raw_line) in normalized.lines().enumerate() {
        let line_no = i + 1;
        let line = raw_line.trim_end();
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(';') || trimmed.starts_with('!') {
            continue;
        }
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            current_section = trimmed[1..trimmed.len() - 1].to_string();
            current_blob_name = None;
            tracing::debug!("entering [{}]", current_section);
            continue;
        }

        match current_section.as_str() {
            "Script Info" => parse_script_info_line(trimmed, &mut doc, &mut warnings, line_no),
            s if s.eq_ignore_ascii_case(styles_section) || s.eq_ignore_ascii_case("V4 Styles") => {
                if let Some(rest) = trimmed.strip_prefix("Format:") {
                    style_format = split_format(rest);
                } else if let Some(rest) = trimmed.strip_prefix("Style:") {
                    match parse_style_line(rest, &style_format, scheme) {
                        Some(style) => {
                            if !seen_style_names.insert(style.name.clone()) {
                                let err = SubforgeError::at_line(
                                    ErrorCode::DuplicateStyle,
                                    line_no,
                                    format!("duplicate style name '{}'", style.name),
                                );
                                if !handle_error(opts, &mut errors, err)? {
                                    continue;
                                }
                            }
                            doc.styles.insert(style);
                        }
                        None => {
                            let err = SubforgeError::at_line(ErrorCode::MalformedEvent, line_no, "malformed Style line");
                            handle_error(opts, &mut errors, err)?;
                        }
                    }
                }
            }
            "Events" => {
                if let Some(rest) = trimmed.strip_prefix("Format:") {
                    event_format = split_format(rest);
                } else if let Some(rest) = trimmed.strip_prefix("Dialogue:") {
                    match parse_event_line(rest, &event_format, false) {
                        Some(event) => {
                            if !doc.styles.contains(&event.style) {
                                tracing::warn!("line {line_no}: event references unknown style '{}', resolves to Default", event.style);
                                warnings.push(Warning::new(
                                    line_no,
                                    format!("event references unknown style '{}'", event.style),
                                ));
                            }
                            doc.add_event(event);
                        }
                        None => {
                            let err = SubforgeError::at_line(ErrorCode::MalformedEvent, line_no, "malformed Dialogue line");
                            handle_error(opts, &mut errors, err)?;
                        }
                    }
                } else if let Some(rest) = trimmed.strip_prefix("Comment:") {
                    if let Some(event) = parse_event_line(rest, &event_format, true) {
                        doc.comments.push(Comment {
                            before_event_index: doc.events.len(),
                            text: event.text,
                        });
                    }
                }
            }
            "Fonts" => {
                if let Some(rest) = trimmed.strip_prefix("fontname:") {
                    let name = rest.trim().to_string();
                    font_lines.entry(name.clone()).or_default();
                    current_blob_name = Some(name);
                } else if let Some(name) = &current_blob_name {
                    font_lines.entry(name.clone()).or_default().push(trimmed.to_string());
                }
            }
            "Graphics" => {
                if let Some(rest) = trimmed.strip_prefix("filename:") {
                    let name = rest.trim().to_string();
                    graphic_lines.entry(name.clone()).or_default();
                    current_blob_name = Some(name);
                } else if let Some(name) = &current_blob_name {
                    graphic_lines.entry(name.clone()).or_default().push(trimmed.to_string());
                }
            }
            _ => {}
        }
    }

    if !doc.styles.contains("Default") {
        doc.styles.insert(Style::default());
    }

    for (name, lines) in font_lines {
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        doc.fonts.push(EmbeddedBlob { name, data: decode_uu_lines(&refs) });
    }
    for (name, lines) in graphic_lines {
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        doc.graphics.push(EmbeddedBlob { name, data: decode_uu_lines(&refs) });
    }

    let mut result = ParseResult::ok(doc);
    result.errors = errors;
    result.warnings = warnings;
    Ok(result)
}

fn split_format(rest: &str) -> Vec<String> {
    rest.split(',').map(|s| s.trim().to_string()).collect()
}

fn field_index(format: &[String], name: &str) -> Option<usize> {
    format.iter().position(|f| f.eq_ignore_ascii_case(name))
}

fn parse_script_info_line(line: &str, doc: &mut Document, warnings: &mut Vec<Warning>, line_no: usize) {
    let Some((key, value)) = line.split_once(':') else { return };
    let key = key.trim();
    let value = value.trim();
    match key {
        "Title" => doc.script_info.title = Some(value.to_string()),
        "Original Script" | "Author" => doc.script_info.author = Some(value.to_string()),
        "PlayResX" => doc.script_info.play_res_x = value.parse().ok(),
        "PlayResY" => doc.script_info.play_res_y = value.parse().ok(),
        "ScaledBorderAndShadow" => doc.script_info.scaled_border_and_shadow = value.eq_ignore_ascii_case("yes"),
        "WrapStyle" => {
            doc.script_info.wrap_style = value.parse::<i32>().ok().map(WrapStyle::from_wire);
        }
        "ScriptType" => {}
        _ => {
            if doc.script_info.custom.insert(key.to_string(), value.to_string()).is_some() {
                tracing::warn!("line {line_no}: duplicate script-info key '{key}'");
                warnings.push(Warning::new(line_no, format!("duplicate script-info key '{key}'")));
            }
        }
    }
}

fn parse_style_line(rest: &str, format: &[String], scheme: AlignmentScheme) -> Option<Style> {
    let fields: Vec<&str> = rest.split(',').map(str::trim).collect();
    let idx = |name: &str, default: usize| field_index(format, name).unwrap_or(default);
    let get = |i: usize| fields.get(i).copied().unwrap_or("");

    let mut style = Style::named(get(idx("Name", 0)));
    if !get(idx("Fontname", 1)).is_empty() {
        style.font_name = get(idx("Fontname", 1)).to_string();
    }
    if let Ok(v) = get(idx("Fontsize", 2)).parse() {
        style.font_size = v;
    }
    if let Some(c) = AbgrColor::parse_ass(get(idx("PrimaryColour", 3))) {
        style.primary_color = c;
    }
    if let Some(c) = AbgrColor::parse_ass(get(idx("SecondaryColour", 4))) {
        style.secondary_color = c;
    }
    if let Some(c) = AbgrColor::parse_ass(get(idx("OutlineColour", 5))) {
        style.outline_color = c;
    }
    if let Some(c) = AbgrColor::parse_ass(get(idx("BackColour", 6))) {
        style.back_color = c;
    }
    style.bold = parse_bool_wire(get(idx("Bold", 7)));
    style.italic = parse_bool_wire(get(idx("Italic", 8)));
    style.underline = parse_bool_wire(get(idx("Underline", 9)));
    style.strikeout = parse_bool_wire(get(idx("StrikeOut", 10)));
    if let Ok(v) = get(idx("ScaleX", 11)).parse() {
        style.scale_x = v;
    }
    if let Ok(v) = get(idx("ScaleY", 12)).parse() {
        style.scale_y = v;
    }
    if let Ok(v) = get(idx("Spacing", 13)).parse() {
        style.spacing = v;
    }
    if let Ok(v) = get(idx("Angle", 14)).parse() {
        style.angle = v;
    }
    if let Ok(v) = get(idx("BorderStyle", 15)).parse() {
        style.border_style = BorderStyle::from_wire(v);
    }
    if let Ok(v) = get(idx("Outline", 16)).parse() {
        style.outline = v;
    }
    if let Ok(v) = get(idx("Shadow", 17)).parse() {
        style.shadow = v;
    }
    if let Ok(v) = get(idx("Alignment", 18)).parse::<i32>() {
        style.alignment = match scheme {
            AlignmentScheme::Numpad => v.clamp(1, 9) as u8,
            AlignmentScheme::LegacySsa => Style::ssa_alignment_to_numpad(v),
        };
    }
    if let Ok(v) = get(idx("MarginL", 19)).parse() {
        style.margin_l = v;
    }
    if let Ok(v) = get(idx("MarginR", 20)).parse() {
        style.margin_r = v;
    }
    if let Ok(v) = get(idx("MarginV", 21)).parse() {
        style.margin_v = v;
    }
    if let Ok(v) = get(idx("Encoding", 22)).parse() {
        style.encoding = v;
    }
    Some(style)
}

fn parse_bool_wire(s: &str) -> bool {
    s == "-1" || s == "1"
}

fn parse_event_line(rest: &str, format: &[String], _is_comment: bool) -> Option<Event> {
    let text_idx = field_index(format, "Text").unwrap_or(9);
    let fields: Vec<&str> = rest.splitn(text_idx + 1, ',').map(str::trim).collect();
    if fields.len() <= text_idx {
        return None;
    }
    let idx = |name: &str, default: usize| field_index(format, name).unwrap_or(default);
    let get = |i: usize| fields.get(i).copied().unwrap_or("");

    let start_ms = parse_ass(get(idx("Start", 1)))?;
    let end_ms = parse_ass(get(idx("End", 2)))?;
    let text = get(text_idx).to_string();

    let mut event = Event::new(0, start_ms, end_ms, text);
    event.layer = get(idx("Layer", 0)).parse().unwrap_or(0);
    event.style = {
        let s = get(idx("Style", 3));
        if s.is_empty() { "Default".to_string() } else { s.to_string() }
    };
    event.actor = get(idx("Name", 4)).to_string();
    event.margin_l = get(idx("MarginL", 5)).parse().unwrap_or(0);
    event.margin_r = get(idx("MarginR", 6)).parse().unwrap_or(0);
    event.margin_v = get(idx("MarginV", 7)).parse().unwrap_or(0);
    event.effect = get(idx("Effect", 8)).to_string();
    Some(event)
}

pub(crate) fn serialize_with_scheme(
    doc: &Document,
    _opts: &SerializeOptions,
    styles_section: &str,
    script_type: &str,
    scheme: AlignmentScheme,
) -> String {
    let mut out = String::new();
    out.push_str("[Script Info]\n");
    if let Some(title) = &doc.script_info.title {
        out.push_str(&format!("Title: {title}\n"));
    }
    out.push_str(&format!("ScriptType: {script_type}\n"));
    if let Some(x) = doc.script_info.play_res_x {
        out.push_str(&format!("PlayResX: {x}\n"));
    }
    if let Some(y) = doc.script_info.play_res_y {
        out.push_str(&format!("PlayResY: {y}\n"));
    }
    out.push_str(&format!(
        "ScaledBorderAndShadow: {}\n",
        if doc.script_info.scaled_border_and_shadow { "yes" } else { "no" }
    ));
    if let Some(ws) = doc.script_info.wrap_style {
        out.push_str(&format!("WrapStyle: {}\n", ws.to_wire()));
    }
    for (k, v) in &doc.script_info.custom {
        out.push_str(&format!("{k}: {v}\n"));
    }
    out.push('\n');

    out.push_str(&format!("[{styles_section}]\n"));
    out.push_str("Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n");
    for style in doc.styles.iter() {
        let alignment = match scheme {
            AlignmentScheme::Numpad => style.alignment as i32,
            AlignmentScheme::LegacySsa => Style::numpad_alignment_to_ssa(style.alignment),
        };
        let bold = if style.bold { -1 } else { 0 };
        let italic = if style.italic { -1 } else { 0 };
        out.push_str(&format!(
            "Style: {},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
            style.name,
            style.font_name,
            style.font_size,
            style.primary_color.format_ass(),
            style.secondary_color.format_ass(),
            style.outline_color.format_ass(),
            style.back_color.format_ass(),
            bold,
            italic,
            style.underline as i32,
            style.strikeout as i32,
            style.scale_x,
            style.scale_y,
            style.spacing,
            style.angle,
            style.border_style.to_wire(),
            style.outline,
            style.shadow,
            alignment,
            style.margin_l,
            style.margin_r,
            style.margin_v,
            style.encoding,
        ));
    }
    out.push('\n');

    out.push_str("[Events]\n");
    out.push_str("Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n");
    for event in &doc.events {
        let text = if event.dirty { serialize_tags(&event.segments) } else { event.text.clone() };
        out.push_str(&format!(
            "Dialogue: {},{},{},{},{},{},{},{},{},{}\n",
            event.layer,
            format_ass(event.start_ms),
            format_ass(event.end_ms),
            event.style,
            event.actor,
            event.margin_l,
            event.margin_r,
            event.margin_v,
            event.effect,
            text,
        ));
    }
    out
}

pub fn lazy_segments(event_text: &str) -> Vec<crate::model::TextSegment> {
    parse_tags(event_text)
}
