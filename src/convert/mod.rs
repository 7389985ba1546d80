//! Cross-format conversion with feature-loss reporting (spec.md §4.4).
//!
//! Most targets already carry the full model (ASS, SSA, TTML, ...) so
//! conversion there is a plain re-serialize of `doc` — the same "short
//! circuit" `vsg_core`'s writers take when the source and sink agree on
//! what a style can express. SRT and WebVTT are the two targets spec.md
//! pins down a restricted support set for, so those two paths go through
//! [`restrict_segments`] to strip and report what the target can't carry.

use crate::facade::{self, FormatId, SerializedOutput};
use crate::model::segment::{Effect, TextSegment};
use crate::model::{Document, Event};
use crate::ops;
use crate::primitives::timecode::{format_srt, format_vtt};
use crate::tags::ass::parse_tags;

/// What to do with a feature the target can't express.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedPolicy {
    /// Silently omit the unsupported markup.
    Drop,
    /// Leave a human-readable marker in its place (e.g. `[positioning]`).
    Comment,
}

/// How to handle karaoke timing when the target has no karaoke concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KaraokePolicy {
    /// Keep karaoke effects (only meaningful target-to-target within ASS/SSA).
    Preserve,
    /// Split each karaoke event into one event per syllable.
    Explode,
    /// Drop karaoke timing, keep the concatenated text.
    Strip,
}

/// Whether absolute positioning (`\pos`, `\move`) survives the conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositioningPolicy {
    Preserve,
    Strip,
}

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub to: FormatId,
    pub unsupported: UnsupportedPolicy,
    pub karaoke: KaraokePolicy,
    pub positioning: PositioningPolicy,
    pub report_loss: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            to: FormatId::Srt,
            unsupported: UnsupportedPolicy::Drop,
            karaoke: KaraokePolicy::Strip,
            positioning: PositioningPolicy::Strip,
            report_loss: true,
        }
    }
}

/// One feature discarded during conversion, recorded when `report_loss` is
/// set.
#[derive(Debug, Clone, PartialEq)]
pub struct LostFeature {
    pub event_index: usize,
    pub feature: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct ConvertResult {
    pub output: SerializedOutput,
    pub lost_features: Vec<LostFeature>,
}

/// The subset of `InlineStyle`/`Effect` a restricted target can express.
struct SupportSet {
    bold: bool,
    italic: bool,
    underline: bool,
    strikeout: bool,
    primary_color: bool,
}

const SRT_SUPPORT: SupportSet =
    SupportSet { bold: true, italic: true, underline: true, strikeout: true, primary_color: true };
const VTT_SUPPORT: SupportSet =
    SupportSet { bold: true, italic: true, underline: true, strikeout: false, primary_color: false };

pub fn convert(doc: &Document, opts: &ConvertOptions) -> ConvertResult {
    match opts.to {
        FormatId::Srt => convert_restricted(doc, opts, &SRT_SUPPORT, Flavor::Srt),
        FormatId::Vtt => convert_restricted(doc, opts, &VTT_SUPPORT, Flavor::Vtt),
        other => {
            // Every other target already carries the full model; no feature
            // matrix applies, so this is a lossless re-serialize.
            let output = facade::serialize(doc, other, &Default::default());
            ConvertResult { output, lost_features: Vec::new() }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Srt,
    Vtt,
}

fn convert_restricted(doc: &Document, opts: &ConvertOptions, support: &SupportSet, flavor: Flavor) -> ConvertResult {
    let mut lost = Vec::new();
    let mut out = String::new();
    if flavor == Flavor::Vtt {
        out.push_str("WEBVTT\n\n");
    }

    let events = expand_karaoke(doc, opts, &mut lost);

    for (i, event) in events.iter().enumerate() {
        let segments = event_segments(event);
        let rendered = render_restricted(&segments, support, opts, i, &mut lost);

        if flavor == Flavor::Srt {
            out.push_str(&(i + 1).to_string());
            out.push('\n');
            out.push_str(&format_srt(event.start_ms));
            out.push_str(" --> ");
            out.push_str(&format_srt(event.end_ms));
            out.push('\n');
        } else {
            out.push_str(&format_vtt(event.start_ms));
            out.push_str(" --> ");
            out.push_str(&format_vtt(event.end_ms));
            out.push('\n');
        }
        out.push_str(&rendered);
        out.push_str("\n\n");
    }

    ConvertResult { output: SerializedOutput::Text(out), lost_features: lost }
}

/// Resolve segments for one event: authoritative `segments` when dirty,
/// otherwise a lazy parse of `text` as ASS inline markup (the richest
/// source grammar spec.md names, and the one conversion scenarios exercise).
fn event_segments(event: &Event) -> Vec<TextSegment> {
    if event.dirty {
        event.segments.clone()
    } else {
        parse_tags(&event.text)
    }
}

fn expand_karaoke(doc: &Document, opts: &ConvertOptions, lost: &mut Vec<LostFeature>) -> Vec<Event> {
    match opts.karaoke {
        KaraokePolicy::Explode => {
            let mut out = Vec::new();
            for (i, event) in doc.events.iter().enumerate() {
                let has_karaoke =
                    event.segments.iter().any(|s| s.effects.iter().any(|e| matches!(e, Effect::Karaoke { .. })));
                if event.dirty && has_karaoke {
                    out.extend(ops::explode_karaoke(event));
                    if opts.report_loss {
                        lost.push(LostFeature {
                            event_index: i,
                            feature: "karaoke".to_string(),
                            description: "exploded into one event per syllable".to_string(),
                        });
                    }
                } else {
                    out.push(event.clone());
                }
            }
            out
        }
        KaraokePolicy::Strip | KaraokePolicy::Preserve => doc.events.clone(),
    }
}

fn render_restricted(
    segments: &[TextSegment],
    support: &SupportSet,
    opts: &ConvertOptions,
    event_index: usize,
    lost: &mut Vec<LostFeature>,
) -> String {
    let mut out = String::new();
    for segment in segments {
        let style = segment.style.clone().unwrap_or_default();
        let mut open = String::new();
        let mut close = String::new();

        if style.bold == Some(true) && support.bold {
            open.push_str("<b>");
            close = format!("</b>{close}");
        }
        if style.italic == Some(true) && support.italic {
            open.push_str("<i>");
            close = format!("</i>{close}");
        }
        if style.underline == Some(true) && support.underline {
            open.push_str("<u>");
            close = format!("</u>{close}");
        }
        if style.strikeout == Some(true) && support.strikeout {
            open.push_str("<s>");
            close = format!("</s>{close}");
        }
        if let (Some(color), true) = (style.primary_color, support.primary_color) {
            open.push_str(&format!("<font color=\"#{:02X}{:02X}{:02X}\">", color.r(), color.g(), color.b()));
            close = format!("</font>{close}");
        }

        report_if_unsupported(&style, support, opts, event_index, lost);
        for effect in &segment.effects {
            if !matches!(effect, Effect::Karaoke { .. }) {
                report_effect_loss(effect, opts, event_index, lost, &mut open);
            }
        }

        out.push_str(&open);
        out.push_str(&segment.text);
        out.push_str(&close);
    }
    out
}

fn report_if_unsupported(
    style: &crate::model::segment::InlineStyle,
    support: &SupportSet,
    opts: &ConvertOptions,
    event_index: usize,
    lost: &mut Vec<LostFeature>,
) {
    let mut note = |feature: &str, description: String| {
        if opts.report_loss {
            lost.push(LostFeature { event_index, feature: feature.to_string(), description });
        }
    };
    if style.bold == Some(true) && !support.bold {
        note("bold", "\\b1".to_string());
    }
    if style.italic == Some(true) && !support.italic {
        note("italic", "\\i1".to_string());
    }
    if style.underline == Some(true) && !support.underline {
        note("underline", "\\u1".to_string());
    }
    if style.strikeout == Some(true) && !support.strikeout {
        note("strikeout", "\\s1".to_string());
    }
    if let Some(color) = style.primary_color {
        if !support.primary_color {
            note("primaryColor", format!("\\c&H{:06X}&", (color.b() as u32) << 16 | (color.g() as u32) << 8 | color.r() as u32));
        }
    }
    if let Some((x, y)) = style.pos {
        note("positioning", format!("\\pos({x},{y})"));
    }
    if style.org.is_some() || style.rotation.is_some() || style.clip.is_some() {
        note("positioning", "inline transform tag".to_string());
    }
}

fn report_effect_loss(
    effect: &Effect,
    opts: &ConvertOptions,
    event_index: usize,
    lost: &mut Vec<LostFeature>,
    open: &mut String,
) {
    let (feature, description) = match effect {
        Effect::Move { x1, y1, x2, y2, .. } => ("positioning".to_string(), format!("\\move({x1},{y1},{x2},{y2})")),
        Effect::Animate { .. } => ("animation".to_string(), "\\t(...)".to_string()),
        Effect::Fade { in_ms, out_ms } => ("fade".to_string(), format!("\\fad({in_ms},{out_ms})")),
        Effect::FadeComplex { .. } => ("fade".to_string(), "\\fade(...)".to_string()),
        Effect::Clip(_) => ("clipping".to_string(), "\\clip(...)".to_string()),
        Effect::Drawing(_) => ("drawing".to_string(), "\\p1 vector drawing".to_string()),
        Effect::Blur(v) => ("blur".to_string(), format!("\\blur{v}")),
        Effect::Border(v) => ("border".to_string(), format!("\\bord{v}")),
        Effect::Shadow(v) => ("shadow".to_string(), format!("\\shad{v}")),
        Effect::Scale { x, y } => ("scale".to_string(), format!("\\fscx{x}\\fscy{y}")),
        Effect::Rotate { .. } => ("rotation".to_string(), "\\frx/\\fry/\\frz".to_string()),
        Effect::Shear { .. } => ("shear".to_string(), "\\fax/\\fay".to_string()),
        Effect::Spacing(v) => ("spacing".to_string(), format!("\\fsp{v}")),
        Effect::Reset { .. } => ("reset".to_string(), "\\r".to_string()),
        Effect::Image { .. } => ("image".to_string(), "embedded bitmap".to_string()),
        Effect::VobSub { .. } | Effect::Pgs { .. } => ("bitmap".to_string(), "bitmap sidecar".to_string()),
        Effect::Unknown { name, .. } => ("unknown".to_string(), format!("\\{name}")),
        Effect::Karaoke { .. } => return,
    };
    if opts.unsupported == UnsupportedPolicy::Comment {
        open.push_str(&format!("[{feature}]"));
    }
    if opts.report_loss {
        lost.push(LostFeature { event_index, feature, description });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Document;

    #[test]
    fn scenario_f_ass_pos_strip_reports_positioning_loss() {
        let mut doc = Document::new();
        let mut event = Event::new(0, 1000, 2000, "{\\pos(100,200)}Hi".to_string());
        event.dirty = false;
        doc.add_event(event);

        let opts = ConvertOptions {
            to: FormatId::Srt,
            positioning: PositioningPolicy::Strip,
            report_loss: true,
            ..Default::default()
        };
        let result = convert(&doc, &opts);
        let text = result.output.as_text().unwrap();
        assert!(text.contains("Hi"));
        assert!(!text.contains("\\pos"));
        assert!(result.lost_features.iter().any(|f| f.feature == "positioning" && f.description.contains("\\pos(100,200)")));
    }

    #[test]
    fn srt_target_keeps_bold_italic_underline() {
        let mut doc = Document::new();
        let mut event = Event::new(0, 0, 1000, "{\\b1\\i1}styled".to_string());
        event.dirty = false;
        doc.add_event(event);

        let result = convert(&doc, &ConvertOptions { to: FormatId::Srt, ..Default::default() });
        let text = result.output.as_text().unwrap();
        assert!(text.contains("<b>"));
        assert!(text.contains("<i>"));
        assert!(result.lost_features.is_empty());
    }

    #[test]
    fn vtt_target_drops_strikeout() {
        let mut doc = Document::new();
        let mut event = Event::new(0, 0, 1000, "{\\s1}struck".to_string());
        event.dirty = false;
        doc.add_event(event);

        let result = convert(&doc, &ConvertOptions { to: FormatId::Vtt, ..Default::default() });
        let text = result.output.as_text().unwrap();
        assert!(!text.contains("<s>"));
        assert!(result.lost_features.iter().any(|f| f.feature == "strikeout"));
    }

    #[test]
    fn lossless_target_short_circuits_with_no_reported_loss() {
        let mut doc = Document::new();
        doc.add_event(Event::new(0, 0, 1000, "{\\pos(1,2)}Hi".to_string()));
        let result = convert(&doc, &ConvertOptions { to: FormatId::Ass, ..Default::default() });
        assert!(result.lost_features.is_empty());
        assert!(matches!(result.output, SerializedOutput::Text(_)));
    }
}
