//! The lettered end-to-end scenarios: one input, one expected document or
//! conversion result, exercised through the public `subforge` facade rather
//! than a codec module directly.

use subforge::codecs::{ParseOptions, SerializeOptions};
use subforge::convert::{convert, ConvertOptions, PositioningPolicy};
use subforge::model::segment::Effect;
use subforge::{facade, FormatId};

#[test]
fn scenario_a_srt_basic() {
    let input = "1\n00:00:01,000 --> 00:00:05,000\nHello world\n\n2\n00:00:06,000 --> 00:00:10,000\nGoodbye world\n";
    let result = facade::parse(input.as_bytes(), FormatId::Srt, &ParseOptions::default()).unwrap();

    assert_eq!(result.document.events.len(), 2);
    assert_eq!(result.document.events[0].start_ms, 1000);
    assert_eq!(result.document.events[0].end_ms, 5000);
    assert_eq!(result.document.events[0].text, "Hello world");
    assert_eq!(result.document.events[0].style, "Default");
    assert_eq!(result.document.events[1].start_ms, 6000);
}

#[test]
fn scenario_b_vtt_mm_ss() {
    let input = "WEBVTT\n\n00:01.000 --> 00:05.000\nHi";
    let result = facade::parse(input.as_bytes(), FormatId::Vtt, &ParseOptions::default()).unwrap();

    assert_eq!(result.document.events.len(), 1);
    assert_eq!(result.document.events[0].start_ms, 1000);
    assert_eq!(result.document.events[0].end_ms, 5000);
    assert_eq!(result.document.events[0].text, "Hi");
}

#[test]
fn scenario_c_ssa_alignment_round_trips_legacy_numbering() {
    let input = "[Script Info]\nScriptType: v4.00\n\n[V4 Styles]\nFormat: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\nStyle: Default,Arial,20,&HFFFFFF,&H0000FF,&H000000,&H000000,0,0,0,0,100,100,0,0,1,2,2,9,10,10,10,1\n\n[Events]\nFormat: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\nDialogue: 0,0:00:01.00,0:00:05.00,Default,,0,0,0,,Hello\n";
    let result = facade::parse(input.as_bytes(), FormatId::Ssa, &ParseOptions::default()).unwrap();
    assert_eq!(result.document.styles.get("Default").unwrap().alignment, 7);

    let out = facade::serialize(&result.document, FormatId::Ssa, &SerializeOptions::default());
    assert!(out.as_text().unwrap().contains(",9,10,10,10,1"));
}

#[test]
fn scenario_d_cap_ntsc_frames() {
    let input = "$CaptionMAX\n$VideoStandard NTSC\n\n00:00:01:15\t00:00:02:00\nHello\n\n";
    let result = facade::parse(input.as_bytes(), FormatId::Cap, &ParseOptions::default()).unwrap();

    assert_eq!(result.document.events.len(), 1);
    assert_eq!(result.document.events[0].start_ms, 1501);
    assert_eq!(result.document.events[0].end_ms, 2000);
}

#[test]
fn scenario_e_lrc_enhanced_karaoke() {
    let input = "[00:12.00]<00:12.50>Word<00:13.00>by<00:13.50>word";
    let result = facade::parse(input.as_bytes(), FormatId::Lrc, &ParseOptions::default()).unwrap();

    assert_eq!(result.document.events.len(), 1);
    let event = &result.document.events[0];
    assert_eq!(event.start_ms, 12000);
    assert_eq!(event.end_ms, 13500);
    assert_eq!(event.segments.len(), 3);
    for segment in &event.segments {
        let duration = segment.effects.iter().find_map(|e| match e {
            Effect::Karaoke { duration_ms, .. } => Some(*duration_ms),
            _ => None,
        });
        assert_eq!(duration, Some(500));
    }
}

#[test]
fn scenario_f_convert_ass_pos_to_srt_with_loss_report() {
    let mut doc = subforge::Document::new();
    let mut event = subforge::model::Event::new(0, 1000, 2000, String::new());
    let mut segment = subforge::model::segment::TextSegment { text: "Hi".to_string(), style: None, effects: Vec::new() };
    let mut style = subforge::model::segment::InlineStyle::default();
    style.pos = Some((100.0, 200.0));
    segment.style = Some(style);
    event.segments = vec![segment];
    event.dirty = true;
    doc.add_event(event);

    let opts = ConvertOptions { to: FormatId::Srt, positioning: PositioningPolicy::Strip, report_loss: true, ..Default::default() };
    let result = convert(&doc, &opts);

    assert!(result
        .lost_features
        .iter()
        .any(|f| f.feature == "positioning" && f.description.contains("\\pos(100,200)")));
}
