//! Conversion properties: the output parses back as the target format with
//! the same event count, and `reportLoss` produces exactly one `LostFeature`
//! per dropped feature occurrence.

use subforge::codecs::ParseOptions;
use subforge::convert::{convert, ConvertOptions};
use subforge::model::Event;
use subforge::{facade, Document, FormatId};

#[test]
fn srt_target_output_reparses_with_same_event_count_and_text() {
    let mut doc = Document::new();
    doc.add_event(Event::new(0, 1000, 2000, "Hello".to_string()));
    doc.add_event(Event::new(0, 3000, 4000, "World".to_string()));

    let result = convert(&doc, &ConvertOptions { to: FormatId::Srt, ..Default::default() });
    let bytes = result.output.into_bytes();

    let reparsed = facade::parse(&bytes, FormatId::Srt, &ParseOptions::default()).unwrap();
    assert_eq!(reparsed.document.events.len(), 2);
    assert_eq!(reparsed.document.events[0].start_ms, 1000);
    assert_eq!(reparsed.document.events[0].text, "Hello");
    assert_eq!(reparsed.document.events[1].text, "World");
}

#[test]
fn ass_target_is_a_lossless_round_trip_with_no_reported_loss() {
    let mut doc = Document::new();
    let mut event = Event::new(0, 0, 1000, "{\\pos(1,2)}Hi".to_string());
    event.dirty = false;
    doc.add_event(event);

    let result = convert(&doc, &ConvertOptions { to: FormatId::Ass, ..Default::default() });
    assert!(result.lost_features.is_empty());

    let reparsed = facade::parse(&result.output.into_bytes(), FormatId::Ass, &ParseOptions::default()).unwrap();
    assert_eq!(reparsed.document.events.len(), 1);
}

#[test]
fn one_lost_feature_per_dropped_occurrence() {
    let mut doc = Document::new();
    let mut a = Event::new(0, 0, 1000, "{\\s1}one".to_string());
    a.dirty = false;
    let mut b = Event::new(0, 1000, 2000, "{\\s1}two".to_string());
    b.dirty = false;
    doc.add_event(a);
    doc.add_event(b);

    let result = convert(&doc, &ConvertOptions { to: FormatId::Vtt, ..Default::default() });
    let strikeout_losses: Vec<_> = result.lost_features.iter().filter(|f| f.feature == "strikeout").collect();
    assert_eq!(strikeout_losses.len(), 2);
    assert_eq!(strikeout_losses[0].event_index, 0);
    assert_eq!(strikeout_losses[1].event_index, 1);
}
