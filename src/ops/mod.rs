//! Document/event operations (spec.md §4.2): timing transforms, sorting,
//! queries, search/replace, style renaming and karaoke helpers. Grounded in
//! `vsg_core::subtitles::types::SubtitleData`'s `shift_all`/`sort_by_time`,
//! generalized to regex-aware search and the karaoke model spec.md adds.

use regex::Regex;

use crate::model::segment::{Effect, TextSegment};
use crate::model::{Document, Event};

/// Add `delta_ms` to every event's `start`/`end`.
pub fn shift_events(events: &mut [Event], delta_ms: i64) {
    for event in events {
        event.shift(delta_ms);
    }
}

/// `t' = pivot + (t - pivot) * factor` for every event's `start`/`end`.
pub fn scale_events(events: &mut [Event], factor: f64, pivot_ms: i64) {
    for event in events {
        event.scale_about(factor, pivot_ms);
    }
}

/// Ascending `(start, end)`.
pub fn sort_by_time(events: &mut [Event]) {
    events.sort_by_key(|e| (e.start_ms, e.end_ms));
}

/// Ascending `(layer, start)`.
pub fn sort_by_layer(events: &mut [Event]) {
    events.sort_by_key(|e| (e.layer, e.start_ms));
}

/// Events with `start <= t < end`.
pub fn get_events_at(events: &[Event], t_ms: i64) -> Vec<&Event> {
    events.iter().filter(|e| e.start_ms <= t_ms && t_ms < e.end_ms).collect()
}

/// Events overlapping `[t0, t1)`.
pub fn get_events_between(events: &[Event], t0_ms: i64, t1_ms: i64) -> Vec<&Event> {
    events.iter().filter(|e| e.start_ms < t1_ms && e.end_ms > t0_ms).collect()
}

/// Plain-string or regex search/replace over `event.text`. Matching events
/// have their stale `segments` dropped (`text` becomes authoritative again)
/// and are returned in the replacement count.
pub fn search_replace(events: &mut [Event], needle: &str, replacement: &str, use_regex: bool) -> usize {
    let mut count = 0;
    if use_regex {
        let Ok(re) = Regex::new(needle) else { return 0 };
        for event in events.iter_mut() {
            let matches = re.find_iter(&event.text).count();
            if matches > 0 {
                event.text = re.replace_all(&event.text, replacement).into_owned();
                event.segments.clear();
                event.dirty = false;
                count += matches;
            }
        }
    } else {
        for event in events.iter_mut() {
            let matches = event.text.matches(needle).count();
            if matches > 0 {
                event.text = event.text.replace(needle, replacement);
                event.segments.clear();
                event.dirty = false;
                count += matches;
            }
        }
    }
    count
}

/// Rename a style reference across `events`. Returns the number changed.
pub fn change_style(events: &mut [Event], old_name: &str, new_name: &str) -> usize {
    let mut count = 0;
    for event in events {
        if event.style == old_name {
            event.style = new_name.to_string();
            count += 1;
        }
    }
    count
}

fn contains_case_insensitive(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Case-insensitive substring match against `event.style`.
pub fn find_by_style<'a>(events: &'a [Event], name: &str) -> Vec<&'a Event> {
    events.iter().filter(|e| e.style.eq_ignore_ascii_case(name)).collect()
}

/// Case-insensitive substring match against `event.actor`.
pub fn find_by_actor<'a>(events: &'a [Event], name: &str) -> Vec<&'a Event> {
    events.iter().filter(|e| e.actor.eq_ignore_ascii_case(name)).collect()
}

pub fn find_by_layer(events: &[Event], layer: i32) -> Vec<&Event> {
    events.iter().filter(|e| e.layer == layer).collect()
}

/// Substring search over `event.text`, case-insensitive; `pattern` is
/// honored as a regex as-is when `use_regex` is set (no case-folding).
pub fn find_by_text<'a>(events: &'a [Event], pattern: &str, use_regex: bool) -> Vec<&'a Event> {
    if use_regex {
        let Ok(re) = Regex::new(pattern) else { return Vec::new() };
        events.iter().filter(|e| re.is_match(&e.text)).collect()
    } else {
        events.iter().filter(|e| contains_case_insensitive(&e.text, pattern)).collect()
    }
}

/// `O(n^2)` pairs of events whose time ranges strictly overlap.
pub fn find_overlapping(events: &[Event]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..events.len() {
        for j in (i + 1)..events.len() {
            let (a, b) = (&events[i], &events[j]);
            if a.start_ms < b.end_ms && b.start_ms < a.end_ms {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Groups of event indices sharing `(start, end, text)`.
pub fn find_duplicates(events: &[Event]) -> Vec<Vec<usize>> {
    let mut groups: Vec<(i64, i64, String, Vec<usize>)> = Vec::new();
    for (i, event) in events.iter().enumerate() {
        match groups.iter_mut().find(|(s, e, t, _)| *s == event.start_ms && *e == event.end_ms && *t == event.text) {
            Some((_, _, _, idxs)) => idxs.push(i),
            None => groups.push((event.start_ms, event.end_ms, event.text.clone(), vec![i])),
        }
    }
    groups.into_iter().map(|(_, _, _, idxs)| idxs).filter(|g| g.len() > 1).collect()
}

/// One karaoke syllable's resolved timing within an event: offset from the
/// event start and duration, both in ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KaraokeTiming {
    pub offset_ms: i64,
    pub duration_ms: i64,
}

fn karaoke_durations_ms(segments: &[TextSegment]) -> Vec<i64> {
    segments
        .iter()
        .filter_map(|s| {
            s.effects.iter().find_map(|e| match e {
                Effect::Karaoke { duration_ms, .. } => Some(*duration_ms as i64),
                _ => None,
            })
        })
        .collect()
}

/// Resolved `(offset, duration)` for each karaoke segment in `segments`, in
/// declaration order. Non-karaoke segments are skipped.
pub fn karaoke_offsets(segments: &[TextSegment]) -> Vec<KaraokeTiming> {
    let mut out = Vec::new();
    let mut offset = 0i64;
    for duration in karaoke_durations_ms(segments) {
        out.push(KaraokeTiming { offset_ms: offset, duration_ms: duration });
        offset += duration;
    }
    out
}

/// Multiply every karaoke segment's duration by `factor`, in place.
pub fn scale_karaoke(segments: &mut [TextSegment], factor: f64) {
    for segment in segments.iter_mut() {
        for effect in segment.effects.iter_mut() {
            if let Effect::Karaoke { duration_ms, .. } = effect {
                *duration_ms = (*duration_ms as f64 * factor).round().max(0.0) as u64;
            }
        }
    }
}

/// Overwrite karaoke durations pointwise from `durations_ms`; segments past
/// the end of `durations_ms` are left untouched.
pub fn retime_karaoke(segments: &mut [TextSegment], durations_ms: &[u64]) {
    let mut i = 0;
    for segment in segments.iter_mut() {
        for effect in segment.effects.iter_mut() {
            if let Effect::Karaoke { duration_ms, .. } = effect {
                if let Some(d) = durations_ms.get(i) {
                    *duration_ms = *d;
                }
                i += 1;
            }
        }
    }
}

/// Split an event with karaoke segments into one event per syllable, each
/// sized proportionally to its karaoke duration. Non-karaoke segments are
/// attached to the syllable they immediately precede (or the first one, if
/// none follow).
pub fn explode_karaoke(event: &Event) -> Vec<Event> {
    let timings = karaoke_offsets(&event.segments);
    if timings.is_empty() {
        return vec![event.clone()];
    }

    let total_duration_ms: i64 = timings.iter().map(|t| t.duration_ms).sum();
    if total_duration_ms <= 0 {
        return vec![event.clone()];
    }

    let event_span = event.duration_ms();
    let mut out = Vec::with_capacity(timings.len());
    let mut syllable_idx = 0;
    let mut pending_text = String::new();

    for segment in &event.segments {
        let is_karaoke = segment.effects.iter().any(|e| matches!(e, Effect::Karaoke { .. }));
        if !is_karaoke {
            pending_text.push_str(&segment.text);
            continue;
        }
        let timing = timings[syllable_idx];
        let start_ms = event.start_ms + (event_span * timing.offset_ms) / total_duration_ms;
        let end_ms = event.start_ms + (event_span * (timing.offset_ms + timing.duration_ms)) / total_duration_ms;
        let mut text = std::mem::take(&mut pending_text);
        text.push_str(&segment.text);
        let mut piece = Event::new(0, start_ms, end_ms, text);
        piece.style = event.style.clone();
        piece.actor = event.actor.clone();
        piece.layer = event.layer;
        out.push(piece);
        syllable_idx += 1;
    }
    if !pending_text.is_empty() {
        if let Some(last) = out.last_mut() {
            last.text.push_str(&pending_text);
        }
    }
    out
}

/// The karaoke segment active at `t_rel_ms` (relative to the event start),
/// if any.
pub fn get_active_karaoke_segment(segments: &[TextSegment], t_rel_ms: i64) -> Option<usize> {
    let timings = karaoke_offsets(segments);
    let mut idx = 0;
    for (i, segment) in segments.iter().enumerate() {
        let is_karaoke = segment.effects.iter().any(|e| matches!(e, Effect::Karaoke { .. }));
        if !is_karaoke {
            continue;
        }
        let timing = timings[idx];
        if t_rel_ms >= timing.offset_ms && t_rel_ms < timing.offset_ms + timing.duration_ms {
            return Some(i);
        }
        idx += 1;
    }
    None
}

/// Overall karaoke fill progress at `t_rel_ms`, clamped to `[0, 1]`.
pub fn get_karaoke_progress(segments: &[TextSegment], t_rel_ms: i64) -> f64 {
    let timings = karaoke_offsets(segments);
    let total: i64 = timings.iter().map(|t| t.duration_ms).sum();
    if total <= 0 {
        return 0.0;
    }
    (t_rel_ms as f64 / total as f64).clamp(0.0, 1.0)
}

/// Deep-clone `doc` with fresh event ids (spec.md §4.5 `cloneDocument`).
pub fn clone_document(doc: &Document) -> Document {
    doc.clone_deep(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::segment::KaraokeMode;
    use crate::model::Document;

    fn karaoke_segment(text: &str, duration_ms: u64) -> TextSegment {
        TextSegment {
            text: text.to_string(),
            style: None,
            effects: vec![Effect::Karaoke { duration_ms, mode: KaraokeMode::Fill }],
        }
    }

    #[test]
    fn shift_then_sort_preserves_relative_order() {
        let mut events = vec![Event::new(1, 2000, 3000, "b"), Event::new(2, 1000, 1500, "a")];
        shift_events(&mut events, 100);
        sort_by_time(&mut events);
        assert_eq!(events[0].text, "a");
        assert_eq!(events[0].start_ms, 1100);
    }

    #[test]
    fn get_events_at_is_half_open() {
        let events = vec![Event::new(1, 1000, 2000, "x")];
        assert_eq!(get_events_at(&events, 1000).len(), 1);
        assert_eq!(get_events_at(&events, 2000).len(), 0);
    }

    #[test]
    fn search_replace_counts_matches_and_sets_text() {
        let mut events = vec![Event::new(1, 0, 1000, "foo foo bar")];
        let count = search_replace(&mut events, "foo", "baz", false);
        assert_eq!(count, 2);
        assert_eq!(events[0].text, "baz baz bar");
    }

    #[test]
    fn search_replace_regex_mode() {
        let mut events = vec![Event::new(1, 0, 1000, "a1 a22 a333")];
        let count = search_replace(&mut events, r"a\d+", "X", true);
        assert_eq!(count, 3);
        assert_eq!(events[0].text, "X X X");
    }

    #[test]
    fn find_overlapping_detects_strict_overlap_only() {
        let events = vec![
            Event::new(1, 0, 1000, "a"),
            Event::new(2, 999, 2000, "b"),
            Event::new(3, 1000, 2000, "c"),
        ];
        let pairs = find_overlapping(&events);
        assert_eq!(pairs, vec![(0, 1)]);
    }

    #[test]
    fn find_duplicates_groups_by_start_end_text() {
        let events = vec![
            Event::new(1, 0, 1000, "same"),
            Event::new(2, 0, 1000, "same"),
            Event::new(3, 0, 1000, "different"),
        ];
        let groups = find_duplicates(&events);
        assert_eq!(groups, vec![vec![0, 1]]);
    }

    #[test]
    fn karaoke_offsets_accumulate_preceding_durations() {
        let segments = vec![karaoke_segment("Hel", 100), karaoke_segment("lo", 200)];
        let timings = karaoke_offsets(&segments);
        assert_eq!(timings[0].offset_ms, 0);
        assert_eq!(timings[1].offset_ms, 100);
    }

    #[test]
    fn explode_karaoke_splits_proportionally() {
        let mut event = Event::new(1, 0, 3000, String::new());
        event.set_segments(vec![karaoke_segment("Hel", 100), karaoke_segment("lo", 200)]);
        let pieces = explode_karaoke(&event);
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].start_ms, 0);
        assert_eq!(pieces[0].end_ms, 1000);
        assert_eq!(pieces[1].start_ms, 1000);
        assert_eq!(pieces[1].end_ms, 3000);
    }

    #[test]
    fn karaoke_progress_is_clamped() {
        let segments = vec![karaoke_segment("a", 100), karaoke_segment("b", 100)];
        assert_eq!(get_karaoke_progress(&segments, -10), 0.0);
        assert_eq!(get_karaoke_progress(&segments, 1000), 1.0);
        assert_eq!(get_karaoke_progress(&segments, 100), 0.5);
    }

    #[test]
    fn clone_document_reassigns_ids() {
        let mut doc = Document::new();
        let id = doc.add_event(Event::new(0, 0, 1000, "hi"));
        let clone = clone_document(&doc);
        assert_ne!(clone.events[0].id, id);
    }
}
