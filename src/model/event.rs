//! Events: a single on-screen subtitle with timing, styling and text.

use crate::model::segment::TextSegment;

/// Indexed or RGBA bitmap carried by image-subtitle formats (PGS, DVB,
/// VobSub).
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    /// `Some` for indexed images; pairs with `palette`.
    pub indexed: Option<Vec<u8>>,
    /// ABGR palette entries, present when `indexed` is `Some`.
    pub palette: Vec<crate::primitives::color::AbgrColor>,
    /// RGBA pixels, used when the image is not palette-indexed.
    pub rgba: Option<Vec<u8>>,
}

/// Format-specific sidecar data that doesn't fit the common event shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Sidecar {
    VobSub {
        forced: bool,
        original_track_index: Option<u32>,
    },
    Pgs {
        composition_number: u16,
        window_number: u8,
    },
}

/// A single subtitle event (dialogue line or comment anchor point).
#[derive(Debug, Clone)]
pub struct Event {
    /// Unique positive integer id (process-monotonic).
    pub id: u64,
    pub start_ms: i64,
    pub end_ms: i64,
    pub layer: i32,
    /// Style name; resolution against the document is lazy.
    pub style: String,
    pub actor: String,
    /// `0` means "inherit style".
    pub margin_l: i32,
    pub margin_r: i32,
    pub margin_v: i32,
    pub effect: String,
    /// Format-native representation (opaque payload of tags).
    pub text: String,
    /// Structured segments. Authoritative when `dirty == true`.
    pub segments: Vec<TextSegment>,
    /// `dirty == true` iff `segments` is authoritative and `text` may be
    /// stale; serializers re-derive `text` from `segments` in that case.
    pub dirty: bool,
    pub image: Option<Image>,
    pub sidecar: Option<Sidecar>,
}

impl Event {
    pub fn new(id: u64, start_ms: i64, end_ms: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            start_ms,
            end_ms,
            layer: 0,
            style: "Default".to_string(),
            actor: String::new(),
            margin_l: 0,
            margin_r: 0,
            margin_v: 0,
            effect: String::new(),
            text: text.into(),
            segments: Vec::new(),
            dirty: false,
            image: None,
            sidecar: None,
        }
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }

    /// The effective plain text: segment concatenation when dirty, else
    /// the stored `text`.
    pub fn effective_text(&self) -> String {
        if self.dirty {
            self.segments.iter().map(|s| s.text.as_str()).collect()
        } else {
            self.text.clone()
        }
    }

    /// Set `segments` and mark the event dirty so serializers re-derive
    /// `text` at write time.
    pub fn set_segments(&mut self, segments: Vec<TextSegment>) {
        self.segments = segments;
        self.dirty = true;
    }

    /// Deep clone with a fresh id from `allocator`.
    pub fn clone_with_new_id(&self, allocator: &crate::id::IdAllocator) -> Self {
        let mut cloned = self.clone();
        cloned.id = allocator.next();
        cloned
    }

    pub fn shift(&mut self, delta_ms: i64) {
        self.start_ms += delta_ms;
        self.end_ms += delta_ms;
    }

    pub fn scale_about(&mut self, factor: f64, pivot_ms: i64) {
        self.start_ms = scale_time(self.start_ms, factor, pivot_ms);
        self.end_ms = scale_time(self.end_ms, factor, pivot_ms);
    }
}

pub(crate) fn scale_time(t: i64, factor: f64, pivot: i64) -> i64 {
    (pivot as f64 + (t - pivot) as f64 * factor).round() as i64
}

/// A comment anchored to a position in the event list, preserved across
/// ASS/SSA parse+serialize so relative ordering to dialogue is stable.
#[derive(Debug, Clone)]
pub struct Comment {
    pub before_event_index: usize,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_then_unshift_is_identity() {
        let mut e = Event::new(1, 1000, 2000, "hi");
        e.shift(500);
        e.shift(-500);
        assert_eq!((e.start_ms, e.end_ms), (1000, 2000));
    }

    #[test]
    fn scale_then_inverse_scale_is_identity_modulo_rounding() {
        let mut e = Event::new(1, 1000, 3000, "hi");
        e.scale_about(2.0, 0);
        e.scale_about(0.5, 0);
        assert_eq!((e.start_ms, e.end_ms), (1000, 3000));
    }
}
