//! The normalized subtitle document: script info, styles, events,
//! comments, embedded data and regions.

use std::collections::HashMap;

use crate::id::{next_default_id, IdAllocator};
use crate::model::event::{Comment, Event};
use crate::model::region::VttRegion;
use crate::model::style::Style;

/// Wrap-style values recognized by ASS/SSA script info.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapStyle {
    Smart = 0,
    EndOfLine = 1,
    None = 2,
    SmartLowerWide = 3,
}

impl WrapStyle {
    pub fn from_wire(v: i32) -> Self {
        match v {
            1 => Self::EndOfLine,
            2 => Self::None,
            3 => Self::SmartLowerWide,
            _ => Self::Smart,
        }
    }

    pub fn to_wire(self) -> i32 {
        self as i32
    }
}

/// Script-level metadata (`[Script Info]` in ASS/SSA, the VTT/TTML
/// equivalents).
#[derive(Debug, Clone, Default)]
pub struct ScriptInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub play_res_x: Option<i32>,
    pub play_res_y: Option<i32>,
    pub scaled_border_and_shadow: bool,
    pub wrap_style: Option<WrapStyle>,
    /// Unrecognized `key: value` script-info lines, preserved verbatim.
    pub custom: HashMap<String, String>,
}

/// An opaque named blob: an embedded font or graphic.
#[derive(Debug, Clone)]
pub struct EmbeddedBlob {
    pub name: String,
    pub data: Vec<u8>,
}

/// An ordered, name-keyed map that remembers insertion order (first entry
/// is conventionally "Default").
#[derive(Debug, Clone, Default)]
pub struct StyleMap {
    order: Vec<String>,
    by_name: HashMap<String, Style>,
}

impl StyleMap {
    pub fn new() -> Self {
        let mut map = Self::default();
        map.insert(Style::default());
        map
    }

    pub fn insert(&mut self, style: Style) {
        if !self.by_name.contains_key(&style.name) {
            self.order.push(style.name.clone());
        }
        self.by_name.insert(style.name.clone(), style);
    }

    pub fn get(&self, name: &str) -> Option<&Style> {
        self.by_name.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Style> {
        self.by_name.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Iterate styles in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Style> {
        self.order.iter().filter_map(move |n| self.by_name.get(n))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn rename(&mut self, old: &str, new: &str) -> usize {
        if let Some(mut style) = self.by_name.remove(old) {
            style.name = new.to_string();
            if let Some(slot) = self.order.iter_mut().find(|n| *n == old) {
                *slot = new.to_string();
            }
            self.by_name.insert(new.to_string(), style);
            1
        } else {
            0
        }
    }
}

/// The normalized in-memory subtitle document.
#[derive(Debug, Clone)]
pub struct Document {
    pub script_info: ScriptInfo,
    pub styles: StyleMap,
    pub events: Vec<Event>,
    pub comments: Vec<Comment>,
    pub fonts: Vec<EmbeddedBlob>,
    pub graphics: Vec<EmbeddedBlob>,
    pub regions: Vec<VttRegion>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Construct an empty document. The style map always contains
    /// "Default" after construction.
    pub fn new() -> Self {
        Self {
            script_info: ScriptInfo::default(),
            styles: StyleMap::new(),
            events: Vec::new(),
            comments: Vec::new(),
            fonts: Vec::new(),
            graphics: Vec::new(),
            regions: Vec::new(),
        }
    }

    /// Allocate a fresh event id from the process-wide default allocator.
    pub fn next_id() -> u64 {
        next_default_id()
    }

    /// Add a dialogue event, allocating a fresh id for it if its id is 0.
    pub fn add_event(&mut self, mut event: Event) -> u64 {
        if event.id == 0 {
            event.id = Self::next_id();
        }
        let id = event.id;
        self.events.push(event);
        id
    }

    /// Deep clone this document; cloned events get fresh ids from
    /// `allocator` (or the process-wide default when `None`).
    pub fn clone_deep(&self, allocator: Option<&IdAllocator>) -> Self {
        let mut cloned = self.clone();
        for event in &mut cloned.events {
            event.id = match allocator {
                Some(a) => a.next(),
                None => Self::next_id(),
            };
        }
        cloned
    }

    /// Validate the document's invariants (spec.md §8). Returns a list of
    /// violations; an empty list means the document is well-formed.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !self.styles.contains("Default") {
            problems.push("style map is missing \"Default\"".to_string());
        }
        let mut seen = std::collections::HashSet::new();
        for event in &self.events {
            if event.end_ms < event.start_ms {
                problems.push(format!("event {} has end < start", event.id));
            }
            if !seen.insert(event.id) {
                problems.push(format!("duplicate event id {}", event.id));
            }
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_has_default_style() {
        let doc = Document::new();
        assert!(doc.styles.contains("Default"));
        assert!(doc.validate().is_empty());
    }

    #[test]
    fn clone_deep_gives_fresh_ids_and_independent_buffers() {
        let mut doc = Document::new();
        let id = doc.add_event(Event::new(0, 0, 1000, "hi"));
        let mut clone = doc.clone_deep(None);
        assert_ne!(clone.events[0].id, id);

        clone.events[0].text = "changed".to_string();
        assert_eq!(doc.events[0].text, "hi");
    }

    #[test]
    fn duplicate_ids_detected_by_validate() {
        let mut doc = Document::new();
        doc.events.push(Event::new(7, 0, 1000, "a"));
        doc.events.push(Event::new(7, 0, 1000, "b"));
        assert!(!doc.validate().is_empty());
    }
}
