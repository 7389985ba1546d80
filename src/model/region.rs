//! WebVTT region definitions.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    None,
    Up,
}

#[derive(Debug, Clone)]
pub struct VttRegion {
    pub id: String,
    /// Percent string, e.g. `"40%"`.
    pub width: String,
    pub lines: i32,
    pub region_anchor: (f64, f64),
    pub viewport_anchor: (f64, f64),
    pub scroll: ScrollMode,
}

impl Default for VttRegion {
    fn default() -> Self {
        Self {
            id: String::new(),
            width: "100%".to_string(),
            lines: 3,
            region_anchor: (0.0, 100.0),
            viewport_anchor: (0.0, 100.0),
            scroll: ScrollMode::None,
        }
    }
}
