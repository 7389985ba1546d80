//! Named style defaults referenced by events.

use crate::primitives::color::AbgrColor;

/// Border style: outline+shadow vs. opaque box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    OutlineAndShadow,
    OpaqueBox,
}

impl BorderStyle {
    pub fn from_wire(v: i32) -> Self {
        if v == 3 {
            Self::OpaqueBox
        } else {
            Self::OutlineAndShadow
        }
    }

    pub fn to_wire(self) -> i32 {
        match self {
            Self::OutlineAndShadow => 1,
            Self::OpaqueBox => 3,
        }
    }
}

/// A named collection of visual defaults referenced by events.
#[derive(Debug, Clone)]
pub struct Style {
    pub name: String,
    pub font_name: String,
    pub font_size: f64,
    pub primary_color: AbgrColor,
    pub secondary_color: AbgrColor,
    pub outline_color: AbgrColor,
    pub back_color: AbgrColor,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
    pub scale_x: f64,
    pub scale_y: f64,
    pub spacing: f64,
    pub angle: f64,
    pub border_style: BorderStyle,
    pub outline: f64,
    pub shadow: f64,
    /// Numpad alignment, 1 (bottom-left) .. 9 (top-right).
    pub alignment: u8,
    pub margin_l: i32,
    pub margin_r: i32,
    pub margin_v: i32,
    pub encoding: i32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            font_name: "Arial".to_string(),
            font_size: 20.0,
            primary_color: AbgrColor::from_rgb(255, 255, 255),
            secondary_color: AbgrColor::from_rgb(255, 0, 0),
            outline_color: AbgrColor::from_rgb(0, 0, 0),
            back_color: AbgrColor::from_rgb(0, 0, 0),
            bold: false,
            italic: false,
            underline: false,
            strikeout: false,
            scale_x: 100.0,
            scale_y: 100.0,
            spacing: 0.0,
            angle: 0.0,
            border_style: BorderStyle::OutlineAndShadow,
            outline: 2.0,
            shadow: 2.0,
            alignment: 2,
            margin_l: 10,
            margin_r: 10,
            margin_v: 10,
            encoding: 1,
        }
    }
}

impl Style {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Convert an SSA v4 alignment (legacy scheme) to numpad.
    ///
    /// SSA: 1=left, 2=center, 3=right (bottom row); +8 mid-row; +4 top row
    /// (so e.g. 9=top-left, 10=top-center, 11=top-right).
    pub fn ssa_alignment_to_numpad(ssa: i32) -> u8 {
        match ssa {
            1 => 1,
            2 => 2,
            3 => 3,
            5 => 4,
            6 => 5,
            7 => 6,
            9 => 7,
            10 => 8,
            11 => 9,
            other => other.clamp(1, 9) as u8,
        }
    }

    /// Convert numpad alignment back to the SSA v4 legacy scheme.
    pub fn numpad_alignment_to_ssa(numpad: u8) -> i32 {
        match numpad {
            1 => 1,
            2 => 2,
            3 => 3,
            4 => 5,
            5 => 6,
            6 => 7,
            7 => 9,
            8 => 10,
            9 => 11,
            other => other as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssa_alignment_roundtrip_scenario_c() {
        // Style line `...,9,...` (SSA top-left) -> numpad 7; re-serialized -> 9.
        let numpad = Style::ssa_alignment_to_numpad(9);
        assert_eq!(numpad, 7);
        assert_eq!(Style::numpad_alignment_to_ssa(numpad), 9);
    }
}
