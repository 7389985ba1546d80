//! Color primitives: the canonical ABGR word, ASS color syntax, CSS-style
//! colors (SAMI/TTML) and blending helpers.

/// Canonical 32-bit color word, `0xAABBGGRR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AbgrColor(pub u32);

impl AbgrColor {
    pub const fn from_channels(a: u8, b: u8, g: u8, r: u8) -> Self {
        Self(((a as u32) << 24) | ((b as u32) << 16) | ((g as u32) << 8) | r as u32)
    }

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_channels(0, b, g, r)
    }

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_channels(a, b, g, r)
    }

    pub const fn r(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub const fn g(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    pub const fn b(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    pub const fn a(self) -> u8 {
        ((self.0 >> 24) & 0xFF) as u8
    }

    /// Parse ASS color syntax: `&HAABBGGRR&`, `&HBBGGRR&` (alpha defaults
    /// to 0, i.e. opaque), with or without the trailing `&`.
    pub fn parse_ass(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_prefix("&H").or_else(|| s.strip_prefix("&h"))?;
        let s = s.trim_end_matches('&');
        let value = u32::from_str_radix(s, 16).ok()?;
        if s.len() <= 6 {
            Some(Self::from_channels(0, (value >> 16) as u8, (value >> 8) as u8, value as u8))
        } else {
            Some(Self::from_channels(
                (value >> 24) as u8,
                (value >> 16) as u8,
                (value >> 8) as u8,
                value as u8,
            ))
        }
    }

    /// Format as `&HAABBGGRR&`.
    pub fn format_ass(self) -> String {
        format!("&H{:02X}{:02X}{:02X}{:02X}&", self.a(), self.b(), self.g(), self.r())
    }

    /// Parse an ASS alpha-only literal, `&HAA&`, and apply it to `self`.
    pub fn with_ass_alpha(self, s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_prefix("&H").or_else(|| s.strip_prefix("&h"))?;
        let s = s.trim_end_matches('&');
        let a = u8::from_str_radix(s, 16).ok()?;
        Some(Self::from_channels(a, self.b(), self.g(), self.r()))
    }

    /// Parse CSS-style `#RGB`, `#RRGGBB` or `rgb(r,g,b)` (SAMI/TTML).
    pub fn parse_css(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return match hex.len() {
                3 => {
                    let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
                    let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
                    let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
                    Some(Self::from_rgb(r * 17, g * 17, b * 17))
                }
                6 => {
                    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                    Some(Self::from_rgb(r, g, b))
                }
                _ => None,
            };
        }
        if let Some(inner) = s.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
            let mut parts = inner.split(',').map(|p| p.trim().parse::<u8>());
            let r = parts.next()?.ok()?;
            let g = parts.next()?.ok()?;
            let b = parts.next()?.ok()?;
            return Some(Self::from_rgb(r, g, b));
        }
        named_color(s)
    }

    /// Linear per-channel interpolation (including alpha), `t` in `[0,1]`.
    pub fn blend(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| -> u8 {
            (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8
        };
        Self::from_channels(
            lerp(self.a(), other.a()),
            lerp(self.b(), other.b()),
            lerp(self.g(), other.g()),
            lerp(self.r(), other.r()),
        )
    }

    pub fn lighten(self, t: f64) -> Self {
        self.blend(Self::from_rgb(255, 255, 255), t)
    }

    pub fn darken(self, t: f64) -> Self {
        self.blend(Self::from_rgb(0, 0, 0), t)
    }
}

fn named_color(name: &str) -> Option<AbgrColor> {
    let (r, g, b) = match name.to_ascii_lowercase().as_str() {
        "white" => (255, 255, 255),
        "black" => (0, 0, 0),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "lime" => (0, 255, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "silver" => (192, 192, 192),
        "gray" | "grey" => (128, 128, 128),
        "maroon" => (128, 0, 0),
        "olive" => (128, 128, 0),
        "purple" => (128, 0, 128),
        "teal" => (0, 128, 128),
        "navy" => (0, 0, 128),
        "orange" => (255, 165, 0),
        "transparent" => return Some(AbgrColor::from_rgba(0, 0, 0, 255)),
        _ => return None,
    };
    Some(AbgrColor::from_rgb(r, g, b))
}
