use image::Rgba;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f32,
}

pub const GREEN: &str = "#22c55e";
pub const RED: &str = "#f87171";
pub const YELLOW: &str = "#ffff00";

impl Color {
    pub fn from_hex(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .unwrap_or(0)
        };
        Color {
            r: channel(0..2),
            g: channel(2..4),
            b: channel(4..6),
            alpha: 1.0,
        }
    }

    pub fn with_alpha(self, alpha: f32) -> Color {
        Color { alpha, ..self }
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u8])
    }

    /// Source-over blend of `self` onto an opaque pixel.
    pub fn blend_onto(self, dst: Rgba<u8>) -> Rgba<u8> {
        let a = self.alpha.clamp(0.0, 1.0);
        let mix = |s: u8, d: u8| (s as f32 * a + d as f32 * (1.0 - a)).round() as u8;
        Rgba([mix(self.r, dst[0]), mix(self.g, dst[1]), mix(self.b, dst[2]), 255])
    }
}

/// The three mutually exclusive looks a county can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionVisual {
    Default,
    Hovered,
    Selected,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleDescriptor {
    pub fill: Color,
    pub outline: Color,
    pub outline_width: f32,
}

/// Extra border drawn on top of the selected county.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineOverlay {
    pub color: Color,
    pub width: f32,
    pub clamp_to_ground: bool,
}

pub fn style_for(visual: RegionVisual) -> StyleDescriptor {
    match visual {
        RegionVisual::Default => StyleDescriptor {
            fill: Color::from_hex(GREEN).with_alpha(0.1),
            outline: Color::from_hex(GREEN).with_alpha(0.8),
            outline_width: 2.0,
        },
        RegionVisual::Hovered => StyleDescriptor {
            fill: Color::from_hex(RED).with_alpha(0.3),
            outline: Color::from_hex(RED).with_alpha(0.8),
            outline_width: 3.0,
        },
        RegionVisual::Selected => StyleDescriptor {
            fill: Color::from_hex(YELLOW).with_alpha(0.4),
            outline: Color::from_hex(YELLOW),
            outline_width: 4.0,
        },
    }
}

pub fn overlay_for(visual: RegionVisual) -> Option<OutlineOverlay> {
    match visual {
        RegionVisual::Selected => Some(OutlineOverlay {
            color: Color::from_hex(YELLOW),
            width: 5.0,
            clamp_to_ground: true,
        }),
        RegionVisual::Default | RegionVisual::Hovered => None,
    }
}
