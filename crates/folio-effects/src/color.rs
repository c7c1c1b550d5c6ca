//! Colour helpers for backdrop effects.

use folio_core::Rgb;

/// Sky blue used by the grid and rain.
pub const SKY: Rgb = Rgb::new(14, 165, 233);
/// Soft violet used by the node network and rain tail.
pub const VIOLET: Rgb = Rgb::new(167, 139, 250);
pub const PURPLE: Rgb = Rgb::new(168, 85, 247);
pub const PINK: Rgb = Rgb::new(236, 72, 153);
pub const INDIGO: Rgb = Rgb::new(99, 102, 241);

/// A colour with its own opacity at a position along a gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    /// Position along the gradient (0.0 - 1.0).
    pub offset: f32,
    pub color: Rgb,
    pub alpha: f32,
}

/// A linear gradient made of sorted colour stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    stops: Vec<ColorStop>,
}

impl Gradient {
    /// Build a gradient. Stops are sorted by offset.
    pub fn new(mut stops: Vec<ColorStop>) -> Self {
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        Self { stops }
    }

    /// The rain glyph gradient: transparent sky at the top, bright sky in
    /// the middle, translucent violet at the baseline.
    pub fn rain() -> Self {
        Self::new(vec![
            ColorStop {
                offset: 0.0,
                color: SKY,
                alpha: 0.0,
            },
            ColorStop {
                offset: 0.5,
                color: SKY,
                alpha: 0.8,
            },
            ColorStop {
                offset: 1.0,
                color: VIOLET,
                alpha: 0.4,
            },
        ])
    }

    /// Stops in offset order.
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Colour and opacity at position `t` (clamped to the stop range).
    pub fn sample(&self, t: f32) -> (Rgb, f32) {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return (Rgb::BLACK, 0.0);
        };
        if t <= first.offset {
            return (first.color, first.alpha);
        }
        if t >= last.offset {
            return (last.color, last.alpha);
        }

        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.offset {
                let span = (b.offset - a.offset).max(f32::EPSILON);
                let local = (t - a.offset) / span;
                return (
                    a.color.lerp(b.color, local),
                    a.alpha + (b.alpha - a.alpha) * local,
                );
            }
        }
        (last.color, last.alpha)
    }
}
