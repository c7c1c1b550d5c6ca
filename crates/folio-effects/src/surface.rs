//! Drawing surface abstraction.
//!
//! Effects never talk to a terminal or a canvas directly. They issue
//! commands against a [`Surface`], which the host implements. All
//! coordinates are in surface units and every `alpha` is in `0.0..=1.0`.

use folio_core::{Point, Rgb};

use crate::color::Gradient;

/// A 2D drawing target provided by the host.
pub trait Surface {
    /// Erase everything.
    fn clear(&mut self);

    /// Paint a translucent layer of `color` over the whole surface.
    fn fade(&mut self, color: Rgb, alpha: f32);

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgb, alpha: f32);

    fn stroke_circle(&mut self, center: Point, radius: f32, color: Rgb, alpha: f32);

    fn stroke_line(&mut self, from: Point, to: Point, color: Rgb, alpha: f32);

    /// Closed outline through `points`.
    fn stroke_polygon(&mut self, points: &[Point], color: Rgb, alpha: f32);

    /// Draw `glyph` with its baseline at `origin`, filled with a vertical
    /// gradient spanning one glyph height above the baseline.
    fn fill_glyph(&mut self, origin: Point, glyph: char, gradient: &Gradient);
}

/// A recorded drawing command.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Fade {
        color: Rgb,
        alpha: f32,
    },
    FillCircle {
        center: Point,
        radius: f32,
        color: Rgb,
        alpha: f32,
    },
    StrokeCircle {
        center: Point,
        radius: f32,
        color: Rgb,
        alpha: f32,
    },
    Line {
        from: Point,
        to: Point,
        color: Rgb,
        alpha: f32,
    },
    Polygon {
        points: Vec<Point>,
        color: Rgb,
        alpha: f32,
    },
    Glyph {
        origin: Point,
        glyph: char,
    },
}

/// A surface that records commands instead of drawing them.
#[derive(Debug, Default)]
pub struct Recorder {
    commands: Vec<DrawCommand>,
}

impl Recorder {
    /// Construct an empty [`Recorder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded so far, in order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the recorded commands.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of recorded filled circles.
    pub fn filled_circles(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillCircle { .. }))
            .count()
    }

    /// Number of recorded glyphs.
    pub fn glyphs(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Glyph { .. }))
            .count()
    }
}

impl Surface for Recorder {
    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fade(&mut self, color: Rgb, alpha: f32) {
        self.commands.push(DrawCommand::Fade { color, alpha });
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgb, alpha: f32) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
            alpha,
        });
    }

    fn stroke_circle(&mut self, center: Point, radius: f32, color: Rgb, alpha: f32) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            color,
            alpha,
        });
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Rgb, alpha: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            alpha,
        });
    }

    fn stroke_polygon(&mut self, points: &[Point], color: Rgb, alpha: f32) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
            alpha,
        });
    }

    fn fill_glyph(&mut self, origin: Point, glyph: char, _gradient: &Gradient) {
        self.commands.push(DrawCommand::Glyph { origin, glyph });
    }
}
