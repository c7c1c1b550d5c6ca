//! Ambient floating shapes (stateless: every value is derived from elapsed time).

use std::f32::consts::TAU;
use std::time::Duration;

use folio_core::{AmbientParams, Point, Rgb, Viewport};
use rand::Rng;

use super::pulse;
use crate::color::{INDIGO, PINK, PURPLE, SKY};
use crate::surface::Surface;

/// Vertical rise of an outline shape at the top of its cycle.
const SHAPE_RISE: f32 = 30.0;

/// What an ambient shape looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// Square outline.
    Square,
    /// Circle outline.
    Circle,
    /// Diamond outline.
    Diamond,
    /// Large soft filled glow.
    Orb,
}

/// A decorative shape with randomized placement and timing.
#[derive(Debug, Clone, PartialEq)]
pub struct AmbientShape {
    pub kind: ShapeKind,
    /// Anchor as a fraction of the viewport (0.0 - 1.0 on each axis).
    pub anchor: Point,
    /// Width of the shape (diameter for circles and orbs).
    pub size: f32,
    pub color: Rgb,
    /// Peak offset from the anchor.
    pub drift: Point,
    /// Seconds per cycle.
    pub duration: f32,
    /// Seconds before the first cycle starts.
    pub delay: f32,
}

/// Where and how to draw a shape at a given moment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapePose {
    pub center: Point,
    /// Rotation in radians.
    pub rotation: f32,
    pub alpha: f32,
    pub scale: f32,
}

impl AmbientShape {
    fn outline<R: Rng + ?Sized>(index: usize, rng: &mut R) -> Self {
        let (kind, size, color) = match index % 3 {
            0 => (ShapeKind::Square, 80.0, SKY),
            1 => (ShapeKind::Circle, 64.0, PURPLE),
            _ => (ShapeKind::Diamond, 96.0, PINK),
        };
        Self {
            kind,
            anchor: Point::new(rng.r#gen(), rng.r#gen()),
            size,
            color,
            drift: Point::new(rng.gen_range(-10.0..10.0), -SHAPE_RISE),
            duration: rng.gen_range(10.0..20.0),
            delay: rng.gen_range(0.0..5.0),
        }
    }

    fn orb<R: Rng + ?Sized>(index: usize, rng: &mut R) -> Self {
        Self {
            kind: ShapeKind::Orb,
            anchor: Point::new(rng.r#gen(), rng.r#gen()),
            size: rng.gen_range(200.0..400.0),
            color: if index % 2 == 0 { INDIGO } else { PURPLE },
            drift: Point::new(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0)),
            duration: rng.gen_range(20.0..30.0),
            delay: 0.0,
        }
    }

    /// Position in the current cycle (0.0 - 1.0); 0 until the delay has passed.
    pub fn phase(&self, elapsed: Duration) -> f32 {
        let t = elapsed.as_secs_f32() - self.delay;
        if t <= 0.0 || self.duration <= 0.0 {
            return 0.0;
        }
        (t / self.duration).fract()
    }

    /// Pose at `elapsed`. Equal inputs always give equal poses.
    pub fn pose(&self, viewport: Viewport, elapsed: Duration) -> ShapePose {
        let phase = self.phase(elapsed);
        let envelope = pulse(phase);
        let center = Point::new(
            self.anchor.x * viewport.width + self.drift.x * envelope,
            self.anchor.y * viewport.height + self.drift.y * envelope,
        );

        match self.kind {
            ShapeKind::Orb => ShapePose {
                center,
                rotation: 0.0,
                alpha: 0.1 * (0.3 + 0.2 * envelope),
                scale: 1.0 + 0.2 * envelope,
            },
            _ => ShapePose {
                center,
                rotation: phase * TAU,
                alpha: 0.1 + 0.2 * envelope,
                scale: 1.0,
            },
        }
    }

    /// Corner points for polygon kinds; empty for circles and orbs.
    pub fn outline_points(&self, pose: &ShapePose) -> Vec<Point> {
        let half = self.size * pose.scale / 2.0;
        let corners: &[(f32, f32)] = match self.kind {
            ShapeKind::Square => &[(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)],
            ShapeKind::Diamond => &[(0.0, -1.0), (1.0, 0.0), (0.0, 1.0), (-1.0, 0.0)],
            ShapeKind::Circle | ShapeKind::Orb => &[],
        };
        let (sin, cos) = pose.rotation.sin_cos();
        corners
            .iter()
            .map(|&(cx, cy)| {
                let (x, y) = (cx * half, cy * half);
                Point::new(
                    pose.center.x + x * cos - y * sin,
                    pose.center.y + x * sin + y * cos,
                )
            })
            .collect()
    }

    /// Draw the shape as it looks at `elapsed`.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, viewport: Viewport, elapsed: Duration) {
        let pose = self.pose(viewport, elapsed);
        let radius = self.size * pose.scale / 2.0;
        match self.kind {
            ShapeKind::Orb => surface.fill_circle(pose.center, radius, self.color, pose.alpha),
            ShapeKind::Circle => surface.stroke_circle(pose.center, radius, self.color, pose.alpha),
            ShapeKind::Square | ShapeKind::Diamond => {
                surface.stroke_polygon(&self.outline_points(&pose), self.color, pose.alpha)
            }
        }
    }
}

/// The full set of ambient shapes for one session.
#[derive(Debug, Clone)]
pub struct AmbientField {
    shapes: Vec<AmbientShape>,
}

impl AmbientField {
    /// Lay out the orbs and outline shapes at random.
    pub fn new<R: Rng + ?Sized>(params: &AmbientParams, rng: &mut R) -> Self {
        let orbs = (0..params.orb_count).map(|i| AmbientShape::orb(i, rng)).collect::<Vec<_>>();
        let outlines = (0..params.shape_count).map(|i| AmbientShape::outline(i, rng));
        // Orbs first so outlines are drawn over them.
        let shapes = orbs.into_iter().chain(outlines).collect();
        Self { shapes }
    }

    /// Every shape, orbs first.
    pub fn shapes(&self) -> &[AmbientShape] {
        &self.shapes
    }

    /// Draw every shape as it looks at `elapsed`.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, viewport: Viewport, elapsed: Duration) {
        for shape in &self.shapes {
            shape.draw(surface, viewport, elapsed);
        }
    }
}
