//! Backdrop effects for folio.
//!
//! This crate holds the animation core: a cursor trail of short-lived
//! particles, falling-character code rain, a drifting node network over a
//! faint grid, and ambient floating shapes. Effects draw through the
//! [`Surface`] trait and are driven one frame at a time by a
//! [`FrameScheduler`].

mod animations;
mod color;
mod scheduler;
mod surface;

pub use animations::ambient::{AmbientField, AmbientShape, ShapeKind, ShapePose};
pub use animations::network::{Node, NodeNetwork, draw_grid};
pub use animations::particles::{CursorTrail, Particle};
pub use animations::pulse;
pub use animations::rain::{CodeRain, column_count};
pub use color::{ColorStop, Gradient};
pub use scheduler::{FrameScheduler, SchedulerConfig, TickOutcome};
pub use surface::{DrawCommand, Recorder, Surface};
