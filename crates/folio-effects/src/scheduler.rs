//! Frame scheduling for all backdrop effects.

use std::time::Duration;

use folio_core::{
    AmbientParams, EffectToggles, NetworkParams, ParticleParams, Point, RainParams, Viewport,
};
use rand::{SeedableRng, rngs::StdRng};

use crate::animations::{ambient, network, particles, rain};
use crate::surface::Surface;

/// Everything needed to build a [`FrameScheduler`].
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfig {
    pub toggles: EffectToggles,
    pub particles: ParticleParams,
    pub rain: RainParams,
    pub network: NetworkParams,
    pub ambient: AmbientParams,
    /// Fixed seed for reproducible runs; `None` seeds from the OS.
    pub seed: Option<u64>,
}

/// Whether the host should schedule another frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Stopped,
}

/// Owns every effect's state and advances it one frame per [`tick`](Self::tick).
///
/// The host drives it: forward pointer moves to [`pointer_moved`](Self::pointer_moved),
/// viewport changes to [`resize`](Self::resize), and call `tick` once per
/// display refresh until it returns [`TickOutcome::Stopped`].
#[derive(Debug)]
pub struct FrameScheduler {
    toggles: EffectToggles,
    grid_spacing: f32,
    trail: particles::CursorTrail,
    rain: rain::CodeRain,
    network: network::NodeNetwork,
    ambient: ambient::AmbientField,
    viewport: Viewport,
    rng: StdRng,
    frame: u64,
    running: bool,
}

impl FrameScheduler {
    /// Build every effect for `viewport`.
    pub fn new(config: SchedulerConfig, viewport: Viewport) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let grid_spacing = config.network.grid_spacing;
        let network = network::NodeNetwork::new(config.network, viewport, &mut rng);
        let ambient = ambient::AmbientField::new(&config.ambient, &mut rng);

        Self {
            toggles: config.toggles,
            grid_spacing,
            trail: particles::CursorTrail::new(config.particles),
            rain: rain::CodeRain::new(config.rain, viewport),
            network,
            ambient,
            viewport,
            rng,
            frame: 0,
            running: true,
        }
    }

    /// Spawn cursor trail particles at the pointer.
    pub fn pointer_moved(&mut self, at: Point) {
        if !self.running || !self.toggles.cursor_trail {
            return;
        }
        self.trail.emit(at, &mut self.rng);
    }

    /// Adopt new viewport dimensions.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.rain.resize(viewport);
        self.network.resize(viewport);
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            columns = self.rain.columns(),
            "viewport resized"
        );
    }

    /// Advance and draw one frame.
    ///
    /// The rain goes to `backdrop`, which is faded rather than cleared while
    /// the rain is on so glyphs leave trails. Everything else goes to
    /// `overlay`, which is cleared every frame: the cursor trail first, then
    /// the grid, the node network and the ambient shapes.
    pub fn tick<B, O>(&mut self, elapsed: Duration, backdrop: &mut B, overlay: &mut O) -> TickOutcome
    where
        B: Surface + ?Sized,
        O: Surface + ?Sized,
    {
        if !self.running {
            return TickOutcome::Stopped;
        }

        if self.toggles.cursor_trail {
            self.trail.update(overlay, elapsed);
        } else {
            overlay.clear();
        }

        if self.toggles.grid {
            network::draw_grid(overlay, self.viewport, self.grid_spacing);
        }
        if self.toggles.network {
            self.network.update(overlay);
        }
        if self.toggles.ambient {
            self.ambient.draw(overlay, self.viewport, elapsed);
        }

        if self.toggles.rain {
            self.rain.update(backdrop, &mut self.rng);
        } else {
            backdrop.clear();
        }

        self.frame += 1;
        TickOutcome::Continue
    }

    /// Stop scheduling. Every later tick returns [`TickOutcome::Stopped`].
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            tracing::debug!(frames = self.frame, "frame scheduler stopped");
        }
    }

    /// Whether [`stop`](Self::stop) has not been called yet.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames drawn so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Current viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The cursor trail state.
    pub fn trail(&self) -> &particles::CursorTrail {
        &self.trail
    }

    /// The code rain state.
    pub fn rain(&self) -> &rain::CodeRain {
        &self.rain
    }

    /// The node network state.
    pub fn network(&self) -> &network::NodeNetwork {
        &self.network
    }

    /// The ambient shapes.
    pub fn ambient(&self) -> &ambient::AmbientField {
        &self.ambient
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, Recorder};

    fn scheduler(toggles: EffectToggles) -> FrameScheduler {
        FrameScheduler::new(
            SchedulerConfig {
                toggles,
                seed: Some(2024),
                ..Default::default()
            },
            Viewport::new(700.0, 420.0),
        )
    }

    fn only_trail() -> EffectToggles {
        EffectToggles {
            cursor_trail: true,
            rain: false,
            network: false,
            grid: false,
            ambient: false,
        }
    }

    #[test]
    fn test_pointer_moved_emits() {
        let mut scheduler = scheduler(EffectToggles::default());
        scheduler.pointer_moved(Point::new(100.0, 100.0));
        assert_eq!(scheduler.trail().len(), 3);
    }

    #[test]
    fn test_trail_disabled_ignores_pointer() {
        let mut scheduler = scheduler(EffectToggles {
            cursor_trail: false,
            ..Default::default()
        });
        scheduler.pointer_moved(Point::new(100.0, 100.0));
        assert!(scheduler.trail().is_empty());
    }

    #[test]
    fn test_first_tick_moves_by_initial_velocity() {
        let mut scheduler = scheduler(only_trail());
        scheduler.pointer_moved(Point::new(100.0, 100.0));
        let initial: Vec<f32> = scheduler.trail().particles().iter().map(|p| p.vy).collect();

        let (mut backdrop, mut overlay) = (Recorder::new(), Recorder::new());
        let outcome = scheduler.tick(Duration::ZERO, &mut backdrop, &mut overlay);
        assert_eq!(outcome, TickOutcome::Continue);

        for (p, vy) in scheduler.trail().particles().iter().zip(initial) {
            assert_eq!(p.y, 100.0 + vy);
        }
    }

    #[test]
    fn test_trail_drains_after_max_lifespan() {
        let mut scheduler = scheduler(only_trail());
        scheduler.pointer_moved(Point::new(10.0, 10.0));
        let longest = scheduler
            .trail()
            .particles()
            .iter()
            .map(|p| p.max_lifespan)
            .max()
            .unwrap();

        let (mut backdrop, mut overlay) = (Recorder::new(), Recorder::new());
        for _ in 0..longest {
            scheduler.tick(Duration::ZERO, &mut backdrop, &mut overlay);
        }
        assert!(scheduler.trail().is_empty());
        assert_eq!(scheduler.frame_count(), u64::from(longest));
    }

    #[test]
    fn test_stop_halts_ticks() {
        let mut scheduler = scheduler(EffectToggles::default());
        let (mut backdrop, mut overlay) = (Recorder::new(), Recorder::new());
        assert_eq!(
            scheduler.tick(Duration::ZERO, &mut backdrop, &mut overlay),
            TickOutcome::Continue
        );

        scheduler.stop();
        let (mut backdrop, mut overlay) = (Recorder::new(), Recorder::new());
        assert_eq!(
            scheduler.tick(Duration::ZERO, &mut backdrop, &mut overlay),
            TickOutcome::Stopped
        );
        assert!(backdrop.commands().is_empty());
        assert!(overlay.commands().is_empty());
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.frame_count(), 1);

        scheduler.pointer_moved(Point::new(1.0, 1.0));
        assert!(scheduler.trail().is_empty());
    }

    #[test]
    fn test_resize_recomputes_rain_columns() {
        let mut scheduler = scheduler(EffectToggles::default());
        assert_eq!(scheduler.rain().columns(), 50);

        scheduler.resize(Viewport::new(1000.0, 420.0));
        assert_eq!(scheduler.viewport(), Viewport::new(1000.0, 420.0));
        assert_eq!(scheduler.rain().columns(), 71);
        assert_eq!(scheduler.rain().drops().len(), 71);
    }

    #[test]
    fn test_backdrop_cleared_without_rain() {
        let mut scheduler = scheduler(EffectToggles {
            rain: false,
            ..Default::default()
        });
        let (mut backdrop, mut overlay) = (Recorder::new(), Recorder::new());
        scheduler.tick(Duration::ZERO, &mut backdrop, &mut overlay);
        assert_eq!(backdrop.commands()[0], DrawCommand::Clear);
        assert_eq!(backdrop.glyphs(), 0);
    }

    #[test]
    fn test_backdrop_faded_with_rain() {
        let mut scheduler = scheduler(EffectToggles::default());
        let (mut backdrop, mut overlay) = (Recorder::new(), Recorder::new());
        scheduler.tick(Duration::ZERO, &mut backdrop, &mut overlay);
        assert!(matches!(backdrop.commands()[0], DrawCommand::Fade { .. }));
        assert_eq!(backdrop.glyphs(), 50);
        assert_eq!(backdrop.commands().len(), 51);
        assert_eq!(overlay.commands()[0], DrawCommand::Clear);
    }

    #[test]
    fn test_network_and_shapes_on_overlay() {
        let mut scheduler = scheduler(EffectToggles {
            cursor_trail: false,
            rain: false,
            ..Default::default()
        });
        let (mut backdrop, mut overlay) = (Recorder::new(), Recorder::new());
        scheduler.tick(Duration::ZERO, &mut backdrop, &mut overlay);
        assert_eq!(backdrop.commands(), &[DrawCommand::Clear]);
        assert_eq!(overlay.commands()[0], DrawCommand::Clear);
        assert!(overlay.filled_circles() >= 50);
        assert!(
            overlay
                .commands()
                .iter()
                .any(|c| matches!(c, DrawCommand::Polygon { .. }))
        );
    }

    #[test]
    fn test_same_seed_same_trajectories() {
        let mut a = scheduler(only_trail());
        let mut b = scheduler(only_trail());
        a.pointer_moved(Point::new(5.0, 5.0));
        b.pointer_moved(Point::new(5.0, 5.0));
        assert_eq!(a.trail().particles(), b.trail().particles());
    }
}
