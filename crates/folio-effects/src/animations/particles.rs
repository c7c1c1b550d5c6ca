//! Cursor trail particles (stateful).

use std::time::Duration;

use folio_core::{ParticleParams, Point, Rgb};
use rand::{Rng, seq::SliceRandom};

use super::pulse;
use crate::surface::Surface;

/// Used when the configured palette is empty.
const FALLBACK_COLOR: Rgb = Rgb::new(0x63, 0x66, 0xf1);

/// Period of the pointer follower's pulse.
const FOLLOWER_PERIOD: Duration = Duration::from_secs(3);

/// A single short-lived speck.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Frames lived so far.
    pub age: u32,
    /// Frames after which the particle is removed.
    pub max_lifespan: u32,
    pub radius: f32,
    pub color: Rgb,
}

impl Particle {
    /// Spawn a particle at `at` with randomized velocity, lifespan, size and colour.
    pub fn spawn<R: Rng + ?Sized>(at: Point, params: &ParticleParams, rng: &mut R) -> Self {
        let spread = params.velocity_spread();
        let mut velocity = || {
            if spread > 0.0 {
                rng.gen_range(-spread..spread)
            } else {
                0.0
            }
        };
        let vx = velocity();
        let vy = velocity();

        Self {
            x: at.x,
            y: at.y,
            vx,
            vy,
            age: 0,
            max_lifespan: rng.gen_range(params.lifespan_range()),
            radius: rng.gen_range(params.radius_range()),
            color: params
                .palette
                .choose(rng)
                .copied()
                .unwrap_or(FALLBACK_COLOR),
        }
    }

    /// Advance one frame: age first, then position, then gravity.
    ///
    /// The first step therefore moves the particle by its spawn velocity.
    pub fn step(&mut self, gravity: f32) {
        self.age = self.age.saturating_add(1);
        self.x += self.vx;
        self.y += self.vy;
        self.vy += gravity;
    }

    /// Opacity factor: 1 at birth, 0 once `age` reaches `max_lifespan`.
    pub fn fade(&self) -> f32 {
        if self.max_lifespan == 0 {
            return 0.0;
        }
        (1.0 - self.age as f32 / self.max_lifespan as f32).max(0.0)
    }

    /// Whether the particle has reached its lifespan.
    pub fn is_expired(&self) -> bool {
        self.age >= self.max_lifespan
    }

    /// Current position.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// The live particle collection plus the pointer follower ring.
#[derive(Debug, Clone)]
pub struct CursorTrail {
    particles: Vec<Particle>,
    /// Last known pointer position.
    pointer: Option<Point>,
    params: ParticleParams,
}

impl CursorTrail {
    /// Construct an empty [`CursorTrail`].
    pub fn new(params: ParticleParams) -> Self {
        Self {
            particles: Vec::new(),
            pointer: None,
            params,
        }
    }

    /// Spawn `emission_count` particles at the pointer.
    pub fn emit<R: Rng + ?Sized>(&mut self, at: Point, rng: &mut R) {
        self.pointer = Some(at);
        self.particles.reserve(self.params.emission_count);
        for _ in 0..self.params.emission_count {
            self.particles.push(Particle::spawn(at, &self.params, rng));
        }
    }

    /// Live particles, oldest first.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of live particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether no particles are alive.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Where the pointer was last seen.
    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    /// Clear the surface, advance and draw every particle, drop the expired
    /// ones, then draw the follower ring.
    pub fn update<S: Surface + ?Sized>(&mut self, surface: &mut S, elapsed: Duration) {
        surface.clear();

        let gravity = self.params.gravity;
        self.particles.retain_mut(|particle| {
            particle.step(gravity);
            let alpha = particle.fade();
            if alpha > 0.0 {
                surface.fill_circle(particle.position(), particle.radius, particle.color, alpha);
            }
            !particle.is_expired()
        });

        self.draw_follower(surface, elapsed);
    }

    fn draw_follower<S: Surface + ?Sized>(&self, surface: &mut S, elapsed: Duration) {
        let Some(pointer) = self.pointer else {
            return;
        };
        let base = self.params.follower_radius();
        if base <= 0.0 {
            return;
        }

        let period = FOLLOWER_PERIOD.as_millis();
        let phase = (elapsed.as_millis() % period) as f32 / period as f32;
        let radius = base * (1.0 + 0.2 * pulse(phase));

        let ring = self.params.palette.first().copied().unwrap_or(FALLBACK_COLOR);
        let core = self.params.palette.get(1).copied().unwrap_or(ring);
        surface.stroke_circle(pointer, radius, ring, 0.8);
        surface.fill_circle(pointer, base / 4.0, core, 0.6);
    }
}
