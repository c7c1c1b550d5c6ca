//! Tunable parameters for each effect.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::Rgb;

/// Which effects the frame scheduler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectToggles {
    pub cursor_trail: bool,
    pub rain: bool,
    pub network: bool,
    pub grid: bool,
    pub ambient: bool,
}

impl Default for EffectToggles {
    fn default() -> Self {
        Self {
            cursor_trail: true,
            rain: true,
            network: true,
            grid: true,
            ambient: true,
        }
    }
}

/// Cursor trail particle parameters. Times are in frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleParams {
    /// Particles spawned per pointer event.
    pub emission_count: usize,
    /// Half-width of the symmetric velocity range on each axis.
    pub spread: f32,
    /// Added to vy once per frame.
    pub gravity: f32,
    pub lifespan_min: u32,
    pub lifespan_max: u32,
    pub radius_min: f32,
    pub radius_max: f32,
    pub palette: Vec<Rgb>,
    /// Base radius of the ring that follows the pointer; 0 disables it.
    pub follower_radius: f32,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            emission_count: 3,
            spread: 1.0,
            gravity: 0.05,
            lifespan_min: 60,
            lifespan_max: 100,
            radius_min: 2.0,
            radius_max: 5.0,
            palette: vec![
                Rgb::new(0x63, 0x66, 0xf1),
                Rgb::new(0xa8, 0x55, 0xf7),
                Rgb::new(0xec, 0x48, 0x99),
            ],
            follower_radius: 16.0,
        }
    }
}

/// Largest speed or radius the effects will draw with.
const MAX_MAGNITUDE: f32 = 1.0e6;

/// `value` if it is finite, otherwise `fallback`, clamped to `0..=MAX_MAGNITUDE`.
fn bounded(value: f32, fallback: f32) -> f32 {
    let value = if value.is_finite() { value } else { fallback };
    value.clamp(0.0, MAX_MAGNITUDE)
}

fn check_finite(name: &str, value: f32) -> Result<(), String> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(format!("{name} must be a finite number, got {value}"))
    }
}

fn check_at_least(name: &str, value: f32, min: f32) -> Result<(), String> {
    check_finite(name, value)?;
    if value < min {
        return Err(format!("{name} must be at least {min}, got {value}"));
    }
    Ok(())
}

impl ParticleParams {
    /// Lifespan range, never empty and never starting at zero.
    pub fn lifespan_range(&self) -> Range<u32> {
        let min = self.lifespan_min.clamp(1, u32::MAX - 1);
        min..self.lifespan_max.max(min + 1)
    }

    /// Radius range, never empty and always finite.
    pub fn radius_range(&self) -> Range<f32> {
        let min = bounded(self.radius_min, 0.0);
        let max = bounded(self.radius_max, min);
        if max > min {
            min..max
        } else {
            min..min + (min * 1e-6).max(1e-6)
        }
    }

    /// Half-width of the velocity range; 0 for a non-finite spread.
    pub fn velocity_spread(&self) -> f32 {
        bounded(self.spread.abs(), 0.0)
    }

    /// Follower ring radius; 0 (no ring) for a non-finite value.
    pub fn follower_radius(&self) -> f32 {
        bounded(self.follower_radius, 0.0)
    }

    /// Reject values the trail cannot animate.
    pub fn validate(&self) -> Result<(), String> {
        check_finite("particles.spread", self.spread)?;
        check_finite("particles.gravity", self.gravity)?;
        check_at_least("particles.radius_min", self.radius_min, 0.0)?;
        check_at_least("particles.radius_max", self.radius_max, self.radius_min)?;
        check_at_least("particles.follower_radius", self.follower_radius, 0.0)?;
        if self.lifespan_min == 0 || self.lifespan_min == u32::MAX {
            return Err(format!(
                "particles.lifespan_min must be between 1 and {}, got {}",
                u32::MAX - 1,
                self.lifespan_min
            ));
        }
        if self.lifespan_max < self.lifespan_min {
            return Err(format!(
                "particles.lifespan_max ({}) is below lifespan_min ({})",
                self.lifespan_max, self.lifespan_min
            ));
        }
        Ok(())
    }
}

/// Falling-character rain parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainParams {
    /// Width and height of one glyph cell, in surface units.
    pub char_size: f32,
    /// Chance per frame that a column past the bottom restarts at the top.
    pub reset_chance: f32,
    /// Glyphs drawn at random.
    pub charset: String,
}

impl Default for RainParams {
    fn default() -> Self {
        Self {
            char_size: 14.0,
            reset_chance: 0.025,
            charset: "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789@#$%^&*(){}[]<>/\\|~`+-=_".to_string(),
        }
    }
}

impl RainParams {
    /// Reset chance as a probability; 0 for a non-finite value.
    pub fn reset_probability(&self) -> f64 {
        if self.reset_chance.is_finite() {
            f64::from(self.reset_chance.clamp(0.0, 1.0))
        } else {
            0.0
        }
    }

    /// Reject a char size below 1 or a reset chance outside `0..=1`.
    pub fn validate(&self) -> Result<(), String> {
        check_at_least("rain.char_size", self.char_size, 1.0)?;
        check_finite("rain.reset_chance", self.reset_chance)?;
        if !(0.0..=1.0).contains(&self.reset_chance) {
            return Err(format!(
                "rain.reset_chance must be between 0 and 1, got {}",
                self.reset_chance
            ));
        }
        Ok(())
    }
}

/// Floating node network and background grid parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkParams {
    pub node_count: usize,
    /// Half-width of the symmetric velocity range on each axis.
    pub max_speed: f32,
    /// Nodes closer than this are joined by a line.
    pub link_distance: f32,
    /// Distance between grid lines.
    pub grid_spacing: f32,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            node_count: 50,
            max_speed: 0.25,
            link_distance: 150.0,
            grid_spacing: 50.0,
        }
    }
}

impl NetworkParams {
    /// Half-width of the node velocity range; 0 for a non-finite value.
    pub fn speed(&self) -> f32 {
        bounded(self.max_speed.abs(), 0.0)
    }

    /// Reject non-finite values and grid spacings below 1.
    pub fn validate(&self) -> Result<(), String> {
        check_finite("network.max_speed", self.max_speed)?;
        check_at_least("network.link_distance", self.link_distance, 0.0)?;
        check_at_least("network.grid_spacing", self.grid_spacing, 1.0)
    }
}

/// Decorative floating shape counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientParams {
    pub shape_count: usize,
    pub orb_count: usize,
}

impl Default for AmbientParams {
    fn default() -> Self {
        Self {
            shape_count: 15,
            orb_count: 5,
        }
    }
}
