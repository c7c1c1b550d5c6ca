//! Falling-character code rain (stateful).

use folio_core::{Point, RainParams, Rgb, Viewport};
use rand::{Rng, seq::SliceRandom};

use crate::color::Gradient;
use crate::surface::Surface;

/// Opacity of the black layer painted each frame; older glyphs fade out under it.
const TRAIL_FADE: f32 = 0.05;

/// Used when the configured charset is empty.
const FALLBACK_GLYPH: char = '0';

/// Number of rain columns that fit in `width`.
pub fn column_count(width: f32, char_size: f32) -> usize {
    if char_size <= 0.0 || width <= 0.0 || !width.is_finite() {
        return 0;
    }
    (width / char_size).floor() as usize
}

/// One drop height per column, measured in glyph rows.
#[derive(Debug, Clone)]
pub struct CodeRain {
    drops: Vec<u32>,
    glyphs: Vec<char>,
    gradient: Gradient,
    params: RainParams,
    viewport: Viewport,
}

impl CodeRain {
    /// Construct a new [`CodeRain`] sized for `viewport`.
    pub fn new(params: RainParams, viewport: Viewport) -> Self {
        let glyphs = params.charset.chars().collect();
        let mut rain = Self {
            drops: Vec::new(),
            glyphs,
            gradient: Gradient::rain(),
            params,
            viewport,
        };
        rain.resize(viewport);
        rain
    }

    /// Rebuild the columns for a new viewport. Every drop restarts at row 1.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let columns = column_count(viewport.width, self.params.char_size);
        self.drops = vec![1; columns];
    }

    /// Number of rain columns.
    pub fn columns(&self) -> usize {
        self.drops.len()
    }

    /// Current drop row of each column.
    pub fn drops(&self) -> &[u32] {
        &self.drops
    }

    /// Fade the previous frame, draw one glyph per column, then advance
    /// each drop (restarting it at random once it is past the bottom).
    pub fn update<S: Surface + ?Sized, R: Rng + ?Sized>(&mut self, surface: &mut S, rng: &mut R) {
        surface.fade(Rgb::BLACK, TRAIL_FADE);

        let size = self.params.char_size;
        let reset_chance = self.params.reset_probability();

        for (i, drop) in self.drops.iter_mut().enumerate() {
            let glyph = self.glyphs.choose(rng).copied().unwrap_or(FALLBACK_GLYPH);
            let x = i as f32 * size;
            let y = *drop as f32 * size;
            surface.fill_glyph(Point::new(x, y), glyph, &self.gradient);

            if y > self.viewport.height && rng.gen_bool(reset_chance) {
                *drop = 0;
            }
            *drop = drop.saturating_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, Recorder};
    use rand::{SeedableRng, rngs::StdRng};

    fn rain(width: f32, height: f32) -> CodeRain {
        CodeRain::new(RainParams::default(), Viewport::new(width, height))
    }

    #[test]
    fn test_column_count() {
        assert_eq!(column_count(1920.0, 14.0), 137);
        assert_eq!(column_count(13.9, 14.0), 0);
        assert_eq!(column_count(100.0, 0.0), 0);
        assert_eq!(column_count(-5.0, 14.0), 0);
    }

    #[test]
    fn test_resize_recomputes_columns() {
        let mut rain = rain(280.0, 140.0);
        assert_eq!(rain.columns(), 20);

        rain.resize(Viewport::new(700.0, 140.0));
        assert_eq!(rain.columns(), 50);
        assert_eq!(rain.drops().len(), 50);
        assert!(rain.drops().iter().all(|&d| d == 1));
    }

    #[test]
    fn test_update_draws_one_glyph_per_column() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut rain = rain(140.0, 140.0);
        let mut surface = Recorder::new();
        rain.update(&mut surface, &mut rng);

        assert!(matches!(surface.commands()[0], DrawCommand::Fade { .. }));
        assert_eq!(surface.glyphs(), 10);
        assert!(rain.drops().iter().all(|&d| d == 2));

        let origins: Vec<Point> = surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Glyph { origin, .. } => Some(*origin),
                _ => None,
            })
            .collect();
        assert_eq!(origins[3], Point::new(42.0, 14.0));
    }

    #[test]
    fn test_drops_stay_put_above_bottom() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut rain = rain(140.0, 1400.0);
        let mut surface = Recorder::new();
        for _ in 0..50 {
            rain.update(&mut surface, &mut rng);
        }
        assert!(rain.drops().iter().all(|&d| d == 51));
    }

    #[test]
    fn test_drops_reset_past_bottom() {
        let mut rng = StdRng::seed_from_u64(11);
        let params = RainParams {
            reset_chance: 1.0,
            ..Default::default()
        };
        let mut rain = CodeRain::new(params, Viewport::new(28.0, 28.0));
        let mut surface = Recorder::new();

        // Rows 1 and 2 are on screen; row 3 is past the bottom.
        for _ in 0..3 {
            rain.update(&mut surface, &mut rng);
        }
        assert!(rain.drops().iter().all(|&d| d == 1));
    }

    #[test]
    fn test_nan_reset_chance_never_resets() {
        let mut rng = StdRng::seed_from_u64(3);
        let params = RainParams {
            reset_chance: f32::NAN,
            ..Default::default()
        };
        let mut rain = CodeRain::new(params, Viewport::new(140.0, 28.0));
        let mut surface = Recorder::new();
        for _ in 0..5 {
            rain.update(&mut surface, &mut rng);
        }
        assert!(rain.drops().iter().all(|&d| d == 6));
        assert_eq!(surface.glyphs(), 50);
    }

    #[test]
    fn test_glyphs_from_charset() {
        let mut rng = StdRng::seed_from_u64(2);
        let params = RainParams {
            charset: "01".to_string(),
            ..Default::default()
        };
        let mut rain = CodeRain::new(params, Viewport::new(140.0, 140.0));
        let mut surface = Recorder::new();
        rain.update(&mut surface, &mut rng);

        assert!(surface.commands().iter().all(|c| match c {
            DrawCommand::Glyph { glyph, .. } => *glyph == '0' || *glyph == '1',
            _ => true,
        }));
    }
}
