pub mod ambient;
pub mod network;
pub mod particles;
pub mod rain;

use std::f32::consts::TAU;

/// Ease-in-out envelope over one cycle: 0 at phase 0, 1 at phase 0.5,
/// back to 0 at phase 1.
pub fn pulse(phase: f32) -> f32 {
    (1.0 - (phase * TAU).cos()) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_shape() {
        assert!(pulse(0.0).abs() < 1e-6);
        assert!((pulse(0.5) - 1.0).abs() < 1e-6);
        assert!(pulse(1.0).abs() < 1e-6);
        assert!(pulse(0.25) > 0.0 && pulse(0.25) < 1.0);
    }
}
