//! Look-time accumulation and exposure damage

use crate::config::AntagonistConfig;
use crate::perception::Detection;

/// Look time after one frame: grows while detected, decays to zero otherwise
pub fn advance_look_time(look_time: f32, detection: Detection, delta_time: f32) -> f32 {
    let dt = delta_time.max(0.0);
    if detection.is_detected() {
        look_time + dt
    } else {
        (look_time - dt).max(0.0)
    }
}

/// Health lost this frame.
///
/// `(1 - d/D) * rate * (1 + lookTime * factor * m) * dt`, where `m` is 1
/// while Looking and the proximity discount while in Proximity. Zero when
/// undetected.
pub fn damage_per_tick(
    config: &AntagonistConfig,
    detection: Detection,
    distance: f32,
    look_time: f32,
    delta_time: f32,
) -> f32 {
    if !detection.is_detected() {
        return 0.0;
    }

    let distance_factor = (1.0 - distance / config.detection_distance).clamp(0.0, 1.0);
    let look_time_multiplier =
        1.0 + look_time.max(0.0) * config.look_time_factor * detection.exposure_multiplier(config);

    distance_factor * config.damage_rate * look_time_multiplier * delta_time.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_look_time_decays_to_zero() {
        let mut look = 0.5;
        for _ in 0..100 {
            look = advance_look_time(look, Detection::Neither, 0.1);
        }
        assert_eq!(look, 0.0);
    }

    #[test]
    fn test_look_time_accumulates_in_proximity() {
        let look = advance_look_time(1.0, Detection::Proximity, 0.25);
        assert_relative_eq!(look, 1.25);
    }

    #[test]
    fn test_damage_formula() {
        let config = AntagonistConfig::default();
        // (1 - 10/20) * 10 * (1 + 2 * 0.5 * 1) * 0.1 = 1.0
        let damage = damage_per_tick(&config, Detection::Looking, 10.0, 2.0, 0.1);
        assert_relative_eq!(damage, 1.0);

        // Proximity halves the look-time term: (1 - 4/20) * 10 * (1 + 2 * 0.5 * 0.5) * 0.1
        let damage = damage_per_tick(&config, Detection::Proximity, 4.0, 2.0, 0.1);
        assert_relative_eq!(damage, 1.2, epsilon = 1e-6);
    }

    #[test]
    fn test_no_damage_when_undetected() {
        let config = AntagonistConfig::default();
        assert_eq!(damage_per_tick(&config, Detection::Neither, 1.0, 10.0, 1.0), 0.0);
    }

    #[test]
    fn test_proximity_never_exceeds_looking() {
        let config = AntagonistConfig::default();
        for look in [0.0, 0.5, 3.0, 20.0] {
            let looking = damage_per_tick(&config, Detection::Looking, 3.0, look, 1.0 / 60.0);
            let near = damage_per_tick(&config, Detection::Proximity, 3.0, look, 1.0 / 60.0);
            assert!(near <= looking);
        }
    }
}
