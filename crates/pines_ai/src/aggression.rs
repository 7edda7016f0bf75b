//! Aggression value and teleport roll

use crate::config::AntagonistConfig;
use rand::Rng;

/// Aggression from progress and time: `starting + pages + floor(t / step)`,
/// clamped to the configured range. Recomputed, never accumulated.
pub fn aggression_value(config: &AntagonistConfig, pages_collected: u32, game_time: f32) -> i32 {
    let time_steps = if config.seconds_per_aggression_step > 0.0 {
        (game_time.max(0.0) / config.seconds_per_aggression_step).floor() as i32
    } else {
        0
    };
    let pages = i32::try_from(pages_collected).unwrap_or(i32::MAX);

    config
        .starting_ai_value
        .saturating_add(pages)
        .saturating_add(time_steps)
        .min(config.max_ai_value)
        .max(config.min_ai_value)
}

/// Aggression as a fraction of the maximum
pub fn aggression_ratio(config: &AntagonistConfig, value: i32) -> f32 {
    if config.max_ai_value <= 0 {
        0.0
    } else {
        (value as f32 / config.max_ai_value as f32).clamp(0.0, 1.0)
    }
}

/// Draw in `[min, max]`; teleport when the draw does not exceed `current`
pub fn roll_teleport<R: Rng + ?Sized>(rng: &mut R, config: &AntagonistConfig, current: i32) -> (i32, bool) {
    let draw = rng.random_range(config.min_ai_value..=config.max_ai_value);
    (draw, draw <= current)
}
