//! Per-entity runtime state

use crate::config::{AntagonistConfig, PlayerConfig};
use crate::perception::Detection;
use serde::{Deserialize, Serialize};

/// Player vitals, exposure and progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub health: f32,
    pub max_health: f32,
    pub health_regen_rate: f32,
    /// Seconds of sustained detection, decays toward zero when undetected
    pub look_time: f32,
    pub stamina: f32,
    pub max_stamina: f32,
    pub stamina_drain_rate: f32,
    pub stamina_regen_rate: f32,
    pub stamina_regen_delay: f32,
    /// Time left before stamina starts regenerating
    pub stamina_regen_timer: f32,
    pub is_moving: bool,
    pub is_sprinting: bool,
    pub pages_collected: u32,
    /// Distance to the antagonist as of the last AI update
    pub distance_to_antagonist: f32,
}

impl PlayerState {
    /// Fresh player at full health and stamina
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            health: config.max_health,
            max_health: config.max_health,
            health_regen_rate: config.health_regen_rate,
            look_time: 0.0,
            stamina: config.max_stamina,
            max_stamina: config.max_stamina,
            stamina_drain_rate: config.stamina_drain_rate,
            stamina_regen_rate: config.stamina_regen_rate,
            stamina_regen_delay: config.stamina_regen_delay,
            stamina_regen_timer: 0.0,
            is_moving: false,
            is_sprinting: false,
            pages_collected: 0,
            distance_to_antagonist: f32::INFINITY,
        }
    }

    /// Remove health, clamped at zero
    pub fn apply_damage(&mut self, amount: f32) {
        if amount > 0.0 {
            self.health = (self.health - amount).max(0.0);
        }
    }

    /// Regain health for `delta_time`, clamped at max
    pub fn regenerate(&mut self, delta_time: f32) {
        if self.is_dead() {
            return;
        }
        self.health = (self.health + self.health_regen_rate * delta_time.max(0.0)).min(self.max_health);
    }

    /// Death is health at or below zero
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Health as a 0..1 fraction
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }

    /// Advance stamina for one frame and return whether the player sprints.
    ///
    /// Sprinting needs movement and stamina left. Running dry ends the
    /// sprint; every sprinting frame re-arms the regen delay.
    pub fn update_stamina(&mut self, wants_sprint: bool, delta_time: f32) -> bool {
        let dt = delta_time.max(0.0);
        let sprinting = wants_sprint && self.is_moving && self.stamina > 0.0;

        if sprinting {
            self.stamina = (self.stamina - self.stamina_drain_rate * dt).max(0.0);
            self.stamina_regen_timer = self.stamina_regen_delay;
        } else if self.stamina_regen_timer > 0.0 {
            self.stamina_regen_timer = (self.stamina_regen_timer - dt).max(0.0);
        } else {
            self.stamina = (self.stamina + self.stamina_regen_rate * dt).min(self.max_stamina);
        }

        self.is_sprinting = sprinting && self.stamina > 0.0;
        self.is_sprinting
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(&PlayerConfig::default())
    }
}

/// Antagonist timers and aggression
#[derive(Debug, Clone)]
pub struct AntagonistState {
    /// Seconds since the last teleport opportunity
    pub teleport_timer: f32,
    /// Current cooldown; shrinks as pages are collected
    pub teleport_cooldown: f32,
    /// Aggression as of the last update
    pub current_ai_value: i32,
    /// Classification of the last update
    pub last_detection: Detection,
}

impl AntagonistState {
    pub fn new(config: &AntagonistConfig) -> Self {
        Self {
            teleport_timer: 0.0,
            teleport_cooldown: config.teleport_cooldown,
            current_ai_value: config.starting_ai_value.clamp(config.min_ai_value, config.max_ai_value),
            last_detection: Detection::Neither,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut player = PlayerState::default();
        player.apply_damage(250.0);
        assert_eq!(player.health, 0.0);
        assert!(player.is_dead());
    }

    #[test]
    fn test_regen_clamps_at_max() {
        let mut player = PlayerState::default();
        player.apply_damage(1.0);
        player.regenerate(10.0);
        assert_eq!(player.health, player.max_health);
    }

    #[test]
    fn test_negative_damage_ignored() {
        let mut player = PlayerState::default();
        player.apply_damage(10.0);
        player.apply_damage(-50.0);
        assert_eq!(player.health, 90.0);
    }

    #[test]
    fn test_dead_player_does_not_regenerate() {
        let mut player = PlayerState::default();
        player.apply_damage(100.0);
        player.regenerate(5.0);
        assert!(player.is_dead());
    }

    #[test]
    fn test_sprint_drains_then_stops() {
        let mut player = PlayerState::default();
        player.is_moving = true;

        // 100 stamina at 20/s lasts five seconds
        for _ in 0..4 {
            assert!(player.update_stamina(true, 1.0));
        }
        assert!(!player.update_stamina(true, 1.0));
        assert_eq!(player.stamina, 0.0);
        assert!(!player.update_stamina(true, 1.0));
    }

    #[test]
    fn test_stamina_waits_for_delay() {
        let mut player = PlayerState::default();
        player.is_moving = true;
        player.update_stamina(true, 1.0);
        let spent = player.stamina;

        player.update_stamina(false, 0.5);
        assert_eq!(player.stamina, spent);
        player.update_stamina(false, 0.5);
        assert_eq!(player.stamina, spent);
        player.update_stamina(false, 1.0);
        assert_eq!(player.stamina, spent + 15.0);
    }

    #[test]
    fn test_standing_still_is_not_sprinting() {
        let mut player = PlayerState::default();
        assert!(!player.update_stamina(true, 0.1));
        assert_eq!(player.stamina, player.max_stamina);
    }
}
