//! The boss (player) controller.
//!
//! Movement comes straight from the input axes; the attack is a
//! click-aimed swing with a cooldown that knocks nearby employees back.
//! The slash visual is plain progress state (elapsed over duration) the
//! display layer samples each frame — a sweeping arc that fades out as it
//! swings through the aim direction.

use clockout_common::Vec2;
use serde::{Deserialize, Serialize};

use crate::game_state::GameMode;
use crate::input::Input;
use crate::steering::ObstacleField;

/// Tunable parameters for the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Movement speed in units per second.
    pub move_speed: f32,
    /// Distance from the player to the center of the attack swing.
    pub attack_range: f32,
    /// Seconds between attacks.
    pub attack_cooldown: f32,
    /// Radius around the attack point that hits employees.
    pub attack_radius: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            attack_range: 1.5,
            attack_cooldown: 0.5,
            attack_radius: 0.5,
        }
    }
}

/// An attack swing resolved this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackEvent {
    /// Player position at the moment of the swing.
    pub origin: Vec2,
    /// Unit aim direction (toward the mouse).
    pub direction: Vec2,
    /// Center of the hit circle.
    pub point: Vec2,
}

/// Slash sweep visual expressed as explicit progress state.
///
/// The arc swings from 30 degrees behind the aim angle to 30 degrees past
/// it while fading from `start_alpha` to zero and shrinking slightly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlashEffect {
    /// Sweep length in seconds.
    pub duration: f32,
    /// Arc width in degrees.
    pub arc_angle: f32,
    /// Arc radius in world units.
    pub range: f32,
    /// Alpha at the start of the sweep.
    pub start_alpha: f32,
    elapsed: f32,
    aim_angle: f32,
    active: bool,
}

/// Degrees the sweep starts behind (and ends past) the aim angle.
const SLASH_SWING_DEGREES: f32 = 30.0;

impl Default for SlashEffect {
    fn default() -> Self {
        Self {
            duration: 0.2,
            arc_angle: 90.0,
            range: 1.5,
            start_alpha: 0.8,
            elapsed: 0.0,
            aim_angle: 0.0,
            active: false,
        }
    }
}

impl SlashEffect {
    /// Starts the sweep toward `direction`.
    pub fn play(&mut self, direction: Vec2) {
        self.aim_angle = direction.angle().to_degrees();
        self.elapsed = 0.0;
        self.active = true;
    }

    /// Advances the sweep; it deactivates itself when done.
    pub fn update(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.active = false;
        }
    }

    /// Whether the sweep is visible right now.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Sweep progress in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Center angle of the arc at the current progress, in degrees.
    #[must_use]
    pub fn current_angle(&self) -> f32 {
        let start = self.aim_angle - SLASH_SWING_DEGREES;
        let end = self.aim_angle + SLASH_SWING_DEGREES;
        start + (end - start) * self.progress()
    }

    /// Alpha at the current progress (fades to zero).
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.start_alpha * (1.0 - self.progress())
    }

    /// Effective arc radius at the current progress (shrinks slightly).
    #[must_use]
    pub fn current_range(&self) -> f32 {
        self.range * (1.0 - self.progress() * 0.2)
    }
}

/// The boss.
#[derive(Debug, Clone)]
pub struct Player {
    config: PlayerConfig,
    position: Vec2,
    velocity: Vec2,
    slash: SlashEffect,
    last_attack_time: f32,
    now: f32,
}

impl Player {
    /// Creates a player at `position` with default parameters.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self::with_config(position, PlayerConfig::default())
    }

    /// Creates a player with the given parameters.
    #[must_use]
    pub fn with_config(position: Vec2, config: PlayerConfig) -> Self {
        Self {
            config,
            position,
            velocity: Vec2::ZERO,
            slash: SlashEffect {
                range: config.attack_range,
                ..SlashEffect::default()
            },
            last_attack_time: f32::NEG_INFINITY,
            now: 0.0,
        }
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Velocity emitted by the last tick.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Player parameters.
    #[must_use]
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// The slash sweep state for the display layer.
    #[must_use]
    pub fn slash(&self) -> &SlashEffect {
        &self.slash
    }

    /// Moves the player directly (spawning, floor transitions).
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.velocity = Vec2::ZERO;
    }

    /// Advances the player by one tick.
    ///
    /// Outside of [`GameMode::Playing`] — including during dialogue — the
    /// player freezes and input is ignored. Returns the attack swung this
    /// tick, if any; the caller resolves its knockback against employees.
    pub fn update<F: ObstacleField + ?Sized>(
        &mut self,
        input: &Input,
        mode: GameMode,
        field: &F,
        dt: f32,
    ) -> Option<AttackEvent> {
        if mode != GameMode::Playing {
            self.velocity = Vec2::ZERO;
            return None;
        }

        self.now += dt;
        self.slash.update(dt);

        // Movement.
        self.velocity = input.move_direction() * self.config.move_speed;
        self.integrate(dt, field);

        // Attack on click, gated by the cooldown.
        if input.primary_just_pressed
            && self.now >= self.last_attack_time + self.config.attack_cooldown
        {
            self.last_attack_time = self.now;
            let aim = input.mouse_world_pos - self.position;
            let direction = if aim.length() > f32::EPSILON {
                aim.normalized()
            } else {
                Vec2::RIGHT
            };
            self.slash.play(direction);
            return Some(AttackEvent {
                origin: self.position,
                direction,
                point: self.position + direction * self.config.attack_range,
            });
        }

        None
    }

    fn integrate<F: ObstacleField + ?Sized>(&mut self, dt: f32, field: &F) {
        let step = self.velocity * dt;
        let length = step.length();
        if length <= f32::EPSILON {
            return;
        }
        let dir = step * (1.0 / length);
        const SKIN: f32 = 0.05;
        let allowed = match field.raycast(self.position, dir, length + SKIN) {
            Some(hit) => (hit.distance - SKIN).clamp(0.0, length),
            None => length,
        };
        self.position += dir * allowed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steering::{OpenField, SegmentObstacleField};

    const DT: f32 = 1.0 / 60.0;

    fn click_at(target: Vec2) -> Input {
        let mut input = Input::new();
        input.primary_just_pressed = true;
        input.mouse_world_pos = target;
        input
    }

    #[test]
    fn test_movement_from_input() {
        let mut player = Player::new(Vec2::ZERO);
        let mut input = Input::new();
        input.movement = Vec2::new(1.0, 0.0);

        player.update(&input, GameMode::Playing, &OpenField, DT);
        assert!(player.position().x > 0.0);
        assert!((player.velocity().length() - player.config().move_speed).abs() < 1e-3);
    }

    #[test]
    fn test_frozen_outside_playing() {
        for mode in [
            GameMode::Paused,
            GameMode::InDialogue,
            GameMode::Won,
            GameMode::Lost,
        ] {
            let mut player = Player::new(Vec2::ZERO);
            let mut input = Input::new();
            input.movement = Vec2::new(1.0, 0.0);
            input.primary_just_pressed = true;

            let attack = player.update(&input, mode, &OpenField, DT);
            assert_eq!(attack, None);
            assert_eq!(player.position(), Vec2::ZERO);
            assert_eq!(player.velocity(), Vec2::ZERO);
        }
    }

    #[test]
    fn test_attack_aims_at_mouse() {
        let mut player = Player::new(Vec2::ZERO);
        let attack = player
            .update(&click_at(Vec2::new(10.0, 0.0)), GameMode::Playing, &OpenField, DT)
            .expect("attack");
        assert!((attack.direction.x - 1.0).abs() < 1e-5);
        assert!((attack.point.x - player.config().attack_range).abs() < 1e-3);
        assert!(player.slash().is_active());
    }

    #[test]
    fn test_attack_cooldown() {
        let mut player = Player::new(Vec2::ZERO);
        let target = Vec2::new(10.0, 0.0);

        assert!(player
            .update(&click_at(target), GameMode::Playing, &OpenField, DT)
            .is_some());
        // Immediately clicking again is still on cooldown.
        assert!(player
            .update(&click_at(target), GameMode::Playing, &OpenField, DT)
            .is_none());

        // Wait out the cooldown.
        for _ in 0..40 {
            player.update(&Input::new(), GameMode::Playing, &OpenField, DT);
        }
        assert!(player
            .update(&click_at(target), GameMode::Playing, &OpenField, DT)
            .is_some());
    }

    #[test]
    fn test_walls_block_movement() {
        let mut field = SegmentObstacleField::new();
        field.add_wall(Vec2::new(0.5, -5.0), Vec2::new(0.5, 5.0));

        let mut player = Player::new(Vec2::ZERO);
        let mut input = Input::new();
        input.movement = Vec2::new(1.0, 0.0);

        for _ in 0..120 {
            player.update(&input, GameMode::Playing, &field, DT);
        }
        assert!(player.position().x < 0.5);
    }

    #[test]
    fn test_slash_progress_and_fade() {
        let mut slash = SlashEffect::default();
        assert!(!slash.is_active());

        slash.play(Vec2::RIGHT);
        assert!(slash.is_active());
        assert_eq!(slash.progress(), 0.0);
        assert!((slash.current_angle() - (-SLASH_SWING_DEGREES)).abs() < 1e-3);
        assert!((slash.alpha() - slash.start_alpha).abs() < 1e-5);

        slash.update(slash.duration / 2.0);
        assert!((slash.progress() - 0.5).abs() < 1e-5);
        assert!(slash.current_angle().abs() < 1e-3);
        assert!(slash.alpha() < slash.start_alpha);
        assert!(slash.current_range() < slash.range);

        slash.update(slash.duration);
        assert!(!slash.is_active());
        assert_eq!(slash.progress(), 1.0);
        assert_eq!(slash.alpha(), 0.0);
    }

    #[test]
    fn test_slash_replays() {
        let mut slash = SlashEffect::default();
        slash.play(Vec2::RIGHT);
        slash.update(slash.duration * 2.0);
        assert!(!slash.is_active());

        slash.play(Vec2::UP);
        assert!(slash.is_active());
        assert_eq!(slash.progress(), 0.0);
        assert!((slash.current_angle() - (90.0 - SLASH_SWING_DEGREES)).abs() < 1e-3);
    }

    #[test]
    fn test_attack_with_mouse_on_player_defaults_right() {
        let mut player = Player::new(Vec2::ZERO);
        let attack = player
            .update(&click_at(Vec2::ZERO), GameMode::Playing, &OpenField, DT)
            .expect("attack");
        assert_eq!(attack.direction, Vec2::RIGHT);
    }
}
