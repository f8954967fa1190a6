//! Employee behavior controller.
//!
//! Each employee is a small state machine with five exclusive states:
//! wandering around its home point, chasing the player, riding out combat
//! knockback, stunned after knockback, or returning home after a dialogue.
//! The per-tick priority ladder (freeze, knockback, stun, stuck check,
//! return-home, detection, movement) is evaluated in a fixed order; that
//! order is part of the behavioral contract — in particular, return-home is
//! checked before detection so it cannot be interrupted by spotting the
//! player.

use clockout_common::{EntityId, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, trace};

use crate::game_state::GameMode;
use crate::steering::{self, AvoidanceConfig, ObstacleField};

/// Error types for employee operations.
#[derive(Debug, Error)]
pub enum EmployeeError {
    /// Employee not found
    #[error("employee not found: {0}")]
    NotFound(EntityId),
    /// Employee already registered
    #[error("employee already registered: {0}")]
    AlreadyRegistered(EntityId),
}

/// Result type for employee operations.
pub type EmployeeResult<T> = Result<T, EmployeeError>;

/// Behavior state of an employee. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmployeeState {
    /// Drifting between random points around the home position.
    Wandering,
    /// Pursuing the player.
    Chasing,
    /// Riding out a combat impulse; no detection or movement logic runs.
    KnockedBack,
    /// Dazed after knockback; no detection or movement logic runs.
    Stunned,
    /// Walking back to the home position; cannot be interrupted by
    /// detection, only by arrival or stuck recovery.
    ReturningHome,
}

impl EmployeeState {
    /// Whether the state suppresses detection and movement logic.
    #[must_use]
    pub const fn is_incapacitated(self) -> bool {
        matches!(self, EmployeeState::KnockedBack | EmployeeState::Stunned)
    }
}

/// Visual tint hint for the display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmployeeTint {
    /// Default appearance.
    Normal,
    /// Actively chasing the player.
    Chase,
    /// Knocked back or stunned.
    Dazed,
}

/// Tunable parameters for one employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeConfig {
    /// Walking speed while wandering or returning home.
    pub move_speed: f32,
    /// Speed while chasing the player.
    pub chase_speed: f32,
    /// Radius of the wander disk around the home point.
    pub wander_radius: f32,
    /// Seconds between wander target re-picks.
    pub wander_change_interval: f32,
    /// Radius within which the player can be detected.
    pub detection_radius: f32,
    /// Whether detection additionally requires clear line of sight.
    pub require_line_of_sight: bool,
    /// Impulse speed applied by [`EmployeeManager::apply_knockback`].
    pub knockback_force: f32,
    /// Seconds the knockback impulse lasts.
    pub knockback_duration: f32,
    /// Seconds of stun after the knockback ends.
    pub stun_duration: f32,
    /// Seconds after a dialogue (or homecoming) before chasing is allowed
    /// again.
    pub return_home_cooldown: f32,
    /// Distance at which contact with the player triggers a dialogue.
    pub contact_radius: f32,
    /// Arrival epsilon for wander targets and the home point.
    pub arrive_epsilon: f32,
    /// Speed (units/second) below which movement counts as stuck.
    pub stuck_speed: f32,
    /// Seconds of sustained low movement before stuck recovery fires.
    pub stuck_time: f32,
    /// Feeler-ray avoidance parameters.
    pub avoidance: AvoidanceConfig,
    /// Home point override; `None` uses the spawn position.
    pub home: Option<Vec2>,
    /// Dialogue lines this employee can open with.
    pub dialogue_lines: Vec<String>,
}

impl Default for EmployeeConfig {
    fn default() -> Self {
        Self {
            move_speed: 2.0,
            chase_speed: 3.5,
            wander_radius: 3.0,
            wander_change_interval: 2.0,
            detection_radius: 5.0,
            require_line_of_sight: true,
            knockback_force: 5.0,
            knockback_duration: 0.3,
            stun_duration: 1.0,
            return_home_cooldown: 3.0,
            contact_radius: 0.5,
            arrive_epsilon: 0.5,
            stuck_speed: 0.5,
            stuck_time: 1.0,
            avoidance: AvoidanceConfig::default(),
            home: None,
            dialogue_lines: default_dialogue_lines(),
        }
    }
}

impl EmployeeConfig {
    /// Sets the detection radius.
    #[must_use]
    pub const fn with_detection_radius(mut self, radius: f32) -> Self {
        self.detection_radius = radius;
        self
    }

    /// Sets whether detection requires line of sight.
    #[must_use]
    pub const fn with_line_of_sight(mut self, required: bool) -> Self {
        self.require_line_of_sight = required;
        self
    }

    /// Sets an explicit home point instead of the spawn position.
    #[must_use]
    pub const fn with_home(mut self, home: Vec2) -> Self {
        self.home = Some(home);
        self
    }

    /// Sets the dialogue line pool.
    #[must_use]
    pub fn with_dialogue_lines(mut self, lines: Vec<String>) -> Self {
        self.dialogue_lines = lines;
        self
    }
}

fn default_dialogue_lines() -> Vec<String> {
    vec![
        "Hey boss! Got a minute?".to_string(),
        "I need to talk to you about my performance review!".to_string(),
        "Have you seen my TPS reports?".to_string(),
        "Can we schedule a 1-on-1?".to_string(),
        "I've been here since 6 AM waiting for you!".to_string(),
    ]
}

/// Notifications produced by the employee update loop.
#[derive(Debug, Clone, PartialEq)]
pub enum EmployeeEvent {
    /// An employee caught the player while chasing and wants a dialogue.
    DialogueRequested {
        /// The employee that made contact.
        employee: EntityId,
        /// The line it opens with.
        line: String,
    },
}

/// State of a single employee.
#[derive(Debug, Clone)]
pub struct Employee {
    config: EmployeeConfig,
    position: Vec2,
    home: Vec2,
    velocity: Vec2,
    state: EmployeeState,
    wander_target: Vec2,
    next_wander_time: f32,
    knockback_end: f32,
    stun_end: f32,
    chase_reenable: f32,
    stuck_timer: f32,
    last_position: Vec2,
    ignore_characters: bool,
    last_line_index: Option<usize>,
}

impl Employee {
    fn new(position: Vec2, config: EmployeeConfig) -> Self {
        let home = config.home.unwrap_or(position);
        Self {
            config,
            position,
            home,
            velocity: Vec2::ZERO,
            state: EmployeeState::Wandering,
            wander_target: position,
            next_wander_time: 0.0,
            knockback_end: 0.0,
            stun_end: 0.0,
            chase_reenable: 0.0,
            stuck_timer: 0.0,
            last_position: position,
            ignore_characters: false,
            last_line_index: None,
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

    /// Home point the employee wanders around and returns to.
    #[must_use]
    pub fn home(&self) -> Vec2 {
        self.home
    }

    /// Current behavior state.
    #[must_use]
    pub fn state(&self) -> EmployeeState {
        self.state
    }

    /// Current wander destination.
    #[must_use]
    pub fn wander_target(&self) -> Vec2 {
        self.wander_target
    }

    /// Visual tint for the display layer.
    #[must_use]
    pub fn tint(&self) -> EmployeeTint {
        if self.state.is_incapacitated() {
            EmployeeTint::Dazed
        } else if self.state == EmployeeState::Chasing {
            EmployeeTint::Chase
        } else {
            EmployeeTint::Normal
        }
    }

    /// Whether collision with the player and other employees should be
    /// ignored right now (active while knocked back or stunned, so staggered
    /// employees don't jitter against the bodies around them).
    #[must_use]
    pub fn passes_through_characters(&self) -> bool {
        self.ignore_characters
    }

    /// Configuration of this employee.
    #[must_use]
    pub fn config(&self) -> &EmployeeConfig {
        &self.config
    }

    fn enter_wandering<F: ObstacleField + ?Sized>(
        &mut self,
        now: f32,
        rng: &mut fastrand::Rng,
        field: &F,
    ) {
        self.state = EmployeeState::Wandering;
        self.ignore_characters = false;
        self.pick_new_wander_target(now, rng, field);
    }

    fn enter_chasing(&mut self) {
        self.state = EmployeeState::Chasing;
        self.ignore_characters = false;
    }

    fn enter_stunned(&mut self, now: f32) {
        self.state = EmployeeState::Stunned;
        self.stun_end = now + self.config.stun_duration;
        self.velocity = Vec2::ZERO;
        self.ignore_characters = true;
    }

    fn pick_new_wander_target<F: ObstacleField + ?Sized>(
        &mut self,
        now: f32,
        rng: &mut fastrand::Rng,
        field: &F,
    ) {
        // Try a few times to find a target with a clear path from here.
        for _ in 0..WANDER_TARGET_ATTEMPTS {
            let candidate = self.home + random_in_disk(rng) * self.config.wander_radius;
            let delta = candidate - self.position;
            let distance = delta.length();
            if distance <= f32::EPSILON || field.raycast(self.position, delta, distance).is_none() {
                self.wander_target = candidate;
                self.next_wander_time = now + self.config.wander_change_interval;
                return;
            }
        }

        // Every candidate was behind a wall: settle for an unvalidated
        // nearby point so the employee keeps making progress.
        self.wander_target = self.position + random_in_disk(rng) * WANDER_FALLBACK_RADIUS;
        self.next_wander_time = now + self.config.wander_change_interval;
        trace!("wander target fallback at {:?}", self.wander_target);
    }

    fn steer_towards<F: ObstacleField + ?Sized>(&self, target: Vec2, speed: f32, field: &F) -> Vec2 {
        let desired = target - self.position;
        let dir = steering::avoid_obstacles(
            self.position,
            desired,
            speed,
            self.config.move_speed,
            &self.config.avoidance,
            field,
        );
        dir * speed
    }

    /// Moves along the current velocity, clamped so the body never tunnels
    /// into an obstacle.
    fn integrate<F: ObstacleField + ?Sized>(&mut self, dt: f32, field: &F) {
        let step = self.velocity * dt;
        let length = step.length();
        if length <= f32::EPSILON {
            return;
        }
        let dir = step * (1.0 / length);
        let allowed = match field.raycast(self.position, dir, length + COLLISION_SKIN) {
            Some(hit) => (hit.distance - COLLISION_SKIN).clamp(0.0, length),
            None => length,
        };
        self.position += dir * allowed;
    }
}

/// Attempts at a raycast-validated wander target before falling back.
const WANDER_TARGET_ATTEMPTS: u32 = 5;
/// Radius of the unvalidated fallback wander offset.
const WANDER_FALLBACK_RADIUS: f32 = 1.0;
/// Gap kept between a body and the obstacle it is sliding against.
const COLLISION_SKIN: f32 = 0.05;

/// Uniformly distributed point in the unit disk.
fn random_in_disk(rng: &mut fastrand::Rng) -> Vec2 {
    let radius = rng.f32().sqrt();
    let angle = rng.f32() * std::f32::consts::TAU;
    Vec2::from_angle(angle) * radius
}

/// Draws a line index from `lines`, never repeating `last` when the pool
/// has more than one entry.
fn pick_line(lines: &[String], last: Option<usize>, rng: &mut fastrand::Rng) -> Option<usize> {
    match lines.len() {
        0 => None,
        1 => Some(0),
        len => {
            let mut index = rng.usize(..len);
            while Some(index) == last {
                index = rng.usize(..len);
            }
            Some(index)
        }
    }
}

/// Owns and updates every employee on the current floor.
#[derive(Debug)]
pub struct EmployeeManager {
    employees: HashMap<EntityId, Employee>,
    rng: fastrand::Rng,
    /// Internal elapsed time; does not advance while the simulation is
    /// frozen, so timers effectively pause with it.
    now: f32,
}

impl Default for EmployeeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EmployeeManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self {
            employees: HashMap::new(),
            rng: fastrand::Rng::new(),
            now: 0.0,
        }
    }

    /// Creates a manager with a seeded RNG (for tests).
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            employees: HashMap::new(),
            rng: fastrand::Rng::with_seed(seed),
            now: 0.0,
        }
    }

    /// Number of employees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.employees.len()
    }

    /// Whether there are no employees.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Internal elapsed simulation time in seconds.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.now
    }

    /// Spawns an employee with default parameters.
    pub fn spawn(&mut self, position: Vec2) -> EntityId {
        self.spawn_with_config(position, EmployeeConfig::default())
    }

    /// Spawns an employee with the given parameters.
    pub fn spawn_with_config(&mut self, position: Vec2, config: EmployeeConfig) -> EntityId {
        let id = EntityId::new();
        self.employees.insert(id, Employee::new(position, config));
        id
    }

    /// Registers an existing entity as an employee.
    pub fn register(
        &mut self,
        id: EntityId,
        position: Vec2,
        config: EmployeeConfig,
    ) -> EmployeeResult<()> {
        if self.employees.contains_key(&id) {
            return Err(EmployeeError::AlreadyRegistered(id));
        }
        self.employees.insert(id, Employee::new(position, config));
        Ok(())
    }

    /// Removes an employee, returning its final state.
    pub fn despawn(&mut self, id: EntityId) -> EmployeeResult<Employee> {
        self.employees.remove(&id).ok_or(EmployeeError::NotFound(id))
    }

    /// Gets an employee.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Employee> {
        self.employees.get(&id)
    }

    /// Iterates over all employees.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Employee)> {
        self.employees.iter().map(|(&id, emp)| (id, emp))
    }

    /// Employees within `radius` of a point (used for attack resolution).
    pub fn in_range(&self, point: Vec2, radius: f32) -> Vec<EntityId> {
        self.employees
            .iter()
            .filter(|(_, emp)| emp.position.distance(point) <= radius)
            .map(|(&id, _)| id)
            .collect()
    }

    /// Applies a combat knockback impulse to an employee.
    ///
    /// Zeroes the current velocity, launches the employee along `direction`,
    /// and switches collision-ignore on for the stagger.
    pub fn apply_knockback(&mut self, id: EntityId, direction: Vec2) -> EmployeeResult<()> {
        let now = self.now;
        let emp = self
            .employees
            .get_mut(&id)
            .ok_or(EmployeeError::NotFound(id))?;
        emp.velocity = direction.normalized() * emp.config.knockback_force;
        emp.state = EmployeeState::KnockedBack;
        emp.knockback_end = now + emp.config.knockback_duration;
        emp.ignore_characters = true;
        debug!(employee = %id, "knocked back");
        Ok(())
    }

    /// Called when the dialogue this employee triggered has ended: the
    /// employee heads home unconditionally and may not chase again until the
    /// cooldown expires.
    pub fn notify_dialogue_end(&mut self, id: EntityId) -> EmployeeResult<()> {
        let now = self.now;
        let emp = self
            .employees
            .get_mut(&id)
            .ok_or(EmployeeError::NotFound(id))?;
        emp.chase_reenable = now + emp.config.return_home_cooldown;
        emp.state = EmployeeState::ReturningHome;
        debug!(employee = %id, "returning home after dialogue");
        Ok(())
    }

    /// Advances every employee by one tick.
    ///
    /// When `mode` is anything but [`GameMode::Playing`] all velocities are
    /// zeroed and nothing else runs — the internal clock freezes with the
    /// simulation, so knockback/stun/cooldown timers resume where they left
    /// off.
    pub fn update<F: ObstacleField + ?Sized>(
        &mut self,
        dt: f32,
        mode: GameMode,
        player_pos: Vec2,
        field: &F,
    ) -> Vec<EmployeeEvent> {
        if mode != GameMode::Playing {
            for emp in self.employees.values_mut() {
                emp.velocity = Vec2::ZERO;
            }
            return Vec::new();
        }

        self.now += dt;
        let now = self.now;
        let mut events = Vec::new();

        for (&id, emp) in &mut self.employees {
            Self::tick(emp, id, dt, now, player_pos, field, &mut self.rng, &mut events);
        }

        events
    }

    #[allow(clippy::too_many_arguments)]
    fn tick<F: ObstacleField + ?Sized>(
        emp: &mut Employee,
        id: EntityId,
        dt: f32,
        now: f32,
        player_pos: Vec2,
        field: &F,
        rng: &mut fastrand::Rng,
        events: &mut Vec<EmployeeEvent>,
    ) {
        // Knockback runs its impulse out, then hands over to the stun.
        if emp.state == EmployeeState::KnockedBack {
            if now >= emp.knockback_end {
                emp.enter_stunned(now);
                debug!(employee = %id, "stunned");
            } else {
                emp.integrate(dt, field);
            }
            return;
        }

        // Stun expires into wandering; the rest of the tick then proceeds
        // normally.
        if emp.state == EmployeeState::Stunned {
            if now < emp.stun_end {
                return;
            }
            emp.enter_wandering(now, rng, field);
            debug!(employee = %id, "recovered from stun");
        }

        Self::update_stuck_detection(emp, id, dt, now, rng, field);

        // Return-home outranks detection: once heading home, the employee
        // ignores the player entirely until it arrives or gets stuck.
        if emp.state == EmployeeState::ReturningHome {
            emp.velocity = emp.steer_towards(emp.home, emp.config.move_speed, field);
            emp.integrate(dt, field);
            if emp.position.distance(emp.home) < emp.config.arrive_epsilon {
                emp.chase_reenable = now + emp.config.return_home_cooldown;
                emp.enter_wandering(now, rng, field);
                debug!(employee = %id, "arrived home");
            }
            return;
        }

        // Detection.
        let distance = emp.position.distance(player_pos);
        let in_range = distance <= emp.config.detection_radius;
        let can_chase = now >= emp.chase_reenable;
        let has_sight =
            !emp.config.require_line_of_sight || field.line_of_sight(emp.position, player_pos);

        if in_range && can_chase && has_sight {
            if emp.state != EmployeeState::Chasing {
                emp.enter_chasing();
                debug!(employee = %id, "spotted the boss");
            }
        } else if emp.state == EmployeeState::Chasing {
            emp.enter_wandering(now, rng, field);
            debug!(employee = %id, "lost the boss");
        }

        // Execute the active state's movement.
        match emp.state {
            EmployeeState::Wandering => {
                if now >= emp.next_wander_time {
                    emp.pick_new_wander_target(now, rng, field);
                }
                emp.velocity =
                    emp.steer_towards(emp.wander_target, emp.config.move_speed, field);
                emp.integrate(dt, field);
                if emp.position.distance(emp.wander_target) < emp.config.arrive_epsilon {
                    emp.pick_new_wander_target(now, rng, field);
                }
            }
            EmployeeState::Chasing => {
                emp.velocity = emp.steer_towards(player_pos, emp.config.chase_speed, field);
                emp.integrate(dt, field);
            }
            _ => {}
        }

        // Contact while chasing opens a dialogue. Dropping straight to
        // wandering (with a homeward velocity for the next tick) keeps
        // continued overlap from re-triggering it.
        if emp.state == EmployeeState::Chasing
            && emp.position.distance(player_pos) <= emp.config.contact_radius
        {
            if let Some(index) = pick_line(&emp.config.dialogue_lines, emp.last_line_index, rng) {
                emp.last_line_index = Some(index);
                events.push(EmployeeEvent::DialogueRequested {
                    employee: id,
                    line: emp.config.dialogue_lines[index].clone(),
                });
            }
            emp.state = EmployeeState::Wandering;
            emp.velocity = emp.steer_towards(emp.home, emp.config.move_speed, field);
            if emp.position.distance(emp.home) < emp.config.arrive_epsilon {
                emp.chase_reenable = now + emp.config.return_home_cooldown;
            }
            debug!(employee = %id, "caught the boss");
        }
    }

    fn update_stuck_detection<F: ObstacleField + ?Sized>(
        emp: &mut Employee,
        id: EntityId,
        dt: f32,
        now: f32,
        rng: &mut fastrand::Rng,
        field: &F,
    ) {
        if matches!(
            emp.state,
            EmployeeState::Wandering | EmployeeState::ReturningHome
        ) {
            let moved = emp.position.distance(emp.last_position);
            if moved < emp.config.stuck_speed * dt {
                emp.stuck_timer += dt;
                if emp.stuck_timer >= emp.config.stuck_time {
                    Self::recover_from_stuck(emp, id, now, rng, field);
                    emp.stuck_timer = 0.0;
                }
            } else {
                emp.stuck_timer = 0.0;
            }
        } else {
            emp.stuck_timer = 0.0;
        }
        emp.last_position = emp.position;
    }

    fn recover_from_stuck<F: ObstacleField + ?Sized>(
        emp: &mut Employee,
        id: EntityId,
        now: f32,
        rng: &mut fastrand::Rng,
        field: &F,
    ) {
        match emp.state {
            EmployeeState::Wandering => {
                // The current target is probably behind a wall.
                emp.pick_new_wander_target(now, rng, field);
                debug!(employee = %id, "stuck while wandering, re-picked target");
            }
            EmployeeState::ReturningHome => {
                // Home is unreachable; wherever we are is home now.
                emp.home = emp.position;
                emp.enter_wandering(now, rng, field);
                debug!(employee = %id, "stuck returning home, re-based home");
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steering::{OpenField, RayHit, SegmentObstacleField};

    const DT: f32 = 1.0 / 60.0;
    const FAR: Vec2 = Vec2::new(1000.0, 1000.0);

    /// Field where every ray immediately hits something.
    struct SolidField;

    impl ObstacleField for SolidField {
        fn raycast(&self, _origin: Vec2, direction: Vec2, _max: f32) -> Option<RayHit> {
            Some(RayHit {
                distance: 0.0,
                normal: -direction.normalized(),
            })
        }
    }

    fn run(
        manager: &mut EmployeeManager,
        ticks: u32,
        player: Vec2,
        field: &impl ObstacleField,
    ) -> Vec<EmployeeEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(manager.update(DT, GameMode::Playing, player, field));
        }
        events
    }

    #[test]
    fn test_spawn_defaults() {
        let mut manager = EmployeeManager::with_seed(1);
        let id = manager.spawn(Vec2::new(2.0, 3.0));
        let emp = manager.get(id).expect("spawned");
        assert_eq!(emp.state(), EmployeeState::Wandering);
        assert_eq!(emp.position(), Vec2::new(2.0, 3.0));
        assert_eq!(emp.home(), Vec2::new(2.0, 3.0));
        assert_eq!(emp.velocity(), Vec2::ZERO);
        assert!(!emp.passes_through_characters());
    }

    #[test]
    fn test_home_override() {
        let mut manager = EmployeeManager::with_seed(1);
        let config = EmployeeConfig::default().with_home(Vec2::new(10.0, 0.0));
        let id = manager.spawn_with_config(Vec2::ZERO, config);
        assert_eq!(manager.get(id).expect("spawned").home(), Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_frozen_mode_zeroes_velocity() {
        let mut manager = EmployeeManager::with_seed(2);
        let id = manager.spawn(Vec2::ZERO);
        run(&mut manager, 5, FAR, &OpenField);
        assert!(manager.get(id).expect("spawned").velocity().length() > 0.0);

        let events = manager.update(DT, GameMode::Paused, FAR, &OpenField);
        assert!(events.is_empty());
        let emp = manager.get(id).expect("spawned");
        assert_eq!(emp.velocity(), Vec2::ZERO);

        let frozen_pos = emp.position();
        manager.update(DT, GameMode::InDialogue, FAR, &OpenField);
        assert_eq!(manager.get(id).expect("spawned").position(), frozen_pos);
    }

    #[test]
    fn test_frozen_mode_freezes_timers() {
        let mut manager = EmployeeManager::with_seed(3);
        let id = manager.spawn(Vec2::ZERO);
        manager.apply_knockback(id, Vec2::RIGHT).expect("knockback");

        // A whole second of paused ticks: the knockback must not expire and
        // the internal clock must not advance.
        let elapsed = manager.elapsed();
        for _ in 0..60 {
            manager.update(DT, GameMode::Paused, FAR, &OpenField);
        }
        assert_eq!(manager.elapsed(), elapsed);
        assert_eq!(
            manager.get(id).expect("spawned").state(),
            EmployeeState::KnockedBack
        );
    }

    #[test]
    fn test_wandering_moves_at_walk_speed() {
        let mut manager = EmployeeManager::with_seed(4);
        let id = manager.spawn(Vec2::ZERO);
        run(&mut manager, 10, FAR, &OpenField);
        let emp = manager.get(id).expect("spawned");
        let speed = emp.velocity().length();
        assert!((speed - emp.config().move_speed).abs() < 1e-3);
    }

    #[test]
    fn test_detection_enters_chase() {
        // Employee at home (0,0), detection radius 5, player at (3,0) with
        // clear line of sight and no cooldown pending.
        let mut manager = EmployeeManager::with_seed(5);
        let id = manager.spawn(Vec2::ZERO);
        let player = Vec2::new(3.0, 0.0);

        manager.update(DT, GameMode::Playing, player, &OpenField);

        let emp = manager.get(id).expect("spawned");
        assert_eq!(emp.state(), EmployeeState::Chasing);
        assert!(emp.velocity().x > 0.0);
        assert!((emp.velocity().length() - emp.config().chase_speed).abs() < 1e-3);
    }

    #[test]
    fn test_player_out_of_range_not_chased() {
        let mut manager = EmployeeManager::with_seed(6);
        let id = manager.spawn(Vec2::ZERO);
        manager.update(DT, GameMode::Playing, Vec2::new(6.0, 0.0), &OpenField);
        assert_eq!(
            manager.get(id).expect("spawned").state(),
            EmployeeState::Wandering
        );
    }

    #[test]
    fn test_wall_blocks_line_of_sight() {
        let mut field = SegmentObstacleField::new();
        field.add_wall(Vec2::new(1.5, -10.0), Vec2::new(1.5, 10.0));

        let mut manager = EmployeeManager::with_seed(7);
        let id = manager.spawn(Vec2::ZERO);
        manager.update(DT, GameMode::Playing, Vec2::new(3.0, 0.0), &field);
        assert_eq!(
            manager.get(id).expect("spawned").state(),
            EmployeeState::Wandering
        );
    }

    #[test]
    fn test_line_of_sight_not_required() {
        let mut field = SegmentObstacleField::new();
        field.add_wall(Vec2::new(1.5, -10.0), Vec2::new(1.5, 10.0));

        let mut manager = EmployeeManager::with_seed(8);
        let config = EmployeeConfig::default().with_line_of_sight(false);
        let id = manager.spawn_with_config(Vec2::ZERO, config);
        manager.update(DT, GameMode::Playing, Vec2::new(3.0, 0.0), &field);
        assert_eq!(
            manager.get(id).expect("spawned").state(),
            EmployeeState::Chasing
        );
    }

    #[test]
    fn test_losing_sight_returns_to_wandering() {
        let mut manager = EmployeeManager::with_seed(9);
        let id = manager.spawn(Vec2::ZERO);
        manager.update(DT, GameMode::Playing, Vec2::new(3.0, 0.0), &OpenField);
        assert_eq!(
            manager.get(id).expect("spawned").state(),
            EmployeeState::Chasing
        );

        manager.update(DT, GameMode::Playing, FAR, &OpenField);
        assert_eq!(
            manager.get(id).expect("spawned").state(),
            EmployeeState::Wandering
        );
    }

    #[test]
    fn test_knockback_chain() {
        let mut manager = EmployeeManager::with_seed(10);
        let id = manager.spawn(Vec2::ZERO);
        manager.apply_knockback(id, Vec2::RIGHT).expect("knockback");

        {
            let emp = manager.get(id).expect("spawned");
            assert_eq!(emp.state(), EmployeeState::KnockedBack);
            assert_eq!(emp.velocity(), Vec2::RIGHT * emp.config().knockback_force);
            assert!(emp.passes_through_characters());
        }

        // Ride out the 0.3 s impulse; the employee must land in Stunned,
        // never directly in Wandering.
        let mut saw_stunned = false;
        for _ in 0..30 {
            manager.update(DT, GameMode::Playing, FAR, &OpenField);
            let state = manager.get(id).expect("spawned").state();
            if state != EmployeeState::KnockedBack {
                assert_eq!(state, EmployeeState::Stunned);
                saw_stunned = true;
                break;
            }
        }
        assert!(saw_stunned);
        {
            let emp = manager.get(id).expect("spawned");
            assert_eq!(emp.velocity(), Vec2::ZERO);
            assert!(emp.position().x > 0.0);
            assert_eq!(emp.tint(), EmployeeTint::Dazed);
            assert!(emp.passes_through_characters());
        }

        // Stun expires into Wandering and clears collision-ignore.
        run(&mut manager, 70, FAR, &OpenField);
        let emp = manager.get(id).expect("spawned");
        assert_eq!(emp.state(), EmployeeState::Wandering);
        assert!(!emp.passes_through_characters());
    }

    #[test]
    fn test_knockback_overrides_detection() {
        let mut manager = EmployeeManager::with_seed(11);
        let id = manager.spawn(Vec2::ZERO);
        manager.apply_knockback(id, Vec2::RIGHT).expect("knockback");

        // Player standing right on top of the employee: still no chase.
        manager.update(DT, GameMode::Playing, Vec2::new(0.2, 0.0), &OpenField);
        assert_eq!(
            manager.get(id).expect("spawned").state(),
            EmployeeState::KnockedBack
        );
    }

    #[test]
    fn test_return_home_uninterruptible() {
        let mut manager = EmployeeManager::with_seed(12);
        let config = EmployeeConfig::default().with_home(Vec2::new(4.0, 0.0));
        let id = manager.spawn_with_config(Vec2::ZERO, config);
        manager.notify_dialogue_end(id).expect("notify");
        assert_eq!(
            manager.get(id).expect("spawned").state(),
            EmployeeState::ReturningHome
        );

        // The player shadows the employee the whole way home; it must not
        // take the bait before arriving.
        let mut arrived = false;
        for _ in 0..600 {
            let pos = manager.get(id).expect("spawned").position();
            manager.update(DT, GameMode::Playing, pos + Vec2::new(0.6, 0.0), &OpenField);
            let emp = manager.get(id).expect("spawned");
            match emp.state() {
                EmployeeState::ReturningHome => {}
                EmployeeState::Chasing => panic!("chase interrupted return-home"),
                _ => {
                    arrived = true;
                    assert!(emp.position().distance(emp.home()) < 1.0);
                    break;
                }
            }
        }
        assert!(arrived, "employee never made it home");
    }

    #[test]
    fn test_cooldown_after_homecoming() {
        let mut manager = EmployeeManager::with_seed(13);
        let id = manager.spawn(Vec2::ZERO);
        // Already at home: the first return-home tick arrives immediately
        // and arms the cooldown.
        manager.notify_dialogue_end(id).expect("notify");
        manager.update(DT, GameMode::Playing, Vec2::new(2.0, 0.0), &OpenField);
        assert_eq!(
            manager.get(id).expect("spawned").state(),
            EmployeeState::Wandering
        );

        // Player in plain sight, but the cooldown holds for 3 s.
        for _ in 0..120 {
            manager.update(DT, GameMode::Playing, Vec2::new(2.0, 0.0), &OpenField);
            assert_ne!(
                manager.get(id).expect("spawned").state(),
                EmployeeState::Chasing
            );
        }

        // Past the cooldown the chase resumes (or lands contact within the
        // same tick).
        let mut chased = false;
        for _ in 0..120 {
            let events = manager.update(DT, GameMode::Playing, Vec2::new(2.0, 0.0), &OpenField);
            if manager.get(id).expect("spawned").state() == EmployeeState::Chasing
                || !events.is_empty()
            {
                chased = true;
                break;
            }
        }
        assert!(chased);
    }

    #[test]
    fn test_contact_requests_dialogue() {
        let mut manager = EmployeeManager::with_seed(14);
        let id = manager.spawn(Vec2::ZERO);
        let player = Vec2::new(0.3, 0.0);

        let events = manager.update(DT, GameMode::Playing, player, &OpenField);
        assert_eq!(events.len(), 1);
        match &events[0] {
            EmployeeEvent::DialogueRequested { employee, line } => {
                assert_eq!(*employee, id);
                assert!(!line.is_empty());
            }
        }
        // Contact drops the employee out of Chasing immediately.
        assert_ne!(
            manager.get(id).expect("spawned").state(),
            EmployeeState::Chasing
        );

        // The orchestrator flips to InDialogue the same frame; no further
        // requests arrive while frozen.
        let events = manager.update(DT, GameMode::InDialogue, player, &OpenField);
        assert!(events.is_empty());
    }

    #[test]
    fn test_wander_fallback_when_fully_blocked() {
        let mut manager = EmployeeManager::with_seed(15);
        let id = manager.spawn(Vec2::new(5.0, 5.0));

        manager.update(DT, GameMode::Playing, FAR, &SolidField);
        let emp = manager.get(id).expect("spawned");
        // All five validation rays hit, so the fallback target lies within
        // one unit of the employee.
        assert!(emp.wander_target().distance(emp.position()) <= WANDER_FALLBACK_RADIUS + 1e-3);
    }

    #[test]
    fn test_stuck_rebases_home_when_returning() {
        let mut manager = EmployeeManager::with_seed(16);
        let config = EmployeeConfig::default().with_home(Vec2::new(10.0, 0.0));
        let id = manager.spawn_with_config(Vec2::ZERO, config);
        manager.notify_dialogue_end(id).expect("notify");

        // Nothing can move in a solid field; after stuck_time the employee
        // gives up on the unreachable home.
        run(&mut manager, 90, FAR, &SolidField);
        let emp = manager.get(id).expect("spawned");
        assert_eq!(emp.state(), EmployeeState::Wandering);
        assert_eq!(emp.home(), emp.position());
    }

    #[test]
    fn test_pick_line_never_repeats() {
        let lines: Vec<String> = (0..4).map(|i| format!("line {i}")).collect();
        let mut rng = fastrand::Rng::with_seed(99);
        let mut last = None;
        for _ in 0..1000 {
            let index = pick_line(&lines, last, &mut rng).expect("non-empty pool");
            assert_ne!(Some(index), last);
            last = Some(index);
        }
    }

    #[test]
    fn test_pick_line_single_entry() {
        let lines = vec!["only line".to_string()];
        let mut rng = fastrand::Rng::with_seed(99);
        for _ in 0..10 {
            assert_eq!(pick_line(&lines, Some(0), &mut rng), Some(0));
        }
    }

    #[test]
    fn test_pick_line_empty_pool() {
        let mut rng = fastrand::Rng::with_seed(99);
        assert_eq!(pick_line(&[], None, &mut rng), None);
    }

    #[test]
    fn test_unknown_employee_errors() {
        let mut manager = EmployeeManager::with_seed(17);
        let ghost = EntityId::new();
        assert!(matches!(
            manager.apply_knockback(ghost, Vec2::RIGHT),
            Err(EmployeeError::NotFound(_))
        ));
        assert!(matches!(
            manager.notify_dialogue_end(ghost),
            Err(EmployeeError::NotFound(_))
        ));
        assert!(matches!(
            manager.despawn(ghost),
            Err(EmployeeError::NotFound(_))
        ));
    }

    #[test]
    fn test_register_twice_errors() {
        let mut manager = EmployeeManager::with_seed(18);
        let id = EntityId::new();
        manager
            .register(id, Vec2::ZERO, EmployeeConfig::default())
            .expect("first registration");
        assert!(matches!(
            manager.register(id, Vec2::ZERO, EmployeeConfig::default()),
            Err(EmployeeError::AlreadyRegistered(_))
        ));
    }

    #[test]
    fn test_in_range_query() {
        let mut manager = EmployeeManager::with_seed(19);
        let near = manager.spawn(Vec2::new(1.0, 0.0));
        let far = manager.spawn(Vec2::new(9.0, 0.0));

        let hits = manager.in_range(Vec2::ZERO, 2.0);
        assert!(hits.contains(&near));
        assert!(!hits.contains(&far));
        assert_eq!(manager.iter().count(), 2);

        let removed = manager.despawn(far).expect("despawn");
        assert_eq!(removed.position(), Vec2::new(9.0, 0.0));
        assert_eq!(manager.len(), 1);
    }
}
