//! Session state and the top-level simulation loop.
//!
//! [`GameMode`] is the coarse mode every subsystem reads each tick;
//! [`GameSession`] tracks the run (day counter, floor progression, clock
//! persistence across floors); [`GameState`] owns all subsystems and drives
//! them in a fixed order at 60 Hz.

use clockout_common::{EntityId, Vec2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::{ClockEvent, GameClock};
use crate::dialogue::DialogueCoordinator;
use crate::employee::{EmployeeEvent, EmployeeManager};
use crate::events::{EventBus, GameEvent};
use crate::input::Input;
use crate::player::Player;
use crate::qte::{QteEngine, QteOutcome};
use crate::steering::ObstacleField;

/// Coarse simulation mode. Written by the session, read by every subsystem
/// once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Normal play.
    #[default]
    Playing,
    /// Pause menu is up; everything freezes.
    Paused,
    /// An employee has the boss cornered; movement freezes but the clock
    /// keeps running.
    InDialogue,
    /// The last floor was cleared.
    Won,
    /// The clock hit 5:00 PM.
    Lost,
}

impl GameMode {
    /// Whether the run is over (won or lost).
    #[must_use]
    pub const fn is_over(self) -> bool {
        matches!(self, GameMode::Won | GameMode::Lost)
    }
}

/// What happened when the player stepped on a staircase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorTransition {
    /// Moved up to the given floor index.
    Advanced(usize),
    /// That was the last floor — the day is won.
    Won,
}

/// Day and floor bookkeeping for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    day: u32,
    floor: usize,
    floor_count: usize,
    /// Clock minutes carried across a floor transition; `None` means start
    /// the next day fresh at 9:00 AM.
    saved_clock_minutes: Option<f32>,
    mode: GameMode,
}

impl GameSession {
    /// Creates a day-1 session with the given number of floors.
    #[must_use]
    pub fn new(floor_count: usize) -> Self {
        Self {
            day: 1,
            floor: 0,
            floor_count: floor_count.max(1),
            saved_clock_minutes: None,
            mode: GameMode::Playing,
        }
    }

    /// Current day number (1-based).
    #[must_use]
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Current floor index (0-based).
    #[must_use]
    pub fn floor(&self) -> usize {
        self.floor
    }

    /// Total number of floors.
    #[must_use]
    pub fn floor_count(&self) -> usize {
        self.floor_count
    }

    /// Clock minutes to restore after a floor transition, if any.
    #[must_use]
    pub fn saved_clock_minutes(&self) -> Option<f32> {
        self.saved_clock_minutes
    }

    /// Current coarse mode.
    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Sets the coarse mode.
    pub fn set_mode(&mut self, mode: GameMode) {
        self.mode = mode;
    }

    /// Whether the current floor is the last one.
    #[must_use]
    pub fn is_last_floor(&self) -> bool {
        self.floor >= self.floor_count - 1
    }

    /// Resumes playing from the pause menu.
    pub fn resume(&mut self) {
        if self.mode == GameMode::Paused {
            self.mode = GameMode::Playing;
        }
    }

    /// Flips between playing and paused; other modes are unaffected.
    /// Returns the new paused flag if anything changed.
    pub fn toggle_pause(&mut self) -> Option<bool> {
        match self.mode {
            GameMode::Playing => {
                self.mode = GameMode::Paused;
                Some(true)
            }
            GameMode::Paused => {
                self.mode = GameMode::Playing;
                Some(false)
            }
            _ => None,
        }
    }

    /// Gives up on the current day from the pause menu: next day, floor 1,
    /// fresh clock.
    pub fn clock_out_early(&mut self) {
        self.start_next_day();
    }

    /// Starts the next day after a loss (or surrender).
    pub fn start_next_day(&mut self) {
        self.day += 1;
        self.floor = 0;
        self.saved_clock_minutes = None;
        self.mode = GameMode::Playing;
        debug!(day = self.day, "new day");
    }

    /// The player reached a staircase: advance a floor, carrying the clock,
    /// or win the day on the last floor. Ignored outside normal play.
    pub fn reach_staircase(&mut self, clock_minutes: f32) -> Option<FloorTransition> {
        if self.mode != GameMode::Playing {
            return None;
        }
        if self.is_last_floor() {
            self.mode = GameMode::Won;
            debug!(day = self.day, "day won");
            return Some(FloorTransition::Won);
        }
        self.floor += 1;
        self.saved_clock_minutes = Some(clock_minutes);
        debug!(floor = self.floor, "advanced floor");
        Some(FloorTransition::Advanced(self.floor))
    }
}

/// Fixed timestep for simulation updates (60 ticks per second).
const FIXED_TIMESTEP: f64 = 1.0 / 60.0;

/// The whole simulation for one run, driven by [`GameState::update`].
#[derive(Debug)]
pub struct GameState {
    /// Day/floor/mode bookkeeping.
    pub session: GameSession,
    /// The 9-to-5 clock.
    pub clock: GameClock,
    /// The boss.
    pub player: Player,
    /// Every employee on the current floor.
    pub employees: EmployeeManager,
    /// Dialogue interruption bookkeeping.
    pub dialogue: DialogueCoordinator,
    /// The paperwork challenge engine.
    pub qte: QteEngine,
    /// Events for the display layers.
    pub events: EventBus,
    staircase: Option<Vec2>,
    staircase_radius: f32,
    accumulator: f64,
}

impl GameState {
    /// Creates a run with the player at the origin and the given floor
    /// count.
    #[must_use]
    pub fn new(floor_count: usize) -> Self {
        Self {
            session: GameSession::new(floor_count),
            clock: GameClock::new(),
            player: Player::new(Vec2::ZERO),
            employees: EmployeeManager::new(),
            dialogue: DialogueCoordinator::new(),
            qte: QteEngine::new(),
            events: EventBus::default(),
            staircase: None,
            staircase_radius: 0.75,
            accumulator: 0.0,
        }
    }

    /// Places the staircase trigger for the current floor (or removes it).
    pub fn set_staircase(&mut self, position: Option<Vec2>) {
        self.staircase = position;
    }

    /// Current coarse mode.
    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.session.mode()
    }

    /// Player position, for camera targeting.
    #[must_use]
    pub fn player_position(&self) -> Vec2 {
        self.player.position()
    }

    /// Advances the simulation by one rendered frame.
    ///
    /// Pause toggling is handled once per frame; everything else runs on
    /// the fixed 60 Hz timestep with an accumulator, the same `input`
    /// snapshot feeding every substep.
    pub fn update<F: ObstacleField + ?Sized>(&mut self, dt: f32, input: &Input, field: &F) {
        if input.pause_just_pressed {
            if let Some(paused) = self.session.toggle_pause() {
                self.events.publish(GameEvent::PauseToggled { paused });
            }
        }

        self.accumulator += f64::from(dt);
        while self.accumulator >= FIXED_TIMESTEP {
            self.fixed_update(FIXED_TIMESTEP as f32, input, field);
            self.accumulator -= FIXED_TIMESTEP;
        }
    }

    /// One fixed simulation tick. The ordering here is the contract:
    /// clock first (a day ending cancels everything), then the player and
    /// their attack, then employees, then the challenge gate, then the
    /// staircase.
    fn fixed_update<F: ObstacleField + ?Sized>(&mut self, dt: f32, input: &Input, field: &F) {
        // Clock. Runs during dialogue on purpose.
        if self.clock.tick(dt, self.session.mode()) == Some(ClockEvent::DayEnded) {
            // Day ended mid-dialogue: force-cancel and still send the
            // employee home so the next morning starts clean.
            if let Some(employee) = self.dialogue.cancel(&mut self.qte) {
                let _ = self.employees.notify_dialogue_end(employee);
            }
            self.session.set_mode(GameMode::Lost);
            self.events.publish(GameEvent::DayEnded {
                day: self.session.day(),
            });
            return;
        }

        let mode = self.session.mode();

        // Player movement and attack.
        if let Some(attack) = self.player.update(input, mode, field, dt) {
            self.events.publish(GameEvent::AttackSwung);
            for employee in self
                .employees
                .in_range(attack.point, self.player.config().attack_radius)
            {
                let away = match self.employees.get(employee) {
                    Some(emp) => emp.position() - attack.origin,
                    None => continue,
                };
                if self.employees.apply_knockback(employee, away).is_ok() {
                    self.events
                        .publish(GameEvent::EmployeeKnockedBack { employee });
                }
            }
        }

        // Employees; contact requests open the dialogue (and freeze the
        // very next tick).
        let requests =
            self.employees
                .update(dt, mode, self.player.position(), field);
        for request in requests {
            let EmployeeEvent::DialogueRequested { employee, line } = request;
            if self
                .dialogue
                .open(line.clone(), employee, &mut self.session, &mut self.qte)
            {
                self.events
                    .publish(GameEvent::DialogueOpened { employee, line });
            }
        }

        // Challenge gate.
        match self.qte.update(dt, input) {
            QteOutcome::Succeeded => {
                self.events.publish(GameEvent::ChallengeSucceeded);
                if let Some(employee) = self.dialogue.handle_outcome(QteOutcome::Succeeded) {
                    let _ = self.employees.notify_dialogue_end(employee);
                    self.session.set_mode(GameMode::Playing);
                    self.events.publish(GameEvent::DialogueClosed { employee });
                }
            }
            QteOutcome::Redrawn => {
                if let Some(kind) = self.qte.challenge().map(|challenge| challenge.kind()) {
                    self.events.publish(GameEvent::ChallengeRedrawn { kind });
                }
            }
            QteOutcome::Inactive | QteOutcome::Continuing => {}
        }

        // Staircase trigger.
        if let Some(staircase) = self.staircase {
            if self.session.mode() == GameMode::Playing
                && self.player.position().distance(staircase) <= self.staircase_radius
            {
                match self.session.reach_staircase(self.clock.minutes()) {
                    Some(FloorTransition::Won) => {
                        self.events.publish(GameEvent::DayWon {
                            day: self.session.day(),
                        });
                    }
                    Some(FloorTransition::Advanced(floor)) => {
                        self.events.publish(GameEvent::FloorAdvanced { floor });
                        // The embedder loads the floor layout; the trigger
                        // is gone until it places a new one.
                        self.staircase = None;
                    }
                    None => {}
                }
            }
        }
    }

    /// Loads a floor layout after a [`GameEvent::FloorAdvanced`]: moves the
    /// player to the spawn point, replaces the employees, and restores the
    /// carried clock time.
    pub fn load_floor(&mut self, spawn: Vec2, staircase: Option<Vec2>) {
        self.player.set_position(spawn);
        self.employees = EmployeeManager::new();
        self.staircase = staircase;
        if let Some(minutes) = self.session.saved_clock_minutes() {
            self.clock.resume_at(minutes);
        } else {
            self.clock.reset();
        }
    }

    /// Spawns an employee on the current floor.
    pub fn spawn_employee(&mut self, position: Vec2) -> EntityId {
        self.employees.spawn(position)
    }
}
