//! The 9-to-5 workday clock.
//!
//! Game time runs from 9:00 AM to 5:00 PM at a configurable rate. The clock
//! keeps ticking during dialogue — being cornered by an employee costs real
//! workday minutes — but freezes while paused or once the day is decided.
//! Hitting 5:00 PM ends the day exactly once.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::game_state::GameMode;

/// Workday start, in minutes from midnight (9:00 AM).
pub const START_MINUTES: f32 = 9.0 * 60.0;
/// Workday end, in minutes from midnight (5:00 PM).
pub const END_MINUTES: f32 = 17.0 * 60.0;

/// Default real seconds per 10 in-game minutes.
const DEFAULT_SECONDS_PER_10_MINUTES: f32 = 2.0;

/// Events the clock can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// The clock reached 5:00 PM.
    DayEnded,
}

/// In-game workday clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameClock {
    /// Current time in minutes from midnight.
    minutes: f32,
    /// Game minutes that pass per real second.
    minutes_per_second: f32,
    day_ended: bool,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl GameClock {
    /// Creates a clock at 9:00 AM with the default rate.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rate(DEFAULT_SECONDS_PER_10_MINUTES)
    }

    /// Creates a clock at 9:00 AM where `seconds_per_10_minutes` real
    /// seconds advance the clock by 10 in-game minutes.
    #[must_use]
    pub fn with_rate(seconds_per_10_minutes: f32) -> Self {
        Self {
            minutes: START_MINUTES,
            minutes_per_second: 10.0 / seconds_per_10_minutes.max(0.01),
            day_ended: false,
        }
    }

    /// Resumes the clock mid-day (floor transitions preserve the time).
    /// The value is clamped to the workday range.
    pub fn resume_at(&mut self, minutes: f32) {
        self.minutes = minutes.clamp(START_MINUTES, END_MINUTES);
        self.day_ended = self.minutes >= END_MINUTES;
    }

    /// Resets to a fresh 9:00 AM morning.
    pub fn reset(&mut self) {
        self.minutes = START_MINUTES;
        self.day_ended = false;
    }

    /// Current time in minutes from midnight.
    #[must_use]
    pub fn minutes(&self) -> f32 {
        self.minutes
    }

    /// Whether the day has already ended.
    #[must_use]
    pub fn day_ended(&self) -> bool {
        self.day_ended
    }

    /// Progress through the workday in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        ((self.minutes - START_MINUTES) / (END_MINUTES - START_MINUTES)).clamp(0.0, 1.0)
    }

    /// Current hour (0-23).
    #[must_use]
    pub fn hour(&self) -> u32 {
        (self.minutes as u32 / 60) % 24
    }

    /// Current minute (0-59).
    #[must_use]
    pub fn minute(&self) -> u32 {
        self.minutes as u32 % 60
    }

    /// 12-hour formatted time, e.g. `9:07 AM` or `4:59 PM`.
    #[must_use]
    pub fn formatted(&self) -> String {
        let hours = self.hour();
        let minutes = self.minute();
        let period = if hours >= 12 { "PM" } else { "AM" };
        let display_hour = match hours % 12 {
            0 => 12,
            h => h,
        };
        format!("{display_hour}:{minutes:02} {period}")
    }

    /// Advances the clock by one tick.
    ///
    /// The clock runs in [`GameMode::Playing`] and [`GameMode::InDialogue`]
    /// and freezes in every other mode. Returns [`ClockEvent::DayEnded`]
    /// exactly once, on the tick that reaches 5:00 PM.
    pub fn tick(&mut self, dt: f32, mode: GameMode) -> Option<ClockEvent> {
        if !matches!(mode, GameMode::Playing | GameMode::InDialogue) || self.day_ended {
            return None;
        }

        self.minutes += self.minutes_per_second * dt;
        if self.minutes >= END_MINUTES {
            self.minutes = END_MINUTES;
            self.day_ended = true;
            debug!("workday over");
            return Some(ClockEvent::DayEnded);
        }
        None
    }
}
