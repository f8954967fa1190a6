//! # Clockout Gameplay
//!
//! Headless simulation core for Clockout: survive the office day as the
//! boss while your own employees hunt you down for "a quick chat".
//!
//! This crate provides all simulation systems:
//! - Employee behavior controller (wander, chase, knockback, stun, return
//!   home)
//! - Feeler-ray obstacle avoidance and line-of-sight queries
//! - Timed paperwork challenges (key press / click target)
//! - Dialogue coordination gated by the challenge
//! - The 9-to-5 workday clock
//! - Day and floor session tracking with a fixed-timestep orchestrator
//! - Player controller with the click-aimed attack
//! - Event bus for the display layers
//!
//! The core is single-threaded and cooperative: every system advances one
//! tick at a time as a pure function of its own state, the input snapshot,
//! and the shared [`game_state::GameMode`]. Rendering, audio, and UI are
//! external consumers of events, tints, offsets, and formatted strings.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod clock;
pub mod dialogue;
pub mod employee;
pub mod events;
pub mod game_state;
pub mod input;
pub mod player;
pub mod qte;
pub mod steering;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::clock::*;
    pub use crate::dialogue::*;
    pub use crate::employee::*;
    pub use crate::events::*;
    pub use crate::game_state::*;
    pub use crate::input::*;
    pub use crate::player::*;
    pub use crate::qte::*;
    pub use crate::steering::*;
}

pub use prelude::*;
