//! # Clockout Common
//!
//! Common types and utilities shared across the Clockout crates.
//!
//! This crate provides the foundational pieces the simulation builds on:
//! - Entity ID type
//! - 2D vector math
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod ids;
pub mod math;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::math::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_vec2_direction_roundtrip() {
        let v = Vec2::from_angle(std::f32::consts::FRAC_PI_4);
        assert!((v.angle() - std::f32::consts::FRAC_PI_4).abs() < 1e-5);
        assert!((v.length() - 1.0).abs() < 1e-5);
    }
}
