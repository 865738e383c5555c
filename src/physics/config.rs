//! Simulation wide configuration.

use bevy::ecs::system::Resource;

use crate::physics::units::Distance;

/// Configuration shared by the host physics and the gravity model.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct GravityConfig {
    /// The length of one transform unit. Positions and velocities are in
    /// world units, forces are in newtons.
    pub world_unit: Distance,
    /// Log a warning when a gravity source with an invalid configuration is added.
    pub validate_sources: bool,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            world_unit: Distance::from_centimeters(1.0),
            validate_sources: true,
        }
    }
}

impl GravityConfig {
    /// Converts a world space vector to meters.
    pub fn to_meters(&self, world: bevy::math::Vec3) -> bevy::math::Vec3 {
        world * self.world_unit.meters()
    }
}
