//! The rigid body primitive gravity is applied to.
//!
//! This is a point mass. Forces accumulate during a tick and
//! [`integrate_system`] turns them into motion at the end of it.
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use bevy::ecs::component::Component;
use bevy::ecs::system::{Query, Res, Resource};
use bevy::log::trace;
use bevy::math::{Quat, Vec3};
use bevy::time::Time;
use bevy::transform::components::Transform;
use bitflags::bitflags;
use strum_macros::Display;

use crate::physics::config::GravityConfig;
use crate::physics::constants::EARTH_GRAVITY;

/// How a vector passed to [`RigidBody::add_force`] is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ForceMode {
    /// A force in newtons, divided by the body's mass.
    Force,
    /// An acceleration in world units per second squared, independent of mass.
    Acceleration,
}

bitflags! {
    /// Degrees of freedom a rigid body is not allowed to use.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RigidBodyConstraints: u8 {
        /// No rotation around the x axis.
        const LOCK_ROTATION_X = 1 << 0;
        /// No rotation around the y axis.
        const LOCK_ROTATION_Y = 1 << 1;
        /// No rotation around the z axis.
        const LOCK_ROTATION_Z = 1 << 2;
    }
}

/// The scene wide gravity applied to every body with
/// [`RigidBody::enable_gravity`] set, in $m / s^2$.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct AmbientGravity(pub Vec3);

impl Default for AmbientGravity {
    fn default() -> Self {
        AmbientGravity(Vec3::NEG_Y * EARTH_GRAVITY)
    }
}

impl AmbientGravity {
    /// No ambient gravity, for space scenes.
    pub const ZERO: AmbientGravity = AmbientGravity(Vec3::ZERO);
}

/// A simulated point mass.
#[derive(Component, Debug, Clone)]
pub struct RigidBody {
    /// Mass in kilograms.
    pub mass: f32,
    /// Linear velocity in world units per second.
    pub linear_velocity: Vec3,
    /// Angular velocity in radians per second, as a scaled axis.
    pub angular_velocity: Vec3,
    /// Whether this body responds to ambient gravity and gravity sources.
    pub enable_gravity: bool,
    /// Locked rotational axes.
    pub constraints: RigidBodyConstraints,
    /// Forces in newtons accumulated this tick.
    force: Vec3,
    /// Accelerations in world units per second squared accumulated this tick.
    acceleration: Vec3,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RigidBody {
    /// Creates a resting body of the given mass in kilograms.
    pub fn new(mass: f32) -> Self {
        Self {
            mass,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            enable_gravity: true,
            constraints: RigidBodyConstraints::empty(),
            force: Vec3::ZERO,
            acceleration: Vec3::ZERO,
        }
    }

    /// Sets the initial linear velocity.
    pub fn with_linear_velocity(mut self, linear_velocity: Vec3) -> Self {
        self.linear_velocity = linear_velocity;
        self
    }

    /// Sets whether the body responds to gravity.
    pub fn with_gravity(mut self, enable_gravity: bool) -> Self {
        self.enable_gravity = enable_gravity;
        self
    }

    /// Adds a world space force or acceleration for the current tick.
    pub fn add_force(&mut self, force: Vec3, mode: ForceMode) {
        match mode {
            ForceMode::Force => self.force += force,
            ForceMode::Acceleration => self.acceleration += force,
        }
    }

    /// Adds a force expressed in the body's local space.
    pub fn add_relative_force(&mut self, force: Vec3, rotation: Quat, mode: ForceMode) {
        self.add_force(rotation * force, mode);
    }

    /// The force in newtons accumulated this tick.
    pub fn accumulated_force(&self) -> Vec3 {
        self.force
    }

    /// The acceleration-mode input accumulated this tick.
    pub fn accumulated_acceleration(&self) -> Vec3 {
        self.acceleration
    }

    /// Clamps the linear velocity component-wise.
    pub fn clamp_linear_velocity(&mut self, min: Vec3, max: Vec3) {
        self.linear_velocity = self.linear_velocity.clamp(min, max);
    }

    /// The total acceleration this tick in world units per second squared.
    pub fn acceleration(&self, ambient: &AmbientGravity, meters_per_unit: f32) -> Vec3 {
        let mut meters_per_second_squared = self.force / self.mass;
        if self.enable_gravity {
            meters_per_second_squared += ambient.0;
        }
        meters_per_second_squared / meters_per_unit + self.acceleration
    }

    /// Angular velocity with the locked axes zeroed.
    pub fn constrained_angular_velocity(&self) -> Vec3 {
        let mut angular_velocity = self.angular_velocity;
        if self.constraints.contains(RigidBodyConstraints::LOCK_ROTATION_X) {
            angular_velocity.x = 0.0;
        }
        if self.constraints.contains(RigidBodyConstraints::LOCK_ROTATION_Y) {
            angular_velocity.y = 0.0;
        }
        if self.constraints.contains(RigidBodyConstraints::LOCK_ROTATION_Z) {
            angular_velocity.z = 0.0;
        }
        angular_velocity
    }

    /// Forgets everything accumulated this tick.
    fn clear_accumulators(&mut self) {
        self.force = Vec3::ZERO;
        self.acceleration = Vec3::ZERO;
    }
}

/// Semi-implicit Euler step over every rigid body.
pub fn integrate_system(
    time: Res<Time>,
    config: Res<GravityConfig>,
    ambient: Res<AmbientGravity>,
    mut bodies: Query<(&mut RigidBody, &mut Transform)>,
) {
    let dt = time.delta_seconds();
    let meters_per_unit = config.world_unit.meters();
    for (mut body, mut transform) in bodies.iter_mut() {
        let acceleration = body.acceleration(&ambient, meters_per_unit);
        body.linear_velocity += acceleration * dt;
        transform.translation += body.linear_velocity * dt;

        let angular_velocity = body.constrained_angular_velocity();
        body.angular_velocity = angular_velocity;
        if angular_velocity != Vec3::ZERO {
            transform.rotation =
                (Quat::from_scaled_axis(angular_velocity * dt) * transform.rotation).normalize();
        }

        trace!(
            "integrated body: acceleration {:?}, velocity {:?}",
            acceleration,
            body.linear_velocity
        );
        body.clear_accumulators();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::app::{App, FixedUpdate};
    use bevy::ecs::schedule::Schedule;

    use super::*;
    use crate::physics::units::Distance;

    #[test]
    fn test_force_modes_accumulate_separately() {
        let mut body = RigidBody::new(2.0);
        body.add_force(Vec3::X * 4.0, ForceMode::Force);
        body.add_force(Vec3::Y, ForceMode::Acceleration);
        body.add_force(Vec3::X, ForceMode::Force);
        assert_eq!(body.accumulated_force(), Vec3::X * 5.0);
        assert_eq!(body.accumulated_acceleration(), Vec3::Y);
    }

    #[test]
    fn test_relative_force_is_rotated() {
        let mut body = RigidBody::new(1.0);
        let rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        body.add_relative_force(Vec3::Z, rotation, ForceMode::Acceleration);
        assert!(body.accumulated_acceleration().abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn test_acceleration_converts_newtons_to_world_units() {
        let mut body = RigidBody::new(2.0);
        body.add_force(Vec3::X * 2.0, ForceMode::Force);
        // 1 m/s^2 is 100 cm/s^2
        let acceleration = body.acceleration(&AmbientGravity::ZERO, 0.01);
        assert!(acceleration.abs_diff_eq(Vec3::X * 100.0, 1e-3));
    }

    #[test]
    fn test_ambient_gravity_only_applies_when_enabled() {
        let ambient = AmbientGravity::default();
        let body = RigidBody::new(1.0);
        assert_eq!(body.acceleration(&ambient, 1.0), ambient.0);
        let body = RigidBody::new(1.0).with_gravity(false);
        assert_eq!(body.acceleration(&ambient, 1.0), Vec3::ZERO);
    }

    #[test]
    fn test_locked_axes_do_not_rotate() {
        let mut body = RigidBody::new(1.0);
        body.angular_velocity = Vec3::new(1.0, 2.0, 3.0);
        body.constraints = RigidBodyConstraints::LOCK_ROTATION_X | RigidBodyConstraints::LOCK_ROTATION_Z;
        assert_eq!(body.constrained_angular_velocity(), Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_integrate_system_moves_and_clears() {
        let mut app = App::new();
        app.insert_resource(GravityConfig {
            world_unit: Distance::from_meters(1.0),
            ..Default::default()
        });
        app.insert_resource(AmbientGravity::ZERO);
        app.init_resource::<Time>();
        app.world
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs(1));
        let mut schedule = Schedule::new(FixedUpdate);
        schedule.add_systems(integrate_system);

        let mut body = RigidBody::new(1.0);
        body.add_force(Vec3::X, ForceMode::Force);
        let entity = app.world.spawn((body, Transform::default())).id();

        schedule.run(&mut app.world);

        let body = app.world.get::<RigidBody>(entity).unwrap();
        assert!(body.linear_velocity.abs_diff_eq(Vec3::X, 1e-6));
        assert_eq!(body.accumulated_force(), Vec3::ZERO);
        let transform = app.world.get::<Transform>(entity).unwrap();
        assert!(transform.translation.abs_diff_eq(Vec3::X, 1e-6));
    }
}
