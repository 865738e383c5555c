//! Gravity sources and the inverse square law.
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use bevy::ecs::component::Component;
use bevy::ecs::entity::Entity;
use bevy::math::Vec3;
use thiserror::Error;

use crate::physics::constants::{GRAVITATIONAL_CONSTANT, STANDARD_GRAVITY};
use crate::physics::host::rigid_body::RigidBody;
use crate::physics::units::{Distance, Mass};

/// A body as the gravity model sees it: where it is and how heavy it is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMass {
    /// World space position, in world units.
    pub position: Vec3,
    /// Mass in kilograms.
    pub mass: f32,
}

impl PointMass {
    /// Creates a new point mass.
    pub fn new(position: Vec3, mass: f32) -> Self {
        Self { position, mass }
    }
}

/// Reasons a gravity source produces meaningless forces.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum GravitySourceError {
    /// The surface radius is zero, negative or not finite.
    #[error("surface radius must be positive and finite, got {0}")]
    InvalidRadius(Distance),
    /// The mass is negative or not finite.
    #[error("mass must be non-negative and finite, got {0}")]
    InvalidMass(Mass),
    /// The gravitational direction zeroes out every displacement.
    #[error("gravitational direction must not be zero")]
    ZeroDirection,
}

/// Emits a gravitational field that attracts every rigid body inside its gravity volume.
///
/// Mass and surface radius are stored; surface gravity is derived from them.
#[derive(Component, Debug, Clone)]
pub struct GravitySource {
    /// Scales the displacement toward bodies per axis. `Vec3::ONE` is a
    /// regular point source; zeroing an axis flattens the field along it.
    pub gravitational_direction: Vec3,
    /// Keep the mass in sync with the [`RigidBody`] on the same entity.
    /// Turn this off for less realistic setups, like a small body with strong gravity.
    pub use_rigid_body_mass: bool,
    /// If the source has its own [`RigidBody`], it is pulled toward the bodies it attracts.
    pub affected_by_mutual_gravitation: bool,
    /// The trigger collider bounding the field. `None` means the collider on the source entity.
    pub gravity_volume: Option<Entity>,
    /// The radius at which the acceleration equals the surface gravity.
    surface_radius: Distance,
    /// Cached mass.
    mass: Mass,
}

impl Default for GravitySource {
    fn default() -> Self {
        Self {
            gravitational_direction: Vec3::ONE,
            use_rigid_body_mass: false,
            affected_by_mutual_gravitation: false,
            gravity_volume: None,
            surface_radius: Distance::from_meters(1.0),
            mass: Mass::ZERO,
        }
    }
}

impl GravitySource {
    /// Creates a source with the given surface radius and mass.
    pub fn new(surface_radius: Distance, mass: Mass) -> Self {
        Self {
            surface_radius,
            mass,
            ..Default::default()
        }
    }

    /// Creates a source whose mass produces `surface_gravity` ($m / s^2$) at `surface_radius`.
    pub fn with_surface_gravity(surface_radius: Distance, surface_gravity: f32) -> Self {
        let mut source = Self::new(surface_radius, Mass::ZERO);
        source.set_surface_gravity(surface_gravity, None);
        source
    }

    /// The acceleration at the surface radius, in $m / s^2$.
    pub fn surface_gravity(&self) -> f32 {
        self.mass.kilograms() / (self.surface_radius.meters().powi(2) / GRAVITATIONAL_CONSTANT)
    }

    /// Sets the mass so that the acceleration at the surface radius is `surface_gravity`.
    pub fn set_surface_gravity(&mut self, surface_gravity: f32, attached: Option<&mut RigidBody>) {
        let surface_radius_squared = self.surface_radius.meters().powi(2);
        let mass = Mass::from_kilograms(
            surface_gravity * surface_radius_squared / GRAVITATIONAL_CONSTANT,
        );
        self.set_mass(mass, attached);
    }

    /// The surface gravity in Gs.
    pub fn g_force(&self) -> f32 {
        self.surface_gravity() / STANDARD_GRAVITY
    }

    /// Sets the surface gravity in Gs.
    pub fn set_g_force(&mut self, g_force: f32, attached: Option<&mut RigidBody>) {
        self.set_surface_gravity(STANDARD_GRAVITY * g_force, attached);
    }

    /// The radius at which the acceleration equals the surface gravity.
    pub fn surface_radius(&self) -> Distance {
        self.surface_radius
    }

    /// Moves the surface. The mass is kept, so the surface gravity follows the new radius.
    pub fn set_surface_radius(&mut self, surface_radius: Distance) {
        self.surface_radius = surface_radius;
    }

    /// The cached mass, as of the last [`GravitySource::refresh_mass`] or [`GravitySource::set_mass`].
    pub fn mass(&self) -> Mass {
        self.mass
    }

    /// Pulls the mass from the attached rigid body when [`GravitySource::use_rigid_body_mass`]
    /// is set and the two disagree, then returns it.
    pub fn refresh_mass(&mut self, attached: Option<&RigidBody>) -> Mass {
        if let Some(body) = attached {
            if self.use_rigid_body_mass && self.mass.kilograms() != body.mass {
                self.mass = Mass::from_kilograms(body.mass);
            }
        }
        self.mass
    }

    /// Sets the mass, pushing it to the attached rigid body when
    /// [`GravitySource::use_rigid_body_mass`] is set.
    pub fn set_mass(&mut self, mass: Mass, attached: Option<&mut RigidBody>) {
        self.mass = mass;
        if let Some(body) = attached {
            if self.use_rigid_body_mass {
                body.mass = mass.kilograms();
            }
        }
    }

    /// The magnitude of the gravitational force in newtons between this
    /// source, placed at `at`, and `body`.
    ///
    /// $F = G \frac{m_1 m_2}{r^2}$, where $r$ is the displacement scaled by
    /// [`GravitySource::gravitational_direction`], in meters. Coincident
    /// positions give a non-finite force.
    pub fn gravitational_force_between(
        &self,
        at: Vec3,
        body: &PointMass,
        world_unit: Distance,
    ) -> f32 {
        let displacement = (body.position - at) * self.gravitational_direction;
        let distance_squared = (displacement * world_unit.meters()).length_squared();
        GRAVITATIONAL_CONSTANT * (self.mass.kilograms() * body.mass) / distance_squared
    }

    /// The acceleration in $m / s^2$ this source gives `body`.
    pub fn gravitational_acceleration_for(
        &self,
        at: Vec3,
        body: &PointMass,
        world_unit: Distance,
    ) -> f32 {
        self.gravitational_force_between(at, body, world_unit) / body.mass
    }

    /// The gravitational force vector in newtons, pointing from the source toward `body`.
    /// The body is pulled along its negation.
    pub fn gravitational_vector_towards(
        &self,
        at: Vec3,
        body: &PointMass,
        world_unit: Distance,
    ) -> Vec3 {
        let from_source_to_body = body.position - at;
        self.gravitational_force_between(at, body, world_unit)
            * from_source_to_body.normalize()
            * self.gravitational_direction
    }

    /// Checks for configurations that produce non-finite or meaningless forces.
    /// Nothing else in the model depends on this passing.
    pub fn validate(&self) -> Result<(), GravitySourceError> {
        let radius = self.surface_radius.meters();
        if !radius.is_finite() || radius <= 0.0 {
            return Err(GravitySourceError::InvalidRadius(self.surface_radius));
        }
        let mass = self.mass.kilograms();
        if !mass.is_finite() || mass < 0.0 {
            return Err(GravitySourceError::InvalidMass(self.mass));
        }
        if self.gravitational_direction == Vec3::ZERO {
            return Err(GravitySourceError::ZeroDirection);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Positions in these tests are in centimeters.
    const CM: Distance = Distance::from_centimeters(1.0);

    fn relative_eq(a: f32, b: f32, tolerance: f32) -> bool {
        (a - b).abs() <= tolerance * a.abs().max(b.abs())
    }

    #[test]
    fn test_reference_force() {
        let source = GravitySource::new(Distance::from_meters(10.0), Mass::from_kilograms(1000.0));
        assert_eq!(source.gravitational_direction, Vec3::ONE);
        let body = PointMass::new(Vec3::new(2000.0, 0.0, 0.0), 10.0);
        let force = source.gravitational_force_between(Vec3::ZERO, &body, CM);
        let expected = GRAVITATIONAL_CONSTANT * 1000.0 * 10.0 / (20.0 * 20.0);
        assert!(relative_eq(force, expected, 1e-5), "{} != {}", force, expected);
    }

    #[test]
    fn test_world_unit_scales_distance() {
        let source = GravitySource::new(Distance::from_meters(10.0), Mass::from_kilograms(1000.0));
        let in_meters = PointMass::new(Vec3::new(20.0, 0.0, 0.0), 10.0);
        let in_centimeters = PointMass::new(Vec3::new(2000.0, 0.0, 0.0), 10.0);
        let a = source.gravitational_force_between(Vec3::ZERO, &in_meters, Distance::from_meters(1.0));
        let b = source.gravitational_force_between(Vec3::ZERO, &in_centimeters, CM);
        assert!(relative_eq(a, b, 1e-5));
    }

    #[test]
    fn test_force_symmetric_in_masses() {
        let at = Vec3::new(100.0, -50.0, 30.0);
        let position = Vec3::new(-300.0, 400.0, 10.0);
        let a = GravitySource::new(Distance::from_meters(1.0), Mass::from_kilograms(5000.0));
        let b = GravitySource::new(Distance::from_meters(1.0), Mass::from_kilograms(3.0));
        let forward = a.gravitational_force_between(at, &PointMass::new(position, 3.0), CM);
        let swapped = b.gravitational_force_between(at, &PointMass::new(position, 5000.0), CM);
        assert!(relative_eq(forward, swapped, 1e-6));
    }

    #[test]
    fn test_acceleration_is_force_over_body_mass() {
        let source = GravitySource::new(Distance::from_meters(1.0), Mass::from_kilograms(1.0e12));
        let body = PointMass::new(Vec3::new(0.0, 500.0, 0.0), 4.0);
        let force = source.gravitational_force_between(Vec3::ZERO, &body, CM);
        let acceleration = source.gravitational_acceleration_for(Vec3::ZERO, &body, CM);
        assert!(relative_eq(acceleration, force / 4.0, 1e-6));
    }

    #[test]
    fn test_vector_points_at_body() {
        let source = GravitySource::new(Distance::from_meters(1.0), Mass::from_kilograms(1.0e12));
        let body = PointMass::new(Vec3::new(0.0, 500.0, 0.0), 4.0);
        let vector = source.gravitational_vector_towards(Vec3::ZERO, &body, CM);
        let force = source.gravitational_force_between(Vec3::ZERO, &body, CM);
        assert!(vector.normalize().abs_diff_eq(Vec3::Y, 1e-6));
        assert!(relative_eq(vector.length(), force, 1e-6));
    }

    #[test]
    fn test_direction_flattens_the_field() {
        let mut source = GravitySource::new(Distance::from_meters(1.0), Mass::from_kilograms(1.0e12));
        source.gravitational_direction = Vec3::new(0.0, 1.0, 0.0);
        let body = PointMass::new(Vec3::new(300.0, 400.0, 0.0), 1.0);
        let vector = source.gravitational_vector_towards(Vec3::ZERO, &body, CM);
        assert_eq!(vector.x, 0.0);
        assert!(vector.y > 0.0);
        // Only the y displacement counts toward the distance
        let force = source.gravitational_force_between(Vec3::ZERO, &body, CM);
        let expected = GRAVITATIONAL_CONSTANT * 1.0e12 / (4.0 * 4.0);
        assert!(relative_eq(force, expected, 1e-5));
    }

    #[test]
    fn test_coincident_positions_are_not_finite() {
        let source = GravitySource::new(Distance::from_meters(1.0), Mass::from_kilograms(1.0));
        let body = PointMass::new(Vec3::ZERO, 1.0);
        assert!(!source
            .gravitational_force_between(Vec3::ZERO, &body, CM)
            .is_finite());
        assert!(!source
            .gravitational_vector_towards(Vec3::ZERO, &body, CM)
            .is_finite());
    }

    #[test]
    fn test_surface_gravity_fixed_point() {
        let mut source = GravitySource::new(Distance::from_kilometers(6371.0), Mass::ZERO);
        for g in [9.8, 1.62, 24.79, 0.5] {
            source.set_surface_gravity(g, None);
            assert!(relative_eq(source.surface_gravity(), g, 1e-5));
        }
    }

    #[test]
    fn test_surface_gravity_matches_mass() {
        let source = GravitySource::with_surface_gravity(Distance::from_meters(10.0), 9.8);
        let expected = 9.8 * 100.0 / GRAVITATIONAL_CONSTANT;
        assert!(relative_eq(source.mass().kilograms(), expected, 1e-5));
        // A body resting on the surface accelerates at the surface gravity
        let body = PointMass::new(Vec3::new(0.0, 1000.0, 0.0), 70.0);
        let acceleration = source.gravitational_acceleration_for(Vec3::ZERO, &body, CM);
        assert!(relative_eq(acceleration, 9.8, 1e-4));
    }

    #[test]
    fn test_g_force() {
        let mut source = GravitySource::new(Distance::from_meters(100.0), Mass::ZERO);
        source.set_g_force(2.0, None);
        assert!(relative_eq(source.surface_gravity(), 2.0 * STANDARD_GRAVITY, 1e-5));
        assert!(relative_eq(source.g_force(), 2.0, 1e-5));
    }

    #[test]
    fn test_surface_radius_keeps_mass() {
        let mut source = GravitySource::with_surface_gravity(Distance::from_meters(10.0), 9.8);
        let mass = source.mass();
        source.set_surface_radius(Distance::from_meters(20.0));
        assert_eq!(source.mass(), mass);
        assert!(relative_eq(source.surface_gravity(), 9.8 / 4.0, 1e-5));
    }

    #[test]
    fn test_rigid_body_mass_sync() {
        let mut source = GravitySource::new(Distance::from_meters(1.0), Mass::from_kilograms(5.0));
        let mut body = RigidBody::new(20.0);

        // Off: neither direction syncs
        assert_eq!(source.refresh_mass(Some(&body)).kilograms(), 5.0);
        source.set_mass(Mass::from_kilograms(6.0), Some(&mut body));
        assert_eq!(body.mass, 20.0);

        source.use_rigid_body_mass = true;
        assert_eq!(source.refresh_mass(Some(&body)).kilograms(), 20.0);
        source.set_mass(Mass::from_kilograms(8.0), Some(&mut body));
        assert_eq!(body.mass, 8.0);
        assert_eq!(source.refresh_mass(None).kilograms(), 8.0);
    }

    #[test]
    fn test_validate() {
        let valid = GravitySource::with_surface_gravity(Distance::from_meters(10.0), 9.8);
        assert_eq!(valid.validate(), Ok(()));

        let flat = GravitySource::new(Distance::ZERO, Mass::from_kilograms(1.0));
        assert!(matches!(flat.validate(), Err(GravitySourceError::InvalidRadius(_))));

        let negative = GravitySource::new(Distance::from_meters(1.0), Mass::from_kilograms(-1.0));
        assert!(matches!(negative.validate(), Err(GravitySourceError::InvalidMass(_))));

        let mut nowhere = valid.clone();
        nowhere.gravitational_direction = Vec3::ZERO;
        assert_eq!(nowhere.validate(), Err(GravitySourceError::ZeroDirection));
    }
}
