//! Bodies that turn their feet toward the strongest gravity.

use bevy::ecs::component::Component;
use bevy::math::{Quat, Vec3};

use super::source::{GravitySource, PointMass};
use crate::physics::units::{Distance, Mass};

/// What a self-righting body felt during the last gravity measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityReading {
    /// The strongest pull, in newtons, pointing the way the body is pulled.
    pub strongest_vector: Vec3,
    /// The mass of the source behind [`GravityReading::strongest_vector`],
    /// 1 kg when the ambient gravity won.
    pub source_mass: Mass,
    /// The strongest pull magnitude in newtons.
    pub strongest_pull: f32,
    /// Whether any gravity is acting on the body.
    pub in_gravity: bool,
}

impl Default for GravityReading {
    fn default() -> Self {
        Self {
            strongest_vector: Vec3::ZERO,
            source_mass: Mass::from_kilograms(1.0),
            strongest_pull: 0.0,
            in_gravity: false,
        }
    }
}

/// Rights a rigid body so that its local down axis points along the
/// strongest gravitational pull acting on it.
///
/// Needs a [`RigidBody`](crate::physics::host::rigid_body::RigidBody) on the
/// same entity. The gravity sources acting on it are tracked in
/// [`GravityRelations`](super::relations::GravityRelations).
#[derive(Component, Debug, Clone)]
pub struct SelfRightingBody {
    /// How far to turn toward upright on each call to [`SelfRightingBody::self_right`], from 0 to 1.
    pub righting_strength: f32,
    /// Right every fixed tick while in gravity.
    pub self_right_when_in_gravity: bool,
    reading: GravityReading,
}

impl Default for SelfRightingBody {
    fn default() -> Self {
        Self {
            righting_strength: 0.5,
            self_right_when_in_gravity: false,
            reading: GravityReading::default(),
        }
    }
}

/// Opts a [`SelfRightingBody`] out of the automatic per tick righting,
/// for controllers that decide themselves when to right.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct ManualRighting;

impl SelfRightingBody {
    pub fn new(righting_strength: f32, self_right_when_in_gravity: bool) -> Self {
        debug_assert!(
            (0.0..=1.0).contains(&righting_strength),
            "righting strength must be within [0, 1]"
        );
        Self {
            righting_strength,
            self_right_when_in_gravity,
            ..Default::default()
        }
    }

    /// The last gravity measurement.
    pub fn reading(&self) -> GravityReading {
        self.reading
    }

    pub fn is_in_gravity(&self) -> bool {
        self.reading.in_gravity
    }

    /// Stores a new measurement.
    pub fn record(&mut self, reading: GravityReading) {
        self.reading = reading;
    }

    /// Takes a measurement of everything pulling on `body`.
    pub fn measure<'a>(
        body: &PointMass,
        ambient_gravity: Vec3,
        sources: impl IntoIterator<Item = (&'a GravitySource, Vec3)> + Clone,
        world_unit: Distance,
    ) -> GravityReading {
        let (strongest_vector, source_mass) = Self::strongest_gravitational_vector(
            body,
            ambient_gravity,
            sources.clone(),
            world_unit,
        );
        let mut sources = sources.into_iter().peekable();
        let has_sources = sources.peek().is_some();
        GravityReading {
            strongest_vector,
            source_mass,
            strongest_pull: Self::strongest_gravitational_pull(
                body,
                ambient_gravity,
                sources,
                world_unit,
            ),
            in_gravity: Self::is_in_gravity_of(has_sources, ambient_gravity),
        }
    }

    /// A body is in gravity if any source is acting on it or the scene has ambient gravity.
    pub fn is_in_gravity_of(has_sources: bool, ambient_gravity: Vec3) -> bool {
        has_sources || ambient_gravity.length() > 0.0
    }

    /// The strongest gravitational force vector acting on `body` and the mass
    /// of the source producing it.
    ///
    /// The ambient gravity's pull on the body is the baseline, with a 1 kg
    /// placeholder source mass. A source replaces the current best only if its
    /// pull is strictly stronger, so the first of several equal pulls wins.
    pub fn strongest_gravitational_vector<'a>(
        body: &PointMass,
        ambient_gravity: Vec3,
        sources: impl IntoIterator<Item = (&'a GravitySource, Vec3)>,
        world_unit: Distance,
    ) -> (Vec3, Mass) {
        let mut source_mass = Mass::from_kilograms(1.0);
        let mut strongest = ambient_gravity * body.mass;
        for (source, at) in sources {
            let pull = -source.gravitational_vector_towards(at, body, world_unit);
            if pull.length_squared() > strongest.length_squared() {
                strongest = pull;
                source_mass = source.mass();
            }
        }
        (strongest, source_mass)
    }

    /// The strongest gravitational force magnitude acting on `body`, seeded
    /// with the ambient gravity's pull.
    pub fn strongest_gravitational_pull<'a>(
        body: &PointMass,
        ambient_gravity: Vec3,
        sources: impl IntoIterator<Item = (&'a GravitySource, Vec3)>,
        world_unit: Distance,
    ) -> f32 {
        let mut strongest = ambient_gravity.length() * body.mass;
        for (source, at) in sources {
            let pull = source.gravitational_force_between(at, body, world_unit);
            if pull > strongest {
                strongest = pull;
            }
        }
        strongest
    }

    /// Turns `rotation` toward having its down axis along the last measured
    /// strongest pull, by [`SelfRightingBody::righting_strength`].
    pub fn self_right(&self, rotation: Quat) -> Quat {
        self.self_right_towards(rotation, self.reading.strongest_vector)
    }

    /// Turns `rotation` toward having its down axis along `gravity`.
    /// A zero vector leaves the rotation alone.
    pub fn self_right_towards(&self, rotation: Quat, gravity: Vec3) -> Quat {
        let gravity_down = gravity.normalize_or_zero();
        if gravity_down == Vec3::ZERO {
            return rotation;
        }
        let down = rotation * Vec3::NEG_Y;
        let righted = Quat::from_rotation_arc(down, gravity_down) * rotation;
        rotation.lerp(righted, self.righting_strength)
    }
}
