//! Builders for planets and the bodies they attract.

use bevy::ecs::bundle::Bundle;
use bevy::ecs::entity::Entity;
use bevy::ecs::system::Commands;
use bevy::hierarchy::BuildChildren;
use bevy::log::info;
use bevy::math::Vec3;
use bevy::transform::components::Transform;

use crate::physics::constants::EARTH_GRAVITY;
use crate::physics::gravity::righting::SelfRightingBody;
use crate::physics::gravity::source::GravitySource;
use crate::physics::host::collider::{Collider, CollisionLayers};
use crate::physics::host::rigid_body::RigidBody;
use crate::physics::units::{Distance, Mass};

/// How the planet's mass is given.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PlanetMass {
    /// Gravity at the surface in $m / s^2$.
    SurfaceGravity(f32),
    Mass(Mass),
}

/// A gravity source with its volume collider.
#[derive(Bundle)]
pub struct PlanetBundle {
    pub source: GravitySource,
    pub volume: Collider,
    pub transform: Transform,
}

pub struct PlanetBuilder {
    surface_radius: Distance,
    gravity_volume_radius: Distance,
    mass: PlanetMass,
    gravitational_direction: Vec3,
    affected_by_mutual_gravitation: bool,
    position: Vec3,
}

impl Default for PlanetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanetBuilder {
    pub fn new() -> Self {
        Self {
            surface_radius: Distance::from_meters(10.0),
            gravity_volume_radius: Distance::from_meters(50.0),
            mass: PlanetMass::SurfaceGravity(EARTH_GRAVITY),
            gravitational_direction: Vec3::ONE,
            affected_by_mutual_gravitation: false,
            position: Vec3::ZERO,
        }
    }

    pub fn surface_radius(mut self, surface_radius: Distance) -> Self {
        self.surface_radius = surface_radius;
        self
    }

    pub fn gravity_volume_radius(mut self, gravity_volume_radius: Distance) -> Self {
        self.gravity_volume_radius = gravity_volume_radius;
        self
    }

    /// Derives the mass from the gravity at the surface, in $m / s^2$.
    pub fn surface_gravity(mut self, surface_gravity: f32) -> Self {
        self.mass = PlanetMass::SurfaceGravity(surface_gravity);
        self
    }

    pub fn mass(mut self, mass: Mass) -> Self {
        self.mass = PlanetMass::Mass(mass);
        self
    }

    pub fn gravitational_direction(mut self, gravitational_direction: Vec3) -> Self {
        self.gravitational_direction = gravitational_direction;
        self
    }

    pub fn affected_by_mutual_gravitation(mut self, affected_by_mutual_gravitation: bool) -> Self {
        self.affected_by_mutual_gravitation = affected_by_mutual_gravitation;
        self
    }

    /// Position in world units.
    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// The planet components, with sizes converted to world units of `world_unit`.
    pub fn build(&self, world_unit: Distance) -> PlanetBundle {
        let mut source = match self.mass {
            PlanetMass::SurfaceGravity(surface_gravity) => {
                GravitySource::with_surface_gravity(self.surface_radius, surface_gravity)
            }
            PlanetMass::Mass(mass) => GravitySource::new(self.surface_radius, mass),
        };
        source.gravitational_direction = self.gravitational_direction;
        source.affected_by_mutual_gravitation = self.affected_by_mutual_gravitation;
        info!(
            "Planet of {} with surface gravity {} m/s^2",
            source.mass(),
            source.surface_gravity()
        );
        PlanetBundle {
            source,
            volume: Collider::sphere((self.gravity_volume_radius / world_unit).centimeters()),
            transform: Transform::from_translation(self.position),
        }
    }

    /// Spawns the planet with a solid ground surface as its child.
    /// With mutual gravitation the planet also gets a rigid body of its own mass.
    pub fn spawn(&self, commands: &mut Commands, world_unit: Distance) -> Entity {
        let bundle = self.build(world_unit);
        let mass = bundle.source.mass();
        let surface = commands
            .spawn((
                Collider::sphere((self.surface_radius / world_unit).centimeters())
                    .with_layers(CollisionLayers::GROUND),
                Transform::default(),
            ))
            .id();
        let mut planet = commands.spawn(bundle);
        if self.affected_by_mutual_gravitation {
            planet.insert(RigidBody::new(mass.kilograms()));
        }
        planet.push_children(&[surface]);
        planet.id()
    }
}

/// A rigid point mass with a sphere collider.
#[derive(Bundle)]
pub struct BodyBundle {
    pub rigid_body: RigidBody,
    pub collider: Collider,
    pub transform: Transform,
}

pub struct BodyBuilder {
    mass: f32,
    radius: f32,
    position: Vec3,
    linear_velocity: Vec3,
    enable_gravity: bool,
    self_righting: Option<SelfRightingBody>,
}

impl Default for BodyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyBuilder {
    pub fn new() -> Self {
        Self {
            mass: 1.0,
            radius: 10.0,
            position: Vec3::ZERO,
            linear_velocity: Vec3::ZERO,
            enable_gravity: true,
            self_righting: None,
        }
    }

    /// Mass in kilograms.
    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Collider radius in world units.
    pub fn radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn linear_velocity(mut self, linear_velocity: Vec3) -> Self {
        self.linear_velocity = linear_velocity;
        self
    }

    pub fn enable_gravity(mut self, enable_gravity: bool) -> Self {
        self.enable_gravity = enable_gravity;
        self
    }

    pub fn self_righting(mut self, self_righting: SelfRightingBody) -> Self {
        self.self_righting = Some(self_righting);
        self
    }

    pub fn build(&self) -> BodyBundle {
        BodyBundle {
            rigid_body: RigidBody::new(self.mass)
                .with_linear_velocity(self.linear_velocity)
                .with_gravity(self.enable_gravity),
            collider: Collider::sphere(self.radius),
            transform: Transform::from_translation(self.position),
        }
    }

    pub fn spawn(&self, commands: &mut Commands) -> Entity {
        let mut body = commands.spawn(self.build());
        if let Some(self_righting) = &self.self_righting {
            body.insert(self_righting.clone());
        }
        body.id()
    }
}
