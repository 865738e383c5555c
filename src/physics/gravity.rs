//! Gravity sources, the bodies they attract, and bodies that right themselves.
//!
//! Every fixed tick, in [`PhysicsSet`] order:
//! 1. relations to despawned entities are pruned and new sources are started,
//! 2. trigger events update which bodies are inside which gravity volume,
//! 3. sources pull every body in their volume,
//! 4. self-righting bodies measure the strongest pull and turn toward it.

use bevy::app::{App, FixedUpdate, Plugin};
use bevy::ecs::entity::Entity;
use bevy::ecs::event::EventReader;
use bevy::ecs::query::{Added, With, Without};
use bevy::ecs::schedule::IntoSystemConfigs;
use bevy::ecs::system::{Query, Res, ResMut, SystemParam};
use bevy::hierarchy::Parent;
use bevy::log::{debug, trace, warn};
use bevy::transform::components::Transform;

use self::relations::GravityRelations;
use self::righting::{ManualRighting, SelfRightingBody};
use self::source::{GravitySource, PointMass};
use super::config::GravityConfig;
use super::host::collider::{attached_rigid_body, is_self_or_child, world_position, Collider, TransformTree};
use super::host::rigid_body::{AmbientGravity, ForceMode, RigidBody};
use super::host::trigger::{TriggerContacts, TriggerEvent, TriggerEventKind};
use super::PhysicsSet;

pub mod relations;
pub mod righting;
pub mod source;

/// Adds gravity sources and self-righting bodies to the fixed timestep.
/// Expects [`HostPhysicsPlugin`](super::host::HostPhysicsPlugin).
#[derive(Default)]
pub struct GravityPlugin {
    pub config: GravityConfig,
}

impl Plugin for GravityPlugin {
    fn build(&self, app: &mut App) {
        PhysicsSet::configure(app);
        app.insert_resource(self.config)
            .init_resource::<GravityRelations>()
            .add_systems(
                FixedUpdate,
                (
                    (Self::prune_relations_system, Self::start_sources_system)
                        .chain()
                        .in_set(PhysicsSet::Prune),
                    Self::membership_system.in_set(PhysicsSet::Membership),
                    Self::sync_mass_system.in_set(PhysicsSet::SyncMass),
                    Self::attract_system.in_set(PhysicsSet::Attract),
                    Self::measure_gravity_system.in_set(PhysicsSet::Measure),
                    Self::self_right_system.in_set(PhysicsSet::Right),
                ),
            );
    }
}

/// What gravity sources need to react to bodies entering and leaving their volume.
#[derive(SystemParam)]
pub struct GravityMembership<'w, 's> {
    parents: Query<'w, 's, &'static Parent>,
    bodies: Query<'w, 's, (), With<RigidBody>>,
    self_righting: Query<'w, 's, (), With<SelfRightingBody>>,
    relations: ResMut<'w, GravityRelations>,
}

impl<'w, 's> GravityMembership<'w, 's> {
    /// `collider` entered the gravity volume `volume` of `source`.
    ///
    /// Colliders of the source itself and colliders without a rigid body are
    /// ignored. Otherwise the body starts being attracted, and if it rights
    /// itself it learns about the source.
    pub fn on_object_enter_gravity(&mut self, source: Entity, volume: Entity, collider: Entity) {
        if collider == volume || is_self_or_child(collider, source, &self.parents) {
            return;
        }
        let Some(body) = attached_rigid_body(collider, &self.parents, &self.bodies) else {
            return;
        };
        let self_righting = self.self_righting.contains(body);
        if self.relations.track(source, body, collider, self_righting) {
            debug!("Object entered {:?}'s gravity: {:?}", source, body);
        }
    }

    /// `collider` left the gravity volume of `source`, or was despawned inside it.
    pub fn on_object_exit_gravity(&mut self, source: Entity, collider: Entity) {
        if let Some(body) = self.relations.untrack(source, collider) {
            debug!("Object exited {:?}'s gravity: {:?}", source, body);
        }
    }
}

/// Bevy Systems
impl GravityPlugin {
    /// Drops relations to sources, bodies and self-righting capabilities that are gone.
    pub fn prune_relations_system(
        mut relations: ResMut<GravityRelations>,
        sources: Query<(), With<GravitySource>>,
        bodies: Query<(), With<RigidBody>>,
        self_righting: Query<(), With<SelfRightingBody>>,
    ) {
        let dropped = relations.prune(
            |source| sources.contains(source),
            |body| bodies.contains(body),
            |body| self_righting.contains(body),
        );
        if dropped > 0 {
            debug!("Pruned {} stale gravity relations", dropped);
        }
    }

    /// Turns the gravity volume of newly added sources into a trigger.
    ///
    /// A source added back onto an entity whose volume is already a trigger
    /// picks up the colliders that are currently inside it, since those
    /// won't enter again.
    pub fn start_sources_system(
        config: Res<GravityConfig>,
        contacts: Res<TriggerContacts>,
        added: Query<(Entity, &GravitySource), Added<GravitySource>>,
        mut colliders: Query<&mut Collider>,
        mut membership: GravityMembership,
    ) {
        for (entity, source) in added.iter() {
            let volume = source.gravity_volume.unwrap_or(entity);
            match colliders.get_mut(volume) {
                Ok(mut collider) => collider.is_trigger = true,
                Err(_) => warn!("Gravity source {:?} has no gravity volume collider", entity),
            }
            for other in contacts.others_in(volume) {
                membership.on_object_enter_gravity(entity, volume, other);
            }
            if config.validate_sources {
                if let Err(err) = source.validate() {
                    warn!("Gravity source {:?} is misconfigured: {}", entity, err);
                }
            }
        }
    }

    /// Routes trigger events to the sources owning the trigger.
    pub fn membership_system(
        mut events: EventReader<TriggerEvent>,
        sources: Query<(Entity, &GravitySource)>,
        mut membership: GravityMembership,
    ) {
        for event in events.read() {
            for (entity, source) in sources.iter() {
                let volume = source.gravity_volume.unwrap_or(entity);
                if volume != event.trigger {
                    continue;
                }
                match event.kind {
                    TriggerEventKind::Enter => {
                        membership.on_object_enter_gravity(entity, volume, event.other)
                    }
                    TriggerEventKind::Exit => membership.on_object_exit_gravity(entity, event.other),
                }
            }
        }
    }

    /// Refreshes the mass of sources that follow their rigid body's mass.
    pub fn sync_mass_system(mut sources: Query<(&mut GravitySource, Option<&RigidBody>)>) {
        for (mut source, body) in sources.iter_mut() {
            if source.use_rigid_body_mass {
                source.refresh_mass(body);
            }
        }
    }

    /// Pulls every body inside each source's volume toward the source, and
    /// the source toward the body when gravitation is mutual.
    pub fn attract_system(
        config: Res<GravityConfig>,
        relations: Res<GravityRelations>,
        sources: Query<(Entity, &GravitySource)>,
        tree: TransformTree,
        mut bodies: Query<&mut RigidBody>,
    ) {
        for (source_entity, source) in sources.iter() {
            let Some(at) = world_position(source_entity, &tree) else {
                continue;
            };
            for body_entity in relations.bodies_in(source_entity) {
                let Some(position) = world_position(body_entity, &tree) else {
                    continue;
                };
                let Ok(mut body) = bodies.get_mut(body_entity) else {
                    continue;
                };
                if !body.enable_gravity {
                    continue;
                }
                let point = PointMass::new(position, body.mass);
                let vector = source.gravitational_vector_towards(at, &point, config.world_unit);
                trace!(
                    "Attracting {:?} with acceleration {} and vector {:?}",
                    body_entity,
                    source.gravitational_acceleration_for(at, &point, config.world_unit),
                    vector
                );
                body.add_force(-vector, ForceMode::Force);

                if source.affected_by_mutual_gravitation {
                    if let Ok(mut own) = bodies.get_mut(source_entity) {
                        own.add_force(vector, ForceMode::Force);
                    }
                }
            }
        }
    }

    /// Records what every self-righting body feels this tick.
    pub fn measure_gravity_system(
        config: Res<GravityConfig>,
        ambient: Res<AmbientGravity>,
        relations: Res<GravityRelations>,
        sources: Query<&GravitySource>,
        tree: TransformTree,
        mut bodies: Query<(Entity, &mut SelfRightingBody, &RigidBody)>,
    ) {
        for (entity, mut self_righting, rigid_body) in bodies.iter_mut() {
            let Some(position) = world_position(entity, &tree) else {
                continue;
            };
            let body = PointMass::new(position, rigid_body.mass);
            let acting = relations
                .sources_affecting(entity)
                .iter()
                .filter_map(|&source| Some((sources.get(source).ok()?, world_position(source, &tree)?)))
                .collect::<Vec<_>>();
            let reading = SelfRightingBody::measure(
                &body,
                ambient.0,
                acting.iter().copied(),
                config.world_unit,
            );
            self_righting.record(reading);
        }
    }

    /// Rights every body that asks for it while in gravity.
    pub fn self_right_system(
        mut bodies: Query<(&SelfRightingBody, &mut Transform), Without<ManualRighting>>,
    ) {
        for (self_righting, mut transform) in bodies.iter_mut() {
            if self_righting.self_right_when_in_gravity && self_righting.is_in_gravity() {
                transform.rotation = self_righting.self_right(transform.rotation);
            }
        }
    }
}
