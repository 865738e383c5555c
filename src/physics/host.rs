//! The host physics the gravity tools run on.
//!
//! This is the minimal set of engine services the gravity model needs: point
//! mass rigid bodies with force accumulation, colliders with trigger overlap
//! events, sphere casts, and an ambient scene gravity. It is not a general
//! dynamics engine; there is no collision response.

use bevy::app::{App, FixedUpdate, Plugin};
use bevy::ecs::schedule::IntoSystemConfigs;

use self::rigid_body::AmbientGravity;
use self::trigger::{TriggerContacts, TriggerEvent};
use super::config::GravityConfig;
use super::PhysicsSet;

pub mod collider;
pub mod rigid_body;
pub mod trigger;

/// Adds trigger detection and rigid body integration to the fixed timestep.
pub struct HostPhysicsPlugin;

impl Plugin for HostPhysicsPlugin {
    fn build(&self, app: &mut App) {
        PhysicsSet::configure(app);
        app.init_resource::<GravityConfig>()
            .init_resource::<AmbientGravity>()
            .init_resource::<TriggerContacts>()
            .add_event::<TriggerEvent>()
            .add_systems(
                FixedUpdate,
                (
                    trigger::detect_triggers_system.in_set(PhysicsSet::Detect),
                    rigid_body::integrate_system.in_set(PhysicsSet::Integrate),
                ),
            );
    }
}
