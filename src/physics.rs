//! This module contains all the physics related code.
//!
//! When contributing to this module, please keep the following things in mind:
//! * The gravity model only talks to the host physics through rigid bodies,
//!   colliders and trigger events.
//! * Units are explicit. Forces are newtons, masses kilograms, and positions
//!   world units as configured in [`config::GravityConfig`].
//! * Physics should be highly unit tested.

use bevy::app::{App, FixedUpdate, PluginGroup, PluginGroupBuilder};
use bevy::ecs::schedule::{IntoSystemSetConfigs, SystemSet};

use self::gravity::GravityPlugin;
use self::host::HostPhysicsPlugin;

pub mod config;
pub mod constants;
pub mod gravity;
pub mod host;
pub mod units;

/// The stages of a fixed physics tick, in the order they run.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicsSet {
    /// Forget about despawned entities, start new sources.
    Prune,
    /// Trigger overlap detection.
    Detect,
    /// Gravity volume membership from trigger events.
    Membership,
    SyncMass,
    /// Forces from gravity sources.
    Attract,
    /// Gravity measurement for self-righting bodies.
    Measure,
    /// Rotation and movement of self-righting bodies and controllers.
    Right,
    /// Rigid body integration.
    Integrate,
}

impl PhysicsSet {
    /// Orders the sets in [`FixedUpdate`]. Safe to call from every plugin.
    pub fn configure(app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            (
                PhysicsSet::Prune,
                PhysicsSet::Detect,
                PhysicsSet::Membership,
                PhysicsSet::SyncMass,
                PhysicsSet::Attract,
                PhysicsSet::Measure,
                PhysicsSet::Right,
                PhysicsSet::Integrate,
            )
                .chain(),
        );
    }
}

pub struct PhysicsPluginGroup;

impl PluginGroup for PhysicsPluginGroup {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>()
            .add(HostPhysicsPlugin)
            .add(GravityPlugin::default())
    }
}
