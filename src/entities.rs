//! This module contains all the top level bundles.
//! These are the entities a scene is built from.

use bevy::app::{PluginGroup, PluginGroupBuilder};

pub mod controller;
pub mod planet;

pub struct EntitiesPluginGroup;

impl PluginGroup for EntitiesPluginGroup {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>().add(controller::ControllerPlugin::default())
    }
}
