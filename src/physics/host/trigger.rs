//! Trigger volume overlap reporting.
//!
//! Every trigger collider is tested against every solid collider once per
//! tick. Pairs that start overlapping produce [`TriggerEventKind::Enter`],
//! pairs that stop overlapping, or lose one of their colliders, produce
//! [`TriggerEventKind::Exit`].

use bevy::ecs::entity::Entity;
use bevy::ecs::event::{Event, EventWriter};
use bevy::ecs::system::{Query, ResMut, Resource};
use bevy::log::trace;
use hashbrown::HashSet;
use strum_macros::Display;

use super::collider::{world_transform, Collider, TransformTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TriggerEventKind {
    Enter,
    Exit,
}

/// A collider started or stopped overlapping a trigger.
/// Events are written in the order they happened.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent {
    /// The trigger collider.
    pub trigger: Entity,
    /// The solid collider that entered or left it.
    pub other: Entity,
    pub kind: TriggerEventKind,
}

impl TriggerEvent {
    pub fn enter(trigger: Entity, other: Entity) -> Self {
        Self {
            trigger,
            other,
            kind: TriggerEventKind::Enter,
        }
    }

    pub fn exit(trigger: Entity, other: Entity) -> Self {
        Self {
            trigger,
            other,
            kind: TriggerEventKind::Exit,
        }
    }
}

/// The overlapping (trigger, other) pairs as of the last detection pass, in detection order.
#[derive(Resource, Debug, Default)]
pub struct TriggerContacts {
    pairs: Vec<(Entity, Entity)>,
}

impl TriggerContacts {
    pub fn contains(&self, trigger: Entity, other: Entity) -> bool {
        self.pairs.contains(&(trigger, other))
    }

    /// The colliders currently overlapping `trigger`, in detection order.
    pub fn others_in(&self, trigger: Entity) -> impl Iterator<Item = Entity> + '_ {
        self.pairs
            .iter()
            .filter(move |(inside, _)| *inside == trigger)
            .map(|(_, other)| *other)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Finds every overlapping pair and reports the transitions since the last pass.
pub fn detect_triggers_system(
    colliders: Query<(Entity, &Collider)>,
    tree: TransformTree,
    mut contacts: ResMut<TriggerContacts>,
    mut events: EventWriter<TriggerEvent>,
) {
    let placed = colliders
        .iter()
        .filter_map(|(entity, collider)| {
            world_transform(entity, &tree).map(|placement| (entity, collider, placement))
        })
        .collect::<Vec<_>>();

    let mut current = Vec::new();
    for (trigger, trigger_collider, trigger_placement) in placed.iter() {
        if !trigger_collider.is_trigger {
            continue;
        }
        for (other, other_collider, other_placement) in placed.iter() {
            if other == trigger || other_collider.is_trigger {
                continue;
            }
            if trigger_collider.overlaps_sphere(
                trigger_placement,
                other_placement.translation,
                other_collider.shape.bounding_radius(),
            ) {
                current.push((*trigger, *other));
            }
        }
    }

    let now = current.iter().copied().collect::<HashSet<_>>();
    let before = contacts.pairs.iter().copied().collect::<HashSet<_>>();
    for &(trigger, other) in contacts.pairs.iter() {
        if !now.contains(&(trigger, other)) {
            trace!("{:?} left trigger {:?}", other, trigger);
            events.send(TriggerEvent::exit(trigger, other));
        }
    }
    for &(trigger, other) in current.iter() {
        if !before.contains(&(trigger, other)) {
            trace!("{:?} entered trigger {:?}", other, trigger);
            events.send(TriggerEvent::enter(trigger, other));
        }
    }
    contacts.pairs = current;
    trace!("{} trigger contacts", contacts.len());
}
