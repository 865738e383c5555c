//! Which bodies are inside which gravity volumes.
//!
//! The relation is stored once, here, for both directions: sources look up
//! the bodies they attract and self-righting bodies look up the sources
//! acting on them. Bodies are tracked per collider, so a collider leaving a
//! volume is resolved to its body from here, even once it is despawned.
//! Entries are only added by trigger notifications and only removed by
//! trigger notifications or [`GravityRelations::prune`].

use bevy::ecs::entity::Entity;
use bevy::ecs::system::Resource;
use hashbrown::HashMap;

/// A body inside a source's volume.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TrackedBody {
    body: Entity,
    /// The body's colliders that are inside the volume.
    colliders: Vec<Entity>,
}

/// The relation table between gravity sources and the bodies in their volumes.
#[derive(Resource, Debug, Default)]
pub struct GravityRelations {
    /// Bodies per source, in the order they entered.
    bodies_by_source: HashMap<Entity, Vec<TrackedBody>>,
    /// Sources per self-righting body, in the order they were entered.
    sources_by_body: HashMap<Entity, Vec<Entity>>,
}

impl GravityRelations {
    /// Records `collider`, one of `body`'s colliders, entering `source`'s volume.
    /// Returns true if the body wasn't tracked by the source before.
    /// Self-righting bodies also get the source registered on their side.
    pub fn track(
        &mut self,
        source: Entity,
        body: Entity,
        collider: Entity,
        self_righting: bool,
    ) -> bool {
        let bodies = self.bodies_by_source.entry(source).or_default();
        if let Some(tracked) = bodies.iter_mut().find(|tracked| tracked.body == body) {
            if !tracked.colliders.contains(&collider) {
                tracked.colliders.push(collider);
            }
            return false;
        }
        bodies.push(TrackedBody {
            body,
            colliders: vec![collider],
        });
        if self_righting {
            let sources = self.sources_by_body.entry(body).or_default();
            if !sources.contains(&source) {
                sources.push(source);
            }
        }
        true
    }

    /// Records `collider` leaving `source`'s volume. The body is found from the
    /// table, so this works for colliders that no longer exist.
    /// Returns the body if that was its last collider inside.
    pub fn untrack(&mut self, source: Entity, collider: Entity) -> Option<Entity> {
        let bodies = self.bodies_by_source.get_mut(&source)?;
        let index = bodies
            .iter()
            .position(|tracked| tracked.colliders.contains(&collider))?;
        let tracked = &mut bodies[index];
        tracked.colliders.retain(|inside| *inside != collider);
        if !tracked.colliders.is_empty() {
            return None;
        }
        let body = bodies.remove(index).body;
        if bodies.is_empty() {
            self.bodies_by_source.remove(&source);
        }
        self.unregister_source(body, source);
        Some(body)
    }

    /// The colliders of `body` inside `source`'s volume.
    pub fn colliders_inside(&self, source: Entity, body: Entity) -> &[Entity] {
        self.bodies_by_source
            .get(&source)
            .and_then(|bodies| bodies.iter().find(|tracked| tracked.body == body))
            .map(|tracked| tracked.colliders.as_slice())
            .unwrap_or(&[])
    }

    /// The bodies in `source`'s volume, in the order they entered.
    pub fn bodies_in(&self, source: Entity) -> impl Iterator<Item = Entity> + '_ {
        self.bodies_by_source
            .get(&source)
            .into_iter()
            .flatten()
            .map(|tracked| tracked.body)
    }

    /// Whether `source` is attracting `body`.
    pub fn is_tracking(&self, source: Entity, body: Entity) -> bool {
        self.bodies_in(source).any(|tracked| tracked == body)
    }

    /// The sources acting on a self-righting body, in the order they were entered.
    pub fn sources_affecting(&self, body: Entity) -> &[Entity] {
        self.sources_by_body
            .get(&body)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Forgets a source on both sides of the relation.
    pub fn remove_source(&mut self, source: Entity) {
        if let Some(bodies) = self.bodies_by_source.remove(&source) {
            for tracked in bodies {
                self.unregister_source(tracked.body, source);
            }
        }
    }

    /// Forgets a body on both sides of the relation.
    pub fn remove_body(&mut self, body: Entity) {
        self.sources_by_body.remove(&body);
        self.bodies_by_source.retain(|_, bodies| {
            bodies.retain(|tracked| tracked.body != body);
            !bodies.is_empty()
        });
    }

    /// Drops every entry referring to something that no longer exists.
    /// Bodies that lost their self-righting capability keep being attracted
    /// but no longer list their sources. Returns how many entries were dropped.
    pub fn prune(
        &mut self,
        source_exists: impl Fn(Entity) -> bool,
        body_exists: impl Fn(Entity) -> bool,
        is_self_righting: impl Fn(Entity) -> bool,
    ) -> usize {
        let mut dropped = 0;

        let dead_sources = self
            .bodies_by_source
            .keys()
            .copied()
            .filter(|source| !source_exists(*source))
            .collect::<Vec<_>>();
        for source in dead_sources {
            self.remove_source(source);
            dropped += 1;
        }

        let dead_bodies = self
            .bodies_by_source
            .values()
            .flatten()
            .map(|tracked| tracked.body)
            .chain(self.sources_by_body.keys().copied())
            .filter(|body| !body_exists(*body))
            .collect::<Vec<_>>();
        for body in dead_bodies {
            if self.is_known_body(body) {
                self.remove_body(body);
                dropped += 1;
            }
        }

        let before = self.sources_by_body.len();
        self.sources_by_body.retain(|body, _| is_self_righting(*body));
        dropped + before - self.sources_by_body.len()
    }

    /// Whether any entry mentions `body`.
    fn is_known_body(&self, body: Entity) -> bool {
        self.sources_by_body.contains_key(&body)
            || self
                .bodies_by_source
                .values()
                .flatten()
                .any(|tracked| tracked.body == body)
    }

    /// Removes `source` from a body's source list.
    fn unregister_source(&mut self, body: Entity, source: Entity) {
        if let Some(sources) = self.sources_by_body.get_mut(&body) {
            sources.retain(|registered| *registered != source);
            if sources.is_empty() {
                self.sources_by_body.remove(&body);
            }
        }
    }
}
