//! Colliders, hierarchy lookups and shape queries.
//!
//! Colliders are unscaled: shape sizes are in world units regardless of the
//! transform's scale.

use bevy::ecs::component::Component;
use bevy::ecs::entity::Entity;
use bevy::ecs::query::With;
use bevy::ecs::system::Query;
use bevy::hierarchy::Parent;
use bevy::math::Vec3;
use bevy::transform::components::Transform;
use bitflags::bitflags;

use super::rigid_body::RigidBody;

bitflags! {
    /// Layers a collider lives on, and layer masks for queries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CollisionLayers: u32 {
        /// Everything that hasn't been assigned a layer.
        const DEFAULT = 1 << 0;
        /// Walkable surfaces.
        const GROUND = 1 << 1;
        /// Player controlled bodies.
        const PLAYER = 1 << 2;
    }
}

impl Default for CollisionLayers {
    fn default() -> Self {
        CollisionLayers::DEFAULT
    }
}

/// The shape of a collider in its local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    /// A sphere centered on the collider.
    Sphere {
        /// Radius in world units.
        radius: f32,
    },
    /// A box centered on the collider.
    Cuboid {
        /// Half of the box size along each local axis, in world units.
        half_extents: Vec3,
    },
}

impl ColliderShape {
    /// Radius of the smallest sphere around the collider origin containing the shape.
    pub fn bounding_radius(&self) -> f32 {
        match self {
            ColliderShape::Sphere { radius } => *radius,
            ColliderShape::Cuboid { half_extents } => half_extents.length(),
        }
    }

    /// Signed distance from a point in local space to the surface.
    /// Negative inside.
    pub fn signed_distance(&self, local_point: Vec3) -> f32 {
        match self {
            ColliderShape::Sphere { radius } => local_point.length() - radius,
            ColliderShape::Cuboid { half_extents } => {
                let q = local_point.abs() - *half_extents;
                q.max(Vec3::ZERO).length() + q.max_element().min(0.0)
            }
        }
    }
}

/// A collision shape. Trigger colliders don't collide, they only report overlaps.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub shape: ColliderShape,
    pub is_trigger: bool,
    pub layers: CollisionLayers,
}

impl Collider {
    pub fn sphere(radius: f32) -> Self {
        Self {
            shape: ColliderShape::Sphere { radius },
            is_trigger: false,
            layers: CollisionLayers::default(),
        }
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        Self {
            shape: ColliderShape::Cuboid { half_extents },
            is_trigger: false,
            layers: CollisionLayers::default(),
        }
    }

    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    pub fn with_layers(mut self, layers: CollisionLayers) -> Self {
        self.layers = layers;
        self
    }

    /// Whether a sphere at `world_point` overlaps this collider placed at `placement`.
    pub fn overlaps_sphere(&self, placement: &Transform, world_point: Vec3, radius: f32) -> bool {
        let local_point = placement.rotation.inverse() * (world_point - placement.translation);
        self.shape.signed_distance(local_point) <= radius
    }
}

/// Lookup of transforms through the hierarchy.
pub type TransformTree<'w, 's> = Query<'w, 's, (&'static Transform, Option<&'static Parent>)>;

/// Composes an entity's transform with all of its ancestors'.
pub fn world_transform(entity: Entity, tree: &TransformTree) -> Option<Transform> {
    let (transform, parent) = tree.get(entity).ok()?;
    let mut world = *transform;
    let mut next = parent.map(Parent::get);
    while let Some(ancestor) = next {
        let (transform, parent) = tree.get(ancestor).ok()?;
        world = transform.mul_transform(world);
        next = parent.map(Parent::get);
    }
    Some(world)
}

/// Shorthand for the translation of [`world_transform`].
pub fn world_position(entity: Entity, tree: &TransformTree) -> Option<Vec3> {
    world_transform(entity, tree).map(|transform| transform.translation)
}

/// The rigid body a collider belongs to: the collider entity itself if it
/// has a [`RigidBody`], otherwise its closest ancestor that does.
pub fn attached_rigid_body(
    collider: Entity,
    parents: &Query<&Parent>,
    bodies: &Query<(), With<RigidBody>>,
) -> Option<Entity> {
    let mut current = collider;
    loop {
        if bodies.contains(current) {
            return Some(current);
        }
        current = parents.get(current).ok()?.get();
    }
}

/// Whether `entity` is `root` or one of its direct children.
pub fn is_self_or_child(entity: Entity, root: Entity, parents: &Query<&Parent>) -> bool {
    entity == root
        || parents
            .get(entity)
            .map(|parent| parent.get() == root)
            .unwrap_or(false)
}

/// The first collider hit by a sphere cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastHit {
    pub entity: Entity,
    /// Distance travelled along the cast direction before the hit, in world units.
    pub distance: f32,
}

/// Sweeps a sphere from `origin` along `direction` and returns the closest
/// non-trigger collider on `layers` it touches, skipping `ignore` and its direct children.
#[allow(clippy::too_many_arguments)]
pub fn sphere_cast(
    origin: Vec3,
    radius: f32,
    direction: Vec3,
    max_distance: f32,
    layers: CollisionLayers,
    ignore: Option<Entity>,
    colliders: &Query<(Entity, &Collider)>,
    tree: &TransformTree,
    parents: &Query<&Parent>,
) -> Option<CastHit> {
    let direction = direction.normalize_or_zero();
    let mut closest: Option<CastHit> = None;
    for (entity, collider) in colliders.iter() {
        if collider.is_trigger || !collider.layers.intersects(layers) {
            continue;
        }
        if let Some(ignore) = ignore {
            if is_self_or_child(entity, ignore, parents) {
                continue;
            }
        }
        let Some(placement) = world_transform(entity, tree) else {
            continue;
        };
        let hit = match collider.shape {
            ColliderShape::Sphere { radius: other } => {
                sweep_sphere(origin, direction, max_distance, placement.translation, radius + other)
            }
            ColliderShape::Cuboid { .. } => {
                sweep_sampled(origin, direction, max_distance, radius, |point| {
                    collider.overlaps_sphere(&placement, point, radius)
                })
            }
        };
        if let Some(distance) = hit {
            if closest.map_or(true, |best| distance < best.distance) {
                closest = Some(CastHit { entity, distance });
            }
        }
    }
    closest
}

/// Earliest distance along the ray at which the point comes within `reach` of `center`.
fn sweep_sphere(
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
    center: Vec3,
    reach: f32,
) -> Option<f32> {
    let to_center = center - origin;
    if to_center.length_squared() <= reach * reach {
        return Some(0.0);
    }
    let along = to_center.dot(direction);
    let closest_squared = to_center.length_squared() - along * along;
    let reach_squared = reach * reach;
    if along < 0.0 || closest_squared > reach_squared {
        return None;
    }
    let distance = along - (reach_squared - closest_squared).sqrt();
    (distance <= max_distance).then_some(distance)
}

/// Steps along the ray in increments of half the sphere radius.
fn sweep_sampled(
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
    radius: f32,
    overlaps: impl Fn(Vec3) -> bool,
) -> Option<f32> {
    let step = (radius * 0.5).max(f32::EPSILON);
    let steps = (max_distance / step).ceil().max(1.0) as u32;
    (0..=steps)
        .map(|i| (i as f32 * step).min(max_distance))
        .find(|distance| overlaps(origin + direction * *distance))
}
