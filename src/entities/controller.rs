//! A player controller for rigid bodies that walk around on gravity sources.

use bevy::app::{App, FixedUpdate, Plugin, Update};
use bevy::ecs::bundle::Bundle;
use bevy::ecs::component::Component;
use bevy::ecs::entity::Entity;
use bevy::ecs::event::EventReader;
use bevy::ecs::query::Without;
use bevy::ecs::schedule::IntoSystemConfigs;
use bevy::ecs::system::{Query, Res};
use bevy::hierarchy::Parent;
use bevy::input::keyboard::KeyCode;
use bevy::input::mouse::MouseMotion;
use bevy::input::Input;
use bevy::log::trace;
use bevy::math::{EulerRot, Quat, Vec2, Vec3};
use bevy::time::Time;
use bevy::transform::components::Transform;

use crate::physics::gravity::righting::{ManualRighting, SelfRightingBody};
use crate::physics::host::collider::{sphere_cast, world_transform, Collider, CollisionLayers, TransformTree};
use crate::physics::host::rigid_body::{ForceMode, RigidBody, RigidBodyConstraints};
use crate::physics::PhysicsSet;

/// Pitch is clamped to this many degrees either way.
pub const MAX_PITCH_DEGREES: f32 = 88.0;

/// Radius and length of the ground probe, in world units.
pub const GROUND_PROBE: f32 = 5.0;

/// Look and move input for a [`BasicRigidBodyController`], in degrees and unit axes.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct ControllerInput {
    /// Yaw and pitch change for this tick, in degrees.
    pub look_delta: Vec2,
    /// Horizontal and vertical movement axes, each in [-1, 1].
    pub movement: Vec2,
}

/// Walks a [`SelfRightingBody`] around from [`ControllerInput`].
///
/// The body rights itself toward strong gravity, otherwise it levels out to
/// the look direction. While grounded it can only turn around its up axis.
#[derive(Component, Debug, Clone)]
pub struct BasicRigidBodyController {
    /// How quickly the body and head follow the look direction.
    pub camera_smoothing: f32,
    /// The maximum on-foot speed per axis, in world units per second.
    pub max_foot_speed: Vec3,
    /// The on-foot acceleration per axis, in world units per second squared.
    pub max_foot_acceleration: Vec3,
    /// Layers the controller can stand on.
    pub ground_layers: CollisionLayers,
    /// Turned to the pitch, if any.
    pub head: Option<Entity>,
    pitch: f32,
    yaw: f32,
    roll: f32,
    is_grounded: bool,
}

impl Default for BasicRigidBodyController {
    fn default() -> Self {
        Self {
            camera_smoothing: 20.0,
            max_foot_speed: Vec3::ONE * 1000.0,
            max_foot_acceleration: Vec3::ONE * 1000.0,
            ground_layers: CollisionLayers::all(),
            head: None,
            pitch: 0.0,
            yaw: 0.0,
            roll: 0.0,
            is_grounded: false,
        }
    }
}

impl BasicRigidBodyController {
    pub fn with_head(mut self, head: Entity) -> Self {
        self.head = Some(head);
        self
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn roll(&self) -> f32 {
        self.roll
    }

    /// Whether the feet touched the ground on the last probe.
    pub fn is_grounded(&self) -> bool {
        self.is_grounded
    }

    /// Accumulates look input.
    pub fn look(&mut self, look_delta: Vec2) {
        self.pitch = (self.pitch + look_delta.y).clamp(-MAX_PITCH_DEGREES, MAX_PITCH_DEGREES);
        self.yaw += look_delta.x;
    }

    /// How far to follow the look direction this tick.
    pub fn rotation_factor(&self, delta_seconds: f32) -> f32 {
        (self.camera_smoothing * delta_seconds).clamp(0.0, 1.0)
    }

    /// The orientation to level out to when not righting.
    pub fn level_rotation(&self) -> Quat {
        euler_degrees(self.pitch, 0.0, self.roll)
    }

    /// The orientation of the look direction around the up axis.
    pub fn yaw_rotation(&self) -> Quat {
        euler_degrees(0.0, self.yaw, 0.0)
    }

    /// The head's local orientation.
    pub fn head_rotation(&self) -> Quat {
        euler_degrees(self.pitch, 0.0, 0.0)
    }

    /// Turns `rotation` toward the look direction, righting toward gravity
    /// first when it pulls hard enough.
    pub fn rotate_body(&self, rotation: Quat, self_righting: &SelfRightingBody, factor: f32) -> Quat {
        let reading = self_righting.reading();
        let strongest_acceleration =
            reading.strongest_vector.length() / reading.source_mass.kilograms();
        let rotation = if reading.in_gravity && strongest_acceleration > 1.0 {
            self_righting.self_right(rotation)
        } else {
            rotation.lerp(self.level_rotation(), factor)
        };
        rotation.lerp(self.yaw_rotation(), factor)
    }

    /// Rotation locks for the current grounding.
    pub fn constraints(&self) -> RigidBodyConstraints {
        if self.is_grounded {
            RigidBodyConstraints::LOCK_ROTATION_X | RigidBodyConstraints::LOCK_ROTATION_Z
        } else {
            RigidBodyConstraints::empty()
        }
    }

    /// Pushes `body` along the movement input and caps its speed.
    pub fn move_body(&self, body: &mut RigidBody, rotation: Quat, movement: Vec2) {
        let direction = Vec3::new(movement.x, 0.0, movement.y);
        body.add_relative_force(
            direction * self.max_foot_acceleration,
            rotation,
            ForceMode::Acceleration,
        );
        if body.linear_velocity.abs().length() > self.max_foot_speed.length() {
            body.clamp_linear_velocity(-self.max_foot_speed, self.max_foot_speed);
        }
    }
}

/// Pitch, yaw and roll in degrees, applied yaw first.
fn euler_degrees(pitch: f32, yaw: f32, roll: f32) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        yaw.to_radians(),
        pitch.to_radians(),
        roll.to_radians(),
    )
}

/// Everything a controlled body needs.
#[derive(Bundle)]
pub struct BasicRigidBodyControllerBundle {
    pub controller: BasicRigidBodyController,
    pub input: ControllerInput,
    pub self_righting: SelfRightingBody,
    pub manual_righting: ManualRighting,
    pub rigid_body: RigidBody,
    pub collider: Collider,
    pub transform: Transform,
}

impl Default for BasicRigidBodyControllerBundle {
    fn default() -> Self {
        Self {
            controller: BasicRigidBodyController::default(),
            input: ControllerInput::default(),
            self_righting: SelfRightingBody::default(),
            manual_righting: ManualRighting,
            rigid_body: RigidBody::new(80.0),
            collider: Collider::sphere(50.0).with_layers(CollisionLayers::PLAYER),
            transform: Transform::default(),
        }
    }
}

/// Runs controllers on the fixed timestep.
/// With `read_device_input`, keyboard and mouse fill every [`ControllerInput`]
/// each frame, which needs Bevy's `InputPlugin`.
#[derive(Default)]
pub struct ControllerPlugin {
    pub read_device_input: bool,
}

impl Plugin for ControllerPlugin {
    fn build(&self, app: &mut App) {
        PhysicsSet::configure(app);
        app.add_systems(
            FixedUpdate,
            (
                Self::ground_check_system.in_set(PhysicsSet::Measure),
                Self::controller_system.in_set(PhysicsSet::Right),
            ),
        );
        if self.read_device_input {
            app.add_systems(Update, Self::read_device_input_system);
        }
    }
}

/// Bevy Systems
impl ControllerPlugin {
    /// Probes below every controller for ground.
    pub fn ground_check_system(
        mut controllers: Query<(Entity, &mut BasicRigidBodyController)>,
        colliders: Query<(Entity, &Collider)>,
        tree: TransformTree,
        parents: Query<&Parent>,
    ) {
        for (entity, mut controller) in controllers.iter_mut() {
            let Some(placement) = world_transform(entity, &tree) else {
                continue;
            };
            let hit = sphere_cast(
                placement.translation,
                GROUND_PROBE,
                placement.rotation * Vec3::NEG_Y,
                GROUND_PROBE,
                controller.ground_layers,
                Some(entity),
                &colliders,
                &tree,
                &parents,
            );
            controller.is_grounded = hit.is_some();
        }
    }

    pub fn controller_system(
        time: Res<Time>,
        mut controllers: Query<(
            &mut BasicRigidBodyController,
            &ControllerInput,
            &SelfRightingBody,
            &mut RigidBody,
            &mut Transform,
        )>,
        mut heads: Query<&mut Transform, Without<BasicRigidBodyController>>,
    ) {
        for (mut controller, input, self_righting, mut body, mut transform) in controllers.iter_mut()
        {
            controller.look(input.look_delta);
            let factor = controller.rotation_factor(time.delta_seconds());

            if let Some(head) = controller.head {
                if let Ok(mut head) = heads.get_mut(head) {
                    head.rotation = head.rotation.lerp(controller.head_rotation(), factor);
                }
            }
            transform.rotation = controller.rotate_body(transform.rotation, self_righting, factor);
            body.constraints = controller.constraints();
            controller.move_body(&mut body, transform.rotation, input.movement);

            trace!(
                "controller pitch {} yaw {} grounded {}",
                controller.pitch,
                controller.yaw,
                controller.is_grounded
            );
        }
    }

    /// WASD moves, the mouse looks.
    pub fn read_device_input_system(
        keyboard_input: Res<Input<KeyCode>>,
        mut motion_evr: EventReader<MouseMotion>,
        mut inputs: Query<&mut ControllerInput>,
    ) {
        let mut movement = Vec2::ZERO;
        if keyboard_input.pressed(KeyCode::A) {
            movement.x -= 1.;
        }
        if keyboard_input.pressed(KeyCode::D) {
            movement.x += 1.;
        }
        if keyboard_input.pressed(KeyCode::W) {
            movement.y += 1.;
        }
        if keyboard_input.pressed(KeyCode::S) {
            movement.y -= 1.;
        }
        let look_delta = motion_evr.read().map(|ev| Vec2::new(ev.delta.x, -ev.delta.y)).sum();
        for mut input in inputs.iter_mut() {
            input.movement = movement;
            input.look_delta = look_delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::hierarchy::BuildWorldChildren;

    use super::*;
    use crate::physics::host::rigid_body::AmbientGravity;
    use crate::physics::testing::{step, test_app};

    fn app() -> App {
        let mut app = test_app();
        app.add_plugins(ControllerPlugin::default());
        app
    }

    fn spawn_controller(app: &mut App, input: ControllerInput) -> Entity {
        app.world
            .spawn(BasicRigidBodyControllerBundle {
                input,
                ..Default::default()
            })
            .id()
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut controller = BasicRigidBodyController::default();
        controller.look(Vec2::new(10.0, 200.0));
        assert_eq!(controller.pitch(), MAX_PITCH_DEGREES);
        controller.look(Vec2::new(10.0, -500.0));
        assert_eq!(controller.pitch(), -MAX_PITCH_DEGREES);
        assert_eq!(controller.yaw(), 20.0);
    }

    #[test]
    fn test_rotation_factor_saturates() {
        let controller = BasicRigidBodyController::default();
        assert_eq!(controller.rotation_factor(1.0), 1.0);
        assert!((controller.rotation_factor(0.01) - 0.2).abs() < 1e-6);
        assert_eq!(controller.rotation_factor(0.0), 0.0);
    }

    #[test]
    fn test_look_turns_body_and_head() {
        let mut app = app();
        let head = app.world.spawn(Transform::default()).id();
        let body = spawn_controller(
            &mut app,
            ControllerInput {
                look_delta: Vec2::new(30.0, 10.0),
                movement: Vec2::ZERO,
            },
        );
        app.world.entity_mut(body).push_children(&[head]);
        app.world
            .get_mut::<BasicRigidBodyController>(body)
            .unwrap()
            .head = Some(head);

        step(&mut app, Duration::from_millis(50));

        let rotation = app.world.get::<Transform>(body).unwrap().rotation;
        let expected = Quat::from_rotation_y(30f32.to_radians());
        assert!((rotation * Vec3::Z).abs_diff_eq(expected * Vec3::Z, 1e-4));
        let head_rotation = app.world.get::<Transform>(head).unwrap().rotation;
        let expected = Quat::from_rotation_x(10f32.to_radians());
        assert!((head_rotation * Vec3::Z).abs_diff_eq(expected * Vec3::Z, 1e-4));
    }

    #[test]
    fn test_grounded_locks_tilt() {
        let mut app = app();
        app.world.spawn((
            Collider::cuboid(Vec3::new(1000.0, 10.0, 1000.0)).with_layers(CollisionLayers::GROUND),
            Transform::from_xyz(0.0, -18.0, 0.0),
        ));
        let body = spawn_controller(&mut app, ControllerInput::default());

        step(&mut app, Duration::ZERO);
        let controller = app.world.get::<BasicRigidBodyController>(body).unwrap();
        assert!(controller.is_grounded());
        assert_eq!(
            app.world.get::<RigidBody>(body).unwrap().constraints,
            RigidBodyConstraints::LOCK_ROTATION_X | RigidBodyConstraints::LOCK_ROTATION_Z
        );

        app.world.get_mut::<Transform>(body).unwrap().translation.y = 100.0;
        step(&mut app, Duration::ZERO);
        assert!(!app
            .world
            .get::<BasicRigidBodyController>(body)
            .unwrap()
            .is_grounded());
        assert!(app
            .world
            .get::<RigidBody>(body)
            .unwrap()
            .constraints
            .is_empty());
    }

    #[test]
    fn test_ground_on_other_layers_is_ignored() {
        let mut app = app();
        app.world.spawn((
            Collider::cuboid(Vec3::new(1000.0, 10.0, 1000.0)).with_layers(CollisionLayers::DEFAULT),
            Transform::from_xyz(0.0, -18.0, 0.0),
        ));
        let body = spawn_controller(&mut app, ControllerInput::default());
        app.world
            .get_mut::<BasicRigidBodyController>(body)
            .unwrap()
            .ground_layers = CollisionLayers::GROUND;

        step(&mut app, Duration::ZERO);
        assert!(!app
            .world
            .get::<BasicRigidBodyController>(body)
            .unwrap()
            .is_grounded());
    }

    #[test]
    fn test_movement_accelerates_forward() {
        let mut app = app();
        let body = spawn_controller(
            &mut app,
            ControllerInput {
                look_delta: Vec2::ZERO,
                movement: Vec2::new(0.0, 1.0),
            },
        );
        step(&mut app, Duration::from_millis(50));
        let velocity = app.world.get::<RigidBody>(body).unwrap().linear_velocity;
        assert!(velocity.abs_diff_eq(Vec3::Z * 50.0, 1e-3), "{:?}", velocity);
    }

    #[test]
    fn test_speed_is_capped() {
        let mut app = app();
        let body = spawn_controller(&mut app, ControllerInput::default());
        app.world.get_mut::<RigidBody>(body).unwrap().linear_velocity = Vec3::X * 5000.0;
        step(&mut app, Duration::from_millis(50));
        let velocity = app.world.get::<RigidBody>(body).unwrap().linear_velocity;
        assert_eq!(velocity, Vec3::X * 1000.0);
    }

    #[test]
    fn test_strong_gravity_rights_the_body() {
        let mut app = app();
        app.insert_resource(AmbientGravity(Vec3::NEG_X * 9.81));
        let body = spawn_controller(&mut app, ControllerInput::default());
        app.world.get_mut::<SelfRightingBody>(body).unwrap().righting_strength = 1.0;

        step(&mut app, Duration::from_millis(10));

        let down = app.world.get::<Transform>(body).unwrap().rotation * Vec3::NEG_Y;
        assert!(down.x < -0.5, "{:?}", down);
    }

    #[test]
    fn test_controllers_are_not_righted_automatically() {
        let mut app = app();
        app.insert_resource(AmbientGravity(Vec3::NEG_X * 9.81));
        let body = spawn_controller(&mut app, ControllerInput::default());
        app.world
            .get_mut::<SelfRightingBody>(body)
            .unwrap()
            .self_right_when_in_gravity = true;
        app.world.get_mut::<BasicRigidBodyController>(body).unwrap().camera_smoothing = 1.0e6;

        step(&mut app, Duration::from_millis(10));

        // The yaw pass fully wins, so nothing else turned the body
        let rotation = app.world.get::<Transform>(body).unwrap().rotation;
        assert!((rotation * Vec3::NEG_Y).abs_diff_eq(Vec3::NEG_Y, 1e-4));
    }
}
