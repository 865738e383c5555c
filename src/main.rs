use std::f32::consts::TAU;
use std::time::Duration;

use bevy::app::{AppExit, ScheduleRunnerPlugin};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use gravity_tools::entities::controller::{BasicRigidBodyControllerBundle, ControllerInput};
use gravity_tools::entities::planet::{BodyBuilder, PlanetBuilder};
use gravity_tools::entities::EntitiesPluginGroup;
use gravity_tools::physics::config::GravityConfig;
use gravity_tools::physics::constants::GRAVITATIONAL_CONSTANT;
use gravity_tools::physics::gravity::relations::GravityRelations;
use gravity_tools::physics::gravity::righting::SelfRightingBody;
use gravity_tools::physics::gravity::source::GravitySource;
use gravity_tools::physics::host::rigid_body::{AmbientGravity, RigidBody};
use gravity_tools::physics::units::{Distance, Mass};
use gravity_tools::physics::PhysicsPluginGroup;
use rand::Rng;

const RUN_SECONDS: f32 = 5.0;
const NUM_SATELLITES: usize = 8;
const PLANET_KILOGRAMS: f32 = 1.0e14;

fn main() {
    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(
            Duration::from_secs_f64(1.0 / 60.0),
        )))
        .add_plugins(LogPlugin {
            level: bevy::log::Level::DEBUG,
            ..Default::default()
        })
        .add_plugins(PhysicsPluginGroup)
        .add_plugins(EntitiesPluginGroup)
        .insert_resource(AmbientGravity::ZERO)
        .insert_resource(Time::<Fixed>::from_hz(64.0))
        .add_systems(Startup, setup)
        .add_systems(Update, (report_system, exit_system))
        .run();
}

fn setup(mut commands: Commands, config: Res<GravityConfig>) {
    let world_unit = config.world_unit;
    let planet = PlanetBuilder::new()
        .surface_radius(Distance::from_meters(10.0))
        .gravity_volume_radius(Distance::from_meters(50.0))
        .mass(Mass::from_kilograms(PLANET_KILOGRAMS))
        .spawn(&mut commands, world_unit);
    info!("Spawned planet {:?}", planet);

    // Satellites on roughly circular orbits in the XY plane
    let mut rng = rand::thread_rng();
    for _ in 0..NUM_SATELLITES {
        let radius = Distance::from_meters(rng.gen_range(15.0..45.0));
        let angle = rng.gen_range(0.0..TAU);
        let speed = (GRAVITATIONAL_CONSTANT * PLANET_KILOGRAMS / radius.meters()).sqrt()
            / world_unit.meters();
        let outward = Vec3::new(angle.cos(), angle.sin(), 0.0);
        let tangent = Vec3::new(-angle.sin(), angle.cos(), 0.0);
        BodyBuilder::new()
            .mass(rng.gen_range(1.0..100.0))
            .radius(25.0)
            .position(outward * (radius / world_unit).centimeters())
            .linear_velocity(tangent * speed)
            .self_righting(SelfRightingBody::new(0.1, true))
            .spawn(&mut commands);
    }

    // A walker standing on the surface
    commands.spawn(BasicRigidBodyControllerBundle {
        input: ControllerInput {
            look_delta: Vec2::new(0.5, 0.0),
            movement: Vec2::new(0.0, 1.0),
        },
        transform: Transform::from_translation(
            Vec3::Y * (Distance::from_meters(10.5) / world_unit).centimeters(),
        ),
        ..Default::default()
    });
}

fn report_system(
    time: Res<Time>,
    mut last_report: Local<u32>,
    relations: Res<GravityRelations>,
    sources: Query<Entity, With<GravitySource>>,
    bodies: Query<(Entity, &Transform, &RigidBody), Without<GravitySource>>,
) {
    let second = time.elapsed_seconds() as u32;
    if second == *last_report {
        return;
    }
    *last_report = second;
    for source in sources.iter() {
        info!(
            "t={}s: {:?} attracts {} bodies",
            second,
            source,
            relations.bodies_in(source).count()
        );
    }
    for (entity, transform, body) in bodies.iter() {
        debug!(
            "{:?} at {:?} moving {:?}",
            entity, transform.translation, body.linear_velocity
        );
    }
}

fn exit_system(time: Res<Time>, mut exit: EventWriter<AppExit>) {
    if time.elapsed_seconds() > RUN_SECONDS {
        exit.send(AppExit);
    }
}
