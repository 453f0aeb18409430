//! Scene lifecycle: environment swaps, moods, light-flowers and creatures.
//!
//! Run with: cargo test --test garden_scene

mod common;

use common::{garden_with, step, ScriptedBackend};
use garden::animation::{FLOWER_BASE_Y, FLOWER_LIFETIME};
use garden::input::{InputEvent, Key};
use garden::scene_graph::{Owner, SceneEntity};
use garden::{Environment, Mood};
use glam::Vec3;

const DT: f32 = 1.0 / 60.0;

#[test]
fn test_each_environment_replaces_the_last() {
    let backend = ScriptedBackend::default();
    let mut garden = garden_with(&backend);

    for environment in [Environment::Forest, Environment::Park, Environment::Valley, Environment::Park] {
        garden.set_environment(environment);
        let scene = garden.scene();
        for other in Environment::ALL {
            let owned = scene.count_owned(|o| o == Owner::Environment(other));
            if other == environment {
                assert!(owned > 0, "{environment} built nothing");
            } else {
                assert_eq!(owned, 0, "{other} left entities behind");
            }
        }
        assert_eq!(scene.count_owned(|o| o == Owner::Global), 3);
    }
}

#[test]
fn test_mood_does_not_touch_geometry() {
    let backend = ScriptedBackend::default();
    let mut garden = garden_with(&backend);
    let before = garden.scene().len();
    let rig = garden.rig().clone();

    garden.handle_input(InputEvent::KeyDown(Key::Digit(2)));
    assert_eq!(garden.mood(), Mood::Sunset);
    garden.handle_input(InputEvent::KeyDown(Key::Digit(3)));
    assert_eq!(garden.mood(), Mood::Night);

    assert_eq!(garden.scene().len(), before);
    assert_eq!(garden.environment(), Environment::Valley);
    assert_eq!(garden.rig().butterflies, rig.butterflies);
}

#[test]
fn test_night_sky_and_particles() {
    let backend = ScriptedBackend::default();
    let mut garden = garden_with(&backend);
    garden.set_mood(Mood::Night);
    step(&mut garden, 5, DT);

    let global = *garden.global_rig();
    let opacity = |id| match garden.scene().get(id) {
        Some(SceneEntity::Particles(p)) => p.opacity,
        other => panic!("expected particles, got {other:?}"),
    };
    assert!((opacity(global.stars) - 0.85).abs() < 1e-6);
    assert!((opacity(global.snow) - 0.4).abs() < 1e-6);

    let sky = *garden.sky();
    assert!(sky.top.z > sky.top.x, "night sky should be blue");
}

#[test]
fn test_flower_lifecycle() {
    let backend = ScriptedBackend::default();
    let mut garden = garden_with(&backend);
    let flower = garden.plant_flower(Vec3::new(1.0, 0.0, 1.0));
    assert_eq!(garden.scene().owner(flower), Some(Owner::Transient));

    // Halfway: full size, raised
    step(&mut garden, 114, DT);
    let transform = *garden.scene().get(flower).unwrap().transform();
    assert!((transform.scale.x - 1.0).abs() < 0.01);
    assert!(transform.position.y > FLOWER_BASE_Y);
    assert!((transform.position.x - 1.0).abs() < 1e-6);
    assert!((transform.position.z - 1.0).abs() < 1e-6);

    let frames = (FLOWER_LIFETIME / DT) as usize;
    step(&mut garden, frames, DT);
    assert!(!garden.scene().exists(flower));
    assert!(garden.flowers().is_empty());
}

#[test]
fn test_click_plants_flower_on_ground() {
    let backend = ScriptedBackend::default();
    let mut garden = garden_with(&backend);

    // Screen centre looks down toward the target, so it reaches the ground
    let flower = garden.pointer_down(640.0, 360.0).expect("centre ray should hit the ground");
    let position = garden.scene().get(flower).unwrap().transform().position;
    assert!((position.y - FLOWER_BASE_Y).abs() < 1e-6);
    assert!(position.z < garden.camera().position.z);
    assert!(garden.audio().is_enabled());
}

#[test]
fn test_click_at_sky_plants_nothing() {
    let backend = ScriptedBackend::default();
    let mut garden = garden_with(&backend);
    assert!(garden.pointer_down(640.0, 0.0).is_none());
    assert!(garden.flowers().is_empty());
    // The press still counts as the first interaction
    assert!(garden.audio().is_enabled());
}

#[test]
fn test_dog_walks_only_in_valley() {
    let backend = ScriptedBackend::default();
    let mut garden = garden_with(&backend);
    let dog = garden.rig().dog.clone().unwrap();
    let start = garden.scene().get(dog.entity).unwrap().transform().position;

    step(&mut garden, 60, DT);
    let moved = garden.scene().get(dog.entity).unwrap().transform().position;
    assert!(start.distance(moved) > 0.1);
    assert!(garden.rig().dog.as_ref().unwrap().progress() > 0.0);

    garden.set_environment(Environment::Forest);
    assert!(garden.rig().dog.is_none());
    assert!(!garden.scene().exists(dog.entity));
}

#[test]
fn test_butterflies_hover() {
    let backend = ScriptedBackend::default();
    let mut garden = garden_with(&backend);
    step(&mut garden, 30, DT);

    for butterfly in &garden.rig().butterflies {
        match garden.scene().get(butterfly.entity) {
            Some(SceneEntity::Sprite(sprite)) => {
                let y = sprite.transform.position.y;
                assert!((1.6 - 0.35 - 1e-4..=1.6 + 0.35 + 1e-4).contains(&y));
            }
            other => panic!("expected sprite, got {other:?}"),
        }
    }
}

#[test]
fn test_waterfall_droplets_fall_and_wrap() {
    let backend = ScriptedBackend::default();
    let mut garden = garden_with(&backend);
    garden.set_environment(Environment::Forest);
    step(&mut garden, 90, DT);

    let id = garden.rig().waterfall.unwrap();
    match garden.scene().get(id) {
        Some(SceneEntity::Particles(p)) => {
            for (pos, base) in p.positions().iter().zip(p.base_positions()) {
                assert!(pos.y <= base.y + 1e-4);
                assert!(pos.y > base.y - 12.0 - 1e-4);
                assert_eq!((pos.x, pos.z), (base.x, base.z));
            }
        }
        other => panic!("expected particles, got {other:?}"),
    }
}
