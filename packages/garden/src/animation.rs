//! Per-frame motion of the garden's creatures and click flowers.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::curve::CatmullRom;
use crate::scene_graph::{EntityId, Material, MeshType, Owner, SceneEntity, SceneGraph, Transform};

/// Seconds a light-flower lives.
pub const FLOWER_LIFETIME: f32 = 3.8;
/// Height light-flowers are planted at.
pub const FLOWER_BASE_Y: f32 = 0.03;
const FLOWER_RISE: f32 = 0.6;
const FLOWER_PETALS: usize = 10;
const FLOWER_PETAL_RING: f32 = 0.42;

/// Dog progress along the river per second (0.0009 per 60 Hz frame).
pub const DOG_SPEED: f32 = 0.054;
/// Distance from the river centreline to the dog.
pub const DOG_BANK_OFFSET: f32 = 2.4;

/// Per-frame motion amounts are authored for 60 Hz and scaled by `dt`.
const REFERENCE_FPS: f32 = 60.0;

// ============================================================================
// Light-flowers
// ============================================================================

/// A glowing flower planted where the user clicked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightFlower {
    pub entity: EntityId,
    /// Garden time the flower was planted.
    pub birth: f32,
    pub duration: f32,
}

impl LightFlower {
    /// Plant a flower at `at` (the y coordinate is replaced by the base height).
    pub fn spawn(scene: &mut SceneGraph, at: Vec3, now: f32) -> Self {
        let position = Vec3::new(at.x, FLOWER_BASE_Y, at.z);
        let root = scene.spawn(SceneEntity::group(Transform::at(position)), Owner::Transient);

        let petal = Material::hex(0xffffff).with_emissive(0xffb6ff, 1.6);
        for i in 0..FLOWER_PETALS {
            let angle = i as f32 / FLOWER_PETALS as f32 * TAU;
            let offset = Vec3::new(angle.cos() * FLOWER_PETAL_RING, 0.0, angle.sin() * FLOWER_PETAL_RING);
            scene.spawn_mesh(
                root,
                MeshType::Sphere { segments: 16 },
                petal,
                Transform::at(offset).with_scale(Vec3::splat(0.14)),
            );
        }

        let core = Material::hex(0xffffff).with_emissive(0xfff19c, 2.4);
        scene.spawn_mesh(
            root,
            MeshType::Sphere { segments: 18 },
            core,
            Transform::default().with_scale(Vec3::splat(0.18)),
        );

        Self {
            entity: root,
            birth: now,
            duration: FLOWER_LIFETIME,
        }
    }

    /// Scale and height at time `now`: the flower swells, rises and shrinks
    /// back over its lifetime.
    pub fn pose(&self, now: f32) -> (f32, f32) {
        let alpha = (now - self.birth) / self.duration;
        let scale = (alpha * PI).sin().max(0.0);
        (scale, FLOWER_BASE_Y + alpha * FLOWER_RISE)
    }

    pub fn is_expired(&self, now: f32) -> bool {
        now - self.birth > self.duration
    }
}

/// Animate every flower and destroy those past their lifetime.
pub fn animate_flowers(scene: &mut SceneGraph, flowers: &mut Vec<LightFlower>, now: f32) {
    flowers.retain(|flower| {
        let (scale, y) = flower.pose(now);
        if let Some(entity) = scene.get_mut(flower.entity) {
            let transform = entity.transform_mut();
            transform.scale = Vec3::splat(scale);
            transform.position.y = y;
        }

        if flower.is_expired(now) {
            scene.destroy(flower.entity);
            false
        } else {
            true
        }
    });
}

// ============================================================================
// Butterflies
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Butterfly {
    pub entity: EntityId,
    /// Phase offset so the swarm doesn't flap in unison.
    pub phase: f32,
}

/// Bob, drift and flap every butterfly.
pub fn animate_butterflies(scene: &mut SceneGraph, butterflies: &[Butterfly], t: f32, dt: f32) {
    let step = dt * REFERENCE_FPS;
    for butterfly in butterflies {
        let Some(SceneEntity::Sprite(sprite)) = scene.get_mut(butterfly.entity) else {
            continue;
        };
        let phase = butterfly.phase;
        let transform = &mut sprite.transform;
        transform.position.y = 1.6 + (t * 2.2 + phase).sin() * 0.35;
        transform.position.x += (t * 0.45 + phase).sin() * 0.003 * step;
        transform.position.z += (t * 0.45 + phase).cos() * 0.003 * step;
        transform.scale.x = 0.9 + (t * 12.0 + phase).sin() * 0.22;
    }
}

// ============================================================================
// Dog
// ============================================================================

/// Walks the dog up and down the river bank.
#[derive(Debug, Clone)]
pub struct DogWalker {
    pub entity: EntityId,
    river: CatmullRom,
    /// Curve parameter in [0, 1].
    u: f32,
    /// +1 downstream, -1 upstream.
    direction: f32,
}

impl DogWalker {
    pub fn new(entity: EntityId, river: CatmullRom) -> Self {
        Self {
            entity,
            river,
            u: 0.0,
            direction: 1.0,
        }
    }

    pub fn progress(&self) -> f32 {
        self.u
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    /// Advance along the river, turning around at either end.
    pub fn advance(&mut self, dt: f32) {
        self.u += self.direction * DOG_SPEED * dt;
        if self.u > 1.0 {
            self.u = 1.0;
            self.direction = -1.0;
        }
        if self.u < 0.0 {
            self.u = 0.0;
            self.direction = 1.0;
        }
    }

    /// Position and heading on the bank at the current progress.
    pub fn placement(&self, t: f32) -> (Vec3, f32) {
        let center = self.river.point(self.u);
        let tangent = self.river.tangent(self.u);
        let side = Vec3::new(-tangent.z, 0.0, tangent.x).normalize_or_zero();
        let pos = center + side * DOG_BANK_OFFSET;

        let position = Vec3::new(pos.x, 0.05 + (t * 6.0).sin() * 0.03, pos.z);
        let heading = (tangent.x * self.direction).atan2(tangent.z * self.direction);
        (position, heading)
    }

    pub fn update(&mut self, scene: &mut SceneGraph, t: f32, dt: f32) {
        self.advance(dt);
        let (position, heading) = self.placement(t);
        if let Some(entity) = scene.get_mut(self.entity) {
            let transform = entity.transform_mut();
            transform.position = position;
            transform.rotation.y = heading;
        }
    }
}
