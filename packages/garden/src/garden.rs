//! The garden: one owned controller holding the scene, camera, sky and audio.
//!
//! Front ends (native window, browser canvas, offline render) drive it the
//! same way: translate input into [`InputEvent`]s, call [`Garden::update`]
//! once per frame, then hand [`Garden::scene`] and the uniforms to the
//! renderer.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::animation::{animate_butterflies, animate_flowers, LightFlower};
use crate::audio::{AudioBackend, AudioController, AudioStatus};
use crate::camera::Camera;
use crate::config::GardenConfig;
use crate::environment::{Environment, Mood};
use crate::input::{command_for_key, Command, InputEvent};
use crate::lighting::{fog_density, LightingUniforms, Sky};
use crate::mesh_asset::MeshAssetRegistry;
use crate::scene_graph::{EntityId, SceneEntity, SceneGraph};
use crate::scenes::{self, EnvironmentRig, GlobalRig};

pub struct Garden {
    scene: SceneGraph,
    assets: MeshAssetRegistry,
    rng: StdRng,
    camera: Camera,
    audio: AudioController,
    global: GlobalRig,
    rig: EnvironmentRig,
    flowers: Vec<LightFlower>,
    environment: Environment,
    mood: Mood,
    sky: Sky,
    /// Seconds since the garden was created.
    time: f32,
    viewport: (u32, u32),
}

impl Garden {
    /// Build the global scene and the configured starting environment.
    ///
    /// Audio stays disabled until the first pointer press.
    pub fn new(config: &GardenConfig, backend: Box<dyn AudioBackend>) -> Self {
        let mut rng = match config.scene.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let environment = config.scene.environment;
        let mood = config.scene.mood;

        let mut scene = SceneGraph::new();
        let mut assets = MeshAssetRegistry::new();
        let global = scenes::build_global(&mut scene, &mut rng);
        let rig = scenes::build_environment(environment, &mut scene, &mut assets, &mut rng);
        set_ground(&mut scene, global.ground, environment);

        let (width, height) = (config.window.width.max(1), config.window.height.max(1));
        let camera = Camera::new(width as f32 / height as f32);
        let audio = AudioController::new(backend, &config.audio, environment);

        log::info!(
            "Garden created: {} / {}, {} entities",
            environment,
            mood,
            scene.len()
        );

        let mut garden = Self {
            scene,
            assets,
            rng,
            camera,
            audio,
            global,
            rig,
            flowers: Vec::new(),
            environment,
            mood,
            sky: Sky::evaluate(mood, 0.0),
            time: 0.0,
            viewport: (width, height),
        };
        garden.apply_sky();
        garden
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Replace every environment-owned entity with `environment`'s set and
    /// switch the soundtrack if audio is enabled.
    ///
    /// Light-flowers are cleared too. Global entities and the mood survive.
    pub fn set_environment(&mut self, environment: Environment) {
        // Transient flowers go with the environment
        let removed = self.scene.clear_owned(|owner| owner.is_environment_scoped());
        self.flowers.clear();

        self.rig = scenes::build_environment(environment, &mut self.scene, &mut self.assets, &mut self.rng);
        set_ground(&mut self.scene, self.global.ground, environment);
        self.environment = environment;
        log::info!(
            "Environment -> {} (removed {}, now {} entities)",
            environment,
            removed,
            self.scene.len()
        );

        self.audio.set_environment(environment);
    }

    /// Change sky, light and particle visibility. Geometry and audio are untouched.
    pub fn set_mood(&mut self, mood: Mood) {
        self.mood = mood;
        self.sky = Sky::evaluate(mood, self.time);
        self.apply_sky();
        log::info!("Mood -> {}", mood);
    }

    /// Enable audio and start the current environment's track. Only the first
    /// call has any effect.
    pub fn enable_audio(&mut self) -> bool {
        self.audio.enable()
    }

    /// Pointer pressed at pixel coordinates: enable audio and plant a
    /// light-flower where the ray meets the ground.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Option<EntityId> {
        self.enable_audio();

        let (width, height) = self.viewport;
        let hit = self
            .camera
            .screen_ray(x, y, width as f32, height as f32)
            .and_then(|ray| ray.intersect_ground())?;
        Some(self.plant_flower(hit))
    }

    /// Plant a light-flower at a ground position.
    pub fn plant_flower(&mut self, at: Vec3) -> EntityId {
        let flower = LightFlower::spawn(&mut self.scene, at, self.time);
        log::debug!("Light-flower at ({:.2}, {:.2})", at.x, at.z);
        self.flowers.push(flower);
        flower.entity
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown { x, y } => {
                self.pointer_down(x, y);
            }
            InputEvent::KeyDown(key) => match command_for_key(key) {
                Some(Command::SetMood(mood)) => self.set_mood(mood),
                Some(Command::SetEnvironment(environment)) => self.set_environment(environment),
                None => {}
            },
            InputEvent::Resize { width, height } => self.resize(width, height),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = (width, height);
        self.camera.set_viewport(width, height);
    }

    // ========================================================================
    // Frame update
    // ========================================================================

    /// Advance by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.audio.update(dt);

        self.time += dt;
        let t = self.time;

        self.camera.orbit(t);
        animate_flowers(&mut self.scene, &mut self.flowers, t);

        self.sky = Sky::evaluate(self.mood, t);
        self.apply_sky();
        for id in [self.global.stars, self.global.snow] {
            if let Some(SceneEntity::Particles(particles)) = self.scene.get_mut(id) {
                particles.update(t);
            }
        }

        animate_butterflies(&mut self.scene, &self.rig.butterflies, t, dt);
        if let Some(waterfall) = self.rig.waterfall {
            if let Some(SceneEntity::Particles(particles)) = self.scene.get_mut(waterfall) {
                particles.update(t);
            }
        }
        if let Some(dog) = self.rig.dog.as_mut() {
            dog.update(&mut self.scene, t, dt);
        }
    }

    /// Stop audio and drop every scene entity.
    pub fn teardown(&mut self) {
        self.audio.stop();
        self.flowers.clear();
        self.scene.clear();
        log::info!("Garden torn down");
    }

    fn apply_sky(&mut self) {
        let sky = self.sky;
        for (id, opacity) in [
            (self.global.stars, sky.star_opacity),
            (self.global.snow, sky.snow_opacity),
        ] {
            if let Some(SceneEntity::Particles(particles)) = self.scene.get_mut(id) {
                particles.opacity = opacity;
            }
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn assets(&self) -> &MeshAssetRegistry {
        &self.assets
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn sky(&self) -> &Sky {
        &self.sky
    }

    pub fn lighting_uniforms(&self) -> LightingUniforms {
        LightingUniforms::new(&self.sky, fog_density(self.environment))
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn rig(&self) -> &EnvironmentRig {
        &self.rig
    }

    pub fn global_rig(&self) -> &GlobalRig {
        &self.global
    }

    pub fn flowers(&self) -> &[LightFlower] {
        &self.flowers
    }

    pub fn audio(&self) -> &AudioController {
        &self.audio
    }

    pub fn audio_status(&self) -> &AudioStatus {
        self.audio.status()
    }
}

fn set_ground(scene: &mut SceneGraph, ground: EntityId, environment: Environment) {
    if let Some(SceneEntity::Mesh(mesh)) = scene.get_mut(ground) {
        mesh.material = scenes::ground_material(environment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentBackend;
    use crate::input::Key;
    use crate::scene_graph::Owner;

    fn garden() -> Garden {
        let mut config = GardenConfig::default();
        config.scene.seed = Some(7);
        Garden::new(&config, Box::new(SilentBackend::new()))
    }

    #[test]
    fn test_starts_in_configured_environment() {
        let garden = garden();
        assert_eq!(garden.environment(), Environment::Valley);
        assert_eq!(garden.mood(), Mood::Morning);
        assert!(garden.rig().dog.is_some());
        assert!(!garden.audio().is_enabled());
    }

    #[test]
    fn test_environment_switch_replaces_owned_entities() {
        let mut garden = garden();
        garden.set_environment(Environment::Forest);
        let scene = garden.scene();
        assert_eq!(scene.count_owned(|o| o == Owner::Environment(Environment::Valley)), 0);
        assert!(scene.count_owned(|o| o == Owner::Environment(Environment::Forest)) > 0);
        assert_eq!(scene.count_owned(|o| o == Owner::Global), 3);
        assert!(garden.rig().waterfall.is_some());
        assert!(garden.rig().dog.is_none());
    }

    #[test]
    fn test_keys_dispatch_commands() {
        let mut garden = garden();
        garden.handle_input(InputEvent::KeyDown(Key::Digit(3)));
        assert_eq!(garden.mood(), Mood::Night);
        garden.handle_input(InputEvent::KeyDown(Key::Digit(6)));
        assert_eq!(garden.environment(), Environment::Park);
        garden.handle_input(InputEvent::KeyDown(Key::Digit(9)));
        assert_eq!(garden.environment(), Environment::Park);
    }

    #[test]
    fn test_night_shows_stars() {
        let mut garden = garden();
        garden.set_mood(Mood::Night);
        let stars = garden.global_rig().stars;
        match garden.scene().get(stars) {
            Some(SceneEntity::Particles(p)) => assert!((p.opacity - 0.85).abs() < 1e-6),
            other => panic!("expected star particles, got {other:?}"),
        }
    }

    #[test]
    fn test_resize_ignores_zero() {
        let mut garden = garden();
        garden.resize(0, 300);
        assert_eq!(garden.viewport(), (1280, 720));
        garden.handle_input(InputEvent::Resize { width: 800, height: 600 });
        assert_eq!(garden.viewport(), (800, 600));
    }

    #[test]
    fn test_flowers_cleared_on_environment_switch() {
        let mut garden = garden();
        let flower = garden.plant_flower(Vec3::new(1.0, 0.0, 1.0));
        garden.set_environment(Environment::Park);
        assert!(garden.flowers().is_empty());
        assert!(!garden.scene().exists(flower));
    }

    #[test]
    fn test_teardown_empties_scene() {
        let mut garden = garden();
        garden.teardown();
        assert!(garden.scene().is_empty());
    }
}
