//! Scripted audio backend shared by the integration tests.
//!
//! Sources listed as available report `Started` on the next poll; anything
//! else reports `NotFound`. Tests can also inject events by hand.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use garden::audio::{AudioBackend, AudioEvent, SessionId};
use garden::config::GardenConfig;
use garden::error::AudioError;
use garden::Garden;

#[derive(Default)]
pub struct Script {
    pub available: HashSet<String>,
    pub live: HashSet<SessionId>,
    /// Every `start` call in order.
    pub started: Vec<(SessionId, String)>,
    pub stopped: Vec<SessionId>,
    pub queue: VecDeque<AudioEvent>,
    pub max_live: usize,
}

#[derive(Clone, Default)]
pub struct ScriptedBackend(pub Rc<RefCell<Script>>);

impl ScriptedBackend {
    pub fn with_files(files: &[&str]) -> Self {
        let backend = Self::default();
        backend
            .0
            .borrow_mut()
            .available
            .extend(files.iter().map(|f| f.to_string()));
        backend
    }

    pub fn push(&self, event: AudioEvent) {
        self.0.borrow_mut().queue.push_back(event);
    }

    pub fn started_sources(&self) -> Vec<String> {
        self.0.borrow().started.iter().map(|(_, s)| s.clone()).collect()
    }

    pub fn live(&self) -> usize {
        self.0.borrow().live.len()
    }

    pub fn max_live(&self) -> usize {
        self.0.borrow().max_live
    }
}

impl AudioBackend for ScriptedBackend {
    fn open(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn start(&mut self, session: SessionId, source: &str, _volume: f32) {
        let mut script = self.0.borrow_mut();
        script.live.insert(session);
        script.max_live = script.max_live.max(script.live.len());
        script.started.push((session, source.to_string()));
        let event = if script.available.contains(source) {
            AudioEvent::started(session)
        } else {
            AudioEvent::failed(session, AudioError::NotFound(source.to_string()))
        };
        script.queue.push_back(event);
    }

    fn stop(&mut self, session: SessionId) {
        let mut script = self.0.borrow_mut();
        if script.live.remove(&session) {
            script.stopped.push(session);
        }
    }

    fn poll(&mut self) -> Vec<AudioEvent> {
        self.0.borrow_mut().queue.drain(..).collect()
    }

    fn active_handles(&self) -> usize {
        self.0.borrow().live.len()
    }
}

/// Seeded config with tracks resolved relative to nothing (bare names).
pub fn config() -> GardenConfig {
    let mut config = GardenConfig::default();
    config.scene.seed = Some(42);
    config.audio.root = String::new();
    config
}

pub fn garden_with(backend: &ScriptedBackend) -> Garden {
    Garden::new(&config(), Box::new(backend.clone()))
}

/// Run `frames` updates of `dt` seconds.
pub fn step(garden: &mut Garden, frames: usize, dt: f32) {
    for _ in 0..frames {
        garden.update(dt);
    }
}
