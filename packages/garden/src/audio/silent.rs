use std::collections::HashSet;
use std::path::Path;

use crate::error::AudioError;

use super::backend::{AudioBackend, AudioEvent, SessionId};

/// Backend that resolves files but never produces sound.
///
/// A candidate that exists on disk "starts" and then plays forever, which
/// keeps the controller's selection logic observable in builds without an
/// audio device and in the offline renderer.
#[derive(Debug, Default)]
pub struct SilentBackend {
    live: HashSet<SessionId>,
    events: Vec<AudioEvent>,
}

impl SilentBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioBackend for SilentBackend {
    fn open(&mut self) -> Result<(), AudioError> {
        log::info!("Audio output is silent (built without the `playback` feature)");
        Ok(())
    }

    fn start(&mut self, session: SessionId, source: &str, _volume: f32) {
        if Path::new(source).is_file() {
            self.live.insert(session);
            self.events.push(AudioEvent::started(session));
        } else {
            self.events
                .push(AudioEvent::failed(session, AudioError::NotFound(source.to_string())));
        }
    }

    fn stop(&mut self, session: SessionId) {
        self.live.remove(&session);
    }

    fn poll(&mut self) -> Vec<AudioEvent> {
        std::mem::take(&mut self.events)
    }

    fn active_handles(&self) -> usize {
        self.live.len()
    }
}
