//! Soundtrack sequencing.
//!
//! The controller owns at most one audio session. Starting anything always
//! stops the previous session first, within the same call, so the backend
//! never holds two live handles.
//!
//! Candidate selection: every candidate for the current environment is tried
//! in order; the first one whose `Started` notification arrives wins. When a
//! track ends naturally the session is released and the same environment's
//! selection is restarted after a short delay.

use crate::config::AudioConfig;
use crate::environment::Environment;

use super::backend::{AudioBackend, AudioEvent, AudioEventKind, SessionId};
use super::catalog::TrackCatalog;
use super::status::AudioStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the backend to report the outcome.
    Loading,
    Playing,
}

/// The active attempt for one environment.
#[derive(Debug, Clone)]
struct Session {
    id: SessionId,
    environment: Environment,
    candidates: Vec<String>,
    /// Index into `candidates` of the attempt in flight.
    index: usize,
    state: SessionState,
}

impl Session {
    fn source(&self) -> &str {
        &self.candidates[self.index]
    }
}

pub struct AudioController {
    backend: Box<dyn AudioBackend>,
    catalog: TrackCatalog,
    volume: f32,
    restart_delay: f32,
    environment: Environment,
    /// Set by the first user interaction; never cleared.
    enabled: bool,
    opened: bool,
    next_session: u64,
    session: Option<Session>,
    /// Seconds until the current environment's track is restarted.
    pending_restart: Option<f32>,
    status: AudioStatus,
}

impl AudioController {
    pub fn new(backend: Box<dyn AudioBackend>, config: &AudioConfig, environment: Environment) -> Self {
        Self {
            backend,
            catalog: TrackCatalog::from_config(config),
            volume: config.volume.clamp(0.0, 1.0),
            restart_delay: config.restart_delay_secs.max(0.0),
            environment,
            enabled: false,
            opened: false,
            next_session: 1,
            session: None,
            pending_restart: None,
            status: AudioStatus::default(),
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// First-interaction transition. Returns true only on the call that
    /// actually enabled audio; later calls do nothing.
    pub fn enable(&mut self) -> bool {
        if self.enabled {
            return false;
        }
        self.enabled = true;
        log::info!("Audio enabled, starting playback for {}", self.environment);
        self.play_current();
        true
    }

    /// Switch soundtrack to `environment`.
    ///
    /// Cancels a pending restart. Audio only starts if it has been enabled.
    pub fn set_environment(&mut self, environment: Environment) {
        self.environment = environment;
        self.pending_restart = None;
        if self.enabled {
            self.play_current();
        }
    }

    /// Stop everything and forget any pending restart.
    pub fn stop(&mut self) {
        self.pending_restart = None;
        self.stop_session();
    }

    // ========================================================================
    // Per-frame update
    // ========================================================================

    /// Advance the restart timer, then apply backend notifications.
    pub fn update(&mut self, dt: f32) {
        if let Some(remaining) = self.pending_restart.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.pending_restart = None;
                log::info!("Restarting soundtrack for {}", self.environment);
                self.play_current();
            }
        }

        for event in self.backend.poll() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: AudioEvent) {
        let is_current = self.session.as_ref().is_some_and(|s| s.id == event.session);
        if !is_current {
            log::debug!("Ignoring stale audio event {:?} for session {}", event.kind, event.session);
            return;
        }

        match event.kind {
            AudioEventKind::Started => {
                if let Some(session) = self.session.as_mut() {
                    session.state = SessionState::Playing;
                    log::info!("Playing {} for {}", session.source(), session.environment);
                }
                self.status.hide();
            }
            AudioEventKind::Failed(error) => {
                log::warn!("Audio candidate failed: {error}");
                let Some(mut session) = self.session.take() else {
                    return;
                };
                self.backend.stop(session.id);

                if !error.is_recoverable() {
                    log::error!("Giving up on audio for {}: {error}", session.environment);
                    self.status.show(format!("Audio unavailable: {error}"));
                    return;
                }

                session.index += 1;
                if session.index < session.candidates.len() {
                    self.start_attempt(session);
                } else {
                    log::error!("No audio files found for {}", session.environment);
                    self.status.show(format!("Audio files missing for {}", session.environment));
                }
            }
            AudioEventKind::Ended => {
                if let Some(session) = self.session.take() {
                    log::info!("Track finished: {}", session.source());
                    self.backend.stop(session.id);
                }
                self.pending_restart = Some(self.restart_delay);
            }
        }
    }

    // ========================================================================
    // Session management
    // ========================================================================

    fn play_current(&mut self) {
        self.stop_session();

        if !self.opened {
            if let Err(e) = self.backend.open() {
                log::error!("Failed to open audio output: {e}");
                self.status.show(format!("Audio unavailable: {e}"));
                return;
            }
            self.opened = true;
        }

        let environment = self.environment;
        let candidates = self.catalog.candidates(environment);
        if candidates.is_empty() {
            log::warn!("No songs configured for environment {environment}");
            self.status.show(format!("Audio files missing for {environment}"));
            return;
        }

        self.start_attempt(Session {
            id: SessionId(0),
            environment,
            candidates,
            index: 0,
            state: SessionState::Loading,
        });
    }

    /// Start the candidate at `session.index` under a fresh id.
    fn start_attempt(&mut self, mut session: Session) {
        session.id = SessionId(self.next_session);
        self.next_session += 1;
        session.state = SessionState::Loading;

        log::info!("Loading song for {}: {}", session.environment, session.source());
        self.backend.start(session.id, session.source(), self.volume);
        self.session = Some(session);
    }

    fn stop_session(&mut self) {
        if let Some(session) = self.session.take() {
            log::debug!("Stopping audio session {}", session.id);
            self.backend.stop(session.id);
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Id of the attempt in flight or playing.
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    pub fn session_state(&self) -> Option<SessionState> {
        self.session.as_ref().map(|s| s.state)
    }

    /// Source of the session, whether loading or playing.
    pub fn current_source(&self) -> Option<&str> {
        self.session.as_ref().map(Session::source)
    }

    /// Source currently playing, if any.
    pub fn playing_source(&self) -> Option<&str> {
        self.session
            .as_ref()
            .filter(|s| s.state == SessionState::Playing)
            .map(Session::source)
    }

    pub fn is_playing(&self) -> bool {
        self.playing_source().is_some()
    }

    pub fn restart_pending(&self) -> bool {
        self.pending_restart.is_some()
    }

    pub fn status(&self) -> &AudioStatus {
        &self.status
    }

    pub fn active_handles(&self) -> usize {
        self.backend.active_handles()
    }
}
