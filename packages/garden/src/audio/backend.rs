//! The seam between the audio controller and whatever actually makes sound.

use std::fmt;

use crate::error::AudioError;

/// Identity of one playback attempt.
///
/// Every candidate the controller tries gets a fresh id, so a completion that
/// arrives after its attempt was superseded can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioEventKind {
    /// Playback began.
    Started,
    /// The source could not be loaded or played.
    Failed(AudioError),
    /// The track played to its natural end.
    Ended,
}

/// Completion notification from a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioEvent {
    pub session: SessionId,
    pub kind: AudioEventKind,
}

impl AudioEvent {
    pub fn started(session: SessionId) -> Self {
        Self {
            session,
            kind: AudioEventKind::Started,
        }
    }

    pub fn failed(session: SessionId, error: AudioError) -> Self {
        Self {
            session,
            kind: AudioEventKind::Failed(error),
        }
    }

    pub fn ended(session: SessionId) -> Self {
        Self {
            session,
            kind: AudioEventKind::Ended,
        }
    }
}

/// Playback device abstraction.
///
/// `start` is fire-and-forget: the outcome arrives later through `poll`.
/// Backends never cancel on their own; the controller calls `stop` for every
/// session it abandons.
pub trait AudioBackend {
    /// Lazily construct the playback context. Called once before the first
    /// `start`, after the user has interacted with the page or window.
    fn open(&mut self) -> Result<(), AudioError>;

    /// Begin loading and playing `source` (a path or URL) at `volume`.
    fn start(&mut self, session: SessionId, source: &str, volume: f32);

    /// Fully release the session: detach callbacks, rewind, free the handle.
    /// Stopping an unknown or finished session is a no-op.
    fn stop(&mut self, session: SessionId);

    /// Drain notifications that arrived since the last poll.
    fn poll(&mut self) -> Vec<AudioEvent>;

    /// Number of live playback handles (loading or playing).
    fn active_handles(&self) -> usize;
}
