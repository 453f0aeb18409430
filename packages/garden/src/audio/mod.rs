//! Background music.
//!
//! [`AudioController`] decides what should play; an [`AudioBackend`] makes it
//! happen on the current host.

pub mod backend;
pub mod catalog;
pub mod controller;
pub mod silent;
pub mod status;

#[cfg(all(feature = "playback", not(target_arch = "wasm32")))]
pub mod rodio_backend;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use backend::{AudioBackend, AudioEvent, AudioEventKind, SessionId};
pub use catalog::TrackCatalog;
pub use controller::{AudioController, SessionState};
pub use silent::SilentBackend;
pub use status::AudioStatus;

/// The best backend compiled into this build.
pub fn default_backend() -> Box<dyn AudioBackend> {
    #[cfg(target_arch = "wasm32")]
    {
        Box::new(web::WebAudioBackend::new())
    }
    #[cfg(all(feature = "playback", not(target_arch = "wasm32")))]
    {
        Box::new(rodio_backend::RodioBackend::new())
    }
    #[cfg(all(not(feature = "playback"), not(target_arch = "wasm32")))]
    {
        Box::new(SilentBackend::new())
    }
}
