//! Browser playback through `HtmlAudioElement`.
//!
//! One element per session. The `play()` promise, and the element's `ended`
//! and `error` events, are turned into notifications queued for `poll`. A
//! missing file usually produces both an `error` event and a rejected
//! promise; the controller has moved on after the first, so the second is
//! dropped as stale.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

use crate::error::AudioError;

use super::backend::{AudioBackend, AudioEvent, SessionId};

type EventQueue = Rc<RefCell<Vec<AudioEvent>>>;

struct WebHandle {
    element: HtmlAudioElement,
    // Held so the JS callbacks stay valid while attached
    _on_ended: Closure<dyn FnMut()>,
    _on_error: Closure<dyn FnMut()>,
}

impl WebHandle {
    /// Detach callbacks, rewind and release the media resource.
    fn release(self) {
        let element = self.element;
        let _ = element.pause();
        element.set_current_time(0.0);
        element.set_onended(None);
        element.set_onerror(None);
        let _ = element.remove_attribute("src");
        element.load();
    }
}

#[derive(Default)]
pub struct WebAudioBackend {
    handles: HashMap<SessionId, WebHandle>,
    events: EventQueue,
}

impl WebAudioBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn create(&mut self, session: SessionId, source: &str, volume: f32) -> Result<(), AudioError> {
        let element = HtmlAudioElement::new_with_src(source).map_err(|e| AudioError::Device(format!("{e:?}")))?;
        element.set_loop(false);
        element.set_volume(volume as f64);
        element.set_preload("auto");

        let queue = self.events.clone();
        let on_ended = Closure::<dyn FnMut()>::new(move || {
            queue.borrow_mut().push(AudioEvent::ended(session));
        });

        let queue = self.events.clone();
        let path = source.to_string();
        let target = element.clone();
        let on_error = Closure::<dyn FnMut()>::new(move || {
            let code = target.error().map(|e| e.code());
            queue
                .borrow_mut()
                .push(AudioEvent::failed(session, AudioError::from_media_code(&path, code)));
        });

        element.set_onended(Some(on_ended.as_ref().unchecked_ref()));
        element.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        let handle = WebHandle {
            element,
            _on_ended: on_ended,
            _on_error: on_error,
        };

        let promise = match handle.element.play() {
            Ok(promise) => promise,
            Err(e) => {
                handle.release();
                return Err(AudioError::PlaybackRejected {
                    path: source.to_string(),
                    reason: format!("{e:?}"),
                });
            }
        };

        let queue = self.events.clone();
        let path = source.to_string();
        wasm_bindgen_futures::spawn_local(async move {
            let event = match JsFuture::from(promise).await {
                Ok(_) => AudioEvent::started(session),
                Err(e) => AudioEvent::failed(
                    session,
                    AudioError::PlaybackRejected {
                        path,
                        reason: format!("{e:?}"),
                    },
                ),
            };
            queue.borrow_mut().push(event);
        });

        self.handles.insert(session, handle);
        Ok(())
    }
}

impl AudioBackend for WebAudioBackend {
    fn open(&mut self) -> Result<(), AudioError> {
        // Elements are created per session; nothing to set up until the first start
        Ok(())
    }

    fn start(&mut self, session: SessionId, source: &str, volume: f32) {
        if let Err(e) = self.create(session, source, volume) {
            self.events.borrow_mut().push(AudioEvent::failed(session, e));
        }
    }

    fn stop(&mut self, session: SessionId) {
        if let Some(handle) = self.handles.remove(&session) {
            handle.release();
        }
    }

    fn poll(&mut self) -> Vec<AudioEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    fn active_handles(&self) -> usize {
        self.handles.len()
    }
}
