//! Native playback through rodio.
//!
//! Files are read on a short-lived worker thread so a slow disk never stalls a
//! frame. Decoding and sink creation happen back on the controller thread in
//! `poll`, and only for sessions that are still wanted: a delivery for a
//! stopped session is dropped without ever touching the output device.

use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::mpsc::{self, Receiver, Sender};

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use crate::error::AudioError;

use super::backend::{AudioBackend, AudioEvent, SessionId};

struct Delivery {
    session: SessionId,
    path: String,
    bytes: std::io::Result<Vec<u8>>,
}

pub struct RodioBackend {
    /// Kept alive for as long as anything may play.
    output: Option<(OutputStream, OutputStreamHandle)>,
    /// Sessions whose bytes are still being read, with their volume.
    loading: HashMap<SessionId, f32>,
    sinks: HashMap<SessionId, Sink>,
    tx: Sender<Delivery>,
    rx: Receiver<Delivery>,
}

impl RodioBackend {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            output: None,
            loading: HashMap::new(),
            sinks: HashMap::new(),
            tx,
            rx,
        }
    }

    fn play(&mut self, delivery: Delivery, volume: f32) -> Result<(), AudioError> {
        let Delivery { session, path, bytes } = delivery;

        let bytes = bytes.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AudioError::NotFound(path.clone()),
            _ => AudioError::PlaybackRejected {
                path: path.clone(),
                reason: e.to_string(),
            },
        })?;

        let decoder = Decoder::new(Cursor::new(bytes)).map_err(|e| AudioError::Decode {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let (_, handle) = self
            .output
            .as_ref()
            .ok_or_else(|| AudioError::Device("output not opened".to_string()))?;
        let sink = Sink::try_new(handle).map_err(|e| AudioError::Device(e.to_string()))?;
        sink.set_volume(volume);
        sink.append(decoder);

        self.sinks.insert(session, sink);
        Ok(())
    }
}

impl Default for RodioBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for RodioBackend {
    fn open(&mut self) -> Result<(), AudioError> {
        if self.output.is_some() {
            return Ok(());
        }
        let output = OutputStream::try_default().map_err(|e| AudioError::Device(e.to_string()))?;
        log::info!("Opened default audio output");
        self.output = Some(output);
        Ok(())
    }

    fn start(&mut self, session: SessionId, source: &str, volume: f32) {
        self.loading.insert(session, volume);

        let tx = self.tx.clone();
        let path = source.to_string();
        std::thread::spawn(move || {
            let bytes = std::fs::read(&path);
            // Receiver gone means the backend was dropped
            let _ = tx.send(Delivery { session, path, bytes });
        });
    }

    fn stop(&mut self, session: SessionId) {
        self.loading.remove(&session);
        if let Some(sink) = self.sinks.remove(&session) {
            sink.stop();
        }
    }

    fn poll(&mut self) -> Vec<AudioEvent> {
        let mut events = Vec::new();

        while let Ok(delivery) = self.rx.try_recv() {
            let session = delivery.session;
            let Some(volume) = self.loading.remove(&session) else {
                log::debug!("Dropping audio data for stopped session {session}");
                continue;
            };
            match self.play(delivery, volume) {
                Ok(()) => events.push(AudioEvent::started(session)),
                Err(e) => events.push(AudioEvent::failed(session, e)),
            }
        }

        let finished: HashSet<SessionId> = self
            .sinks
            .iter()
            .filter(|(_, sink)| sink.empty())
            .map(|(&id, _)| id)
            .collect();
        for id in finished {
            self.sinks.remove(&id);
            events.push(AudioEvent::ended(id));
        }

        events
    }

    fn active_handles(&self) -> usize {
        self.loading.len() + self.sinks.len()
    }
}
