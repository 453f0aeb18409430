//! Soundtrack behaviour driven through the garden's input surface.
//!
//! Run with: cargo test --test audio_sessions

mod common;

use common::{config, garden_with, step, ScriptedBackend};
use garden::audio::{AudioEvent, SessionState};
use garden::input::{InputEvent, Key};
use garden::{Environment, Garden, Mood};

const DT: f32 = 1.0 / 60.0;

fn click(garden: &mut Garden) {
    garden.handle_input(InputEvent::PointerDown { x: 640.0, y: 600.0 });
}

#[test]
fn test_no_audio_until_first_click() {
    let backend = ScriptedBackend::with_files(&["all the stars.mp3"]);
    let mut garden = garden_with(&backend);
    garden.handle_input(InputEvent::KeyDown(Key::Digit(5)));
    step(&mut garden, 10, DT);
    assert!(backend.started_sources().is_empty());
    assert!(!garden.audio().is_enabled());
}

#[test]
fn test_repeated_clicks_start_one_track() {
    let backend = ScriptedBackend::with_files(&["all the stars.mp3"]);
    let mut garden = garden_with(&backend);

    click(&mut garden);
    step(&mut garden, 2, DT);
    click(&mut garden);
    click(&mut garden);
    step(&mut garden, 2, DT);

    assert_eq!(backend.started_sources(), vec!["all the stars.mp3"]);
    assert_eq!(garden.audio().playing_source(), Some("all the stars.mp3"));
    assert_eq!(backend.live(), 1);
}

#[test]
fn test_missing_first_candidate_falls_back() {
    let backend = ScriptedBackend::with_files(&["A.mp3"]);
    let mut config = config();
    config
        .audio
        .tracks
        .insert(Environment::Valley, vec!["a.mp3".to_string(), "A.mp3".to_string()]);
    let mut garden = Garden::new(&config, Box::new(backend.clone()));

    click(&mut garden);
    step(&mut garden, 2, DT);

    assert_eq!(backend.started_sources(), vec!["a.mp3", "A.mp3"]);
    assert_eq!(garden.audio().playing_source(), Some("A.mp3"));
    assert!(!garden.audio_status().is_visible());
    assert_eq!(backend.max_live(), 1);
}

#[test]
fn test_only_forest_has_music() {
    let backend = ScriptedBackend::with_files(&["Espresso.mp3"]);
    let mut config = config();
    config.audio.tracks.insert(Environment::Valley, Vec::new());
    config.audio.tracks.insert(Environment::Park, Vec::new());
    config
        .audio
        .tracks
        .insert(Environment::Forest, vec!["Espresso.mp3".to_string()]);
    let mut garden = Garden::new(&config, Box::new(backend.clone()));

    click(&mut garden);
    step(&mut garden, 1, DT);
    assert_eq!(garden.audio_status().message(), Some("Audio files missing for valley"));
    assert!(backend.started_sources().is_empty());

    garden.set_environment(Environment::Forest);
    step(&mut garden, 1, DT);
    assert_eq!(garden.audio().playing_source(), Some("Espresso.mp3"));
    assert!(!garden.audio_status().is_visible());

    garden.set_environment(Environment::Park);
    step(&mut garden, 1, DT);
    assert_eq!(backend.live(), 0);
    assert_eq!(garden.audio_status().message(), Some("Audio files missing for park"));
}

#[test]
fn test_every_candidate_missing_shows_status() {
    let backend = ScriptedBackend::default();
    let mut garden = garden_with(&backend);

    click(&mut garden);
    step(&mut garden, 4, DT);

    assert_eq!(backend.started_sources(), vec!["all the stars.mp3", "all_the_stars.mp3"]);
    assert_eq!(garden.audio_status().message(), Some("Audio files missing for valley"));
    assert_eq!(backend.live(), 0);
    assert!(!garden.audio().is_playing());
}

#[test]
fn test_rapid_switches_leave_single_session() {
    let backend = ScriptedBackend::with_files(&["all the stars.mp3", "Espresso.mp3", "Nadaaniyan.mp3"]);
    let mut garden = garden_with(&backend);
    click(&mut garden);

    for digit in [5, 6, 4, 6, 5] {
        garden.handle_input(InputEvent::KeyDown(Key::Digit(digit)));
    }
    step(&mut garden, 3, DT);

    assert_eq!(backend.max_live(), 1);
    assert_eq!(backend.live(), 1);
    assert_eq!(garden.environment(), Environment::Forest);
    assert_eq!(garden.audio().playing_source(), Some("Espresso.mp3"));
}

#[test]
fn test_stale_completions_are_ignored() {
    let backend = ScriptedBackend::with_files(&["all the stars.mp3", "Espresso.mp3"]);
    let mut garden = garden_with(&backend);

    click(&mut garden);
    let first = garden.audio().session_id().unwrap();
    garden.set_environment(Environment::Forest);
    let second = garden.audio().session_id().unwrap();
    assert_ne!(first, second);

    // A late failure and end for the abandoned session change nothing
    backend.push(AudioEvent::failed(first, garden::error::AudioError::NotFound("x".into())));
    backend.push(AudioEvent::ended(first));
    step(&mut garden, 2, DT);

    assert_eq!(garden.audio().session_id(), Some(second));
    assert_eq!(garden.audio().session_state(), Some(SessionState::Playing));
    assert_eq!(garden.audio().playing_source(), Some("Espresso.mp3"));
    assert!(!garden.audio().restart_pending());
    assert!(!garden.audio_status().is_visible());
}

#[test]
fn test_track_end_restarts_once_after_delay() {
    let backend = ScriptedBackend::with_files(&["all the stars.mp3"]);
    let mut garden = garden_with(&backend);
    click(&mut garden);
    step(&mut garden, 1, DT);

    let session = garden.audio().session_id().unwrap();
    backend.push(AudioEvent::ended(session));
    garden.update(DT);
    assert!(garden.audio().restart_pending());
    assert_eq!(backend.live(), 0);
    assert_eq!(backend.started_sources().len(), 1);

    garden.update(0.25);
    assert_eq!(backend.started_sources().len(), 1);

    garden.update(0.3);
    assert_eq!(backend.started_sources().len(), 2);
    assert!(!garden.audio().restart_pending());

    step(&mut garden, 120, DT);
    assert_eq!(backend.started_sources().len(), 2);
    assert_eq!(garden.audio().playing_source(), Some("all the stars.mp3"));
    assert_eq!(backend.max_live(), 1);
}

#[test]
fn test_environment_switch_cancels_pending_restart() {
    let backend = ScriptedBackend::with_files(&["all the stars.mp3", "Nadaaniyan.mp3"]);
    let mut garden = garden_with(&backend);
    click(&mut garden);
    step(&mut garden, 1, DT);

    backend.push(AudioEvent::ended(garden.audio().session_id().unwrap()));
    garden.update(DT);
    garden.set_environment(Environment::Park);
    step(&mut garden, 60, DT);

    assert_eq!(backend.started_sources(), vec!["all the stars.mp3", "Nadaaniyan.mp3"]);
    assert_eq!(garden.audio().playing_source(), Some("Nadaaniyan.mp3"));
}

#[test]
fn test_mood_change_leaves_audio_alone() {
    let backend = ScriptedBackend::with_files(&["all the stars.mp3"]);
    let mut garden = garden_with(&backend);
    click(&mut garden);
    step(&mut garden, 1, DT);
    let session = garden.audio().session_id();

    for mood in Mood::ALL {
        garden.set_mood(mood);
    }
    step(&mut garden, 1, DT);

    assert_eq!(garden.audio().session_id(), session);
    assert_eq!(backend.started_sources().len(), 1);
}

#[test]
fn test_teardown_stops_playback() {
    let backend = ScriptedBackend::with_files(&["all the stars.mp3"]);
    let mut garden = garden_with(&backend);
    click(&mut garden);
    step(&mut garden, 1, DT);

    garden.teardown();
    assert_eq!(backend.live(), 0);
    assert!(!garden.audio().is_playing());
}
