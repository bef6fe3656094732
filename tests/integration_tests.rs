// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for stepseq
//!
//! These tests drive the engine through its public command API with a
//! manual scheduler, so every tick is delivered by hand.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use stepseq::audio::ToneLog;
use stepseq::config::SessionFile;
use stepseq::music::PitchTable;
use stepseq::sequencer::{
    Command, EngineEvent, EngineSettings, ManualScheduler, SequencerEngine, SequencerError, StepGrid,
    NUM_STEPS, NUM_TRACKS,
};
use stepseq::timing::StepClock;

type Engine = SequencerEngine<ManualScheduler, ToneLog>;

const C4: f64 = 261.63;
const E4: f64 = 329.63;

fn engine() -> (Engine, ToneLog) {
    let log = ToneLog::new();
    (SequencerEngine::new(ManualScheduler::new(), log.clone()), log)
}

/// Deliver one tick from the active timer
fn tick(engine: &mut Engine) -> Vec<EngineEvent> {
    let id = engine.transport().timer().expect("transport should be running");
    engine.handle(Command::Tick(id)).unwrap()
}

fn random_note(rng: &mut StdRng, pitches: &PitchTable) -> String {
    let notes: Vec<&str> = pitches.notes().collect();
    notes[rng.gen_range(0..notes.len())].to_string()
}

#[test]
fn test_toggle_is_own_inverse() {
    let pitches = Arc::new(PitchTable::standard());
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut grid = StepGrid::new(Arc::clone(&pitches));

    // Random starting contents
    for _ in 0..30 {
        let (t, s) = (rng.gen_range(0..NUM_TRACKS), rng.gen_range(0..NUM_STEPS));
        let note = random_note(&mut rng, &pitches);
        grid.set(t, s, Some(note.as_str())).unwrap();
    }

    for _ in 0..500 {
        let (t, s) = (rng.gen_range(0..NUM_TRACKS), rng.gen_range(0..NUM_STEPS));
        let default_note = random_note(&mut rng, &pitches);
        let before = grid.get(t, s).unwrap().map(String::from);

        grid.toggle(t, s, &default_note).unwrap();
        grid.toggle(t, s, &default_note).unwrap();

        // A filled cell toggles to empty then to the default note
        let expected = before.map(|_| default_note.clone());
        assert_eq!(grid.get(t, s).unwrap().map(String::from), expected);
    }
}

#[test]
fn test_toggle_twice_restores_empty_cell() {
    let (mut engine, _) = engine();
    for track in 0..NUM_TRACKS {
        for step in 0..NUM_STEPS {
            engine.handle(Command::ToggleStep { track, step }).unwrap();
            engine.handle(Command::ToggleStep { track, step }).unwrap();
        }
    }
    assert!(engine.grid().is_empty());
}

#[test]
fn test_next_empty_step_is_lowest() {
    let pitches = Arc::new(PitchTable::standard());
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..200 {
        let mut grid = StepGrid::new(Arc::clone(&pitches));
        let track = rng.gen_range(0..NUM_TRACKS);
        for step in 0..NUM_STEPS {
            if rng.gen_bool(0.6) {
                grid.set(track, step, Some("D4")).unwrap();
            }
        }

        let expected = (0..NUM_STEPS).find(|&s| grid.get(track, s).unwrap().is_none());
        assert_eq!(grid.find_next_empty_step(track).unwrap(), expected);
    }
}

#[test]
fn test_full_tracks_have_no_empty_step() {
    let mut grid = StepGrid::new(Arc::new(PitchTable::standard()));
    for track in 0..NUM_TRACKS {
        for step in 0..NUM_STEPS {
            grid.set(track, step, Some("B4")).unwrap();
        }
    }
    for track in 0..NUM_TRACKS {
        assert_eq!(grid.find_next_empty_step(track).unwrap(), None);
    }
}

#[test]
fn test_recording_never_overwrites() {
    let pitches = PitchTable::standard();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..20 {
        let (mut engine, _) = engine();
        engine.handle(Command::SetRecording(true)).unwrap();

        // Some pre-existing cells on the record track
        for step in 0..NUM_STEPS {
            if rng.gen_bool(0.3) {
                engine
                    .handle(Command::SetStep { track: 0, step, note: Some("F4".into()) })
                    .unwrap();
            }
        }

        let mut previous: Vec<Option<String>> = engine.grid().track(0).unwrap().to_vec();
        for _ in 0..(NUM_STEPS + 5) {
            let note = random_note(&mut rng, &pitches);
            engine.handle(Command::key_press(note)).unwrap();

            let current = engine.grid().track(0).unwrap().to_vec();
            for (before, after) in previous.iter().zip(&current) {
                if before.is_some() {
                    assert_eq!(before, after);
                }
            }
            previous = current;
        }

        // Track is full and other tracks untouched
        assert_eq!(engine.grid().find_next_empty_step(0).unwrap(), None);
        assert_eq!(engine.grid().filled_count(), NUM_STEPS);
    }
}

#[test]
fn test_key_press_sounds_even_when_track_full() {
    let (mut engine, log) = engine();
    engine.handle(Command::SetRecording(true)).unwrap();
    for _ in 0..NUM_STEPS {
        engine.handle(Command::key_press("C4")).unwrap();
    }
    log.clear();

    let events = engine.handle(Command::key_press("A4")).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log.tones()[0].duration, Duration::from_millis(200));
    assert!(!events.contains(&EngineEvent::GridChanged));
    assert!(!engine.grid().track(0).unwrap().contains(&Some("A4".to_string())));
}

#[test]
fn test_recording_follows_record_track() {
    let (mut engine, _) = engine();
    engine.handle(Command::SetRecording(true)).unwrap();
    engine.handle(Command::SetRecordTrack(3)).unwrap();

    engine.handle(Command::key_press("D#4")).unwrap();
    engine.handle(Command::key_press("G4")).unwrap();

    assert_eq!(engine.grid().get(3, 0).unwrap(), Some("D#4"));
    assert_eq!(engine.grid().get(3, 1).unwrap(), Some("G4"));
    assert_eq!(engine.grid().find_next_empty_step(0).unwrap(), Some(0));
}

#[test]
fn test_double_start_single_timer() {
    let (mut engine, log) = engine();
    engine
        .handle(Command::SetStep { track: 0, step: 0, note: Some("C4".into()) })
        .unwrap();

    engine.handle(Command::Start).unwrap();
    engine.handle(Command::Start).unwrap();
    assert_eq!(engine.scheduler().active_count(), 1);
    assert_eq!(engine.scheduler().scheduled_total(), 1);

    tick(&mut engine);
    assert_eq!(log.count_frequency(C4), 1);
}

#[test]
fn test_tempo_interval() {
    let clock = StepClock::new(120, NUM_STEPS).unwrap();
    assert_eq!(clock.step_interval(), Duration::from_millis(125));

    let (mut engine, _) = engine();
    engine.handle(Command::Start).unwrap();
    let id = engine.transport().timer().unwrap();
    assert_eq!(engine.scheduler().interval(id), Some(Duration::from_millis(125)));

    engine.handle(Command::SetTempo(60)).unwrap();
    let id = engine.transport().timer().unwrap();
    assert_eq!(engine.scheduler().interval(id), Some(Duration::from_millis(250)));
    assert_eq!(engine.scheduler().active_count(), 1);

    assert_eq!(
        engine.handle(Command::SetTempo(0)),
        Err(SequencerError::InvalidTempo(0))
    );
}

#[test]
fn test_single_pass_without_looping() {
    let (mut engine, log) = engine();
    engine
        .handle(Command::SetStep { track: 1, step: 9, note: Some("E4".into()) })
        .unwrap();
    engine.handle(Command::SetLooping(false)).unwrap();
    engine.handle(Command::Start).unwrap();

    let mut ticks = 0;
    while engine.transport().is_running() {
        tick(&mut engine);
        ticks += 1;
        assert!(ticks <= NUM_STEPS, "transport kept running past one pass");
    }

    assert_eq!(ticks, NUM_STEPS);
    assert_eq!(engine.transport().current_step(), 0);
    assert_eq!(engine.scheduler().active_count(), 0);
    assert_eq!(log.count_frequency(E4), 1);
}

#[test]
fn test_two_passes_scenario() {
    let (mut engine, log) = engine();
    engine
        .handle(Command::SetStep { track: 0, step: 0, note: Some("C4".into()) })
        .unwrap();
    engine
        .handle(Command::SetStep { track: 0, step: 2, note: Some("E4".into()) })
        .unwrap();
    engine.handle(Command::SetVolume { track: 0, value: 0.7 }).unwrap();
    engine.handle(Command::Start).unwrap();

    let mut sounding_ticks = Vec::new();
    for n in 0..(2 * NUM_STEPS) {
        let before = log.len();
        tick(&mut engine);
        if log.len() > before {
            sounding_ticks.push(n);
        }
    }

    assert_eq!(sounding_ticks, vec![0, 2, 16, 18]);
    assert_eq!(log.count_frequency(C4), 2);
    assert_eq!(log.count_frequency(E4), 2);
    assert_eq!(log.len(), 4);
    for tone in log.tones() {
        assert_eq!(tone.volume, 0.7);
        assert_eq!(tone.duration, Duration::from_millis(100));
    }
    assert!(engine.transport().is_running());
}

#[test]
fn test_volume_read_at_tick_time() {
    let (mut engine, log) = engine();
    engine
        .handle(Command::SetStep { track: 0, step: 0, note: Some("C4".into()) })
        .unwrap();
    engine.handle(Command::Start).unwrap();

    tick(&mut engine);
    engine.handle(Command::SetVolume { track: 0, value: 0.25 }).unwrap();
    for _ in 1..NUM_STEPS {
        tick(&mut engine);
    }
    tick(&mut engine);

    let volumes: Vec<f32> = log.tones().iter().map(|t| t.volume).collect();
    assert_eq!(volumes, vec![1.0, 0.25]);
}

#[test]
fn test_muted_track_still_emits() {
    let (mut engine, log) = engine();
    engine
        .handle(Command::SetStep { track: 2, step: 0, note: Some("G4".into()) })
        .unwrap();
    engine.handle(Command::SetVolume { track: 2, value: 0.0 }).unwrap();
    engine.handle(Command::Start).unwrap();

    let events = tick(&mut engine);

    let tones = log.tones();
    assert_eq!(tones.len(), 1);
    assert_eq!(tones[0].frequency_hz, 392.0);
    assert_eq!(tones[0].volume, 0.0);
    assert!(events.contains(&EngineEvent::ToneTriggered {
        track: Some(2),
        note: "G4".to_string(),
        frequency: 392.0,
        volume: 0.0,
    }));
}

#[test]
fn test_stop_cancels_and_rewinds() {
    let (mut engine, _) = engine();
    engine.handle(Command::Start).unwrap();
    for _ in 0..5 {
        tick(&mut engine);
    }
    let stale = engine.transport().timer().unwrap();

    engine.handle(Command::Stop).unwrap();
    assert_eq!(engine.transport().current_step(), 0);
    assert_eq!(engine.scheduler().active_count(), 0);

    // A tick already in flight from the cancelled timer is ignored
    assert!(engine.handle(Command::Tick(stale)).unwrap().is_empty());
    assert_eq!(engine.transport().current_step(), 0);
}

#[test]
fn test_session_file_to_engine() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
session:
  tempo: 90
  looping: false
mixer:
  volumes: [0.5]
pattern:
  - [C4, ~, ~, ~, E4]
"#
    )
    .unwrap();

    let pitches = Arc::new(PitchTable::standard());
    let settings: EngineSettings = SessionFile::load(file.path())
        .unwrap()
        .to_settings(&pitches)
        .unwrap();

    let log = ToneLog::new();
    let mut engine =
        SequencerEngine::with_settings(&settings, pitches, ManualScheduler::new(), log.clone()).unwrap();
    engine.handle(Command::Start).unwrap();
    let id = engine.transport().timer().unwrap();
    let expected = StepClock::new(90, NUM_STEPS).unwrap().step_interval();
    assert_eq!(engine.scheduler().interval(id), Some(expected));
    assert!((engine.transport().clock().interval_ms() - 166.667).abs() < 0.001);

    while engine.transport().is_running() {
        tick(&mut engine);
    }
    assert_eq!(log.count_frequency(C4), 1);
    assert_eq!(log.count_frequency(E4), 1);
    assert!(log.tones().iter().all(|t| t.volume == 0.5));
}
