// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sequencer engine.
//!
//! [`SequencerEngine`] owns the grid, transport, mixer and recorder along
//! with its scheduler and tone emitter. All state changes go through
//! [`SequencerEngine::handle`], one command at a time.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::{
    Command, EngineEvent, Mixer, RecordOutcome, Recorder, Result, SequencerError, StepGrid,
    StepScheduler, TickReport, TimerId, Transport,
};
use crate::audio::ToneEmitter;
use crate::music::PitchTable;
use crate::timing::{StepClock, DEFAULT_TEMPO};

/// Note written by a step toggle
pub const DEFAULT_NOTE: &str = "C4";

/// How long a sequenced step sounds
pub const TRIGGER_DURATION: Duration = Duration::from_millis(100);

/// How long a keyboard note sounds
pub const KEY_DURATION: Duration = Duration::from_millis(200);

/// Volume of keyboard notes
pub const KEY_VOLUME: f32 = 1.0;

/// Initial engine state
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub tempo: u32,
    pub looping: bool,
    pub recording: bool,
    pub record_track: usize,
    pub default_note: String,
    pub trigger_duration: Duration,
    pub key_duration: Duration,
    /// Volumes for the first tracks; missing tracks stay at 1.0
    pub volumes: Vec<f32>,
    /// Initial cells, one row per track starting at step 0
    pub pattern: Vec<Vec<Option<String>>>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tempo: DEFAULT_TEMPO,
            looping: true,
            recording: false,
            record_track: 0,
            default_note: DEFAULT_NOTE.to_string(),
            trigger_duration: TRIGGER_DURATION,
            key_duration: KEY_DURATION,
            volumes: Vec::new(),
            pattern: Vec::new(),
        }
    }
}

/// Read-only copy of engine state for renderers
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineSnapshot {
    pub cells: Vec<Vec<Option<String>>>,
    pub running: bool,
    pub current_step: usize,
    pub tempo: u32,
    pub looping: bool,
    pub recording: bool,
    pub record_track: usize,
    pub volumes: Vec<f32>,
}

/// The step sequencer
pub struct SequencerEngine<S, E> {
    grid: StepGrid,
    transport: Transport,
    mixer: Mixer,
    recorder: Recorder,
    pitches: Arc<PitchTable>,
    default_note: String,
    trigger_duration: Duration,
    key_duration: Duration,
    scheduler: S,
    emitter: E,
}

impl<S: StepScheduler, E: ToneEmitter> SequencerEngine<S, E> {
    /// Create an engine with default settings and the standard pitch table
    pub fn new(scheduler: S, emitter: E) -> Self {
        let pitches = Arc::new(PitchTable::standard());
        Self {
            grid: StepGrid::new(Arc::clone(&pitches)),
            transport: Transport::default(),
            mixer: Mixer::default(),
            recorder: Recorder::new(),
            pitches,
            default_note: DEFAULT_NOTE.to_string(),
            trigger_duration: TRIGGER_DURATION,
            key_duration: KEY_DURATION,
            scheduler,
            emitter,
        }
    }

    /// Create an engine from settings
    pub fn with_settings(
        settings: &EngineSettings,
        pitches: Arc<PitchTable>,
        scheduler: S,
        emitter: E,
    ) -> Result<Self> {
        if !pitches.contains(&settings.default_note) {
            return Err(SequencerError::UnknownNote(settings.default_note.clone()));
        }
        if settings.trigger_duration.is_zero() || settings.trigger_duration >= settings.key_duration {
            return Err(SequencerError::InvalidDuration {
                trigger: settings.trigger_duration,
                key: settings.key_duration,
            });
        }

        let mut grid = StepGrid::new(Arc::clone(&pitches));
        let clock = StepClock::new(settings.tempo, grid.num_steps())?;

        let mut transport = Transport::new(clock);
        transport.set_looping(settings.looping);

        let mut recorder = Recorder::new();
        recorder.set_recording(settings.recording);
        recorder.set_target_track(settings.record_track, &grid)?;

        let mut mixer = Mixer::new(grid.num_tracks());
        for (track, &value) in settings.volumes.iter().enumerate() {
            mixer.set_volume(track, value)?;
        }

        for (track, row) in settings.pattern.iter().enumerate() {
            for (step, note) in row.iter().enumerate() {
                grid.set(track, step, note.as_deref())?;
            }
        }

        Ok(Self {
            grid,
            transport,
            mixer,
            recorder,
            pitches,
            default_note: settings.default_note.clone(),
            trigger_duration: settings.trigger_duration,
            key_duration: settings.key_duration,
            scheduler,
            emitter,
        })
    }

    pub fn grid(&self) -> &StepGrid {
        &self.grid
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn pitches(&self) -> &Arc<PitchTable> {
        &self.pitches
    }

    pub fn default_note(&self) -> &str {
        &self.default_note
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    pub fn emitter_mut(&mut self) -> &mut E {
        &mut self.emitter
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            cells: self.grid.rows().map(<[Option<String>]>::to_vec).collect(),
            running: self.transport.is_running(),
            current_step: self.transport.current_step(),
            tempo: self.transport.tempo(),
            looping: self.transport.is_looping(),
            recording: self.recorder.is_recording(),
            record_track: self.recorder.target_track(),
            volumes: self.mixer.volumes().to_vec(),
        }
    }

    /// Apply one command. On error nothing has changed.
    pub fn handle(&mut self, command: Command) -> Result<Vec<EngineEvent>> {
        match command {
            Command::Start => Ok(self.start()),
            Command::Stop => Ok(self.stop()),
            Command::TogglePlay => {
                if self.transport.is_running() {
                    Ok(self.stop())
                } else {
                    Ok(self.start())
                }
            }
            Command::SetTempo(tempo) => self.set_tempo(tempo),
            Command::SetLooping(looping) => Ok(self.set_looping(looping)),
            Command::ToggleLooping => Ok(self.set_looping(!self.transport.is_looping())),
            Command::SetRecording(recording) => Ok(self.set_recording(recording)),
            Command::ToggleRecording => Ok(self.set_recording(!self.recorder.is_recording())),
            Command::SetRecordTrack(track) => {
                self.recorder.set_target_track(track, &self.grid)?;
                Ok(vec![EngineEvent::RecordTrackChanged(track)])
            }
            Command::SetVolume { track, value } => self.set_volume(track, value),
            Command::ToggleStep { track, step } => self.toggle_step(track, step),
            Command::SetStep { track, step, note } => self.set_step(track, step, note.as_deref()),
            Command::ClearTrack(track) => {
                self.grid.clear_track(track)?;
                Ok(vec![EngineEvent::GridChanged])
            }
            Command::KeyPress { note } => self.key_press(&note),
            Command::Tick(id) => self.tick(id),
            Command::Shutdown => Ok(self.stop()),
        }
    }

    /// Start playback
    pub fn start(&mut self) -> Vec<EngineEvent> {
        if self.transport.start(&mut self.scheduler) {
            vec![self.transport_changed()]
        } else {
            Vec::new()
        }
    }

    /// Stop playback and rewind
    pub fn stop(&mut self) -> Vec<EngineEvent> {
        if self.transport.stop(&mut self.scheduler) {
            vec![self.transport_changed()]
        } else {
            Vec::new()
        }
    }

    /// Change tempo, keeping the playhead
    pub fn set_tempo(&mut self, tempo: u32) -> Result<Vec<EngineEvent>> {
        self.transport.set_tempo(tempo, &mut self.scheduler)?;
        Ok(vec![EngineEvent::TempoChanged(tempo)])
    }

    pub fn set_looping(&mut self, looping: bool) -> Vec<EngineEvent> {
        self.transport.set_looping(looping);
        info!(looping, "loop mode");
        vec![EngineEvent::LoopingChanged(looping)]
    }

    pub fn set_recording(&mut self, recording: bool) -> Vec<EngineEvent> {
        self.recorder.set_recording(recording);
        info!(recording, "record mode");
        vec![EngineEvent::RecordingChanged(recording)]
    }

    pub fn set_volume(&mut self, track: usize, value: f32) -> Result<Vec<EngineEvent>> {
        let value = self.mixer.set_volume(track, value)?;
        debug!(track, value, "volume");
        Ok(vec![EngineEvent::VolumeChanged { track, value }])
    }

    /// Toggle a step with the default note
    pub fn toggle_step(&mut self, track: usize, step: usize) -> Result<Vec<EngineEvent>> {
        let note = self.grid.toggle(track, step, &self.default_note)?;
        debug!(track, step, ?note, "step toggled");
        Ok(vec![EngineEvent::GridChanged])
    }

    pub fn set_step(&mut self, track: usize, step: usize, note: Option<&str>) -> Result<Vec<EngineEvent>> {
        self.grid.set(track, step, note)?;
        Ok(vec![EngineEvent::GridChanged])
    }

    /// Sound a keyboard note and record it if recording is on
    pub fn key_press(&mut self, note: &str) -> Result<Vec<EngineEvent>> {
        let frequency = self
            .pitches
            .frequency(note)
            .ok_or_else(|| SequencerError::UnknownNote(note.to_string()))?;

        self.emitter.emit(frequency, self.key_duration, KEY_VOLUME);
        let mut events = vec![EngineEvent::ToneTriggered {
            track: None,
            note: note.to_string(),
            frequency,
            volume: KEY_VOLUME,
        }];

        if let RecordOutcome::Written { .. } = self.recorder.on_key_press(&mut self.grid, note)? {
            events.push(EngineEvent::GridChanged);
        }
        Ok(events)
    }

    /// Handle a timer tick
    pub fn tick(&mut self, id: TimerId) -> Result<Vec<EngineEvent>> {
        let report = self.transport.tick(
            id,
            &self.grid,
            &self.mixer,
            self.trigger_duration,
            &mut self.scheduler,
            &mut self.emitter,
        )?;

        Ok(report.map(|r| self.tick_events(r)).unwrap_or_default())
    }

    fn tick_events(&self, report: TickReport) -> Vec<EngineEvent> {
        let mut events: Vec<EngineEvent> = report
            .triggers
            .into_iter()
            .map(|t| EngineEvent::ToneTriggered {
                track: Some(t.track),
                note: t.note,
                frequency: t.frequency,
                volume: t.volume,
            })
            .collect();
        events.push(EngineEvent::StepAdvanced(report.next_step));
        if report.stopped {
            events.push(self.transport_changed());
        }
        events
    }

    fn transport_changed(&self) -> EngineEvent {
        EngineEvent::TransportChanged {
            running: self.transport.is_running(),
            step: self.transport.current_step(),
        }
    }
}
