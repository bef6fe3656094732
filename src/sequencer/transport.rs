// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Playback transport.
//!
//! Two states, `Stopped` and `Running`. Starting asks the scheduler for one
//! periodic timer at the step interval; every tick sounds all filled cells
//! at the current step and advances the playhead. With looping off, the
//! transport stops itself when the playhead wraps back to step 0.
//!
//! A transport holds at most one timer. `start` while running is a no-op,
//! and a tick whose id is not the active timer is ignored.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::{Mixer, Result, SequencerError, StepGrid, StepScheduler, TimerId};
use crate::audio::ToneEmitter;
use crate::timing::StepClock;

/// Transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Running,
}

/// One tone sounded by a tick
#[derive(Debug, Clone, PartialEq)]
pub struct StepTrigger {
    pub track: usize,
    pub note: String,
    pub frequency: f64,
    pub volume: f32,
}

/// What a tick did
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Step that was played
    pub step: usize,
    /// Tones sounded, in track order
    pub triggers: Vec<StepTrigger>,
    /// Playhead after advancing
    pub next_step: usize,
    /// Whether the pass ended and the transport stopped itself
    pub stopped: bool,
}

/// Playback state machine
#[derive(Debug, Clone)]
pub struct Transport {
    state: TransportState,
    clock: StepClock,
    current_step: usize,
    looping: bool,
    /// The one running timer, if any
    timer: Option<TimerId>,
}

impl Transport {
    /// Create a stopped transport with looping on
    pub fn new(clock: StepClock) -> Self {
        Self {
            state: TransportState::Stopped,
            clock,
            current_step: 0,
            looping: true,
            timer: None,
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TransportState::Running
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn tempo(&self) -> u32 {
        self.clock.tempo()
    }

    pub fn clock(&self) -> &StepClock {
        &self.clock
    }

    /// Interval between ticks at the current tempo
    pub fn step_interval(&self) -> Duration {
        self.clock.step_interval()
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Active timer id while running
    pub fn timer(&self) -> Option<TimerId> {
        self.timer
    }

    /// Start playback from the current step. Returns false if already running.
    pub fn start<S: StepScheduler + ?Sized>(&mut self, scheduler: &mut S) -> bool {
        if self.is_running() {
            debug!("start ignored, already running");
            return false;
        }

        let id = scheduler.schedule(self.clock.step_interval());
        self.timer = Some(id);
        self.state = TransportState::Running;
        info!(
            tempo = self.clock.tempo(),
            interval_ms = self.clock.interval_ms(),
            step = self.current_step,
            "transport started"
        );
        true
    }

    /// Stop playback and rewind to step 0. Returns whether it was running.
    pub fn stop<S: StepScheduler + ?Sized>(&mut self, scheduler: &mut S) -> bool {
        if let Some(id) = self.timer.take() {
            scheduler.cancel(id);
        }
        let was_running = self.is_running();
        self.state = TransportState::Stopped;
        self.current_step = 0;
        if was_running {
            info!("transport stopped");
        }
        was_running
    }

    /// Change tempo. While running, the timer is replaced so the new
    /// interval applies from the next tick; the playhead is kept.
    pub fn set_tempo<S: StepScheduler + ?Sized>(&mut self, tempo: u32, scheduler: &mut S) -> Result<()> {
        self.clock.set_tempo(tempo)?;

        if self.is_running() {
            if let Some(old) = self.timer.take() {
                scheduler.cancel(old);
            }
            self.timer = Some(scheduler.schedule(self.clock.step_interval()));
        }
        info!(tempo, running = self.is_running(), step = self.current_step, "tempo changed");
        Ok(())
    }

    /// Play the current step and advance.
    ///
    /// Returns `None` when stopped or when `id` is not the active timer.
    /// Every tone is looked up before any is emitted, so an error leaves
    /// the playhead where it was.
    pub fn tick<S, E>(
        &mut self,
        id: TimerId,
        grid: &StepGrid,
        mixer: &Mixer,
        trigger_duration: Duration,
        scheduler: &mut S,
        emitter: &mut E,
    ) -> Result<Option<TickReport>>
    where
        S: StepScheduler + ?Sized,
        E: ToneEmitter + ?Sized,
    {
        if !self.is_running() || self.timer != Some(id) {
            warn!(%id, active = ?self.timer, "stale tick ignored");
            return Ok(None);
        }

        let step = self.current_step;
        let mut triggers = Vec::new();
        for track in 0..grid.num_tracks() {
            if let Some(note) = grid.get(track, step)? {
                let frequency = grid
                    .pitches()
                    .frequency(note)
                    .ok_or_else(|| SequencerError::UnknownNote(note.to_string()))?;
                triggers.push(StepTrigger {
                    track,
                    note: note.to_string(),
                    frequency,
                    volume: mixer.volume(track)?,
                });
            }
        }

        for trigger in &triggers {
            emitter.emit(trigger.frequency, trigger_duration, trigger.volume);
        }

        self.current_step = (self.current_step + 1) % self.clock.num_steps();
        let stopped = !self.looping && self.current_step == 0;
        if stopped {
            debug!("end of pass with looping off");
            self.stop(scheduler);
        }
        debug!(step, tones = triggers.len(), next = self.current_step, "tick");

        Ok(Some(TickReport {
            step,
            triggers,
            next_step: self.current_step,
            stopped,
        }))
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(StepClock::default())
    }
}
