// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Step clock.
//!
//! Converts a tempo in BPM into the interval between sequencer steps. A
//! full pass over the grid always spans [`BEATS_PER_LOOP`] beats, so a
//! 16-step grid advances four steps per beat.

use std::time::Duration;

use crate::sequencer::{SequencerError, NUM_STEPS};

/// Beats covered by one pass over the grid, regardless of step count
pub const BEATS_PER_LOOP: u32 = 4;

/// Default tempo in BPM
pub const DEFAULT_TEMPO: u32 = 120;

/// Tempo and grid length, and the step interval derived from them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepClock {
    /// Tempo in BPM (always positive)
    tempo: u32,
    /// Steps per pass
    num_steps: usize,
}

impl StepClock {
    /// Create a clock; fails if `tempo` is zero
    pub fn new(tempo: u32, num_steps: usize) -> Result<Self, SequencerError> {
        if tempo == 0 {
            return Err(SequencerError::InvalidTempo(tempo));
        }
        Ok(Self {
            tempo,
            num_steps: num_steps.max(1),
        })
    }

    /// Get the current tempo in BPM
    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    /// Set the tempo; the previous tempo is kept on error
    pub fn set_tempo(&mut self, tempo: u32) -> Result<(), SequencerError> {
        if tempo == 0 {
            return Err(SequencerError::InvalidTempo(tempo));
        }
        self.tempo = tempo;
        Ok(())
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    /// Steps per beat
    pub fn steps_per_beat(&self) -> f64 {
        self.num_steps as f64 / BEATS_PER_LOOP as f64
    }

    /// Milliseconds between steps: `(60000 / tempo) / (num_steps / 4)`
    pub fn interval_ms(&self) -> f64 {
        (60_000.0 / self.tempo as f64) / self.steps_per_beat()
    }

    /// Interval between steps
    pub fn step_interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_ms() / 1000.0)
    }

    /// Duration of one full pass
    pub fn pass_duration(&self) -> Duration {
        Duration::from_secs_f64(self.interval_ms() * self.num_steps as f64 / 1000.0)
    }
}

impl Default for StepClock {
    fn default() -> Self {
        Self {
            tempo: DEFAULT_TEMPO,
            num_steps: NUM_STEPS,
        }
    }
}
