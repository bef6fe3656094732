// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tone output for the step sequencer.
//!
//! The sequencer does not synthesize sound. It hands each tone to a
//! [`ToneEmitter`], fire-and-forget: a frequency, how long it should sound,
//! and a volume in [0, 1]. This module provides:
//! - The emitter trait
//! - A tracing-backed emitter that logs each tone
//! - A shared tone log for tests and activity displays

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::trace;

/// Sink for tones.
///
/// `emit` starts a tone immediately; the tone ends by itself after
/// `duration`. Nothing is reported back.
pub trait ToneEmitter {
    fn emit(&mut self, frequency_hz: f64, duration: Duration, volume: f32);
}

impl<T: ToneEmitter + ?Sized> ToneEmitter for Box<T> {
    fn emit(&mut self, frequency_hz: f64, duration: Duration, volume: f32) {
        (**self).emit(frequency_hz, duration, volume)
    }
}

/// Send every tone to both emitters
impl<A: ToneEmitter, B: ToneEmitter> ToneEmitter for (A, B) {
    fn emit(&mut self, frequency_hz: f64, duration: Duration, volume: f32) {
        self.0.emit(frequency_hz, duration, volume);
        self.1.emit(frequency_hz, duration, volume);
    }
}

/// A tone as handed to an emitter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmittedTone {
    pub frequency_hz: f64,
    pub duration: Duration,
    pub volume: f32,
}

/// Emitter that writes each tone to the log
#[derive(Debug, Default)]
pub struct TracingEmitter {
    emitted: u64,
}

impl TracingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tones emitted so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl ToneEmitter for TracingEmitter {
    fn emit(&mut self, frequency_hz: f64, duration: Duration, volume: f32) {
        self.emitted += 1;
        trace!(
            frequency_hz,
            duration_ms = duration.as_secs_f64() * 1000.0,
            volume,
            "tone"
        );
    }
}

/// Shared record of emitted tones.
///
/// Clones share the same log, so one clone can be handed to the engine
/// while another is inspected.
#[derive(Debug, Clone, Default)]
pub struct ToneLog {
    tones: Arc<Mutex<Vec<EmittedTone>>>,
    /// Keep at most this many of the most recent tones
    capacity: Option<usize>,
}

impl ToneLog {
    /// Create an unbounded log
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log that keeps only the most recent `capacity` tones
    pub fn bounded(capacity: usize) -> Self {
        Self {
            tones: Arc::default(),
            capacity: Some(capacity.max(1)),
        }
    }

    /// A panic in another holder does not invalidate the tones already captured
    fn entries(&self) -> MutexGuard<'_, Vec<EmittedTone>> {
        self.tones.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the recorded tones, oldest first
    pub fn tones(&self) -> Vec<EmittedTone> {
        self.entries().clone()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of recorded tones at a frequency
    pub fn count_frequency(&self, frequency_hz: f64) -> usize {
        self.entries()
            .iter()
            .filter(|tone| tone.frequency_hz == frequency_hz)
            .count()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}

impl ToneEmitter for ToneLog {
    fn emit(&mut self, frequency_hz: f64, duration: Duration, volume: f32) {
        let mut tones = self.entries();
        tones.push(EmittedTone {
            frequency_hz,
            duration,
            volume,
        });
        if let Some(capacity) = self.capacity {
            if tones.len() > capacity {
                let excess = tones.len() - capacity;
                tones.drain(..excess);
            }
        }
    }
}
