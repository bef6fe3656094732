// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sequencer core: step grid, recording, mixing and playback.
//!
//! This module provides the playback engine:
//! - Step grid of note cells across tracks
//! - Recorder that places keyboard notes into the next empty step
//! - Per-track volume mixer
//! - Transport state machine driven by an injectable periodic timer
//! - Engine aggregate with a single-threaded command handler

pub mod command;
pub mod engine;
pub mod grid;
pub mod mixer;
pub mod recorder;
pub mod runner;
pub mod scheduler;
pub mod transport;

use std::fmt;
use std::time::Duration;

use thiserror::Error;

pub use command::{Command, EngineEvent};
pub use engine::{EngineSettings, EngineSnapshot, SequencerEngine};
pub use grid::StepGrid;
pub use mixer::Mixer;
pub use recorder::{RecordOutcome, Recorder};
pub use runner::{spawn_engine, EngineHandle, RunningEngine};
pub use scheduler::{ManualScheduler, StepScheduler, TimerId, TokioScheduler};
pub use transport::{StepTrigger, TickReport, Transport, TransportState};

/// Number of tracks in the grid
pub const NUM_TRACKS: usize = 4;

/// Number of steps per track
pub const NUM_STEPS: usize = 16;

/// Which grid index was out of range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Track,
    Step,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Track => write!(f, "track"),
            Axis::Step => write!(f, "step"),
        }
    }
}

/// Errors raised by sequencer operations.
///
/// Every failing operation leaves the engine state as it was before the
/// call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SequencerError {
    /// A track or step index outside the grid
    #[error("{axis} index {index} out of range (0..{bound})")]
    IndexOutOfRange { axis: Axis, index: usize, bound: usize },
    /// A note token missing from the pitch table
    #[error("unknown note: {0:?}")]
    UnknownNote(String),
    /// Tempo must be a positive number of BPM
    #[error("invalid tempo: {0} BPM")]
    InvalidTempo(u32),
    /// Volume that cannot be clamped into [0, 1]
    #[error("invalid volume: {0}")]
    InvalidVolume(f32),
    /// Step triggers must be non-zero and shorter than keyboard notes
    #[error("invalid durations: trigger {trigger:?} must be non-zero and shorter than key {key:?}")]
    InvalidDuration { trigger: Duration, key: Duration },
}

pub type Result<T> = std::result::Result<T, SequencerError>;
