// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Engine commands and notifications.
//!
//! Every input (key press, step click, slider, timer tick) reaches the
//! engine as a [`Command`]. The engine answers with [`EngineEvent`]s that
//! tell a renderer what to redraw.

use super::TimerId;

/// Input to the sequencer engine
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Transport
    /// Start playback (no-op if running)
    Start,
    /// Stop playback and rewind
    Stop,
    /// Start if stopped, stop if running
    TogglePlay,
    /// Set tempo in BPM
    SetTempo(u32),
    /// Set loop mode
    SetLooping(bool),
    /// Flip loop mode
    ToggleLooping,

    // Recording
    /// Set record mode
    SetRecording(bool),
    /// Flip record mode
    ToggleRecording,
    /// Choose the track that receives recorded notes
    SetRecordTrack(usize),

    // Mixer
    /// Set a track volume (clamped into [0, 1])
    SetVolume { track: usize, value: f32 },

    // Grid
    /// Clear a filled step or fill an empty one with the default note
    ToggleStep { track: usize, step: usize },
    /// Write a step directly
    SetStep { track: usize, step: usize, note: Option<String> },
    /// Empty a whole track
    ClearTrack(usize),

    // Keyboard
    /// A keyboard note was pressed
    KeyPress { note: String },

    // Timer
    /// A periodic timer fired
    Tick(TimerId),

    /// Stop the command loop
    Shutdown,
}

impl Command {
    /// Key press for a note token
    pub fn key_press(note: impl Into<String>) -> Self {
        Command::KeyPress { note: note.into() }
    }

    /// Check if this is a transport command
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Command::Start
                | Command::Stop
                | Command::TogglePlay
                | Command::SetTempo(_)
                | Command::SetLooping(_)
                | Command::ToggleLooping
        )
    }

    /// Check if this command may edit the grid
    pub fn edits_grid(&self) -> bool {
        matches!(
            self,
            Command::ToggleStep { .. }
                | Command::SetStep { .. }
                | Command::ClearTrack(_)
                | Command::KeyPress { .. }
        )
    }
}

/// Notification from the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Grid contents changed; re-read the grid
    GridChanged,
    /// Transport started or stopped
    TransportChanged { running: bool, step: usize },
    /// Playhead moved to this step
    StepAdvanced(usize),
    /// A tone was sounded. `track` is `None` for a keyboard note.
    ToneTriggered {
        track: Option<usize>,
        note: String,
        frequency: f64,
        volume: f32,
    },
    TempoChanged(u32),
    LoopingChanged(bool),
    RecordingChanged(bool),
    RecordTrackChanged(usize),
    VolumeChanged { track: usize, value: f32 },
}
