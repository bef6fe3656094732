// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Control surface for keyboard input.
//!
//! This module provides:
//! - Actions a user can trigger
//! - A grid cursor for step editing
//! - Translation of actions into engine commands

pub mod keyboard;

pub use keyboard::{format_shortcut, KeyBinding, KeyboardController, Shortcut};

use crate::sequencer::{Command, EngineSnapshot, NUM_STEPS, NUM_TRACKS};

/// Smallest tempo reachable with the tempo keys
pub const MIN_TEMPO: u32 = 20;

/// Largest tempo reachable with the tempo keys
pub const MAX_TEMPO: u32 = 300;

/// Action that can be triggered by controls
#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    // Transport
    /// Toggle play/stop
    TogglePlay,
    /// Stop playback
    Stop,
    /// Toggle loop mode
    ToggleLoop,
    /// Toggle record mode
    ToggleRecord,

    // Tempo
    /// Adjust tempo by delta BPM
    AdjustTempo(i32),

    // Keyboard
    /// Play a note on the virtual keyboard
    PlayNote(String),

    // Grid
    /// Toggle the step under the cursor
    ToggleStep,
    /// Empty the step under the cursor
    ClearStep,
    /// Empty the cursor's track
    ClearTrack,
    /// Record into the cursor's track
    SelectRecordTrack,

    // Mixer
    /// Adjust the cursor track's volume by delta
    AdjustVolume(f32),

    // UI
    /// Toggle help display
    ToggleHelp,
    /// Quit application
    Quit,

    // Navigation
    NavigateUp,
    NavigateDown,
    NavigateLeft,
    NavigateRight,
}

impl ControlAction {
    /// Check if this is a transport action
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ControlAction::TogglePlay
                | ControlAction::Stop
                | ControlAction::ToggleLoop
                | ControlAction::ToggleRecord
                | ControlAction::AdjustTempo(_)
        )
    }

    /// Check if this is a navigation action
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            ControlAction::NavigateUp
                | ControlAction::NavigateDown
                | ControlAction::NavigateLeft
                | ControlAction::NavigateRight
        )
    }

    /// Engine command for this action.
    ///
    /// `None` for actions handled by the UI alone (navigation, help, quit).
    pub fn command(&self, cursor: Cursor, state: &EngineSnapshot) -> Option<Command> {
        let Cursor { track, step } = cursor;
        let command = match self {
            ControlAction::TogglePlay => Command::TogglePlay,
            ControlAction::Stop => Command::Stop,
            ControlAction::ToggleLoop => Command::ToggleLooping,
            ControlAction::ToggleRecord => Command::ToggleRecording,
            ControlAction::AdjustTempo(delta) => {
                let tempo = state.tempo.saturating_add_signed(*delta).clamp(MIN_TEMPO, MAX_TEMPO);
                Command::SetTempo(tempo)
            }
            ControlAction::PlayNote(note) => Command::key_press(note.as_str()),
            ControlAction::ToggleStep => Command::ToggleStep { track, step },
            ControlAction::ClearStep => Command::SetStep { track, step, note: None },
            ControlAction::ClearTrack => Command::ClearTrack(track),
            ControlAction::SelectRecordTrack => Command::SetRecordTrack(track),
            ControlAction::AdjustVolume(delta) => {
                let current = state.volumes.get(track).copied().unwrap_or(1.0);
                Command::SetVolume {
                    track,
                    value: current + delta,
                }
            }
            ControlAction::ToggleHelp
            | ControlAction::Quit
            | ControlAction::NavigateUp
            | ControlAction::NavigateDown
            | ControlAction::NavigateLeft
            | ControlAction::NavigateRight => return None,
        };
        Some(command)
    }
}

/// Selected grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub track: usize,
    pub step: usize,
}

impl Cursor {
    /// Move for a navigation action. Steps wrap; tracks stop at the edges.
    pub fn navigate(&mut self, action: &ControlAction) {
        match action {
            ControlAction::NavigateUp => self.track = self.track.saturating_sub(1),
            ControlAction::NavigateDown => self.track = (self.track + 1).min(NUM_TRACKS - 1),
            ControlAction::NavigateLeft => self.step = (self.step + NUM_STEPS - 1) % NUM_STEPS,
            ControlAction::NavigateRight => self.step = (self.step + 1) % NUM_STEPS,
            _ => {}
        }
    }
}
