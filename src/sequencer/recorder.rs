// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Keyboard recording into the step grid.
//!
//! While recording is on, each key press is written to the lowest empty
//! step of the target track. A full track drops the note: recording never
//! overwrites a cell and never wraps back to step 0.

use tracing::debug;

use super::{Axis, Result, SequencerError, StepGrid};

/// What a key press did to the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Recording is off; the grid was not touched
    Idle,
    /// The note was written to this cell
    Written { track: usize, step: usize },
    /// The target track had no empty step; the note was dropped
    TrackFull { track: usize },
}

impl RecordOutcome {
    /// Whether the grid changed
    pub fn wrote(&self) -> bool {
        matches!(self, RecordOutcome::Written { .. })
    }
}

/// Recording state
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    recording: bool,
    /// Track that receives recorded notes
    target_track: usize,
}

impl Recorder {
    /// Create a recorder (off, targeting track 0)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
    }

    /// Flip recording and return the new state
    pub fn toggle(&mut self) -> bool {
        self.recording = !self.recording;
        self.recording
    }

    pub fn target_track(&self) -> usize {
        self.target_track
    }

    /// Change the target track; must be a track of `grid`
    pub fn set_target_track(&mut self, track: usize, grid: &StepGrid) -> Result<()> {
        if track >= grid.num_tracks() {
            return Err(SequencerError::IndexOutOfRange {
                axis: Axis::Track,
                index: track,
                bound: grid.num_tracks(),
            });
        }
        self.target_track = track;
        Ok(())
    }

    /// Handle a keyboard note while recording
    pub fn on_key_press(&self, grid: &mut StepGrid, note: &str) -> Result<RecordOutcome> {
        if !self.recording {
            return Ok(RecordOutcome::Idle);
        }

        let track = self.target_track;
        match grid.find_next_empty_step(track)? {
            Some(step) => {
                grid.set(track, step, Some(note))?;
                debug!(track, step, note, "recorded note");
                Ok(RecordOutcome::Written { track, step })
            }
            None => {
                debug!(track, note, "track full, note dropped");
                Ok(RecordOutcome::TrackFull { track })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::PitchTable;
    use std::sync::Arc;

    fn grid() -> StepGrid {
        StepGrid::new(Arc::new(PitchTable::standard()))
    }

    #[test]
    fn test_idle_does_not_write() {
        let recorder = Recorder::new();
        let mut grid = grid();

        let outcome = recorder.on_key_press(&mut grid, "C4").unwrap();
        assert_eq!(outcome, RecordOutcome::Idle);
        assert!(!outcome.wrote());
        assert!(grid.is_empty());
    }

    #[test]
    fn test_records_left_to_right() {
        let mut recorder = Recorder::new();
        recorder.set_recording(true);
        let mut grid = grid();
        grid.set(0, 1, Some("A4")).unwrap();

        assert_eq!(
            recorder.on_key_press(&mut grid, "C4").unwrap(),
            RecordOutcome::Written { track: 0, step: 0 }
        );
        assert_eq!(
            recorder.on_key_press(&mut grid, "D4").unwrap(),
            RecordOutcome::Written { track: 0, step: 2 }
        );
        assert_eq!(grid.get(0, 1).unwrap(), Some("A4"));
        assert_eq!(grid.get(0, 2).unwrap(), Some("D4"));
    }

    #[test]
    fn test_full_track_drops_note() {
        let mut recorder = Recorder::new();
        recorder.set_recording(true);
        let mut grid = grid();

        for _ in 0..16 {
            assert!(recorder.on_key_press(&mut grid, "E4").unwrap().wrote());
        }
        let outcome = recorder.on_key_press(&mut grid, "G4").unwrap();
        assert_eq!(outcome, RecordOutcome::TrackFull { track: 0 });
        assert!(grid.track(0).unwrap().iter().all(|c| c.as_deref() == Some("E4")));
    }

    #[test]
    fn test_unknown_note_leaves_grid() {
        let mut recorder = Recorder::new();
        recorder.set_recording(true);
        let mut grid = grid();

        assert!(recorder.on_key_press(&mut grid, "X1").is_err());
        assert!(grid.is_empty());
    }

    #[test]
    fn test_target_track() {
        let mut recorder = Recorder::new();
        let mut grid = grid();
        assert_eq!(recorder.target_track(), 0);

        recorder.set_target_track(3, &grid).unwrap();
        recorder.toggle();
        recorder.on_key_press(&mut grid, "C5").unwrap();
        assert_eq!(grid.get(3, 0).unwrap(), Some("C5"));

        assert!(recorder.set_target_track(4, &grid).is_err());
        assert_eq!(recorder.target_track(), 3);
    }
}
