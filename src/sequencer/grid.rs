// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Step grid.
//!
//! A fixed-size matrix of cells indexed by `(track, step)`. Each cell is
//! either empty or holds a note token from the pitch table. Dimensions are
//! set at construction and never change.

use std::sync::Arc;

use tracing::trace;

use super::{Axis, Result, SequencerError, NUM_STEPS, NUM_TRACKS};
use crate::music::PitchTable;

/// Per-track, per-step note assignments
#[derive(Debug, Clone)]
pub struct StepGrid {
    /// Cells, one row per track
    cells: Vec<Vec<Option<String>>>,
    num_tracks: usize,
    num_steps: usize,
    /// Valid note tokens
    pitches: Arc<PitchTable>,
}

impl StepGrid {
    /// Create an empty grid with the standard dimensions
    pub fn new(pitches: Arc<PitchTable>) -> Self {
        Self::with_size(NUM_TRACKS, NUM_STEPS, pitches)
    }

    /// Create an empty grid with custom dimensions
    pub fn with_size(num_tracks: usize, num_steps: usize, pitches: Arc<PitchTable>) -> Self {
        Self {
            cells: vec![vec![None; num_steps]; num_tracks],
            num_tracks,
            num_steps,
            pitches,
        }
    }

    pub fn num_tracks(&self) -> usize {
        self.num_tracks
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    /// Pitch table used to validate writes
    pub fn pitches(&self) -> &Arc<PitchTable> {
        &self.pitches
    }

    fn check_track(&self, track: usize) -> Result<()> {
        if track >= self.num_tracks {
            return Err(SequencerError::IndexOutOfRange {
                axis: Axis::Track,
                index: track,
                bound: self.num_tracks,
            });
        }
        Ok(())
    }

    fn check_cell(&self, track: usize, step: usize) -> Result<()> {
        self.check_track(track)?;
        if step >= self.num_steps {
            return Err(SequencerError::IndexOutOfRange {
                axis: Axis::Step,
                index: step,
                bound: self.num_steps,
            });
        }
        Ok(())
    }

    fn check_note(&self, note: &str) -> Result<()> {
        if !self.pitches.contains(note) {
            return Err(SequencerError::UnknownNote(note.to_string()));
        }
        Ok(())
    }

    /// Read a cell
    pub fn get(&self, track: usize, step: usize) -> Result<Option<&str>> {
        self.check_cell(track, step)?;
        Ok(self.cells[track][step].as_deref())
    }

    /// Overwrite a cell. `None` clears it.
    pub fn set(&mut self, track: usize, step: usize, note: Option<&str>) -> Result<()> {
        self.check_cell(track, step)?;
        if let Some(note) = note {
            self.check_note(note)?;
        }
        trace!(track, step, ?note, "set cell");
        self.cells[track][step] = note.map(str::to_string);
        Ok(())
    }

    /// Clear a filled cell, or fill an empty one with `default_note`.
    /// Returns the new cell contents.
    pub fn toggle(&mut self, track: usize, step: usize, default_note: &str) -> Result<Option<&str>> {
        let next = match self.get(track, step)? {
            Some(_) => None,
            None => Some(default_note),
        };
        self.set(track, step, next)?;
        self.get(track, step)
    }

    /// Lowest-indexed empty step of a track, or `None` when the track is full
    pub fn find_next_empty_step(&self, track: usize) -> Result<Option<usize>> {
        self.check_track(track)?;
        Ok(self.cells[track].iter().position(Option::is_none))
    }

    /// Empty every cell of one track
    pub fn clear_track(&mut self, track: usize) -> Result<()> {
        self.check_track(track)?;
        self.cells[track].iter_mut().for_each(|cell| *cell = None);
        Ok(())
    }

    /// Empty every cell
    pub fn clear(&mut self) {
        for row in &mut self.cells {
            row.iter_mut().for_each(|cell| *cell = None);
        }
    }

    /// One track's cells
    pub fn track(&self, track: usize) -> Result<&[Option<String>]> {
        self.check_track(track)?;
        Ok(&self.cells[track])
    }

    /// All tracks, in index order
    pub fn rows(&self) -> impl Iterator<Item = &[Option<String>]> {
        self.cells.iter().map(Vec::as_slice)
    }

    /// Whether every cell is empty
    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_none)
    }

    /// Number of filled cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> StepGrid {
        StepGrid::new(Arc::new(PitchTable::standard()))
    }

    #[test]
    fn test_new_grid_is_empty() {
        let grid = grid();
        assert_eq!(grid.num_tracks(), 4);
        assert_eq!(grid.num_steps(), 16);
        assert!(grid.is_empty());
        assert_eq!(grid.rows().count(), 4);
    }

    #[test]
    fn test_get_set() {
        let mut grid = grid();
        grid.set(1, 5, Some("E4")).unwrap();
        assert_eq!(grid.get(1, 5).unwrap(), Some("E4"));
        assert_eq!(grid.filled_count(), 1);

        grid.set(1, 5, None).unwrap();
        assert_eq!(grid.get(1, 5).unwrap(), None);
    }

    #[test]
    fn test_out_of_range() {
        let mut grid = grid();
        assert_eq!(
            grid.get(4, 0),
            Err(SequencerError::IndexOutOfRange { axis: Axis::Track, index: 4, bound: 4 })
        );
        assert_eq!(
            grid.get(0, 16),
            Err(SequencerError::IndexOutOfRange { axis: Axis::Step, index: 16, bound: 16 })
        );
        assert!(grid.set(0, 99, Some("C4")).is_err());
        assert!(grid.find_next_empty_step(7).is_err());
        assert!(grid.is_empty());
    }

    #[test]
    fn test_unknown_note_rejected() {
        let mut grid = grid();
        grid.set(0, 0, Some("D4")).unwrap();

        let err = grid.set(0, 0, Some("Z9")).unwrap_err();
        assert_eq!(err, SequencerError::UnknownNote("Z9".to_string()));
        // Prior value untouched
        assert_eq!(grid.get(0, 0).unwrap(), Some("D4"));
    }

    #[test]
    fn test_toggle() {
        let mut grid = grid();
        assert_eq!(grid.toggle(2, 3, "C4").unwrap(), Some("C4"));
        assert_eq!(grid.toggle(2, 3, "C4").unwrap(), None);

        // A filled cell clears regardless of the default note
        grid.set(2, 3, Some("G4")).unwrap();
        assert_eq!(grid.toggle(2, 3, "C4").unwrap(), None);
    }

    #[test]
    fn test_toggle_unknown_default() {
        let mut grid = grid();
        assert!(grid.toggle(0, 0, "nope").is_err());
        assert_eq!(grid.get(0, 0).unwrap(), None);

        // Clearing never needs the default note
        grid.set(0, 0, Some("A4")).unwrap();
        assert_eq!(grid.toggle(0, 0, "nope").unwrap(), None);
    }

    #[test]
    fn test_find_next_empty_step() {
        let mut grid = grid();
        assert_eq!(grid.find_next_empty_step(0).unwrap(), Some(0));

        grid.set(0, 0, Some("C4")).unwrap();
        grid.set(0, 1, Some("C4")).unwrap();
        grid.set(0, 3, Some("C4")).unwrap();
        assert_eq!(grid.find_next_empty_step(0).unwrap(), Some(2));

        for step in 0..16 {
            grid.set(0, step, Some("B4")).unwrap();
        }
        assert_eq!(grid.find_next_empty_step(0).unwrap(), None);
        // Other tracks unaffected
        assert_eq!(grid.find_next_empty_step(1).unwrap(), Some(0));
    }

    #[test]
    fn test_clear_track_and_clear() {
        let mut grid = grid();
        grid.set(0, 0, Some("C4")).unwrap();
        grid.set(1, 0, Some("C4")).unwrap();

        grid.clear_track(0).unwrap();
        assert_eq!(grid.get(0, 0).unwrap(), None);
        assert_eq!(grid.get(1, 0).unwrap(), Some("C4"));

        grid.clear();
        assert!(grid.is_empty());
    }
}
