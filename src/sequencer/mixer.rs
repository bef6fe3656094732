// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Per-track volume.

use super::{Axis, Result, SequencerError, NUM_TRACKS};

/// Track volumes in [0.0, 1.0], one per track
#[derive(Debug, Clone, PartialEq)]
pub struct Mixer {
    volumes: Vec<f32>,
}

impl Mixer {
    /// Create a mixer with every track at full volume
    pub fn new(num_tracks: usize) -> Self {
        Self {
            volumes: vec![1.0; num_tracks],
        }
    }

    fn check_track(&self, track: usize) -> Result<()> {
        if track >= self.volumes.len() {
            return Err(SequencerError::IndexOutOfRange {
                axis: Axis::Track,
                index: track,
                bound: self.volumes.len(),
            });
        }
        Ok(())
    }

    /// Set a track volume, clamped into [0, 1]. Returns the stored value.
    /// NaN is rejected.
    pub fn set_volume(&mut self, track: usize, value: f32) -> Result<f32> {
        self.check_track(track)?;
        if value.is_nan() {
            return Err(SequencerError::InvalidVolume(value));
        }
        let value = value.clamp(0.0, 1.0);
        self.volumes[track] = value;
        Ok(value)
    }

    pub fn volume(&self, track: usize) -> Result<f32> {
        self.check_track(track)?;
        Ok(self.volumes[track])
    }

    pub fn volumes(&self) -> &[f32] {
        &self.volumes
    }

    pub fn num_tracks(&self) -> usize {
        self.volumes.len()
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new(NUM_TRACKS)
    }
}
