// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music utilities for the step sequencer.
//!
//! This module provides the pitch table that maps note tokens to
//! frequencies, plus note-name parsing and the keyboard layout.

pub mod pitch;

pub use pitch::{KeyboardKey, Note, NoteName, PitchTable, STANDARD_PITCHES};
