// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Step sequencer with a virtual keyboard.
//!
//! A grid of note steps across four tracks, played back at a set tempo,
//! with live recording from a note keyboard and per-track volume. Sound
//! generation is delegated to a [`audio::ToneEmitter`].

pub mod audio;
pub mod config;
pub mod control;
pub mod music;
pub mod sequencer;
pub mod timing;
pub mod ui;
