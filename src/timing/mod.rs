// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timing module.
//!
//! This module provides tempo-to-step-interval conversion for the
//! transport.

pub mod clock;

pub use clock::{StepClock, BEATS_PER_LOOP, DEFAULT_TEMPO};
