// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Session configuration.
//!
//! A YAML file describing how the sequencer starts: tempo, modes, note
//! durations, mixer levels and an optional initial pattern. Every field
//! is optional.
//!
//! ```yaml
//! session:
//!   tempo: 96
//!   looping: true
//! mixer:
//!   volumes: [1.0, 0.8]
//! pattern:
//!   - [C4, ~, E4, ~]
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::music::PitchTable;
use crate::sequencer::engine::{DEFAULT_NOTE, KEY_DURATION, TRIGGER_DURATION};
use crate::sequencer::{EngineSettings, NUM_STEPS, NUM_TRACKS};
use crate::timing::DEFAULT_TEMPO;

/// Root of a session file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SessionFile {
    /// Transport and recording settings
    #[serde(default)]
    pub session: SessionConfig,
    /// Track levels
    #[serde(default)]
    pub mixer: MixerConfig,
    /// Initial grid contents, one row per track. `~` is an empty step.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pattern: Vec<Vec<Option<String>>>,
}

impl SessionFile {
    /// Load a session from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read session file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse a session from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse session YAML")
    }

    /// Serialize to a YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize session to YAML")
    }

    /// Check values against the grid size and pitch table
    pub fn validate(&self, pitches: &PitchTable) -> Result<()> {
        let s = &self.session;

        if s.tempo == 0 {
            bail!("tempo must be greater than 0");
        }
        if s.record_track >= NUM_TRACKS {
            bail!("record_track {} out of range (0..{})", s.record_track, NUM_TRACKS);
        }
        if !pitches.contains(&s.default_note) {
            bail!("default_note {:?} is not in the pitch table", s.default_note);
        }
        if !(s.trigger_duration.is_finite() && s.trigger_duration > 0.0) {
            bail!("trigger_duration must be a positive number of seconds");
        }
        seconds(s.trigger_duration, "trigger_duration")?;
        seconds(s.key_duration, "key_duration")?;
        if !(s.key_duration.is_finite() && s.key_duration > s.trigger_duration) {
            bail!(
                "key_duration ({}) must be longer than trigger_duration ({})",
                s.key_duration,
                s.trigger_duration
            );
        }

        if self.mixer.volumes.len() > NUM_TRACKS {
            bail!("{} volumes given for {} tracks", self.mixer.volumes.len(), NUM_TRACKS);
        }
        if let Some(track) = self.mixer.volumes.iter().position(|v| v.is_nan()) {
            bail!("volume for track {} is not a number", track);
        }

        if self.pattern.len() > NUM_TRACKS {
            bail!("pattern has {} rows for {} tracks", self.pattern.len(), NUM_TRACKS);
        }
        for (track, row) in self.pattern.iter().enumerate() {
            if row.len() > NUM_STEPS {
                bail!("pattern row {} has {} steps (max {})", track, row.len(), NUM_STEPS);
            }
            for (step, note) in row.iter().enumerate() {
                if let Some(note) = note {
                    if !pitches.contains(note) {
                        bail!("pattern row {} step {}: unknown note {:?}", track, step, note);
                    }
                }
            }
        }

        Ok(())
    }

    /// Validate and convert to engine settings
    pub fn to_settings(&self, pitches: &PitchTable) -> Result<EngineSettings> {
        self.validate(pitches).context("Invalid session configuration")?;
        let s = &self.session;

        Ok(EngineSettings {
            tempo: s.tempo,
            looping: s.looping,
            recording: s.recording,
            record_track: s.record_track,
            default_note: s.default_note.clone(),
            trigger_duration: seconds(s.trigger_duration, "trigger_duration")?,
            key_duration: seconds(s.key_duration, "key_duration")?,
            volumes: self.mixer.volumes.iter().map(|v| v.clamp(0.0, 1.0)).collect(),
            pattern: self.pattern.clone(),
        })
    }
}

/// Convert a duration in seconds, rejecting values a `Duration` cannot hold
fn seconds(value: f64, field: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .with_context(|| format!("{} of {} seconds is out of range", field, value))
}

/// Transport and recording settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Tempo in BPM
    #[serde(default = "default_tempo")]
    pub tempo: u32,
    /// Start with loop mode on
    #[serde(default = "default_true")]
    pub looping: bool,
    /// Start with record mode on
    #[serde(default)]
    pub recording: bool,
    /// Track that receives recorded notes
    #[serde(default)]
    pub record_track: usize,
    /// Note written when a step is toggled on
    #[serde(default = "default_note")]
    pub default_note: String,
    /// Length of a sequenced tone in seconds
    #[serde(default = "default_trigger_duration")]
    pub trigger_duration: f64,
    /// Length of a keyboard tone in seconds
    #[serde(default = "default_key_duration")]
    pub key_duration: f64,
}

fn default_tempo() -> u32 {
    DEFAULT_TEMPO
}
fn default_true() -> bool {
    true
}
fn default_note() -> String {
    DEFAULT_NOTE.to_string()
}
fn default_trigger_duration() -> f64 {
    TRIGGER_DURATION.as_secs_f64()
}
fn default_key_duration() -> f64 {
    KEY_DURATION.as_secs_f64()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tempo: default_tempo(),
            looping: default_true(),
            recording: false,
            record_track: 0,
            default_note: default_note(),
            trigger_duration: default_trigger_duration(),
            key_duration: default_key_duration(),
        }
    }
}

/// Track levels
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MixerConfig {
    /// Volume per track starting at track 0; missing tracks play at 1.0
    #[serde(default)]
    pub volumes: Vec<f32>,
}
