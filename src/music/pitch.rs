// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pitch table and note-name handling.
//!
//! Notes are identified by string tokens such as `C4` or `F#4`. The
//! [`PitchTable`] maps each token to a frequency in Hz and is the single
//! authority on which tokens are valid anywhere in the sequencer.

use std::collections::HashMap;
use std::fmt;

/// Frequencies for the on-screen keyboard, in keyboard order.
pub const STANDARD_PITCHES: [(&str, f64); 13] = [
    ("C4", 261.63),
    ("C#4", 277.18),
    ("D4", 293.66),
    ("D#4", 311.13),
    ("E4", 329.63),
    ("F4", 349.23),
    ("F#4", 369.99),
    ("G4", 392.00),
    ("G#4", 415.30),
    ("A4", 440.00),
    ("A#4", 466.16),
    ("B4", 493.88),
    ("C5", 523.25),
];

/// Note names (pitch classes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Note {
    C,
    Cs, // C# / Db
    D,
    Ds, // D# / Eb
    E,
    F,
    Fs, // F# / Gb
    G,
    Gs, // G# / Ab
    A,
    As, // A# / Bb
    B,
}

impl Note {
    /// All notes in chromatic order
    pub const ALL: [Note; 12] = [
        Note::C,
        Note::Cs,
        Note::D,
        Note::Ds,
        Note::E,
        Note::F,
        Note::Fs,
        Note::G,
        Note::Gs,
        Note::A,
        Note::As,
        Note::B,
    ];

    /// Get the pitch class (0-11) for this note
    pub fn pitch_class(self) -> u8 {
        Note::ALL.iter().position(|n| *n == self).unwrap_or(0) as u8
    }

    /// Get note from pitch class
    pub fn from_pitch_class(pc: u8) -> Self {
        Note::ALL[(pc % 12) as usize]
    }

    /// Parse a pitch class from a string (e.g., "C", "C#", "Db")
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_uppercase();
        match s.as_str() {
            "C" => Some(Note::C),
            "C#" | "DB" => Some(Note::Cs),
            "D" => Some(Note::D),
            "D#" | "EB" => Some(Note::Ds),
            "E" | "FB" => Some(Note::E),
            "F" | "E#" => Some(Note::F),
            "F#" | "GB" => Some(Note::Fs),
            "G" => Some(Note::G),
            "G#" | "AB" => Some(Note::Gs),
            "A" => Some(Note::A),
            "A#" | "BB" => Some(Note::As),
            "B" | "CB" => Some(Note::B),
            _ => None,
        }
    }

    /// Whether this pitch class sits on a black key
    pub fn is_accidental(self) -> bool {
        matches!(self, Note::Cs | Note::Ds | Note::Fs | Note::Gs | Note::As)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Note::C => "C",
            Note::Cs => "C#",
            Note::D => "D",
            Note::Ds => "D#",
            Note::E => "E",
            Note::F => "F",
            Note::Fs => "F#",
            Note::G => "G",
            Note::Gs => "G#",
            Note::A => "A",
            Note::As => "A#",
            Note::B => "B",
        };
        f.write_str(name)
    }
}

/// A pitch class plus octave, e.g. `C#4`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteName {
    pub note: Note,
    pub octave: i8,
}

impl NoteName {
    pub fn new(note: Note, octave: i8) -> Self {
        Self { note, octave }
    }

    /// Parse a note token such as `C4`, `F#3` or `Bb-1`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let split = s.find(|c: char| c.is_ascii_digit() || c == '-')?;
        if split == 0 {
            return None;
        }
        let (name, octave) = s.split_at(split);
        let note = Note::parse(name)?;
        let octave = octave.parse().ok()?;
        Some(Self { note, octave })
    }

    /// MIDI note number (C4 = 60)
    pub fn midi_number(self) -> i16 {
        (self.octave as i16 + 1) * 12 + self.note.pitch_class() as i16
    }

    /// Twelve-tone equal temperament frequency with A4 = 440 Hz
    pub fn equal_tempered_hz(self) -> f64 {
        440.0 * 2f64.powf((self.midi_number() - 69) as f64 / 12.0)
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.note, self.octave)
    }
}

/// A key of the on-screen keyboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardKey {
    pub note: String,
    pub black: bool,
}

/// Immutable mapping from note token to frequency in Hz.
///
/// Insertion order is preserved; it is the left-to-right order of the
/// keyboard.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchTable {
    entries: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl PitchTable {
    /// The thirteen-key table from C4 to C5
    pub fn standard() -> Self {
        Self::from_entries(
            STANDARD_PITCHES
                .iter()
                .map(|(name, hz)| (name.to_string(), *hz)),
        )
    }

    /// Build a table from `(token, hz)` pairs. A repeated token keeps its
    /// first position and takes the last frequency.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut table = Self {
            entries: Vec::new(),
            index: HashMap::new(),
        };
        for (name, hz) in entries {
            match table.index.get(&name) {
                Some(&i) => table.entries[i].1 = hz,
                None => {
                    table.index.insert(name.clone(), table.entries.len());
                    table.entries.push((name, hz));
                }
            }
        }
        table
    }

    /// Frequency for a note token
    pub fn frequency(&self, note: &str) -> Option<f64> {
        self.index.get(note).map(|&i| self.entries[i].1)
    }

    pub fn contains(&self, note: &str) -> bool {
        self.index.contains_key(note)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Note tokens in keyboard order
    pub fn notes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// `(token, hz)` pairs in keyboard order
    pub fn entries(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, hz)| (name.as_str(), *hz))
    }

    /// Keyboard layout with black keys flagged
    pub fn keyboard(&self) -> Vec<KeyboardKey> {
        self.notes()
            .map(|note| KeyboardKey {
                note: note.to_string(),
                black: NoteName::parse(note)
                    .map(|n| n.note.is_accidental())
                    .unwrap_or_else(|| note.contains('#')),
            })
            .collect()
    }
}

impl Default for PitchTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table() {
        let table = PitchTable::standard();
        assert_eq!(table.len(), 13);
        assert_eq!(table.frequency("A4"), Some(440.0));
        assert_eq!(table.frequency("C4"), Some(261.63));
        assert_eq!(table.frequency("C5"), Some(523.25));
        assert_eq!(table.frequency("C6"), None);
        assert!(!table.contains("c4"));
    }

    #[test]
    fn test_keyboard_order_and_black_keys() {
        let keys = PitchTable::standard().keyboard();
        assert_eq!(keys.first().map(|k| k.note.as_str()), Some("C4"));
        assert_eq!(keys.last().map(|k| k.note.as_str()), Some("C5"));
        assert_eq!(keys.iter().filter(|k| k.black).count(), 5);
        assert!(keys[1].black);
        assert!(!keys[2].black);
    }

    #[test]
    fn test_from_entries_duplicate() {
        let table = PitchTable::from_entries(vec![
            ("X".to_string(), 1.0),
            ("Y".to_string(), 2.0),
            ("X".to_string(), 3.0),
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.frequency("X"), Some(3.0));
        assert_eq!(table.notes().collect::<Vec<_>>(), vec!["X", "Y"]);
    }

    #[test]
    fn test_note_name_parse() {
        assert_eq!(NoteName::parse("C4"), Some(NoteName::new(Note::C, 4)));
        assert_eq!(NoteName::parse("F#4"), Some(NoteName::new(Note::Fs, 4)));
        assert_eq!(NoteName::parse("Bb-1"), Some(NoteName::new(Note::As, -1)));
        assert_eq!(NoteName::parse("4"), None);
        assert_eq!(NoteName::parse("H4"), None);
        assert_eq!(NoteName::parse("C"), None);
        assert_eq!(NoteName::new(Note::Gs, 4).to_string(), "G#4");
    }

    #[test]
    fn test_table_matches_equal_temperament() {
        for (name, hz) in PitchTable::standard().entries() {
            let parsed = NoteName::parse(name).unwrap();
            assert!((parsed.equal_tempered_hz() - hz).abs() < 0.01, "{}", name);
        }
        assert_eq!(NoteName::parse("C4").unwrap().midi_number(), 60);
    }

    #[test]
    fn test_pitch_class_round_trip() {
        for note in Note::ALL {
            assert_eq!(Note::from_pitch_class(note.pitch_class()), note);
        }
        assert_eq!(Note::from_pitch_class(13), Note::Cs);
    }
}
