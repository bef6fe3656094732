// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Keyboard shortcut handling.
//!
//! Maps terminal keys to actions: a row of note keys laid out like a
//! piano (`a w s e d f t g y h u j k`), plus transport, grid editing and
//! navigation.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyModifiers};

use super::ControlAction;
use crate::music::PitchTable;

/// Note keys in keyboard order, white keys on the home row
pub const NOTE_KEYS: [char; 13] = ['a', 'w', 's', 'e', 'd', 'f', 't', 'g', 'y', 'h', 'u', 'j', 'k'];

/// A keyboard shortcut definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shortcut {
    /// Key code
    pub code: KeyCode,
    /// Required modifiers
    pub modifiers: KeyModifiers,
}

impl Shortcut {
    /// Create a new shortcut.
    ///
    /// Shift is dropped for character keys since the character already
    /// carries it (`?` arrives as Shift+`?` on most terminals).
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let modifiers = match code {
            KeyCode::Char(_) => modifiers - KeyModifiers::SHIFT,
            _ => modifiers,
        };
        Self { code, modifiers }
    }

    /// Create a shortcut with no modifiers
    pub fn key(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    /// Create a shortcut with Ctrl modifier
    pub fn ctrl(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::CONTROL)
    }

    /// Create a shortcut with Shift modifier
    pub fn shift(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::SHIFT)
    }

    /// Check if this shortcut matches a key event
    pub fn matches(&self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        *self == Shortcut::new(code, modifiers)
    }
}

/// A keyboard binding (shortcut to action)
#[derive(Debug, Clone)]
pub struct KeyBinding {
    /// The shortcut
    pub shortcut: Shortcut,
    /// The action to perform
    pub action: ControlAction,
    /// Description for help display
    pub description: String,
    /// Category for grouping in help
    pub category: String,
}

impl KeyBinding {
    /// Create a new key binding
    pub fn new(shortcut: Shortcut, action: ControlAction, description: impl Into<String>) -> Self {
        Self {
            shortcut,
            action,
            description: description.into(),
            category: "General".to_string(),
        }
    }

    /// Set the category
    pub fn category(mut self, cat: impl Into<String>) -> Self {
        self.category = cat.into();
        self
    }
}

/// Keyboard controller with configurable bindings
#[derive(Debug, Default)]
pub struct KeyboardController {
    bindings: HashMap<Shortcut, KeyBinding>,
}

impl KeyboardController {
    /// Create an empty keyboard controller
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a keyboard controller with default bindings.
    ///
    /// Note keys are assigned to the table's notes in order; notes beyond
    /// the thirteenth have no key.
    pub fn with_defaults(pitches: &PitchTable) -> Self {
        let mut controller = Self::new();
        controller.add_note_bindings(pitches);
        controller.add_default_bindings();
        controller
    }

    fn add_note_bindings(&mut self, pitches: &PitchTable) {
        for (&key, note) in NOTE_KEYS.iter().zip(pitches.notes()) {
            self.add(
                KeyBinding::new(
                    Shortcut::key(KeyCode::Char(key)),
                    ControlAction::PlayNote(note.to_string()),
                    format!("Play {}", note),
                )
                .category("Keyboard"),
            );
        }
    }

    fn add_default_bindings(&mut self) {
        // Transport
        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char(' ')),
            ControlAction::TogglePlay,
            "Play/Stop",
        ).category("Transport"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Esc),
            ControlAction::Stop,
            "Stop",
        ).category("Transport"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('l')),
            ControlAction::ToggleLoop,
            "Toggle Loop",
        ).category("Transport"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('r')),
            ControlAction::ToggleRecord,
            "Toggle Record",
        ).category("Transport"));

        // Tempo
        for (c, delta) in [('=', 1), ('-', -1), ('+', 10), ('_', -10)] {
            self.add(KeyBinding::new(
                Shortcut::key(KeyCode::Char(c)),
                ControlAction::AdjustTempo(delta),
                format!("Tempo {:+} BPM", delta),
            ).category("Tempo"));
        }

        // Grid
        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Enter),
            ControlAction::ToggleStep,
            "Toggle Step",
        ).category("Grid"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Backspace),
            ControlAction::ClearStep,
            "Clear Step",
        ).category("Grid"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Delete),
            ControlAction::ClearStep,
            "Clear Step",
        ).category("Grid"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('x')),
            ControlAction::ClearTrack,
            "Clear Track",
        ).category("Grid"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('z')),
            ControlAction::SelectRecordTrack,
            "Record Into Track",
        ).category("Grid"));

        // Mixer
        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('.')),
            ControlAction::AdjustVolume(0.1),
            "Volume Up",
        ).category("Mixer"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char(',')),
            ControlAction::AdjustVolume(-0.1),
            "Volume Down",
        ).category("Mixer"));

        // Navigation
        for (code, action, label) in [
            (KeyCode::Up, ControlAction::NavigateUp, "Previous Track"),
            (KeyCode::Down, ControlAction::NavigateDown, "Next Track"),
            (KeyCode::Left, ControlAction::NavigateLeft, "Previous Step"),
            (KeyCode::Right, ControlAction::NavigateRight, "Next Step"),
        ] {
            self.add(KeyBinding::new(Shortcut::key(code), action, label).category("Navigation"));
        }

        // UI
        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('?')),
            ControlAction::ToggleHelp,
            "Toggle Help",
        ).category("UI"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('q')),
            ControlAction::Quit,
            "Quit",
        ).category("UI"));

        self.add(KeyBinding::new(
            Shortcut::ctrl(KeyCode::Char('c')),
            ControlAction::Quit,
            "Quit",
        ).category("UI"));
    }

    /// Add a key binding
    pub fn add(&mut self, binding: KeyBinding) {
        self.bindings.insert(binding.shortcut.clone(), binding);
    }

    /// Remove a key binding
    pub fn remove(&mut self, shortcut: &Shortcut) -> Option<KeyBinding> {
        self.bindings.remove(shortcut)
    }

    /// Get action for a key event
    pub fn get_action(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<&ControlAction> {
        self.bindings
            .get(&Shortcut::new(code, modifiers))
            .map(|b| &b.action)
    }

    /// Process a key event and return the action
    pub fn process_key(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<ControlAction> {
        self.get_action(code, modifiers).cloned()
    }

    /// Get all bindings for help display
    pub fn bindings(&self) -> impl Iterator<Item = &KeyBinding> {
        self.bindings.values()
    }

    /// Get bindings grouped by category, each group sorted by description
    pub fn bindings_by_category(&self) -> HashMap<String, Vec<&KeyBinding>> {
        let mut grouped: HashMap<String, Vec<&KeyBinding>> = HashMap::new();

        for binding in self.bindings.values() {
            grouped
                .entry(binding.category.clone())
                .or_default()
                .push(binding);
        }
        for group in grouped.values_mut() {
            group.sort_by(|a, b| a.description.cmp(&b.description));
        }

        grouped
    }

    /// Get binding for a shortcut
    pub fn get_binding(&self, shortcut: &Shortcut) -> Option<&KeyBinding> {
        self.bindings.get(shortcut)
    }
}

/// Format a shortcut for display
pub fn format_shortcut(shortcut: &Shortcut) -> String {
    let mut parts = Vec::new();

    if shortcut.modifiers.contains(KeyModifiers::CONTROL) {
        parts.push("Ctrl");
    }
    if shortcut.modifiers.contains(KeyModifiers::ALT) {
        parts.push("Alt");
    }
    if shortcut.modifiers.contains(KeyModifiers::SHIFT) {
        parts.push("Shift");
    }

    let key = match shortcut.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_uppercase().to_string(),
        KeyCode::F(n) => format!("F{}", n),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        _ => "?".to_string(),
    };

    parts.push(&key);
    parts.join("+")
}
