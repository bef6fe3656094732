// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tone activity display widget.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// A sounded tone for display
#[derive(Debug, Clone)]
pub struct ToneActivity {
    /// Track that triggered the tone; `None` for the keyboard
    pub track: Option<usize>,
    pub note: String,
    pub frequency: f64,
    pub volume: f32,
    pub time: Instant,
}

impl ToneActivity {
    pub fn new(track: Option<usize>, note: impl Into<String>, frequency: f64, volume: f32) -> Self {
        Self {
            track,
            note: note.into(),
            frequency,
            volume,
            time: Instant::now(),
        }
    }

    /// Short source label, "T1".."T4" or "KEY"
    pub fn source(&self) -> String {
        match self.track {
            Some(track) => format!("T{}", track + 1),
            None => "KEY".to_string(),
        }
    }
}

/// Recent tones, split by source
#[derive(Debug, Clone)]
pub struct ActivityState {
    /// Tones from the sequencer
    pub sequenced: VecDeque<ToneActivity>,
    /// Tones from the keyboard
    pub played: VecDeque<ToneActivity>,
    /// Maximum tones kept per list
    pub max_entries: usize,
}

impl Default for ActivityState {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityState {
    /// Create with default capacity
    pub fn new() -> Self {
        Self {
            sequenced: VecDeque::new(),
            played: VecDeque::new(),
            max_entries: 10,
        }
    }

    /// Add a tone to the list for its source
    pub fn push(&mut self, tone: ToneActivity) {
        let list = if tone.track.is_some() {
            &mut self.sequenced
        } else {
            &mut self.played
        };
        list.push_back(tone);
        while list.len() > self.max_entries {
            list.pop_front();
        }
    }

    /// Clear all tones
    pub fn clear(&mut self) {
        self.sequenced.clear();
        self.played.clear();
    }
}

/// Widget for displaying recent tones
pub struct ActivityWidget<'a> {
    state: &'a ActivityState,
    block: Option<Block<'a>>,
    max_rows: usize,
}

impl<'a> ActivityWidget<'a> {
    /// Create a new activity widget
    pub fn new(state: &'a ActivityState) -> Self {
        Self {
            state,
            block: None,
            max_rows: 4,
        }
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Set maximum tones to display per column
    pub fn max_rows(mut self, max: usize) -> Self {
        self.max_rows = max;
        self
    }
}

impl Widget for ActivityWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = self
            .block
            .unwrap_or_else(|| Block::default().borders(Borders::ALL).title(" Tones "));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(inner);

        render_column(chunks[0], buf, "Sequencer", &self.state.sequenced, self.max_rows);
        render_column(chunks[1], buf, "Keyboard", &self.state.played, self.max_rows);
    }
}

/// Render a column of tones, most recent first
fn render_column(area: Rect, buf: &mut Buffer, label: &str, tones: &VecDeque<ToneActivity>, max: usize) {
    let mut lines = vec![Line::from(Span::styled(
        format!(" {} ", label),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))];

    for tone in tones.iter().rev().take(max) {
        let fade = tone_color(tone.time.elapsed());
        lines.push(Line::from(vec![
            Span::styled(format!("{:>3} ", tone.source()), Style::default().fg(Color::Cyan)),
            Span::styled(format!("{:<4}", tone.note), Style::default().fg(fade)),
            Span::styled(
                format!("{:>8.2} Hz {:>4.0}%", tone.frequency, tone.volume * 100.0),
                Style::default().fg(fade),
            ),
        ]));
    }

    Paragraph::new(lines).render(area, buf);
}

/// Get color based on tone age
fn tone_color(age: Duration) -> Color {
    if age < Duration::from_millis(200) {
        Color::White
    } else if age < Duration::from_millis(500) {
        Color::Gray
    } else {
        Color::DarkGray
    }
}
