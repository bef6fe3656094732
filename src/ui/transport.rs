// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Transport display widget.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Paragraph, Widget},
};

use crate::sequencer::EngineSnapshot;
use crate::timing::StepClock;

/// Transport widget for displaying playback state
pub struct TransportWidget<'a> {
    state: &'a EngineSnapshot,
    block: Option<Block<'a>>,
}

impl<'a> TransportWidget<'a> {
    /// Create a new transport widget
    pub fn new(state: &'a EngineSnapshot) -> Self {
        Self { state, block: None }
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for TransportWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(9),  // Play/Stop
                Constraint::Length(7),  // Record
                Constraint::Length(9),  // Loop
                Constraint::Length(10), // Step
                Constraint::Length(10), // Tempo
                Constraint::Min(0),     // Interval
            ])
            .split(area);

        let (indicator, style) = if self.state.running {
            ("▶ PLAY", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        } else {
            ("■ STOP", Style::default().fg(Color::Yellow))
        };
        Paragraph::new(indicator).style(style).render(chunks[0], buf);

        let (rec, style) = if self.state.recording {
            ("● REC", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        } else {
            ("○ rec", Style::default().fg(Color::DarkGray))
        };
        Paragraph::new(rec).style(style).render(chunks[1], buf);

        let (looping, style) = if self.state.looping {
            ("↻ LOOP", Style::default().fg(Color::Cyan))
        } else {
            ("→ ONCE", Style::default().fg(Color::Gray))
        };
        Paragraph::new(looping).style(style).render(chunks[2], buf);

        let num_steps = self.state.cells.first().map_or(0, Vec::len);
        Paragraph::new(format!("{:02}/{:02}", self.state.current_step + 1, num_steps))
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .render(chunks[3], buf);

        Paragraph::new(format!("{} BPM", self.state.tempo))
            .style(Style::default().fg(Color::Magenta))
            .render(chunks[4], buf);

        if let Ok(clock) = StepClock::new(self.state.tempo, num_steps.max(1)) {
            Paragraph::new(format!("{:.1} ms/step", clock.interval_ms()))
                .style(Style::default().fg(Color::DarkGray))
                .render(chunks[5], buf);
        }
    }
}
