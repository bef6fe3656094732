// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Step grid display widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::control::Cursor;
use crate::sequencer::EngineSnapshot;

/// Width of one step cell in columns
const CELL_WIDTH: usize = 4;

/// Widget for the track × step grid
pub struct StepGridWidget<'a> {
    state: &'a EngineSnapshot,
    cursor: Option<Cursor>,
    playhead: Option<usize>,
    block: Option<Block<'a>>,
}

impl<'a> StepGridWidget<'a> {
    /// Create a new grid widget
    pub fn new(state: &'a EngineSnapshot) -> Self {
        Self {
            state,
            cursor: None,
            playhead: None,
            block: None,
        }
    }

    /// Highlight the cell under the cursor
    pub fn cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Mark the step that sounded last
    pub fn playhead(mut self, step: Option<usize>) -> Self {
        self.playhead = step;
        self
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn header(&self) -> Line<'static> {
        let num_steps = self.state.cells.first().map_or(0, Vec::len);
        let mut spans = vec![Span::raw("      ")];
        for step in 0..num_steps {
            let style = if self.playhead == Some(step) {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else if step % 4 == 0 {
                Style::default().fg(Color::Gray)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(format!("{:<width$}", step + 1, width = CELL_WIDTH), style));
        }
        spans.push(Span::styled(" Vol", Style::default().fg(Color::DarkGray)));
        Line::from(spans)
    }

    fn row(&self, track: usize, cells: &[Option<String>]) -> Line<'static> {
        let recording_here = self.state.record_track == track;
        let label_style = if recording_here && self.state.recording {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else if recording_here {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };
        let marker = if recording_here { '●' } else { ' ' };

        let mut spans = vec![Span::styled(format!("T{} {}  ", track + 1, marker), label_style)];

        for (step, cell) in cells.iter().enumerate() {
            let text = match cell {
                Some(note) => format!("{:<width$}", note, width = CELL_WIDTH),
                None => format!("{:<width$}", "·", width = CELL_WIDTH),
            };

            let mut style = match cell {
                Some(_) => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                None if step % 4 == 0 => Style::default().fg(Color::Gray),
                None => Style::default().fg(Color::DarkGray),
            };
            if self.playhead == Some(step) {
                style = style.bg(Color::Green).fg(Color::Black);
            }
            if self.cursor == Some(Cursor { track, step }) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(text, style));
        }

        let volume = self.state.volumes.get(track).copied().unwrap_or(1.0);
        spans.push(Span::raw(" "));
        spans.push(Span::styled(volume_meter(volume, 8), Style::default().fg(Color::Green)));
        spans.push(Span::styled(
            format!(" {:>3}%", (volume * 100.0).round() as u32),
            Style::default().fg(Color::Gray),
        ));

        Line::from(spans)
    }
}

impl Widget for StepGridWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if self.state.cells.is_empty() {
            Paragraph::new("No tracks")
                .style(Style::default().fg(Color::DarkGray))
                .render(area, buf);
            return;
        }

        let mut lines = vec![self.header()];
        for (track, cells) in self.state.cells.iter().enumerate() {
            lines.push(self.row(track, cells));
        }
        Paragraph::new(lines).render(area, buf);
    }
}

/// Horizontal bar for a level in [0, 1]
pub fn volume_meter(volume: f32, width: usize) -> String {
    let filled = ((volume.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);
    "█".repeat(filled) + &"░".repeat(width - filled)
}
