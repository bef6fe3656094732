// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Terminal UI for the step sequencer.
//!
//! Provides a ratatui-based terminal interface with a transport bar, the
//! step grid with playhead and mixer levels, the note keyboard, and recent
//! tone activity. The UI never touches engine state directly: it sends
//! commands and redraws from the engine's snapshot.

mod activity;
mod grid;
mod transport;

pub use activity::{ActivityState, ActivityWidget, ToneActivity};
pub use grid::{volume_meter, StepGridWidget};
pub use transport::TransportWidget;

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use crate::control::keyboard::NOTE_KEYS;
use crate::control::{format_shortcut, ControlAction, Cursor, KeyboardController};
use crate::music::{KeyboardKey, PitchTable};
use crate::sequencer::{EngineEvent, EngineHandle, EngineSnapshot, NUM_STEPS};

/// How long a status message stays visible
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// How long a played key stays lit
const KEY_FLASH: Duration = Duration::from_millis(200);

/// UI state
#[derive(Debug, Clone)]
pub struct UiState {
    /// Engine state as of the last refresh
    pub engine: EngineSnapshot,
    /// Selected grid cell
    pub cursor: Cursor,
    /// Step that sounded last, while running
    pub playhead: Option<usize>,
    /// Recent tones
    pub activity: ActivityState,
    /// Help overlay visible
    pub show_help: bool,
    /// Status message
    pub status_message: Option<String>,
    /// Status message timestamp
    pub status_time: Option<Instant>,
}

impl UiState {
    pub fn new(engine: EngineSnapshot) -> Self {
        Self {
            engine,
            cursor: Cursor::default(),
            playhead: None,
            activity: ActivityState::new(),
            show_help: false,
            status_message: None,
            status_time: None,
        }
    }

    /// Set a status message that will be displayed temporarily
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_time = Some(Instant::now());
    }

    /// Clear expired status message
    pub fn clear_expired_status(&mut self) {
        if let Some(time) = self.status_time {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
                self.status_time = None;
            }
        }
    }

    /// Update from an engine notification
    pub fn apply(&mut self, event: &EngineEvent) {
        match event {
            // Cells are re-read from the next snapshot
            EngineEvent::GridChanged => {}
            EngineEvent::TransportChanged { running, .. } => {
                self.playhead = None;
                self.set_status(if *running { "Playing" } else { "Stopped" });
            }
            EngineEvent::StepAdvanced(next) => {
                let num_steps = self.engine.cells.first().map_or(NUM_STEPS, Vec::len).max(1);
                self.playhead = Some((next + num_steps - 1) % num_steps);
            }
            EngineEvent::ToneTriggered {
                track,
                note,
                frequency,
                volume,
            } => {
                self.activity
                    .push(ToneActivity::new(*track, note.as_str(), *frequency, *volume));
            }
            EngineEvent::TempoChanged(tempo) => self.set_status(format!("Tempo: {} BPM", tempo)),
            EngineEvent::LoopingChanged(on) => {
                self.set_status(if *on { "Loop on" } else { "Loop off: stop after one pass" })
            }
            EngineEvent::RecordingChanged(on) => {
                self.set_status(if *on { "Recording" } else { "Recording off" })
            }
            EngineEvent::RecordTrackChanged(track) => {
                self.set_status(format!("Recording into track {}", track + 1))
            }
            EngineEvent::VolumeChanged { track, value } => {
                self.set_status(format!("Track {} volume {:.0}%", track + 1, value * 100.0))
            }
        }
    }

    /// Notes played on the keyboard within the flash window
    fn lit_notes(&self) -> Vec<&str> {
        self.activity
            .played
            .iter()
            .filter(|t| t.time.elapsed() < KEY_FLASH)
            .map(|t| t.note.as_str())
            .collect()
    }
}

/// Terminal UI application
pub struct App {
    /// Terminal handle
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Note keys with their terminal key, in keyboard order
    keys: Vec<(char, KeyboardKey)>,
    /// Target frame rate
    frame_rate: u32,
    /// Whether to continue running
    running: bool,
}

impl App {
    /// Set up the terminal
    pub fn new(pitches: &PitchTable) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            keys: NOTE_KEYS.iter().copied().zip(pitches.keyboard()).collect(),
            frame_rate: 60,
            running: true,
        })
    }

    /// Set frame rate
    pub fn set_frame_rate(&mut self, fps: u32) {
        self.frame_rate = fps.clamp(1, 120);
    }

    /// Check if running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the app
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Poll for events with timeout
    pub fn poll_event(&self) -> io::Result<Option<Event>> {
        let timeout = Duration::from_millis(1000 / self.frame_rate as u64);
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }

    /// Draw the UI
    pub fn draw(&mut self, state: &UiState, keyboard: &KeyboardController) -> io::Result<()> {
        let keys = &self.keys;
        self.terminal.draw(|frame| {
            let area = frame.area();

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3), // Transport
                    Constraint::Min(7),    // Grid
                    Constraint::Length(3), // Keyboard
                    Constraint::Length(7), // Tone activity
                    Constraint::Length(1), // Status bar
                ])
                .split(area);

            frame.render_widget(
                TransportWidget::new(&state.engine)
                    .block(Block::default().borders(Borders::ALL).title(" Transport ")),
                chunks[0],
            );

            frame.render_widget(
                StepGridWidget::new(&state.engine)
                    .cursor(state.cursor)
                    .playhead(state.playhead)
                    .block(Block::default().borders(Borders::ALL).title(" Steps ")),
                chunks[1],
            );

            render_keyboard(frame, chunks[2], keys, &state.lit_notes());

            frame.render_widget(ActivityWidget::new(&state.activity).max_rows(5), chunks[3]);

            render_status_bar(frame, chunks[4], state);

            if state.show_help {
                render_help_overlay(frame, area, keyboard);
            }
        })?;

        Ok(())
    }

    /// Restore the terminal
    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Run the terminal UI until the user quits.
///
/// Drains engine notifications, redraws from the latest snapshot and turns
/// key presses into commands.
pub fn run(
    handle: &EngineHandle,
    events: &mut UnboundedReceiver<EngineEvent>,
    pitches: &PitchTable,
    keyboard: &KeyboardController,
) -> Result<()> {
    let mut app = App::new(pitches)?;
    let mut state = UiState::new(handle.snapshot());
    info!("terminal UI started");

    while app.is_running() {
        while let Ok(event) = events.try_recv() {
            state.apply(&event);
        }
        state.engine = handle.snapshot();
        state.clear_expired_status();

        app.draw(&state, keyboard)?;

        let Some(Event::Key(key)) = app.poll_event()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if let Some(action) = keyboard.process_key(key.code, key.modifiers) {
            handle_action(&mut app, &mut state, handle, action)?;
        }
    }

    info!("terminal UI closed");
    Ok(())
}

/// Apply one control action
fn handle_action(app: &mut App, state: &mut UiState, handle: &EngineHandle, action: ControlAction) -> Result<()> {
    debug!(?action, "control action");
    match action {
        ControlAction::Quit => app.quit(),
        ControlAction::ToggleHelp => state.show_help = !state.show_help,
        ref nav if nav.is_navigation() => state.cursor.navigate(nav),
        other => {
            if let Some(command) = other.command(state.cursor, &state.engine) {
                handle.send(command)?;
            }
        }
    }
    Ok(())
}

/// Render the note keyboard strip
fn render_keyboard(frame: &mut Frame, area: Rect, keys: &[(char, KeyboardKey)], lit: &[&str]) {
    let block = Block::default().borders(Borders::ALL).title(" Keyboard ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut spans = Vec::new();
    for (key, k) in keys {
        let mut style = if k.black {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Black).bg(Color::White)
        };
        if lit.contains(&k.note.as_str()) {
            style = style.bg(Color::Green).add_modifier(Modifier::BOLD);
        }
        spans.push(Span::styled(format!(" {}:{:<3} ", key, k.note), style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

/// Render status bar
fn render_status_bar(frame: &mut Frame, area: Rect, state: &UiState) {
    let text = if let Some(ref msg) = state.status_message {
        Span::styled(msg.as_str(), Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            " Space: Play/Stop | Enter: Toggle Step | r: Record | l: Loop | ?: Help | q: Quit",
            Style::default().fg(Color::DarkGray),
        )
    };

    frame.render_widget(Paragraph::new(text), area);
}

/// Render help overlay from the active key bindings
fn render_help_overlay(frame: &mut Frame, area: Rect, keyboard: &KeyboardController) {
    const ORDER: [&str; 6] = ["Transport", "Tempo", "Grid", "Mixer", "Navigation", "UI"];

    let grouped = keyboard.bindings_by_category();
    let mut lines = Vec::new();
    for category in ORDER {
        let Some(bindings) = grouped.get(category) else {
            continue;
        };
        lines.push(Line::from(Span::styled(category, Style::default().add_modifier(Modifier::BOLD))));
        for binding in bindings {
            lines.push(Line::from(format!(
                "  {:<12}{}",
                format_shortcut(&binding.shortcut),
                binding.description
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from("  a w s e d f t g y h u j k   play C4..C5"));

    let width = 50.min(area.width.saturating_sub(4));
    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let help_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, help_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);
    frame.render_widget(Paragraph::new(lines), inner);
}
