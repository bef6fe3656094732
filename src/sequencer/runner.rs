// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Async command loop.
//!
//! The engine lives inside one tokio task. Key presses, edits and timer
//! ticks all arrive through a single mpsc queue and are handled in order,
//! so no two handlers ever run at once.

use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{Command, EngineEvent, EngineSettings, EngineSnapshot, Result, SequencerEngine, TokioScheduler};
use crate::audio::ToneEmitter;
use crate::music::PitchTable;

/// Cloneable handle for sending commands and reading engine state
#[derive(Debug, Clone)]
pub struct EngineHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<EngineSnapshot>,
}

impl EngineHandle {
    /// Queue a command
    pub fn send(&self, command: Command) -> anyhow::Result<()> {
        self.commands
            .send(command)
            .map_err(|_| anyhow!("engine is no longer running"))
    }

    /// Ask the command loop to stop playback and exit
    pub fn shutdown(&self) -> anyhow::Result<()> {
        self.send(Command::Shutdown)
    }

    /// State as of the last handled command
    pub fn snapshot(&self) -> EngineSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Wait until the state changes
    pub async fn changed(&mut self) -> anyhow::Result<()> {
        self.snapshots.changed().await.map_err(|_| anyhow!("engine is no longer running"))
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

/// A spawned engine
pub struct RunningEngine {
    pub handle: EngineHandle,
    /// Notifications, in the order the engine produced them
    pub events: mpsc::UnboundedReceiver<EngineEvent>,
    /// The command loop task; ends after `Shutdown` or when every handle is dropped
    pub task: JoinHandle<()>,
}

/// Build an engine and run its command loop on the current tokio runtime.
///
/// Timers post ticks into the same queue as every other command.
pub fn spawn_engine<E>(settings: &EngineSettings, pitches: Arc<PitchTable>, emitter: E) -> Result<RunningEngine>
where
    E: ToneEmitter + Send + 'static,
{
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let scheduler = TokioScheduler::new(&command_tx);
    let engine = SequencerEngine::with_settings(settings, pitches, scheduler, emitter)?;
    let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());

    let task = tokio::spawn(command_loop(engine, command_rx, event_tx, snapshot_tx));
    info!(tempo = settings.tempo, "engine spawned");

    Ok(RunningEngine {
        handle: EngineHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        },
        events: event_rx,
        task,
    })
}

async fn command_loop<E: ToneEmitter>(
    mut engine: SequencerEngine<TokioScheduler, E>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<EngineEvent>,
    snapshots: watch::Sender<EngineSnapshot>,
) {
    while let Some(command) = commands.recv().await {
        let shutdown = command == Command::Shutdown;

        match engine.handle(command) {
            Ok(produced) => {
                for event in produced {
                    // Nobody listening is fine
                    let _ = events.send(event);
                }
            }
            Err(err) => warn!(%err, "command rejected"),
        }
        snapshots.send_replace(engine.snapshot());

        if shutdown {
            break;
        }
    }

    engine.stop();
    info!("engine stopped");
}
