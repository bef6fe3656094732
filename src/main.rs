// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use stepseq::audio::{ToneLog, TracingEmitter};
use stepseq::config::SessionFile;
use stepseq::control::keyboard::NOTE_KEYS;
use stepseq::control::KeyboardController;
use stepseq::music::PitchTable;
use stepseq::sequencer::{spawn_engine, Command, EngineEvent, EngineSettings, RunningEngine, NUM_STEPS};
use stepseq::ui;

const DEFAULT_LOG: &str = "stepseq.log";

fn print_usage() {
    println!("stepseq - Step Sequencer and Virtual Keyboard");
    println!();
    println!("Usage: stepseq [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <PATH>       Load session settings from a YAML file");
    println!("  --log <PATH>          Log file for the terminal UI (default {})", DEFAULT_LOG);
    println!("  --headless <PASSES>   Play PASSES passes without a UI, logging tones to stderr");
    println!("  --list-notes          Print the pitch table and note keys");
    println!("  --help                Show this help message");
    println!();
    println!("Without --headless the terminal UI starts. Set RUST_LOG to change log detail.");
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
struct Options {
    config: Option<PathBuf>,
    log: PathBuf,
    headless: Option<u32>,
    list_notes: bool,
    help: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config: None,
            log: PathBuf::from(DEFAULT_LOG),
            headless: None,
            list_notes: false,
            help: false,
        }
    }
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                let path = args.get(i + 1).ok_or_else(|| anyhow!("--config requires a path"))?;
                options.config = Some(PathBuf::from(path));
                i += 1;
            }
            "--log" => {
                let path = args.get(i + 1).ok_or_else(|| anyhow!("--log requires a path"))?;
                options.log = PathBuf::from(path);
                i += 1;
            }
            "--headless" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| anyhow!("--headless requires a number of passes"))?;
                let passes: u32 = value
                    .parse()
                    .map_err(|_| anyhow!("Invalid number of passes: {}", value))?;
                if passes == 0 {
                    bail!("--headless needs at least one pass");
                }
                options.headless = Some(passes);
                i += 1;
            }
            "--list-notes" => options.list_notes = true,
            "--help" | "-h" => options.help = true,
            other => bail!("Unknown option: {}", other),
        }
        i += 1;
    }

    Ok(options)
}

fn init_logging(options: &Options) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stepseq=info"));

    if options.headless.is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        // The terminal belongs to the UI, so logs go to a file
        let file = File::create(&options.log)
            .with_context(|| format!("Failed to create log file: {:?}", options.log))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}

fn list_notes(pitches: &PitchTable) {
    println!("{:<5} {:<6} {:>9}", "Key", "Note", "Hz");
    for (key, (note, hz)) in NOTE_KEYS.iter().zip(pitches.entries()) {
        println!("{:<5} {:<6} {:>9.2}", key, note, hz);
    }
}

/// Four-track pattern used by headless playback when none is configured
fn demo_pattern() -> Vec<Vec<Option<String>>> {
    let row = |hits: &[(usize, &str)]| {
        let mut cells = vec![None; NUM_STEPS];
        for &(step, note) in hits {
            cells[step] = Some(note.to_string());
        }
        cells
    };
    vec![
        row(&[(0, "C4"), (8, "C4")]),
        row(&[(4, "E4"), (12, "E4")]),
        row(&[(2, "G4"), (6, "G4"), (10, "G4"), (14, "A4")]),
        row(&[(15, "C5")]),
    ]
}

fn run_headless(mut settings: EngineSettings, pitches: Arc<PitchTable>, passes: u32) -> Result<()> {
    if settings.pattern.is_empty() {
        settings.pattern = demo_pattern();
    }
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    runtime.block_on(async move {
        let log = ToneLog::new();
        let RunningEngine {
            handle,
            mut events,
            task,
        } = spawn_engine(&settings, pitches, (TracingEmitter::new(), log.clone()))?;

        let target = passes as usize * NUM_STEPS;
        let mut steps = 0;
        handle.send(Command::Start)?;
        info!(passes, tempo = settings.tempo, "headless playback");

        while steps < target {
            match events.recv().await {
                Some(EngineEvent::StepAdvanced(_)) => steps += 1,
                // Looping off ends playback after one pass
                Some(EngineEvent::TransportChanged { running: false, .. }) => break,
                Some(_) => {}
                None => break,
            }
        }

        handle.send(Command::Stop)?;
        handle.shutdown()?;
        task.await.context("Engine task failed")?;

        println!(
            "Played {} steps ({} passes) at {} BPM: {} tones",
            steps,
            steps / NUM_STEPS,
            settings.tempo,
            log.len()
        );
        Ok::<(), anyhow::Error>(())
    })
}

fn run_tui(settings: EngineSettings, pitches: Arc<PitchTable>) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let guard = runtime.enter();

    let RunningEngine {
        handle,
        mut events,
        task,
    } = spawn_engine(&settings, Arc::clone(&pitches), TracingEmitter::new())?;
    let keyboard = KeyboardController::with_defaults(&pitches);

    let result = ui::run(&handle, &mut events, &pitches, &keyboard);

    // The loop may already be gone if the UI failed
    let _ = handle.shutdown();
    drop(guard);
    runtime.block_on(task).context("Engine task failed")?;
    result
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("Error: {}", err);
            print_usage();
            std::process::exit(1);
        }
    };

    if options.help {
        print_usage();
        return Ok(());
    }

    let pitches = Arc::new(PitchTable::standard());

    if options.list_notes {
        list_notes(&pitches);
        return Ok(());
    }

    init_logging(&options)?;

    let settings = match &options.config {
        Some(path) => SessionFile::load(path)?.to_settings(&pitches)?,
        None => EngineSettings::default(),
    };

    match options.headless {
        Some(passes) => run_headless(settings, pitches, passes),
        None => run_tui(settings, pitches),
    }
}
