//! tesselctl - Drive the tessel engine from the command line
//!
//! This tool allows external programs (including coding agents) to:
//! - Replay a scenario of windows, events and actions against the engine
//! - Inspect the resulting state and its invariant violations
//! - Print the default configuration
//!
//! # Examples
//!
//! ```bash
//! # Replay a scenario and print the final state as JSON
//! tesselctl simulate scenario.toml
//!
//! # Same, with a custom config and the event log
//! tesselctl simulate scenario.toml --config my.toml --events
//!
//! # Keep persisted state between runs
//! tesselctl simulate scenario.toml --state /tmp/tessel-state.json
//!
//! # Start a config file from the defaults
//! tesselctl default-config > ~/.config/tessel/config.toml
//! ```
//!
//! # Scenario format
//!
//! ```toml
//! desktops = 2
//! screens = [{ x = 0, y = 0, width = 1200, height = 800 }]
//!
//! [[windows]]
//! id = 1
//! class = "firefox"
//! title = "Mozilla Firefox"
//!
//! [[events]]
//! event = "window_focused"
//! window = 1
//!
//! [[events]]
//! event = "action"
//! action = "next_layout"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use tessel::config::Config;
use tessel::controller::{Controller, Event};
use tessel::driver::{Compositor, WindowHandle, WindowId};
use tessel::engine::Engine;
use tessel::event_log::EventLogEntry;
use tessel::headless::{HeadlessCompositor, HeadlessWindow};
use tessel::persist::{FileBackend, Persistence};
use tessel::snapshot::EngineSnapshot;
use tessel::types::Rect;

/// tesselctl - Drive the tessel tiling engine
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output raw JSON without pretty-printing
    #[arg(long, global = true)]
    raw: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario and print the final engine state
    Simulate {
        /// Scenario file (TOML)
        scenario: PathBuf,

        /// Config file (default: ~/.config/tessel/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Persist engine state in this JSON file instead of memory
        #[arg(long)]
        state: Option<PathBuf>,

        /// Include the event log in the output
        #[arg(long)]
        events: bool,
    },

    /// Print the default configuration as TOML
    DefaultConfig,
}

/// A recorded session to replay
#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(default = "default_desktops")]
    desktops: u32,
    screens: Vec<Rect>,
    #[serde(default)]
    windows: Vec<WindowSpec>,
    #[serde(default)]
    events: Vec<ScenarioStep>,
}

fn default_desktops() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct WindowSpec {
    id: u64,
    #[serde(default)]
    class: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    screen: usize,
    /// Omitted means desktop 1; 0 means all desktops
    desktop: Option<u32>,
    #[serde(default = "default_geometry")]
    geometry: Rect,
    #[serde(default)]
    floating: bool,
}

fn default_geometry() -> Rect {
    Rect::new(0, 0, 400, 300)
}

/// An event, plus the compositor-side changes that caused it
#[derive(Debug, Deserialize)]
struct ScenarioStep {
    #[serde(flatten)]
    event: Event,
    /// New geometry, as if the user moved or resized the window
    geometry: Option<Rect>,
    interactive: Option<bool>,
    minimized: Option<bool>,
    maximized: Option<bool>,
    fullscreen: Option<bool>,
    shaded: Option<bool>,
    screen: Option<usize>,
}

#[derive(Serialize)]
struct SimulationReport {
    state: EngineSnapshot,
    violations: Vec<String>,
    dropped_events: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    event_log: Option<Vec<EventLogEntry>>,
}

/// Headless handles kept by the simulator to play the compositor's part
struct Session {
    compositor: HeadlessCompositor,
    windows: Vec<HeadlessWindow>,
}

impl Session {
    fn window(&self, id: WindowId) -> Option<HeadlessWindow> {
        self.windows.iter().find(|w| w.id() == id).cloned()
    }

    /// Apply what the compositor would have changed before emitting `step`
    fn prepare(&mut self, step: &ScenarioStep) -> Result<()> {
        let Some(id) = step.event.window() else {
            return Ok(());
        };
        let Some(mut window) = self.window(id) else {
            bail!("Event {} refers to unknown window {}", step.event.name(), id.0);
        };
        if let Some(geometry) = step.geometry {
            window.move_to(geometry);
        }
        if let Some(interactive) = step.interactive {
            window.set_interactive(interactive);
        }
        if let Some(minimized) = step.minimized {
            window.set_minimized(minimized);
        }
        if let Some(maximized) = step.maximized {
            window.set_maximized(maximized);
        }
        if let Some(fullscreen) = step.fullscreen {
            window.set_fullscreen(fullscreen);
        }
        if let Some(shaded) = step.shaded {
            window.set_shaded(shaded);
        }
        if let Some(screen) = step.screen {
            window.set_screen(screen);
        }
        if let Event::WindowFocused { window } = step.event {
            self.compositor.set_active_window(window);
        }
        Ok(())
    }
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario {:?}", path))?;
    let scenario: Scenario =
        toml::from_str(&text).with_context(|| format!("Failed to parse scenario {:?}", path))?;
    if scenario.screens.is_empty() {
        bail!("Scenario {:?} defines no screens", path);
    }
    Ok(scenario)
}

fn simulate(
    scenario_path: &Path,
    config_path: Option<PathBuf>,
    state_path: Option<PathBuf>,
    with_events: bool,
) -> Result<SimulationReport> {
    let config = match config_path {
        Some(path) => Config::read(&path)?,
        None => Config::load(),
    };
    let scenario = load_scenario(scenario_path)?;

    let persistence = match state_path {
        Some(path) => {
            let backend = FileBackend::open(&path)
                .with_context(|| format!("Failed to open state file {:?}", path))?;
            Persistence::new(Box::new(backend))
        }
        None => Persistence::in_memory(),
    };

    let compositor = HeadlessCompositor::new(scenario.screens.clone(), scenario.desktops);
    let rules = config.rules.clone();
    let engine = Engine::new(config, Box::new(compositor.clone()), persistence);
    let controller = Controller::new(engine);
    let mut session = Session {
        compositor,
        windows: Vec::new(),
    };

    log::info!(
        "Replaying {} windows and {} events from {:?}",
        scenario.windows.len(),
        scenario.events.len(),
        scenario_path
    );

    for spec in &scenario.windows {
        let desktop = match spec.desktop {
            Some(0) => None,
            Some(d) => Some(d),
            None => Some(1),
        };
        let window = HeadlessWindow::new(spec.id, spec.geometry)
            .on_screen(spec.screen)
            .on_desktop(desktop)
            .floating(spec.floating)
            .classified(&spec.class, &spec.title, &rules);
        session.windows.push(window.clone());
        if controller.add_window(Box::new(window)).is_none() {
            log::info!("Window {} was not managed", spec.id);
        }
    }

    for step in &scenario.events {
        session.prepare(step)?;
        if !controller.dispatch(step.event) {
            log::warn!("Event {} was dropped", step.event.name());
        }
    }

    let Some(state) = controller.snapshot() else {
        bail!("Engine is still busy after the last event");
    };
    let log = controller.event_log();
    Ok(SimulationReport {
        violations: state.validate(),
        state,
        dropped_events: log.dropped_count(),
        event_log: with_events.then(|| log.entries()),
    })
}

fn print_json<T: Serialize>(value: &T, raw: bool) -> Result<()> {
    let text = if raw {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", text);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Simulate {
            scenario,
            config,
            state,
            events,
        } => {
            let report = simulate(&scenario, config, state, events)?;
            print_json(&report, cli.raw)?;
            if !report.violations.is_empty() {
                std::process::exit(1);
            }
        }
        Commands::DefaultConfig => {
            let text = toml::to_string_pretty(&Config::default())
                .context("Failed to serialize default config")?;
            print!("{}", text);
        }
    }
    Ok(())
}
