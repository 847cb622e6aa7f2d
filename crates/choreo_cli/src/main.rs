//! Choreo CLI: inspect, scrub and simulate animation timelines
//!
//! ## Usage
//!
//! ```bash
//! choreo init intro.toml               # Write a sample scene
//! choreo inspect intro.toml --json     # Resolved schedule
//! choreo seek intro.toml 0.75          # Leaf values at a position
//! choreo play intro.toml --fps 30      # Simulate playback frame by frame
//! ```

mod config;
mod error;
mod report;
mod scene;

use anyhow::{Context, Result};
use choreo_animation::{AnimationOptions, AnimationScheduler, Position};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::SceneConfig;
use crate::report::NodeReport;
use crate::scene::Scene;

#[derive(Parser)]
#[command(name = "choreo")]
#[command(author, version, about = "Composable animation timelines", long_about = None)]
struct Cli {
    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sample scene file
    Init {
        /// Output path
        #[arg(default_value = "scene.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the resolved schedule of a scene
    Inspect {
        file: PathBuf,

        /// Emit JSON instead of a tree
        #[arg(long)]
        json: bool,
    },

    /// Jump to a progress value and print every leaf
    Seek {
        file: PathBuf,

        /// Progress in [0, 1]
        progress: f64,

        #[arg(long)]
        json: bool,
    },

    /// Simulate playback frame by frame
    Play {
        file: PathBuf,

        /// Frames per second, defaults to the scene's frame rate
        #[arg(long)]
        fps: Option<u32>,

        /// Play backwards from the end
        #[arg(long)]
        reverse: bool,

        /// Start from this progress instead
        #[arg(long)]
        seek: Option<f64>,

        /// Stop in place after this many frames
        #[arg(long, default_value_t = 10_000)]
        max_frames: usize,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init { path, force } => cmd_init(&path, force),
        Commands::Inspect { file, json } => cmd_inspect(&file, json),
        Commands::Seek {
            file,
            progress,
            json,
        } => cmd_seek(&file, progress, json),
        Commands::Play {
            file,
            fps,
            reverse,
            seek,
            max_frames,
        } => cmd_play(&file, fps, reverse, seek, max_frames),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load(file: &Path) -> Result<(SceneConfig, Scene)> {
    let config = SceneConfig::load(file)?;
    let scene = Scene::build(&config)
        .with_context(|| format!("Failed to build scene from {}", file.display()))?;
    Ok((config, scene))
}

fn print_report(report: &NodeReport, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        println!("{text}");
    } else {
        print!("{}", report.render());
    }
    Ok(())
}

fn print_readings(scene: &Scene) {
    for (label, reading) in scene.readings() {
        println!("  {label} = {reading}");
    }
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Pass --force to overwrite it.",
            path.display()
        );
    }
    let text = SceneConfig::sample().to_toml()?;
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote sample scene");
    Ok(())
}

fn cmd_inspect(file: &Path, json: bool) -> Result<()> {
    let (config, scene) = load(file)?;
    let report = NodeReport::new(&config.root, scene.timeline.root());
    if !json {
        println!(
            "{}: {:.3}s, {} nodes",
            file.display(),
            scene.timeline.duration(),
            report.count()
        );
    }
    print_report(&report, json)
}

fn cmd_seek(file: &Path, progress: f64, json: bool) -> Result<()> {
    let (config, mut scene) = load(file)?;
    scene.timeline.set_position(Position::from_progress(progress));

    let report = NodeReport::new(&config.root, scene.timeline.root());
    print_report(&report, json)?;
    if !json {
        println!("at {}:", scene.timeline.position());
        print_readings(&scene);
    }
    Ok(())
}

fn cmd_play(
    file: &Path,
    fps: Option<u32>,
    reverse: bool,
    seek: Option<f64>,
    max_frames: usize,
) -> Result<()> {
    let (config, scene) = load(file)?;
    let (mut timeline, probes, completions) = scene.into_parts();

    let start = match (seek, reverse) {
        (Some(progress), _) => Some(Position::from_progress(progress)),
        (None, true) => Some(Position::End),
        (None, false) => None,
    };
    if let Some(position) = start {
        timeline.set_position(position);
    }
    timeline.play(AnimationOptions::new().reverse(reverse));

    let engine = config.engine.to_engine_config()?;
    let mut scheduler = AnimationScheduler::with_config(&engine);
    if let Some(fps) = fps {
        scheduler.set_target_fps(fps);
    }
    let id = scheduler.add(timeline);
    let interval = scheduler.frame_interval();

    let print_frame = |frame: usize, position: Position| {
        let readings: Vec<String> = probes
            .iter()
            .map(|probe| format!("{}={}", probe.label, probe.reading.display()))
            .collect();
        println!(
            "{frame:>5} {:>8.3}s {:>8}  {}",
            frame as f64 * interval,
            position.to_string(),
            readings.join(" ")
        );
    };

    let mut frame = 0;
    if let Some(timeline) = scheduler.get(id) {
        print_frame(frame, timeline.position());
    }
    while scheduler.has_active_animations() && frame < max_frames {
        scheduler.step();
        frame += 1;
        if let Some(timeline) = scheduler.get(id) {
            print_frame(frame, timeline.position());
        }
    }

    if scheduler.has_active_animations() {
        tracing::info!(max_frames, "frame limit reached, stopping in place");
        if let Some(timeline) = scheduler.get_mut(id) {
            timeline.stop(None);
        }
    }

    let finished = scheduler.remove_finished();
    tracing::debug!(finished, "playback loop done");
    match completions.borrow().first() {
        Some(true) => println!("completed after {frame} frames"),
        Some(false) => println!("interrupted after {frame} frames"),
        None => println!("still running after {frame} frames"),
    }
    Ok(())
}
