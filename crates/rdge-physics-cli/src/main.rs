// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! `rdge-sim`: run physics scenes from the command line.
//!
//! # Usage
//! ```text
//! rdge-sim run <scene.json> [--steps N] [--dt S] [--json]
//! rdge-sim demo <tumbler|pyramid|rain> [--steps N] [--json]
//! rdge-sim export <tumbler|pyramid|rain> [--out FILE]
//! ```
//!
//! Logs go to stderr (`RUST_LOG` overrides the `info` default); reports go to
//! stdout. Exits non-zero on any error.

// The CLI is expected to print to stdout.
#![allow(clippy::print_stdout)]

mod demo;
mod report;
mod scene;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::demo::Demo;
use crate::report::simulate;
use crate::scene::Scene;

#[derive(Parser, Debug)]
#[command(name = "rdge-sim", author, version, about = "Step 2D physics scenes and report contacts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a JSON scene file.
    Run(RunArgs),
    /// Run a built-in scene.
    Demo(DemoArgs),
    /// Write a built-in scene as JSON.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct StepArgs {
    /// Number of steps to simulate.
    #[arg(long, default_value_t = 300)]
    steps: u32,
    /// Timestep in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,
    /// Print a JSON summary instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Scene file.
    scene: PathBuf,
    #[command(flatten)]
    step: StepArgs,
}

#[derive(Args, Debug)]
struct DemoArgs {
    #[arg(value_enum)]
    demo: Demo,
    #[command(flatten)]
    step: StepArgs,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(value_enum)]
    demo: Demo,
    /// Output file; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => {
            let text = fs::read_to_string(&args.scene)
                .with_context(|| format!("failed to read scene {}", args.scene.display()))?;
            let scene: Scene = serde_json::from_str(&text)
                .with_context(|| format!("failed to parse scene {}", args.scene.display()))?;
            info!(path = %args.scene.display(), "scene loaded");
            run(&scene, &args.step)
        }
        Commands::Demo(args) => run(&args.demo.scene(), &args.step),
        Commands::Export(args) => export(args),
    }
}

fn run(scene: &Scene, step: &StepArgs) -> Result<()> {
    let summary = simulate(scene, step.steps, step.dt)?;
    if step.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.render());
    }
    Ok(())
}

fn export(args: ExportArgs) -> Result<()> {
    let text = serde_json::to_string_pretty(&args.demo.scene())?;
    match args.out {
        Some(path) => {
            fs::write(&path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), demo = ?args.demo, "scene exported");
        }
        None => println!("{text}"),
    }
    Ok(())
}
