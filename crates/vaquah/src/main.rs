//! vaquah: Hands-free web control, replayed from a sensor script.
//!
//! Camera frames / speech transcripts → classifier / parser → dispatcher → page
//!
//! Builds the pipeline with replay adapters over the mock storefront, feeds
//! it a JSON-lines script (from `--script` or stdin), and prints the effects
//! the page received.

mod script;

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use vaquah_core::clock::ManualClock;
use vaquah_core::config;
use vaquah_core::Pipeline;
use vaquah_surface::TreeSurface;

#[derive(Parser)]
#[command(name = "vaquah")]
#[command(about = "Replay hand-landmark and speech events against a mock storefront")]
struct Cli {
    /// Config file (defaults to config.json next to the executable)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-lines event script; reads stdin when omitted
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Turn gesture mode on before the first event
    #[arg(long)]
    gestures: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    if let Err(e) = run(Cli::parse()) {
        log::error!("Fatal: {e:#}");
        return Err(e);
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.unwrap_or_else(config::default_config_path);
    let cfg = config::load_config(&config_path);
    log::info!("Config loaded from {:?}", config_path);

    let contents = match &cli.script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("read script {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read script from stdin")?;
            buf
        }
    };
    let lines = script::parse_script(&contents)?;

    let surface = Arc::new(TreeSurface::storefront());
    let clock = Arc::new(ManualClock::new());
    let mut pipeline = Pipeline::from_config(
        &cfg,
        Box::new(Arc::clone(&surface)),
        clock.clone(),
        None,
        None,
    )?;

    if cli.gestures && !pipeline.enable_gesture_mode() {
        log::warn!("Gesture mode could not be enabled");
    }

    let report = script::replay(&mut pipeline, &clock, &lines);
    log::info!(
        "Replayed {} events, {} actions fired",
        report.events,
        report.actions.len()
    );

    let effects = surface.effects();
    let snapshot = pipeline.snapshot();
    if cli.json {
        let actions: Vec<_> = report
            .actions
            .iter()
            .map(|(t, a)| serde_json::json!({ "t": t, "action": a }))
            .collect();
        let out = serde_json::json!({
            "actions": actions,
            "effects": effects,
            "location": surface.location(),
            "assistant": snapshot,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for (t, action) in &report.actions {
            println!("{t:>8} ms  {action}");
        }
        for effect in &effects {
            println!("effect: {effect}");
        }
        println!("location: {}", surface.location());
        println!(
            "assistant: {:?} open={} listening={} wake_word={} gestures={}",
            snapshot.state,
            snapshot.is_open,
            snapshot.is_listening,
            snapshot.is_wake_word_listening,
            snapshot.is_gesture_mode_enabled,
        );
    }
    Ok(())
}
