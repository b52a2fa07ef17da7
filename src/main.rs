use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use log::LevelFilter;
use serde::Deserialize;

use traffic_run_state::state::{
    Game, GameStore, StateMachine, TransitionContext, DEFAULT_MACHINE_ID,
};

/// Replay a sequenced Traffic Run action log against a game store
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON array of sequenced entries
    #[arg(short, long)]
    log: PathBuf,

    /// Store snapshot to start from (empty store if absent)
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Where to write the replay report (stdout if absent)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only list games owned by this identity in the report summary
    #[arg(long)]
    owner: Option<String>,

    /// State machine identifier
    #[arg(long, default_value = DEFAULT_MACHINE_ID)]
    id: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// One entry of the sequencer's log.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Entry {
    caller: String,
    block_timestamp: i64,
    name: String,
    #[serde(default)]
    inputs: serde_json::Value,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    // Only fails if a logger was already installed.
    let _ = Builder::from_env(env).try_init();
}

fn summarize(game_id: &str, game: &Game) -> serde_json::Value {
    serde_json::json!({
        "gameId": game_id,
        "score": game.score,
        "isGameOver": game.is_game_over,
        "duration": game.duration(),
    })
}

/// Per-game summary lines, optionally restricted to one owner.
fn game_summaries(store: &GameStore, owner: Option<&str>) -> Vec<serde_json::Value> {
    match owner {
        Some(owner) => store
            .owned_by(owner)
            .map(|(id, game)| summarize(id, game))
            .collect(),
        None => store.iter().map(|(id, game)| summarize(id, game)).collect(),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut machine = match &args.snapshot {
        Some(path) => {
            let snapshot = fs::read_to_string(path)
                .with_context(|| format!("reading snapshot {}", path.display()))?;
            StateMachine::restore(args.id.clone(), &snapshot)
                .with_context(|| format!("loading snapshot {}", path.display()))?
        }
        None => StateMachine::new(args.id.clone()),
    };

    let raw = fs::read_to_string(&args.log)
        .with_context(|| format!("reading log {}", args.log.display()))?;
    let entries: Vec<Entry> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing log {}", args.log.display()))?;

    let mut emitted = Vec::new();
    for (index, entry) in entries.into_iter().enumerate() {
        let ctx = TransitionContext::new(entry.caller, entry.block_timestamp);
        let events = machine
            .apply_named(&entry.name, entry.inputs, &ctx)
            .with_context(|| format!("entry {} ({})", index, entry.name))?;
        for event in &events {
            log::info!("#{} {}: {}", index, event.name(), event);
        }
        emitted.push(serde_json::json!({"entry": index, "events": events}));
    }

    let report = serde_json::json!({
        "id": machine.id(),
        "digest": machine.digest(),
        "replayedAt": chrono::Utc::now().to_rfc3339(),
        "events": emitted,
        "games": game_summaries(machine.read(), args.owner.as_deref()),
        "store": machine.read().to_json(),
    });
    let rendered = serde_json::to_string_pretty(&report)?;

    match &args.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("writing report {}", path.display()))?,
        None => println!("{}", rendered),
    }

    log::info!(
        "replayed {} entries, {} games, digest {}",
        emitted.len(),
        machine.read().count(),
        machine.digest()
    );
    Ok(())
}
