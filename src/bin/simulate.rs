use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cat_mouse_server::config::{GameConfig, SpawnPolicy};
use cat_mouse_server::engine::GameEngine;
use cat_mouse_server::rng::GameRng;
use cat_mouse_server::types::{PlayerView, Role};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

/// Runs the engine headless with scripted bots and reports what happened.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    single: bool,
    #[arg(long, default_value_t = 4)]
    players: usize,
    #[arg(long, default_value_t = 10_000)]
    ticks: u64,
    #[arg(long)]
    seed: Option<u64>,
    /// Every N ticks one random bot leaves and a fresh one joins. 0 disables.
    #[arg(long, default_value_t = 0)]
    churn_every: u64,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    players: usize,
    ticks: u64,
    seed: u64,
    #[serde(rename = "churnEvery")]
    churn_every: u64,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResult {
    scenario: String,
    seed: u64,
    players: usize,
    ticks: u64,
    catches: usize,
    rotations: usize,
    #[serde(rename = "skippedRotations")]
    skipped_rotations: usize,
    joins: usize,
    leaves: usize,
    #[serde(rename = "highScore")]
    high_score: u32,
    #[serde(rename = "highScoreColor")]
    high_score_color: String,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "totalCatches")]
    total_catches: usize,
    #[serde(rename = "highScores")]
    high_scores: BTreeMap<String, u32>,
    scenarios: Vec<ScenarioResult>,
}

fn main() {
    tracing_subscriber::fmt()
        .json()
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let scenarios = resolve_scenarios(&cli);
    let mut results = Vec::new();

    for scenario in scenarios {
        info!(
            scenario = %scenario.name,
            seed = scenario.seed,
            players = scenario.players,
            "scenario started"
        );
        let result = run_scenario(&scenario);
        for anomaly in &result.anomalies {
            warn!(scenario = %scenario.name, anomaly = %anomaly, "anomaly detected");
        }
        info!(
            scenario = %scenario.name,
            catches = result.catches,
            rotations = result.rotations,
            high_score = result.high_score,
            "scenario finished"
        );
        match serde_json::to_string(&result) {
            Ok(line) => println!("{line}"),
            Err(err) => warn!(%err, "failed to encode scenario result"),
        }
        results.push(result);
    }

    let summary = build_run_summary(results);
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(err) = write_summary(path, &summary) {
            warn!(path = %path.display(), %err, "failed to write summary");
            std::process::exit(2);
        }
    }

    if summary.anomaly_count > 0 {
        std::process::exit(1);
    }
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = cli
        .seed
        .unwrap_or_else(|| GameRng::from_entropy().seed());
    if cli.single {
        return vec![Scenario {
            name: "single".to_string(),
            players: cli.players,
            ticks: cli.ticks,
            seed,
            churn_every: cli.churn_every,
        }];
    }

    [(1, 0), (2, 0), (4, 0), (7, 0), (9, 150)]
        .into_iter()
        .enumerate()
        .map(|(idx, (players, churn_every))| Scenario {
            name: format!("p{players}-churn{churn_every}"),
            players,
            ticks: cli.ticks,
            seed: seed.wrapping_add(idx as u64),
            churn_every,
        })
        .collect()
}

fn run_scenario(scenario: &Scenario) -> ScenarioResult {
    let config = GameConfig {
        spawn: SpawnPolicy::default(),
        ..GameConfig::default()
    };
    let mut engine = GameEngine::new(config, scenario.seed);
    let mut script = GameRng::new(scenario.seed ^ 0x5eed);

    let mut ids: Vec<String> = (0..scenario.players).map(|_| engine.join().id).collect();
    let mut result = ScenarioResult {
        scenario: scenario.name.clone(),
        seed: scenario.seed,
        players: scenario.players,
        ticks: scenario.ticks,
        catches: 0,
        rotations: 0,
        skipped_rotations: 0,
        joins: ids.len(),
        leaves: 0,
        high_score: 0,
        high_score_color: String::new(),
        anomalies: Vec::new(),
    };
    let mut best = 0;

    for tick in 1..=scenario.ticks {
        if scenario.churn_every > 0 && tick % scenario.churn_every == 0 && !ids.is_empty() {
            let leaving = ids.remove(script.pick_index(ids.len()));
            engine.leave(&leaving);
            ids.push(engine.join().id);
            result.leaves += 1;
            result.joins += 1;
        }

        let moves: Vec<(String, i64, i64)> = engine
            .players()
            .map(|player| {
                let (dx, dy) = bot_intent(&engine, player, &mut script);
                (player.id.clone(), dx, dy)
            })
            .collect();
        for (id, dx, dy) in moves {
            engine.apply_move(&id, dx, dy);
        }

        let report = engine.step();
        result.catches += report.catches.len();
        if report.timer_expired {
            if report.rotation.is_some() {
                result.rotations += 1;
            } else {
                result.skipped_rotations += 1;
            }
        }

        for message in collect_anomalies(&engine, best) {
            result.anomalies.push(format!("tick {tick}: {message}"));
        }
        best = engine.high_score().0;
    }

    let (high_score, color) = engine.high_score();
    result.high_score = high_score;
    result.high_score_color = color.to_string();
    result
}

/// The cat chases the nearest mouse; mice flee the cat with some jitter.
fn bot_intent(engine: &GameEngine, player: &PlayerView, script: &mut GameRng) -> (i64, i64) {
    let mut others = engine.players().filter(|other| other.id != player.id);
    let target = match player.role {
        Role::Cat => others
            .filter(|other| other.role == Role::Mouse)
            .min_by(|a, b| squared(player, a).total_cmp(&squared(player, b))),
        Role::Mouse => others.find(|other| other.role == Role::Cat),
    };
    let Some(target) = target else {
        return (jitter(script), jitter(script));
    };

    let toward = (
        axis_sign(target.x - player.x),
        axis_sign(target.y - player.y),
    );
    match player.role {
        Role::Cat => toward,
        Role::Mouse if script.pick_index(4) == 0 => (jitter(script), jitter(script)),
        Role::Mouse => (-toward.0, -toward.1),
    }
}

fn squared(a: &PlayerView, b: &PlayerView) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

fn axis_sign(delta: f32) -> i64 {
    if delta > 0.5 {
        1
    } else if delta < -0.5 {
        -1
    } else {
        0
    }
}

fn jitter(script: &mut GameRng) -> i64 {
    script.pick_index(3) as i64 - 1
}

fn collect_anomalies(engine: &GameEngine, previous_high_score: u32) -> Vec<String> {
    let mut anomalies = Vec::new();
    let cats = engine
        .players()
        .filter(|player| player.role == Role::Cat)
        .count();
    if cats > 1 {
        anomalies.push(format!("{cats} cats at once"));
    }
    for player in engine.players() {
        if !engine.arena().accepts_x(player.x) || !engine.arena().accepts_y(player.y) {
            anomalies.push(format!(
                "{} out of bounds at ({}, {})",
                player.id, player.x, player.y
            ));
        }
    }
    let timer = engine.timer();
    if timer <= -engine.config.timer_step() || timer > engine.config.round_seconds {
        anomalies.push(format!("timer out of range: {timer}"));
    }
    if engine.high_score().0 < previous_high_score {
        anomalies.push("high score decreased".to_string());
    }
    anomalies
}

fn build_run_summary(scenarios: Vec<ScenarioResult>) -> RunSummary {
    RunSummary {
        scenario_count: scenarios.len(),
        anomaly_count: scenarios.iter().map(|s| s.anomalies.len()).sum(),
        total_catches: scenarios.iter().map(|s| s.catches).sum(),
        high_scores: scenarios
            .iter()
            .map(|s| (s.scenario.clone(), s.high_score))
            .collect(),
        scenarios,
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let body = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    fs::write(path, body)
}
