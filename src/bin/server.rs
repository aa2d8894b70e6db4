use std::path::PathBuf;

use cat_mouse_server::config::{GameConfig, SpawnPolicy};
use cat_mouse_server::constants::{ROUND_SECONDS, TICK_MS};
use cat_mouse_server::server::{run, ServerOptions};
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Authoritative cat and mouse arena server")]
struct Cli {
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,
    /// Fixed seed for spawn points, colors and rotations.
    #[arg(long)]
    seed: Option<u64>,
    /// `center` or `random`.
    #[arg(long, default_value = "random", value_parser = parse_spawn)]
    spawn: SpawnPolicy,
    #[arg(long, default_value_t = TICK_MS)]
    tick_ms: u64,
    #[arg(long, default_value_t = ROUND_SECONDS)]
    round_seconds: f64,
    #[arg(long, env = "STATIC_DIR")]
    static_dir: Option<PathBuf>,
    #[arg(long)]
    log_json: bool,
}

fn parse_spawn(value: &str) -> Result<SpawnPolicy, String> {
    SpawnPolicy::parse(value).ok_or_else(|| format!("unknown spawn policy '{value}'"))
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_target(false)).init();
    } else {
        registry.with(fmt::layer().with_target(false)).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let options = ServerOptions {
        bind: cli.bind,
        port: cli.port,
        seed: cli.seed,
        static_dir: cli.static_dir,
        game: GameConfig {
            spawn: cli.spawn,
            tick_ms: cli.tick_ms,
            round_seconds: cli.round_seconds,
            ..GameConfig::default()
        },
    };
    run(options).await?;
    Ok(())
}
