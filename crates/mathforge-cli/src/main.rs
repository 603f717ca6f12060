mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;

use mathforge_api::{AppState, Dispatcher};
use mathforge_core::{Category, Difficulty, OperationKind, QuizBook};
use mathforge_history::RingHistory;

use crate::config::Config;

#[derive(Parser)]
#[command(
    name = "mathforge",
    version,
    about = "MathForge - arithmetic, algebra, geometry, statistics and quizzes over JSON"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Address to bind (overrides [server] host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides [server] port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Evaluate one operation and print the JSON result
    Run {
        /// add, subtract, multiply, divide, linear, quadratic, circle,
        /// rectangle, triangle, cube, sphere or statistics
        operation: String,

        /// Request body as JSON, e.g. '{"a": 2, "b": 3}'
        #[arg(default_value = "{}")]
        body: String,
    },
    /// Print a generated quiz question
    Quiz {
        /// arithmetic, algebra or geometry (random when omitted)
        #[arg(short = 't', long = "type")]
        category: Option<String>,

        /// easy, medium or hard
        #[arg(short, long)]
        difficulty: Option<String>,
    },
    /// Show the config file path and effective values
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config()?;

    match cli.command {
        Commands::Serve { host, port } => cmd_serve(cfg, host, port),
        Commands::Run { operation, body } => cmd_run(&cfg, &operation, &body),
        Commands::Quiz {
            category,
            difficulty,
        } => cmd_quiz(&cfg, category.as_deref(), difficulty.as_deref()),
        Commands::Config => cmd_config(&cfg),
    }
}

fn build_dispatcher(cfg: &Config) -> Result<Dispatcher> {
    let difficulty: Difficulty = cfg
        .quiz
        .default_difficulty
        .parse()
        .map_err(anyhow::Error::msg)
        .context("invalid [quiz] default_difficulty")?;

    let book = match &cfg.quiz.secret {
        Some(secret) => QuizBook::new(secret.as_bytes()),
        None => {
            info!("no quiz secret configured, answer ids will not survive a restart");
            QuizBook::with_random_secret()
        }
    }
    .with_tolerance(cfg.quiz.tolerance)
    .with_default_difficulty(difficulty);

    Ok(Dispatcher::new(
        Arc::new(RingHistory::new(cfg.history.capacity)),
        Arc::new(book),
    ))
}

fn cmd_serve(mut cfg: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        cfg.server.host = host;
    }
    if let Some(port) = port {
        cfg.server.port = port;
    }
    let addr = cfg.server.socket_addr()?;
    let state = AppState::new(build_dispatcher(&cfg)?);
    info!(capacity = cfg.history.capacity, "history log ready");

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(mathforge_api::serve(addr, state))
}

fn cmd_run(cfg: &Config, operation: &str, body: &str) -> Result<()> {
    let kind: OperationKind = operation.parse().map_err(anyhow::Error::msg)?;
    let body: Value = serde_json::from_str(body).context("body is not valid JSON")?;

    let dispatcher = build_dispatcher(cfg)?;
    let result = dispatcher.run(kind, body)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn cmd_quiz(cfg: &Config, category: Option<&str>, difficulty: Option<&str>) -> Result<()> {
    let dispatcher = build_dispatcher(cfg)?;
    let q = dispatcher.generate_quiz(category, difficulty)?;
    println!("[{} / {}] {}", q.category, q.difficulty, q.question);
    if let Some(unit) = q.unit {
        println!("Unit:      {unit}");
    }
    println!("Answer id: {}", q.answer_id);
    Ok(())
}

fn cmd_config(cfg: &Config) -> Result<()> {
    println!("Config: {}", config::show_config_path());
    println!();
    println!("[server]");
    println!("  host = {}", cfg.server.host);
    println!("  port = {}", cfg.server.port);
    println!();
    println!("[history]");
    println!("  capacity = {}", cfg.history.capacity);
    println!();
    println!("[quiz]");
    println!(
        "  secret = {}",
        if cfg.quiz.secret.is_some() {
            "(set)"
        } else {
            "(random per process)"
        }
    );
    println!("  tolerance = {}", cfg.quiz.tolerance);
    println!("  default_difficulty = {}", cfg.quiz.default_difficulty);
    println!(
        "  types = {}",
        Category::ALL
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}
