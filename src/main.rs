//! Console host for the round engine. Prints rounds, outcomes and the final summary
//! as JSON lines; answers come from stdin or a simulated player.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use playmatch::config::{EngineConfig, load_config};
use playmatch::game::score::{Grading, ScoreEngine};
use playmatch::game::{ConceptCatalog, GameKind, GameSession, RoundGenerator};
use playmatch::Result;

#[derive(Parser, Debug)]
#[command(name = "playmatch", version, about = "Matching-game round engine")]
struct Args {
    /// mood, rhythm or sequence
    #[arg(short, long, default_value = "mood")]
    game: String,

    /// Song keyword list for the rhythm game
    #[arg(long)]
    song: Option<String>,

    /// Catalog TOML document replacing the built-in catalog
    #[arg(long)]
    catalog: Option<PathBuf>,

    #[arg(long)]
    rounds: Option<u32>,

    #[arg(long)]
    options: Option<usize>,

    /// Seed for reproducible sessions
    #[arg(long)]
    seed: Option<u64>,

    /// Config file (overrides PLAYMATCH_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Answer with a simulated player instead of reading stdin
    #[arg(long)]
    auto: bool,

    /// Sequencing game: attempts needed
    #[arg(long, default_value_t = 1)]
    attempts: u32,

    /// Sequencing game: completion time in milliseconds
    #[arg(long, default_value_t = 0)]
    elapsed_ms: u64,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum HostEvent<'a, T: Serialize> {
    Round { number: u32, round: &'a T },
    Outcome { outcome: &'a T },
    Summary { summary: &'a T },
}

fn emit<T: Serialize>(event: &HostEvent<'_, T>) -> Result<()> {
    let line = serde_json::to_string(event)?;
    let mut out = io::stdout().lock();
    writeln!(out, "{}", line)?;
    out.flush()?;
    Ok(())
}

fn init_tracing(config: &EngineConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn make_generator(seed: Option<u64>) -> RoundGenerator<StdRng> {
    match seed {
        Some(seed) => RoundGenerator::seeded(seed),
        None => RoundGenerator::new(),
    }
}

fn run_sequencing(args: &Args) -> Result<()> {
    let mut engine = ScoreEngine::new(Grading::TimeAndAttempts);
    engine.set_attempts(args.attempts);
    engine.set_elapsed_ms(args.elapsed_ms);
    let summary = serde_json::json!({
        "kind": GameKind::Sequencing,
        "state": engine.state(),
        "accuracy": engine.accuracy(),
        "score": engine.score(),
        "tier": engine.finalize(),
        "unlock_earned": engine.unlock_earned(),
    });
    emit(&HostEvent::Summary { summary: &summary })
}

fn read_answer(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    option_count: usize,
) -> Result<Option<usize>> {
    for line in lines {
        let line = line?;
        match line.trim().parse::<usize>() {
            Ok(index) if index < option_count => return Ok(Some(index)),
            _ => eprintln!("Enter an option number from 0 to {}", option_count - 1),
        }
    }
    Ok(None)
}

fn player_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ 0x5eed),
        None => StdRng::from_os_rng(),
    }
}

fn run_matching(args: &Args, config: &EngineConfig, kind: GameKind) -> Result<()> {
    let catalog = match &args.catalog {
        Some(path) => ConceptCatalog::from_toml_file(path)?,
        None => kind.catalog(args.song.as_deref())?,
    };
    let mut setup = config.session_setup(kind);
    if let Some(rounds) = args.rounds {
        setup.rounds = rounds.max(1);
    }
    if let Some(options) = args.options {
        setup.option_count = options;
    }

    let mut session = GameSession::new(
        setup,
        catalog,
        config.asset_validator()?,
        make_generator(args.seed),
    );
    let mut player = player_rng(args.seed);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !session.is_finished() {
        let option_count = session.next_round()?.options.len();
        let number = session.round_number();
        if let Some(round) = session.current_round() {
            emit(&HostEvent::Round { number, round })?;
        }

        let choice = if args.auto {
            player.random_range(0..option_count)
        } else {
            match read_answer(&mut lines, option_count)? {
                Some(index) => index,
                None => break,
            }
        };
        if let Some(outcome) = session.select(number, choice) {
            emit(&HostEvent::Outcome { outcome: &outcome })?;
        }
    }

    let summary = session.summary();
    info!("Session complete: {} stars", summary.tier.stars);
    emit(&HostEvent::Summary { summary: &summary })
}

fn main() {
    let args = Args::parse();
    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("playmatch: {}", e);
            std::process::exit(2);
        }
    };
    init_tracing(&config);

    let Some(kind) = GameKind::from_code(&args.game) else {
        eprintln!("playmatch: unknown game '{}' (mood, rhythm, sequence)", args.game);
        std::process::exit(2);
    };

    let result = if kind.is_matching() {
        run_matching(&args, &config, kind)
    } else {
        run_sequencing(&args)
    };
    if let Err(e) = result {
        eprintln!("playmatch: {}", e);
        std::process::exit(1);
    }
}
