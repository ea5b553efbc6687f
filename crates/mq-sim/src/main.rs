//! MathQuest session simulator
//!
//! Usage:
//!   mq-sim arcade   --skill 1150 --accuracy 0.9     - Crystal Pop round
//!   mq-sim level    --level 4 --think-ms 4000       - Timed level attempt
//!   mq-sim practice --level 2 --catalog levels.yaml - Untimed practice run
//!
//! A manual clock advances by the think time before every answer, so a run
//! finishes instantly and is reproducible with `--seed`.

mod player;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use mq_core::{AnswerMode, INITIAL_SKILL_RATING, LevelCatalog, LevelDefinition};
use mq_session::{
    ArcadeConfig, ArcadeResult, ArcadeSession, Clock, LevelAttemptResult, LevelSession,
    ManualClock, PracticeResult, PracticeSession, SessionError,
};

use crate::player::SimPlayer;

/// Hard stop on submissions per run
const MAX_SUBMISSIONS: u32 = 10_000;

#[derive(Parser, Debug)]
#[command(name = "mq-sim", about = "Simulate MathQuest sessions")]
struct Cli {
    #[command(subcommand)]
    mode: Mode,

    /// RNG seed for questions and the simulated player
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Player skill rating (arcade difficulty)
    #[arg(long, global = true, default_value_t = INITIAL_SKILL_RATING)]
    skill: f64,

    /// Level number (level and practice)
    #[arg(long, global = true, default_value_t = 1)]
    level: u32,

    /// Level catalog file (.json, .yaml, .yml)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Probability of answering correctly
    #[arg(long, global = true, default_value_t = 0.8)]
    accuracy: f64,

    /// Milliseconds the player spends on each question
    #[arg(long, global = true, default_value_t = 2_500)]
    think_ms: i64,

    /// Arcade round length
    #[arg(long, global = true)]
    duration_secs: Option<u64>,

    /// Answer format for level runs
    #[arg(long, global = true, value_enum, default_value_t = ModeArg::MultipleChoice)]
    answer_mode: ModeArg,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Crystal Pop arcade round
    Arcade,
    /// Timed level attempt
    Level,
    /// Untimed practice run
    Practice,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ModeArg {
    MultipleChoice,
    NumberEntry,
}

impl From<ModeArg> for AnswerMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::MultipleChoice => AnswerMode::MultipleChoice,
            ModeArg::NumberEntry => AnswerMode::NumberEntry,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    validate(&cli)?;

    let json = match cli.mode {
        Mode::Arcade => serde_json::to_string_pretty(&run_arcade(&cli)?)?,
        Mode::Level => serde_json::to_string_pretty(&run_level(&cli)?)?,
        Mode::Practice => serde_json::to_string_pretty(&run_practice(&cli)?)?,
    };
    println!("{}", json);
    Ok(())
}

fn validate(cli: &Cli) -> Result<()> {
    if !(0.0..=1.0).contains(&cli.accuracy) {
        bail!("--accuracy must be between 0 and 1, got {}", cli.accuracy);
    }
    if cli.think_ms < 0 {
        bail!("--think-ms must not be negative");
    }
    Ok(())
}

/// Session seed and player RNG, both derived from `--seed` when given
fn seeds(cli: &Cli) -> (u64, SimPlayer) {
    let mut root = match cli.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_os_rng(),
    };
    let session_seed = rand::Rng::random(&mut root);
    let player_rng = ChaCha8Rng::seed_from_u64(rand::Rng::random(&mut root));
    (session_seed, SimPlayer::new(player_rng, cli.accuracy))
}

fn load_level(cli: &Cli) -> Result<LevelDefinition> {
    let catalog = match &cli.catalog {
        Some(path) => LevelCatalog::load(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => LevelCatalog::standard(),
    };
    Ok(catalog.get(cli.level)?.clone())
}

fn manual_clock() -> Arc<ManualClock> {
    ManualClock::shared(mq_session::SystemClock.now_ms())
}

fn run_arcade(cli: &Cli) -> Result<ArcadeResult> {
    let (session_seed, mut player) = seeds(cli);
    let clock = manual_clock();

    let mut config = ArcadeConfig::for_skill(cli.skill);
    if let Some(secs) = cli.duration_secs {
        config = config.with_duration_secs(secs);
    }
    let mut session = ArcadeSession::new(config)
        .with_clock(clock.clone())
        .with_seed(session_seed);
    session.initialize()?;

    for _ in 0..MAX_SUBMISSIONS {
        clock.advance(cli.think_ms);
        if session.is_expired() {
            break;
        }
        let Some(question) = session.current_question() else {
            break;
        };
        let answer = player.answer(question);
        session.submit_answer(answer, cli.think_ms.max(0) as u64)?;
        session.generate_next_question()?;
    }

    Ok(session.end_session())
}

fn run_level(cli: &Cli) -> Result<LevelAttemptResult> {
    let (session_seed, mut player) = seeds(cli);
    let clock = manual_clock();

    let mut session = LevelSession::new(load_level(cli)?, cli.answer_mode.into())?
        .with_clock(clock.clone())
        .with_seed(session_seed);
    session.initialize()?;

    for _ in 0..MAX_SUBMISSIONS {
        if session.is_passed() {
            break;
        }
        clock.advance(cli.think_ms);
        if session.is_expired() {
            break;
        }
        let Some(question) = session.current_question() else {
            break;
        };
        let answer = player.answer(question);
        match session.submit_answer(answer) {
            Ok(_) => {}
            Err(e @ SessionError::QuestionSpaceExhausted { .. }) => {
                log::warn!("[Sim] Stopping level run: {}", e);
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(session.end_session())
}

fn run_practice(cli: &Cli) -> Result<PracticeResult> {
    let (session_seed, mut player) = seeds(cli);
    let clock = manual_clock();

    let mut session = PracticeSession::new(load_level(cli)?)?
        .with_clock(clock.clone())
        .with_seed(session_seed);
    session.initialize()?;

    for _ in 0..MAX_SUBMISSIONS {
        if session.is_completed() {
            break;
        }
        clock.advance(cli.think_ms);
        let Some(question) = session.current_question() else {
            break;
        };
        let answer = player.answer(question);
        match session.submit_answer(answer) {
            Ok(_) => {}
            Err(e @ SessionError::QuestionSpaceExhausted { .. }) => {
                log::warn!("[Sim] Stopping practice run: {}", e);
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(session.end_session())
}
