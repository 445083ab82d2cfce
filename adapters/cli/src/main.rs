#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the Mashimashi Rush counter in a terminal.

mod config;
mod report;
mod session;

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mashimashi_rush_system_order_generation::{
    GenerationTuning, OrderDispatch, OrderGenerator, RngRolls, RollSource, SeededGenerator,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::{
    config::CliConfig,
    report::{write_samples, Tally},
    session::{Flow, Session},
};

#[derive(Parser, Debug)]
#[command(name = "mashimashi-rush", author, version, about)]
struct Args {
    /// Path to config TOML
    #[arg(long, global = true, default_value = "mashimashi-rush.toml")]
    config: PathBuf,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Play a timed game at the counter
    Play {
        /// Seed for a reproducible order sequence
        #[arg(long)]
        seed: Option<u64>,
        /// Countdown length in seconds (overrides config)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        duration: Option<u64>,
    },
    /// Print generated orders
    Sample {
        /// Number of orders to print
        #[arg(long, default_value_t = 10)]
        count: usize,
        /// Seed for a reproducible order sequence
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Report observed order frequencies next to the configured probabilities
    Stats {
        /// Number of orders to draw
        #[arg(long, default_value_t = 100_000)]
        count: usize,
        /// Seed for a reproducible order sequence
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Entry point for the Mashimashi Rush command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = CliConfig::load(&args.config)?;
    let mode = args.mode.unwrap_or(Mode::Play {
        seed: None,
        duration: None,
    });

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        Mode::Play { seed, duration } => {
            let duration = duration.map_or_else(|| config.round_duration(), Duration::from_secs);
            let generator = build_generator(&config.tuning, seed.or(config.seed))?;
            play(generator, duration, &mut out)
        }
        Mode::Sample { count, seed } => {
            let mut generator = build_generator(&config.tuning, seed.or(config.seed))?;
            write_samples(&mut generator, count, &mut out)
        }
        Mode::Stats { count, seed } => {
            let mut generator = build_generator(&config.tuning, seed.or(config.seed))?;
            let mut tally = Tally::default();
            for _ in 0..count {
                tally.record(&generator.generate(), &config.tuning);
            }
            tally.write_report(&config.tuning, &mut out)
        }
    }
}

fn build_generator(tuning: &GenerationTuning, seed: Option<u64>) -> Result<SeededGenerator> {
    let rng = match seed {
        Some(seed) => {
            info!(seed, "using fixed seed");
            ChaCha8Rng::seed_from_u64(seed)
        }
        None => ChaCha8Rng::from_entropy(),
    };
    OrderGenerator::new(tuning.clone(), RngRolls::new(rng)).context("invalid generation tuning")
}

fn play(generator: SeededGenerator, duration: Duration, out: &mut impl Write) -> Result<()> {
    let session = Session::start(OrderDispatch::new(generator), duration, out)?;

    let (sender, lines) = mpsc::channel();
    let _reader = thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            if sender.send(line).is_err() {
                break;
            }
        }
    });

    let score = run_countdown(session, &lines, out)?;
    info!(score, "session closed");
    Ok(())
}

/// Feeds input lines to the session while ticking the clock on every whole second.
///
/// Once the input side hangs up the clock keeps running until the game ends.
fn run_countdown<R: RollSource>(
    mut session: Session<R>,
    lines: &Receiver<io::Result<String>>,
    out: &mut impl Write,
) -> Result<u32> {
    let mut last = Instant::now();
    let mut input_open = true;

    loop {
        let wait = session.until_next_second();
        let received = if input_open {
            lines.recv_timeout(wait)
        } else {
            thread::sleep(wait);
            Err(RecvTimeoutError::Timeout)
        };

        let now = Instant::now();
        let elapsed = now.duration_since(last);
        last = now;

        let flow = match received {
            Ok(line) => {
                let line = line.context("failed to read from stdin")?;
                session.feed_line(&line, elapsed, out)?
            }
            Err(RecvTimeoutError::Timeout) => session.tick(elapsed, out)?,
            Err(RecvTimeoutError::Disconnected) => {
                debug!("input closed, running out the clock");
                input_open = false;
                session.tick(elapsed, out)?
            }
        };

        if flow == Flow::Finished {
            return Ok(session.score());
        }
    }
}
