#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative counter state for Mashimashi Rush.

use std::time::Duration;

use mashimashi_rush_core::{
    Command, Event, Order, PlayerInput, Verdict, ROUND_DURATION, WELCOME_BANNER,
};
use tracing::debug;

/// Represents the authoritative state of a game at the counter.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    playing: bool,
    score: u32,
    time_remaining: Duration,
    current_order: Option<Order>,
    input: PlayerInput,
}

impl World {
    /// Creates an idle world waiting for a game to start.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            playing: false,
            score: 0,
            time_remaining: ROUND_DURATION,
            current_order: None,
            input: PlayerInput::new(),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartGame { duration } => {
            world.playing = true;
            world.score = 0;
            world.time_remaining = duration;
            world.current_order = None;
            world.input.reset();
            debug!(?duration, "game started");
            out_events.push(Event::GameStarted { duration });
        }
        Command::IssueOrder { order, customer } => {
            if !world.playing {
                return;
            }
            world.input.reset();
            world.current_order = Some(order.clone());
            out_events.push(Event::OrderIssued { order, customer });
        }
        Command::AddTopping { topping } => {
            if !world.playing {
                return;
            }
            let level = world.input.add(topping);
            out_events.push(Event::ToppingAdded { topping, level });
        }
        Command::ResetInput => {
            world.input.reset();
            out_events.push(Event::InputReset);
        }
        Command::ServeOrder => {
            if !world.playing {
                return;
            }
            let Some(order) = world.current_order.take() else {
                return;
            };
            let verdict = if world.input.matches(&order) {
                world.score = world.score.saturating_add(1);
                Verdict::Correct
            } else {
                Verdict::Incorrect
            };
            out_events.push(Event::OrderServed {
                verdict,
                score: world.score,
            });
        }
        Command::Tick { dt } => {
            if !world.playing {
                return;
            }
            world.time_remaining = world.time_remaining.saturating_sub(dt);
            out_events.push(Event::TimeAdvanced {
                dt,
                remaining: world.time_remaining,
            });

            if world.time_remaining.is_zero() {
                world.playing = false;
                world.current_order = None;
                debug!(score = world.score, "game ended");
                out_events.push(Event::GameEnded { score: world.score });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use mashimashi_rush_core::{Order, PlayerInput};

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Whether a game is currently running.
    #[must_use]
    pub fn is_playing(world: &World) -> bool {
        world.playing
    }

    /// Number of bowls served correctly in the current or most recent game.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Time left on the countdown.
    #[must_use]
    pub fn time_remaining(world: &World) -> Duration {
        world.time_remaining
    }

    /// Countdown in whole seconds, rounded up the way the timer display shows it.
    #[must_use]
    pub fn seconds_remaining(world: &World) -> u64 {
        let remaining = world.time_remaining;
        remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
    }

    /// Order currently waiting at the counter, if any.
    #[must_use]
    pub fn current_order(world: &World) -> Option<&Order> {
        world.current_order.as_ref()
    }

    /// Toppings pressed so far for the current bowl.
    #[must_use]
    pub fn current_input(world: &World) -> &PlayerInput {
        &world.input
    }

    /// Result label shown once the countdown expires.
    #[must_use]
    pub fn final_score_label(world: &World) -> String {
        format!("{}杯", world.score)
    }
}
