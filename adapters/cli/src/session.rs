//! Line-driven terminal front end for a single game at the counter.

use std::{io::Write, time::Duration};

use anyhow::Result;
use mashimashi_rush_core::{Command, Event, Level, PlayerInput, Topping, Verdict};
use mashimashi_rush_system_order_generation::{OrderDispatch, RollSource};
use mashimashi_rush_world::{self as world, query, World};
use tracing::{debug, info};

/// Keys accepted on each input line.
pub(crate) const KEY_HELP: &str = "y/n/a: ヤサイ/ニンニク/アブラ  r: reset  s: serve  q: quit";

/// Whether the session should keep reading input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    /// The countdown is still running.
    Continue,
    /// The game ended or the player quit.
    Finished,
}

/// Drives the world and order dispatch from player keystrokes.
#[derive(Debug)]
pub(crate) struct Session<R> {
    world: World,
    dispatch: OrderDispatch<R>,
}

impl<R: RollSource> Session<R> {
    /// Starts a game of the provided length and prints the first order.
    pub(crate) fn start(
        dispatch: OrderDispatch<R>,
        duration: Duration,
        out: &mut impl Write,
    ) -> Result<Self> {
        let mut session = Self {
            world: World::new(),
            dispatch,
        };
        writeln!(out, "{}", query::welcome_banner(&session.world))?;
        writeln!(out, "{KEY_HELP}")?;
        session.pump(vec![Command::StartGame { duration }], out)?;
        session.prompt(out)?;
        Ok(session)
    }

    /// Applies the time spent typing followed by every key on the line.
    pub(crate) fn feed_line(
        &mut self,
        line: &str,
        elapsed: Duration,
        out: &mut impl Write,
    ) -> Result<Flow> {
        if self.tick(elapsed, out)? == Flow::Finished {
            return Ok(Flow::Finished);
        }

        for key in line.chars().filter(|key| !key.is_whitespace()) {
            let command = match key.to_ascii_lowercase() {
                'y' => Command::AddTopping {
                    topping: Topping::Yasai,
                },
                'n' => Command::AddTopping {
                    topping: Topping::Ninniku,
                },
                'a' => Command::AddTopping {
                    topping: Topping::Abura,
                },
                'r' => Command::ResetInput,
                's' => Command::ServeOrder,
                'q' => {
                    info!(score = query::score(&self.world), "player quit");
                    return Ok(Flow::Finished);
                }
                other => {
                    writeln!(out, "unknown key {other:?} ({KEY_HELP})")?;
                    continue;
                }
            };
            self.pump(vec![command], out)?;
        }

        self.prompt(out)?;
        Ok(Flow::Continue)
    }

    /// Advances the countdown without any key presses.
    pub(crate) fn tick(&mut self, elapsed: Duration, out: &mut impl Write) -> Result<Flow> {
        self.pump(vec![Command::Tick { dt: elapsed }], out)?;
        if query::is_playing(&self.world) {
            Ok(Flow::Continue)
        } else {
            Ok(Flow::Finished)
        }
    }

    /// Time until the countdown display drops to the next whole second.
    pub(crate) fn until_next_second(&self) -> Duration {
        let remaining = query::time_remaining(&self.world);
        let fraction = remaining.saturating_sub(Duration::from_secs(remaining.as_secs()));
        if fraction.is_zero() {
            Duration::from_secs(1).min(remaining)
        } else {
            fraction
        }
    }

    /// Number of bowls served correctly so far.
    pub(crate) fn score(&self) -> u32 {
        query::score(&self.world)
    }

    fn pump(&mut self, mut commands: Vec<Command>, out: &mut impl Write) -> Result<()> {
        let mut events = Vec::new();
        while !commands.is_empty() {
            events.clear();
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            for event in &events {
                self.render(event, out)?;
            }
            self.dispatch.handle(&events, &mut commands);
        }
        Ok(())
    }

    fn render(&self, event: &Event, out: &mut impl Write) -> Result<()> {
        match event {
            Event::OrderIssued { order, customer } => {
                debug!(
                    yasai = order.yasai().get(),
                    ninniku = order.ninniku().get(),
                    abura = order.abura().get(),
                    "order issued"
                );
                writeln!(out, "[客{}] 「{}」", customer.get(), order.text())?;
            }
            Event::OrderServed { verdict, score } => match verdict {
                Verdict::Correct => writeln!(out, "○ 正解! {score}杯")?,
                Verdict::Incorrect => writeln!(out, "× ちがう! {score}杯")?,
            },
            Event::GameEnded { .. } => {
                writeln!(
                    out,
                    "終了! {}提供しました",
                    query::final_score_label(&self.world)
                )?;
            }
            Event::GameStarted { .. }
            | Event::ToppingAdded { .. }
            | Event::InputReset
            | Event::TimeAdvanced { .. } => {}
        }
        Ok(())
    }

    fn prompt(&self, out: &mut impl Write) -> Result<()> {
        writeln!(
            out,
            "残り{}秒 | {} | {}",
            query::seconds_remaining(&self.world),
            badges(query::current_input(&self.world)),
            query::score(&self.world)
        )?;
        out.flush()?;
        Ok(())
    }
}

fn badges(input: &PlayerInput) -> String {
    Topping::ALL
        .iter()
        .map(|topping| format!("{} {}", topping.label(), dots(input.level(*topping))))
        .collect::<Vec<_>>()
        .join("  ")
}

fn dots(level: Level) -> String {
    (0..Level::MAX.get())
        .map(|index| if index < level.get() { '●' } else { '○' })
        .collect()
}
