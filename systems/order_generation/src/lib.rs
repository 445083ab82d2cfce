#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Weighted-random order generation and the system that feeds orders to the counter.
//!
//! Each order either calls out every topping at once (全マシ / 全マシマシ) or is
//! assembled from three independent per-topping draws. Spoken fragments are
//! shuffled before being joined so the player cannot rely on a fixed slot order.

use mashimashi_rush_core::{Command, CustomerId, Event, Level, Order, Topping, CUSTOMER_COUNT};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

mod tuning;

pub use tuning::{GenerationTuning, TableEntry, ToppingTable, TuningError};

/// Source of uniform draws in `[0, 1)` consumed by the generator.
pub trait RollSource {
    /// Returns the next uniform draw in `[0, 1)`.
    fn roll(&mut self) -> f64;
}

/// Adapts any [`RngCore`] into a [`RollSource`].
#[derive(Clone, Debug)]
pub struct RngRolls<R> {
    rng: R,
}

impl<R: RngCore> RngRolls<R> {
    /// Wraps the provided random number generator.
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore> RollSource for RngRolls<R> {
    fn roll(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Generator backed by the seedable ChaCha stream used throughout the game.
pub type SeededGenerator = OrderGenerator<RngRolls<ChaCha8Rng>>;

/// Produces fresh orders from an injected roll source.
///
/// Generation keeps no history: every call draws fresh rolls and returns a
/// complete order.
#[derive(Clone, Debug)]
pub struct OrderGenerator<R> {
    tuning: GenerationTuning,
    source: R,
}

impl SeededGenerator {
    /// Creates a generator with default tuning and a deterministic seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_source(RngRolls::new(ChaCha8Rng::seed_from_u64(seed)))
    }

    /// Creates a generator with default tuning seeded from operating system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::with_source(RngRolls::new(ChaCha8Rng::from_entropy()))
    }
}

impl<R: RollSource> OrderGenerator<R> {
    /// Creates a generator with validated tuning.
    pub fn new(tuning: GenerationTuning, source: R) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self { tuning, source })
    }

    /// Creates a generator with the default tuning.
    #[must_use]
    pub fn with_source(source: R) -> Self {
        Self {
            tuning: GenerationTuning::default(),
            source,
        }
    }

    /// Tuning used for every draw.
    #[must_use]
    pub fn tuning(&self) -> &GenerationTuning {
        &self.tuning
    }

    /// Draws a complete order.
    pub fn generate(&mut self) -> Order {
        let Self { tuning, source } = self;

        if source.roll() < tuning.special_chance {
            return if source.roll() < tuning.doubled_share {
                uniform_order(2, &tuning.doubled_phrase)
            } else {
                uniform_order(3, &tuning.tripled_phrase)
            };
        }

        let mut fragments: Vec<&str> = Vec::with_capacity(Topping::ALL.len());
        let mut levels = [Level::NONE; 3];
        for (slot, topping) in levels.iter_mut().zip(Topping::ALL) {
            let draw = source.roll();
            if let Some(entry) = tuning.table(topping).lookup(draw) {
                *slot = entry.level;
                if let Some(phrase) = entry.phrase.as_deref() {
                    fragments.push(phrase);
                }
            }
        }

        shuffle(&mut fragments, source);

        let text = if fragments.is_empty() {
            tuning.as_is_phrase.clone()
        } else {
            fragments.concat()
        };
        let [yasai, ninniku, abura] = levels;
        Order::new(yasai, ninniku, abura, text)
    }

    /// Picks the portrait presenting the next order.
    pub fn next_customer(&mut self) -> CustomerId {
        let index = pick_index(self.source.roll(), usize::from(CUSTOMER_COUNT));
        CustomerId::new(index as u8 + 1)
    }
}

/// Draws a single order with default tuning from the thread-local generator.
#[must_use]
pub fn generate() -> Order {
    OrderGenerator::with_source(RngRolls::new(rand::thread_rng())).generate()
}

fn uniform_order(value: u8, phrase: &str) -> Order {
    let level = Level::new(value).unwrap_or(Level::MAX);
    Order::new(level, level, level, phrase)
}

/// Uniform in-place Fisher-Yates permutation driven by the roll source.
fn shuffle<T, R: RollSource>(items: &mut [T], source: &mut R) {
    for index in (1..items.len()).rev() {
        let swap_index = pick_index(source.roll(), index + 1);
        items.swap(index, swap_index);
    }
}

fn pick_index(roll: f64, len: usize) -> usize {
    debug_assert!(len > 0, "pick_index requires a non-empty range");
    ((roll * len as f64) as usize).min(len - 1)
}

/// Pure system that issues a new order whenever the counter becomes free.
#[derive(Debug)]
pub struct OrderDispatch<R> {
    generator: OrderGenerator<R>,
}

impl<R: RollSource> OrderDispatch<R> {
    /// Creates a dispatch system drawing from the provided generator.
    #[must_use]
    pub fn new(generator: OrderGenerator<R>) -> Self {
        Self { generator }
    }

    /// Consumes world events and emits an `IssueOrder` command for each freed counter.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            if matches!(
                event,
                Event::GameStarted { .. } | Event::OrderServed { .. }
            ) {
                let order = self.generator.generate();
                let customer = self.generator.next_customer();
                out.push(Command::IssueOrder { order, customer });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Script(VecDeque<f64>);

    impl RollSource for Script {
        fn roll(&mut self) -> f64 {
            self.0.pop_front().expect("script exhausted")
        }
    }

    fn scripted(rolls: &[f64]) -> OrderGenerator<Script> {
        OrderGenerator::with_source(Script(rolls.iter().copied().collect()))
    }

    fn level(value: u8) -> Level {
        Level::new(value).expect("level in range")
    }

    #[test]
    fn pick_index_stays_in_range() {
        assert_eq!(pick_index(0.0, 3), 0);
        assert_eq!(pick_index(0.5, 3), 1);
        assert_eq!(pick_index(0.999_999_999, 3), 2);
        assert_eq!(pick_index(1.0, 3), 2);
    }

    #[test]
    fn special_branch_doubles_every_topping() {
        let order = scripted(&[0.05, 0.2]).generate();
        assert_eq!(order, Order::new(level(2), level(2), level(2), "全マシ"));
    }

    #[test]
    fn special_branch_triples_every_topping() {
        let order = scripted(&[0.0, 0.5]).generate();
        assert_eq!(order, Order::new(level(3), level(3), level(3), "全マシマシ"));
    }

    #[test]
    fn single_fragment_skips_shuffle_rolls() {
        let mut generator = scripted(&[0.5, 0.45, 0.1, 0.1]);
        let order = generator.generate();
        assert_eq!(order.text(), "ヤサイマシマシ");
        assert_eq!(order.yasai(), level(3));
        assert!(generator.source.0.is_empty());
    }

    #[test]
    fn shuffle_follows_fisher_yates_swaps() {
        let mut items = ['a', 'b', 'c'];
        // index 2 swaps with 0, then index 1 swaps with itself
        let mut source = Script(VecDeque::from([0.1, 0.9]));
        shuffle(&mut items, &mut source);
        assert_eq!(items, ['c', 'b', 'a']);
    }

    #[test]
    fn customer_portraits_cover_every_slot() {
        let mut generator = scripted(&[0.0, 0.3, 0.99]);
        let customers: Vec<u8> = (0..3).map(|_| generator.next_customer().get()).collect();
        assert_eq!(customers, [1, 2, 5]);
    }

    #[test]
    fn invalid_tuning_is_rejected() {
        let tuning = GenerationTuning {
            doubled_share: -0.1,
            ..GenerationTuning::default()
        };
        assert!(OrderGenerator::new(tuning, Script(VecDeque::new())).is_err());
    }

    #[test]
    fn thread_local_generate_produces_valid_orders() {
        for _ in 0..100 {
            let order = generate();
            assert!(!order.text().is_empty());
            assert!(order.yasai() <= Level::MAX);
        }
    }
}
