#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Mashimashi Rush counter.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to. Systems consume event streams and respond exclusively with new
//! command batches.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "マシマシ RUSH!! Welcome to the counter.";

/// Length of a single game measured from the first order.
pub const ROUND_DURATION: Duration = Duration::from_secs(60);

/// Number of distinct customer portraits that can present an order.
pub const CUSTOMER_COUNT: u8 = 5;

/// Toppings the customer can call out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topping {
    /// Bean sprouts and cabbage piled on top.
    Yasai,
    /// Raw chopped garlic.
    Ninniku,
    /// Back fat.
    Abura,
}

impl Topping {
    /// Every topping in counter order.
    pub const ALL: [Topping; 3] = [Topping::Yasai, Topping::Ninniku, Topping::Abura];

    /// Katakana name printed on the counter buttons.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Topping::Yasai => "ヤサイ",
            Topping::Ninniku => "ニンニク",
            Topping::Abura => "アブラ",
        }
    }
}

/// Reported when an intensity outside `0..=3` is supplied.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("topping level {0} exceeds the maximum of {max}", max = Level::MAX.get())]
pub struct LevelOutOfRange(pub u8);

/// Topping intensity, where 0 means none and 3 means "mashi mashi".
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    /// No topping at all.
    pub const NONE: Level = Level(0);
    /// Highest intensity a bowl can carry.
    pub const MAX: Level = Level(3);

    /// Creates a level when `value` lies within `0..=3`.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Numeric representation of the level.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Next level up, staying at [`Level::MAX`] once reached.
    #[must_use]
    pub const fn saturating_increment(self) -> Self {
        if self.0 >= Self::MAX.0 {
            Self::MAX
        } else {
            Self(self.0 + 1)
        }
    }
}

impl TryFrom<u8> for Level {
    type Error = LevelOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Level::new(value).ok_or(LevelOutOfRange(value))
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A customer's call: the three topping levels and the phrase they were spoken as.
///
/// Orders are immutable once produced. The phrase never implies a combination
/// other than the levels stored alongside it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    yasai: Level,
    ninniku: Level,
    abura: Level,
    text: String,
}

impl Order {
    /// Creates a new order from its levels and spoken phrase.
    #[must_use]
    pub fn new(yasai: Level, ninniku: Level, abura: Level, text: impl Into<String>) -> Self {
        Self {
            yasai,
            ninniku,
            abura,
            text: text.into(),
        }
    }

    /// Requested vegetable level.
    #[must_use]
    pub const fn yasai(&self) -> Level {
        self.yasai
    }

    /// Requested garlic level.
    #[must_use]
    pub const fn ninniku(&self) -> Level {
        self.ninniku
    }

    /// Requested back-fat level.
    #[must_use]
    pub const fn abura(&self) -> Level {
        self.abura
    }

    /// Requested level for the provided topping.
    #[must_use]
    pub const fn level(&self, topping: Topping) -> Level {
        match topping {
            Topping::Yasai => self.yasai,
            Topping::Ninniku => self.ninniku,
            Topping::Abura => self.abura,
        }
    }

    /// Phrase shown in the customer's speech bubble.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Buttons pressed by the player for the bowl currently being assembled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerInput {
    yasai: Level,
    ninniku: Level,
    abura: Level,
}

impl PlayerInput {
    /// Creates an input with every topping at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            yasai: Level::NONE,
            ninniku: Level::NONE,
            abura: Level::NONE,
        }
    }

    /// Current level recorded for the provided topping.
    #[must_use]
    pub const fn level(&self, topping: Topping) -> Level {
        match topping {
            Topping::Yasai => self.yasai,
            Topping::Ninniku => self.ninniku,
            Topping::Abura => self.abura,
        }
    }

    /// Records one more press of the topping button and returns the clamped level.
    pub fn add(&mut self, topping: Topping) -> Level {
        let slot = match topping {
            Topping::Yasai => &mut self.yasai,
            Topping::Ninniku => &mut self.ninniku,
            Topping::Abura => &mut self.abura,
        };
        *slot = slot.saturating_increment();
        *slot
    }

    /// Clears every recorded press.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether the assembled bowl matches the order exactly.
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        Topping::ALL
            .iter()
            .all(|topping| self.level(*topping) == order.level(*topping))
    }
}

/// Identifies which customer portrait presents an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct CustomerId(u8);

impl CustomerId {
    /// Creates a customer identifier, clamping into `1..=CUSTOMER_COUNT`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        if value == 0 {
            Self(1)
        } else if value > CUSTOMER_COUNT {
            Self(CUSTOMER_COUNT)
        } else {
            Self(value)
        }
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

impl From<u8> for CustomerId {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<CustomerId> for u8 {
    fn from(customer: CustomerId) -> Self {
        customer.get()
    }
}

/// Outcome of serving a bowl.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// Every topping level matched the order.
    Correct,
    /// At least one topping level differed from the order.
    Incorrect,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Starts a fresh game, discarding any score and order from a previous one.
    StartGame {
        /// Time the player has to serve as many bowls as possible.
        duration: Duration,
    },
    /// Presents a new order at the counter.
    IssueOrder {
        /// Order the customer is calling out.
        order: Order,
        /// Portrait presenting the order.
        customer: CustomerId,
    },
    /// Presses a topping button once.
    AddTopping {
        /// Topping whose level should increase.
        topping: Topping,
    },
    /// Clears every topping press for the current bowl.
    ResetInput,
    /// Hands the assembled bowl to the customer.
    ServeOrder,
    /// Advances the countdown by the provided delta time.
    Tick {
        /// Duration of time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a new game began.
    GameStarted {
        /// Countdown length for the game.
        duration: Duration,
    },
    /// Confirms that a new order is waiting at the counter.
    OrderIssued {
        /// Order being called out.
        order: Order,
        /// Portrait presenting the order.
        customer: CustomerId,
    },
    /// Confirms a topping button press.
    ToppingAdded {
        /// Topping that was pressed.
        topping: Topping,
        /// Level recorded after the press.
        level: Level,
    },
    /// Confirms that the bowl input was cleared.
    InputReset,
    /// Reports how a served bowl was judged.
    OrderServed {
        /// Whether the bowl matched the order.
        verdict: Verdict,
        /// Score after judging the bowl.
        score: u32,
    },
    /// Indicates that the countdown advanced.
    TimeAdvanced {
        /// Duration of time that elapsed in the tick.
        dt: Duration,
        /// Time left on the countdown after the tick.
        remaining: Duration,
    },
    /// Announces that the countdown expired.
    GameEnded {
        /// Number of bowls served correctly.
        score: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::{CustomerId, Level, LevelOutOfRange, Order, PlayerInput, Topping, Verdict};
    use serde::{de::DeserializeOwned, Serialize};

    fn level(value: u8) -> Level {
        Level::new(value).expect("level in range")
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn level_rejects_values_above_three() {
        assert_eq!(Level::new(4), None);
        assert_eq!(Level::try_from(7_u8), Err(LevelOutOfRange(7)));
        assert_eq!(Level::try_from(3_u8), Ok(Level::MAX));
    }

    #[test]
    fn level_increment_saturates_at_max() {
        assert_eq!(Level::NONE.saturating_increment(), level(1));
        assert_eq!(level(2).saturating_increment(), Level::MAX);
        assert_eq!(Level::MAX.saturating_increment(), Level::MAX);
    }

    #[test]
    fn out_of_range_level_fails_to_deserialize() {
        let bytes = bincode::serialize(&9_u8).expect("serialize");
        assert!(bincode::deserialize::<Level>(&bytes).is_err());
    }

    #[test]
    fn player_input_clamps_repeated_presses() {
        let mut input = PlayerInput::new();
        for _ in 0..5 {
            let _ = input.add(Topping::Abura);
        }
        assert_eq!(input.level(Topping::Abura), Level::MAX);
        assert_eq!(input.level(Topping::Yasai), Level::NONE);

        input.reset();
        assert_eq!(input, PlayerInput::new());
    }

    #[test]
    fn player_input_matches_only_exact_orders() {
        let order = Order::new(level(1), level(2), Level::NONE, "ヤサイニンニクマシ");
        let mut input = PlayerInput::new();
        assert!(!input.matches(&order));

        let _ = input.add(Topping::Yasai);
        let _ = input.add(Topping::Ninniku);
        let _ = input.add(Topping::Ninniku);
        assert!(input.matches(&order));

        let _ = input.add(Topping::Abura);
        assert!(!input.matches(&order));
    }

    #[test]
    fn order_exposes_levels_by_topping() {
        let order = Order::new(level(0), level(1), level(3), "ヤサイなしニンニクアブラマシマシ");
        assert_eq!(order.level(Topping::Yasai), order.yasai());
        assert_eq!(order.level(Topping::Ninniku), order.ninniku());
        assert_eq!(order.level(Topping::Abura), level(3));
        assert_eq!(order.text(), "ヤサイなしニンニクアブラマシマシ");
    }

    #[test]
    fn customer_id_clamps_into_portrait_range() {
        assert_eq!(CustomerId::new(0).get(), 1);
        assert_eq!(CustomerId::new(3).get(), 3);
        assert_eq!(CustomerId::new(42).get(), 5);
    }

    #[test]
    fn deserialized_customer_id_is_clamped() {
        let far = bincode::serialize(&9_u8).expect("serialize");
        let customer: CustomerId = bincode::deserialize(&far).expect("deserialize");
        assert_eq!(customer.get(), 5);

        let zero = bincode::serialize(&0_u8).expect("serialize");
        let customer: CustomerId = bincode::deserialize(&zero).expect("deserialize");
        assert_eq!(customer.get(), 1);

        assert_round_trip(&CustomerId::new(4));
    }

    #[test]
    fn order_round_trips_through_bincode() {
        assert_round_trip(&Order::new(level(2), level(2), level(2), "全マシ"));
    }

    #[test]
    fn verdict_round_trips_through_bincode() {
        assert_round_trip(&Verdict::Incorrect);
    }

    #[test]
    fn topping_labels_match_counter_buttons() {
        let labels: Vec<&str> = Topping::ALL.iter().map(|topping| topping.label()).collect();
        assert_eq!(labels, ["ヤサイ", "ニンニク", "アブラ"]);
    }
}
