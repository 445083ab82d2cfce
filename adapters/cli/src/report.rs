//! Non-interactive order listings and frequency reports.

use std::io::Write;

use anyhow::Result;
use mashimashi_rush_core::{Order, Topping};
use mashimashi_rush_system_order_generation::{GenerationTuning, OrderGenerator, RollSource};

/// Prints `count` freshly generated orders, one per line.
pub(crate) fn write_samples<R: RollSource>(
    generator: &mut OrderGenerator<R>,
    count: usize,
    out: &mut impl Write,
) -> Result<()> {
    for index in 1..=count {
        let order = generator.generate();
        writeln!(
            out,
            "{index:>4} | Y{} N{} A{} | {}",
            order.yasai(),
            order.ninniku(),
            order.abura(),
            order.text()
        )?;
    }
    Ok(())
}

/// Running counts of generated orders split by branch and topping level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Tally {
    total: usize,
    doubled: usize,
    tripled: usize,
    as_is: usize,
    levels: [[usize; 4]; 3],
}

impl Tally {
    /// Records one order, classifying special orders by their fixed phrase.
    pub(crate) fn record(&mut self, order: &Order, tuning: &GenerationTuning) {
        self.total += 1;
        if order.text() == tuning.doubled_phrase {
            self.doubled += 1;
            return;
        }
        if order.text() == tuning.tripled_phrase {
            self.tripled += 1;
            return;
        }
        if order.text() == tuning.as_is_phrase {
            self.as_is += 1;
        }
        for (row, topping) in self.levels.iter_mut().zip(Topping::ALL) {
            row[usize::from(order.level(topping).get())] += 1;
        }
    }

    fn normal(&self) -> usize {
        self.total - self.doubled - self.tripled
    }

    /// Writes observed rates next to the rates the tuning predicts.
    pub(crate) fn write_report(&self, tuning: &GenerationTuning, out: &mut impl Write) -> Result<()> {
        let special = self.doubled + self.tripled;
        writeln!(out, "orders: {}", self.total)?;
        writeln!(
            out,
            "special: {} (expected {:.4})",
            rate(special, self.total),
            tuning.special_chance
        )?;
        writeln!(
            out,
            "  {}: {} of special (expected {:.4})",
            tuning.doubled_phrase,
            rate(self.doubled, special),
            tuning.doubled_share
        )?;
        writeln!(
            out,
            "  {}: {} of special (expected {:.4})",
            tuning.tripled_phrase,
            rate(self.tripled, special),
            1.0 - tuning.doubled_share
        )?;
        writeln!(
            out,
            "{}: {} of normal",
            tuning.as_is_phrase,
            rate(self.as_is, self.normal())
        )?;

        for (row, topping) in self.levels.iter().zip(Topping::ALL) {
            let expected = tuning.table(topping).level_weights();
            let cells: Vec<String> = row
                .iter()
                .zip(expected.iter())
                .enumerate()
                .map(|(level, (count, weight))| {
                    format!("{level}: {} ({weight:.4})", rate(*count, self.normal()))
                })
                .collect();
            writeln!(out, "{} | {}", topping.label(), cells.join(" | "))?;
        }
        Ok(())
    }
}

fn rate(count: usize, total: usize) -> String {
    if total == 0 {
        return "-".to_owned();
    }
    format!("{:.4}", count as f64 / total as f64)
}
