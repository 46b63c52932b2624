//! Confidence-weighted vote across several signal streams.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::confidence::clamp_confidence;
use crate::domain::position::PositionState;
use crate::domain::signal::{Direction, Signal, SignalStrength, SupportingValues, Vote};
use crate::domain::strategy::StrategyId;

/// Winning score above which a combined signal is marked strong.
pub const STRONG_SCORE: f64 = 150.0;

/// Merges per-strategy streams into one `Combined` stream.
///
/// Streams are given in vote order; the price of a combined signal comes from
/// the first stream that has a signal on that date. Each date's buy and sell
/// scores are the summed confidences on that side, and a date with equal
/// scores is dropped. The output passes through the same position gate as a
/// single strategy, so it alternates.
pub fn combine_signals(streams: &[(StrategyId, Vec<Signal>)]) -> Vec<Signal> {
    let mut by_date: BTreeMap<NaiveDate, Vec<Option<&Signal>>> = BTreeMap::new();
    for (slot, (_, signals)) in streams.iter().enumerate() {
        for signal in signals {
            let row = by_date
                .entry(signal.date)
                .or_insert_with(|| vec![None; streams.len()]);
            row[slot].get_or_insert(signal);
        }
    }

    let mut position = PositionState::Flat;
    let mut combined = Vec::new();

    for (date, row) in by_date {
        let mut buy_score = 0.0;
        let mut sell_score = 0.0;
        let mut votes = Vec::with_capacity(streams.len());
        let mut price = None;

        for ((source, _), entry) in streams.iter().zip(&row) {
            let direction = entry.map(|signal| signal.direction);
            if let Some(signal) = entry {
                match signal.direction {
                    Direction::Buy => buy_score += signal.confidence,
                    Direction::Sell => sell_score += signal.confidence,
                }
                price.get_or_insert(signal.price);
            }
            votes.push(Vote {
                source: *source,
                direction,
            });
        }

        let Some(price) = price else {
            continue;
        };

        let (direction, winning) = if buy_score > sell_score {
            (Direction::Buy, buy_score)
        } else if sell_score > buy_score {
            (Direction::Sell, sell_score)
        } else {
            continue;
        };

        if !position.admits(direction) {
            continue;
        }

        let strength = if winning > STRONG_SCORE {
            SignalStrength::Strong
        } else {
            SignalStrength::Normal
        };

        combined.push(Signal {
            date,
            direction,
            strength,
            price,
            confidence: clamp_confidence(winning / 3.0),
            source: StrategyId::Combined,
            supporting: SupportingValues::Consensus {
                buy_score,
                sell_score,
                votes,
            },
        });
        position = PositionState::after(direction);
    }

    combined
}
