//! Ordering and display projection of the leaderboard.

use serde::Serialize;

use crate::entry::Entry;
use crate::types::Bounty;

/// Scale used for gold bars when the board is empty.
pub const EMPTY_BOARD_MAX_BOUNTY: Bounty = 100;

/// Podium tier for the top three ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Podium {
    Gold,
    Silver,
    Bronze,
}

impl Podium {
    /// Tier for a 1-based rank, if it is on the podium.
    pub fn for_rank(rank: usize) -> Option<Self> {
        match rank {
            1 => Some(Self::Gold),
            2 => Some(Self::Silver),
            3 => Some(Self::Bronze),
            _ => None,
        }
    }
}

/// Sort a snapshot by bounty, highest first.
///
/// The sort is stable: equal bounties keep the order in which the store
/// delivered them.
pub fn rank_by_bounty(entries: &[Entry]) -> Vec<Entry> {
    let mut ranked = entries.to_vec();
    ranked.sort_by(|a, b| b.bounty.cmp(&a.bounty));
    ranked
}

/// Highest bounty in the set, used to scale gold bars.
pub fn max_bounty(entries: &[Entry]) -> Bounty {
    entries
        .iter()
        .map(|e| e.bounty)
        .max()
        .unwrap_or(EMPTY_BOARD_MAX_BOUNTY)
}

/// Fraction of the gold bar to fill, in `0.0..=1.0`.
pub fn gold_fill(value: Bounty, max: Bounty) -> f64 {
    if max == 0 {
        return 0.0;
    }
    (value as f64 / max as f64).min(1.0)
}

/// One card of the displayed board.
///
/// Position comes from the debounced ranking; `entry` carries the live
/// record so the amount shown is always current even before the next
/// re-sort.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardCard {
    pub rank: usize,
    pub podium: Option<Podium>,
    pub entry: Entry,
    pub fill: f64,
}

/// Pair each ranked snapshot with the live record of the same id.
///
/// Entries that vanished from the live set since the last sort fall back
/// to their snapshot until the next ranking drops them.
pub fn build_cards(ranked: &[Entry], live: &[Entry]) -> Vec<BoardCard> {
    let max = max_bounty(live);
    ranked
        .iter()
        .enumerate()
        .map(|(i, snapshot)| {
            let entry = live
                .iter()
                .find(|e| e.id == snapshot.id)
                .unwrap_or(snapshot)
                .clone();
            let rank = i + 1;
            BoardCard {
                rank,
                podium: Podium::for_rank(rank),
                fill: gold_fill(entry.bounty, max),
                entry,
            }
        })
        .collect()
}
