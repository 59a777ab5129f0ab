//! Head-to-head record between two players over stored matches.

use crate::models::{Match, PlayerId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct HeadToHead {
    pub player_a: PlayerId,
    pub player_b: PlayerId,
    pub wins_a: u32,
    pub wins_b: u32,
    /// Decided meetings, in the order they were scanned.
    pub matches: Vec<Match>,
}

/// Scan `matches` for decided meetings of `a` and `b` (either side). Recomputed on every call.
pub fn head_to_head<'a>(
    matches: impl IntoIterator<Item = &'a Match>,
    a: PlayerId,
    b: PlayerId,
) -> HeadToHead {
    let mut h2h = HeadToHead {
        player_a: a,
        player_b: b,
        ..HeadToHead::default()
    };
    if a == b {
        return h2h;
    }
    for m in matches {
        let Some(winner) = m.winner else { continue };
        if m.opponent_of(a) != Some(b) {
            continue;
        }
        if winner == a {
            h2h.wins_a += 1;
        } else {
            h2h.wins_b += 1;
        }
        h2h.matches.push(m.clone());
    }
    h2h
}
