//! Seeded single-elimination bracket: byes for top seeds, reflection pairing for the rest.

use crate::models::{PlayerId, SeedList, TournamentError};
use serde::{Deserialize, Serialize};

/// First round of a single-elimination draw.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub matches: Vec<(PlayerId, PlayerId)>,
    /// Seeds advancing without playing, best seed first.
    pub byes: Vec<PlayerId>,
    pub bracket_size: usize,
}

/// Build the first round from seed order (seed 1 first).
///
/// With N entrants the bracket is the smallest power of two >= N. The top `bracket_size - N`
/// seeds get byes; the rest are paired first-with-last so the best remaining seed meets the
/// worst one.
pub fn build_bracket(seeds: &[PlayerId]) -> Result<Bracket, TournamentError> {
    let seeds = SeedList::new(seeds.to_vec())?;
    Ok(bracket_for(&seeds))
}

pub(crate) fn bracket_for(seeds: &SeedList) -> Bracket {
    let seeds = seeds.as_slice();
    let bracket_size = seeds.len().next_power_of_two();
    let bye_count = bracket_size - seeds.len();
    let (byes, rest) = seeds.split_at(bye_count);
    Bracket {
        matches: pair_by_reflection(rest),
        byes: byes.to_vec(),
        bracket_size,
    }
}

/// Pair index `i` with `len - 1 - i`. Expects an even-length list.
pub fn pair_by_reflection(players: &[PlayerId]) -> Vec<(PlayerId, PlayerId)> {
    let n = players.len();
    (0..n / 2).map(|i| (players[i], players[n - 1 - i])).collect()
}
