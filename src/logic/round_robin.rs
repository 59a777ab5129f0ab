//! Round-robin schedule by the circle method.

use crate::models::{PlayerId, SeedList, TournamentError};
use serde::{Deserialize, Serialize};

/// Every pairing of a round robin, grouped by rotation.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundRobinSchedule {
    pub rotations: Vec<Vec<(PlayerId, PlayerId)>>,
    /// Player sitting out each rotation (odd rosters only).
    pub sit_outs: Vec<Option<PlayerId>>,
}

impl RoundRobinSchedule {
    /// All pairings, rotation by rotation.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, (PlayerId, PlayerId))> + '_ {
        self.rotations
            .iter()
            .enumerate()
            .flat_map(|(r, pairs)| pairs.iter().map(move |p| (r, *p)))
    }

    pub fn match_count(&self) -> usize {
        self.rotations.iter().map(Vec::len).sum()
    }
}

/// Schedule every unordered pair exactly once.
///
/// An odd roster gets an empty slot; whoever is drawn against it sits out that rotation.
/// The first entry stays fixed while the others rotate one place per rotation.
pub fn schedule_round_robin(seeds: &[PlayerId]) -> Result<RoundRobinSchedule, TournamentError> {
    let seeds = SeedList::new(seeds.to_vec())?;
    Ok(schedule_for(&seeds))
}

pub(crate) fn schedule_for(seeds: &SeedList) -> RoundRobinSchedule {
    let mut slots: Vec<Option<PlayerId>> = seeds.as_slice().iter().copied().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let m = slots.len();

    let mut schedule = RoundRobinSchedule::default();
    for _ in 0..m - 1 {
        let mut pairs = Vec::with_capacity(m / 2);
        let mut sit_out = None;
        for i in 0..m / 2 {
            match (slots[i], slots[m - 1 - i]) {
                (Some(a), Some(b)) => pairs.push((a, b)),
                (Some(p), None) | (None, Some(p)) => sit_out = Some(p),
                (None, None) => {}
            }
        }
        schedule.rotations.push(pairs);
        schedule.sit_outs.push(sit_out);
        slots[1..].rotate_right(1);
    }
    schedule
}
