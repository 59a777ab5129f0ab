//! Ranking: cumulative ladder points per player.
//!
//! Credits for players already on the ladder only take the read lock and do an atomic add,
//! so tournaments settling at the same time do not serialize on each other. The write lock is
//! taken once per player, the first time they are credited.

use crate::models::player::{PlayerId, PlayerRegistry, PlayerTier};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

/// One row of the standings table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based.
    pub rank: usize,
    pub player_id: PlayerId,
    pub name: String,
    pub points: u64,
    pub tier: PlayerTier,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<PlayerId, u64>", into = "BTreeMap<PlayerId, u64>")]
pub struct Ranking {
    points: RwLock<HashMap<PlayerId, AtomicU64>>,
}

impl Ranking {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add points to a player and return their new total. Totals saturate at `u64::MAX`.
    pub fn credit(&self, player: PlayerId, points: u64) -> u64 {
        {
            let map = self.points.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(total) = map.get(&player) {
                return saturating_credit(total, points);
            }
        }
        let mut map = self.points.write().unwrap_or_else(PoisonError::into_inner);
        let total = map.entry(player).or_insert_with(|| AtomicU64::new(0));
        saturating_credit(total, points)
    }

    /// Cumulative points (0 for players never credited).
    pub fn points(&self, player: PlayerId) -> u64 {
        self.points
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&player)
            .map(|p| p.load(Ordering::Acquire))
            .unwrap_or(0)
    }

    pub fn tier(&self, player: PlayerId) -> PlayerTier {
        PlayerTier::from_points(self.points(player))
    }

    pub fn snapshot(&self) -> BTreeMap<PlayerId, u64> {
        self.points
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, p)| (*id, p.load(Ordering::Acquire)))
            .collect()
    }

    /// Registered players by points descending, then name. Players never credited rank at 0.
    pub fn standings(&self, registry: &PlayerRegistry) -> Vec<Standing> {
        let snapshot = self.snapshot();
        let mut rows: Vec<(PlayerId, String, u64)> = registry
            .players()
            .iter()
            .filter(|p| p.active || snapshot.contains_key(&p.id))
            .map(|p| (p.id, p.name.clone(), snapshot.get(&p.id).copied().unwrap_or(0)))
            .collect();
        rows.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.1.cmp(&b.1)));
        rows.into_iter()
            .enumerate()
            .map(|(i, (player_id, name, points))| Standing {
                rank: i + 1,
                player_id,
                name,
                points,
                tier: PlayerTier::from_points(points),
            })
            .collect()
    }
}

fn saturating_credit(total: &AtomicU64, points: u64) -> u64 {
    let previous = total
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| {
            Some(t.saturating_add(points))
        })
        .unwrap_or_else(|t| t);
    previous.saturating_add(points)
}

impl Clone for Ranking {
    fn clone(&self) -> Self {
        Self::from(self.snapshot())
    }
}

impl From<BTreeMap<PlayerId, u64>> for Ranking {
    fn from(points: BTreeMap<PlayerId, u64>) -> Self {
        Self {
            points: RwLock::new(
                points
                    .into_iter()
                    .map(|(id, p)| (id, AtomicU64::new(p)))
                    .collect(),
            ),
        }
    }
}

impl From<Ranking> for BTreeMap<PlayerId, u64> {
    fn from(ranking: Ranking) -> Self {
        ranking.snapshot()
    }
}
