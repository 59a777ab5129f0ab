//! SeedList: the ordered roster a bracket or schedule is built from.

use crate::models::player::PlayerId;
use crate::models::tournament::TournamentError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered, duplicate-free list of at least two player ids. Seed 1 comes first.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PlayerId>", into = "Vec<PlayerId>")]
pub struct SeedList(Vec<PlayerId>);

impl SeedList {
    pub fn new(ids: Vec<PlayerId>) -> Result<Self, TournamentError> {
        if ids.len() < 2 {
            return Err(TournamentError::InsufficientParticipants { count: ids.len() });
        }
        let mut seen = HashSet::with_capacity(ids.len());
        for &id in &ids {
            if !seen.insert(id) {
                return Err(TournamentError::DuplicateParticipant(id));
            }
        }
        Ok(Self(ids))
    }

    pub fn as_slice(&self) -> &[PlayerId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 1-based seed of a player, if entered.
    pub fn seed_of(&self, id: PlayerId) -> Option<usize> {
        self.0.iter().position(|&p| p == id).map(|i| i + 1)
    }

    pub fn into_inner(self) -> Vec<PlayerId> {
        self.0
    }
}

impl TryFrom<Vec<PlayerId>> for SeedList {
    type Error = TournamentError;

    fn try_from(ids: Vec<PlayerId>) -> Result<Self, Self::Error> {
        Self::new(ids)
    }
}

impl From<SeedList> for Vec<PlayerId> {
    fn from(seeds: SeedList) -> Self {
        seeds.0
    }
}
