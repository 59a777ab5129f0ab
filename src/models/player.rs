//! Player, PlayerTier and the PlayerRegistry.

use crate::models::tournament::TournamentError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in matches, rankings and history).
pub type PlayerId = Uuid;

/// Ladder tier derived from cumulative ranking points.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerTier {
    Novice,
    Bronze,
    Silver,
    Gold,
    Elite,
}

/// Ascending point thresholds: a player holds the last tier whose threshold they reach.
const TIER_THRESHOLDS: [(u64, PlayerTier); 5] = [
    (0, PlayerTier::Novice),
    (100, PlayerTier::Bronze),
    (300, PlayerTier::Silver),
    (600, PlayerTier::Gold),
    (1000, PlayerTier::Elite),
];

impl PlayerTier {
    pub fn from_points(points: u64) -> Self {
        TIER_THRESHOLDS
            .iter()
            .rev()
            .find(|(threshold, _)| points >= *threshold)
            .map(|(_, tier)| *tier)
            .unwrap_or(PlayerTier::Novice)
    }
}

/// A registered club player.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Cleared on removal; history keeps referring to the player.
    pub active: bool,
    pub registered_at: DateTime<Utc>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            active: true,
            registered_at: Utc::now(),
        }
    }
}

/// All players ever registered, in registration order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerRegistry {
    players: Vec<Player>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_players(players: Vec<Player>) -> Self {
        Self { players }
    }

    /// Register a player. Names are trimmed and must be unique (case-insensitive), including
    /// against removed players, since history still refers to them by name.
    pub fn add_player(&mut self, name: &str) -> Result<&Player, TournamentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::InvalidPlayerName);
        }
        if self.find_by_name(name).is_some() {
            return Err(TournamentError::DuplicatePlayerName);
        }
        self.players.push(Player::new(name));
        let idx = self.players.len() - 1;
        Ok(&self.players[idx])
    }

    /// Soft-remove: the player stays resolvable but can no longer be seeded.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<(), TournamentError> {
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(TournamentError::PlayerNotFound(id))?;
        player.active = false;
        Ok(())
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Player> {
        let name = name.trim();
        self.players.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Display name for an id; unknown ids render as the raw uuid.
    pub fn name_of(&self, id: PlayerId) -> String {
        self.get(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Every id must belong to a registered, active player.
    pub fn ensure_seedable(&self, ids: &[PlayerId]) -> Result<(), TournamentError> {
        for &id in ids {
            match self.get(id) {
                None => return Err(TournamentError::UnknownPlayer(id)),
                Some(p) if !p.active => return Err(TournamentError::InactivePlayer(id)),
                Some(_) => {}
            }
        }
        Ok(())
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.active)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
