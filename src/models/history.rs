//! Settlement history: one immutable record per settled tournament.

use crate::config::OutcomeTier;
use crate::models::player::PlayerId;
use crate::models::tournament::{TournamentFormat, TournamentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How one participant did in a settled tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ParticipantResult {
    pub player_id: PlayerId,
    pub name: String,
    pub outcome: OutcomeTier,
    /// Matches actually won; byes are not wins.
    pub wins: u32,
    pub points_earned: u64,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: DateTime<Utc>,
    pub tournament_id: TournamentId,
    pub tournament_name: String,
    pub format: TournamentFormat,
    pub bracket_size: usize,
    /// Seed order.
    pub participants: Vec<ParticipantResult>,
}

/// One line of a player's personal history.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerHistoryEntry {
    pub tournament_id: TournamentId,
    pub tournament_name: String,
    pub timestamp: DateTime<Utc>,
    pub outcome: OutcomeTier,
    pub wins: u32,
    pub points_earned: u64,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerHistory {
    pub player_id: PlayerId,
    pub entries: Vec<PlayerHistoryEntry>,
    pub tournaments_played: usize,
    pub total_wins: u32,
    pub total_points_earned: u64,
}

/// Append-only list of settlement records.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    records: Vec<HistoryRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<HistoryRecord>) -> Self {
        Self { records }
    }

    pub fn append(&mut self, record: HistoryRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains_tournament(&self, id: TournamentId) -> bool {
        self.records.iter().any(|r| r.tournament_id == id)
    }

    /// Every settled tournament the player took part in, oldest first.
    pub fn for_player(&self, player_id: PlayerId) -> PlayerHistory {
        let entries: Vec<PlayerHistoryEntry> = self
            .records
            .iter()
            .filter_map(|r| {
                r.participants
                    .iter()
                    .find(|p| p.player_id == player_id)
                    .map(|p| PlayerHistoryEntry {
                        tournament_id: r.tournament_id,
                        tournament_name: r.tournament_name.clone(),
                        timestamp: r.timestamp,
                        outcome: p.outcome,
                        wins: p.wins,
                        points_earned: p.points_earned,
                    })
            })
            .collect();
        PlayerHistory {
            player_id,
            tournaments_played: entries.len(),
            total_wins: entries.iter().map(|e| e.wins).sum(),
            total_points_earned: entries.iter().map(|e| e.points_earned).sum(),
            entries,
        }
    }
}
