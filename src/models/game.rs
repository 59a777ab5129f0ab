//! Match: one pairing inside a tournament round (or a bye).

use crate::models::player::PlayerId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// A single match. `player2 == None` is a bye, decided for `player1` at creation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    /// Round-map key of the round this match is played in.
    pub round_size: usize,
    /// Elimination: slot the winner takes in the next round.
    /// Round robin: rotation index of the circle schedule.
    pub position: usize,
    pub player1: PlayerId,
    pub player2: Option<PlayerId>,
    /// None until decided; written once.
    pub winner: Option<PlayerId>,
    /// Free text, descriptive only (e.g. "6-4 7-5").
    pub score: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl Match {
    pub fn new(
        tournament_id: TournamentId,
        round_size: usize,
        position: usize,
        player1: PlayerId,
        player2: PlayerId,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            round_size,
            position,
            player1,
            player2: Some(player2),
            winner: None,
            score: None,
            decided_at: None,
        }
    }

    /// A bye: `player` advances without playing.
    pub fn bye(tournament_id: TournamentId, round_size: usize, position: usize, player: PlayerId) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            round_size,
            position,
            player1: player,
            player2: None,
            winner: Some(player),
            score: None,
            decided_at: Some(Utc::now()),
        }
    }

    pub fn is_bye(&self) -> bool {
        self.player2.is_none()
    }

    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    pub fn involves(&self, player: PlayerId) -> bool {
        self.player1 == player || self.player2 == Some(player)
    }

    /// The other side of a real match.
    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        let p2 = self.player2?;
        if self.player1 == player {
            Some(p2)
        } else if p2 == player {
            Some(self.player1)
        } else {
            None
        }
    }

    /// Loser of a decided, real match.
    pub fn loser(&self) -> Option<PlayerId> {
        self.winner.and_then(|w| self.opponent_of(w))
    }
}
