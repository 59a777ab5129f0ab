//! Tournament aggregate (entity, round map, match set, stage) and TournamentError.

use crate::models::game::{Match, MatchId};
use crate::models::player::{PlayerId, PlayerRegistry};
use crate::models::seeds::SeedList;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Broad class of a [`TournamentError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Bad input shape; rejected before any mutation. Retry with corrected input.
    Validation,
    /// Caller/protocol bug or stale view. Retrying the same call repeats the error.
    State,
}

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Fewer than two participants.
    InsufficientParticipants { count: usize },
    /// The same player was seeded twice.
    DuplicateParticipant(PlayerId),
    /// Seeded id is not a registered player.
    UnknownPlayer(PlayerId),
    /// Seeded player has been removed.
    InactivePlayer(PlayerId),
    /// Player name is empty after trimming.
    InvalidPlayerName,
    /// Tournament name is empty after trimming.
    InvalidTournamentName,
    /// A player with this name already exists (names are unique, case-insensitive).
    DuplicatePlayerName,
    /// No registered player with this id.
    PlayerNotFound(PlayerId),
    /// Tournament is not in a stage that allows this action.
    InvalidState,
    MatchNotFound {
        tournament_id: TournamentId,
        match_id: MatchId,
    },
    /// The match already has a winner; decided matches are final.
    AlreadyDecided { match_id: MatchId, winner: PlayerId },
    /// The submitted winner did not play in the match.
    InvalidWinner { match_id: MatchId, winner: PlayerId },
    /// Settlement requested before a champion is known.
    NotFinished { tournament_id: TournamentId },
    AlreadySettled(TournamentId),
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        use TournamentError::*;
        match self {
            InsufficientParticipants { .. }
            | DuplicateParticipant(_)
            | UnknownPlayer(_)
            | InactivePlayer(_)
            | InvalidPlayerName
            | InvalidTournamentName
            | DuplicatePlayerName => ErrorKind::Validation,
            PlayerNotFound(_)
            | InvalidState
            | MatchNotFound { .. }
            | AlreadyDecided { .. }
            | InvalidWinner { .. }
            | NotFinished { .. }
            | AlreadySettled(_) => ErrorKind::State,
        }
    }
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::InsufficientParticipants { count } => {
                write!(f, "Need at least 2 participants (got {})", count)
            }
            TournamentError::DuplicateParticipant(id) => write!(f, "Player {} is seeded twice", id),
            TournamentError::UnknownPlayer(id) => write!(f, "Player {} is not registered", id),
            TournamentError::InactivePlayer(id) => write!(f, "Player {} has been removed", id),
            TournamentError::InvalidPlayerName => write!(f, "Player name must not be empty"),
            TournamentError::InvalidTournamentName => {
                write!(f, "Tournament name must not be empty")
            }
            TournamentError::DuplicatePlayerName => write!(f, "A player with this name already exists"),
            TournamentError::PlayerNotFound(id) => write!(f, "Player {} not found", id),
            TournamentError::InvalidState => write!(f, "Invalid state for this action"),
            TournamentError::MatchNotFound {
                tournament_id,
                match_id,
            } => write!(f, "Match {} not found in tournament {}", match_id, tournament_id),
            TournamentError::AlreadyDecided { match_id, winner } => {
                write!(f, "Match {} is already decided (winner {})", match_id, winner)
            }
            TournamentError::InvalidWinner { match_id, winner } => {
                write!(f, "Player {} did not play in match {}", winner, match_id)
            }
            TournamentError::NotFinished { tournament_id } => {
                write!(f, "Tournament {} has no champion yet", tournament_id)
            }
            TournamentError::AlreadySettled(id) => write!(f, "Tournament {} is already settled", id),
        }
    }
}

impl std::error::Error for TournamentError {}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Round size -> players in that round, in bracket-position order.
pub type RoundMap = BTreeMap<usize, Vec<PlayerId>>;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    #[default]
    SingleElimination,
    RoundRobin,
}

/// Settlement status. Flips to `Completed` exactly once.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    #[default]
    Active,
    Completed,
}

/// Where the tournament is in its round progression.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "stage")]
pub enum Stage {
    /// Roster fixed, no matches yet.
    #[default]
    Setup,
    /// Matches of the round with this size are being played.
    InProgress { round_size: usize },
    /// Champion known (round map holds key 1); ready for settlement.
    Finished,
}

/// One tournament: entity fields plus its round map and match set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub date: NaiveDate,
    pub format: TournamentFormat,
    /// Seed order.
    pub participants: SeedList,
    pub status: TournamentStatus,
    pub stage: Stage,
    /// Smallest power of two >= participant count (elimination); participant count (round robin).
    pub bracket_size: usize,
    pub rounds: RoundMap,
    pub matches: Vec<Match>,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a tournament in Setup. The name is trimmed and must not be empty; every seed
    /// must be a registered, active player.
    pub fn new(
        registry: &PlayerRegistry,
        name: impl Into<String>,
        date: NaiveDate,
        format: TournamentFormat,
        seeds: Vec<PlayerId>,
    ) -> Result<Self, TournamentError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(TournamentError::InvalidTournamentName);
        }
        let participants = SeedList::new(seeds)?;
        registry.ensure_seedable(participants.as_slice())?;
        let n = participants.len();
        let bracket_size = match format {
            TournamentFormat::SingleElimination => n.next_power_of_two(),
            TournamentFormat::RoundRobin => n,
        };
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            date,
            format,
            participants,
            status: TournamentStatus::Active,
            stage: Stage::Setup,
            bracket_size,
            rounds: RoundMap::new(),
            matches: Vec::new(),
            created_at: Utc::now(),
        })
    }

    /// Round-map key of the entry round (the participant count).
    pub fn entry_round_size(&self) -> usize {
        self.participants.len()
    }

    pub fn get_match(&self, id: MatchId) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn get_match_mut(&mut self, id: MatchId) -> Option<&mut Match> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    /// Matches of one round, ordered by position.
    pub fn round_matches(&self, round_size: usize) -> Vec<&Match> {
        let mut ms: Vec<&Match> = self
            .matches
            .iter()
            .filter(|m| m.round_size == round_size)
            .collect();
        ms.sort_by_key(|m| m.position);
        ms
    }

    /// Undecided matches of the current round.
    pub fn pending_matches(&self) -> Vec<&Match> {
        match self.stage {
            Stage::InProgress { round_size } => self
                .round_matches(round_size)
                .into_iter()
                .filter(|m| !m.is_decided())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn champion(&self) -> Option<PlayerId> {
        self.rounds.get(&1).and_then(|r| r.first().copied())
    }

    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Finished
    }

    pub fn is_settled(&self) -> bool {
        self.status == TournamentStatus::Completed
    }
}
