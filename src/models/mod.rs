//! Data structures: players, seeds, matches, tournaments, ranking and history.

mod game;
mod history;
mod player;
mod ranking;
mod seeds;
mod tournament;

pub use game::{Match, MatchId};
pub use history::{History, HistoryRecord, ParticipantResult, PlayerHistory, PlayerHistoryEntry};
pub use player::{Player, PlayerId, PlayerRegistry, PlayerTier};
pub use ranking::{Ranking, Standing};
pub use seeds::SeedList;
pub use tournament::{
    ErrorKind, RoundMap, Stage, Tournament, TournamentError, TournamentFormat, TournamentId,
    TournamentStatus,
};
