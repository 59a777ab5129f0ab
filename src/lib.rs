//! Club tournament organizer: seeded brackets, round robin, result recording and the ranking ladder.

pub mod api;
pub mod config;
pub mod export;
pub mod logic;
pub mod models;
pub mod service;
pub mod store;

pub use config::{OutcomeTier, PointsLadder, ServerConfig};
pub use logic::{
    apply_settlement, bracket_view, build_bracket, compute_outcomes, head_to_head,
    pair_by_reflection, prepare_settlement, record_result, schedule_round_robin,
    settle_tournament, start_tournament, Advance, Bracket, BracketView, HeadToHead,
    RoundRobinSchedule, Settlement, SettlementWarning,
};
pub use models::{
    ErrorKind, History, HistoryRecord, Match, MatchId, ParticipantResult, Player, PlayerHistory,
    PlayerHistoryEntry, PlayerId, PlayerRegistry, PlayerTier, Ranking, RoundMap, SeedList, Stage,
    Standing, Tournament, TournamentError, TournamentFormat, TournamentId, TournamentStatus,
};
pub use service::{NewTournament, ServiceError, TournamentService};
pub use store::{JsonFileStore, MemoryStore, Store, StoreError};
