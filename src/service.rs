//! TournamentService: the engine behind a lock per tournament, wired to a [`Store`].
//!
//! `record_result` and `settle` hold the tournament's mutex for the whole operation: the
//! mutation runs on a clone, the clone is saved, and only then replaces the shared value. Two
//! results for the same round can therefore never both see "round complete".
//!
//! Lock order: tournament -> players -> persist -> history.

use crate::config::PointsLadder;
use crate::logic::{
    apply_settlement, bracket_view, head_to_head, prepare_settlement, record_result,
    start_tournament, Advance, BracketView, HeadToHead, Settlement,
};
use crate::models::{
    History, HistoryRecord, MatchId, Player, PlayerHistory, PlayerId, PlayerRegistry, Ranking,
    Standing, Tournament, TournamentError, TournamentFormat, TournamentId, TournamentStatus,
};
use crate::store::{Store, StoreError};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

#[derive(Debug)]
pub enum ServiceError {
    Tournament(TournamentError),
    Store(StoreError),
    TournamentNotFound(TournamentId),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Tournament(e) => write!(f, "{}", e),
            ServiceError::Store(e) => write!(f, "{}", e),
            ServiceError::TournamentNotFound(id) => write!(f, "No tournament {}", id),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Tournament(e) => Some(e),
            ServiceError::Store(e) => Some(e),
            ServiceError::TournamentNotFound(_) => None,
        }
    }
}

impl From<TournamentError> for ServiceError {
    fn from(e: TournamentError) -> Self {
        ServiceError::Tournament(e)
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::Store(e)
    }
}

/// Request to create (and immediately draw) a tournament.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewTournament {
    pub name: String,
    /// Defaults to today.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub format: TournamentFormat,
    /// Seed order, seed 1 first.
    pub participants: Vec<PlayerId>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct TournamentService<S: Store> {
    store: S,
    ladder: PointsLadder,
    players: RwLock<PlayerRegistry>,
    tournaments: RwLock<HashMap<TournamentId, Arc<Mutex<Tournament>>>>,
    ranking: Ranking,
    history: Mutex<History>,
    /// Serializes ranking/history writes to the store.
    persist: Mutex<()>,
}

impl<S: Store> TournamentService<S> {
    /// Load everything the store holds.
    pub fn open(store: S, ladder: PointsLadder) -> Result<Self, StoreError> {
        let players = PlayerRegistry::from_players(store.load_players()?);
        let tournaments: HashMap<_, _> = store
            .load_tournaments()?
            .into_iter()
            .map(|t| (t.id, Arc::new(Mutex::new(t))))
            .collect();
        let ranking = Ranking::from(store.load_ranking()?);
        let history = History::from_records(store.load_history()?);
        log::info!(
            "Loaded {} players, {} tournaments, {} settled",
            players.len(),
            tournaments.len(),
            history.len()
        );
        Ok(Self {
            store,
            ladder,
            players: RwLock::new(players),
            tournaments: RwLock::new(tournaments),
            ranking,
            history: Mutex::new(history),
            persist: Mutex::new(()),
        })
    }

    pub fn ladder(&self) -> &PointsLadder {
        &self.ladder
    }

    pub fn register_player(&self, name: &str) -> Result<Player, ServiceError> {
        let mut players = self.players.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = players.clone();
        let player = next.add_player(name)?.clone();
        self.store.save_players(next.players())?;
        *players = next;
        log::info!("Registered player {} ({})", player.name, player.id);
        Ok(player)
    }

    /// Soft-remove a player; their history and points stay.
    pub fn remove_player(&self, id: PlayerId) -> Result<(), ServiceError> {
        let mut players = self.players.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = players.clone();
        next.remove_player(id)?;
        self.store.save_players(next.players())?;
        *players = next;
        Ok(())
    }

    pub fn players(&self) -> Vec<Player> {
        self.players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .players()
            .to_vec()
    }

    pub fn player(&self, id: PlayerId) -> Option<Player> {
        self.players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Create a tournament and draw its first round.
    pub fn create_tournament(&self, new: NewTournament) -> Result<Tournament, ServiceError> {
        let mut tournament = {
            let players = self.players.read().unwrap_or_else(PoisonError::into_inner);
            Tournament::new(
                &players,
                new.name,
                new.date.unwrap_or_else(|| Utc::now().date_naive()),
                new.format,
                new.participants,
            )?
        };
        start_tournament(&mut tournament)?;
        self.store.save_tournament(&tournament)?;
        self.tournaments
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tournament.id, Arc::new(Mutex::new(tournament.clone())));
        Ok(tournament)
    }

    fn entry(&self, id: TournamentId) -> Result<Arc<Mutex<Tournament>>, ServiceError> {
        self.tournaments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(ServiceError::TournamentNotFound(id))
    }

    pub fn tournament(&self, id: TournamentId) -> Result<Tournament, ServiceError> {
        let entry = self.entry(id)?;
        let t = lock(&entry).clone();
        Ok(t)
    }

    /// All tournaments, oldest first.
    pub fn tournaments(&self) -> Vec<Tournament> {
        let mut ts: Vec<Tournament> = self
            .entries()
            .iter()
            .map(|e| lock(e).clone())
            .collect();
        ts.sort_by_key(|t| t.created_at);
        ts
    }

    fn entries(&self) -> Vec<Arc<Mutex<Tournament>>> {
        self.tournaments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Record a result and advance the round if it completed, as one unit.
    pub fn record_result(
        &self,
        id: TournamentId,
        match_id: MatchId,
        winner: PlayerId,
        score: Option<String>,
    ) -> Result<(Tournament, Advance), ServiceError> {
        let entry = self.entry(id)?;
        let mut current = lock(&entry);
        let mut next = current.clone();
        let advance = record_result(&mut next, match_id, winner, score)?;
        self.store.save_tournament(&next)?;
        *current = next;
        Ok((current.clone(), advance))
    }

    /// Settle a finished tournament: credit the ranking, append history, mark completed.
    ///
    /// The store is written before the in-memory state changes; a failed write leaves the
    /// tournament unsettled in memory. Every write is a full projection of the settled state,
    /// so a retry after a partial failure overwrites rather than duplicates.
    pub fn settle(&self, id: TournamentId) -> Result<Settlement, ServiceError> {
        let entry = self.entry(id)?;
        let mut current = lock(&entry);
        let settlement = {
            let players = self.players.read().unwrap_or_else(PoisonError::into_inner);
            prepare_settlement(&current, &self.ladder, &players)?
        };

        let _persist = lock(&self.persist);
        let mut history = lock(&self.history);
        if history.contains_tournament(id) {
            return Err(TournamentError::AlreadySettled(id).into());
        }
        let mut projected_ranking = self.ranking.snapshot();
        for p in &settlement.record.participants {
            let total = projected_ranking.entry(p.player_id).or_insert(0);
            *total = total.saturating_add(p.points_earned);
        }
        let mut projected_history = history.records().to_vec();
        projected_history.push(settlement.record.clone());
        let mut completed = current.clone();
        completed.status = TournamentStatus::Completed;
        self.store.save_ranking(&projected_ranking)?;
        self.store.save_history(&projected_history)?;
        self.store.save_tournament(&completed)?;

        apply_settlement(&mut current, &settlement, &self.ranking, &mut history)?;
        Ok(settlement)
    }

    /// Head-to-head over every stored tournament, oldest first.
    pub fn head_to_head(&self, a: PlayerId, b: PlayerId) -> HeadToHead {
        let mut meetings = Vec::new();
        for t in self.tournaments() {
            meetings.extend(
                t.matches
                    .into_iter()
                    .filter(|m| m.involves(a) && m.involves(b)),
            );
        }
        head_to_head(meetings.iter(), a, b)
    }

    pub fn standings(&self) -> Vec<Standing> {
        let players = self.players.read().unwrap_or_else(PoisonError::into_inner);
        self.ranking.standings(&players)
    }

    pub fn points(&self, player: PlayerId) -> u64 {
        self.ranking.points(player)
    }

    pub fn history(&self) -> Vec<HistoryRecord> {
        lock(&self.history).records().to_vec()
    }

    pub fn player_history(&self, id: PlayerId) -> Result<PlayerHistory, ServiceError> {
        if self.player(id).is_none() {
            return Err(TournamentError::PlayerNotFound(id).into());
        }
        Ok(lock(&self.history).for_player(id))
    }

    pub fn bracket(&self, id: TournamentId) -> Result<BracketView, ServiceError> {
        let tournament = self.tournament(id)?;
        let players = self.players.read().unwrap_or_else(PoisonError::into_inner);
        Ok(bracket_view(&tournament, &players))
    }

    /// Run `f` with a consistent view of the registry (for exports).
    pub fn with_players<R>(&self, f: impl FnOnce(&PlayerRegistry) -> R) -> R {
        let players = self.players.read().unwrap_or_else(PoisonError::into_inner);
        f(&players)
    }
}
