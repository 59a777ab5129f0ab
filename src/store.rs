//! Persistence: load/save players, tournaments, ranking and history.
//!
//! The service calls a store at the start of its life (load everything) and at the end of
//! each locked operation (save what changed). An implementation must write each entity
//! atomically.

use crate::models::{HistoryRecord, Player, PlayerId, Tournament, TournamentId};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "Storage I/O error: {}", e),
            StoreError::Json(e) => write!(f, "Stored data is not valid JSON: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e)
    }
}

pub trait Store: Send + Sync {
    fn load_players(&self) -> Result<Vec<Player>, StoreError>;
    fn save_players(&self, players: &[Player]) -> Result<(), StoreError>;

    fn load_tournaments(&self) -> Result<Vec<Tournament>, StoreError>;
    fn save_tournament(&self, tournament: &Tournament) -> Result<(), StoreError>;

    fn load_ranking(&self) -> Result<BTreeMap<PlayerId, u64>, StoreError>;
    fn save_ranking(&self, ranking: &BTreeMap<PlayerId, u64>) -> Result<(), StoreError>;

    fn load_history(&self) -> Result<Vec<HistoryRecord>, StoreError>;
    /// Replace the stored history with `records`.
    fn save_history(&self, records: &[HistoryRecord]) -> Result<(), StoreError>;
}

impl<T: Store + ?Sized> Store for Box<T> {
    fn load_players(&self) -> Result<Vec<Player>, StoreError> {
        (**self).load_players()
    }

    fn save_players(&self, players: &[Player]) -> Result<(), StoreError> {
        (**self).save_players(players)
    }

    fn load_tournaments(&self) -> Result<Vec<Tournament>, StoreError> {
        (**self).load_tournaments()
    }

    fn save_tournament(&self, tournament: &Tournament) -> Result<(), StoreError> {
        (**self).save_tournament(tournament)
    }

    fn load_ranking(&self) -> Result<BTreeMap<PlayerId, u64>, StoreError> {
        (**self).load_ranking()
    }

    fn save_ranking(&self, ranking: &BTreeMap<PlayerId, u64>) -> Result<(), StoreError> {
        (**self).save_ranking(ranking)
    }

    fn load_history(&self) -> Result<Vec<HistoryRecord>, StoreError> {
        (**self).load_history()
    }

    fn save_history(&self, records: &[HistoryRecord]) -> Result<(), StoreError> {
        (**self).save_history(records)
    }
}

/// Keeps everything in memory. Used by tests and ephemeral servers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryData>,
}

#[derive(Debug, Default)]
struct MemoryData {
    players: Vec<Player>,
    tournaments: HashMap<TournamentId, Tournament>,
    ranking: BTreeMap<PlayerId, u64>,
    history: Vec<HistoryRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> std::sync::MutexGuard<'_, MemoryData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Store for MemoryStore {
    fn load_players(&self) -> Result<Vec<Player>, StoreError> {
        Ok(self.data().players.clone())
    }

    fn save_players(&self, players: &[Player]) -> Result<(), StoreError> {
        self.data().players = players.to_vec();
        Ok(())
    }

    fn load_tournaments(&self) -> Result<Vec<Tournament>, StoreError> {
        let mut ts: Vec<Tournament> = self.data().tournaments.values().cloned().collect();
        ts.sort_by_key(|t| t.created_at);
        Ok(ts)
    }

    fn save_tournament(&self, tournament: &Tournament) -> Result<(), StoreError> {
        self.data()
            .tournaments
            .insert(tournament.id, tournament.clone());
        Ok(())
    }

    fn load_ranking(&self) -> Result<BTreeMap<PlayerId, u64>, StoreError> {
        Ok(self.data().ranking.clone())
    }

    fn save_ranking(&self, ranking: &BTreeMap<PlayerId, u64>) -> Result<(), StoreError> {
        self.data().ranking = ranking.clone();
        Ok(())
    }

    fn load_history(&self) -> Result<Vec<HistoryRecord>, StoreError> {
        Ok(self.data().history.clone())
    }

    fn save_history(&self, records: &[HistoryRecord]) -> Result<(), StoreError> {
        self.data().history = records.to_vec();
        Ok(())
    }
}

/// JSON files under one data directory:
/// `players.json`, `rankings.json`, `tournament_history.json`, `tournaments/<id>.json`.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(dir.join("tournaments"))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_or_default<T: serde::de::DeserializeOwned + Default>(
        &self,
        path: &Path,
    ) -> Result<T, StoreError> {
        match fs::read_to_string(path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a temp file next to the target, then rename over it.
    fn write_atomic<T: serde::Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl Store for JsonFileStore {
    fn load_players(&self) -> Result<Vec<Player>, StoreError> {
        self.read_or_default(&self.dir.join("players.json"))
    }

    fn save_players(&self, players: &[Player]) -> Result<(), StoreError> {
        self.write_atomic(&self.dir.join("players.json"), players)
    }

    fn load_tournaments(&self) -> Result<Vec<Tournament>, StoreError> {
        let mut ts = Vec::new();
        for entry in fs::read_dir(self.dir.join("tournaments"))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let raw = fs::read_to_string(&path)?;
            ts.push(serde_json::from_str::<Tournament>(&raw)?);
        }
        ts.sort_by_key(|t| t.created_at);
        Ok(ts)
    }

    fn save_tournament(&self, tournament: &Tournament) -> Result<(), StoreError> {
        let path = self
            .dir
            .join("tournaments")
            .join(format!("{}.json", tournament.id));
        self.write_atomic(&path, tournament)
    }

    fn load_ranking(&self) -> Result<BTreeMap<PlayerId, u64>, StoreError> {
        self.read_or_default(&self.dir.join("rankings.json"))
    }

    fn save_ranking(&self, ranking: &BTreeMap<PlayerId, u64>) -> Result<(), StoreError> {
        self.write_atomic(&self.dir.join("rankings.json"), ranking)
    }

    fn load_history(&self) -> Result<Vec<HistoryRecord>, StoreError> {
        self.read_or_default(&self.dir.join("tournament_history.json"))
    }

    fn save_history(&self, records: &[HistoryRecord]) -> Result<(), StoreError> {
        self.write_atomic(&self.dir.join("tournament_history.json"), records)
    }
}
