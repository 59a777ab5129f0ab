//! Configuration: the points ladder (bracket size -> tier -> points) and server settings from env.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Outcome classification used to look up ladder points.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeTier {
    #[serde(alias = "winner")]
    Champion,
    Finalist,
    Semifinalist,
    Quarterfinalist,
    RoundOf16,
    RoundOf32,
    Participation,
}

impl OutcomeTier {
    /// Tier for the deepest elimination round a player reached, keyed by round size.
    /// Sizes without a named tier (a non-power-of-two entry round, or 64 and up) are participation.
    pub fn for_round_size(round_size: usize) -> Self {
        match round_size {
            1 => OutcomeTier::Champion,
            2 => OutcomeTier::Finalist,
            4 => OutcomeTier::Semifinalist,
            8 => OutcomeTier::Quarterfinalist,
            16 => OutcomeTier::RoundOf16,
            32 => OutcomeTier::RoundOf32,
            _ => OutcomeTier::Participation,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutcomeTier::Champion => "champion",
            OutcomeTier::Finalist => "finalist",
            OutcomeTier::Semifinalist => "semifinalist",
            OutcomeTier::Quarterfinalist => "quarterfinalist",
            OutcomeTier::RoundOf16 => "round_of_16",
            OutcomeTier::RoundOf32 => "round_of_32",
            OutcomeTier::Participation => "participation",
        }
    }
}

impl std::fmt::Display for OutcomeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors loading configuration files.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Could not read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Invalid points ladder: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Points awarded per outcome, per bracket size. Read-only for the engine.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointsLadder {
    table: BTreeMap<usize, BTreeMap<OutcomeTier, u64>>,
}

impl PointsLadder {
    pub fn new(table: BTreeMap<usize, BTreeMap<OutcomeTier, u64>>) -> Self {
        Self { table }
    }

    /// Club ladder for 4, 8 and 16 draws.
    pub fn club_default() -> Self {
        use OutcomeTier::*;
        let rows: [(usize, &[(OutcomeTier, u64)]); 3] = [
            (4, &[(Champion, 100), (Finalist, 60), (Semifinalist, 30), (Participation, 0)]),
            (
                8,
                &[
                    (Champion, 200),
                    (Finalist, 120),
                    (Semifinalist, 70),
                    (Quarterfinalist, 30),
                    (Participation, 0),
                ],
            ),
            (
                16,
                &[
                    (Champion, 400),
                    (Finalist, 240),
                    (Semifinalist, 140),
                    (Quarterfinalist, 80),
                    (RoundOf16, 40),
                    (Participation, 0),
                ],
            ),
        ];
        let table = rows
            .iter()
            .map(|(size, tiers)| (*size, tiers.iter().copied().collect()))
            .collect();
        Self { table }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Configured bracket size closest to `bracket_size`; ties go to the smaller size.
    pub fn nearest_size(&self, bracket_size: usize) -> Option<usize> {
        self.table
            .keys()
            .copied()
            .min_by_key(|size| size.abs_diff(bracket_size))
    }

    /// Points for a tier, or None when the ladder has no entry for it.
    pub fn points_for(&self, bracket_size: usize, tier: OutcomeTier) -> Option<u64> {
        let size = self.nearest_size(bracket_size)?;
        self.table.get(&size)?.get(&tier).copied()
    }

    pub fn sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.table.keys().copied()
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Server settings. Env: HOST, PORT, DATA_DIR, POINTS_CONFIG.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// JSON points ladder; the club default is used when unset.
    pub points_config: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            points_config: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(default_host);
        let port = lookup("PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or_else(default_port);
        let data_dir = lookup("DATA_DIR")
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let points_config = lookup("POINTS_CONFIG")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        Self {
            host,
            port,
            data_dir,
            points_config,
        }
    }

    /// The ladder from `points_config`, or the club default.
    pub fn load_ladder(&self) -> Result<PointsLadder, ConfigError> {
        match &self.points_config {
            Some(path) => PointsLadder::from_json_file(path),
            None => Ok(PointsLadder::club_default()),
        }
    }
}
