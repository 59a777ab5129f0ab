//! CSV export of standings, matches and player history.

use crate::models::{PlayerHistory, PlayerRegistry, Standing, Tournament};
use serde::Serialize;

#[derive(Serialize)]
struct MatchRow<'a> {
    round_size: usize,
    position: usize,
    player1: &'a str,
    player2: &'a str,
    winner: &'a str,
    score: &'a str,
}

#[derive(Serialize)]
struct HistoryRow<'a> {
    tournament: &'a str,
    date: String,
    outcome: &'a str,
    wins: u32,
    points_earned: u64,
}

/// Writer that emits the given header even when no rows follow.
fn writer_with_header(header: &[&str]) -> Result<csv::Writer<Vec<u8>>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(header)?;
    Ok(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, csv::Error> {
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn standings_csv(standings: &[Standing]) -> Result<String, csv::Error> {
    let mut writer = writer_with_header(&["rank", "player_id", "name", "points", "tier"])?;
    for row in standings {
        writer.serialize(row)?;
    }
    finish(writer)
}

/// One row per match, largest round first. Byes have an empty `player2`.
pub fn matches_csv(tournament: &Tournament, players: &PlayerRegistry) -> Result<String, csv::Error> {
    let mut writer =
        writer_with_header(&["round_size", "position", "player1", "player2", "winner", "score"])?;
    for &size in tournament.rounds.keys().rev() {
        for m in tournament.round_matches(size) {
            let p1 = players.name_of(m.player1);
            let p2 = m.player2.map(|p| players.name_of(p)).unwrap_or_default();
            let winner = m.winner.map(|p| players.name_of(p)).unwrap_or_default();
            writer.serialize(MatchRow {
                round_size: m.round_size,
                position: m.position,
                player1: &p1,
                player2: &p2,
                winner: &winner,
                score: m.score.as_deref().unwrap_or(""),
            })?;
        }
    }
    finish(writer)
}

pub fn player_history_csv(history: &PlayerHistory) -> Result<String, csv::Error> {
    let mut writer =
        writer_with_header(&["tournament", "date", "outcome", "wins", "points_earned"])?;
    for e in &history.entries {
        writer.serialize(HistoryRow {
            tournament: &e.tournament_name,
            date: e.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            outcome: e.outcome.label(),
            wins: e.wins,
            points_earned: e.points_earned,
        })?;
    }
    finish(writer)
}
