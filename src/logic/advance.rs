//! Round progression: start a tournament, record results, close rounds.

use crate::logic::bracket::{bracket_for, pair_by_reflection};
use crate::logic::round_robin::schedule_for;
use crate::models::{
    Match, MatchId, PlayerId, Stage, Tournament, TournamentError, TournamentFormat,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// What recording a result did to the tournament.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum Advance {
    /// The current round still has undecided matches.
    RoundPending,
    /// The round closed and the next one was drawn.
    RoundAdvanced { next_round_size: usize },
    /// The last match was decided.
    Finished { champion: PlayerId },
}

/// Draw the first round (Setup -> InProgress).
///
/// Single elimination: byes take bracket slots `0..byes`, first-round matches follow in
/// reflection order. Round robin: every match is created now.
pub fn start_tournament(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.stage != Stage::Setup {
        return Err(TournamentError::InvalidState);
    }
    let entry_size = tournament.entry_round_size();
    let tid = tournament.id;

    let matches: Vec<Match> = match tournament.format {
        TournamentFormat::SingleElimination => {
            let bracket = bracket_for(&tournament.participants);
            let bye_count = bracket.byes.len();
            bracket
                .byes
                .iter()
                .enumerate()
                .map(|(slot, &p)| Match::bye(tid, entry_size, slot, p))
                .chain(
                    bracket
                        .matches
                        .iter()
                        .enumerate()
                        .map(|(i, &(a, b))| Match::new(tid, entry_size, bye_count + i, a, b)),
                )
                .collect()
        }
        TournamentFormat::RoundRobin => schedule_for(&tournament.participants)
            .pairs()
            .map(|(rotation, (a, b))| Match::new(tid, entry_size, rotation, a, b))
            .collect(),
    };

    tournament
        .rounds
        .insert(entry_size, tournament.participants.as_slice().to_vec());
    tournament.matches = matches;
    tournament.stage = Stage::InProgress {
        round_size: entry_size,
    };
    log::info!(
        "Tournament {} ({}) started: {} players, {:?}, bracket of {}",
        tournament.name,
        tournament.id,
        entry_size,
        tournament.format,
        tournament.bracket_size
    );
    Ok(())
}

/// Record the winner of a match and close the round if it was the last one open.
///
/// A decided match is final: recording it again fails with `AlreadyDecided` and leaves the
/// stored winner and score as they were.
pub fn record_result(
    tournament: &mut Tournament,
    match_id: MatchId,
    winner: PlayerId,
    score: Option<String>,
) -> Result<Advance, TournamentError> {
    let tournament_id = tournament.id;
    let m = tournament
        .get_match_mut(match_id)
        .ok_or(TournamentError::MatchNotFound {
            tournament_id,
            match_id,
        })?;
    if let Some(existing) = m.winner {
        return Err(TournamentError::AlreadyDecided {
            match_id,
            winner: existing,
        });
    }
    if m.player2.is_none() || !m.involves(winner) {
        return Err(TournamentError::InvalidWinner { match_id, winner });
    }
    m.winner = Some(winner);
    m.score = score.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    m.decided_at = Some(Utc::now());
    log::debug!("Match {} in tournament {} won by {}", match_id, tournament_id, winner);

    close_round_if_complete(tournament)
}

/// Round-completion check for the current round.
fn close_round_if_complete(tournament: &mut Tournament) -> Result<Advance, TournamentError> {
    let round_size = match tournament.stage {
        Stage::InProgress { round_size } => round_size,
        _ => return Err(TournamentError::InvalidState),
    };
    let round = tournament.round_matches(round_size);
    if round.iter().any(|m| !m.is_decided()) {
        return Ok(Advance::RoundPending);
    }

    match tournament.format {
        TournamentFormat::SingleElimination => {
            // Winner of the match in slot i takes slot i of the next round.
            let next: Vec<PlayerId> = round.iter().filter_map(|m| m.winner).collect();
            advance_elimination(tournament, next)
        }
        TournamentFormat::RoundRobin => {
            let champion = round_robin_leader(tournament);
            tournament.rounds.insert(1, vec![champion]);
            tournament.stage = Stage::Finished;
            log::info!(
                "Round robin {} ({}) finished, champion {}",
                tournament.name,
                tournament.id,
                champion
            );
            Ok(Advance::Finished { champion })
        }
    }
}

fn advance_elimination(
    tournament: &mut Tournament,
    next: Vec<PlayerId>,
) -> Result<Advance, TournamentError> {
    let next_size = next.len();
    if next_size == 0 {
        return Err(TournamentError::InvalidState);
    }
    tournament.rounds.insert(next_size, next.clone());

    if next_size == 1 {
        let champion = next[0];
        tournament.stage = Stage::Finished;
        log::info!(
            "Tournament {} ({}) finished, champion {}",
            tournament.name,
            tournament.id,
            champion
        );
        return Ok(Advance::Finished { champion });
    }

    let tid = tournament.id;
    let drawn = pair_by_reflection(&next)
        .into_iter()
        .enumerate()
        .map(|(slot, (a, b))| Match::new(tid, next_size, slot, a, b));
    tournament.matches.extend(drawn);
    tournament.stage = Stage::InProgress {
        round_size: next_size,
    };
    log::info!(
        "Tournament {} ({}) advanced to round of {}",
        tournament.name,
        tournament.id,
        next_size
    );
    Ok(Advance::RoundAdvanced {
        next_round_size: next_size,
    })
}

/// Most wins; ties go to the better seed.
fn round_robin_leader(tournament: &Tournament) -> PlayerId {
    let seeds = tournament.participants.as_slice();
    let wins = |p: PlayerId| {
        tournament
            .matches
            .iter()
            .filter(|m| m.winner == Some(p))
            .count()
    };
    let mut leader = seeds[0];
    let mut best = wins(leader);
    for &p in &seeds[1..] {
        let w = wins(p);
        if w > best {
            leader = p;
            best = w;
        }
    }
    leader
}
