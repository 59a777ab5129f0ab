//! Settlement: turn a finished tournament into ladder points and a history record.
//!
//! Settlement is split in two so callers can persist between the steps:
//! [`prepare_settlement`] is pure and does every check, [`apply_settlement`] performs the
//! side effects (ranking credits, history append, status flip). [`settle_tournament`] runs both.

use crate::config::{OutcomeTier, PointsLadder};
use crate::models::{
    History, HistoryRecord, ParticipantResult, PlayerId, PlayerRegistry, Ranking, Tournament,
    TournamentError, TournamentFormat, TournamentId, TournamentStatus,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A gap in the points configuration. Settlement proceeds with 0 points.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "warning")]
pub enum SettlementWarning {
    MissingTier {
        bracket_size: usize,
        tier: OutcomeTier,
    },
}

impl std::fmt::Display for SettlementWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettlementWarning::MissingTier { bracket_size, tier } => write!(
                f,
                "No ladder points for {} in a bracket of {}; awarded 0",
                tier, bracket_size
            ),
        }
    }
}

/// Computed, not yet applied, settlement of one tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub tournament_id: TournamentId,
    pub record: HistoryRecord,
    pub warnings: Vec<SettlementWarning>,
}

/// Deepest outcome and match wins of one participant.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Outcome {
    pub player_id: PlayerId,
    pub tier: OutcomeTier,
    pub wins: u32,
}

/// Outcome of every participant, in seed order.
pub fn compute_outcomes(tournament: &Tournament) -> Vec<Outcome> {
    tournament
        .participants
        .as_slice()
        .iter()
        .map(|&player_id| Outcome {
            player_id,
            tier: outcome_tier(tournament, player_id),
            wins: match_wins(tournament, player_id),
        })
        .collect()
}

fn outcome_tier(tournament: &Tournament, player: PlayerId) -> OutcomeTier {
    match tournament.format {
        TournamentFormat::SingleElimination => tournament
            .rounds
            .iter()
            .find(|(_, players)| players.contains(&player))
            .map(|(&size, _)| OutcomeTier::for_round_size(size))
            .unwrap_or(OutcomeTier::Participation),
        TournamentFormat::RoundRobin => {
            if tournament.champion() == Some(player) {
                OutcomeTier::Champion
            } else {
                OutcomeTier::Participation
            }
        }
    }
}

/// Matches won against an opponent. Advancing on a bye is not a win.
fn match_wins(tournament: &Tournament, player: PlayerId) -> u32 {
    tournament
        .matches
        .iter()
        .filter(|m| !m.is_bye() && m.winner == Some(player))
        .count() as u32
}

/// Check a finished tournament and compute everyone's points. Mutates nothing.
pub fn prepare_settlement(
    tournament: &Tournament,
    ladder: &PointsLadder,
    players: &PlayerRegistry,
) -> Result<Settlement, TournamentError> {
    if tournament.status == TournamentStatus::Completed {
        return Err(TournamentError::AlreadySettled(tournament.id));
    }
    if !tournament.is_finished() {
        return Err(TournamentError::NotFinished {
            tournament_id: tournament.id,
        });
    }

    let bracket_size = tournament.bracket_size;
    let mut warnings: Vec<SettlementWarning> = Vec::new();
    let participants = compute_outcomes(tournament)
        .into_iter()
        .map(|o| {
            let points_earned = match ladder.points_for(bracket_size, o.tier) {
                Some(p) => p,
                None => {
                    let warning = SettlementWarning::MissingTier {
                        bracket_size,
                        tier: o.tier,
                    };
                    if !warnings.contains(&warning) {
                        log::warn!("Tournament {}: {}", tournament.id, warning);
                        warnings.push(warning);
                    }
                    0
                }
            };
            ParticipantResult {
                player_id: o.player_id,
                name: players.name_of(o.player_id),
                outcome: o.tier,
                wins: o.wins,
                points_earned,
            }
        })
        .collect();

    Ok(Settlement {
        tournament_id: tournament.id,
        record: HistoryRecord {
            timestamp: Utc::now(),
            tournament_id: tournament.id,
            tournament_name: tournament.name.clone(),
            format: tournament.format,
            bracket_size,
            participants,
        },
        warnings,
    })
}

/// Credit the ranking, append the history record and mark the tournament completed.
pub fn apply_settlement(
    tournament: &mut Tournament,
    settlement: &Settlement,
    ranking: &Ranking,
    history: &mut History,
) -> Result<(), TournamentError> {
    if settlement.tournament_id != tournament.id {
        return Err(TournamentError::InvalidState);
    }
    if tournament.status == TournamentStatus::Completed
        || history.contains_tournament(tournament.id)
    {
        return Err(TournamentError::AlreadySettled(tournament.id));
    }
    for p in &settlement.record.participants {
        ranking.credit(p.player_id, p.points_earned);
    }
    history.append(settlement.record.clone());
    tournament.status = TournamentStatus::Completed;
    log::info!(
        "Settled tournament {} ({}): {} participants, {} points awarded",
        tournament.name,
        tournament.id,
        settlement.record.participants.len(),
        settlement
            .record
            .participants
            .iter()
            .map(|p| p.points_earned)
            .sum::<u64>()
    );
    Ok(())
}

/// Prepare and apply in one step.
pub fn settle_tournament(
    tournament: &mut Tournament,
    ladder: &PointsLadder,
    players: &PlayerRegistry,
    ranking: &Ranking,
    history: &mut History,
) -> Result<Settlement, TournamentError> {
    let settlement = prepare_settlement(tournament, ladder, players)?;
    apply_settlement(tournament, &settlement, ranking, history)?;
    Ok(settlement)
}
