//! Read-only bracket view for rendering: rounds, matches and the links between them.

use crate::models::{
    Match, MatchId, PlayerId, PlayerRegistry, Stage, Tournament, TournamentFormat, TournamentId,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchView {
    pub match_id: MatchId,
    pub position: usize,
    pub player1: PlayerId,
    pub player1_name: String,
    pub player2: Option<PlayerId>,
    pub player2_name: Option<String>,
    pub winner: Option<PlayerId>,
    pub score: Option<String>,
    pub bye: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundView {
    pub round_size: usize,
    pub players: Vec<PlayerId>,
    pub matches: Vec<MatchView>,
    pub current: bool,
}

/// `from` feeds its winner into `to`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketEdge {
    pub from: MatchId,
    pub to: MatchId,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketView {
    pub tournament_id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    pub stage: Stage,
    pub bracket_size: usize,
    /// Largest round first.
    pub rounds: Vec<RoundView>,
    pub edges: Vec<BracketEdge>,
    pub champion: Option<PlayerId>,
}

/// Derive the view from the round map and match set. Owns no state; call again after changes.
pub fn bracket_view(tournament: &Tournament, players: &PlayerRegistry) -> BracketView {
    let current = match tournament.stage {
        Stage::InProgress { round_size } => Some(round_size),
        _ => None,
    };
    let rounds: Vec<RoundView> = tournament
        .rounds
        .iter()
        .rev()
        .map(|(&round_size, members)| RoundView {
            round_size,
            players: members.clone(),
            matches: tournament
                .round_matches(round_size)
                .into_iter()
                .map(|m| match_view(m, players))
                .collect(),
            current: current == Some(round_size),
        })
        .collect();

    BracketView {
        tournament_id: tournament.id,
        name: tournament.name.clone(),
        format: tournament.format,
        stage: tournament.stage,
        bracket_size: tournament.bracket_size,
        edges: elimination_edges(tournament),
        rounds,
        champion: tournament.champion(),
    }
}

fn match_view(m: &Match, players: &PlayerRegistry) -> MatchView {
    MatchView {
        match_id: m.id,
        position: m.position,
        player1: m.player1,
        player1_name: players.name_of(m.player1),
        player2: m.player2,
        player2_name: m.player2.map(|p| players.name_of(p)),
        winner: m.winner,
        score: m.score.clone(),
        bye: m.is_bye(),
    }
}

/// A winner in slot `p` of a round of `s` plays in the next round's match `min(p, s - 1 - p)`.
fn elimination_edges(tournament: &Tournament) -> Vec<BracketEdge> {
    if tournament.format != TournamentFormat::SingleElimination {
        return Vec::new();
    }
    let sizes: Vec<usize> = tournament.rounds.keys().rev().copied().collect();
    let mut edges = Vec::new();
    for pair in sizes.windows(2) {
        let (this_round, next_round) = (pair[0], pair[1]);
        let targets = tournament.round_matches(next_round);
        if targets.is_empty() {
            continue;
        }
        for m in tournament.round_matches(this_round) {
            let slot = m.position.min(next_round - 1 - m.position);
            if let Some(to) = targets.iter().find(|t| t.position == slot) {
                edges.push(BracketEdge { from: m.id, to: to.id });
            }
        }
    }
    edges
}
