//! Integration tests for starting tournaments, recording results and round advancement.

use chrono::NaiveDate;
use club_ladder::{
    record_result, start_tournament, Advance, PlayerId, PlayerRegistry, Stage, Tournament,
    TournamentError, TournamentFormat,
};
use uuid::Uuid;

fn registry_with_players(n: usize) -> (PlayerRegistry, Vec<PlayerId>) {
    let mut registry = PlayerRegistry::new();
    let ids = (0..n)
        .map(|i| registry.add_player(&format!("P{}", i + 1)).unwrap().id)
        .collect();
    (registry, ids)
}

fn started(n: usize, format: TournamentFormat) -> (Tournament, Vec<PlayerId>) {
    let (registry, ids) = registry_with_players(n);
    let date = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
    let mut t = Tournament::new(&registry, "Spring Open", date, format, ids.clone()).unwrap();
    start_tournament(&mut t).unwrap();
    (t, ids)
}

/// Decide every open match for the better seed; returns the last advance.
fn play_round_favourites_win(t: &mut Tournament) -> Advance {
    let pending: Vec<_> = t
        .pending_matches()
        .iter()
        .map(|m| (m.id, m.player1, m.player2.unwrap()))
        .collect();
    let mut last = Advance::RoundPending;
    for (id, a, b) in pending {
        let winner = if t.participants.seed_of(a) < t.participants.seed_of(b) { a } else { b };
        last = record_result(t, id, winner, None).unwrap();
    }
    last
}

#[test]
fn five_player_bracket_materializes_byes() {
    let (t, p) = started(5, TournamentFormat::SingleElimination);
    assert_eq!(t.stage, Stage::InProgress { round_size: 5 });
    assert_eq!(t.bracket_size, 8);
    assert_eq!(t.rounds.get(&5), Some(&p));

    let round = t.round_matches(5);
    assert_eq!(round.len(), 4);
    for (slot, &seed) in p[..3].iter().enumerate() {
        assert!(round[slot].is_bye());
        assert_eq!(round[slot].winner, Some(seed));
        assert_eq!(round[slot].position, slot);
    }
    assert_eq!(round[3].player1, p[3]);
    assert_eq!(round[3].player2, Some(p[4]));
    assert_eq!(t.pending_matches().len(), 1);
}

#[test]
fn four_player_scenario_runs_to_champion() {
    let (mut t, p) = started(4, TournamentFormat::SingleElimination);
    let (a, b, c, d) = (p[0], p[1], p[2], p[3]);
    let first = t.round_matches(4);
    assert_eq!((first[0].player1, first[0].player2), (a, Some(d)));
    assert_eq!((first[1].player1, first[1].player2), (b, Some(c)));
    let (m_ad, m_bc) = (first[0].id, first[1].id);

    assert_eq!(
        record_result(&mut t, m_ad, a, Some("6-3 6-2".into())).unwrap(),
        Advance::RoundPending
    );
    assert_eq!(
        record_result(&mut t, m_bc, b, None).unwrap(),
        Advance::RoundAdvanced { next_round_size: 2 }
    );
    assert_eq!(t.rounds.get(&2), Some(&vec![a, b]));
    assert_eq!(t.stage, Stage::InProgress { round_size: 2 });

    let final_id = t.round_matches(2)[0].id;
    assert_eq!(
        record_result(&mut t, final_id, a, None).unwrap(),
        Advance::Finished { champion: a }
    );
    assert_eq!(t.stage, Stage::Finished);
    assert_eq!(t.champion(), Some(a));
    assert_eq!(t.rounds.keys().copied().collect::<Vec<_>>(), vec![1, 2, 4]);
}

#[test]
fn bye_players_keep_their_bracket_slots() {
    let (mut t, p) = started(5, TournamentFormat::SingleElimination);
    let only = t.pending_matches()[0].id;
    // Upset: seed 5 beats seed 4 and takes slot 3.
    let adv = record_result(&mut t, only, p[4], None).unwrap();
    assert_eq!(adv, Advance::RoundAdvanced { next_round_size: 4 });
    assert_eq!(t.rounds.get(&4), Some(&vec![p[0], p[1], p[2], p[4]]));

    // Seed 1 meets the first-round winner, seed 2 meets seed 3.
    let semis = t.round_matches(4);
    assert_eq!((semis[0].player1, semis[0].player2), (p[0], Some(p[4])));
    assert_eq!((semis[1].player1, semis[1].player2), (p[1], Some(p[2])));
}

#[test]
fn standard_eight_bracket_tree() {
    let (mut t, p) = started(8, TournamentFormat::SingleElimination);
    play_round_favourites_win(&mut t);
    assert_eq!(t.rounds.get(&4), Some(&vec![p[0], p[1], p[2], p[3]]));
    // 1 v 4 and 2 v 3, the seeded semifinals.
    let semis = t.round_matches(4);
    assert_eq!((semis[0].player1, semis[0].player2), (p[0], Some(p[3])));
    assert_eq!((semis[1].player1, semis[1].player2), (p[1], Some(p[2])));
}

#[test]
fn every_round_halves_and_only_holds_advancers() {
    for n in 2..=33 {
        let (mut t, _) = started(n, TournamentFormat::SingleElimination);
        let mut guard = 0;
        while !t.is_finished() {
            let size = match t.stage {
                Stage::InProgress { round_size } => round_size,
                other => panic!("unexpected stage {:?}", other),
            };
            play_round_favourites_win(&mut t);
            let next_size = if size == n { t.bracket_size / 2 } else { size / 2 };
            let next = t.rounds.get(&next_size).expect("next round recorded");
            assert_eq!(next.len(), next_size, "n = {}", n);
            for p in next {
                assert!(t
                    .round_matches(size)
                    .iter()
                    .any(|m| m.winner == Some(*p)));
            }
            guard += 1;
            assert!(guard < 10);
        }
        assert_eq!(t.champion(), Some(t.participants.as_slice()[0]));
        assert_eq!(t.rounds.get(&1).map(Vec::len), Some(1));
    }
}

#[test]
fn deciding_a_match_twice_keeps_the_first_result() {
    let (mut t, p) = started(4, TournamentFormat::SingleElimination);
    let m = t.round_matches(4)[0].id;
    record_result(&mut t, m, p[0], Some("6-4 6-4".into())).unwrap();

    let err = record_result(&mut t, m, p[3], Some("0-6 0-6".into())).unwrap_err();
    assert_eq!(err, TournamentError::AlreadyDecided { match_id: m, winner: p[0] });
    let stored = t.get_match(m).unwrap();
    assert_eq!(stored.winner, Some(p[0]));
    assert_eq!(stored.score.as_deref(), Some("6-4 6-4"));
}

#[test]
fn unknown_match_and_outsider_winner_are_rejected() {
    let (mut t, p) = started(4, TournamentFormat::SingleElimination);
    let missing = Uuid::new_v4();
    assert_eq!(
        record_result(&mut t, missing, p[0], None),
        Err(TournamentError::MatchNotFound { tournament_id: t.id, match_id: missing })
    );

    let m = t.round_matches(4)[0].id; // seed 1 v seed 4
    assert_eq!(
        record_result(&mut t, m, p[1], None),
        Err(TournamentError::InvalidWinner { match_id: m, winner: p[1] })
    );
    assert!(t.get_match(m).unwrap().winner.is_none());
}

#[test]
fn bye_matches_cannot_be_recorded() {
    let (mut t, p) = started(3, TournamentFormat::SingleElimination);
    let bye = t.round_matches(3)[0].id;
    assert!(matches!(
        record_result(&mut t, bye, p[0], None),
        Err(TournamentError::AlreadyDecided { .. })
    ));
}

#[test]
fn start_only_from_setup() {
    let (mut t, _) = started(4, TournamentFormat::SingleElimination);
    assert_eq!(start_tournament(&mut t), Err(TournamentError::InvalidState));
}

#[test]
fn new_tournament_checks_roster() {
    let (mut registry, ids) = registry_with_players(3);
    let date = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
    let stranger = Uuid::new_v4();
    let err = Tournament::new(
        &registry,
        "Cup",
        date,
        TournamentFormat::SingleElimination,
        vec![ids[0], stranger],
    )
    .unwrap_err();
    assert_eq!(err, TournamentError::UnknownPlayer(stranger));

    registry.remove_player(ids[2]).unwrap();
    let err = Tournament::new(&registry, "Cup", date, TournamentFormat::RoundRobin, ids.clone())
        .unwrap_err();
    assert_eq!(err, TournamentError::InactivePlayer(ids[2]));

    let err = Tournament::new(&registry, "Cup", date, TournamentFormat::RoundRobin, vec![ids[0]])
        .unwrap_err();
    assert_eq!(err, TournamentError::InsufficientParticipants { count: 1 });

    let err = Tournament::new(
        &registry,
        " \t",
        date,
        TournamentFormat::RoundRobin,
        ids[..2].to_vec(),
    )
    .unwrap_err();
    assert_eq!(err, TournamentError::InvalidTournamentName);
}

#[test]
fn round_robin_finishes_when_all_matches_decided() {
    let (mut t, p) = started(3, TournamentFormat::RoundRobin);
    assert_eq!(t.matches.len(), 3);
    assert!(t.matches.iter().all(|m| m.round_size == 3 && !m.is_bye()));

    // Seed 2 wins everything.
    let ids: Vec<_> = t.matches.iter().map(|m| (m.id, m.player1, m.player2.unwrap())).collect();
    let mut last = Advance::RoundPending;
    for (id, a, b) in ids {
        let winner = if a == p[1] || b == p[1] { p[1] } else { a };
        last = record_result(&mut t, id, winner, None).unwrap();
    }
    assert_eq!(last, Advance::Finished { champion: p[1] });
    assert_eq!(t.rounds.get(&1), Some(&vec![p[1]]));
    assert_eq!(t.rounds.get(&3), Some(&p));
}

#[test]
fn round_robin_tie_goes_to_better_seed() {
    let (mut t, p) = started(3, TournamentFormat::RoundRobin);
    // A cycle: P1 > P2, P2 > P3, P3 > P1; everyone has one win.
    let beats = [(p[0], p[1]), (p[1], p[2]), (p[2], p[0])];
    let ids: Vec<_> = t.matches.iter().map(|m| (m.id, m.player1, m.player2.unwrap())).collect();
    for (id, a, b) in ids {
        let winner = beats
            .iter()
            .find(|(w, l)| (*w == a && *l == b) || (*w == b && *l == a))
            .map(|(w, _)| *w)
            .unwrap();
        record_result(&mut t, id, winner, None).unwrap();
    }
    assert_eq!(t.champion(), Some(p[0]));
}
