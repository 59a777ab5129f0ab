//! Integration tests for head-to-head queries and the bracket view.

use chrono::NaiveDate;
use club_ladder::{
    bracket_view, head_to_head, record_result, start_tournament, Match, PlayerId, PlayerRegistry,
    Tournament, TournamentFormat,
};
use uuid::Uuid;

fn decided(a: PlayerId, b: PlayerId, winner: PlayerId) -> Match {
    let mut m = Match::new(Uuid::new_v4(), 2, 0, a, b);
    m.winner = Some(winner);
    m
}

#[test]
fn counts_meetings_in_either_order() {
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let pending = Match::new(Uuid::new_v4(), 2, 0, a, b);
    let bye = Match::bye(Uuid::new_v4(), 3, 0, a);
    let matches = vec![
        decided(a, b, a),
        decided(b, a, b),
        decided(b, a, a),
        decided(a, c, c),
        pending,
        bye,
    ];

    let h = head_to_head(&matches, a, b);
    assert_eq!((h.wins_a, h.wins_b), (2, 1));
    assert_eq!(h.matches.len(), 3);

    let flipped = head_to_head(&matches, b, a);
    assert_eq!((flipped.wins_a, flipped.wins_b), (1, 2));

    // Same input, same answer.
    assert_eq!(head_to_head(&matches, a, b), h);
}

#[test]
fn no_meetings_and_self_query_are_empty() {
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let matches = vec![decided(a, b, a)];
    let h = head_to_head(&matches, a, c);
    assert_eq!((h.wins_a, h.wins_b), (0, 0));
    assert!(h.matches.is_empty());
    assert!(head_to_head(&matches, a, a).matches.is_empty());
}

#[test]
fn bracket_view_links_rounds() {
    let mut registry = PlayerRegistry::new();
    let ids: Vec<PlayerId> = ["Ana", "Ben", "Cleo", "Dev", "Eli"]
        .iter()
        .map(|n| registry.add_player(n).unwrap().id)
        .collect();
    let mut t = Tournament::new(
        &registry,
        "Club Night",
        NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(),
        TournamentFormat::SingleElimination,
        ids.clone(),
    )
    .unwrap();
    start_tournament(&mut t).unwrap();
    let first = t.pending_matches()[0].id;
    record_result(&mut t, first, ids[3], Some("6-1".into())).unwrap();

    let view = bracket_view(&t, &registry);
    assert_eq!(view.rounds.len(), 2);
    assert_eq!(view.rounds[0].round_size, 5);
    assert_eq!(view.rounds[0].matches.len(), 4);
    assert_eq!(view.rounds[0].matches.iter().filter(|m| m.bye).count(), 3);
    assert!(view.rounds[1].current);
    assert_eq!(view.rounds[1].matches[0].player1_name, "Ana");
    assert_eq!(view.rounds[1].matches[0].player2_name.as_deref(), Some("Dev"));

    // Slots 0 and 3 feed semifinal 0; slots 1 and 2 feed semifinal 1.
    let semis = t.round_matches(4);
    let entry = t.round_matches(5);
    assert_eq!(view.edges.len(), 4);
    for (slot, target) in [(0, 0), (1, 1), (2, 1), (3, 0)] {
        assert!(view
            .edges
            .iter()
            .any(|e| e.from == entry[slot].id && e.to == semis[target].id));
    }
    assert!(view.champion.is_none());
}
