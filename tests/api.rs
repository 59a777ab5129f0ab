//! HTTP tests: handlers wired to an in-memory store.

use actix_web::http::StatusCode;
use actix_web::{test, web::Data, App};
use club_ladder::api::{self, SharedService};
use club_ladder::{MemoryStore, PointsLadder, Store, TournamentService};
use serde_json::{json, Value};

fn state() -> Data<SharedService> {
    let store: Box<dyn Store> = Box::new(MemoryStore::new());
    Data::new(TournamentService::open(store, PointsLadder::club_default()).unwrap())
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(App::new().app_data($state.clone()).configure(api::configure)).await
    };
}

#[actix_web::test]
async fn health_reports_ok() {
    let state = state();
    let app = app!(state);
    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["ok"], json!(true));
}

#[actix_web::test]
async fn duplicate_player_name_is_bad_request() {
    let state = state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/players")
        .set_json(json!({ "name": "Rosa" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/players")
        .set_json(json!({ "name": " rosa " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn unknown_tournament_is_not_found() {
    let state = state();
    let app = app!(state);
    let req = test::TestRequest::get()
        .uri(&format!("/api/tournaments/{}", uuid::Uuid::new_v4()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn tournament_flow_over_http() {
    let state = state();
    let app = app!(state);

    let mut ids = Vec::new();
    for name in ["Ana", "Ben", "Cleo", "Dev"] {
        let req = test::TestRequest::post()
            .uri("/api/players")
            .set_json(json!({ "name": name }))
            .to_request();
        let player: Value = test::call_and_read_body_json(&app, req).await;
        ids.push(player["id"].as_str().unwrap().to_string());
    }

    let req = test::TestRequest::post()
        .uri("/api/tournaments")
        .set_json(json!({ "name": "Club Night", "participants": ids }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let t: Value = test::read_body_json(resp).await;
    let tid = t["id"].as_str().unwrap().to_string();
    assert_eq!(t["bracket_size"], json!(4));

    // Settling before the final is a conflict.
    let req = test::TestRequest::post()
        .uri(&format!("/api/tournaments/{}/settle", tid))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    // Favourites win: Ana, Ben, then Ana in the final.
    let mut last = Value::Null;
    for _ in 0..2 {
        let t = state.tournament(tid.parse().unwrap()).unwrap();
        let pending: Vec<_> = t.pending_matches().into_iter().cloned().collect();
        for m in pending {
            let req = test::TestRequest::put()
                .uri(&format!("/api/tournaments/{}/matches/{}/winner", tid, m.id))
                .set_json(json!({ "winner": m.player1, "score": "11-7" }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            last = test::read_body_json(resp).await;
        }
    }
    assert_eq!(last["advance"]["result"], json!("finished"));

    // The final cannot be decided again.
    let t = state.tournament(tid.parse().unwrap()).unwrap();
    let final_match = t.round_matches(2)[0].clone();
    let req = test::TestRequest::put()
        .uri(&format!("/api/tournaments/{}/matches/{}/winner", tid, final_match.id))
        .set_json(json!({ "winner": final_match.player2 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri(&format!("/api/tournaments/{}/settle", tid))
        .to_request();
    let settlement: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(settlement["record"]["participants"].as_array().map(Vec::len), Some(4));

    let req = test::TestRequest::post()
        .uri(&format!("/api/tournaments/{}/settle", tid))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get().uri("/api/rankings").to_request();
    let standings: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(standings[0]["name"], json!("Ana"));
    assert_eq!(standings[0]["points"], json!(100));

    let req = test::TestRequest::get().uri("/api/rankings.csv").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let csv = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("rank,"));
    assert!(lines.next().unwrap().contains("Ana"));

    let req = test::TestRequest::get()
        .uri(&format!("/api/h2h/{}/{}", ids[0], ids[1]))
        .to_request();
    let h2h: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(h2h["wins_a"], json!(1));
    assert_eq!(h2h["wins_b"], json!(0));
}
