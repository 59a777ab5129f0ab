//! REST API over the tournament service. JSON in and out; CSV for exports.

use crate::export::{matches_csv, player_history_csv, standings_csv};
use crate::models::{ErrorKind, MatchId, PlayerId, TournamentError, TournamentId};
use crate::service::{NewTournament, ServiceError, TournamentService};
use crate::store::Store;
use actix_web::{
    delete, get, post, put,
    web::{self, Data, Json, Path},
    HttpResponse, Responder,
};
use serde::{Deserialize, Serialize};

/// Service type the handlers run against.
pub type SharedService = TournamentService<Box<dyn Store>>;

type AppState = Data<SharedService>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
}

#[derive(Deserialize)]
struct RecordResultBody {
    winner: PlayerId,
    #[serde(default)]
    score: Option<String>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct MatchPath {
    id: TournamentId,
    match_id: MatchId,
}

#[derive(Deserialize)]
struct PlayerPath {
    id: PlayerId,
}

#[derive(Deserialize)]
struct HeadToHeadPath {
    a: PlayerId,
    b: PlayerId,
}

fn error_response(e: &ServiceError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        ServiceError::TournamentNotFound(_)
        | ServiceError::Tournament(TournamentError::PlayerNotFound(_)) => {
            HttpResponse::NotFound().json(body)
        }
        ServiceError::Tournament(te) => match te.kind() {
            ErrorKind::Validation => HttpResponse::BadRequest().json(body),
            ErrorKind::State => HttpResponse::Conflict().json(body),
        },
        ServiceError::Store(se) => {
            log::error!("Store failure: {}", se);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn csv_response(result: Result<String, csv::Error>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(body),
        Err(e) => {
            log::error!("CSV export failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

/// Run a blocking service call (it may write to disk) off the async workers.
async fn blocking<T, F>(state: &AppState, f: F) -> Result<T, HttpResponse>
where
    T: Send + 'static,
    F: FnOnce(&SharedService) -> Result<T, ServiceError> + Send + 'static,
{
    let svc = state.clone();
    match web::block(move || f(&svc)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(error_response(&e)),
        Err(e) => {
            log::error!("Blocking task failed: {}", e);
            Err(HttpResponse::InternalServerError().json(serde_json::json!({ "error": "worker error" })))
        }
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "club-ladder",
    })
}

#[get("/api/players")]
async fn api_list_players(state: AppState) -> HttpResponse {
    HttpResponse::Ok().json(state.players())
}

/// Register a player (names are unique, case-insensitive).
#[post("/api/players")]
async fn api_add_player(state: AppState, body: Json<AddPlayerBody>) -> HttpResponse {
    let name = body.into_inner().name;
    match blocking(&state, move |svc| svc.register_player(&name)).await {
        Ok(player) => HttpResponse::Created().json(player),
        Err(resp) => resp,
    }
}

/// Soft-remove a player: history and points are kept.
#[delete("/api/players/{id}")]
async fn api_remove_player(state: AppState, path: Path<PlayerPath>) -> HttpResponse {
    let id = path.id;
    match blocking(&state, move |svc| svc.remove_player(id)).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(resp) => resp,
    }
}

#[get("/api/players/{id}/history")]
async fn api_player_history(state: AppState, path: Path<PlayerPath>) -> HttpResponse {
    match state.player_history(path.id) {
        Ok(h) => HttpResponse::Ok().json(h),
        Err(e) => error_response(&e),
    }
}

#[get("/api/players/{id}/history.csv")]
async fn api_player_history_csv(state: AppState, path: Path<PlayerPath>) -> HttpResponse {
    match state.player_history(path.id) {
        Ok(h) => csv_response(player_history_csv(&h)),
        Err(e) => error_response(&e),
    }
}

#[get("/api/rankings")]
async fn api_rankings(state: AppState) -> HttpResponse {
    HttpResponse::Ok().json(state.standings())
}

#[get("/api/rankings.csv")]
async fn api_rankings_csv(state: AppState) -> HttpResponse {
    csv_response(standings_csv(&state.standings()))
}

#[get("/api/history")]
async fn api_history(state: AppState) -> HttpResponse {
    HttpResponse::Ok().json(state.history())
}

#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState) -> HttpResponse {
    HttpResponse::Ok().json(state.tournaments())
}

/// Create a tournament from an ordered roster and draw its first round.
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<NewTournament>) -> HttpResponse {
    let new = body.into_inner();
    match blocking(&state, move |svc| svc.create_tournament(new)).await {
        Ok(t) => HttpResponse::Created().json(t),
        Err(resp) => resp,
    }
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.tournament(path.id) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(&e),
    }
}

#[get("/api/tournaments/{id}/bracket")]
async fn api_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.bracket(path.id) {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(&e),
    }
}

#[get("/api/tournaments/{id}/matches.csv")]
async fn api_matches_csv(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.tournament(path.id) {
        Ok(t) => csv_response(state.with_players(|players| matches_csv(&t, players))),
        Err(e) => error_response(&e),
    }
}

/// Record the winner of one match; may close the round and draw the next.
#[put("/api/tournaments/{id}/matches/{match_id}/winner")]
async fn api_record_result(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<RecordResultBody>,
) -> HttpResponse {
    let (id, match_id) = (path.id, path.match_id);
    let RecordResultBody { winner, score } = body.into_inner();
    match blocking(&state, move |svc| svc.record_result(id, match_id, winner, score)).await {
        Ok((tournament, advance)) => HttpResponse::Ok().json(serde_json::json!({
            "tournament": tournament,
            "advance": advance,
        })),
        Err(resp) => resp,
    }
}

/// Settle a finished tournament into the ranking (once).
#[post("/api/tournaments/{id}/settle")]
async fn api_settle(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let id = path.id;
    match blocking(&state, move |svc| svc.settle(id)).await {
        Ok(settlement) => HttpResponse::Ok().json(settlement),
        Err(resp) => resp,
    }
}

#[get("/api/h2h/{a}/{b}")]
async fn api_head_to_head(state: AppState, path: Path<HeadToHeadPath>) -> HttpResponse {
    HttpResponse::Ok().json(state.head_to_head(path.a, path.b))
}

/// Register every API route. The caller supplies `Data<SharedService>` via `app_data`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(api_health)
        .service(api_list_players)
        .service(api_add_player)
        .service(api_remove_player)
        .service(api_player_history_csv)
        .service(api_player_history)
        .service(api_rankings_csv)
        .service(api_rankings)
        .service(api_history)
        .service(api_list_tournaments)
        .service(api_create_tournament)
        .service(api_bracket)
        .service(api_matches_csv)
        .service(api_get_tournament)
        .service(api_record_result)
        .service(api_settle)
        .service(api_head_to_head);
}
