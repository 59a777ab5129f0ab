//! Single binary web server exposing the tournament API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, DATA_DIR (JSON data folder), POINTS_CONFIG (ladder file).

use actix_web::{web::Data, App, HttpResponse, HttpServer};
use club_ladder::api::{self, SharedService};
use club_ladder::{JsonFileStore, ServerConfig, Store, TournamentService};

/// Avoid 404 in browser tab: favicon not required for app logic.
#[actix_web::get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

fn to_io(e: impl std::error::Error + Send + Sync + 'static) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let ladder = config.load_ladder().map_err(to_io)?;
    let store: Box<dyn Store> = Box::new(JsonFileStore::open(config.data_dir.clone()).map_err(to_io)?);
    let service: SharedService = TournamentService::open(store, ladder).map_err(to_io)?;
    log::info!(
        "Data in {}, ladder sizes {:?}",
        config.data_dir.display(),
        service.ladder().sizes().collect::<Vec<_>>()
    );

    let state = Data::new(service);
    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(favicon)
            .configure(api::configure)
    })
    .bind(bind)?
    .run()
    .await
}
