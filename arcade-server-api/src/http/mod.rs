use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use log::warn;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::AppState;

mod account;
mod games;
mod stats;

pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/register", post(account::register))
        .route("/login", post(account::login))
        .route("/logout", post(account::logout))
        .route("/me", get(account::me))
        .route(
            "/players/{id}",
            get(account::get_player).delete(account::delete_player),
        )
        .route("/games", post(games::submit_game))
        .route("/games/me", get(games::my_games))
        .route("/stats/me", get(stats::my_stats))
        .route("/leaderboard", get(stats::leaderboard))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            // a wildcard cannot be combined with credentialed requests
            if origin.trim() == "*" {
                warn!("Ignoring wildcard CORS origin, list origins explicitly");
                return None;
            }
            match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin {:?}", origin);
                    None
                }
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
}
