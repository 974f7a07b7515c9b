pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

use http::HeaderValue;
use tower_http::{cors::AllowOrigin, cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::db::{Database, DbInitError};
use crate::state::AppState;

/// Opens the database named in `config` and builds the full router.
pub async fn create_app(config: Config) -> Result<axum::Router, DbInitError> {
    let db = Database::connect(&config.database_url).await?;
    Ok(build_app(AppState::new(config, db)))
}

pub fn build_app(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config().cors_origins);

    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::permissive()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(false)
}
