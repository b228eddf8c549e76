use std::sync::Arc;

use arcade_persistence_sqlite::{
    games::SqliteGameRepository, open_database, players::SqlitePlayerRepository,
    stats::SqliteStatsRepository,
};
use arcade_server_api::{AppState, JwtServiceImpl};
use arcade_server_domain::{
    app::construct_app, game::ArcGameRepository, jwt::ArcJwtService,
    player::ArcPlayerRepository, stats::ArcStatsRepository,
};
use log::{error, info};

use crate::config::ServerConfig;

mod config;
mod logs;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received. Preparing graceful exit...");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    let pool = open_database(&config.db_path).await?;

    let player_repo: ArcPlayerRepository =
        Arc::new(Box::new(SqlitePlayerRepository::new(pool.clone())));
    let game_repo: ArcGameRepository = Arc::new(Box::new(SqliteGameRepository::new(pool.clone())));
    let stats_repo: ArcStatsRepository =
        Arc::new(Box::new(SqliteStatsRepository::new(pool.clone())));
    let jwt_service: ArcJwtService = Arc::new(Box::new(JwtServiceImpl::new(
        config.jwt_secret.as_bytes(),
        config.session_ttl,
    )));

    let app = construct_app(config.hash, player_repo, game_repo, stats_repo, jwt_service);
    let state = AppState::new(app, config.cookie_secure);

    arcade_server_api::serve(state, &config.http, shutdown_signal()).await?;

    pool.close().await;
    info!("Database closed");
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    if let Err(e) = logs::init_logger() {
        eprintln!("Failed to initialize logger: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run().await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
}
