use std::sync::Arc;

use crate::{
    credentials::{CredentialManager, HashConfig},
    game::{ArcGameRepository, ArcGameService, GameServiceImpl},
    jwt::ArcJwtService,
    player::{ArcPlayerRepository, ArcPlayerService, PlayerServiceImpl},
    stats::{ArcStatsRepository, ArcStatsService, StatsServiceImpl},
};

#[derive(Clone)]
pub struct Application {
    pub player_service: ArcPlayerService,
    pub game_service: ArcGameService,
    pub stats_service: ArcStatsService,
    pub jwt_service: ArcJwtService,
}

pub fn construct_app(
    hash_config: HashConfig,
    player_repository: ArcPlayerRepository,
    game_repository: ArcGameRepository,
    stats_repository: ArcStatsRepository,
    jwt_service: ArcJwtService,
) -> Application {
    let player_service: ArcPlayerService = Arc::new(Box::new(PlayerServiceImpl::new(
        CredentialManager::new(hash_config),
        jwt_service.clone(),
        player_repository,
    )));

    let game_service: ArcGameService = Arc::new(Box::new(GameServiceImpl::new(game_repository)));

    let stats_service: ArcStatsService =
        Arc::new(Box::new(StatsServiceImpl::new(stats_repository)));

    Application {
        player_service,
        game_service,
        stats_service,
        jwt_service,
    }
}
