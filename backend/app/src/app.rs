use sea_orm::DatabaseConnection;

use crate::{api, config, database, logger, server::Server};
use migration::{Migrator, MigratorTrait};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub async fn run() -> anyhow::Result<()> {
    let config = config::get();

    logger::init(config.logger());

    tracing::info!("Starting application...");

    let db = database::init().await?;

    Migrator::up(&db, None).await?;
    tracing::info!("Migrations applied");

    let state = AppState::new(db);

    let server = Server::new(config.server());

    server.start(state, api::create_router()).await
}
