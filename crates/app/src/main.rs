use std::net::SocketAddr;

use migration::{Migrator, MigratorTrait};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "family_money={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let listen = settings.server;
    let db = connect_database(&listen.database).await?;
    let engine = engine::Engine::builder().database(db).build().await?;

    let addr: SocketAddr = format!("{}:{}", listen.bind, listen.port).parse()?;
    server::run(engine, addr, listen.cors_origins).await;

    Ok(())
}

async fn connect_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let database = sea_orm::Database::connect(config.url()).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
