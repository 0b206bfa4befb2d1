use migration::{Migrator, MigratorTrait};
use server::{ServerState, WelcomeNotifier};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "haulage={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = connect(&settings.server.database).await?;
    let engine = engine::Engine::builder().database(db).build().await?;
    let notifier = WelcomeNotifier::from_webhook(settings.notifications.webhook_url);
    if matches!(notifier, WelcomeNotifier::Log) {
        tracing::info!("no webhook configured, welcome messages go to the log");
    }

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    server::run_with_listener(ServerState::new(engine, notifier), listener).await?;
    Ok(())
}

async fn connect(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let database = sea_orm::Database::connect(config.url()).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
