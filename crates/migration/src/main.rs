use sea_orm::Database;
use sea_orm_migration::prelude::*;

use migration::Migrator;

const DEFAULT_DATABASE_URL: &str = "sqlite:./haulage.db?mode=rwc";

fn usage() -> ! {
    eprintln!("usage: migration [up|down|fresh|refresh|status] (DATABASE_URL overrides the target)");
    std::process::exit(2)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let command = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    let url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    let db = Database::connect(&url).await?;
    match command.as_str() {
        "up" => Migrator::up(&db, None).await?,
        // Rolls back only the latest migration.
        "down" => Migrator::down(&db, Some(1)).await?,
        "fresh" => Migrator::fresh(&db).await?,
        "refresh" => Migrator::refresh(&db).await?,
        "status" => Migrator::status(&db).await?,
        _ => usage(),
    }
    println!("{command}: done ({url})");

    Ok(())
}
