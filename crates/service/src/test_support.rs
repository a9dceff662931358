#![cfg(test)]
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

/// Fresh throwaway SQLite database under the temp dir with the full
/// schema applied. Each call returns an isolated database.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let path = std::env::temp_dir().join(format!("blog_test_{}.db", uuid::Uuid::new_v4()));
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let db = sea_orm::Database::connect(url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
