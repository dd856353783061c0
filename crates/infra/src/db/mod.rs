use sqlx::migrate::Migrator;
use sqlx::PgPool;

pub type Db = PgPool;

/// Embedded schema migrations, shared by the server binary and the test harness.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn ping(pool: &Db) -> Result<(), sqlx::Error> {
    let _: i32 = sqlx::query_scalar("SELECT 1").fetch_one(pool).await?;
    Ok(())
}
