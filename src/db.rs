use sqlx::MySqlPool;
use tracing::info;

pub async fn init_db(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    let pool = MySqlPool::connect(database_url).await?;
    info!("Connected to MySQL");
    Ok(pool)
}
