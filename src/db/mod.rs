use sqlx::{postgres::PgPoolOptions, PgPool, Result};

pub mod queries;
pub mod store;

pub use store::{MemoryProgressStore, PgProgressStore, ProgressStore};

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
