use crate::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}

pub async fn health_check(pool: &PgPool) -> Result<String, sqlx::Error> {
    let row: (String,) = sqlx::query_as("SELECT version()").fetch_one(pool).await?;
    Ok(row.0)
}

/// Create the `proverbs` table and its indexes if they do not exist yet.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS proverbs (
            id           UUID PRIMARY KEY,
            text         TEXT NOT NULL,
            meaning      TEXT NOT NULL DEFAULT '',
            category     TEXT,
            region       TEXT,
            keywords     TEXT[] NOT NULL DEFAULT '{}',
            image_prompt TEXT,
            image_url    TEXT,
            validated    BOOLEAN NOT NULL DEFAULT FALSE,
            popularity   BIGINT NOT NULL DEFAULT 0,
            search_text  TEXT NOT NULL DEFAULT '',
            created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    let indexes = [
        "CREATE INDEX IF NOT EXISTS proverbs_validated_popularity_idx ON proverbs (validated, popularity DESC)",
        "CREATE INDEX IF NOT EXISTS proverbs_validated_created_idx ON proverbs (validated, created_at DESC)",
        "CREATE INDEX IF NOT EXISTS proverbs_category_idx ON proverbs (category)",
        "CREATE INDEX IF NOT EXISTS proverbs_region_idx ON proverbs (region)",
        "CREATE INDEX IF NOT EXISTS proverbs_lower_text_idx ON proverbs (lower(text))",
    ];
    for statement in indexes {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("Database schema is up to date");
    Ok(())
}
