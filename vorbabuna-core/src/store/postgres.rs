use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{ProverbFilter, ProverbStore, SortOrder, StoreResult, Visibility};
use crate::models::stats::rounded_average;
use crate::models::{
    CategoryStat, DailyActivity, NewProverb, OverallStats, Proverb, RegionStat,
};
use crate::text;

const COLUMNS: &str = "id, text, meaning, category, region, keywords, image_prompt, image_url, \
                       validated, popularity, created_at, updated_at";

/// Postgres-backed proverb store.
#[derive(Debug, Clone)]
pub struct PgProverbStore {
    pool: PgPool,
}

impl PgProverbStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProverbFilter) {
    qb.push(" WHERE TRUE");
    match filter.visibility {
        Visibility::Validated => {
            qb.push(" AND validated");
        }
        Visibility::Pending => {
            qb.push(" AND NOT validated");
        }
        Visibility::All => {}
    }
    if let Some(category) = &filter.category {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(region) = &filter.region {
        qb.push(" AND region = ").push_bind(region.clone());
    }
    if let Some(needle) = filter.needle() {
        qb.push(" AND search_text LIKE ")
            .push_bind(format!("%{}%", text::escape_like(&needle)));
    }
    if let Some(affinity) = &filter.affinity {
        qb.push(" AND (category = ANY(")
            .push_bind(affinity.categories.clone())
            .push(") OR region = ANY(")
            .push_bind(affinity.regions.clone())
            .push("))");
    }
    if !filter.exclude.is_empty() {
        qb.push(" AND NOT (id = ANY(")
            .push_bind(filter.exclude.clone())
            .push("))");
    }
}

fn order_clause(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Popularity => " ORDER BY popularity DESC, created_at DESC, id ASC",
        SortOrder::Newest => " ORDER BY created_at DESC, id ASC",
        SortOrder::Oldest => " ORDER BY created_at ASC, id ASC",
    }
}

#[async_trait]
impl ProverbStore for PgProverbStore {
    async fn health(&self) -> StoreResult<String> {
        Ok(crate::db::health_check(&self.pool).await?)
    }

    async fn insert(&self, new: NewProverb) -> StoreResult<Proverb> {
        let search_text = text::search_document(&new.text, &new.meaning, &new.keywords);
        let sql = format!(
            r#"
            INSERT INTO proverbs
                (id, text, meaning, category, region, keywords, image_prompt, image_url,
                 validated, popularity, search_text, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, $10, NOW(), NOW())
            RETURNING {COLUMNS}
            "#
        );
        let proverb = sqlx::query_as::<_, Proverb>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.text)
            .bind(&new.meaning)
            .bind(&new.category)
            .bind(&new.region)
            .bind(&new.keywords)
            .bind(&new.image_prompt)
            .bind(&new.image_url)
            .bind(new.validated)
            .bind(&search_text)
            .fetch_one(&self.pool)
            .await?;
        Ok(proverb)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Proverb>> {
        let sql = format!("SELECT {COLUMNS} FROM proverbs WHERE id = $1");
        Ok(sqlx::query_as::<_, Proverb>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_many(&self, ids: &[Uuid]) -> StoreResult<Vec<Proverb>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {COLUMNS} FROM proverbs WHERE id = ANY($1)");
        Ok(sqlx::query_as::<_, Proverb>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_by_text(&self, text: &str) -> StoreResult<Option<Proverb>> {
        let sql = format!("SELECT {COLUMNS} FROM proverbs WHERE lower(text) = lower($1) LIMIT 1");
        Ok(sqlx::query_as::<_, Proverb>(&sql)
            .bind(text)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self, filter: &ProverbFilter) -> StoreResult<Vec<Proverb>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM proverbs"));
        push_filter(&mut qb, filter);
        qb.push(order_clause(filter.order));
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }
        if filter.offset > 0 {
            qb.push(" OFFSET ").push_bind(filter.offset);
        }
        Ok(qb
            .build_query_as::<Proverb>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count(&self, filter: &ProverbFilter) -> StoreResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM proverbs");
        push_filter(&mut qb, filter);
        let (count,): (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn increment_popularity(&self, id: Uuid) -> StoreResult<Option<i64>> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE proverbs
            SET popularity = popularity + 1,
                updated_at = NOW()
            WHERE id = $1
            RETURNING popularity
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(popularity,)| popularity))
    }

    async fn approve(&self, ids: &[Uuid]) -> StoreResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE proverbs SET validated = TRUE, updated_at = NOW() WHERE id = ANY($1)",
        )
        .bind(ids)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, ids: &[Uuid]) -> StoreResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM proverbs WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn purge(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM proverbs")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn set_image(&self, id: Uuid, prompt: &str, url: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE proverbs
            SET image_prompt = $2,
                image_url = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(prompt)
        .bind(url)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn category_stats(&self) -> StoreResult<Vec<CategoryStat>> {
        let rows: Vec<(String, i64, i64)> = sqlx::query_as(
            r#"
            SELECT COALESCE(category, 'Unknown') AS category,
                   COUNT(*) AS count,
                   COALESCE(SUM(popularity), 0)::BIGINT AS total_views
            FROM proverbs
            WHERE validated
            GROUP BY COALESCE(category, 'Unknown')
            ORDER BY total_views DESC, category ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(category, count, total_views)| CategoryStat {
                category,
                count,
                total_views,
                average_views: rounded_average(total_views, count),
            })
            .collect())
    }

    async fn region_stats(&self) -> StoreResult<Vec<RegionStat>> {
        let rows: Vec<(String, i64, i64)> = sqlx::query_as(
            r#"
            SELECT region,
                   COUNT(*) AS count,
                   COALESCE(SUM(popularity), 0)::BIGINT AS total_views
            FROM proverbs
            WHERE validated AND region IS NOT NULL
            GROUP BY region
            ORDER BY count DESC, region ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(region, count, total_views)| RegionStat {
                region,
                count,
                total_views,
            })
            .collect())
    }

    async fn overall_stats(&self) -> StoreResult<OverallStats> {
        let (total, validated, views): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE validated),
                   COALESCE(SUM(popularity), 0)::BIGINT
            FROM proverbs
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(OverallStats {
            total_proverbs: total,
            validated_proverbs: validated,
            pending_proverbs: total - validated,
            total_views: views,
            average_views_per_proverb: rounded_average(views, total),
        })
    }

    async fn daily_activity(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<DailyActivity>> {
        let rows: Vec<(NaiveDate, i64, i64)> = sqlx::query_as(
            r#"
            SELECT (created_at AT TIME ZONE 'UTC')::date AS day,
                   COUNT(*) AS created,
                   COALESCE(SUM(popularity), 0)::BIGINT AS popularity
            FROM proverbs
            WHERE created_at BETWEEN $1 AND $2
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(day, created, popularity)| DailyActivity {
                day,
                created,
                popularity,
            })
            .collect())
    }
}
