//! Proverb persistence.
//!
//! `ProverbStore` is the seam between the HTTP subsystems and storage. Queries
//! are described by a typed [`ProverbFilter`] rather than ad-hoc filter maps,
//! and both implementations interpret it identically:
//! - [`PgProverbStore`]: Postgres through sqlx
//! - [`MemoryProverbStore`]: process-local, for development runs and tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use uuid::Uuid;

use crate::error::VorbaError;
use crate::models::{
    CategoryStat, DailyActivity, NewProverb, OverallStats, Proverb, RegionStat,
};
use crate::text;

pub mod memory;
pub mod postgres;

pub use memory::MemoryProverbStore;
pub use postgres::PgProverbStore;

pub type StoreResult<T> = Result<T, VorbaError>;

/// Which rows a query may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Public paths: `validated = true` only.
    #[default]
    Validated,
    /// Moderation queue: `validated = false` only.
    Pending,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// popularity desc, then created_at desc
    #[default]
    Popularity,
    /// created_at desc
    Newest,
    /// created_at asc; stable order for offset sampling
    Oldest,
}

/// Rows matching any preferred category OR any preferred region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Affinity {
    pub categories: Vec<String>,
    pub regions: Vec<String>,
}

impl Affinity {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.regions.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProverbFilter {
    pub visibility: Visibility,
    pub category: Option<String>,
    pub region: Option<String>,
    /// Raw user text; stores fold it before matching.
    pub text: Option<String>,
    pub affinity: Option<Affinity>,
    pub exclude: Vec<Uuid>,
    pub order: SortOrder,
    pub limit: Option<i64>,
    pub offset: i64,
}

impl ProverbFilter {
    pub fn validated() -> Self {
        Self::default()
    }

    pub fn pending() -> Self {
        Self {
            visibility: Visibility::Pending,
            ..Self::default()
        }
    }

    pub fn all() -> Self {
        Self {
            visibility: Visibility::All,
            ..Self::default()
        }
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit.max(0));
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset.max(0);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn affinity(mut self, affinity: Affinity) -> Self {
        self.affinity = Some(affinity);
        self
    }

    pub fn exclude(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.exclude.extend(ids);
        self
    }

    /// Folded substring the text filter looks for, if any.
    pub fn needle(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(|t| text::fold(t.trim()))
            .filter(|n| !n.is_empty())
    }

    /// Row predicate shared by the in-memory store and the tests. The Postgres
    /// store expresses the same conditions in SQL.
    pub fn matches(&self, proverb: &Proverb, needle: Option<&str>) -> bool {
        let visible = match self.visibility {
            Visibility::Validated => proverb.validated,
            Visibility::Pending => !proverb.validated,
            Visibility::All => true,
        };
        if !visible {
            return false;
        }
        if let Some(category) = &self.category {
            if proverb.category.as_ref() != Some(category) {
                return false;
            }
        }
        if let Some(region) = &self.region {
            if proverb.region.as_ref() != Some(region) {
                return false;
            }
        }
        if let Some(affinity) = &self.affinity {
            let by_category = proverb
                .category
                .as_ref()
                .is_some_and(|c| affinity.categories.contains(c));
            let by_region = proverb
                .region
                .as_ref()
                .is_some_and(|r| affinity.regions.contains(r));
            if !by_category && !by_region {
                return false;
            }
        }
        if self.exclude.contains(&proverb.id) {
            return false;
        }
        if let Some(needle) = needle {
            if !text::proverb_search_document(proverb).contains(needle) {
                return false;
            }
        }
        true
    }
}

/// Total order used for a `SortOrder`; ties fall back to id so pagination is stable.
pub fn compare(order: SortOrder, a: &Proverb, b: &Proverb) -> Ordering {
    match order {
        SortOrder::Popularity => b
            .popularity
            .cmp(&a.popularity)
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| a.id.cmp(&b.id)),
        SortOrder::Newest => b
            .created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id)),
        SortOrder::Oldest => a
            .created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id)),
    }
}

#[async_trait]
pub trait ProverbStore: Send + Sync {
    /// Backend description for health reports.
    async fn health(&self) -> StoreResult<String>;

    async fn insert(&self, proverb: NewProverb) -> StoreResult<Proverb>;

    /// Fetch by id regardless of validation state.
    async fn get(&self, id: Uuid) -> StoreResult<Option<Proverb>>;

    async fn get_many(&self, ids: &[Uuid]) -> StoreResult<Vec<Proverb>>;

    /// Case-insensitive exact match on `text`.
    async fn find_by_text(&self, text: &str) -> StoreResult<Option<Proverb>>;

    async fn list(&self, filter: &ProverbFilter) -> StoreResult<Vec<Proverb>>;

    /// Number of rows matching `filter`, ignoring order, limit and offset.
    async fn count(&self, filter: &ProverbFilter) -> StoreResult<i64>;

    /// Add one to `popularity`. Returns the new value, or `None` if the id is unknown.
    async fn increment_popularity(&self, id: Uuid) -> StoreResult<Option<i64>>;

    /// Set `validated = true`; returns the number of matched rows.
    async fn approve(&self, ids: &[Uuid]) -> StoreResult<u64>;

    async fn delete(&self, ids: &[Uuid]) -> StoreResult<u64>;

    /// Remove every row.
    async fn purge(&self) -> StoreResult<u64>;

    async fn set_image(&self, id: Uuid, prompt: &str, url: &str) -> StoreResult<bool>;

    async fn category_stats(&self) -> StoreResult<Vec<CategoryStat>>;

    async fn region_stats(&self) -> StoreResult<Vec<RegionStat>>;

    async fn overall_stats(&self) -> StoreResult<OverallStats>;

    async fn daily_activity(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<DailyActivity>>;
}
