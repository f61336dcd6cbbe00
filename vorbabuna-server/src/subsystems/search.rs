//! Search subsystem: accent-insensitive substring search and typed listing.

use serde::Deserialize;
use vorbabuna_core::config::SearchConfig;
use vorbabuna_core::models::Proverb;
use vorbabuna_core::store::{ProverbFilter, ProverbStore, SortOrder};

use crate::error::ServiceError;

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn clamp_limit(limit: Option<i64>, config: &SearchConfig) -> i64 {
    limit
        .unwrap_or(i64::from(config.default_limit))
        .clamp(1, i64::from(config.max_limit.max(1)))
}

/// Validated proverbs whose text, meaning or keywords contain `query`.
///
/// A query shorter than `min_query_chars` returns nothing unless a category is
/// given, in which case the category listing is returned instead.
pub async fn search(
    store: &dyn ProverbStore,
    config: &SearchConfig,
    query: &str,
    category: Option<&str>,
    limit: Option<i64>,
) -> Result<Vec<Proverb>, ServiceError> {
    let query = query.trim();
    let category = non_blank(category);
    let usable_query = query.chars().count() >= config.min_query_chars;

    if !usable_query && category.is_none() {
        return Ok(Vec::new());
    }

    let mut filter = ProverbFilter::validated()
        .order(SortOrder::Popularity)
        .limit(clamp_limit(limit, config));
    if usable_query {
        filter = filter.text(query);
    }
    if let Some(category) = category {
        filter = filter.category(category);
    }

    let results = store.list(&filter).await?;
    tracing::debug!("Search {:?} in {:?} matched {}", query, category, results.len());
    Ok(results)
}

/// Recognized filters for `GET /api/proverbs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProverbQueryParams {
    pub category: Option<String>,
    pub region: Option<String>,
    pub query: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ProverbQueryParams {
    pub fn into_filter(self, config: &SearchConfig) -> Result<ProverbFilter, ServiceError> {
        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            return Err(ServiceError::validation("offset must not be negative"));
        }

        let mut filter = ProverbFilter::validated()
            .order(SortOrder::Newest)
            .limit(clamp_limit(self.limit, config))
            .offset(offset);
        if let Some(category) = non_blank(self.category.as_deref()) {
            filter = filter.category(category);
        }
        if let Some(region) = non_blank(self.region.as_deref()) {
            filter = filter.region(region);
        }
        if let Some(query) = non_blank(self.query.as_deref()) {
            filter = filter.text(query);
        }
        Ok(filter)
    }
}

/// One page of the listing plus the number of matching rows.
pub async fn list(
    store: &dyn ProverbStore,
    config: &SearchConfig,
    params: ProverbQueryParams,
) -> Result<(Vec<Proverb>, i64), ServiceError> {
    let filter = params.into_filter(config)?;
    let rows = store.list(&filter).await?;
    let total = store.count(&filter).await?;
    Ok((rows, total))
}
