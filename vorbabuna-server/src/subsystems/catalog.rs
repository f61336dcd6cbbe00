//! Catalog subsystem: random proverb of the moment, lookup by id and
//! illustration assignment.

use rand::Rng;
use serde::Serialize;
use vorbabuna_core::config::ImageryConfig;
use vorbabuna_core::imagery;
use vorbabuna_core::models::Proverb;
use vorbabuna_core::store::{ProverbFilter, ProverbStore, SortOrder};

use super::parse_id;
use crate::error::ServiceError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub image_url: Option<String>,
    pub image_prompt: Option<String>,
}

/// Generate and persist the illustration prompt and URL for `proverb`.
async fn illustrate(
    store: &dyn ProverbStore,
    imagery_config: &ImageryConfig,
    proverb: &mut Proverb,
) -> Result<(), ServiceError> {
    let (prompt, url) = imagery::illustrate(
        imagery_config,
        &proverb.text,
        proverb.category.as_deref(),
        proverb.region.as_deref(),
    );
    if !store.set_image(proverb.id, &prompt, &url).await? {
        return Err(ServiceError::not_found("Proverb not found"));
    }
    proverb.image_prompt = Some(prompt);
    proverb.image_url = Some(url);
    Ok(())
}

/// One uniformly chosen validated proverb. Counts as a view, and gets an
/// illustration if it has none yet.
pub async fn random_proverb(
    store: &dyn ProverbStore,
    imagery_config: &ImageryConfig,
) -> Result<Proverb, ServiceError> {
    let count = store.count(&ProverbFilter::validated()).await?;
    if count == 0 {
        return Err(ServiceError::not_found("No proverbs found"));
    }

    let offset = rand::thread_rng().gen_range(0..count);
    let filter = ProverbFilter::validated()
        .order(SortOrder::Oldest)
        .offset(offset)
        .limit(1);
    let mut proverb = store
        .list(&filter)
        .await?
        .pop()
        .ok_or_else(|| ServiceError::not_found("No proverbs found"))?;

    if let Some(popularity) = store.increment_popularity(proverb.id).await? {
        proverb.popularity = popularity;
    }

    if proverb.image_url.is_none() {
        if let Err(e) = illustrate(store, imagery_config, &mut proverb).await {
            tracing::warn!("Could not backfill image for {}: {}", proverb.id, e);
        }
    }

    Ok(proverb)
}

/// Validated proverb by id; pending and unknown ids are both 404.
pub async fn get_proverb(store: &dyn ProverbStore, raw_id: &str) -> Result<Proverb, ServiceError> {
    let id = parse_id(raw_id).ok_or_else(|| ServiceError::not_found("Proverb not found"))?;
    match store.get(id).await? {
        Some(p) if p.validated => Ok(p),
        _ => Err(ServiceError::not_found("Proverb not found")),
    }
}

pub async fn image_info(store: &dyn ProverbStore, raw_id: &str) -> Result<ImageInfo, ServiceError> {
    let proverb = get_proverb(store, raw_id).await?;
    Ok(ImageInfo {
        image_url: proverb.image_url,
        image_prompt: proverb.image_prompt,
    })
}

/// Regenerate the illustration of any proverb, pending ones included.
pub async fn assign_image(
    store: &dyn ProverbStore,
    imagery_config: &ImageryConfig,
    raw_id: &str,
) -> Result<Proverb, ServiceError> {
    let id = parse_id(raw_id).ok_or_else(|| ServiceError::not_found("Proverb not found"))?;
    let mut proverb = store
        .get(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Proverb not found"))?;
    illustrate(store, imagery_config, &mut proverb).await?;
    tracing::info!("Assigned illustration to proverb {}", proverb.id);
    Ok(proverb)
}
