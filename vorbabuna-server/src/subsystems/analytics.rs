//! Analytics subsystem: interaction tracking and popularity reports.
//!
//! Every tracked interaction adds exactly one to the proverb's popularity,
//! whatever its type. Reports are recomputed on each call and degrade to
//! empty or zero values when the store fails.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use vorbabuna_core::models::{
    CategoryStat, DailyActivity, OverallStats, Proverb, ProverbStats, RegionStat,
};
use vorbabuna_core::store::ProverbStore;

use super::{parse_id, recommend};
use crate::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    View,
    Share,
    Favorite,
    AudioPlay,
    QuizAttempt,
}

impl FromStr for EventType {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Self::View),
            "share" => Ok(Self::Share),
            "favorite" => Ok(Self::Favorite),
            "audio_play" => Ok(Self::AudioPlay),
            "quiz_attempt" => Ok(Self::QuizAttempt),
            other => Err(ServiceError::validation(format!("Unknown eventType: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEvent {
    pub proverb_id: Option<String>,
    pub event_type: Option<String>,
    pub user_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub tracked: usize,
    pub failed: usize,
}

/// Record one interaction. Returns the proverb's new popularity.
pub async fn track_event(store: &dyn ProverbStore, event: TrackEvent) -> Result<i64, ServiceError> {
    let (Some(raw_id), Some(raw_type)) = (
        event.proverb_id.as_deref().filter(|s| !s.trim().is_empty()),
        event.event_type.as_deref().filter(|s| !s.trim().is_empty()),
    ) else {
        return Err(ServiceError::validation("proverbId and eventType are required"));
    };
    let event_type: EventType = raw_type.trim().parse()?;

    let id = parse_id(raw_id).ok_or_else(|| ServiceError::not_found("Proverb not found"))?;
    let popularity = store
        .increment_popularity(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Proverb not found"))?;

    tracing::debug!(
        proverb_id = %id,
        event = ?event_type,
        user = event.user_id.as_deref().unwrap_or("-"),
        "Tracked interaction"
    );
    Ok(popularity)
}

/// Track every event concurrently; failures are counted, not propagated.
pub async fn track_batch(store: &dyn ProverbStore, events: Vec<TrackEvent>) -> BatchReport {
    let results = join_all(events.into_iter().map(|event| track_event(store, event))).await;
    let mut report = BatchReport::default();
    for result in results {
        match result {
            Ok(_) => report.tracked += 1,
            Err(e) => {
                tracing::warn!("Batch event not tracked: {}", e);
                report.failed += 1;
            }
        }
    }
    report
}

pub async fn trending(store: &dyn ProverbStore, n: i64) -> Vec<Proverb> {
    recommend::popular(store, n).await
}

pub async fn recent(store: &dyn ProverbStore, n: i64) -> Vec<Proverb> {
    recommend::newest(store, n).await
}

/// View statistics of a validated proverb; `None` when unknown, pending or unavailable.
pub async fn proverb_stats(
    store: &dyn ProverbStore,
    raw_id: &str,
    now: DateTime<Utc>,
) -> Option<ProverbStats> {
    let id = parse_id(raw_id)?;
    let proverb = match store.get(id).await {
        Ok(Some(p)) if p.validated => p,
        Ok(_) => return None,
        Err(e) => {
            tracing::warn!("Proverb stats unavailable: {}", e);
            return None;
        }
    };
    Some(ProverbStats {
        views: proverb.popularity,
        created_at: proverb.created_at,
        last_updated: proverb.updated_at,
        days_old: (now - proverb.created_at).num_days(),
    })
}

pub async fn category_stats(store: &dyn ProverbStore) -> Vec<CategoryStat> {
    store.category_stats().await.unwrap_or_else(|e| {
        tracing::warn!("Category stats unavailable: {}", e);
        Vec::new()
    })
}

pub async fn region_stats(store: &dyn ProverbStore) -> Vec<RegionStat> {
    store.region_stats().await.unwrap_or_else(|e| {
        tracing::warn!("Region stats unavailable: {}", e);
        Vec::new()
    })
}

pub async fn overall_stats(store: &dyn ProverbStore) -> OverallStats {
    store.overall_stats().await.unwrap_or_else(|e| {
        tracing::warn!("Overall stats unavailable: {}", e);
        OverallStats::default()
    })
}

/// Proverbs created in `[start, end]`, grouped per UTC day.
pub async fn activity_by_date_range(
    store: &dyn ProverbStore,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<DailyActivity>, ServiceError> {
    if start > end {
        return Err(ServiceError::validation("start must not be after end"));
    }
    Ok(store.daily_activity(start, end).await.unwrap_or_else(|e| {
        tracing::warn!("Activity report unavailable: {}", e);
        Vec::new()
    }))
}
