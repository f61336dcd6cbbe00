//! Moderation subsystem: approval queue, bulk operations and dashboard data.

use serde::Serialize;
use vorbabuna_core::models::Proverb;
use vorbabuna_core::store::{ProverbFilter, ProverbStore, SortOrder};

use super::{parse_id, parse_ids};
use crate::error::ServiceError;

pub const DEFAULT_PENDING_LIMIT: i64 = 50;
const MAX_PENDING_LIMIT: i64 = 500;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_proverbs: i64,
    pub pending_approval: i64,
    pub total_views: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub database: bool,
    pub backend: String,
}

fn not_found() -> ServiceError {
    ServiceError::not_found("Proverb not found")
}

pub async fn approve(store: &dyn ProverbStore, raw_id: &str) -> Result<(), ServiceError> {
    let id = parse_id(raw_id).ok_or_else(not_found)?;
    if store.approve(&[id]).await? == 0 {
        return Err(not_found());
    }
    tracing::info!("Approved proverb {}", id);
    Ok(())
}

/// Rejecting deletes the proverb. The reason is only logged.
pub async fn reject(
    store: &dyn ProverbStore,
    raw_id: &str,
    reason: Option<&str>,
) -> Result<(), ServiceError> {
    let id = parse_id(raw_id).ok_or_else(not_found)?;
    if store.delete(&[id]).await? == 0 {
        return Err(not_found());
    }
    tracing::info!("Rejected proverb {}: {}", id, reason.unwrap_or("no reason given"));
    Ok(())
}

/// Number of proverbs approved; unknown and malformed ids count for nothing.
pub async fn bulk_approve(store: &dyn ProverbStore, ids: &[String]) -> Result<u64, ServiceError> {
    let ids = parse_ids(ids.iter().map(String::as_str));
    let count = store.approve(&ids).await?;
    tracing::info!("Bulk approved {} proverbs", count);
    Ok(count)
}

pub async fn bulk_delete(store: &dyn ProverbStore, ids: &[String]) -> Result<u64, ServiceError> {
    let ids = parse_ids(ids.iter().map(String::as_str));
    let count = store.delete(&ids).await?;
    tracing::info!("Bulk deleted {} proverbs", count);
    Ok(count)
}

/// Flags are recorded in the log only.
pub fn flag(raw_id: &str, reason: &str) -> Result<(), ServiceError> {
    if raw_id.trim().is_empty() || reason.trim().is_empty() {
        return Err(ServiceError::validation("id and reason are required"));
    }
    tracing::warn!("Proverb {} flagged: {}", raw_id.trim(), reason.trim());
    Ok(())
}

pub async fn stats(store: &dyn ProverbStore) -> Result<AdminStats, ServiceError> {
    let overall = store.overall_stats().await?;
    Ok(AdminStats {
        total_proverbs: overall.total_proverbs,
        pending_approval: overall.pending_proverbs,
        total_views: overall.total_views,
    })
}

/// Unvalidated proverbs, newest first.
pub async fn pending(store: &dyn ProverbStore, limit: Option<i64>) -> Result<Vec<Proverb>, ServiceError> {
    let limit = limit
        .unwrap_or(DEFAULT_PENDING_LIMIT)
        .clamp(1, MAX_PENDING_LIMIT);
    let filter = ProverbFilter::pending().order(SortOrder::Newest).limit(limit);
    Ok(store.list(&filter).await?)
}

pub async fn health(store: &dyn ProverbStore) -> HealthReport {
    match store.health().await {
        Ok(backend) => HealthReport {
            database: true,
            backend,
        },
        Err(e) => {
            tracing::error!("Store health check failed: {}", e);
            HealthReport {
                database: false,
                backend: "unavailable".to_string(),
            }
        }
    }
}

/// Every validated proverb, oldest first.
pub async fn export(store: &dyn ProverbStore) -> Result<Vec<Proverb>, ServiceError> {
    let filter = ProverbFilter::validated().order(SortOrder::Oldest);
    Ok(store.list(&filter).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use vorbabuna_core::models::NewProverb;
    use vorbabuna_core::MemoryProverbStore;

    async fn add(store: &MemoryProverbStore, text: &str, validated: bool) -> Proverb {
        store
            .insert(NewProverb {
                text: text.to_string(),
                meaning: "sens".to_string(),
                validated,
                ..NewProverb::default()
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_bulk_approve_counts_existing_only() {
        let store = MemoryProverbStore::new();
        let x = add(&store, "x", false).await;
        let ids = vec![x.id.to_string(), Uuid::new_v4().to_string(), "y".to_string()];
        assert_eq!(bulk_approve(&store, &ids).await.unwrap(), 1);
        assert!(store.get(x.id).await.unwrap().unwrap().validated);
    }

    #[tokio::test]
    async fn test_approve_and_reject_unknown_are_not_found() {
        let store = MemoryProverbStore::new();
        let missing = Uuid::new_v4().to_string();
        assert!(matches!(approve(&store, &missing).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(reject(&store, "garbage", None).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reject_deletes() {
        let store = MemoryProverbStore::new();
        let p = add(&store, "x", false).await;
        reject(&store, &p.id.to_string(), Some("duplicate")).await.unwrap();
        assert!(store.get(p.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pending_newest_first_and_stats() {
        let store = MemoryProverbStore::new();
        let older = add(&store, "older", false).await;
        let newer = add(&store, "newer", false).await;
        add(&store, "live", true).await;

        let queue = pending(&store, None).await.unwrap();
        assert_eq!(queue.iter().map(|p| p.id).collect::<Vec<_>>(), vec![newer.id, older.id]);

        let stats = stats(&store).await.unwrap();
        assert_eq!(stats.total_proverbs, 3);
        assert_eq!(stats.pending_approval, 2);

        let exported = export(&store).await.unwrap();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0].text, "live");
    }

    #[test]
    fn test_flag_requires_reason() {
        assert!(flag("abc", "  ").is_err());
        assert!(flag("abc", "offensive").is_ok());
    }

    #[tokio::test]
    async fn test_health_reports_backend() {
        let report = health(&MemoryProverbStore::new()).await;
        assert!(report.database);
        assert!(!report.backend.is_empty());
    }
}
