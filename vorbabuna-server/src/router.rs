use crate::error::ServiceError;
use crate::subsystems::{analytics, moderation};
use vorbabuna_core::store::ProverbStore;
use vorbabuna_core::{ApiResponse, VorbaConfig, VorbaRequest};

/// Dispatch one moderation action to its subsystem.
pub async fn handle_admin_request(
    request: VorbaRequest,
    store: &dyn ProverbStore,
    config: &VorbaConfig,
) -> Result<ApiResponse, ServiceError> {
    match request {
        VorbaRequest::Stats => {
            let stats = moderation::stats(store).await?;
            Ok(ApiResponse::ok(serde_json::json!(stats)))
        }
        VorbaRequest::Pending { limit } => {
            let pending = moderation::pending(store, limit).await?;
            Ok(ApiResponse::list(&pending))
        }
        VorbaRequest::Health => {
            let report = moderation::health(store).await;
            Ok(ApiResponse::ok(serde_json::json!(report)))
        }
        VorbaRequest::Export => {
            let proverbs = moderation::export(store).await?;
            Ok(ApiResponse::list(&proverbs))
        }
        VorbaRequest::Analytics { start, end } => {
            let days = analytics::activity_by_date_range(store, start, end).await?;
            Ok(ApiResponse::list(&days))
        }
        VorbaRequest::Approve { id } => {
            moderation::approve(store, &id).await?;
            Ok(ApiResponse::counted(1, "Proverb approved"))
        }
        VorbaRequest::Reject { id, reason } => {
            moderation::reject(store, &id, reason.as_deref()).await?;
            Ok(ApiResponse::counted(1, "Proverb rejected"))
        }
        VorbaRequest::BulkApprove { ids } => {
            let count = moderation::bulk_approve(store, &ids).await?;
            Ok(ApiResponse::counted(count, format!("{} proverbs approved", count)))
        }
        VorbaRequest::BulkDelete { ids } => {
            let count = moderation::bulk_delete(store, &ids).await?;
            Ok(ApiResponse::counted(count, format!("{} proverbs deleted", count)))
        }
        VorbaRequest::Flag { id, reason } => {
            moderation::flag(&id, &reason)?;
            Ok(ApiResponse::counted(1, "Proverb flagged for review"))
        }
        VorbaRequest::Seed { reset } => {
            let report = vorbabuna_seed::seed(store, &config.imagery, reset).await?;
            Ok(ApiResponse::counted(
                report.inserted as u64,
                format!(
                    "Seeded {} proverbs ({} already present, {} removed)",
                    report.inserted, report.skipped, report.removed
                ),
            ))
        }
    }
}
