//! Vorbă Bună HTTP JSON API
//!
//! Axum server exposing the proverb catalog, recommendations, analytics,
//! gamification and moderation. Each endpoint has a thin axum handler that
//! delegates to an inner function returning `(StatusCode, serde_json::Value)`,
//! so the logic is testable without going through the router.
//!
//! Every body uses the `{ success, data | error }` envelope from
//! [`ApiResponse`], except `/health` and `/version`.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Local, Utc};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use vorbabuna_core::analysis;
use vorbabuna_core::gamification;
use vorbabuna_core::store::ProverbStore;
use vorbabuna_core::{ApiResponse, VorbaConfig, VorbaRequest};

use crate::error::ServiceError;
use crate::subsystems::analytics::{self, TrackEvent};
use crate::subsystems::contribute::{self, ContributionRequest};
use crate::subsystems::engagement::{self, GamificationCheck, QuizSubmission};
use crate::subsystems::search::{self, ProverbQueryParams};
use crate::subsystems::{catalog, moderation, parse_id, recommend, split_list};

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub store: Arc<dyn ProverbStore>,
    pub config: VorbaConfig,
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/api/proverb", get(random_handler))
        .route("/api/proverb/search", get(search_handler))
        .route("/api/proverb/:id", get(proverb_handler))
        .route("/api/proverb/:id/analysis", get(analysis_handler))
        .route("/api/proverbs", get(list_handler))
        .route("/api/recommendations", get(recommendations_handler))
        .route("/api/contribute", post(contribute_handler))
        .route("/api/analytics", get(analytics_handler))
        .route("/api/analytics/track", post(track_handler))
        .route("/api/admin", get(admin_get_handler).post(admin_post_handler))
        .route(
            "/api/proverb-images",
            get(image_get_handler).post(image_post_handler),
        )
        .route("/api/quiz", get(quiz_handler))
        .route("/api/quiz/score", post(quiz_score_handler))
        .route("/api/gamification/check", post(gamification_check_handler))
        .route("/api/gamification/challenge", get(challenge_handler))
        .route("/api/gamification/paths", get(paths_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    store: Arc<dyn ProverbStore>,
    config: VorbaConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", config.http.host, config.http.port);
    let state = Arc::new(HttpState { store, config });

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Vorbă Bună HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Comma-separated proverb ids.
    pub favorites: Option<String>,
    /// Comma-separated proverb ids.
    pub history: Option<String>,
    pub proverb_id: Option<String>,
    pub category: Option<String>,
    pub region: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub proverb_id: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImageParams {
    pub proverb_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct QuizParams {
    pub count: Option<i64>,
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Inner health check: asks the store and returns (status_code, json_body).
pub async fn health_inner(store: &dyn ProverbStore) -> (StatusCode, serde_json::Value) {
    let report = moderation::health(store).await;
    if !report.database {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({
                "status": "unhealthy",
                "store": report.backend,
            }),
        );
    }
    (
        StatusCode::OK,
        serde_json::json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "store": report.backend,
        }),
    )
}

/// Inner version: returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "name": "vorbabuna",
        "version": env!("CARGO_PKG_VERSION"),
    })
}

pub async fn random_inner(
    store: &dyn ProverbStore,
    config: &VorbaConfig,
) -> (StatusCode, serde_json::Value) {
    match catalog::random_proverb(store, &config.imagery).await {
        Ok(proverb) => ok(serde_json::json!(proverb)),
        Err(e) => e.into_http(),
    }
}

pub async fn proverb_inner(store: &dyn ProverbStore, id: &str) -> (StatusCode, serde_json::Value) {
    match catalog::get_proverb(store, id).await {
        Ok(proverb) => ok(serde_json::json!(proverb)),
        Err(e) => e.into_http(),
    }
}

pub async fn analysis_inner(store: &dyn ProverbStore, id: &str) -> (StatusCode, serde_json::Value) {
    match catalog::get_proverb(store, id).await {
        Ok(proverb) => ok(serde_json::json!(analysis::analyze(&proverb))),
        Err(e) => e.into_http(),
    }
}

pub async fn search_inner(
    store: &dyn ProverbStore,
    config: &VorbaConfig,
    params: SearchParams,
) -> (StatusCode, serde_json::Value) {
    let query = params.q.unwrap_or_default();
    match search::search(
        store,
        &config.search,
        &query,
        params.category.as_deref(),
        params.limit,
    )
    .await
    {
        Ok(results) => (StatusCode::OK, ApiResponse::list(&results).into_value()),
        Err(e) => e.into_http(),
    }
}

/// Inner listing: one page of proverbs; `count` is the number of matching rows.
pub async fn list_inner(
    store: &dyn ProverbStore,
    config: &VorbaConfig,
    params: ProverbQueryParams,
) -> (StatusCode, serde_json::Value) {
    match search::list(store, &config.search, params).await {
        Ok((rows, total)) => {
            let mut resp = ApiResponse::list(&rows);
            resp.count = Some(total.max(0) as u64);
            (StatusCode::OK, resp.into_value())
        }
        Err(e) => e.into_http(),
    }
}

/// Inner recommendations: dispatches on `type`, defaulting to personalized.
pub async fn recommendations_inner(
    store: &dyn ProverbStore,
    config: &VorbaConfig,
    params: RecommendationParams,
) -> (StatusCode, serde_json::Value) {
    let settings = &config.recommendations;
    let max = i64::from(settings.max_limit.max(1));
    let kind = params.kind.as_deref().unwrap_or("personalized");

    if kind == "feed" {
        let limit = params
            .limit
            .unwrap_or(i64::from(settings.feed_limit))
            .clamp(1, max);
        let favorites = split_list(params.favorites.as_deref());
        let history = split_list(params.history.as_deref());
        let feed = recommend::feed(store, &favorites, &history, limit).await;
        let mut resp = ApiResponse::ok(serde_json::json!(feed));
        resp.count = Some(feed.total() as u64);
        return (StatusCode::OK, resp.into_value());
    }

    let n = params
        .limit
        .unwrap_or(i64::from(settings.default_limit))
        .clamp(1, max);
    let offset = params.offset.unwrap_or(0).max(0);

    let result = match kind {
        "popular" => Ok(recommend::popular(store, n).await),
        "new" => Ok(recommend::newest(store, n).await),
        "random" => Ok(recommend::random(store, n).await),
        "similar" | "related" => match params.proverb_id.as_deref() {
            None => Err(ServiceError::validation("proverbId is required")),
            // an unparseable seed behaves like a missing one
            Some(raw) => match parse_id(raw) {
                None => Ok(Vec::new()),
                Some(id) if kind == "similar" => Ok(recommend::similar(store, id, n).await),
                Some(id) => Ok(recommend::related(store, id, n).await),
            },
        },
        "category" | "trending" => match non_blank(params.category.as_deref()) {
            None => Err(ServiceError::validation("category is required")),
            Some(c) if kind == "category" => Ok(recommend::by_category(store, c, n, offset).await),
            Some(c) => Ok(recommend::trending(store, c, n).await),
        },
        "region" => match non_blank(params.region.as_deref()) {
            None => Err(ServiceError::validation("region is required")),
            Some(r) => Ok(recommend::by_region(store, r, n, offset).await),
        },
        "personalized" => {
            let favorites = split_list(params.favorites.as_deref());
            let history = split_list(params.history.as_deref());
            Ok(recommend::personalized(store, &favorites, &history, n).await)
        }
        other => Err(ServiceError::validation(format!(
            "Unknown recommendation type: {}",
            other
        ))),
    };

    match result {
        Ok(proverbs) => (StatusCode::OK, ApiResponse::list(&proverbs).into_value()),
        Err(e) => e.into_http(),
    }
}

/// Inner contribute: 201 with the new id.
pub async fn contribute_inner(
    store: &dyn ProverbStore,
    req: ContributionRequest,
) -> (StatusCode, serde_json::Value) {
    match contribute::contribute(store, req).await {
        Ok(proverb) => (
            StatusCode::CREATED,
            ApiResponse::ok(serde_json::json!({ "id": proverb.id }))
                .with_message("Thank you! Your proverb will be reviewed before publishing.")
                .into_value(),
        ),
        Err(e) => e.into_http(),
    }
}

/// Inner track: accepts one event object or an array of them.
pub async fn track_inner(
    store: &dyn ProverbStore,
    payload: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    if payload.is_array() {
        let events: Vec<TrackEvent> = match serde_json::from_value(payload) {
            Ok(events) => events,
            Err(e) => return ServiceError::validation(format!("Invalid events: {}", e)).into_http(),
        };
        let report = analytics::track_batch(store, events).await;
        let mut resp = ApiResponse::ok(serde_json::json!(report));
        resp.count = Some(report.tracked as u64);
        return (StatusCode::OK, resp.into_value());
    }

    let event: TrackEvent = match serde_json::from_value(payload) {
        Ok(event) => event,
        Err(e) => return ServiceError::validation(format!("Invalid event: {}", e)).into_http(),
    };
    match analytics::track_event(store, event).await {
        Ok(popularity) => ok(serde_json::json!({ "popularity": popularity })),
        Err(e) => e.into_http(),
    }
}

/// Inner analytics reports, selected by `type`.
pub async fn analytics_inner(
    store: &dyn ProverbStore,
    config: &VorbaConfig,
    params: AnalyticsParams,
) -> (StatusCode, serde_json::Value) {
    let n = params
        .limit
        .unwrap_or(i64::from(config.recommendations.default_limit))
        .clamp(1, i64::from(config.recommendations.max_limit.max(1)));

    let resp = match params.kind.as_deref() {
        Some("trending") => ApiResponse::list(&analytics::trending(store, n).await),
        Some("recent") => ApiResponse::list(&analytics::recent(store, n).await),
        Some("categories") => ApiResponse::list(&analytics::category_stats(store).await),
        Some("regions") => ApiResponse::list(&analytics::region_stats(store).await),
        Some("overall") => ApiResponse::ok(serde_json::json!(analytics::overall_stats(store).await)),
        Some("proverb") => {
            let Some(raw) = params.proverb_id.as_deref() else {
                return ServiceError::validation("proverbId is required").into_http();
            };
            match analytics::proverb_stats(store, raw, Utc::now()).await {
                Some(stats) => ApiResponse::ok(serde_json::json!(stats)),
                None => return ServiceError::not_found("Proverb not found").into_http(),
            }
        }
        Some(other) => {
            return ServiceError::validation(format!("Invalid analytics type: {}", other))
                .into_http()
        }
        None => return ServiceError::validation("type is required").into_http(),
    };
    (StatusCode::OK, resp.into_value())
}

/// Check the shared admin secret, when one is configured.
pub fn authorize(config: &VorbaConfig, token: Option<&str>) -> Result<(), ServiceError> {
    match config.admin.required_token() {
        Some(expected) if token != Some(expected) => {
            tracing::warn!("Rejected admin request with missing or wrong token");
            Err(ServiceError::Unauthorized)
        }
        _ => Ok(()),
    }
}

/// Inner admin GET: read-only actions named in the query string.
pub async fn admin_get_inner(
    store: &dyn ProverbStore,
    config: &VorbaConfig,
    token: Option<&str>,
    params: &HashMap<String, String>,
) -> (StatusCode, serde_json::Value) {
    if let Err(e) = authorize(config, token) {
        return e.into_http();
    }
    let request = match VorbaRequest::from_query(params) {
        Ok(r) => r,
        Err(e) => return ServiceError::Validation(e).into_http(),
    };
    admin_dispatch(store, config, request).await
}

/// Inner admin POST: mutations carried in the JSON body. The action may also
/// come from the query string.
pub async fn admin_post_inner(
    store: &dyn ProverbStore,
    config: &VorbaConfig,
    token: Option<&str>,
    params: &HashMap<String, String>,
    mut body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    if let Err(e) = authorize(config, token) {
        return e.into_http();
    }
    if let (Some(obj), Some(action)) = (body.as_object_mut(), params.get("action")) {
        obj.entry("action")
            .or_insert_with(|| serde_json::Value::String(action.clone()));
    }
    let request: VorbaRequest = match serde_json::from_value(body) {
        Ok(r) => r,
        Err(e) => return ServiceError::validation(format!("Invalid action: {}", e)).into_http(),
    };
    if !request.is_mutation() {
        return ServiceError::validation("Read-only actions use GET").into_http();
    }
    admin_dispatch(store, config, request).await
}

async fn admin_dispatch(
    store: &dyn ProverbStore,
    config: &VorbaConfig,
    request: VorbaRequest,
) -> (StatusCode, serde_json::Value) {
    match crate::router::handle_admin_request(request, store, config).await {
        Ok(resp) => (StatusCode::OK, resp.into_value()),
        Err(e) => e.into_http(),
    }
}

pub async fn image_get_inner(
    store: &dyn ProverbStore,
    params: ImageParams,
) -> (StatusCode, serde_json::Value) {
    let Some(raw) = params.proverb_id else {
        return ServiceError::validation("proverbId is required").into_http();
    };
    match catalog::image_info(store, &raw).await {
        Ok(info) => ok(serde_json::json!(info)),
        Err(e) => e.into_http(),
    }
}

pub async fn image_post_inner(
    store: &dyn ProverbStore,
    config: &VorbaConfig,
    params: ImageParams,
) -> (StatusCode, serde_json::Value) {
    let Some(raw) = params.proverb_id else {
        return ServiceError::validation("proverbId is required").into_http();
    };
    match catalog::assign_image(store, &config.imagery, &raw).await {
        Ok(proverb) => ok(serde_json::json!({
            "imageUrl": proverb.image_url,
            "imagePrompt": proverb.image_prompt,
        })),
        Err(e) => e.into_http(),
    }
}

pub async fn quiz_inner(store: &dyn ProverbStore, params: QuizParams) -> (StatusCode, serde_json::Value) {
    let questions = engagement::quiz(store, params.count).await;
    (StatusCode::OK, ApiResponse::list(&questions).into_value())
}

/// Inner quiz scoring: grades answers against the stored meanings.
pub async fn quiz_score_inner(
    store: &dyn ProverbStore,
    submission: QuizSubmission,
) -> (StatusCode, serde_json::Value) {
    match engagement::score_quiz(store, submission).await {
        Ok(score) => ok(serde_json::json!(score)),
        Err(e) => e.into_http(),
    }
}

pub fn gamification_check_inner(req: GamificationCheck) -> (StatusCode, serde_json::Value) {
    let report = engagement::check(req, Local::now().naive_local());
    ok(serde_json::json!(report))
}

pub fn challenge_inner() -> (StatusCode, serde_json::Value) {
    ok(serde_json::json!(engagement::daily_challenge(
        Local::now().naive_local()
    )))
}

pub fn paths_inner() -> (StatusCode, serde_json::Value) {
    (
        StatusCode::OK,
        ApiResponse::list(&gamification::learning_paths()).into_value(),
    )
}

// ============================================================================
// Axum handler wrappers (thin: delegate to inner functions)
// ============================================================================

type Reply = (StatusCode, Json<serde_json::Value>);
type JsonBody<T> = Result<Json<T>, JsonRejection>;
type Params<T> = Result<Query<T>, QueryRejection>;
type PathId = Result<Path<String>, PathRejection>;

fn reply((status, body): (StatusCode, serde_json::Value)) -> Reply {
    (status, Json(body))
}

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> Reply {
    reply(health_inner(state.store.as_ref()).await)
}

pub async fn version_handler() -> Reply {
    (StatusCode::OK, Json(version_inner()))
}

pub async fn random_handler(State(state): State<Arc<HttpState>>) -> Reply {
    reply(random_inner(state.store.as_ref(), &state.config).await)
}

pub async fn proverb_handler(
    State(state): State<Arc<HttpState>>,
    id: PathId,
) -> Result<Reply, ServiceError> {
    let Path(id) = id?;
    Ok(reply(proverb_inner(state.store.as_ref(), &id).await))
}

pub async fn analysis_handler(
    State(state): State<Arc<HttpState>>,
    id: PathId,
) -> Result<Reply, ServiceError> {
    let Path(id) = id?;
    Ok(reply(analysis_inner(state.store.as_ref(), &id).await))
}

pub async fn search_handler(
    State(state): State<Arc<HttpState>>,
    params: Params<SearchParams>,
) -> Result<Reply, ServiceError> {
    let Query(params) = params?;
    Ok(reply(search_inner(state.store.as_ref(), &state.config, params).await))
}

pub async fn list_handler(
    State(state): State<Arc<HttpState>>,
    params: Params<ProverbQueryParams>,
) -> Result<Reply, ServiceError> {
    let Query(params) = params?;
    Ok(reply(list_inner(state.store.as_ref(), &state.config, params).await))
}

pub async fn recommendations_handler(
    State(state): State<Arc<HttpState>>,
    params: Params<RecommendationParams>,
) -> Result<Reply, ServiceError> {
    let Query(params) = params?;
    Ok(reply(
        recommendations_inner(state.store.as_ref(), &state.config, params).await,
    ))
}

pub async fn contribute_handler(
    State(state): State<Arc<HttpState>>,
    req: JsonBody<ContributionRequest>,
) -> Result<Reply, ServiceError> {
    let Json(req) = req?;
    Ok(reply(contribute_inner(state.store.as_ref(), req).await))
}

pub async fn track_handler(
    State(state): State<Arc<HttpState>>,
    payload: JsonBody<serde_json::Value>,
) -> Result<Reply, ServiceError> {
    let Json(payload) = payload?;
    Ok(reply(track_inner(state.store.as_ref(), payload).await))
}

pub async fn analytics_handler(
    State(state): State<Arc<HttpState>>,
    params: Params<AnalyticsParams>,
) -> Result<Reply, ServiceError> {
    let Query(params) = params?;
    Ok(reply(analytics_inner(state.store.as_ref(), &state.config, params).await))
}

pub async fn admin_get_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    params: Params<HashMap<String, String>>,
) -> Result<Reply, ServiceError> {
    let Query(params) = params?;
    let token = admin_token(&headers);
    Ok(reply(
        admin_get_inner(state.store.as_ref(), &state.config, token, &params).await,
    ))
}

pub async fn admin_post_handler(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    params: Params<HashMap<String, String>>,
    body: JsonBody<serde_json::Value>,
) -> Result<Reply, ServiceError> {
    let Query(params) = params?;
    let Json(body) = body?;
    let token = admin_token(&headers);
    Ok(reply(
        admin_post_inner(state.store.as_ref(), &state.config, token, &params, body).await,
    ))
}

pub async fn image_get_handler(
    State(state): State<Arc<HttpState>>,
    params: Params<ImageParams>,
) -> Result<Reply, ServiceError> {
    let Query(params) = params?;
    Ok(reply(image_get_inner(state.store.as_ref(), params).await))
}

pub async fn image_post_handler(
    State(state): State<Arc<HttpState>>,
    params: JsonBody<ImageParams>,
) -> Result<Reply, ServiceError> {
    let Json(params) = params?;
    Ok(reply(
        image_post_inner(state.store.as_ref(), &state.config, params).await,
    ))
}

pub async fn quiz_handler(
    State(state): State<Arc<HttpState>>,
    params: Params<QuizParams>,
) -> Result<Reply, ServiceError> {
    let Query(params) = params?;
    Ok(reply(quiz_inner(state.store.as_ref(), params).await))
}

pub async fn quiz_score_handler(
    State(state): State<Arc<HttpState>>,
    submission: JsonBody<QuizSubmission>,
) -> Result<Reply, ServiceError> {
    let Json(submission) = submission?;
    Ok(reply(quiz_score_inner(state.store.as_ref(), submission).await))
}

pub async fn gamification_check_handler(
    req: JsonBody<GamificationCheck>,
) -> Result<Reply, ServiceError> {
    let Json(req) = req?;
    Ok(reply(gamification_check_inner(req)))
}

pub async fn challenge_handler() -> Reply {
    reply(challenge_inner())
}

pub async fn paths_handler() -> Reply {
    reply(paths_inner())
}

pub async fn not_found_handler() -> ServiceError {
    ServiceError::not_found("Not found")
}

// ============================================================================
// Helpers
// ============================================================================

fn ok(data: serde_json::Value) -> (StatusCode, serde_json::Value) {
    (StatusCode::OK, ApiResponse::ok(data).into_value())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn admin_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
}

// ============================================================================
// Unit Tests: call inner functions directly
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use vorbabuna_core::models::{NewProverb, Proverb};
    use vorbabuna_core::MemoryProverbStore;

    async fn add(store: &MemoryProverbStore, text: &str, category: &str, validated: bool) -> Proverb {
        store
            .insert(NewProverb {
                text: text.to_string(),
                meaning: format!("Înțelesul lui {}", text),
                category: Some(category.to_string()),
                region: Some("Moldova".to_string()),
                validated,
                ..NewProverb::default()
            })
            .await
            .unwrap()
    }

    fn with_token(token: &str) -> VorbaConfig {
        let mut config = VorbaConfig::in_memory();
        config.admin.token = Some(token.to_string());
        config
    }

    // ========================================================================
    // TEST 1: version_inner is pure and returns correct fields
    // ========================================================================
    #[test]
    fn test_version_inner_pure() {
        let v = version_inner();
        assert!(v["version"].is_string(), "version must be string");
        assert_eq!(v["name"], "vorbabuna");
    }

    // ========================================================================
    // TEST 2: health_inner: memory store is healthy
    // ========================================================================
    #[tokio::test]
    async fn test_health_inner_ok() {
        let store = MemoryProverbStore::new();
        let (status, body) = health_inner(&store).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    // ========================================================================
    // TEST 3: random_inner: empty catalog is 404 with error envelope
    // ========================================================================
    #[tokio::test]
    async fn test_random_inner_empty_is_404() {
        let store = MemoryProverbStore::new();
        let (status, body) = random_inner(&store, &VorbaConfig::in_memory()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "No proverbs found");
    }

    // ========================================================================
    // TEST 4: search_inner: one-character query returns empty list
    // ========================================================================
    #[tokio::test]
    async fn test_search_inner_short_query() {
        let store = MemoryProverbStore::new();
        add(&store, "Graba strică treaba", "muncă", true).await;
        let params = SearchParams {
            q: Some("g".to_string()),
            ..SearchParams::default()
        };
        let (status, body) = search_inner(&store, &VorbaConfig::in_memory(), params).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);
        assert_eq!(body["data"], serde_json::json!([]));
    }

    // ========================================================================
    // TEST 5: recommendations_inner: unknown type is 400
    // ========================================================================
    #[tokio::test]
    async fn test_recommendations_unknown_type() {
        let store = MemoryProverbStore::new();
        let params = RecommendationParams {
            kind: Some("best".to_string()),
            ..RecommendationParams::default()
        };
        let (status, body) = recommendations_inner(&store, &VorbaConfig::in_memory(), params).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("best"));
    }

    // ========================================================================
    // TEST 6: recommendations_inner: category type requires a category
    // ========================================================================
    #[tokio::test]
    async fn test_recommendations_category_required() {
        let store = MemoryProverbStore::new();
        let params = RecommendationParams {
            kind: Some("category".to_string()),
            category: Some("  ".to_string()),
            ..RecommendationParams::default()
        };
        let (status, _) = recommendations_inner(&store, &VorbaConfig::in_memory(), params).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // ========================================================================
    // TEST 7: recommendations_inner: feed has four labelled buckets
    // ========================================================================
    #[tokio::test]
    async fn test_recommendations_feed_buckets() {
        let store = MemoryProverbStore::new();
        for i in 0..12 {
            add(&store, &format!("Proverb numărul {}", i), "muncă", true).await;
        }
        let params = RecommendationParams {
            kind: Some("feed".to_string()),
            limit: Some(10),
            ..RecommendationParams::default()
        };
        let (status, body) = recommendations_inner(&store, &VorbaConfig::in_memory(), params).await;
        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["recommended"].as_array().unwrap().len(), 4);
        assert_eq!(data["popular"].as_array().unwrap().len(), 3);
        assert_eq!(data["new"].as_array().unwrap().len(), 2);
        assert_eq!(data["random"].as_array().unwrap().len(), 1);
        assert_eq!(body["count"], 10);
    }

    // ========================================================================
    // TEST 8: track_inner: single event returns new popularity
    // ========================================================================
    #[tokio::test]
    async fn test_track_inner_single() {
        let store = MemoryProverbStore::new();
        let p = add(&store, "Graba strică treaba", "muncă", true).await;
        let payload = serde_json::json!({"proverbId": p.id, "eventType": "share"});
        let (status, body) = track_inner(&store, payload).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["popularity"], 1);
    }

    // ========================================================================
    // TEST 9: track_inner: unknown event type is 400, popularity untouched
    // ========================================================================
    #[tokio::test]
    async fn test_track_inner_unknown_type() {
        let store = MemoryProverbStore::new();
        let p = add(&store, "Graba strică treaba", "muncă", true).await;
        let payload = serde_json::json!({"proverbId": p.id, "eventType": "like"});
        let (status, _) = track_inner(&store, payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(store.get(p.id).await.unwrap().unwrap().popularity, 0);
    }

    // ========================================================================
    // TEST 10: analytics_inner: missing type is 400, overall works
    // ========================================================================
    #[tokio::test]
    async fn test_analytics_inner_types() {
        let store = MemoryProverbStore::new();
        add(&store, "Graba strică treaba", "muncă", true).await;
        add(&store, "Ascuns de ochii lumii", "muncă", false).await;
        let config = VorbaConfig::in_memory();

        let (status, _) = analytics_inner(&store, &config, AnalyticsParams::default()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let params = AnalyticsParams {
            kind: Some("overall".to_string()),
            ..AnalyticsParams::default()
        };
        let (status, body) = analytics_inner(&store, &config, params).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["totalProverbs"], 2);
        assert_eq!(body["data"]["pendingProverbs"], 1);
    }

    // ========================================================================
    // TEST 11: authorize: configured token must match
    // ========================================================================
    #[test]
    fn test_authorize_token() {
        let config = with_token("secret");
        assert!(authorize(&config, Some("secret")).is_ok());
        assert!(matches!(
            authorize(&config, Some("guess")),
            Err(ServiceError::Unauthorized)
        ));
        assert!(authorize(&config, None).is_err());
        assert!(authorize(&VorbaConfig::in_memory(), None).is_ok());
    }

    // ========================================================================
    // TEST 12: admin_post_inner: read-only action via POST is rejected
    // ========================================================================
    #[tokio::test]
    async fn test_admin_post_rejects_read_only() {
        let store = MemoryProverbStore::new();
        let body = serde_json::json!({"action": "stats"});
        let (status, _) =
            admin_post_inner(&store, &VorbaConfig::in_memory(), None, &HashMap::new(), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // ========================================================================
    // TEST 13: admin_post_inner: action from the query string
    // ========================================================================
    #[tokio::test]
    async fn test_admin_post_action_from_query() {
        let store = MemoryProverbStore::new();
        let p = add(&store, "Graba strică treaba", "muncă", false).await;
        let params = HashMap::from([("action".to_string(), "approve".to_string())]);
        let body = serde_json::json!({"id": p.id});
        let (status, body) =
            admin_post_inner(&store, &VorbaConfig::in_memory(), None, &params, body).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert!(store.get(p.id).await.unwrap().unwrap().validated);
    }

    // ========================================================================
    // TEST 14: image endpoints: POST assigns, GET reads back
    // ========================================================================
    #[tokio::test]
    async fn test_image_assign_then_read() {
        let store = MemoryProverbStore::new();
        let p = add(&store, "Graba strică treaba", "muncă", true).await;
        let config = VorbaConfig::in_memory();

        let (status, posted) = image_post_inner(
            &store,
            &config,
            ImageParams {
                proverb_id: Some(p.id.to_string()),
            },
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, got) = image_get_inner(
            &store,
            ImageParams {
                proverb_id: Some(p.id.to_string()),
            },
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(got["data"]["imageUrl"], posted["data"]["imageUrl"]);
        assert!(got["data"]["imagePrompt"].as_str().unwrap().contains("Graba"));
    }

    // ========================================================================
    // TEST 15: paths_inner: three learning paths
    // ========================================================================
    #[test]
    fn test_paths_inner() {
        let (status, body) = paths_inner();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 3);
    }
}
