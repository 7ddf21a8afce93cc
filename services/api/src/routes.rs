use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderName, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;
use trust_atlas::engine::{
    parse_pillar_ref, AggregatedScore, CountryDetailResponse, EngineError, GlobalTrendEntry,
    LegacyCountryTimeline, MultiCountrySeries, ObservationStore, RegionSummary,
    TrustMetricsService,
};

use crate::infra::AppState;

/// Every data endpoint is a pure function of the store, so responses are
/// freely cacheable; caching policy lives here at the transport layer, not
/// inside the engine.
type Cached<T> = ([(HeaderName, &'static str); 1], Json<T>);

fn cached<T>(body: T) -> Cached<T> {
    ([(header::CACHE_CONTROL, "public, max-age=3600")], Json(body))
}

pub(crate) fn with_atlas_routes<S>(service: Arc<TrustMetricsService<S>>) -> axum::Router
where
    S: ObservationStore + 'static,
{
    axum::Router::new()
        .route("/api/v1/country/:iso3", get(country_detail_endpoint::<S>))
        .route("/api/v1/score", get(score_snapshot_endpoint::<S>))
        .route("/api/v1/trends/global", get(global_trends_endpoint::<S>))
        .route("/api/v1/trends/regions", get(regional_trends_endpoint::<S>))
        .route("/api/v1/trends/countries", get(multi_country_endpoint::<S>))
        .route(
            "/api/v1/trends/country/:iso3",
            get(country_timeline_endpoint::<S>),
        )
        .with_state(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CountryDetailParams {
    pub(crate) from: Option<i32>,
    pub(crate) to: Option<i32>,
}

pub(crate) async fn country_detail_endpoint<S>(
    State(service): State<Arc<TrustMetricsService<S>>>,
    Path(iso3): Path<String>,
    Query(params): Query<CountryDetailParams>,
) -> Result<Cached<CountryDetailResponse>, EngineError>
where
    S: ObservationStore + 'static,
{
    let detail = service.country_detail(&iso3, params.from, params.to)?;
    Ok(cached(CountryDetailResponse::from_detail(&detail)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreParams {
    pub(crate) year: i32,
    pub(crate) trust_type: String,
}

pub(crate) async fn score_snapshot_endpoint<S>(
    State(service): State<Arc<TrustMetricsService<S>>>,
    Query(params): Query<ScoreParams>,
) -> Result<Cached<Vec<AggregatedScore>>, EngineError>
where
    S: ObservationStore + 'static,
{
    let selector = parse_pillar_ref(&params.trust_type)?;
    Ok(cached(service.score_snapshot(params.year, selector)?))
}

#[derive(Debug, Deserialize)]
pub(crate) struct PillarParams {
    pub(crate) pillar: String,
}

pub(crate) async fn global_trends_endpoint<S>(
    State(service): State<Arc<TrustMetricsService<S>>>,
    Query(params): Query<PillarParams>,
) -> Result<Cached<Vec<GlobalTrendEntry>>, EngineError>
where
    S: ObservationStore + 'static,
{
    let selector = parse_pillar_ref(&params.pillar)?;
    Ok(cached(service.global_latest(selector)?))
}

pub(crate) async fn regional_trends_endpoint<S>(
    State(service): State<Arc<TrustMetricsService<S>>>,
    Query(params): Query<PillarParams>,
) -> Result<Cached<Vec<RegionSummary>>, EngineError>
where
    S: ObservationStore + 'static,
{
    let selector = parse_pillar_ref(&params.pillar)?;
    Ok(cached(service.regional_summary(selector)?))
}

#[derive(Debug, Deserialize)]
pub(crate) struct BatchParams {
    pub(crate) iso3: String,
    pub(crate) pillar: Option<String>,
    pub(crate) source: Option<String>,
}

pub(crate) async fn multi_country_endpoint<S>(
    State(service): State<Arc<TrustMetricsService<S>>>,
    Query(params): Query<BatchParams>,
) -> Result<Cached<MultiCountrySeries>, EngineError>
where
    S: ObservationStore + 'static,
{
    let selector = params
        .pillar
        .as_deref()
        .map(parse_pillar_ref)
        .transpose()?;
    Ok(cached(service.multi_country(
        &params.iso3,
        selector,
        params.source.as_deref(),
    )?))
}

pub(crate) async fn country_timeline_endpoint<S>(
    State(service): State<Arc<TrustMetricsService<S>>>,
    Path(iso3): Path<String>,
) -> Result<Cached<LegacyCountryTimeline>, EngineError>
where
    S: ObservationStore + 'static,
{
    Ok(cached(service.country_timeline(&iso3)?))
}
