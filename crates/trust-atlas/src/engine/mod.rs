//! Observation Normalization & Aggregation Engine.
//!
//! Raw observations flow one direction: eligibility filter, per-cell
//! aggregation, confidence classification, optional gap derivation, then
//! regional or multi-country rollup. Every result is computed fresh from
//! the injected store; nothing here caches or mutates.

pub mod aggregate;
pub mod confidence;
pub mod domain;
pub mod gap;
pub mod memory;
pub mod rollup;
pub mod rules;
pub mod service;
pub mod store;
pub mod views;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub use domain::{
    AggregatedScore, ConfidenceTier, CountryMeta, CountryYearRecord, GapAssessment,
    InstitutionsRegionBreakdown, Observation, Pillar, PillarRef, RegionSummary, SubPillar,
    TrustType,
};
pub use memory::InMemoryObservationStore;
pub use rollup::MAX_BATCH_COUNTRIES;
pub use rules::parse_pillar_ref;
pub use service::{CountryDetail, GlobalTrendEntry, MultiCountrySeries, TrustMetricsService};
pub use store::{ObservationFilter, ObservationStore, StoreError};
pub use views::{CountryDetailResponse, LegacyCountryTimeline};

/// Request-level error taxonomy. A cell with no eligible observations is
/// not an error anywhere in the engine; it propagates as a null score.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),
    #[error("country '{0}' is not registered")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = match &self {
            EngineError::Validation(_) => StatusCode::BAD_REQUEST,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
