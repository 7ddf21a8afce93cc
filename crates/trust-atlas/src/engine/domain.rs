use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Dimension of trust a raw observation measures. The external ETL normalizes
/// every source onto a common 0-100 scale before observations reach this
/// engine, so two observations of the same trust type are comparable unless
/// their methodologies differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustType {
    Interpersonal,
    Institutional,
    Governance,
    Media,
    Financial,
    Science,
    AiTech,
}

impl TrustType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrustType::Interpersonal => "interpersonal",
            TrustType::Institutional => "institutional",
            TrustType::Governance => "governance",
            TrustType::Media => "media",
            TrustType::Financial => "financial",
            TrustType::Science => "science",
            TrustType::AiTech => "ai_tech",
        }
    }
}

impl fmt::Display for TrustType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized fact from the Observation Store. Immutable from this
/// engine's perspective; several observations may share `(iso3, year,
/// trust_type)` when independent sources report for the same cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub iso3: String,
    pub year: i32,
    pub trust_type: TrustType,
    #[serde(default)]
    pub methodology: Option<String>,
    pub source: String,
    pub score: f64,
}

/// Static country reference data supplied by the store, never derived here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryMeta {
    pub iso3: String,
    pub name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub income_group: Option<String>,
}

/// Top-level trust dimensions shown on the primary map/explore view, plus
/// the supplementary indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    Social,
    Institutions,
    Media,
    Financial,
    Science,
    AiTech,
}

/// A concrete aggregatable metric. Every pillar maps to exactly one metric
/// except `institutions`, which is a composite of institutional trust
/// (citizen perception) and governance quality (expert assessment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubPillar {
    Social,
    InstitutionalTrust,
    GovernanceQuality,
    Media,
    Financial,
    Science,
    AiTech,
}

impl SubPillar {
    pub const ALL: [SubPillar; 7] = [
        SubPillar::Social,
        SubPillar::InstitutionalTrust,
        SubPillar::GovernanceQuality,
        SubPillar::Media,
        SubPillar::Financial,
        SubPillar::Science,
        SubPillar::AiTech,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubPillar::Social => "social",
            SubPillar::InstitutionalTrust => "institutional_trust",
            SubPillar::GovernanceQuality => "governance_quality",
            SubPillar::Media => "media",
            SubPillar::Financial => "financial",
            SubPillar::Science => "science",
            SubPillar::AiTech => "ai_tech",
        }
    }

    /// Legacy key used by the trust_type-keyed response shape.
    pub fn legacy_key(&self) -> &'static str {
        match self {
            SubPillar::Social => "interpersonal",
            SubPillar::InstitutionalTrust => "institutional",
            SubPillar::GovernanceQuality => "governance",
            SubPillar::Media => "media",
            SubPillar::Financial => "financial",
            SubPillar::Science => "science",
            SubPillar::AiTech => "ai_tech",
        }
    }
}

impl fmt::Display for SubPillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a caller may ask for in a `pillar`/`trust_type` query parameter:
/// either a whole pillar or one of its sub-components directly. Accepts both
/// current pillar names and the legacy trust_type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PillarRef {
    Pillar(Pillar),
    Sub(SubPillar),
}

impl PillarRef {
    /// The metrics that must be aggregated to answer a query for this
    /// selector. Order is stable so response shapes are deterministic.
    pub fn metrics(&self) -> &'static [SubPillar] {
        match self {
            PillarRef::Pillar(Pillar::Social) => &[SubPillar::Social],
            PillarRef::Pillar(Pillar::Institutions) => {
                &[SubPillar::InstitutionalTrust, SubPillar::GovernanceQuality]
            }
            PillarRef::Pillar(Pillar::Media) => &[SubPillar::Media],
            PillarRef::Pillar(Pillar::Financial) => &[SubPillar::Financial],
            PillarRef::Pillar(Pillar::Science) => &[SubPillar::Science],
            PillarRef::Pillar(Pillar::AiTech) => &[SubPillar::AiTech],
            PillarRef::Sub(SubPillar::Social) => &[SubPillar::Social],
            PillarRef::Sub(SubPillar::InstitutionalTrust) => &[SubPillar::InstitutionalTrust],
            PillarRef::Sub(SubPillar::GovernanceQuality) => &[SubPillar::GovernanceQuality],
            PillarRef::Sub(SubPillar::Media) => &[SubPillar::Media],
            PillarRef::Sub(SubPillar::Financial) => &[SubPillar::Financial],
            PillarRef::Sub(SubPillar::Science) => &[SubPillar::Science],
            PillarRef::Sub(SubPillar::AiTech) => &[SubPillar::AiTech],
        }
    }

    /// The headline metric used for count/avg/min/max in rollups.
    pub fn primary_metric(&self) -> SubPillar {
        match self {
            PillarRef::Pillar(Pillar::Institutions) => SubPillar::InstitutionalTrust,
            other => other.metrics()[0],
        }
    }

    /// Whether responses for this selector carry the trust-quality gap.
    pub fn includes_gap(&self) -> bool {
        matches!(self, PillarRef::Pillar(Pillar::Institutions))
    }
}

/// Reliability classification of an aggregated score, derived from data
/// recency and source composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfidenceTier {
    A,
    B,
    C,
}

impl ConfidenceTier {
    /// Half-width of the uncertainty band, in score points.
    pub fn band(&self) -> f64 {
        match self {
            ConfidenceTier::A => 5.0,
            ConfidenceTier::B => 10.0,
            ConfidenceTier::C => 15.0,
        }
    }
}

/// One aggregated `(country, year, metric)` cell. Computed on demand and
/// never persisted. `score` is null exactly when no eligible observation
/// exists for the cell, in which case `sources` is empty and the confidence
/// fields are absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedScore {
    pub iso3: String,
    pub year: i32,
    pub metric: SubPillar,
    pub score: Option<f64>,
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_tier: Option<ConfidenceTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_lower: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_upper: Option<f64>,
}

impl AggregatedScore {
    /// An explicit no-data cell.
    pub fn empty(iso3: &str, year: i32, metric: SubPillar) -> Self {
        Self {
            iso3: iso3.to_string(),
            year,
            metric,
            score: None,
            sources: Vec::new(),
            confidence_tier: None,
            ci_lower: None,
            ci_upper: None,
        }
    }

    pub fn has_score(&self) -> bool {
        self.score.is_some()
    }
}

/// Downstream reading of the trust-quality gap. Positive gaps mean citizens
/// trust more than expert-assessed governance quality warrants; negative
/// gaps the reverse. Severity escalates at 10 and 25 points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapAssessment {
    Aligned,
    TrustSurplus,
    NaiveTrust,
    TrustDeficit,
    CynicalDistrust,
}

/// Per-country, per-year bundle of aggregated metrics plus the derived
/// trust-quality gap. The gap is non-null only when both institutional
/// trust and governance quality are non-null for the same year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryYearRecord {
    pub iso3: String,
    pub year: i32,
    pub metrics: BTreeMap<SubPillar, AggregatedScore>,
    pub trust_quality_gap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap_assessment: Option<GapAssessment>,
}

impl CountryYearRecord {
    pub fn metric(&self, metric: SubPillar) -> Option<&AggregatedScore> {
        self.metrics.get(&metric)
    }

    pub fn score(&self, metric: SubPillar) -> Option<f64> {
        self.metrics.get(&metric).and_then(|cell| cell.score)
    }
}

/// Regional aggregate over the latest non-null score per country for one
/// pillar. `country_count` counts only countries contributing a non-null
/// latest score; countries with no data are excluded, never zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub region: String,
    pub country_count: usize,
    pub avg_score: f64,
    pub min_score: f64,
    pub max_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institutions: Option<InstitutionsRegionBreakdown>,
}

/// Extra per-region averages reported for the composite `institutions`
/// pillar. The gap average is the mean of per-country gaps, computed
/// independently of the other two averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstitutionsRegionBreakdown {
    pub avg_institutional_trust: Option<f64>,
    pub avg_governance_quality: Option<f64>,
    pub avg_trust_quality_gap: Option<f64>,
}
