//! Presentation projections. The pillar-keyed shape and the legacy
//! trust_type-keyed shape are both derived from the same canonical
//! `CountryYearRecord` values; neither is an independent computation.

use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{
    AggregatedScore, ConfidenceTier, CountryMeta, CountryYearRecord, GapAssessment, SubPillar,
};
use super::service::CountryDetail;

/// One aggregated cell as rendered inside a keyed record. Present only when
/// the cell carries a score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCellView {
    pub score: f64,
    pub sources: Vec<String>,
    pub confidence_tier: Option<ConfidenceTier>,
    pub ci_lower: Option<f64>,
    pub ci_upper: Option<f64>,
}

impl ScoreCellView {
    fn from_cell(cell: &AggregatedScore) -> Option<Self> {
        cell.score.map(|score| Self {
            score,
            sources: cell.sources.clone(),
            confidence_tier: cell.confidence_tier,
            ci_lower: cell.ci_lower,
            ci_upper: cell.ci_upper,
        })
    }
}

/// The composite institutions pillar with its two components and derived gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstitutionsView {
    pub institutional_trust: Option<ScoreCellView>,
    pub governance_quality: Option<ScoreCellView>,
    pub trust_quality_gap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap_assessment: Option<GapAssessment>,
}

/// Supplementary indicators outside the three primary pillars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplementaryView {
    pub financial: Option<ScoreCellView>,
    pub science: Option<ScoreCellView>,
    pub ai_tech: Option<ScoreCellView>,
}

/// Current pillar-keyed record shape for one country-year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PillarKeyedRecord {
    pub year: i32,
    pub social: Option<ScoreCellView>,
    pub institutions: InstitutionsView,
    pub media: Option<ScoreCellView>,
    pub supplementary: SupplementaryView,
}

impl PillarKeyedRecord {
    pub fn from_record(record: &CountryYearRecord) -> Self {
        let view = |metric: SubPillar| record.metric(metric).and_then(ScoreCellView::from_cell);
        Self {
            year: record.year,
            social: view(SubPillar::Social),
            institutions: InstitutionsView {
                institutional_trust: view(SubPillar::InstitutionalTrust),
                governance_quality: view(SubPillar::GovernanceQuality),
                trust_quality_gap: record.trust_quality_gap,
                gap_assessment: record.gap_assessment,
            },
            media: view(SubPillar::Media),
            supplementary: SupplementaryView {
                financial: view(SubPillar::Financial),
                science: view(SubPillar::Science),
                ai_tech: view(SubPillar::AiTech),
            },
        }
    }
}

/// Country-detail response: the pillar-keyed projection of a canonical
/// detail result.
#[derive(Debug, Clone, Serialize)]
pub struct CountryDetailResponse {
    pub country: CountryMeta,
    pub years: Vec<PillarKeyedRecord>,
}

impl CountryDetailResponse {
    pub fn from_detail(detail: &CountryDetail) -> Self {
        Self {
            country: detail.country.clone(),
            years: detail.years.iter().map(PillarKeyedRecord::from_record).collect(),
        }
    }
}

/// One point in a legacy timeline. Legacy consumers only ever saw rows that
/// had data, so null cells are omitted rather than serialized as null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyPoint {
    pub year: i32,
    pub score: f64,
    pub confidence_tier: Option<ConfidenceTier>,
    pub ci_lower: Option<f64>,
    pub ci_upper: Option<f64>,
    pub sources: Vec<String>,
}

/// Backward-compatible trust_type-keyed timeline for one country.
#[derive(Debug, Clone, Serialize)]
pub struct LegacyCountryTimeline {
    pub iso3: String,
    pub name: String,
    pub trust_types: BTreeMap<&'static str, Vec<LegacyPoint>>,
}

impl LegacyCountryTimeline {
    pub fn from_detail(detail: &CountryDetail) -> Self {
        let mut trust_types: BTreeMap<&'static str, Vec<LegacyPoint>> = BTreeMap::new();
        for metric in SubPillar::ALL {
            trust_types.insert(metric.legacy_key(), Vec::new());
        }

        for record in &detail.years {
            for metric in SubPillar::ALL {
                let Some(cell) = record.metric(metric) else {
                    continue;
                };
                let Some(score) = cell.score else {
                    continue;
                };
                trust_types
                    .entry(metric.legacy_key())
                    .or_default()
                    .push(LegacyPoint {
                        year: record.year,
                        score,
                        confidence_tier: cell.confidence_tier,
                        ci_lower: cell.ci_lower,
                        ci_upper: cell.ci_upper,
                        sources: cell.sources.clone(),
                    });
            }
        }

        Self {
            iso3: detail.country.iso3.clone(),
            name: detail.country.name.clone(),
            trust_types,
        }
    }
}
