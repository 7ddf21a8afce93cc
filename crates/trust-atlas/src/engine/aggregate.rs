//! Source Aggregator: collapses the eligible observations of one
//! `(country, year, metric)` cell into a single score plus source
//! attribution, ahead of confidence classification.

use std::collections::BTreeMap;

use super::domain::{AggregatedScore, Observation, SubPillar};
use super::rules::EligibilityRule;

/// Scores round to one decimal everywhere in the engine.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Attribution label for one observation. A blank stored source degrades to
/// "unknown" rather than failing the aggregation or breaking the
/// sources-empty-iff-null invariant.
fn attribution(source: &str) -> String {
    let trimmed = source.trim();
    if trimmed.is_empty() {
        "unknown".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Collapses one cell. Every eligible row participates in the unweighted
/// mean, including multiple rows from the same source (current behavior,
/// kept intentionally; see the double-counting note in DESIGN.md). Returns
/// an empty cell when no observation is eligible.
pub fn aggregate_cell(
    iso3: &str,
    year: i32,
    metric: SubPillar,
    eligible: &[&Observation],
) -> AggregatedScore {
    if eligible.is_empty() {
        return AggregatedScore::empty(iso3, year, metric);
    }

    let sum: f64 = eligible.iter().map(|obs| obs.score).sum();
    let score = round1(sum / eligible.len() as f64);

    let mut sources: Vec<String> = eligible.iter().map(|obs| attribution(&obs.source)).collect();
    sources.sort();
    sources.dedup();

    AggregatedScore {
        iso3: iso3.to_string(),
        year,
        metric,
        score: Some(score),
        sources,
        confidence_tier: None,
        ci_lower: None,
        ci_upper: None,
    }
}

/// Builds the per-year series for one country and metric from a fetched
/// observation set. Each year aggregates independently; there is no
/// smoothing or interpolation across years. Years with no eligible
/// observation simply do not appear.
pub fn series(
    iso3: &str,
    rule: &EligibilityRule,
    observations: &[Observation],
) -> Vec<AggregatedScore> {
    let mut by_year: BTreeMap<i32, Vec<&Observation>> = BTreeMap::new();
    for obs in observations {
        if obs.iso3 == iso3 && rule.admits(obs) {
            by_year.entry(obs.year).or_default().push(obs);
        }
    }

    by_year
        .into_iter()
        .map(|(year, cell)| aggregate_cell(iso3, year, rule.metric, &cell))
        .collect()
}

/// Picks the most recent year carrying a non-null score. At most one
/// aggregate exists per year per metric, so ties cannot occur.
pub fn latest(series: &[AggregatedScore]) -> Option<&AggregatedScore> {
    series
        .iter()
        .filter(|cell| cell.has_score())
        .max_by_key(|cell| cell.year)
}
