//! Confidence Classifier: assigns a tier and uncertainty band from data age
//! and source composition only. It never looks at the score's magnitude and
//! is identical across pillars.

use super::domain::{AggregatedScore, ConfidenceTier};
use super::rules::GOVERNANCE_PROXY_SOURCES;

/// Tier from data age in years. Governance-proxy-only cells (no direct
/// survey observation behind them) are always tier C regardless of recency.
pub fn classify(aggregated_year: i32, current_year: i32, survey_backed: bool) -> ConfidenceTier {
    if !survey_backed {
        return ConfidenceTier::C;
    }
    let age = current_year - aggregated_year;
    if age <= 3 {
        ConfidenceTier::A
    } else if age <= 7 {
        ConfidenceTier::B
    } else {
        ConfidenceTier::C
    }
}

/// Whether any contributing source carries direct survey signal.
pub fn is_survey_backed<S: AsRef<str>>(sources: &[S]) -> bool {
    sources
        .iter()
        .any(|source| !GOVERNANCE_PROXY_SOURCES.contains(&source.as_ref()))
}

/// Stamps tier and confidence interval onto an aggregated cell. Empty cells
/// stay untouched so the null invariants hold.
pub fn apply(cell: &mut AggregatedScore, current_year: i32) {
    let Some(score) = cell.score else {
        return;
    };
    let tier = classify(cell.year, current_year, is_survey_backed(&cell.sources));
    let band = tier.band();
    cell.confidence_tier = Some(tier);
    cell.ci_lower = Some((score - band).max(0.0));
    cell.ci_upper = Some((score + band).min(100.0));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::domain::SubPillar;

    #[test]
    fn tier_follows_data_age() {
        assert_eq!(classify(2025, 2025, true), ConfidenceTier::A);
        assert_eq!(classify(2022, 2025, true), ConfidenceTier::A);
        assert_eq!(classify(2021, 2025, true), ConfidenceTier::B);
        assert_eq!(classify(2018, 2025, true), ConfidenceTier::B);
        assert_eq!(classify(2017, 2025, true), ConfidenceTier::C);
    }

    #[test]
    fn tier_is_monotonic_in_age() {
        let recent = classify(2024, 2025, true);
        let stale = classify(2017, 2025, true);
        assert!(recent <= stale);
    }

    #[test]
    fn proxy_only_cells_are_always_tier_c() {
        assert_eq!(classify(2025, 2025, false), ConfidenceTier::C);
        assert!(!is_survey_backed(&["CPI", "WGI"]));
        assert!(is_survey_backed(&["CPI", "WVS"]));
    }

    #[test]
    fn interval_clamps_to_score_range() {
        let mut cell = AggregatedScore {
            iso3: "USA".to_string(),
            year: 2024,
            metric: SubPillar::Media,
            score: Some(97.0),
            sources: vec!["Reuters_DNR".to_string()],
            confidence_tier: None,
            ci_lower: None,
            ci_upper: None,
        };
        apply(&mut cell, 2025);
        assert_eq!(cell.confidence_tier, Some(ConfidenceTier::A));
        assert_eq!(cell.ci_lower, Some(92.0));
        assert_eq!(cell.ci_upper, Some(100.0));
    }

    #[test]
    fn empty_cell_receives_no_tier() {
        let mut cell = AggregatedScore::empty("USA", 2024, SubPillar::Media);
        apply(&mut cell, 2025);
        assert!(cell.confidence_tier.is_none());
        assert!(cell.ci_lower.is_none());
    }
}
