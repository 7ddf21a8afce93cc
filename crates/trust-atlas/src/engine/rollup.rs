//! Regional & Multi-Country Rollup: region summaries over each country's
//! latest aggregate, and validation for batched multi-country requests.

use std::collections::BTreeMap;

use super::aggregate::round1;
use super::domain::{InstitutionsRegionBreakdown, RegionSummary};
use super::EngineError;

/// Upper bound on a multi-country batch request.
pub const MAX_BATCH_COUNTRIES: usize = 20;

/// One country's contribution to a regional rollup: the latest non-null
/// value per metric, already aggregated and classified.
#[derive(Debug, Clone)]
pub struct CountryLatest {
    pub iso3: String,
    pub region: Option<String>,
    pub primary: Option<f64>,
    pub institutional_trust: Option<f64>,
    pub governance_quality: Option<f64>,
    pub trust_quality_gap: Option<f64>,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(round1(values.iter().sum::<f64>() / values.len() as f64))
    }
}

/// Groups countries by region and computes count/avg/min/max over the
/// primary metric. Countries with a null region or a null primary score are
/// excluded from the headline figures, never counted as zero. When
/// `include_institutions` is set, the summary additionally reports the
/// independent averages of institutional trust, governance quality, and the
/// per-country gap. The gap average is deliberately the mean of individual
/// gaps, not the difference of the other two averages; under asymmetric
/// missing data those diverge.
pub fn summarize_regions(
    countries: &[CountryLatest],
    include_institutions: bool,
) -> Vec<RegionSummary> {
    let mut by_region: BTreeMap<&str, Vec<&CountryLatest>> = BTreeMap::new();
    for country in countries {
        if let Some(region) = country.region.as_deref() {
            by_region.entry(region).or_default().push(country);
        }
    }

    let mut summaries = Vec::with_capacity(by_region.len());
    for (region, members) in by_region {
        let primaries: Vec<f64> = members.iter().filter_map(|c| c.primary).collect();
        let Some(avg_score) = mean(&primaries) else {
            continue;
        };
        let min_score = primaries.iter().copied().fold(f64::INFINITY, f64::min);
        let max_score = primaries.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let institutions = if include_institutions {
            let trust: Vec<f64> = members.iter().filter_map(|c| c.institutional_trust).collect();
            let quality: Vec<f64> = members.iter().filter_map(|c| c.governance_quality).collect();
            let gaps: Vec<f64> = members.iter().filter_map(|c| c.trust_quality_gap).collect();
            Some(InstitutionsRegionBreakdown {
                avg_institutional_trust: mean(&trust),
                avg_governance_quality: mean(&quality),
                avg_trust_quality_gap: mean(&gaps),
            })
        } else {
            None
        };

        summaries.push(RegionSummary {
            region: region.to_string(),
            country_count: primaries.len(),
            avg_score,
            min_score,
            max_score,
            institutions,
        });
    }

    summaries
}

/// Normalizes and validates one ISO3 code: exactly three ASCII letters,
/// uppercased. Whether the code names a registered country is a separate
/// concern resolved against the store.
pub fn parse_iso3(raw: &str) -> Result<String, EngineError> {
    let trimmed = raw.trim();
    if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(trimmed.to_ascii_uppercase())
    } else {
        Err(EngineError::Validation(format!(
            "malformed ISO3 code '{raw}'"
        )))
    }
}

/// Parses a comma-separated batch list, deduplicating while preserving
/// order. Empty lists and lists beyond [`MAX_BATCH_COUNTRIES`] are rejected
/// before any store access.
pub fn parse_batch_codes(raw: &str) -> Result<Vec<String>, EngineError> {
    let mut codes = Vec::new();
    for part in raw.split(',') {
        if part.trim().is_empty() {
            continue;
        }
        let code = parse_iso3(part)?;
        if !codes.contains(&code) {
            codes.push(code);
        }
    }

    if codes.is_empty() {
        return Err(EngineError::Validation(
            "at least one ISO3 code is required".to_string(),
        ));
    }
    if codes.len() > MAX_BATCH_COUNTRIES {
        return Err(EngineError::Validation(format!(
            "at most {MAX_BATCH_COUNTRIES} countries per batch request, got {}",
            codes.len()
        )));
    }
    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn country(
        iso3: &str,
        region: Option<&str>,
        primary: Option<f64>,
        trust: Option<f64>,
        quality: Option<f64>,
    ) -> CountryLatest {
        CountryLatest {
            iso3: iso3.to_string(),
            region: region.map(str::to_string),
            primary,
            institutional_trust: trust,
            governance_quality: quality,
            trust_quality_gap: match (trust, quality) {
                (Some(t), Some(q)) => Some(t - q),
                _ => None,
            },
        }
    }

    #[test]
    fn countries_without_data_are_excluded_not_zeroed() {
        let rows = vec![
            country("USA", Some("Americas"), Some(60.0), None, None),
            country("CAN", Some("Americas"), None, None, None),
            country("BRA", Some("Americas"), Some(40.0), None, None),
        ];
        let summaries = summarize_regions(&rows, false);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].country_count, 2);
        assert_eq!(summaries[0].avg_score, 50.0);
        assert_eq!(summaries[0].min_score, 40.0);
        assert_eq!(summaries[0].max_score, 60.0);
    }

    #[test]
    fn null_region_countries_are_dropped() {
        let rows = vec![
            country("USA", Some("Americas"), Some(60.0), None, None),
            country("XKX", None, Some(99.0), None, None),
        ];
        let summaries = summarize_regions(&rows, false);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].country_count, 1);
    }

    #[test]
    fn gap_average_is_mean_of_per_country_gaps() {
        // Asymmetric missingness: one country lacks institutional trust,
        // another lacks governance quality, so the mean of gaps diverges
        // from the difference of the two component means.
        let rows = vec![
            country("AAA", Some("Test"), Some(70.0), Some(70.0), Some(40.0)),
            country("BBB", Some("Test"), Some(50.0), Some(50.0), None),
            country("CCC", Some("Test"), None, None, Some(80.0)),
        ];
        let summaries = summarize_regions(&rows, true);
        let breakdown = summaries[0].institutions.as_ref().expect("breakdown");

        assert_eq!(breakdown.avg_institutional_trust, Some(60.0));
        assert_eq!(breakdown.avg_governance_quality, Some(60.0));
        // Only AAA has both components; its gap is 30. The difference of
        // the component averages would be 0.
        assert_eq!(breakdown.avg_trust_quality_gap, Some(30.0));
    }

    #[test]
    fn batch_codes_validate_shape_and_bounds() {
        assert_eq!(
            parse_batch_codes("usa, DEU ,FRA").unwrap(),
            vec!["USA", "DEU", "FRA"]
        );
        assert_eq!(parse_batch_codes("USA,USA").unwrap(), vec!["USA"]);
        assert!(matches!(
            parse_batch_codes(""),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            parse_batch_codes("US"),
            Err(EngineError::Validation(_))
        ));

        let too_many = (0..21)
            .map(|i| format!("A{}{}", (b'A' + (i / 26) as u8) as char, (b'A' + (i % 26) as u8) as char))
            .collect::<Vec<_>>()
            .join(",");
        assert!(matches!(
            parse_batch_codes(&too_many),
            Err(EngineError::Validation(_))
        ));
    }
}
