//! Observation Store capability. The persistent store is an external
//! collaborator; the engine only requires an injected, scoped query
//! interface so it can run against a production-backed adapter or an
//! in-memory fixture interchangeably.

use std::ops::RangeInclusive;

use super::domain::{CountryMeta, Observation, TrustType};

/// Conjunctive filter over stored observations. Every `None` field is
/// unrestricted. One filter maps to one store read; batch queries compose a
/// single filter instead of issuing one read per country.
#[derive(Debug, Clone, Default)]
pub struct ObservationFilter {
    pub iso3: Option<Vec<String>>,
    pub years: Option<RangeInclusive<i32>>,
    pub trust_types: Option<Vec<TrustType>>,
    pub sources: Option<Vec<String>>,
    pub methodologies: Option<Vec<String>>,
}

impl ObservationFilter {
    pub fn for_countries<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            iso3: Some(codes.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn with_years(mut self, years: RangeInclusive<i32>) -> Self {
        self.years = Some(years);
        self
    }

    pub fn with_trust_types(mut self, trust_types: Vec<TrustType>) -> Self {
        self.trust_types = Some(trust_types);
        self
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = Some(sources);
        self
    }

    /// Whether an observation satisfies every restriction in this filter.
    pub fn matches(&self, obs: &Observation) -> bool {
        if let Some(codes) = &self.iso3 {
            if !codes.iter().any(|code| code == &obs.iso3) {
                return false;
            }
        }
        if let Some(years) = &self.years {
            if !years.contains(&obs.year) {
                return false;
            }
        }
        if let Some(trust_types) = &self.trust_types {
            if !trust_types.contains(&obs.trust_type) {
                return false;
            }
        }
        if let Some(sources) = &self.sources {
            if !sources.iter().any(|source| source == &obs.source) {
                return false;
            }
        }
        if let Some(methodologies) = &self.methodologies {
            match obs.methodology.as_deref() {
                Some(methodology) if methodologies.iter().any(|m| m == methodology) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Failures surfaced by the external store. The engine never retries;
/// retrying belongs to the transport boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("observation store unavailable: {0}")]
    Unavailable(String),
}

/// Read-only query capability over the external observation dataset and its
/// country reference table.
pub trait ObservationStore: Send + Sync {
    fn observations(&self, filter: &ObservationFilter) -> Result<Vec<Observation>, StoreError>;
    fn country(&self, iso3: &str) -> Result<Option<CountryMeta>, StoreError>;
    fn countries(&self) -> Result<Vec<CountryMeta>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(iso3: &str, year: i32, trust_type: TrustType, source: &str) -> Observation {
        Observation {
            iso3: iso3.to_string(),
            year,
            trust_type,
            methodology: None,
            source: source.to_string(),
            score: 42.0,
        }
    }

    #[test]
    fn default_filter_matches_everything() {
        let filter = ObservationFilter::default();
        assert!(filter.matches(&obs("USA", 2020, TrustType::Media, "Reuters_DNR")));
    }

    #[test]
    fn composed_filter_applies_every_restriction() {
        let filter = ObservationFilter::for_countries(["USA", "DEU"])
            .with_years(2018..=2022)
            .with_trust_types(vec![TrustType::Media])
            .with_sources(vec!["Reuters_DNR".to_string()]);

        assert!(filter.matches(&obs("DEU", 2020, TrustType::Media, "Reuters_DNR")));
        assert!(!filter.matches(&obs("FRA", 2020, TrustType::Media, "Reuters_DNR")));
        assert!(!filter.matches(&obs("USA", 2017, TrustType::Media, "Reuters_DNR")));
        assert!(!filter.matches(&obs("USA", 2020, TrustType::Governance, "Reuters_DNR")));
        assert!(!filter.matches(&obs("USA", 2020, TrustType::Media, "Eurobarometer")));
    }

    #[test]
    fn methodology_filter_rejects_missing_methodology() {
        let filter = ObservationFilter {
            methodologies: Some(vec!["binary".to_string()]),
            ..ObservationFilter::default()
        };
        let mut observation = obs("USA", 2020, TrustType::Interpersonal, "WVS");
        assert!(!filter.matches(&observation));
        observation.methodology = Some("binary".to_string());
        assert!(filter.matches(&observation));
    }
}
