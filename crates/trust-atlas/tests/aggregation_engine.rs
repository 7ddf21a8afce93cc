//! Integration coverage for the aggregation pipeline driven through the
//! public facade over an in-memory store: eligibility, cell aggregation,
//! confidence classification, and gap derivation.

mod common {
    use std::sync::Arc;

    use trust_atlas::engine::{
        CountryMeta, InMemoryObservationStore, Observation, TrustMetricsService, TrustType,
    };

    pub const CURRENT_YEAR: i32 = 2025;

    pub fn country(iso3: &str, name: &str, region: Option<&str>) -> CountryMeta {
        CountryMeta {
            iso3: iso3.to_string(),
            name: name.to_string(),
            region: region.map(str::to_string),
            income_group: None,
        }
    }

    pub fn observation(
        iso3: &str,
        year: i32,
        trust_type: TrustType,
        methodology: Option<&str>,
        source: &str,
        score: f64,
    ) -> Observation {
        Observation {
            iso3: iso3.to_string(),
            year,
            trust_type,
            methodology: methodology.map(str::to_string),
            source: source.to_string(),
            score,
        }
    }

    pub fn service_with(
        countries: Vec<CountryMeta>,
        observations: Vec<Observation>,
    ) -> TrustMetricsService<InMemoryObservationStore> {
        let mut store = InMemoryObservationStore::new();
        for country in countries {
            store.insert_country(country);
        }
        for obs in observations {
            store.insert_observation(obs);
        }
        TrustMetricsService::new(Arc::new(store), CURRENT_YEAR)
    }
}

use common::{country, observation, service_with, CURRENT_YEAR};
use trust_atlas::engine::{
    ConfidenceTier, EngineError, Pillar, PillarRef, SubPillar, TrustType,
};

#[test]
fn governance_quality_scenario_matches_published_methodology() {
    let service = service_with(
        vec![country("USA", "United States", Some("Americas"))],
        vec![
            observation("USA", 2020, TrustType::Institutional, None, "WVS", 60.0),
            observation("USA", 2020, TrustType::Governance, None, "CPI", 70.0),
            observation("USA", 2020, TrustType::Governance, None, "WGI", 50.0),
        ],
    );

    let detail = service.country_detail("USA", None, None).expect("detail");
    assert_eq!(detail.years.len(), 1);
    let record = &detail.years[0];
    assert_eq!(record.year, 2020);

    let governance = record
        .metric(SubPillar::GovernanceQuality)
        .expect("governance cell");
    assert_eq!(governance.score, Some(60.0));
    assert_eq!(governance.sources, vec!["CPI", "WGI"]);
    // Expert indices carry no survey signal, so the cell is tier C.
    assert_eq!(governance.confidence_tier, Some(ConfidenceTier::C));

    let institutional = record
        .metric(SubPillar::InstitutionalTrust)
        .expect("institutional cell");
    assert_eq!(institutional.score, Some(60.0));

    assert_eq!(record.trust_quality_gap, Some(0.0));
}

#[test]
fn every_cell_is_null_with_empty_sources_or_scored_with_attribution() {
    let service = service_with(
        vec![country("USA", "United States", Some("Americas"))],
        vec![
            observation("USA", 2019, TrustType::Interpersonal, Some("binary"), "WVS", 38.2),
            observation("USA", 2021, TrustType::Media, None, "Reuters_DNR", 29.0),
            // Ineligible for social: wrong methodology.
            observation("USA", 2019, TrustType::Interpersonal, Some("scale_0_10"), "ESS", 55.0),
        ],
    );

    let detail = service.country_detail("USA", None, None).expect("detail");
    for record in &detail.years {
        for metric in SubPillar::ALL {
            let cell = record.metric(metric).expect("every metric materialized");
            match cell.score {
                None => {
                    assert!(cell.sources.is_empty(), "null cell must have no sources");
                    assert!(cell.confidence_tier.is_none());
                }
                Some(score) => {
                    assert!((0.0..=100.0).contains(&score));
                    assert!(!cell.sources.is_empty(), "scored cell must attribute sources");
                    assert!(cell.ci_lower.unwrap() >= 0.0);
                    assert!(cell.ci_upper.unwrap() <= 100.0);
                }
            }
        }
    }

    // The 0-10 scale ESS row must not leak into the binary-only social pillar.
    let social_2019 = detail
        .years
        .iter()
        .find(|record| record.year == 2019)
        .and_then(|record| record.metric(SubPillar::Social))
        .expect("social cell");
    assert_eq!(social_2019.score, Some(38.2));
    assert_eq!(social_2019.sources, vec!["WVS"]);
}

#[test]
fn confidence_tier_is_monotonic_in_data_age() {
    let service = service_with(
        vec![country("DEU", "Germany", Some("Europe"))],
        vec![
            observation("DEU", CURRENT_YEAR - 1, TrustType::Media, None, "Reuters_DNR", 47.0),
            observation("DEU", CURRENT_YEAR - 5, TrustType::Media, None, "Reuters_DNR", 45.0),
            observation("DEU", CURRENT_YEAR - 8, TrustType::Media, None, "Reuters_DNR", 44.0),
        ],
    );

    let detail = service.country_detail("DEU", None, None).expect("detail");
    let tier_for = |year: i32| {
        detail
            .years
            .iter()
            .find(|record| record.year == year)
            .and_then(|record| record.metric(SubPillar::Media))
            .and_then(|cell| cell.confidence_tier)
            .expect("tier")
    };

    let fresh = tier_for(CURRENT_YEAR - 1);
    let middling = tier_for(CURRENT_YEAR - 5);
    let stale = tier_for(CURRENT_YEAR - 8);
    assert_eq!(fresh, ConfidenceTier::A);
    assert_eq!(middling, ConfidenceTier::B);
    assert_eq!(stale, ConfidenceTier::C);
    assert!(fresh <= middling && middling <= stale);
}

#[test]
fn gap_requires_both_components() {
    let service = service_with(
        vec![country("BRA", "Brazil", Some("Americas"))],
        vec![
            observation("BRA", 2021, TrustType::Institutional, None, "Latinobarometro", 70.0),
            observation("BRA", 2021, TrustType::Governance, None, "CPI", 40.0),
            // 2023 has institutional trust only; the gap must stay null.
            observation("BRA", 2023, TrustType::Institutional, None, "LAPOP", 40.0),
        ],
    );

    let detail = service.country_detail("BRA", None, None).expect("detail");
    let record_2021 = detail.years.iter().find(|r| r.year == 2021).expect("2021");
    assert_eq!(record_2021.trust_quality_gap, Some(30.0));

    let record_2023 = detail.years.iter().find(|r| r.year == 2023).expect("2023");
    assert_eq!(record_2023.trust_quality_gap, None);
    assert!(record_2023.gap_assessment.is_none());
}

#[test]
fn gap_sign_flips_with_the_inputs() {
    let service = service_with(
        vec![country("SWE", "Sweden", Some("Europe"))],
        vec![
            observation("SWE", 2022, TrustType::Institutional, None, "WVS", 40.0),
            observation("SWE", 2022, TrustType::Governance, None, "WGI", 70.0),
        ],
    );
    let detail = service.country_detail("SWE", None, None).expect("detail");
    assert_eq!(detail.years[0].trust_quality_gap, Some(-30.0));
}

#[test]
fn year_range_filters_the_detail_series() {
    let service = service_with(
        vec![country("FRA", "France", Some("Europe"))],
        vec![
            observation("FRA", 2015, TrustType::Media, None, "Eurobarometer", 30.0),
            observation("FRA", 2020, TrustType::Media, None, "Eurobarometer", 33.0),
            observation("FRA", 2024, TrustType::Media, None, "Reuters_DNR", 31.0),
        ],
    );

    let detail = service
        .country_detail("FRA", Some(2018), Some(2022))
        .expect("detail");
    let years: Vec<i32> = detail.years.iter().map(|record| record.year).collect();
    assert_eq!(years, vec![2020]);

    let err = service
        .country_detail("FRA", Some(2022), Some(2018))
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[test]
fn unregistered_country_is_not_found_and_malformed_code_is_invalid() {
    let service = service_with(vec![country("USA", "United States", None)], vec![]);

    assert!(matches!(
        service.country_detail("ZZZ", None, None),
        Err(EngineError::NotFound(_))
    ));
    assert!(matches!(
        service.country_detail("usa1", None, None),
        Err(EngineError::Validation(_))
    ));
    // Lowercase input normalizes instead of failing.
    assert!(service.country_detail("usa", None, None).is_ok());
}

#[test]
fn snapshot_lists_one_cell_per_country_with_data() {
    let service = service_with(
        vec![
            country("USA", "United States", Some("Americas")),
            country("DEU", "Germany", Some("Europe")),
            country("FRA", "France", Some("Europe")),
        ],
        vec![
            observation("USA", 2022, TrustType::Media, None, "Reuters_DNR", 29.0),
            observation("DEU", 2022, TrustType::Media, None, "Reuters_DNR", 47.0),
            observation("DEU", 2022, TrustType::Media, None, "Eurobarometer", 49.0),
            // Different year; excluded from the 2022 snapshot.
            observation("FRA", 2021, TrustType::Media, None, "Reuters_DNR", 30.0),
        ],
    );

    let cells = service
        .score_snapshot(2022, PillarRef::Pillar(Pillar::Media))
        .expect("snapshot");
    assert_eq!(cells.len(), 2);
    assert_eq!(cells[0].iso3, "DEU");
    assert_eq!(cells[0].score, Some(48.0));
    assert_eq!(cells[0].sources, vec!["Eurobarometer", "Reuters_DNR"]);
    assert_eq!(cells[1].iso3, "USA");

    let err = service
        .score_snapshot(1066, PillarRef::Pillar(Pillar::Media))
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}
