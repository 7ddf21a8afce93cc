use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use trust_atlas::engine::{CountryMeta, InMemoryObservationStore, Observation, TrustType};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Deserialize)]
struct CountryRow {
    iso3: String,
    #[allow(dead_code)]
    iso2: String,
    name: String,
    region: String,
    income_group: String,
}

/// Bundled country reference table, mirroring the production `countries`
/// table the external store serves.
const COUNTRIES_CSV: &str = include_str!("../data/countries.csv");

type SeedRow = (
    &'static str,
    i32,
    TrustType,
    Option<&'static str>,
    &'static str,
    f64,
);

/// Deterministic development observations covering every pillar, in the
/// spirit of the production seed data. Scores are plausible recent values
/// on the common 0-100 scale.
fn seed_observations() -> Vec<SeedRow> {
    vec![
        // Interpersonal trust, binary question framing (WVS wave 7 era).
        ("USA", 2022, TrustType::Interpersonal, Some("binary"), "WVS", 37.0),
        ("DEU", 2022, TrustType::Interpersonal, Some("binary"), "WVS", 44.6),
        ("SWE", 2022, TrustType::Interpersonal, Some("binary"), "WVS", 62.8),
        ("BRA", 2018, TrustType::Interpersonal, Some("binary"), "WVS", 6.5),
        ("IND", 2022, TrustType::Interpersonal, Some("binary"), "WVS", 23.3),
        // Incompatible 0-10 framing, excluded from the social pillar by rule.
        ("DEU", 2023, TrustType::Interpersonal, Some("scale_0_10"), "ESS", 55.1),
        // Institutional trust from the survey families.
        ("USA", 2022, TrustType::Institutional, None, "WVS", 32.0),
        ("DEU", 2022, TrustType::Institutional, None, "WVS", 41.5),
        ("SWE", 2022, TrustType::Institutional, None, "WVS", 55.9),
        ("BRA", 2023, TrustType::Institutional, None, "Latinobarometro", 28.4),
        ("NGA", 2023, TrustType::Institutional, None, "Afrobarometer", 35.2),
        ("JPN", 2019, TrustType::Institutional, None, "WVS", 38.7),
        // Governance quality proxies.
        ("USA", 2024, TrustType::Governance, None, "CPI", 69.0),
        ("USA", 2024, TrustType::Governance, None, "WGI", 74.2),
        ("DEU", 2024, TrustType::Governance, None, "CPI", 79.0),
        ("DEU", 2024, TrustType::Governance, None, "WGI", 82.3),
        ("SWE", 2024, TrustType::Governance, None, "CPI", 76.0),
        ("BRA", 2024, TrustType::Governance, None, "CPI", 38.0),
        ("NGA", 2024, TrustType::Governance, None, "CPI", 25.0),
        ("IND", 2024, TrustType::Governance, None, "CPI", 40.0),
        // Excluded from governance_quality by the rule set.
        ("USA", 2024, TrustType::Governance, None, "V-Dem", 55.0),
        // Media trust.
        ("USA", 2024, TrustType::Media, None, "Reuters_DNR", 31.0),
        ("DEU", 2024, TrustType::Media, None, "Reuters_DNR", 43.0),
        ("DEU", 2024, TrustType::Media, None, "Eurobarometer", 49.0),
        ("FRA", 2024, TrustType::Media, None, "Reuters_DNR", 30.0),
        ("FRA", 2024, TrustType::Media, None, "Eurobarometer", 41.0),
        ("GBR", 2024, TrustType::Media, None, "Reuters_DNR", 33.0),
        ("BRA", 2024, TrustType::Media, None, "Reuters_DNR", 43.0),
        // Supplementary indicators.
        ("USA", 2023, TrustType::Financial, None, "WVS", 41.2),
        ("DEU", 2023, TrustType::Financial, None, "WVS", 47.8),
        ("USA", 2023, TrustType::Science, None, "WVS", 58.4),
        ("KOR", 2023, TrustType::AiTech, None, "WVS", 52.6),
    ]
}

/// Builds the in-memory store served by the API and the demo command:
/// bundled reference countries plus deterministic observations.
pub(crate) fn seed_store() -> Result<InMemoryObservationStore, csv::Error> {
    let mut store = InMemoryObservationStore::new();

    let mut reader = csv::Reader::from_reader(COUNTRIES_CSV.as_bytes());
    for row in reader.deserialize::<CountryRow>() {
        let row = row?;
        store.insert_country(CountryMeta {
            iso3: row.iso3,
            name: row.name,
            region: Some(row.region),
            income_group: Some(row.income_group),
        });
    }

    for (iso3, year, trust_type, methodology, source, score) in seed_observations() {
        store.insert_observation(Observation {
            iso3: iso3.to_string(),
            year,
            trust_type,
            methodology: methodology.map(str::to_string),
            source: source.to_string(),
            score,
        });
    }

    Ok(store)
}
