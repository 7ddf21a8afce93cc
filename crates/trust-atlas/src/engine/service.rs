//! Query Façade: translates the external query shapes into eligibility
//! filtering, aggregation, classification, gap derivation, and rollup, and
//! assembles the canonical result objects that the presentation projections
//! are derived from.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::aggregate;
use super::confidence;
use super::domain::{
    AggregatedScore, CountryMeta, CountryYearRecord, GapAssessment, PillarRef, RegionSummary,
    SubPillar, TrustType,
};
use super::gap;
use super::rollup::{self, CountryLatest};
use super::rules::{self, EligibilityRule};
use super::store::{ObservationFilter, ObservationStore};
use super::views::LegacyCountryTimeline;
use super::EngineError;

/// Year bounds accepted from callers; anything outside is malformed input
/// rather than a data gap.
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

/// Canonical per-country result: reference metadata plus the year-by-year
/// records the response shapes project from.
#[derive(Debug, Clone, Serialize)]
pub struct CountryDetail {
    pub country: CountryMeta,
    pub years: Vec<CountryYearRecord>,
}

/// Latest aggregate per metric for one country, for map rendering. The gap
/// fields are present only for the composite institutions pillar and refer
/// to the most recent year where both components are non-null.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalTrendEntry {
    pub iso3: String,
    pub name: String,
    pub region: Option<String>,
    pub latest: BTreeMap<SubPillar, AggregatedScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_quality_gap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap_assessment: Option<GapAssessment>,
}

/// Batched multi-country result: one series per requested registered
/// country per metric. Countries without data keep their key with empty
/// series; unregistered codes drop out silently.
#[derive(Debug, Clone, Serialize)]
pub struct MultiCountrySeries {
    pub countries: BTreeMap<String, BTreeMap<SubPillar, Vec<AggregatedScore>>>,
}

/// The engine façade. Generic over the store so production adapters and
/// in-memory fixtures are interchangeable. `current_year` is injected at
/// construction; it is the engine's only clock dependency, so identical
/// inputs against an unchanged store always produce identical output.
pub struct TrustMetricsService<S> {
    store: Arc<S>,
    current_year: i32,
}

impl<S: ObservationStore> TrustMetricsService<S> {
    pub fn new(store: Arc<S>, current_year: i32) -> Self {
        Self {
            store,
            current_year,
        }
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    /// CountryYearRecord series for one country over an optional inclusive
    /// year range.
    pub fn country_detail(
        &self,
        iso3: &str,
        from: Option<i32>,
        to: Option<i32>,
    ) -> Result<CountryDetail, EngineError> {
        let code = rollup::parse_iso3(iso3)?;
        let (from, to) = validate_year_range(from, to)?;
        let country = self
            .store
            .country(&code)?
            .ok_or_else(|| EngineError::NotFound(code.clone()))?;

        let filter = ObservationFilter::for_countries([code.clone()]).with_years(from..=to);
        let observations = self.store.observations(&filter)?;
        debug!(iso3 = %code, rows = observations.len(), "aggregating country detail");

        let years = self.year_records(&code, rules::ELIGIBILITY_RULES, &observations);
        Ok(CountryDetail { country, years })
    }

    /// Flat list of aggregated cells for one year and pillar across all
    /// countries with data.
    pub fn score_snapshot(
        &self,
        year: i32,
        selector: PillarRef,
    ) -> Result<Vec<AggregatedScore>, EngineError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(EngineError::Validation(format!(
                "year {year} is outside the supported range {MIN_YEAR}-{MAX_YEAR}"
            )));
        }

        let metrics = selector.metrics();
        let filter = ObservationFilter::default()
            .with_years(year..=year)
            .with_trust_types(trust_types_for(metrics));
        let observations = self.store.observations(&filter)?;

        let mut cells = Vec::new();
        for metric in metrics {
            let rule = rules::rule_for(*metric);
            let mut by_country: BTreeMap<&str, Vec<&super::domain::Observation>> = BTreeMap::new();
            for obs in &observations {
                if rule.admits(obs) {
                    by_country.entry(obs.iso3.as_str()).or_default().push(obs);
                }
            }
            for (iso3, eligible) in by_country {
                let mut cell = aggregate::aggregate_cell(iso3, year, *metric, &eligible);
                confidence::apply(&mut cell, self.current_year);
                cells.push(cell);
            }
        }

        cells.sort_by(|a, b| a.iso3.cmp(&b.iso3).then(a.metric.cmp(&b.metric)));
        Ok(cells)
    }

    /// Latest aggregate per country for one pillar, for the global map.
    pub fn global_latest(&self, selector: PillarRef) -> Result<Vec<GlobalTrendEntry>, EngineError> {
        let metrics = selector.metrics();
        let filter = ObservationFilter::default().with_trust_types(trust_types_for(metrics));
        let observations = self.store.observations(&filter)?;

        let mut entries = Vec::new();
        for country in self.store.countries()? {
            let mut latest = BTreeMap::new();
            let mut series_by_metric = BTreeMap::new();
            for metric in metrics {
                let rule = rules::rule_for(*metric);
                let series = self.classified_series(&country.iso3, rule, &observations);
                if let Some(cell) = aggregate::latest(&series) {
                    latest.insert(*metric, cell.clone());
                }
                series_by_metric.insert(*metric, series);
            }
            if latest.is_empty() {
                continue;
            }

            let trust_quality_gap = if selector.includes_gap() {
                latest_gap(
                    series_by_metric
                        .get(&SubPillar::InstitutionalTrust)
                        .map(Vec::as_slice)
                        .unwrap_or(&[]),
                    series_by_metric
                        .get(&SubPillar::GovernanceQuality)
                        .map(Vec::as_slice)
                        .unwrap_or(&[]),
                )
            } else {
                None
            };

            entries.push(GlobalTrendEntry {
                iso3: country.iso3,
                name: country.name,
                region: country.region,
                latest,
                gap_assessment: gap::assess(trust_quality_gap),
                trust_quality_gap,
            });
        }
        Ok(entries)
    }

    /// RegionSummary list for one pillar over each country's latest value.
    pub fn regional_summary(&self, selector: PillarRef) -> Result<Vec<RegionSummary>, EngineError> {
        let entries = self.global_latest(selector)?;
        let primary = selector.primary_metric();
        let rows: Vec<CountryLatest> = entries
            .iter()
            .map(|entry| CountryLatest {
                iso3: entry.iso3.clone(),
                region: entry.region.clone(),
                primary: entry.latest.get(&primary).and_then(|cell| cell.score),
                institutional_trust: entry
                    .latest
                    .get(&SubPillar::InstitutionalTrust)
                    .and_then(|cell| cell.score),
                governance_quality: entry
                    .latest
                    .get(&SubPillar::GovernanceQuality)
                    .and_then(|cell| cell.score),
                trust_quality_gap: entry.trust_quality_gap,
            })
            .collect();
        Ok(rollup::summarize_regions(&rows, selector.includes_gap()))
    }

    /// Batched series for up to [`rollup::MAX_BATCH_COUNTRIES`] countries,
    /// one store read for the whole batch.
    pub fn multi_country(
        &self,
        iso3_list: &str,
        selector: Option<PillarRef>,
        source: Option<&str>,
    ) -> Result<MultiCountrySeries, EngineError> {
        let requested = rollup::parse_batch_codes(iso3_list)?;
        let registered: BTreeSet<String> = self
            .store
            .countries()?
            .into_iter()
            .map(|country| country.iso3)
            .collect();
        let codes: Vec<String> = requested
            .into_iter()
            .filter(|code| registered.contains(code))
            .collect();

        let metrics: &[SubPillar] = match &selector {
            Some(selector) => selector.metrics(),
            None => &SubPillar::ALL,
        };

        let mut filter = ObservationFilter::for_countries(codes.iter().cloned())
            .with_trust_types(trust_types_for(metrics));
        if let Some(source) = source {
            filter = filter.with_sources(vec![source.trim().to_string()]);
        }
        let observations = self.store.observations(&filter)?;
        debug!(
            countries = codes.len(),
            rows = observations.len(),
            "aggregating multi-country batch"
        );

        let mut countries = BTreeMap::new();
        for code in codes {
            let mut per_metric = BTreeMap::new();
            for metric in metrics {
                let rule = rules::rule_for(*metric);
                per_metric.insert(*metric, self.classified_series(&code, rule, &observations));
            }
            countries.insert(code, per_metric);
        }
        Ok(MultiCountrySeries { countries })
    }

    /// Full per-trust-type timeline for one country in the legacy response
    /// shape, projected from the same canonical records as country detail.
    pub fn country_timeline(&self, iso3: &str) -> Result<LegacyCountryTimeline, EngineError> {
        let detail = self.country_detail(iso3, None, None)?;
        Ok(LegacyCountryTimeline::from_detail(&detail))
    }

    fn classified_series(
        &self,
        iso3: &str,
        rule: &EligibilityRule,
        observations: &[super::domain::Observation],
    ) -> Vec<AggregatedScore> {
        let mut series = aggregate::series(iso3, rule, observations);
        for cell in &mut series {
            confidence::apply(cell, self.current_year);
        }
        series
    }

    /// Builds one CountryYearRecord per year with at least one eligible
    /// observation for any metric, deriving the gap per year.
    fn year_records(
        &self,
        iso3: &str,
        rules_in_scope: &[EligibilityRule],
        observations: &[super::domain::Observation],
    ) -> Vec<CountryYearRecord> {
        let mut cells_by_year: BTreeMap<i32, BTreeMap<SubPillar, AggregatedScore>> =
            BTreeMap::new();
        for rule in rules_in_scope {
            for cell in self.classified_series(iso3, rule, observations) {
                cells_by_year
                    .entry(cell.year)
                    .or_default()
                    .insert(cell.metric, cell);
            }
        }

        cells_by_year
            .into_iter()
            .map(|(year, mut metrics)| {
                for metric in SubPillar::ALL {
                    metrics
                        .entry(metric)
                        .or_insert_with(|| AggregatedScore::empty(iso3, year, metric));
                }
                let trust_quality_gap = gap::trust_quality_gap(
                    metrics
                        .get(&SubPillar::InstitutionalTrust)
                        .and_then(|cell| cell.score),
                    metrics
                        .get(&SubPillar::GovernanceQuality)
                        .and_then(|cell| cell.score),
                );
                CountryYearRecord {
                    iso3: iso3.to_string(),
                    year,
                    metrics,
                    gap_assessment: gap::assess(trust_quality_gap),
                    trust_quality_gap,
                }
            })
            .collect()
    }
}

fn trust_types_for(metrics: &[SubPillar]) -> Vec<TrustType> {
    let mut trust_types: Vec<TrustType> = metrics
        .iter()
        .map(|metric| rules::rule_for(*metric).trust_type)
        .collect();
    trust_types.sort();
    trust_types.dedup();
    trust_types
}

fn validate_year_range(
    from: Option<i32>,
    to: Option<i32>,
) -> Result<(i32, i32), EngineError> {
    let from = from.unwrap_or(MIN_YEAR);
    let to = to.unwrap_or(MAX_YEAR);
    if !(MIN_YEAR..=MAX_YEAR).contains(&from) || !(MIN_YEAR..=MAX_YEAR).contains(&to) {
        return Err(EngineError::Validation(format!(
            "years must fall within {MIN_YEAR}-{MAX_YEAR}"
        )));
    }
    if from > to {
        return Err(EngineError::Validation(format!(
            "'from' year {from} is after 'to' year {to}"
        )));
    }
    Ok((from, to))
}

/// Gap at the most recent year where both components are non-null.
fn latest_gap(
    institutional_trust: &[AggregatedScore],
    governance_quality: &[AggregatedScore],
) -> Option<f64> {
    let quality_by_year: BTreeMap<i32, f64> = governance_quality
        .iter()
        .filter_map(|cell| cell.score.map(|score| (cell.year, score)))
        .collect();

    institutional_trust
        .iter()
        .rev()
        .find_map(|cell| {
            let trust = cell.score?;
            let quality = quality_by_year.get(&cell.year)?;
            gap::trust_quality_gap(Some(trust), Some(*quality))
        })
}
