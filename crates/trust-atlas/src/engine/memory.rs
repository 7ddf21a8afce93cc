//! In-memory fixture implementation of the store capability, used by tests
//! and the demo command.

use std::collections::BTreeMap;

use super::domain::{CountryMeta, Observation};
use super::store::{ObservationFilter, ObservationStore, StoreError};

#[derive(Debug, Default, Clone)]
pub struct InMemoryObservationStore {
    observations: Vec<Observation>,
    countries: BTreeMap<String, CountryMeta>,
}

impl InMemoryObservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_country(&mut self, country: CountryMeta) {
        self.countries.insert(country.iso3.clone(), country);
    }

    pub fn insert_observation(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    pub fn observation_count(&self) -> usize {
        self.observations.len()
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }
}

impl ObservationStore for InMemoryObservationStore {
    fn observations(&self, filter: &ObservationFilter) -> Result<Vec<Observation>, StoreError> {
        Ok(self
            .observations
            .iter()
            .filter(|obs| filter.matches(obs))
            .cloned()
            .collect())
    }

    fn country(&self, iso3: &str) -> Result<Option<CountryMeta>, StoreError> {
        Ok(self.countries.get(iso3).cloned())
    }

    fn countries(&self) -> Result<Vec<CountryMeta>, StoreError> {
        Ok(self.countries.values().cloned().collect())
    }
}
