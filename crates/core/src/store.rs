use std::collections::HashSet;

use serde::Serialize;

use crate::error::{QuoteError, Result};
use crate::matcher::{find_matches, normalize_key};
use crate::record::{Coordinates, QuoteRecord};

/// An origin site (FOB) known from the dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OriginSite {
    pub name: String,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSummary {
    pub records: usize,
    pub origins: usize,
    pub routes: usize,
    pub records_with_coordinates: usize,
}

/// Immutable set of historical quotes, built once at startup.
#[derive(Debug, Clone)]
pub struct QuoteStore {
    records: Vec<QuoteRecord>,
    origins: Vec<OriginSite>,
}

impl QuoteStore {
    pub fn from_records(records: Vec<QuoteRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(QuoteError::EmptyDataset);
        }
        let origins = collect_origins(&records);
        Ok(Self { records, origins })
    }

    pub fn records(&self) -> &[QuoteRecord] {
        &self.records
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn find_matches(&self, origin: &str, destination: &str) -> Vec<&QuoteRecord> {
        find_matches(&self.records, origin, destination)
    }

    /// Origin sites in the order they first appear in the dataset.
    pub fn origin_sites(&self) -> &[OriginSite] {
        &self.origins
    }

    pub fn origin_site(&self, name: &str) -> Option<&OriginSite> {
        let key = normalize_key(name);
        self.origins
            .iter()
            .find(|site| normalize_key(&site.name) == key)
    }

    pub fn summary(&self) -> StoreSummary {
        let routes = self
            .records
            .iter()
            .map(|r| {
                (
                    normalize_key(&r.origin_name),
                    normalize_key(&r.destination_name),
                )
            })
            .collect::<HashSet<_>>()
            .len();
        let records_with_coordinates = self
            .records
            .iter()
            .filter(|r| r.coordinate_distance_km().is_some())
            .count();
        StoreSummary {
            records: self.records.len(),
            origins: self.origins.len(),
            routes,
            records_with_coordinates,
        }
    }
}

fn collect_origins(records: &[QuoteRecord]) -> Vec<OriginSite> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| seen.insert(normalize_key(&record.origin_name)))
        .map(|record| OriginSite {
            name: record.origin_name.clone(),
            coordinates: record.origin,
        })
        .collect()
}
