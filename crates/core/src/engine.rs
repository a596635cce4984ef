use serde::Serialize;
use tracing::debug;

use crate::aggregate::aggregate;
use crate::error::{QuoteError, Result};
use crate::estimate::{rated_estimate, Estimate};
use crate::record::CostBreakdown;
use crate::store::QuoteStore;

/// Which branch produced a quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum Resolution {
    Matched {
        quotes: usize,
        breakdown: CostBreakdown,
    },
    Estimated {
        rate_per_km: f64,
        breakdown: CostBreakdown,
    },
}

impl Resolution {
    pub fn breakdown(&self) -> &CostBreakdown {
        match self {
            Resolution::Matched { breakdown, .. } | Resolution::Estimated { breakdown, .. } => {
                breakdown
            }
        }
    }

    pub fn into_breakdown(self) -> CostBreakdown {
        match self {
            Resolution::Matched { breakdown, .. } | Resolution::Estimated { breakdown, .. } => {
                breakdown
            }
        }
    }

    pub fn basis(&self) -> &'static str {
        match self {
            Resolution::Matched { .. } => "matched",
            Resolution::Estimated { .. } => "estimated",
        }
    }
}

/// Resolves quotes against a loaded store. Holds no mutable state, so one
/// instance can serve any number of concurrent callers.
#[derive(Debug, Clone)]
pub struct QuoteEngine {
    store: QuoteStore,
}

impl QuoteEngine {
    pub fn new(store: QuoteStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &QuoteStore {
        &self.store
    }

    /// Exact history when the route has any, dataset-wide rate otherwise.
    pub fn resolve(&self, origin: &str, destination: &str, distance_km: f64) -> Result<Resolution> {
        validate_distance(distance_km)?;
        let matches = self.store.find_matches(origin, destination);
        if matches.is_empty() {
            let Estimate {
                rate_per_km,
                breakdown,
            } = rated_estimate(self.store.records(), distance_km)?;
            debug!(
                origin,
                destination,
                distance_km,
                rate_per_km,
                total = breakdown.total,
                "no route history, estimated from dataset rate"
            );
            return Ok(Resolution::Estimated {
                rate_per_km,
                breakdown,
            });
        }
        let quotes = matches.len();
        let breakdown = aggregate(matches)?;
        debug!(origin, destination, quotes, total = breakdown.total, "matched quote");
        Ok(Resolution::Matched { quotes, breakdown })
    }

    /// Same as [`QuoteEngine::resolve`], but the origin must be a known site.
    pub fn resolve_cost(
        &self,
        origin_name: &str,
        destination_name: &str,
        distance_km: f64,
    ) -> Result<CostBreakdown> {
        self.resolve_known_origin(origin_name, destination_name, distance_km)
            .map(Resolution::into_breakdown)
    }

    pub fn resolve_known_origin(
        &self,
        origin_name: &str,
        destination_name: &str,
        distance_km: f64,
    ) -> Result<Resolution> {
        if self.store.origin_site(origin_name).is_none() {
            return Err(QuoteError::UnknownOrigin(origin_name.trim().to_string()));
        }
        self.resolve(origin_name, destination_name, distance_km)
    }
}

fn validate_distance(distance_km: f64) -> Result<()> {
    if distance_km.is_finite() && distance_km >= 0.0 {
        Ok(())
    } else {
        Err(QuoteError::InvalidDistance(distance_km))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::QuoteRecord;

    fn engine() -> QuoteEngine {
        let store = QuoteStore::from_records(vec![
            QuoteRecord::new("Houston", "Dallas", 400.0, 0.15, 50.0, 150.0),
            QuoteRecord::new("Midland", "Odessa", 100.0, 0.0, 0.0, 0.0),
        ])
        .unwrap();
        QuoteEngine::new(store)
    }

    #[test]
    fn matched_branch_reports_quote_count() {
        let resolution = engine().resolve("Houston", "Dallas", 386.0).unwrap();
        assert_eq!(resolution.basis(), "matched");
        assert!(matches!(resolution, Resolution::Matched { quotes: 1, .. }));
    }

    #[test]
    fn unmatched_branch_estimates() {
        let resolution = engine().resolve("Houston", "Austin", 100.0).unwrap();
        assert_eq!(resolution.basis(), "estimated");
        // no coordinates, so each record's distance is the caller's 100 km
        match resolution {
            Resolution::Estimated {
                rate_per_km,
                breakdown,
            } => {
                assert!((rate_per_km - 3.05).abs() < 1e-12);
                assert_eq!(breakdown.total, 305.0);
            }
            other => panic!("unexpected resolution: {other:?}"),
        }
    }

    #[test]
    fn bad_distances_are_rejected_before_estimation() {
        let engine = engine();
        for distance in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                engine.resolve("Houston", "Austin", distance),
                Err(QuoteError::InvalidDistance(_))
            ));
        }
    }

    #[test]
    fn unknown_origin_is_distinct_from_no_match() {
        let engine = engine();
        assert!(matches!(
            engine.resolve_cost("Lubbock", "Dallas", 500.0),
            Err(QuoteError::UnknownOrigin(name)) if name == "Lubbock"
        ));
        assert!(engine.resolve_cost("midland ", "Dallas", 500.0).is_ok());
    }

    #[test]
    fn resolution_serializes_with_basis_tag() {
        let resolution = engine().resolve("Houston", "Austin", 100.0).unwrap();
        let value = serde_json::to_value(&resolution).unwrap();
        assert_eq!(value["basis"], "estimated");
        assert_eq!(value["breakdown"], serde_json::json!({ "total": 305.0 }));
    }
}
