use crate::error::{QuoteError, Result};
use crate::record::{round_currency, CostBreakdown, QuoteRecord};

/// Floor applied to every per-record distance before dividing by it.
pub const MIN_RECORD_DISTANCE_KM: f64 = 1.0;

/// Distance a record stands for when computing its rate.
///
/// Records without full coordinates borrow the caller's distance.
pub fn record_distance_km(record: &QuoteRecord, fallback_km: f64) -> f64 {
    record
        .coordinate_distance_km()
        .unwrap_or(fallback_km)
        .max(MIN_RECORD_DISTANCE_KM)
}

/// Mean of per-record `total / distance` across the dataset.
///
/// Averaging per record rather than dividing sums keeps one very large
/// shipment from dominating the typical rate.
pub fn mean_rate_per_km(records: &[QuoteRecord], distance_km: f64) -> Result<f64> {
    if records.is_empty() {
        return Err(QuoteError::EmptyDataset);
    }
    let rate_sum: f64 = records
        .iter()
        .map(|record| record.total_cost() / record_distance_km(record, distance_km))
        .sum();
    Ok(rate_sum / records.len() as f64)
}

/// A fallback estimate together with the rate it was priced at.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    pub rate_per_km: f64,
    pub breakdown: CostBreakdown,
}

pub fn rated_estimate(records: &[QuoteRecord], distance_km: f64) -> Result<Estimate> {
    let rate_per_km = mean_rate_per_km(records, distance_km)?;
    Ok(Estimate {
        rate_per_km,
        breakdown: CostBreakdown::total_only(round_currency(distance_km * rate_per_km)),
    })
}

/// Dataset-wide estimate for a route with no history. Only `total` is set.
pub fn estimate(records: &[QuoteRecord], distance_km: f64) -> Result<CostBreakdown> {
    rated_estimate(records, distance_km).map(|estimate| estimate.breakdown)
}
