use serde::Serialize;

/// Kilometres per degree used by the planar distance proxy.
pub const KM_PER_DEGREE: f64 = 111.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Small-angle planar approximation: `sqrt(dlat^2 + dlon^2) * 111`.
    ///
    /// Lossy at high latitudes and over long hauls; kept as-is so estimates stay
    /// comparable with historical quotes.
    pub fn planar_km(&self, other: &Coordinates) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        (dlat * dlat + dlon * dlon).sqrt() * KM_PER_DEGREE
    }
}

/// One historical shipment cost entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteRecord {
    pub origin_name: String,
    pub destination_name: String,
    pub origin: Option<Coordinates>,
    pub destination: Option<Coordinates>,
    pub linehaul_cost: f64,
    /// Fraction of linehaul, `0.25` means 25%.
    pub fuel_rate: f64,
    pub other_cost: f64,
    pub tank_wash_cost: f64,
}

impl QuoteRecord {
    pub fn new(
        origin_name: impl Into<String>,
        destination_name: impl Into<String>,
        linehaul_cost: f64,
        fuel_rate: f64,
        other_cost: f64,
        tank_wash_cost: f64,
    ) -> Self {
        Self {
            origin_name: origin_name.into().trim().to_string(),
            destination_name: destination_name.into().trim().to_string(),
            origin: None,
            destination: None,
            linehaul_cost,
            fuel_rate,
            other_cost,
            tank_wash_cost,
        }
    }

    pub fn with_coordinates(mut self, origin: Coordinates, destination: Coordinates) -> Self {
        self.origin = Some(origin);
        self.destination = Some(destination);
        self
    }

    pub fn fuel_cost(&self) -> f64 {
        self.linehaul_cost * self.fuel_rate
    }

    /// Linehaul plus fuel plus other. Tank wash is reported separately and never
    /// counts towards the total.
    pub fn total_cost(&self) -> f64 {
        self.linehaul_cost + self.fuel_cost() + self.other_cost
    }

    /// Straight-line distance between the record's endpoints, when both are known.
    pub fn coordinate_distance_km(&self) -> Option<f64> {
        match (&self.origin, &self.destination) {
            (Some(origin), Some(destination)) => Some(origin.planar_km(destination)),
            _ => None,
        }
    }
}

/// Cost breakdown handed back to the caller.
///
/// Fallback estimates only carry `total`; the itemized fields stay `None` and are
/// left out of the serialized form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostBreakdown {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linehaul: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tank_wash: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other: Option<f64>,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CostBreakdown {
    pub fn total_only(total: f64) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }
}

/// Rounds a currency amount to cents.
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
