mod aggregate;
mod config;
mod engine;
mod error;
mod estimate;
mod loader;
mod matcher;
mod record;
mod store;

pub use aggregate::aggregate;
pub use config::{
    QuoteConfig, DEFAULT_BIND_ADDR, DEFAULT_CONFIG, DEFAULT_DATASET, ENV_BIND_ADDR, ENV_DATASET,
};
pub use engine::{QuoteEngine, Resolution};
pub use error::{QuoteError, Result};
pub use estimate::{estimate, mean_rate_per_km, rated_estimate, Estimate};
pub use loader::{load_path, load_reader};
pub use matcher::{find_matches, normalize_key};
pub use record::{round_currency, Coordinates, CostBreakdown, QuoteRecord, KM_PER_DEGREE};
pub use store::{OriginSite, QuoteStore, StoreSummary};
