use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use freight_quote_core::{
    load_path, CostBreakdown, OriginSite, QuoteConfig, QuoteEngine, Resolution, StoreSummary,
    DEFAULT_CONFIG,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "freightq", version = VERSION, about = "Freight cost quotes from shipment history")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides the dataset path from config and environment.
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Quote {
        origin: String,
        destination: String,
        #[arg(long = "distance-km")]
        distance_km: f64,
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    Origins {
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    Stats,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let store = load_path(&config.dataset)
        .with_context(|| format!("failed to load dataset {}", config.dataset.display()))?;
    let engine = QuoteEngine::new(store);

    match cli.command {
        Commands::Quote {
            origin,
            destination,
            distance_km,
            json,
        } => {
            let resolution = engine.resolve_known_origin(&origin, &destination, distance_km)?;
            info!(basis = resolution.basis(), "quote resolved");
            if json {
                println!("{}", serde_json::to_string_pretty(&resolution)?);
            } else {
                print!("{}", render_resolution(&resolution));
            }
        }
        Commands::Origins { json } => {
            let sites = engine.store().origin_sites();
            if json {
                println!("{}", serde_json::to_string_pretty(sites)?);
            } else {
                print!("{}", render_origins(sites));
            }
        }
        Commands::Stats => {
            print!("{}", render_summary(&engine.store().summary()));
        }
    }
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<QuoteConfig> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let mut config = QuoteConfig::load(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    if let Some(dataset) = &cli.dataset {
        config.dataset = dataset.clone();
    }
    Ok(config)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn render_resolution(resolution: &Resolution) -> String {
    let mut out = String::new();
    match resolution {
        Resolution::Matched { quotes, .. } => {
            let _ = writeln!(out, "basis:     matched ({quotes} historical quotes)");
        }
        Resolution::Estimated { rate_per_km, .. } => {
            let _ = writeln!(out, "basis:     estimated at {rate_per_km:.4} per km");
        }
    }
    out.push_str(&render_breakdown(resolution.breakdown()));
    out
}

fn render_breakdown(costs: &CostBreakdown) -> String {
    let mut out = String::new();
    let items = [
        ("linehaul", costs.linehaul),
        ("fuel", costs.fuel),
        ("tank_wash", costs.tank_wash),
        ("other", costs.other),
    ];
    for (label, value) in items {
        if let Some(value) = value {
            let _ = writeln!(out, "{:<10} {value:.2}", format!("{label}:"));
        }
    }
    let _ = writeln!(out, "{:<10} {:.2}", "total:", costs.total);
    if let Some(note) = &costs.note {
        let _ = writeln!(out, "{:<10} {note}", "note:");
    }
    out
}

fn render_origins(sites: &[OriginSite]) -> String {
    let mut out = String::new();
    for site in sites {
        match site.coordinates {
            Some(point) => {
                let _ = writeln!(out, "{}\t{:.5}\t{:.5}", site.name, point.lat, point.lon);
            }
            None => {
                let _ = writeln!(out, "{}\t-\t-", site.name);
            }
        }
    }
    out
}

fn render_summary(summary: &StoreSummary) -> String {
    format!(
        "records:          {}\norigins:          {}\nroutes:           {}\nwith coordinates: {}\n",
        summary.records, summary.origins, summary.routes, summary.records_with_coordinates
    )
}
