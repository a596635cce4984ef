use std::fs;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use flate2::read::MultiGzDecoder;
use tracing::{info, warn};

use crate::error::{QuoteError, Result};
use crate::record::{Coordinates, QuoteRecord};
use crate::store::QuoteStore;

pub const COL_ORIGIN: &str = "ORIGIN";
pub const COL_DESTINATION: &str = "DESTINATION";
pub const COL_ORIGIN_LAT: &str = "Origin Latitude";
pub const COL_ORIGIN_LON: &str = "Origin Longitude";
pub const COL_DEST_LAT: &str = "Destination Latitude";
pub const COL_DEST_LON: &str = "Destination Longitude";
pub const COL_LINEHAUL: &str = "LINEHAUL";
pub const COL_FUEL: &str = "FUEL";
pub const COL_OTHER: &str = "OTHER";
pub const COL_TANK_WASH: &str = "TANK WASH";

/// Loads the quote dataset from a `.csv`, `.tsv`, `.csv.gz` or `.tsv.gz` export.
pub fn load_path(path: &Path) -> Result<QuoteStore> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_lowercase())
        .unwrap_or_default();
    let store = if name.ends_with(".csv.gz") {
        load_reader(MultiGzDecoder::new(fs::File::open(path)?), b',')?
    } else if name.ends_with(".tsv.gz") {
        load_reader(MultiGzDecoder::new(fs::File::open(path)?), b'\t')?
    } else if name.ends_with(".csv") {
        load_reader(fs::File::open(path)?, b',')?
    } else if name.ends_with(".tsv") {
        load_reader(fs::File::open(path)?, b'\t')?
    } else {
        return Err(QuoteError::UnsupportedInput(path.to_path_buf()));
    };
    info!(
        path = %path.display(),
        records = store.record_count(),
        origins = store.origin_sites().len(),
        "quote dataset loaded"
    );
    Ok(store)
}

pub fn load_reader<R: Read>(reader: R, delimiter: u8) -> Result<QuoteStore> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .from_reader(reader);
    let columns = Columns::resolve(reader.headers()?)?;
    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row?;
        let row_number = idx + 1;
        match columns.parse_row(&row, row_number)? {
            Some(record) => records.push(record),
            None => warn!(row = row_number, "skipping row without origin or destination"),
        }
    }
    QuoteStore::from_records(records)
}

struct Columns {
    origin: usize,
    destination: usize,
    origin_lat: Option<usize>,
    origin_lon: Option<usize>,
    dest_lat: Option<usize>,
    dest_lon: Option<usize>,
    linehaul: usize,
    fuel: usize,
    other: usize,
    tank_wash: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &'static str| find(name).ok_or(QuoteError::MissingColumn(name));
        Ok(Self {
            origin: require(COL_ORIGIN)?,
            destination: require(COL_DESTINATION)?,
            origin_lat: find(COL_ORIGIN_LAT),
            origin_lon: find(COL_ORIGIN_LON),
            dest_lat: find(COL_DEST_LAT),
            dest_lon: find(COL_DEST_LON),
            linehaul: require(COL_LINEHAUL)?,
            fuel: require(COL_FUEL)?,
            other: require(COL_OTHER)?,
            tank_wash: require(COL_TANK_WASH)?,
        })
    }

    fn parse_row(&self, row: &StringRecord, row_number: usize) -> Result<Option<QuoteRecord>> {
        let cell = |idx: usize| row.get(idx).unwrap_or("");
        let origin = cell(self.origin);
        let destination = cell(self.destination);
        if origin.is_empty() || destination.is_empty() {
            return Ok(None);
        }
        let cost = |idx: usize, column: &'static str, unit: Unit| -> Result<f64> {
            let value = parse_cell(cell(idx), unit)
                .ok_or_else(|| invalid(row_number, column, cell(idx)))?
                .unwrap_or(0.0);
            if value < 0.0 {
                return Err(invalid(row_number, column, cell(idx)));
            }
            Ok(value)
        };
        let coordinate = |idx: Option<usize>, column: &'static str| -> Result<Option<f64>> {
            let Some(idx) = idx else {
                return Ok(None);
            };
            parse_cell(cell(idx), Unit::Plain).ok_or_else(|| invalid(row_number, column, cell(idx)))
        };
        let origin_point = pair(
            coordinate(self.origin_lat, COL_ORIGIN_LAT)?,
            coordinate(self.origin_lon, COL_ORIGIN_LON)?,
        );
        let dest_point = pair(
            coordinate(self.dest_lat, COL_DEST_LAT)?,
            coordinate(self.dest_lon, COL_DEST_LON)?,
        );
        let mut record = QuoteRecord::new(
            origin,
            destination,
            cost(self.linehaul, COL_LINEHAUL, Unit::Currency)?,
            cost(self.fuel, COL_FUEL, Unit::Fraction)?,
            cost(self.other, COL_OTHER, Unit::Currency)?,
            cost(self.tank_wash, COL_TANK_WASH, Unit::Currency)?,
        );
        record.origin = origin_point;
        record.destination = dest_point;
        Ok(Some(record))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Unit {
    Plain,
    Currency,
    /// Decimal fraction; a trailing `%` divides by 100.
    Fraction,
}

/// `None` for unparsable input, `Some(None)` for a blank cell.
fn parse_cell(raw: &str, unit: Unit) -> Option<Option<f64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(None);
    }
    let (body, percent) = match trimmed.strip_suffix('%') {
        Some(body) if unit == Unit::Fraction => (body, true),
        Some(_) => return None,
        None => (trimmed, false),
    };
    let cleaned: String = match unit {
        Unit::Plain => body.trim().to_string(),
        Unit::Currency | Unit::Fraction => body
            .chars()
            .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
            .collect(),
    };
    let value: f64 = cleaned.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(Some(if percent { value / 100.0 } else { value }))
}

fn pair(lat: Option<f64>, lon: Option<f64>) -> Option<Coordinates> {
    Some(Coordinates::new(lat?, lon?))
}

fn invalid(row: usize, column: &'static str, value: &str) -> QuoteError {
    QuoteError::InvalidCell {
        row,
        column,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::Builder;

    const FULL_HEADER: &str = "ORIGIN,DESTINATION,Origin Latitude,Origin Longitude,Destination Latitude,Destination Longitude,LINEHAUL,FUEL,OTHER,TANK WASH";

    fn load_str(body: &str) -> Result<QuoteStore> {
        load_reader(body.as_bytes(), b',')
    }

    #[test]
    fn parses_full_rows() {
        let csv = format!(
            "{FULL_HEADER}\nHouston,Dallas,29.76,-95.37,32.78,-96.80,400,0.15,50,150\n"
        );
        let store = load_str(&csv).unwrap();
        let record = &store.records()[0];
        assert_eq!(record.origin_name, "Houston");
        assert_eq!(record.origin, Some(Coordinates::new(29.76, -95.37)));
        assert_eq!(record.destination, Some(Coordinates::new(32.78, -96.80)));
        assert_eq!(record.linehaul_cost, 400.0);
        assert_eq!(record.fuel_rate, 0.15);
        assert_eq!(record.tank_wash_cost, 150.0);
    }

    #[test]
    fn headers_match_loosely_and_coordinates_are_optional() {
        let csv = " origin , Destination,linehaul,fuel,other,tank wash\nHouston,Dallas,400,0.15,50,150\n";
        let store = load_str(csv).unwrap();
        let record = &store.records()[0];
        assert!(record.origin.is_none());
        assert!(record.destination.is_none());
        assert_eq!(record.total_cost(), 510.0);
    }

    #[test]
    fn currency_and_percent_cells_are_normalized() {
        let csv = "ORIGIN,DESTINATION,LINEHAUL,FUEL,OTHER,TANK WASH\nA,B,\"$1,200.50\",25%,,$75\n";
        let record = load_str(csv).unwrap().records()[0].clone();
        assert_eq!(record.linehaul_cost, 1200.5);
        assert_eq!(record.fuel_rate, 0.25);
        assert_eq!(record.other_cost, 0.0);
        assert_eq!(record.tank_wash_cost, 75.0);
    }

    #[test]
    fn half_blank_coordinates_read_as_absent() {
        let csv = format!("{FULL_HEADER}\nA,B,29.7,,32.7,-96.8,1,0,0,0\n");
        let record = load_str(&csv).unwrap().records()[0].clone();
        assert!(record.origin.is_none());
        assert_eq!(record.destination, Some(Coordinates::new(32.7, -96.8)));
    }

    #[test]
    fn missing_cost_column_is_fatal() {
        let csv = "ORIGIN,DESTINATION,LINEHAUL,FUEL,OTHER\nA,B,1,0,0\n";
        assert!(matches!(
            load_str(csv),
            Err(QuoteError::MissingColumn(COL_TANK_WASH))
        ));
    }

    #[test]
    fn garbage_cell_reports_row_and_column() {
        let csv = "ORIGIN,DESTINATION,LINEHAUL,FUEL,OTHER,TANK WASH\nA,B,1,0,0,0\nA,C,abc,0,0,0\n";
        match load_str(csv) {
            Err(QuoteError::InvalidCell { row, column, value }) => {
                assert_eq!(row, 2);
                assert_eq!(column, COL_LINEHAUL);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn negative_and_non_finite_costs_are_rejected() {
        let negative = "ORIGIN,DESTINATION,LINEHAUL,FUEL,OTHER,TANK WASH\nA,B,-5,0,0,0\n";
        assert!(matches!(load_str(negative), Err(QuoteError::InvalidCell { .. })));
        let nan = "ORIGIN,DESTINATION,LINEHAUL,FUEL,OTHER,TANK WASH\nA,B,NaN,0,0,0\n";
        assert!(matches!(load_str(nan), Err(QuoteError::InvalidCell { .. })));
    }

    #[test]
    fn short_rows_fail_the_load() {
        let csv = "ORIGIN,DESTINATION,LINEHAUL,FUEL,OTHER,TANK WASH\nA,B,400,0.15,50,0\nA,B\n";
        assert!(matches!(load_str(csv), Err(QuoteError::Csv(_))));
    }

    #[test]
    fn rows_without_names_are_skipped() {
        let csv = "ORIGIN,DESTINATION,LINEHAUL,FUEL,OTHER,TANK WASH\n,B,1,0,0,0\nA,B,2,0,0,0\n";
        let store = load_str(csv).unwrap();
        assert_eq!(store.record_count(), 1);
        assert_eq!(store.records()[0].linehaul_cost, 2.0);
    }

    #[test]
    fn header_only_dataset_is_empty() {
        let csv = "ORIGIN,DESTINATION,LINEHAUL,FUEL,OTHER,TANK WASH\n";
        assert!(matches!(load_str(csv), Err(QuoteError::EmptyDataset)));
    }

    #[test]
    fn loads_tsv_from_disk() {
        let mut file = Builder::new().suffix(".tsv").tempfile().unwrap();
        writeln!(file, "ORIGIN\tDESTINATION\tLINEHAUL\tFUEL\tOTHER\tTANK WASH").unwrap();
        writeln!(file, "Houston\tDallas\t400\t0.15\t50\t150").unwrap();
        let store = load_path(file.path()).unwrap();
        assert_eq!(store.record_count(), 1);
    }

    #[test]
    fn loads_gzipped_csv_from_disk() {
        let file = Builder::new().suffix(".csv.gz").tempfile().unwrap();
        let mut encoder = GzEncoder::new(
            fs::File::create(file.path()).unwrap(),
            Compression::default(),
        );
        writeln!(encoder, "ORIGIN,DESTINATION,LINEHAUL,FUEL,OTHER,TANK WASH").unwrap();
        writeln!(encoder, "Houston,Dallas,400,0.15,50,150").unwrap();
        encoder.finish().unwrap();
        let store = load_path(file.path()).unwrap();
        assert_eq!(store.records()[0].destination_name, "Dallas");
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        assert!(matches!(
            load_path(file.path()),
            Err(QuoteError::UnsupportedInput(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_path(Path::new("/nonexistent/quotes.csv"));
        assert!(matches!(result, Err(QuoteError::Io(_))));
    }
}
