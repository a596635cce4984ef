use crate::error::{QuoteError, Result};
use crate::record::{round_currency, CostBreakdown, QuoteRecord};

#[derive(Debug, Default, Clone, Copy)]
struct Components {
    linehaul: f64,
    fuel: f64,
    other: f64,
    tank_wash: f64,
    total: f64,
}

impl Components {
    fn of(record: &QuoteRecord) -> Self {
        Self {
            linehaul: record.linehaul_cost,
            fuel: record.fuel_cost(),
            other: record.other_cost,
            tank_wash: record.tank_wash_cost,
            total: record.total_cost(),
        }
    }
}

/// Running means kept as the first record plus summed deviations from it, so
/// identical records average back to exactly the first record's values.
#[derive(Debug, Default, Clone, Copy)]
struct Means {
    count: usize,
    base: Components,
    deviation: Components,
}

impl Means {
    fn add(mut self, record: &QuoteRecord) -> Self {
        let next = Components::of(record);
        if self.count == 0 {
            self.base = next;
        } else {
            self.deviation.linehaul += next.linehaul - self.base.linehaul;
            self.deviation.fuel += next.fuel - self.base.fuel;
            self.deviation.other += next.other - self.base.other;
            self.deviation.tank_wash += next.tank_wash - self.base.tank_wash;
            self.deviation.total += next.total - self.base.total;
        }
        self.count += 1;
        self
    }

    fn mean(&self, base: f64, deviation: f64) -> f64 {
        round_currency(base + deviation / self.count as f64)
    }
}

/// Averages matched records field by field.
///
/// Each component and the per-record total are averaged independently, then
/// rounded to cents. A single match goes through the same path.
pub fn aggregate<'a, I>(matches: I) -> Result<CostBreakdown>
where
    I: IntoIterator<Item = &'a QuoteRecord>,
{
    let means = matches.into_iter().fold(Means::default(), Means::add);
    if means.count == 0 {
        return Err(QuoteError::NoMatches);
    }
    let (base, deviation) = (means.base, means.deviation);
    Ok(CostBreakdown {
        linehaul: Some(means.mean(base.linehaul, deviation.linehaul)),
        fuel: Some(means.mean(base.fuel, deviation.fuel)),
        tank_wash: Some(means.mean(base.tank_wash, deviation.tank_wash)),
        other: Some(means.mean(base.other, deviation.other)),
        total: means.mean(base.total, deviation.total),
        note: Some(format!("average of {} quotes", means.count)),
    })
}
