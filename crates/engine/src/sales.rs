//! Sales derived from cumulative counter readings.
//!
//! Readings only store what the machine counters showed and the cash found in
//! the register. Sales are never persisted: [`reconcile`] recomputes them from
//! the ordered readings every time, so deleting a reading is enough to
//! correct the history.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MoneyCents;

/// A snapshot of the machine counters taken by a person.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CounterReading {
    pub id: Uuid,
    pub config_id: Option<Uuid>,
    pub owner: String,
    pub taken_at: DateTime<Utc>,
    /// Product name → cumulative units dispensed.
    pub counter_data: BTreeMap<String, i64>,
    pub cash_in_register: MoneyCents,
    pub notes: Option<String>,
    /// Product name → vending price at the time of the reading.
    pub product_prices: BTreeMap<String, MoneyCents>,
}

impl CounterReading {
    #[must_use]
    pub fn new(owner: impl Into<String>, taken_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            config_id: None,
            owner: owner.into(),
            taken_at,
            counter_data: BTreeMap::new(),
            cash_in_register: MoneyCents::ZERO,
            notes: None,
            product_prices: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn counter(mut self, product: impl Into<String>, value: i64) -> Self {
        self.counter_data.insert(product.into(), value);
        self
    }

    #[must_use]
    pub fn price(mut self, product: impl Into<String>, price: MoneyCents) -> Self {
        self.product_prices.insert(product.into(), price);
        self
    }

    #[must_use]
    pub fn cash(mut self, cash_in_register: MoneyCents) -> Self {
        self.cash_in_register = cash_in_register;
        self
    }
}

/// Where the unit price of a sales line came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// Vending price stored with the reading.
    Recorded,
    /// Production cost of the product, used when no price was recorded.
    ProductionCost,
    /// Nothing known, revenue is zero.
    Missing,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SalesLine {
    pub product: String,
    pub units_sold: i64,
    pub unit_price: MoneyCents,
    pub price_source: PriceSource,
    pub revenue: MoneyCents,
}

/// Sales between a reading and the one before it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub reading_id: Uuid,
    pub taken_at: DateTime<Utc>,
    pub lines: Vec<SalesLine>,
    /// Products whose counter went down since the previous reading.
    pub counter_resets: Vec<String>,
}

impl SalesRecord {
    #[must_use]
    pub fn total_revenue(&self) -> MoneyCents {
        self.lines.iter().map(|line| line.revenue).sum()
    }

    #[must_use]
    pub fn units_sold(&self) -> i64 {
        self.lines
            .iter()
            .fold(0, |total, line| total.saturating_add(line.units_sold))
    }
}

fn unit_price(
    reading: &CounterReading,
    product: &str,
    fallback_prices: &BTreeMap<String, MoneyCents>,
) -> (MoneyCents, PriceSource) {
    if let Some(price) = reading.product_prices.get(product).copied()
        && price.is_positive()
    {
        return (price, PriceSource::Recorded);
    }
    match fallback_prices.get(product).copied() {
        Some(price) if price.is_positive() => (price, PriceSource::ProductionCost),
        _ => (MoneyCents::ZERO, PriceSource::Missing),
    }
}

fn sales_record(
    previous: &BTreeMap<String, i64>,
    reading: &CounterReading,
    fallback_prices: &BTreeMap<String, MoneyCents>,
) -> SalesRecord {
    let mut lines = Vec::with_capacity(reading.counter_data.len());
    let mut counter_resets = Vec::new();

    for (product, current) in &reading.counter_data {
        let delta = current.saturating_sub(previous.get(product).copied().unwrap_or(0));
        let units_sold = if delta < 0 {
            counter_resets.push(product.clone());
            0
        } else {
            delta
        };
        let (unit_price, price_source) = unit_price(reading, product, fallback_prices);
        let revenue = unit_price * units_sold.unsigned_abs();
        lines.push(SalesLine {
            product: product.clone(),
            units_sold,
            unit_price,
            price_source,
            revenue,
        });
    }

    if !counter_resets.is_empty() {
        tracing::warn!(
            reading = %reading.id,
            products = ?counter_resets,
            "counter went down since the previous reading"
        );
    }

    SalesRecord {
        reading_id: reading.id,
        taken_at: reading.taken_at,
        lines,
        counter_resets,
    }
}

/// Derives one [`SalesRecord`] per reading except the first.
///
/// Readings are processed in `taken_at` order whatever order they are passed
/// in. `fallback_prices` maps product names to their production cost and is
/// used when a reading did not record a vending price.
#[must_use]
pub fn reconcile(
    readings: &[CounterReading],
    fallback_prices: &BTreeMap<String, MoneyCents>,
) -> Vec<SalesRecord> {
    let mut ordered: Vec<&CounterReading> = readings.iter().collect();
    ordered.sort_by_key(|reading| reading.taken_at);

    let records: Vec<_> = ordered
        .windows(2)
        .map(|pair| sales_record(&pair[0].counter_data, pair[1], fallback_prices))
        .collect();
    tracing::debug!(
        readings = readings.len(),
        records = records.len(),
        "reconciled counter readings"
    );
    records
}

/// Sales of one product over the statistics window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductStatistics {
    pub name: String,
    pub quantity: i64,
    pub revenue: MoneyCents,
    pub avg_price: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Highest revenue first.
    pub products: Vec<ProductStatistics>,
    pub total_revenue: MoneyCents,
    pub total_items_sold: i64,
    /// Readings taken inside the window.
    pub readings_count: usize,
    pub period_days: i64,
}

/// Aggregates sales of the last `window_days` days (at least 1).
#[must_use]
pub fn statistics(
    readings: &[CounterReading],
    fallback_prices: &BTreeMap<String, MoneyCents>,
    window_days: i64,
    now: DateTime<Utc>,
) -> Statistics {
    let period_days = window_days.max(1);
    let since = Duration::try_days(period_days)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut per_product: HashMap<String, (i64, MoneyCents)> = HashMap::new();
    for record in reconcile(readings, fallback_prices)
        .into_iter()
        .filter(|record| record.taken_at >= since)
    {
        for line in record.lines {
            let entry = per_product
                .entry(line.product)
                .or_insert((0, MoneyCents::ZERO));
            entry.0 = entry.0.saturating_add(line.units_sold);
            entry.1 += line.revenue;
        }
    }

    let mut products: Vec<_> = per_product
        .into_iter()
        .map(|(name, (quantity, revenue))| ProductStatistics {
            avg_price: average_price(revenue, quantity),
            name,
            quantity,
            revenue,
        })
        .collect();
    products.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.name.cmp(&b.name)));

    Statistics {
        total_revenue: products.iter().map(|p| p.revenue).sum(),
        total_items_sold: products
            .iter()
            .fold(0, |total, p| total.saturating_add(p.quantity)),
        readings_count: readings.iter().filter(|r| r.taken_at >= since).count(),
        period_days,
        products,
    }
}

fn average_price(revenue: MoneyCents, quantity: i64) -> MoneyCents {
    if quantity <= 0 {
        return MoneyCents::ZERO;
    }
    MoneyCents::new((revenue.cents() as f64 / quantity as f64).round() as i64)
}
