//! CSV cost report.

use std::io;

use csv::Writer;
use serde::Serialize;

use crate::{
    EngineError, ResultEngine,
    costing::{CostBreakdownLine, DrinkCostResult, LineKind},
    profit::compute_profit,
    recipes::DrinkRecipe,
};

#[derive(Serialize)]
struct ReportRow<'a> {
    drink: &'a str,
    item: String,
    kind: &'static str,
    amount: String,
    unit_cost: String,
    total_cost: String,
    vending_price: Option<String>,
    profit: Option<String>,
    margin_pct: Option<String>,
}

fn kind_label(kind: LineKind) -> &'static str {
    match kind {
        LineKind::BulkIngredient => "ingredient",
        LineKind::PerUnit => "tea_bag",
        LineKind::Custom => "custom",
        LineKind::Cleaning => "cleaning",
    }
}

fn euros(value: f64) -> String {
    format!("{value:.4}")
}

fn line_row<'a>(drink: &'a str, line: &CostBreakdownLine) -> ReportRow<'a> {
    let labels = line.labels();
    ReportRow {
        drink,
        item: labels.item,
        kind: kind_label(line.kind),
        amount: labels.amount,
        unit_cost: labels.unit_cost,
        total_cost: euros(line.total_cost),
        vending_price: None,
        profit: None,
        margin_pct: None,
    }
}

/// Writes one row per breakdown line and a `TOTAL` row per drink.
///
/// `results` must come from [`crate::costing::compute_costs`] over `recipes`:
/// the two are paired by position to find each drink's vending price.
pub fn write_cost_report<W: io::Write>(
    writer: W,
    results: &[DrinkCostResult],
    recipes: &[DrinkRecipe],
) -> ResultEngine<()> {
    let mut writer = Writer::from_writer(writer);
    for (index, result) in results.iter().enumerate() {
        for line in &result.breakdown {
            writer
                .serialize(line_row(&result.name, line))
                .map_err(|err| EngineError::Export(err.to_string()))?;
        }

        let vending_price = recipes
            .get(index)
            .and_then(DrinkRecipe::configured_vending_price);
        let profit = vending_price.and_then(|price| compute_profit(result.total_cost, price));
        writer
            .serialize(ReportRow {
                drink: &result.name,
                item: "TOTAL".to_string(),
                kind: "total",
                amount: String::new(),
                unit_cost: String::new(),
                total_cost: euros(result.total_cost),
                vending_price: vending_price.map(|price| format!("{price:.2}")),
                profit: profit.map(|p| format!("{:.2}", p.profit)),
                margin_pct: profit.map(|p| format!("{:.1}", p.margin_pct)),
            })
            .map_err(|err| EngineError::Export(err.to_string()))?;
    }
    writer
        .flush()
        .map_err(|err| EngineError::Export(err.to_string()))?;
    Ok(())
}

/// [`write_cost_report`] into memory.
pub fn cost_report_csv(
    results: &[DrinkCostResult],
    recipes: &[DrinkRecipe],
) -> ResultEngine<Vec<u8>> {
    let mut buffer = Vec::new();
    write_cost_report(&mut buffer, results, recipes)?;
    Ok(buffer)
}
