//! Production cost of drinks.
//!
//! [`compute_costs`] turns recipes and the current price list into a
//! per-drink [`DrinkCostResult`]: one [`CostBreakdownLine`] per costed item,
//! ordered ingredients, tea bags, custom items, then the amortized cleaning
//! cost. The total is always the sum of the breakdown.

use serde::{Deserialize, Serialize};

use crate::{
    recipes::{DrinkRecipe, FixedCosts, PriceList},
    units,
};

/// Label of the amortized cleaning line.
pub const CLEANING_LINE_LABEL: &str = "Daily Cleaning Cost";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Priced per kg or L.
    BulkIngredient,
    /// Priced per piece (tea bags).
    PerUnit,
    /// Flat cost.
    Custom,
    /// Amortized daily cleaning.
    Cleaning,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdownLine {
    /// Ingredient identifier, tea bag name, custom item name or
    /// [`CLEANING_LINE_LABEL`].
    pub item: String,
    pub kind: LineKind,
    /// Base-unit quantity for ingredients, a count otherwise.
    pub amount: f64,
    pub unit_cost: f64,
    pub total_cost: f64,
}

/// Printable form of a [`CostBreakdownLine`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineLabels {
    /// e.g. `Coffee Beans`.
    pub item: String,
    /// e.g. `7.0 g`.
    pub amount: String,
    /// e.g. `€20.00/kg`.
    pub unit_cost: String,
}

impl CostBreakdownLine {
    #[must_use]
    pub fn labels(&self) -> LineLabels {
        match self.kind {
            LineKind::BulkIngredient => LineLabels {
                item: units::display_name(&self.item),
                amount: units::format_display_amount(&self.item, self.amount),
                unit_cost: units::format_unit_price(&self.item, self.unit_cost),
            },
            LineKind::Cleaning => LineLabels {
                item: self.item.clone(),
                amount: "Per product".to_string(),
                unit_cost: format!("€{:.2}/day", self.unit_cost),
            },
            LineKind::PerUnit | LineKind::Custom => LineLabels {
                item: self.item.clone(),
                amount: format!("{}", self.amount),
                unit_cost: format!("€{:.2}", self.unit_cost),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrinkCostResult {
    pub name: String,
    pub breakdown: Vec<CostBreakdownLine>,
    /// Cleaning cost carried by one drink (0 when there is none).
    pub cleaning_cost_per_product: f64,
    /// The daily cleaning cost the per-drink share comes from.
    pub total_cleaning_cost: f64,
    pub total_cost: f64,
}

impl DrinkCostResult {
    /// Everything but the cleaning share.
    #[must_use]
    pub fn items_cost(&self) -> f64 {
        self.breakdown
            .iter()
            .filter(|line| line.kind != LineKind::Cleaning)
            .map(|line| line.total_cost)
            .sum()
    }
}

/// Computes the cost of every recipe, in order.
///
/// Recipes are expected to be already filtered with
/// [`crate::recipes::valid_recipes`]. Items that cannot be priced (unknown
/// ingredient or tea bag, zero or negative quantity, non-positive custom cost)
/// are left out of the breakdown rather than priced at zero.
#[must_use]
pub fn compute_costs(
    fixed: &FixedCosts,
    prices: &PriceList,
    recipes: &[DrinkRecipe],
) -> Vec<DrinkCostResult> {
    let results: Vec<_> = recipes
        .iter()
        .map(|recipe| drink_cost(fixed, prices, recipe))
        .collect();
    tracing::debug!(
        drinks = results.len(),
        cleaning_cost = fixed.cleaning_cost,
        products_per_day = fixed.divisor(),
        "computed drink costs"
    );
    results
}

fn drink_cost(fixed: &FixedCosts, prices: &PriceList, recipe: &DrinkRecipe) -> DrinkCostResult {
    let mut breakdown = Vec::new();

    for (id, quantity) in &recipe.ingredients {
        if *quantity <= 0.0 {
            continue;
        }
        let Some(price) = prices.ingredient(id) else {
            continue;
        };
        breakdown.push(CostBreakdownLine {
            item: id.clone(),
            kind: LineKind::BulkIngredient,
            amount: *quantity,
            unit_cost: price,
            total_cost: quantity * price,
        });
    }

    for (name, count) in &recipe.tea_bags {
        if *count <= 0 {
            continue;
        }
        let Some(cost) = prices.tea_bag(name) else {
            continue;
        };
        breakdown.push(CostBreakdownLine {
            item: name.clone(),
            kind: LineKind::PerUnit,
            amount: *count as f64,
            unit_cost: cost,
            total_cost: *count as f64 * cost,
        });
    }

    for item in recipe.custom_items.iter().filter(|item| item.is_costed()) {
        breakdown.push(CostBreakdownLine {
            item: item.name.trim().to_string(),
            kind: LineKind::Custom,
            amount: 1.0,
            unit_cost: item.cost,
            total_cost: item.cost,
        });
    }

    let cleaning_cost_per_product = fixed.cleaning_cost_per_product();
    if let Some(per_product) = cleaning_cost_per_product {
        breakdown.push(CostBreakdownLine {
            item: CLEANING_LINE_LABEL.to_string(),
            kind: LineKind::Cleaning,
            amount: 1.0,
            unit_cost: fixed.cleaning_cost,
            total_cost: per_product,
        });
    }

    let total_cost = breakdown.iter().map(|line| line.total_cost).sum();

    DrinkCostResult {
        name: recipe.name.clone(),
        breakdown,
        cleaning_cost_per_product: cleaning_cost_per_product.unwrap_or(0.0),
        total_cleaning_cost: if cleaning_cost_per_product.is_some() {
            fixed.cleaning_cost
        } else {
            0.0
        },
        total_cost,
    }
}
