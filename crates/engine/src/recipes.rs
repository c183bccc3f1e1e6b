//! Drink recipes, price lists and fixed costs: the inputs of the cost engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::units::Ingredient;

/// Fixed daily costs amortized over the drinks produced in a day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FixedCosts {
    /// Cleaning cost per day.
    pub cleaning_cost: f64,
    /// Expected drinks per day; values below 1 are treated as 1.
    pub products_per_day: i64,
}

impl FixedCosts {
    #[must_use]
    pub fn new(cleaning_cost: f64, products_per_day: i64) -> Self {
        Self {
            cleaning_cost,
            products_per_day,
        }
    }

    /// The divisor used for amortization, floored to 1.
    #[must_use]
    pub fn divisor(&self) -> i64 {
        self.products_per_day.max(1)
    }

    /// Cleaning cost carried by each drink, `None` when there is no cleaning
    /// cost to amortize.
    #[must_use]
    pub fn cleaning_cost_per_product(&self) -> Option<f64> {
        (self.cleaning_cost > 0.0).then(|| self.cleaning_cost / self.divisor() as f64)
    }
}

/// Unit prices known at calculation time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceList {
    /// Ingredient identifier → price per base unit (€/kg or €/L).
    pub ingredients: BTreeMap<String, f64>,
    /// Tea bag name → cost per bag.
    pub tea_bags: BTreeMap<String, f64>,
}

impl PriceList {
    /// Price of a bulk ingredient. Identifiers outside the closed ingredient
    /// set have no price even if the map carries one.
    #[must_use]
    pub fn ingredient(&self, id: &str) -> Option<f64> {
        Ingredient::parse(id)?;
        self.ingredients.get(id).copied()
    }

    #[must_use]
    pub fn tea_bag(&self, name: &str) -> Option<f64> {
        self.tea_bags.get(name).copied()
    }
}

/// A flat-cost addendum to a drink (cookie, cup, lid, ...).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomItem {
    pub name: String,
    pub cost: f64,
}

impl CustomItem {
    #[must_use]
    pub fn is_costed(&self) -> bool {
        !self.name.trim().is_empty() && self.cost > 0.0
    }
}

/// A drink recipe as saved in a configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DrinkRecipe {
    pub name: String,
    /// Ingredient identifier → quantity in base units (kg or L).
    #[serde(default)]
    pub ingredients: BTreeMap<String, f64>,
    /// Tea bag name → number of bags.
    #[serde(default)]
    pub tea_bags: BTreeMap<String, i64>,
    #[serde(default)]
    pub custom_items: Vec<CustomItem>,
    #[serde(default)]
    pub vending_price: Option<f64>,
}

impl DrinkRecipe {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn ingredient(mut self, id: impl Into<String>, base_quantity: f64) -> Self {
        self.ingredients.insert(id.into(), base_quantity);
        self
    }

    #[must_use]
    pub fn tea_bag(mut self, name: impl Into<String>, count: i64) -> Self {
        self.tea_bags.insert(name.into(), count);
        self
    }

    #[must_use]
    pub fn custom_item(mut self, name: impl Into<String>, cost: f64) -> Self {
        self.custom_items.push(CustomItem {
            name: name.into(),
            cost,
        });
        self
    }

    #[must_use]
    pub fn vending_price(mut self, price: f64) -> Self {
        self.vending_price = Some(price);
        self
    }

    /// A recipe is worth costing when it is named and has at least one
    /// ingredient, tea bag or custom item with a positive quantity/cost.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        if self.name.trim().is_empty() {
            return false;
        }
        self.ingredients.values().any(|qty| *qty > 0.0)
            || self.tea_bags.values().any(|count| *count > 0)
            || self.custom_items.iter().any(CustomItem::is_costed)
    }

    /// Vending price when one is configured (> 0).
    #[must_use]
    pub fn configured_vending_price(&self) -> Option<f64> {
        self.vending_price.filter(|price| *price > 0.0)
    }
}

/// Drops recipes that fail [`DrinkRecipe::is_valid`], keeping the order of
/// the others.
#[must_use]
pub fn valid_recipes(recipes: &[DrinkRecipe]) -> Vec<DrinkRecipe> {
    recipes.iter().filter(|r| r.is_valid()).cloned().collect()
}
