//! Conversions between the wire shapes and the engine types.

use std::collections::BTreeMap;

use api_types::{calculate, config, recipe};
use engine::{ConfigAccess, CustomItem, DrinkRecipe, FixedCosts, LineKind, MoneyCents};

pub fn fixed_costs(value: &recipe::FixedCosts) -> FixedCosts {
    FixedCosts::new(value.cleaning_cost, value.products_per_day)
}

pub fn fixed_costs_view(value: FixedCosts) -> recipe::FixedCosts {
    recipe::FixedCosts {
        cleaning_cost: value.cleaning_cost,
        products_per_day: value.products_per_day,
    }
}

pub fn drink(value: recipe::Drink) -> DrinkRecipe {
    DrinkRecipe {
        name: value.name,
        ingredients: value.ingredients,
        tea_bags: value.tea_bags,
        custom_items: value
            .custom_items
            .into_iter()
            .map(|item| CustomItem {
                name: item.name,
                cost: item.cost,
            })
            .collect(),
        vending_price: value.vending_price,
    }
}

pub fn drink_view(value: DrinkRecipe) -> recipe::Drink {
    recipe::Drink {
        name: value.name,
        ingredients: value.ingredients,
        tea_bags: value.tea_bags,
        custom_items: value
            .custom_items
            .into_iter()
            .map(|item| recipe::CustomItem {
                name: item.name,
                cost: item.cost,
            })
            .collect(),
        vending_price: value.vending_price,
    }
}

pub fn access(value: ConfigAccess) -> config::Access {
    match value {
        ConfigAccess::Owner => config::Access::Owner,
        ConfigAccess::Editor => config::Access::Editor,
        ConfigAccess::Viewer => config::Access::Viewer,
    }
}

pub fn line_kind(value: LineKind) -> calculate::CostLineKind {
    match value {
        LineKind::BulkIngredient => calculate::CostLineKind::BulkIngredient,
        LineKind::PerUnit => calculate::CostLineKind::PerUnit,
        LineKind::Custom => calculate::CostLineKind::Custom,
        LineKind::Cleaning => calculate::CostLineKind::Cleaning,
    }
}

pub fn cost_line(line: engine::CostBreakdownLine) -> calculate::CostLine {
    let labels = line.labels();
    calculate::CostLine {
        display_name: labels.item,
        kind: line_kind(line.kind),
        amount: line.amount,
        amount_display: labels.amount,
        unit_cost: line.unit_cost,
        unit_cost_display: labels.unit_cost,
        total_cost: line.total_cost,
        item: line.item,
    }
}

pub fn profit(value: engine::Profit) -> calculate::Profit {
    calculate::Profit {
        profit: value.profit,
        margin_pct: value.margin_pct,
        markup_pct: value.markup_pct,
        is_loss: value.is_loss(),
    }
}

pub fn money(value: f64) -> MoneyCents {
    MoneyCents::from_major(value)
}

pub fn money_map(values: BTreeMap<String, f64>) -> BTreeMap<String, MoneyCents> {
    values
        .into_iter()
        .map(|(key, value)| (key, MoneyCents::from_major(value)))
        .collect()
}

pub fn major_map(values: BTreeMap<String, MoneyCents>) -> BTreeMap<String, f64> {
    values
        .into_iter()
        .map(|(key, value)| (key, value.to_major()))
        .collect()
}
