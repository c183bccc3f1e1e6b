//! JSON shapes exchanged with the HTTP API.
//!
//! Amounts are euros as JSON numbers. Numeric request fields go through
//! [`lenient`] so a form that sends `""`, `"1.5"` or `null` still parses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod lenient;

/// Query string selecting the configuration a reading or cash operation
/// works on. Without it the caller's personal history is used.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ScopeQuery {
    pub config_id: Option<Uuid>,
}

/// `{"error": "..."}` body of every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod recipe {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct FixedCosts {
        #[serde(default, deserialize_with = "lenient::number")]
        pub cleaning_cost: f64,
        #[serde(default, deserialize_with = "lenient::integer")]
        pub products_per_day: i64,
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct CustomItem {
        #[serde(default)]
        pub name: String,
        #[serde(default, deserialize_with = "lenient::number")]
        pub cost: f64,
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct Drink {
        #[serde(default)]
        pub name: String,
        /// Ingredient identifier → quantity in kg or L.
        #[serde(default, deserialize_with = "lenient::number_map")]
        pub ingredients: BTreeMap<String, f64>,
        /// Tea bag name → number of bags.
        #[serde(default, deserialize_with = "lenient::integer_map")]
        pub tea_bags: BTreeMap<String, i64>,
        #[serde(default)]
        pub custom_items: Vec<CustomItem>,
        #[serde(default, deserialize_with = "lenient::optional_number")]
        pub vending_price: Option<f64>,
    }
}

pub mod calculate {
    use super::*;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct CalculateRequest {
        /// `cleaning_cost` and `products_per_day` sit at the top level.
        #[serde(flatten)]
        pub fixed_costs: recipe::FixedCosts,
        /// Ingredient identifier → price per kg or L.
        #[serde(default, deserialize_with = "lenient::number_map")]
        pub ingredients: BTreeMap<String, f64>,
        /// Tea bag name → price per bag. When omitted the caller's stored tea
        /// bags are used.
        #[serde(default, deserialize_with = "lenient::optional_number_map")]
        pub tea_bags: Option<BTreeMap<String, f64>>,
        #[serde(default)]
        pub drinks: Vec<recipe::Drink>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CostLineKind {
        BulkIngredient,
        PerUnit,
        Custom,
        Cleaning,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CostLine {
        pub item: String,
        /// Human readable item, e.g. `Coffee Beans`.
        pub display_name: String,
        pub kind: CostLineKind,
        pub amount: f64,
        /// e.g. `7.0 g`.
        pub amount_display: String,
        pub unit_cost: f64,
        /// e.g. `€20.00/kg`.
        pub unit_cost_display: String,
        pub total_cost: f64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Profit {
        pub profit: f64,
        pub margin_pct: f64,
        /// `null` when the drink costs nothing.
        pub markup_pct: Option<f64>,
        pub is_loss: bool,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct DrinkCost {
        pub name: String,
        pub breakdown: Vec<CostLine>,
        pub cleaning_cost_per_product: f64,
        pub total_cleaning_cost: f64,
        pub total_cost: f64,
        pub vending_price: Option<f64>,
        pub profit: Option<Profit>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CalculateResponse {
        pub results: Vec<DrinkCost>,
    }
}

pub mod config {
    use super::*;

    /// Access level of the caller on a configuration.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Access {
        Owner,
        Editor,
        Viewer,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct ConfigSave {
        /// Set when saving the configuration currently loaded.
        pub id: Option<Uuid>,
        pub name: String,
        #[serde(flatten)]
        pub fixed_costs: recipe::FixedCosts,
        #[serde(default, deserialize_with = "lenient::number_map")]
        pub ingredients: BTreeMap<String, f64>,
        #[serde(default)]
        pub drinks: Vec<recipe::Drink>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ConfigSaved {
        pub id: Uuid,
        pub created: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ConfigSummary {
        pub id: Uuid,
        pub name: String,
        pub owner: String,
        pub access: Access,
        pub drinks_count: usize,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ConfigList {
        pub configs: Vec<ConfigSummary>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ConfigView {
        pub id: Uuid,
        pub name: String,
        pub owner: String,
        pub access: Access,
        #[serde(flatten)]
        pub fixed_costs: recipe::FixedCosts,
        pub ingredients: BTreeMap<String, f64>,
        pub drinks: Vec<recipe::Drink>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareRequest {
        pub username: String,
        #[serde(default)]
        pub can_edit: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareView {
        pub username: String,
        pub can_edit: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SharedUsers {
        pub shared_users: Vec<ShareView>,
    }
}

pub mod tea_bag {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TeaBagSave {
        pub id: Option<Uuid>,
        pub name: String,
        #[serde(default, deserialize_with = "lenient::number")]
        pub cost_per_unit: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TeaBagSaved {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TeaBagView {
        pub id: Uuid,
        pub name: String,
        pub cost_per_unit: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TeaBagList {
        pub tea_bags: Vec<TeaBagView>,
    }
}

pub mod reading {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CounterReadingNew {
        pub config_id: Option<Uuid>,
        /// Product name → cumulative counter.
        #[serde(default, deserialize_with = "lenient::integer_map")]
        pub counter_data: BTreeMap<String, i64>,
        #[serde(default, deserialize_with = "lenient::number")]
        pub cash_in_register: f64,
        pub notes: Option<String>,
        /// Product name → vending price.
        #[serde(default, deserialize_with = "lenient::number_map")]
        pub product_prices: BTreeMap<String, f64>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PriceSource {
        Recorded,
        ProductionCost,
        Missing,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SalesLine {
        pub product: String,
        pub units_sold: i64,
        pub unit_price: f64,
        pub price_source: PriceSource,
        pub revenue: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CounterReadingCreated {
        pub id: Uuid,
        /// Empty for the first reading.
        pub sales_calculated: Vec<SalesLine>,
        /// Products whose counter went down.
        pub counter_resets: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CounterReadingView {
        pub id: Uuid,
        pub config_id: Option<Uuid>,
        pub owner: String,
        pub taken_at: DateTime<Utc>,
        pub counter_data: BTreeMap<String, i64>,
        pub cash_in_register: f64,
        pub notes: Option<String>,
        pub product_prices: BTreeMap<String, f64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CounterReadingList {
        pub readings: Vec<CounterReadingView>,
    }
}

pub mod cash {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CashEventType {
        Deposit,
        Withdrawal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashEventNew {
        pub event_type: CashEventType,
        #[serde(default, deserialize_with = "lenient::number")]
        pub amount: f64,
        pub description: Option<String>,
        pub config_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashEventCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashEventView {
        pub id: Uuid,
        pub config_id: Option<Uuid>,
        pub owner: String,
        pub event_type: CashEventType,
        pub amount: f64,
        pub description: Option<String>,
        pub occurred_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashEventList {
        pub events: Vec<CashEventView>,
    }

    /// `nominal` within 5€, `warning` within 10€, `error` beyond.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BalanceStatus {
        Nominal,
        Warning,
        Error,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashBalance {
        pub expected_cash: f64,
        pub actual_cash: f64,
        /// Actual minus expected.
        pub difference: f64,
        pub status: BalanceStatus,
    }
}

pub mod statistics {
    use super::*;

    pub const DEFAULT_DAYS: i64 = 30;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct StatisticsQuery {
        pub days: Option<i64>,
        pub config_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductStatistics {
        pub name: String,
        pub quantity: i64,
        pub revenue: f64,
        pub avg_price: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Statistics {
        pub products: Vec<ProductStatistics>,
        pub total_revenue: f64,
        pub total_items_sold: i64,
        pub readings_count: usize,
        pub period_days: i64,
    }
}
