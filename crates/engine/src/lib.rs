//! Costing and sales reconciliation for vending-machine drinks.
//!
//! The pure core computes production costs ([`costing`]), profit
//! ([`profit`]), sales from counter readings ([`sales`]) and the cash register
//! balance ([`ledger`]). [`Engine`] stores configurations, tea bags, readings
//! and cash events with sea-orm and runs the core over them.

pub use config_shares::ConfigShare;
pub use configurations::Configuration;
pub use costing::{CostBreakdownLine, DrinkCostResult, LineKind, LineLabels, compute_costs};
pub use error::EngineError;
pub use ledger::{BalanceStatus, CashBalance, CashEvent, CashEventKind};
pub use money::MoneyCents;
pub use ops::{
    ConfigAccess, ConfigSummary, Engine, EngineBuilder, NewCounterReading, RecordedReading,
    SaveConfiguration, SavedConfiguration,
};
pub use profit::{Profit, compute_profit};
pub use recipes::{CustomItem, DrinkRecipe, FixedCosts, PriceList, valid_recipes};
pub use sales::{
    CounterReading, PriceSource, ProductStatistics, SalesLine, SalesRecord, Statistics,
};
pub use tea_bags::TeaBag;
pub use units::{Ingredient, UnitClass};

pub mod costing;
pub mod ledger;
pub mod profit;
pub mod recipes;
pub mod report;
pub mod sales;
pub mod units;

mod cash_events;
mod config_shares;
mod configurations;
mod counter_readings;
mod error;
mod money;
mod ops;
mod tea_bags;
pub mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
