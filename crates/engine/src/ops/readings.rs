use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use sea_orm::{Condition, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Configuration, CounterReading, EngineError, MoneyCents, ResultEngine, configurations,
    counter_readings,
    sales::{self, SalesRecord, Statistics},
    tea_bags,
    util::{normalize_keys, normalize_optional_text},
};

use super::{Engine, access::Scope, with_tx};

/// A counter reading as submitted by a user.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewCounterReading {
    pub config_id: Option<Uuid>,
    pub counter_data: BTreeMap<String, i64>,
    pub cash_in_register: MoneyCents,
    pub notes: Option<String>,
    /// Vending prices at the time of the reading. Missing or zero prices are
    /// filled from the configuration.
    pub product_prices: BTreeMap<String, MoneyCents>,
}

/// A stored reading and the sales it closes. The first reading of a scope
/// has no sales.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedReading {
    pub reading: CounterReading,
    pub sales: Option<SalesRecord>,
}

fn scope_condition(scope: Scope, user_id: &str) -> Condition {
    match scope {
        Scope::Config(id) => {
            Condition::all().add(counter_readings::Column::ConfigId.eq(id.to_string()))
        }
        Scope::Personal => Condition::all()
            .add(counter_readings::Column::Owner.eq(user_id))
            .add(counter_readings::Column::ConfigId.is_null()),
    }
}

impl Engine {
    /// Readings of a scope, oldest first.
    pub(super) async fn scope_readings(
        &self,
        db: &DatabaseTransaction,
        scope: Scope,
        user_id: &str,
    ) -> ResultEngine<Vec<CounterReading>> {
        counter_readings::Entity::find()
            .filter(scope_condition(scope, user_id))
            .order_by_asc(counter_readings::Column::TakenAt)
            .all(db)
            .await?
            .into_iter()
            .map(CounterReading::try_from)
            .collect()
    }

    async fn scope_configuration(
        &self,
        db: &DatabaseTransaction,
        scope: Scope,
    ) -> ResultEngine<Option<(Configuration, BTreeMap<String, f64>)>> {
        let Some(config_id) = scope.config_id() else {
            return Ok(None);
        };
        let Some(model) = configurations::Entity::find_by_id(config_id.to_string())
            .one(db)
            .await?
        else {
            return Ok(None);
        };
        let config = Configuration::try_from(model)?;
        let tea_bags = tea_bags::Entity::find()
            .filter(tea_bags::Column::Owner.eq(config.owner.clone()))
            .all(db)
            .await?
            .into_iter()
            .map(|tea_bag| (tea_bag.name, tea_bag.cost_per_unit))
            .collect();
        Ok(Some((config, tea_bags)))
    }

    /// Production cost per product of the scope's configuration, used as
    /// price of last resort.
    async fn fallback_prices(
        &self,
        db: &DatabaseTransaction,
        scope: Scope,
    ) -> ResultEngine<BTreeMap<String, MoneyCents>> {
        Ok(self
            .scope_configuration(db, scope)
            .await?
            .map(|(config, tea_bags)| config.production_costs(tea_bags))
            .unwrap_or_default())
    }

    /// Stores a reading and returns the sales since the previous one.
    pub async fn record_counter_reading(
        &self,
        user_id: &str,
        new: NewCounterReading,
    ) -> ResultEngine<RecordedReading> {
        let counter_data = normalize_keys(new.counter_data);
        if counter_data.is_empty() {
            return Err(EngineError::InvalidAmount(
                "a reading needs at least one counter".to_string(),
            ));
        }
        if let Some((product, _)) = counter_data.iter().find(|(_, value)| **value < 0) {
            return Err(EngineError::InvalidAmount(format!(
                "counter for {product} must be >= 0"
            )));
        }
        if new.cash_in_register.is_negative() {
            return Err(EngineError::InvalidAmount(
                "cash in register must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let scope = self
                .resolve_scope(&db_tx, new.config_id, user_id, true)
                .await?;
            let mut readings = self.scope_readings(&db_tx, scope, user_id).await?;

            let mut product_prices: BTreeMap<String, MoneyCents> =
                normalize_keys(new.product_prices)
                    .into_iter()
                    .filter(|(_, price)| price.is_positive())
                    .collect();
            let mut fallback = BTreeMap::new();
            if let Some((config, tea_bags)) = self.scope_configuration(&db_tx, scope).await? {
                let vending = config.vending_prices();
                fallback = config.production_costs(tea_bags);
                for product in counter_data.keys() {
                    if product_prices.contains_key(product) {
                        continue;
                    }
                    if let Some(price) = vending.get(product) {
                        product_prices.insert(product.clone(), *price);
                    } else if !fallback.contains_key(product) {
                        tracing::warn!(product, "no price known for product");
                    }
                }
            }

            // Readings of a scope are strictly ordered by time.
            let mut taken_at = Utc::now();
            if let Some(latest) = readings.last()
                && latest.taken_at >= taken_at
            {
                taken_at = latest.taken_at + Duration::milliseconds(1);
            }

            let reading = CounterReading {
                id: Uuid::new_v4(),
                config_id: scope.config_id(),
                owner: user_id.to_string(),
                taken_at,
                counter_data,
                cash_in_register: new.cash_in_register,
                notes: normalize_optional_text(new.notes.as_deref()),
                product_prices,
            };
            counter_readings::ActiveModel::try_from(&reading)?
                .insert(&db_tx)
                .await?;
            readings.push(reading.clone());

            let sales = sales::reconcile(&readings, &fallback)
                .into_iter()
                .find(|record| record.reading_id == reading.id);
            tracing::info!(
                reading = %reading.id,
                user = user_id,
                revenue = %sales.as_ref().map_or(MoneyCents::ZERO, SalesRecord::total_revenue),
                "counter reading recorded"
            );
            Ok(RecordedReading { reading, sales })
        })
    }

    /// Readings of a scope, most recent first.
    pub async fn list_counter_readings(
        &self,
        user_id: &str,
        config_id: Option<Uuid>,
    ) -> ResultEngine<Vec<CounterReading>> {
        with_tx!(self, |db_tx| {
            let scope = self
                .resolve_scope(&db_tx, config_id, user_id, false)
                .await?;
            let mut readings = self.scope_readings(&db_tx, scope, user_id).await?;
            readings.reverse();
            Ok(readings)
        })
    }

    /// Deletes a reading. Sales around it are recomputed on the next read.
    pub async fn delete_counter_reading(&self, user_id: &str, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = counter_readings::Entity::find_by_id(id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("counter reading not exists".to_string()))?;
            let reading = CounterReading::try_from(model)?;
            match reading.config_id {
                Some(config_id) => {
                    self.require_config_write(&db_tx, config_id, user_id).await?;
                }
                None if reading.owner != user_id => {
                    return Err(EngineError::KeyNotFound(
                        "counter reading not exists".to_string(),
                    ));
                }
                None => {}
            }
            counter_readings::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            tracing::info!(reading = %id, user = user_id, "counter reading deleted");
            Ok(())
        })
    }

    /// Sales of the last `days` days.
    pub async fn sales_statistics(
        &self,
        user_id: &str,
        config_id: Option<Uuid>,
        days: i64,
    ) -> ResultEngine<Statistics> {
        with_tx!(self, |db_tx| {
            let scope = self
                .resolve_scope(&db_tx, config_id, user_id, false)
                .await?;
            let readings = self.scope_readings(&db_tx, scope, user_id).await?;
            let fallback = self.fallback_prices(&db_tx, scope).await?;
            Ok(sales::statistics(&readings, &fallback, days, Utc::now()))
        })
    }
}
