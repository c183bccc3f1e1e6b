use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Configuration, EngineError, ResultEngine, cash_events, config_shares, configurations,
    counter_readings,
    recipes::{DrinkRecipe, FixedCosts},
    util::{normalize_required_name, parse_uuid},
};

use super::{ConfigAccess, Engine, with_tx};

/// A configuration as submitted for saving.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SaveConfiguration {
    /// The configuration being edited, if any. It is only updated when its
    /// stored name equals `name`; otherwise a new configuration is created.
    pub id: Option<Uuid>,
    pub name: String,
    pub fixed_costs: FixedCosts,
    pub ingredient_prices: BTreeMap<String, f64>,
    pub drinks: Vec<DrinkRecipe>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SavedConfiguration {
    pub id: Uuid,
    pub created: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConfigSummary {
    pub id: Uuid,
    pub name: String,
    pub owner: String,
    pub access: ConfigAccess,
    pub drinks_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn clean_drinks(drinks: Vec<DrinkRecipe>) -> Vec<DrinkRecipe> {
    drinks
        .into_iter()
        .filter_map(|mut drink| {
            drink.name = normalize_required_name(&drink.name, "drink").ok()?;
            Some(drink)
        })
        .collect()
}

impl Engine {
    /// Creates or updates a configuration.
    pub async fn save_configuration(
        &self,
        user_id: &str,
        save: SaveConfiguration,
    ) -> ResultEngine<SavedConfiguration> {
        let name = normalize_required_name(&save.name, "configuration")?;
        let drinks = clean_drinks(save.drinks);
        let now = Utc::now();

        with_tx!(self, |db_tx| {
            let existing = match save.id {
                Some(id) => configurations::Entity::find_by_id(id.to_string())
                    .one(&db_tx)
                    .await?
                    .filter(|model| model.name == name),
                None => None,
            };

            match existing {
                Some(model) => {
                    let id = parse_uuid(&model.id, "configuration")?;
                    self.require_config_write(&db_tx, id, user_id).await?;

                    let mut config = Configuration::try_from(model)?;
                    config.fixed_costs = save.fixed_costs;
                    config.ingredient_prices = save.ingredient_prices;
                    config.drinks = drinks;
                    config.updated_at = now;
                    configurations::ActiveModel::try_from(&config)?
                        .update(&db_tx)
                        .await?;
                    tracing::info!(config = %id, user = user_id, "configuration updated");
                    Ok(SavedConfiguration { id, created: false })
                }
                None => {
                    let mut config = Configuration::new(user_id, name, now);
                    config.fixed_costs = save.fixed_costs;
                    config.ingredient_prices = save.ingredient_prices;
                    config.drinks = drinks;
                    self.insert_configuration(&db_tx, config).await
                }
            }
        })
    }

    async fn insert_configuration(
        &self,
        db_tx: &DatabaseTransaction,
        config: Configuration,
    ) -> ResultEngine<SavedConfiguration> {
        let duplicate = configurations::Entity::find()
            .filter(configurations::Column::Owner.eq(config.owner.clone()))
            .filter(configurations::Column::Name.eq(config.name.clone()))
            .one(db_tx)
            .await?;
        if duplicate.is_some() {
            return Err(EngineError::ExistingKey(config.name));
        }

        configurations::ActiveModel::try_from(&config)?
            .insert(db_tx)
            .await?;
        tracing::info!(config = %config.id, user = %config.owner, "configuration created");
        Ok(SavedConfiguration {
            id: config.id,
            created: true,
        })
    }

    /// A configuration visible to the user, with the user's access level.
    pub async fn configuration(
        &self,
        user_id: &str,
        config_id: Uuid,
    ) -> ResultEngine<(Configuration, ConfigAccess)> {
        with_tx!(self, |db_tx| {
            let (model, access) = self.require_config_read(&db_tx, config_id, user_id).await?;
            Ok((Configuration::try_from(model)?, access))
        })
    }

    /// Owned and shared configurations, most recently updated first.
    pub async fn list_configurations(&self, user_id: &str) -> ResultEngine<Vec<ConfigSummary>> {
        with_tx!(self, |db_tx| {
            let shares: HashMap<String, bool> = config_shares::Entity::find()
                .filter(config_shares::Column::Username.eq(user_id))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|share| (share.config_id, share.can_edit))
                .collect();

            let models = configurations::Entity::find()
                .filter(
                    configurations::Column::Owner
                        .eq(user_id)
                        .or(configurations::Column::Id.is_in(shares.keys().cloned())),
                )
                .order_by_desc(configurations::Column::UpdatedAt)
                .all(&db_tx)
                .await?;

            models
                .into_iter()
                .map(|model| {
                    let access = if model.owner == user_id {
                        ConfigAccess::Owner
                    } else if shares.get(&model.id).copied().unwrap_or(false) {
                        ConfigAccess::Editor
                    } else {
                        ConfigAccess::Viewer
                    };
                    let config = Configuration::try_from(model)?;
                    Ok(ConfigSummary {
                        id: config.id,
                        name: config.name,
                        owner: config.owner,
                        access,
                        drinks_count: config.drinks.len(),
                        created_at: config.created_at,
                        updated_at: config.updated_at,
                    })
                })
                .collect()
        })
    }

    /// Deletes a configuration and its shares. Readings and cash events
    /// recorded against it are kept, detached from any configuration.
    pub async fn delete_configuration(&self, user_id: &str, config_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_config_owner(&db_tx, config_id, user_id).await?;

            config_shares::Entity::delete_many()
                .filter(config_shares::Column::ConfigId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;
            counter_readings::Entity::update_many()
                .col_expr(
                    counter_readings::Column::ConfigId,
                    Expr::value(Option::<String>::None),
                )
                .filter(counter_readings::Column::ConfigId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;
            cash_events::Entity::update_many()
                .col_expr(
                    cash_events::Column::ConfigId,
                    Expr::value(Option::<String>::None),
                )
                .filter(cash_events::Column::ConfigId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;
            configurations::Entity::delete_by_id(model.id)
                .exec(&db_tx)
                .await?;

            tracing::info!(config = %config_id, user = user_id, "configuration deleted");
            Ok(())
        })
    }
}
