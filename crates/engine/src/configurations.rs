//! Named, persisted costing configurations.
//!
//! A configuration bundles everything needed to cost a set of drinks: fixed
//! costs, ingredient prices and recipes. Tea-bag prices are not part of it,
//! they belong to the user and are looked up at calculation time.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents,
    costing::compute_costs,
    recipes::{DrinkRecipe, FixedCosts, PriceList, valid_recipes},
    util::{from_json_column, parse_uuid, to_json_column},
};

#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    pub id: Uuid,
    pub owner: String,
    pub name: String,
    pub fixed_costs: FixedCosts,
    /// Ingredient identifier → price per kg or L.
    pub ingredient_prices: BTreeMap<String, f64>,
    pub drinks: Vec<DrinkRecipe>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Configuration {
    pub fn new(owner: &str, name: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            name,
            fixed_costs: FixedCosts::default(),
            ingredient_prices: BTreeMap::new(),
            drinks: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn price_list(&self, tea_bags: BTreeMap<String, f64>) -> PriceList {
        PriceList {
            ingredients: self.ingredient_prices.clone(),
            tea_bags,
        }
    }

    /// Production cost per drink, rounded to cents.
    #[must_use]
    pub fn production_costs(&self, tea_bags: BTreeMap<String, f64>) -> BTreeMap<String, MoneyCents> {
        compute_costs(
            &self.fixed_costs,
            &self.price_list(tea_bags),
            &valid_recipes(&self.drinks),
        )
        .into_iter()
        .map(|result| (result.name, MoneyCents::from_major(result.total_cost)))
        .collect()
    }

    /// Configured vending prices per drink.
    #[must_use]
    pub fn vending_prices(&self) -> BTreeMap<String, MoneyCents> {
        self.drinks
            .iter()
            .filter_map(|drink| {
                drink
                    .configured_vending_price()
                    .map(|price| (drink.name.clone(), MoneyCents::from_major(price)))
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "configurations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner: String,
    pub name: String,
    pub cleaning_cost: f64,
    pub products_per_day: i64,
    /// JSON object, ingredient id → price.
    pub ingredient_prices: String,
    /// JSON array of recipes.
    pub drinks: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::config_shares::Entity")]
    Shares,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::Owner",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Owner,
}

impl Related<super::config_shares::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shares.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Configuration> for ActiveModel {
    type Error = EngineError;

    fn try_from(value: &Configuration) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(value.id.to_string()),
            owner: ActiveValue::Set(value.owner.clone()),
            name: ActiveValue::Set(value.name.clone()),
            cleaning_cost: ActiveValue::Set(value.fixed_costs.cleaning_cost),
            products_per_day: ActiveValue::Set(value.fixed_costs.products_per_day),
            ingredient_prices: ActiveValue::Set(to_json_column(&value.ingredient_prices)?),
            drinks: ActiveValue::Set(to_json_column(&value.drinks)?),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        })
    }
}

impl TryFrom<Model> for Configuration {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "configuration")?,
            owner: model.owner,
            name: model.name,
            fixed_costs: FixedCosts::new(model.cleaning_cost, model.products_per_day),
            ingredient_prices: from_json_column(&model.ingredient_prices)?,
            drinks: from_json_column(&model.drinks)?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
