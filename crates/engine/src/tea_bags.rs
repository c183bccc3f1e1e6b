//! Tea bags are priced per piece and owned by a user. Recipes refer to them by
//! name.

use sea_orm::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeaBag {
    pub id: Uuid,
    pub owner: String,
    pub name: String,
    pub cost_per_unit: f64,
}

impl TeaBag {
    pub fn new(owner: &str, name: String, cost_per_unit: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            name,
            cost_per_unit,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tea_bags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner: String,
    pub name: String,
    pub cost_per_unit: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::Owner",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Owner,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TeaBag> for ActiveModel {
    fn from(value: &TeaBag) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            owner: ActiveValue::Set(value.owner.clone()),
            name: ActiveValue::Set(value.name.clone()),
            cost_per_unit: ActiveValue::Set(value.cost_per_unit),
        }
    }
}

impl TryFrom<Model> for TeaBag {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "tea bag")?,
            owner: model.owner,
            name: model.name,
            cost_per_unit: model.cost_per_unit,
        })
    }
}
