//! Storage of [`CounterReading`]s.

use sea_orm::{ActiveValue, prelude::*};

use crate::{
    EngineError, MoneyCents,
    sales::CounterReading,
    util::{from_json_column, parse_optional_uuid, parse_uuid, to_json_column},
};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "counter_readings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub config_id: Option<String>,
    pub owner: String,
    pub taken_at: DateTimeUtc,
    /// JSON object, product → cumulative counter.
    pub counter_data: String,
    pub cash_in_register_minor: i64,
    pub notes: Option<String>,
    /// JSON object, product → price in cents.
    pub product_prices: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::configurations::Entity",
        from = "Column::ConfigId",
        to = "super::configurations::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Configurations,
}

impl Related<super::configurations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Configurations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&CounterReading> for ActiveModel {
    type Error = EngineError;

    fn try_from(value: &CounterReading) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(value.id.to_string()),
            config_id: ActiveValue::Set(value.config_id.map(|id| id.to_string())),
            owner: ActiveValue::Set(value.owner.clone()),
            taken_at: ActiveValue::Set(value.taken_at),
            counter_data: ActiveValue::Set(to_json_column(&value.counter_data)?),
            cash_in_register_minor: ActiveValue::Set(value.cash_in_register.cents()),
            notes: ActiveValue::Set(value.notes.clone()),
            product_prices: ActiveValue::Set(to_json_column(&value.product_prices)?),
        })
    }
}

impl TryFrom<Model> for CounterReading {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "counter reading")?,
            config_id: parse_optional_uuid(model.config_id.as_deref(), "configuration")?,
            owner: model.owner,
            taken_at: model.taken_at,
            counter_data: from_json_column(&model.counter_data)?,
            cash_in_register: MoneyCents::new(model.cash_in_register_minor),
            notes: model.notes,
            product_prices: from_json_column(&model.product_prices)?,
        })
    }
}
