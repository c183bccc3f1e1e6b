//! Storage of [`CashEvent`]s. Rows are never updated.

use sea_orm::{ActiveValue, prelude::*};

use crate::{
    EngineError, MoneyCents,
    ledger::{CashEvent, CashEventKind},
    util::{parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cash_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub config_id: Option<String>,
    pub owner: String,
    pub kind: String,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub occurred_at: DateTimeUtc,
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

impl From<&CashEvent> for ActiveModel {
    fn from(value: &CashEvent) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            config_id: ActiveValue::Set(value.config_id.map(|id| id.to_string())),
            owner: ActiveValue::Set(value.owner.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(value.amount.cents()),
            description: ActiveValue::Set(value.description.clone()),
            occurred_at: ActiveValue::Set(value.occurred_at),
        }
    }
}

impl TryFrom<Model> for CashEvent {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let amount = MoneyCents::new(model.amount_minor);
        if !amount.is_positive() {
            return Err(EngineError::Corrupted(format!(
                "cash event {} has a non-positive amount",
                model.id
            )));
        }
        Ok(Self {
            id: parse_uuid(&model.id, "cash event")?,
            config_id: parse_optional_uuid(model.config_id.as_deref(), "configuration")?,
            owner: model.owner,
            kind: CashEventKind::try_from(model.kind.as_str())?,
            amount,
            description: model.description,
            occurred_at: model.occurred_at,
        })
    }
}
