//! Access granted on a configuration to another user.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigShare {
    pub config_id: Uuid,
    pub username: String,
    /// Editors may change the configuration and record readings and cash
    /// events against it; everybody else only reads.
    pub can_edit: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "config_shares")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub config_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub can_edit: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::configurations::Entity",
        from = "Column::ConfigId",
        to = "super::configurations::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Configurations,
}

impl Related<super::configurations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Configurations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for ConfigShare {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            config_id: parse_uuid(&model.config_id, "configuration")?,
            username: model.username,
            can_edit: model.can_edit,
        })
    }
}
