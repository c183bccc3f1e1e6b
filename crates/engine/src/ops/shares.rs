use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::OnConflict};
use uuid::Uuid;

use crate::{ConfigShare, EngineError, ResultEngine, config_shares};

use super::{Engine, with_tx};

impl Engine {
    /// Shares a configuration with another user, replacing any previous
    /// share for that user. Owner only.
    pub async fn share_configuration(
        &self,
        owner_id: &str,
        config_id: Uuid,
        username: &str,
        can_edit: bool,
    ) -> ResultEngine<()> {
        let username = username.trim();
        if username == owner_id {
            return Err(EngineError::InvalidName(
                "cannot share a configuration with its owner".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_config_owner(&db_tx, config_id, owner_id).await?;
            self.require_user_exists(&db_tx, username).await?;

            let share = config_shares::ActiveModel {
                config_id: ActiveValue::Set(config_id.to_string()),
                username: ActiveValue::Set(username.to_string()),
                can_edit: ActiveValue::Set(can_edit),
            };
            config_shares::Entity::insert(share)
                .on_conflict(
                    OnConflict::columns([
                        config_shares::Column::ConfigId,
                        config_shares::Column::Username,
                    ])
                    .update_column(config_shares::Column::CanEdit)
                    .to_owned(),
                )
                .exec(&db_tx)
                .await?;

            tracing::info!(config = %config_id, username, can_edit, "configuration shared");
            Ok(())
        })
    }

    /// Removes a share. Owner only.
    pub async fn unshare_configuration(
        &self,
        owner_id: &str,
        config_id: Uuid,
        username: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_config_owner(&db_tx, config_id, owner_id).await?;

            let result = config_shares::Entity::delete_by_id((
                config_id.to_string(),
                username.trim().to_string(),
            ))
            .exec(&db_tx)
            .await?;
            if result.rows_affected == 0 {
                Err(EngineError::KeyNotFound("share not exists".to_string()))
            } else {
                Ok(())
            }
        })
    }

    /// Users a configuration is shared with. Owner only.
    pub async fn list_shares(
        &self,
        owner_id: &str,
        config_id: Uuid,
    ) -> ResultEngine<Vec<ConfigShare>> {
        with_tx!(self, |db_tx| {
            self.require_config_owner(&db_tx, config_id, owner_id).await?;

            config_shares::Entity::find()
                .filter(config_shares::Column::ConfigId.eq(config_id.to_string()))
                .order_by_asc(config_shares::Column::Username)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(ConfigShare::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }
}
