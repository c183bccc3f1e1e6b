use sea_orm::{DatabaseTransaction, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, config_shares, configurations, users};

use super::Engine;

/// What a user may do with a configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigAccess {
    Owner,
    Editor,
    Viewer,
}

impl ConfigAccess {
    pub fn can_write(self) -> bool {
        matches!(self, Self::Owner | Self::Editor)
    }

    pub fn is_owner(self) -> bool {
        self == Self::Owner
    }
}

/// Which readings and cash events an operation works on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Scope {
    /// Everything recorded against a configuration, by any user.
    Config(Uuid),
    /// The caller's own rows without a configuration.
    Personal,
}

impl Scope {
    pub(super) fn config_id(self) -> Option<Uuid> {
        match self {
            Self::Config(id) => Some(id),
            Self::Personal => None,
        }
    }
}

fn not_found() -> EngineError {
    EngineError::KeyNotFound("configuration not exists".to_string())
}

impl Engine {
    pub(super) async fn config_access(
        &self,
        db: &DatabaseTransaction,
        model: &configurations::Model,
        user_id: &str,
    ) -> ResultEngine<Option<ConfigAccess>> {
        if model.owner == user_id {
            return Ok(Some(ConfigAccess::Owner));
        }
        let share = config_shares::Entity::find_by_id((model.id.clone(), user_id.to_string()))
            .one(db)
            .await?;
        Ok(share.map(|share| {
            if share.can_edit {
                ConfigAccess::Editor
            } else {
                ConfigAccess::Viewer
            }
        }))
    }

    /// The configuration when the user can at least read it. Invisible and
    /// missing configurations look the same.
    pub(super) async fn require_config_read(
        &self,
        db: &DatabaseTransaction,
        config_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<(configurations::Model, ConfigAccess)> {
        let model = configurations::Entity::find_by_id(config_id.to_string())
            .one(db)
            .await?
            .ok_or_else(not_found)?;
        let access = self
            .config_access(db, &model, user_id)
            .await?
            .ok_or_else(not_found)?;
        Ok((model, access))
    }

    pub(super) async fn require_config_write(
        &self,
        db: &DatabaseTransaction,
        config_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<configurations::Model> {
        let (model, access) = self.require_config_read(db, config_id, user_id).await?;
        if !access.can_write() {
            return Err(EngineError::Forbidden(
                "configuration is shared read-only".to_string(),
            ));
        }
        Ok(model)
    }

    pub(super) async fn require_config_owner(
        &self,
        db: &DatabaseTransaction,
        config_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<configurations::Model> {
        let (model, access) = self.require_config_read(db, config_id, user_id).await?;
        if !access.is_owner() {
            return Err(EngineError::Forbidden(
                "only the owner can do this".to_string(),
            ));
        }
        Ok(model)
    }

    /// Resolves the scope of a reading or cash event operation, checking
    /// access to the configuration when there is one.
    pub(super) async fn resolve_scope(
        &self,
        db: &DatabaseTransaction,
        config_id: Option<Uuid>,
        user_id: &str,
        write: bool,
    ) -> ResultEngine<Scope> {
        let Some(config_id) = config_id else {
            return Ok(Scope::Personal);
        };
        if write {
            self.require_config_write(db, config_id, user_id).await?;
        } else {
            self.require_config_read(db, config_id, user_id).await?;
        }
        Ok(Scope::Config(config_id))
    }

    pub(super) async fn require_user_exists(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<()> {
        let exists = users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .is_some();
        if !exists {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(())
    }
}
