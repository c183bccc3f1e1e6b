use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, users, util::normalize_required_name};

use super::{Engine, with_tx};

impl Engine {
    /// Adds a login and returns the stored (trimmed) username.
    pub async fn create_user(&self, username: &str, password: &str) -> ResultEngine<String> {
        let username = normalize_required_name(username, "user")?;
        if password.is_empty() {
            return Err(EngineError::InvalidName(
                "password must not be empty".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.clone())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(username));
            }
            users::ActiveModel {
                username: Set(username.clone()),
                password: Set(password.to_string()),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!(user = %username, "user created");
            Ok(username)
        })
    }

    pub async fn user_exists(&self, username: &str) -> ResultEngine<bool> {
        Ok(users::Entity::find_by_id(username.trim().to_string())
            .one(&self.database)
            .await?
            .is_some())
    }

    /// Usernames in alphabetical order.
    pub async fn list_users(&self) -> ResultEngine<Vec<String>> {
        Ok(users::Entity::find()
            .order_by_asc(users::Column::Username)
            .all(&self.database)
            .await?
            .into_iter()
            .map(|user| user.username)
            .collect())
    }
}
