use std::collections::BTreeMap;

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, TeaBag, tea_bags, util::normalize_required_name};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a tea bag, or updates the one with `id`. Names are unique per
    /// user.
    pub async fn upsert_tea_bag(
        &self,
        user_id: &str,
        id: Option<Uuid>,
        name: &str,
        cost_per_unit: f64,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "tea bag")?;
        if !cost_per_unit.is_finite() || cost_per_unit < 0.0 {
            return Err(EngineError::InvalidAmount(
                "tea bag cost must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let clash = tea_bags::Entity::find()
                .filter(tea_bags::Column::Owner.eq(user_id))
                .filter(tea_bags::Column::Name.eq(name.clone()))
                .one(&db_tx)
                .await?;
            if let Some(clash) = clash
                && id.is_none_or(|id| clash.id != id.to_string())
            {
                return Err(EngineError::ExistingKey(name));
            }

            match id {
                Some(id) => {
                    let model = tea_bags::Entity::find_by_id(id.to_string())
                        .filter(tea_bags::Column::Owner.eq(user_id))
                        .one(&db_tx)
                        .await?
                        .ok_or_else(|| EngineError::KeyNotFound("tea bag not exists".to_string()))?;
                    let mut tea_bag = TeaBag::try_from(model)?;
                    tea_bag.name = name;
                    tea_bag.cost_per_unit = cost_per_unit;
                    tea_bags::ActiveModel::from(&tea_bag).update(&db_tx).await?;
                    Ok(tea_bag.id)
                }
                None => {
                    let tea_bag = TeaBag::new(user_id, name, cost_per_unit);
                    tea_bags::ActiveModel::from(&tea_bag).insert(&db_tx).await?;
                    Ok(tea_bag.id)
                }
            }
        })
    }

    /// The user's tea bags sorted by name.
    pub async fn list_tea_bags(&self, user_id: &str) -> ResultEngine<Vec<TeaBag>> {
        let models = tea_bags::Entity::find()
            .filter(tea_bags::Column::Owner.eq(user_id))
            .order_by_asc(tea_bags::Column::Name)
            .all(&self.database)
            .await?;
        models.into_iter().map(TeaBag::try_from).collect()
    }

    pub async fn delete_tea_bag(&self, user_id: &str, id: Uuid) -> ResultEngine<()> {
        let result = tea_bags::Entity::delete_many()
            .filter(tea_bags::Column::Id.eq(id.to_string()))
            .filter(tea_bags::Column::Owner.eq(user_id))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("tea bag not exists".to_string()));
        }
        Ok(())
    }

    /// Name → cost per bag, the tea-bag half of a price list.
    pub async fn tea_bag_prices(&self, user_id: &str) -> ResultEngine<BTreeMap<String, f64>> {
        Ok(self
            .list_tea_bags(user_id)
            .await?
            .into_iter()
            .map(|tea_bag| (tea_bag.name, tea_bag.cost_per_unit))
            .collect())
    }
}

