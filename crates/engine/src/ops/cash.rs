use chrono::Utc;
use sea_orm::{Condition, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    CashEvent, MoneyCents, ResultEngine, cash_events,
    ledger::{self, CashBalance, CashEventKind},
    util::normalize_optional_text,
};

use super::{Engine, access::Scope, with_tx};

fn scope_condition(scope: Scope, user_id: &str) -> Condition {
    match scope {
        Scope::Config(id) => Condition::all().add(cash_events::Column::ConfigId.eq(id.to_string())),
        Scope::Personal => Condition::all()
            .add(cash_events::Column::Owner.eq(user_id))
            .add(cash_events::Column::ConfigId.is_null()),
    }
}

impl Engine {
    /// Appends a deposit or withdrawal. The amount must be positive.
    pub async fn record_cash_event(
        &self,
        user_id: &str,
        config_id: Option<Uuid>,
        kind: CashEventKind,
        amount: MoneyCents,
        description: Option<&str>,
    ) -> ResultEngine<Uuid> {
        let mut event = CashEvent::new(
            user_id,
            kind,
            amount,
            normalize_optional_text(description),
            Utc::now(),
        )?;

        with_tx!(self, |db_tx| {
            let scope = self
                .resolve_scope(&db_tx, config_id, user_id, true)
                .await?;
            event.config_id = scope.config_id();
            cash_events::ActiveModel::from(&event).insert(&db_tx).await?;
            tracing::info!(
                event = %event.id,
                kind = kind.as_str(),
                amount = %event.amount,
                user = user_id,
                "cash event recorded"
            );
            Ok(event.id)
        })
    }

    /// Cash events of a scope, most recent first.
    pub async fn list_cash_events(
        &self,
        user_id: &str,
        config_id: Option<Uuid>,
    ) -> ResultEngine<Vec<CashEvent>> {
        with_tx!(self, |db_tx| {
            let scope = self
                .resolve_scope(&db_tx, config_id, user_id, false)
                .await?;
            cash_events::Entity::find()
                .filter(scope_condition(scope, user_id))
                .order_by_desc(cash_events::Column::OccurredAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(CashEvent::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Expected against counted cash for a scope.
    pub async fn cash_balance(
        &self,
        user_id: &str,
        config_id: Option<Uuid>,
    ) -> ResultEngine<CashBalance> {
        with_tx!(self, |db_tx| {
            let scope = self
                .resolve_scope(&db_tx, config_id, user_id, false)
                .await?;
            let readings = self.scope_readings(&db_tx, scope, user_id).await?;
            let events = cash_events::Entity::find()
                .filter(scope_condition(scope, user_id))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(CashEvent::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            let balance = ledger::balance(&readings, &events);
            tracing::debug!(
                expected = %balance.expected,
                actual = %balance.actual,
                status = ?balance.status,
                "cash balance"
            );
            Ok(balance)
        })
    }
}
