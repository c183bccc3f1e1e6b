//! Cash register events and balance.

use api_types::{
    ScopeQuery,
    cash::{
        BalanceStatus, CashBalance, CashEventCreated, CashEventList, CashEventNew, CashEventType,
        CashEventView,
    },
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use engine::{CashEventKind, users};

use crate::{ServerError, convert, server::ServerState};

fn event_kind(value: CashEventType) -> CashEventKind {
    match value {
        CashEventType::Deposit => CashEventKind::Deposit,
        CashEventType::Withdrawal => CashEventKind::Withdrawal,
    }
}

fn event_type(value: CashEventKind) -> CashEventType {
    match value {
        CashEventKind::Deposit => CashEventType::Deposit,
        CashEventKind::Withdrawal => CashEventType::Withdrawal,
    }
}

pub async fn event_new(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CashEventNew>,
) -> Result<(StatusCode, Json<CashEventCreated>), ServerError> {
    let id = state
        .engine
        .record_cash_event(
            &user.username,
            payload.config_id,
            event_kind(payload.event_type),
            convert::money(payload.amount),
            payload.description.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(CashEventCreated { id })))
}

pub async fn events(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(scope): Query<ScopeQuery>,
) -> Result<Json<CashEventList>, ServerError> {
    let events = state
        .engine
        .list_cash_events(&user.username, scope.config_id)
        .await?
        .into_iter()
        .map(|event| CashEventView {
            id: event.id,
            config_id: event.config_id,
            owner: event.owner,
            event_type: event_type(event.kind),
            amount: event.amount.to_major(),
            description: event.description,
            occurred_at: event.occurred_at,
        })
        .collect();

    Ok(Json(CashEventList { events }))
}

pub async fn balance(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(scope): Query<ScopeQuery>,
) -> Result<Json<CashBalance>, ServerError> {
    let balance = state
        .engine
        .cash_balance(&user.username, scope.config_id)
        .await?;

    Ok(Json(CashBalance {
        expected_cash: balance.expected.to_major(),
        actual_cash: balance.actual.to_major(),
        difference: balance.difference.to_major(),
        status: match balance.status {
            engine::BalanceStatus::Nominal => BalanceStatus::Nominal,
            engine::BalanceStatus::Warning => BalanceStatus::Warning,
            engine::BalanceStatus::Error => BalanceStatus::Error,
        },
    }))
}
