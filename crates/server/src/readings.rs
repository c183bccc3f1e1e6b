//! Counter readings and the sales they produce.

use api_types::{
    ScopeQuery,
    reading::{
        CounterReadingCreated, CounterReadingList, CounterReadingNew, CounterReadingView,
        PriceSource, SalesLine,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{CounterReading, NewCounterReading, users};
use uuid::Uuid;

use crate::{ServerError, convert, server::ServerState};

fn price_source(value: engine::PriceSource) -> PriceSource {
    match value {
        engine::PriceSource::Recorded => PriceSource::Recorded,
        engine::PriceSource::ProductionCost => PriceSource::ProductionCost,
        engine::PriceSource::Missing => PriceSource::Missing,
    }
}

fn reading_view(reading: CounterReading) -> CounterReadingView {
    CounterReadingView {
        id: reading.id,
        config_id: reading.config_id,
        owner: reading.owner,
        taken_at: reading.taken_at,
        counter_data: reading.counter_data,
        cash_in_register: reading.cash_in_register.to_major(),
        notes: reading.notes,
        product_prices: convert::major_map(reading.product_prices),
    }
}

/// Records a reading and answers with the sales since the previous one.
pub async fn reading_new(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CounterReadingNew>,
) -> Result<(StatusCode, Json<CounterReadingCreated>), ServerError> {
    let recorded = state
        .engine
        .record_counter_reading(
            &user.username,
            NewCounterReading {
                config_id: payload.config_id,
                counter_data: payload.counter_data,
                cash_in_register: convert::money(payload.cash_in_register),
                notes: payload.notes,
                product_prices: convert::money_map(payload.product_prices),
            },
        )
        .await?;

    let (sales_calculated, counter_resets) = match recorded.sales {
        Some(sales) => (
            sales
                .lines
                .into_iter()
                .map(|line| SalesLine {
                    product: line.product,
                    units_sold: line.units_sold,
                    unit_price: line.unit_price.to_major(),
                    price_source: price_source(line.price_source),
                    revenue: line.revenue.to_major(),
                })
                .collect(),
            sales.counter_resets,
        ),
        None => (Vec::new(), Vec::new()),
    };

    Ok((
        StatusCode::CREATED,
        Json(CounterReadingCreated {
            id: recorded.reading.id,
            sales_calculated,
            counter_resets,
        }),
    ))
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(scope): Query<ScopeQuery>,
) -> Result<Json<CounterReadingList>, ServerError> {
    let readings = state
        .engine
        .list_counter_readings(&user.username, scope.config_id)
        .await?
        .into_iter()
        .map(reading_view)
        .collect();

    Ok(Json(CounterReadingList { readings }))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_counter_reading(&user.username, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
