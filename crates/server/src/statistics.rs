//! Sales statistics endpoint

use api_types::statistics::{DEFAULT_DAYS, ProductStatistics, Statistics, StatisticsQuery};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use engine::users;

use crate::{ServerError, server::ServerState};

/// Handle requests for the sales of the last `days` days (30 by default)
pub async fn get_stats(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<Statistics>, ServerError> {
    let stats = state
        .engine
        .sales_statistics(
            &user.username,
            query.config_id,
            query.days.unwrap_or(DEFAULT_DAYS),
        )
        .await?;

    Ok(Json(Statistics {
        products: stats
            .products
            .into_iter()
            .map(|product| ProductStatistics {
                name: product.name,
                quantity: product.quantity,
                revenue: product.revenue.to_major(),
                avg_price: product.avg_price.to_major(),
            })
            .collect(),
        total_revenue: stats.total_revenue.to_major(),
        total_items_sold: stats.total_items_sold,
        readings_count: stats.readings_count,
        period_days: stats.period_days,
    }))
}
