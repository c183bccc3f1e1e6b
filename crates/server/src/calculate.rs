//! Cost calculation endpoints.

use api_types::calculate::{CalculateRequest, CalculateResponse, DrinkCost};
use axum::{
    Extension, Json,
    extract::State,
    http::header,
    response::IntoResponse,
};
use chrono::Utc;
use engine::{DrinkRecipe, FixedCosts, PriceList, compute_costs, compute_profit, users};

use crate::{ServerError, convert, server::ServerState};

/// Valid recipes of the request with the prices to cost them.
///
/// Without `tea_bags` the caller's stored tea bags are used.
async fn cost_inputs(
    state: &ServerState,
    user: &users::Model,
    payload: CalculateRequest,
) -> Result<(FixedCosts, PriceList, Vec<DrinkRecipe>), ServerError> {
    let tea_bags = match payload.tea_bags {
        Some(prices) => prices,
        None => state.engine.tea_bag_prices(&user.username).await?,
    };
    let prices = PriceList {
        ingredients: payload.ingredients,
        tea_bags,
    };
    let drinks: Vec<DrinkRecipe> = payload.drinks.into_iter().map(convert::drink).collect();
    let recipes = engine::valid_recipes(&drinks);
    Ok((convert::fixed_costs(&payload.fixed_costs), prices, recipes))
}

pub async fn calculate(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CalculateRequest>,
) -> Result<Json<CalculateResponse>, ServerError> {
    let (fixed, prices, recipes) = cost_inputs(&state, &user, payload).await?;
    let results = compute_costs(&fixed, &prices, &recipes)
        .into_iter()
        .zip(&recipes)
        .map(|(result, recipe)| {
            let vending_price = recipe.configured_vending_price();
            DrinkCost {
                profit: vending_price
                    .and_then(|price| compute_profit(result.total_cost, price))
                    .map(convert::profit),
                vending_price,
                name: result.name,
                breakdown: result.breakdown.into_iter().map(convert::cost_line).collect(),
                cleaning_cost_per_product: result.cleaning_cost_per_product,
                total_cleaning_cost: result.total_cleaning_cost,
                total_cost: result.total_cost,
            }
        })
        .collect();

    Ok(Json(CalculateResponse { results }))
}

/// Same input as [`calculate`], answered with a CSV attachment.
pub async fn export(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CalculateRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let (fixed, prices, recipes) = cost_inputs(&state, &user, payload).await?;
    if recipes.is_empty() {
        return Err(ServerError::Generic("no valid drinks to export".to_string()));
    }
    let results = compute_costs(&fixed, &prices, &recipes);
    let csv = engine::report::cost_report_csv(&results, &recipes)?;

    let filename = format!(
        "attachment; filename=\"vending_costs_{}.csv\"",
        Utc::now().format("%Y%m%d_%H%M%S")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        csv,
    ))
}
