//! Tea bag catalogue of the caller.

use api_types::tea_bag::{TeaBagList, TeaBagSave, TeaBagSaved, TeaBagView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::users;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<TeaBagList>, ServerError> {
    let tea_bags = state
        .engine
        .list_tea_bags(&user.username)
        .await?
        .into_iter()
        .map(|tea_bag| TeaBagView {
            id: tea_bag.id,
            name: tea_bag.name,
            cost_per_unit: tea_bag.cost_per_unit,
        })
        .collect();

    Ok(Json(TeaBagList { tea_bags }))
}

pub async fn save(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TeaBagSave>,
) -> Result<Json<TeaBagSaved>, ServerError> {
    let id = state
        .engine
        .upsert_tea_bag(
            &user.username,
            payload.id,
            &payload.name,
            payload.cost_per_unit,
        )
        .await?;

    Ok(Json(TeaBagSaved { id }))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_tea_bag(&user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
