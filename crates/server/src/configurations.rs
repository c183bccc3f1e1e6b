//! Saved configurations and their sharing.

use api_types::config::{
    ConfigList, ConfigSave, ConfigSaved, ConfigSummary, ConfigView, ShareRequest, ShareView,
    SharedUsers,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{SaveConfiguration, users};
use uuid::Uuid;

use crate::{ServerError, convert, server::ServerState};

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<ConfigList>, ServerError> {
    let configs = state
        .engine
        .list_configurations(&user.username)
        .await?
        .into_iter()
        .map(|summary| ConfigSummary {
            id: summary.id,
            name: summary.name,
            owner: summary.owner,
            access: convert::access(summary.access),
            drinks_count: summary.drinks_count,
            created_at: summary.created_at,
            updated_at: summary.updated_at,
        })
        .collect();

    Ok(Json(ConfigList { configs }))
}

/// Updates the configuration when `id` is set and the name is unchanged,
/// saves a new one otherwise (`201`).
pub async fn save(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ConfigSave>,
) -> Result<(StatusCode, Json<ConfigSaved>), ServerError> {
    let saved = state
        .engine
        .save_configuration(
            &user.username,
            SaveConfiguration {
                id: payload.id,
                name: payload.name,
                fixed_costs: convert::fixed_costs(&payload.fixed_costs),
                ingredient_prices: payload.ingredients,
                drinks: payload.drinks.into_iter().map(convert::drink).collect(),
            },
        )
        .await?;

    let status = if saved.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(ConfigSaved {
            id: saved.id,
            created: saved.created,
        }),
    ))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConfigView>, ServerError> {
    let (config, access) = state.engine.configuration(&user.username, id).await?;

    Ok(Json(ConfigView {
        id: config.id,
        name: config.name,
        owner: config.owner,
        access: convert::access(access),
        fixed_costs: convert::fixed_costs_view(config.fixed_costs),
        ingredients: config.ingredient_prices,
        drinks: config.drinks.into_iter().map(convert::drink_view).collect(),
        created_at: config.created_at,
        updated_at: config.updated_at,
    }))
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_configuration(&user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn shared_users(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SharedUsers>, ServerError> {
    let shared_users = state
        .engine
        .list_shares(&user.username, id)
        .await?
        .into_iter()
        .map(|share| ShareView {
            username: share.username,
            can_edit: share.can_edit,
        })
        .collect();

    Ok(Json(SharedUsers { shared_users }))
}

pub async fn share(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ShareRequest>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .share_configuration(&user.username, id, &payload.username, payload.can_edit)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unshare(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((id, username)): Path<(Uuid, String)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .unshare_configuration(&user.username, id, &username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
