use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        OriginalUri, Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    listing::{last_values, PageRequest, PageUrl, Paginated},
    state::AppState,
    systems::{
        dto::{SystemDetails, SystemListParams},
        query::SystemQuery,
        repo_types::{HydroponicSystem, NewSystem},
    },
};

/// How many readings `GET /systems/{id}/` embeds.
pub const LATEST_MEASUREMENTS: i64 = 10;

pub fn system_routes() -> Router<AppState> {
    Router::new()
        .route("/systems/", get(list_systems).post(create_system))
        .route(
            "/systems/:id/",
            get(get_system).put(update_system).delete(delete_system),
        )
}

/// Loads system `id` for the caller: absent is 404, someone else's is 403.
async fn owned_system(
    state: &AppState,
    id: i64,
    user_id: Uuid,
    denied: &str,
) -> Result<HydroponicSystem, AppError> {
    let system = state
        .store
        .get_system(id)
        .await?
        .ok_or_else(AppError::not_found)?;
    if system.owner != user_id {
        warn!(%user_id, system_id = id, "system belongs to another user");
        return Err(AppError::Forbidden(denied.into()));
    }
    Ok(system)
}

#[instrument(skip(state, headers, params))]
pub async fn list_systems(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Paginated<HydroponicSystem>>, AppError> {
    let Query(pairs) = params?;
    let params: SystemListParams = last_values(pairs)?;
    let query = SystemQuery::from_params(&params)?;
    let page = PageRequest::parse(params.page.as_deref(), state.config.page_size)?;

    let found = state
        .store
        .list_systems(user_id, &query, page.limit(), page.offset())
        .await?;

    let url = PageUrl::from_request(&headers, &uri);
    Ok(Json(Paginated::build(found.items, found.total, &page, &url)?))
}

#[instrument(skip(state, payload))]
pub async fn create_system(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<HydroponicSystem>), AppError> {
    let Json(body) = payload?;
    let new = NewSystem::from_json(&body)?;
    let system = state.store.create_system(user_id, &new).await?;
    info!(%user_id, system_id = system.id, "system created");
    Ok((StatusCode::CREATED, Json(system)))
}

#[instrument(skip(state))]
pub async fn get_system(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<SystemDetails>, AppError> {
    let Path(id) = id?;
    let system =
        owned_system(&state, id, user_id, "You do not have access to this resource.").await?;
    let latest_measurements = state
        .store
        .latest_measurements(system.id, LATEST_MEASUREMENTS)
        .await?;
    Ok(Json(SystemDetails {
        hydroponic_system: system,
        latest_measurements,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_system(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<HydroponicSystem>, AppError> {
    let Path(id) = id?;
    owned_system(&state, id, user_id, "You cannot edit this resource.").await?;

    let Json(body) = payload?;
    let changes = NewSystem::from_json(&body)?;
    let system = state
        .store
        .update_system(id, &changes)
        .await?
        .ok_or_else(AppError::not_found)?;
    info!(%user_id, system_id = id, "system updated");
    Ok(Json(system))
}

#[instrument(skip(state))]
pub async fn delete_system(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    owned_system(&state, id, user_id, "You cannot delete this resource.").await?;
    if !state.store.delete_system(id).await? {
        return Err(AppError::not_found());
    }
    info!(%user_id, system_id = id, "system deleted");
    Ok(StatusCode::NO_CONTENT)
}
