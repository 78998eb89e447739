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
    measurements::{
        dto::MeasurementListParams,
        query::MeasurementQuery,
        repo_types::{Measurement, NewMeasurement},
    },
    state::AppState,
};

pub fn measurement_routes() -> Router<AppState> {
    Router::new().route(
        "/systems/:id/measurements/",
        get(list_measurements).post(create_measurement),
    )
}

/// Absent and foreign systems are both refused with `denied`.
async fn ensure_owned(
    state: &AppState,
    system_id: i64,
    user_id: Uuid,
    denied: &str,
) -> Result<(), AppError> {
    match state.store.get_system(system_id).await? {
        Some(system) if system.owner == user_id => Ok(()),
        _ => {
            warn!(%user_id, system_id, "measurements of an unowned system");
            Err(AppError::Forbidden(denied.into()))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn create_measurement(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    system_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Measurement>), AppError> {
    let Path(system_id) = system_id?;
    ensure_owned(
        &state,
        system_id,
        user_id,
        "You do not have permission to add measurements in this system.",
    )
    .await?;

    let Json(body) = payload?;
    let new = NewMeasurement::from_json(&body)?;
    let measurement = state.store.create_measurement(system_id, &new).await?;
    info!(system_id, measurement_id = measurement.id, "measurement recorded");
    Ok((StatusCode::CREATED, Json(measurement)))
}

#[instrument(skip(state, headers, params))]
pub async fn list_measurements(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    system_id: Result<Path<i64>, PathRejection>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Paginated<Measurement>>, AppError> {
    let Path(system_id) = system_id?;
    ensure_owned(&state, system_id, user_id, "You do not have permission to this system").await?;

    let Query(pairs) = params?;
    let params: MeasurementListParams = last_values(pairs)?;
    let query = MeasurementQuery::from_params(&params)?;
    let page = PageRequest::parse(params.page.as_deref(), state.config.page_size)?;

    let found = state
        .store
        .list_measurements(system_id, &query, page.limit(), page.offset())
        .await?;

    let url = PageUrl::from_request(&headers, &uri);
    Ok(Json(Paginated::build(found.items, found.total, &page, &url)?))
}
