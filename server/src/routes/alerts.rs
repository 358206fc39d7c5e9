use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use relief_core::model::{AlertFilter, NewWeatherAlert, WeatherAlert, WeatherAlertPatch};
use relief_core::{ChangeAction, EntityKind, Validate};
use tracing::info;

use super::{created, notify, Created};
use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/weather-alerts
pub async fn list(
    State(state): State<AppState>,
    filter: Result<Query<AlertFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<WeatherAlert>>> {
    let Query(filter) = filter?;
    Ok(Json(state.store.list_alerts(&filter).await?))
}

/// GET /api/weather-alerts/:id
pub async fn get_one(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<WeatherAlert>> {
    let Path(id) = id?;
    Ok(Json(state.store.get_alert(id).await?))
}

/// POST /api/weather-alerts
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<NewWeatherAlert>, JsonRejection>,
) -> ApiResult<Created<WeatherAlert>> {
    let Json(alert) = payload?;
    alert.validate()?;

    let alert = state.store.create_alert(&alert, Some(&user.0.id)).await?;
    info!(
        target: "http",
        alert_id = alert.id,
        severity = %alert.severity,
        "Weather alert issued"
    );
    notify(&state, EntityKind::WeatherAlert, ChangeAction::Created, alert.id, &user);
    Ok(created(alert))
}

/// PATCH /api/weather-alerts/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<WeatherAlertPatch>, JsonRejection>,
) -> ApiResult<Json<WeatherAlert>> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    patch.validate()?;

    let alert = state.store.update_alert(id, &patch).await?;
    notify(&state, EntityKind::WeatherAlert, ChangeAction::Updated, alert.id, &user);
    Ok(Json(alert))
}
