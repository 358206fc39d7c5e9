use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use relief_core::model::{NewReliefResource, ReliefResource, ReliefResourcePatch};
use relief_core::{ChangeAction, EntityKind, Validate};
use tracing::info;

use super::{created, notify, Created};
use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/relief-resources
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<ReliefResource>>> {
    Ok(Json(state.store.list_resources().await?))
}

/// GET /api/relief-resources/:id
pub async fn get_one(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ReliefResource>> {
    let Path(id) = id?;
    Ok(Json(state.store.get_resource(id).await?))
}

/// POST /api/relief-resources
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<NewReliefResource>, JsonRejection>,
) -> ApiResult<Created<ReliefResource>> {
    let Json(resource) = payload?;
    resource.validate()?;

    let resource = state.store.create_resource(&resource).await?;
    info!(
        target: "http",
        resource_id = resource.id,
        kind = %resource.resource_type,
        quantity = resource.quantity,
        "Relief stock added"
    );
    notify(&state, EntityKind::ReliefResource, ChangeAction::Created, resource.id, &user);
    Ok(created(resource))
}

/// PATCH /api/relief-resources/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ReliefResourcePatch>, JsonRejection>,
) -> ApiResult<Json<ReliefResource>> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    patch.validate()?;

    let resource = state.store.update_resource(id, &patch).await?;
    notify(&state, EntityKind::ReliefResource, ChangeAction::Updated, resource.id, &user);
    Ok(Json(resource))
}
