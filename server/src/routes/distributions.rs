use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use relief_core::model::{Distribution, DistributionFilter, DistributionPatch, NewDistribution};
use relief_core::{ChangeAction, EntityKind, Validate};
use tracing::info;

use super::{created, notify, Created};
use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/distributions
pub async fn list(
    State(state): State<AppState>,
    filter: Result<Query<DistributionFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Distribution>>> {
    let Query(filter) = filter?;
    Ok(Json(state.store.list_distributions(&filter).await?))
}

/// GET /api/distributions/:id
pub async fn get_one(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Distribution>> {
    let Path(id) = id?;
    Ok(Json(state.store.get_distribution(id).await?))
}

/// POST /api/distributions
///
/// Also draws the resource's stock down, so the resource row changes too.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<NewDistribution>, JsonRejection>,
) -> ApiResult<Created<Distribution>> {
    let Json(distribution) = payload?;
    distribution.validate()?;

    let distribution = state
        .store
        .create_distribution(&distribution, Some(&user.0.id))
        .await?;
    info!(
        target: "http",
        distribution_id = distribution.id,
        resource_id = distribution.resource_id,
        quantity = distribution.quantity,
        "Relief distributed"
    );
    notify(&state, EntityKind::Distribution, ChangeAction::Created, distribution.id, &user);
    notify(
        &state,
        EntityKind::ReliefResource,
        ChangeAction::Updated,
        distribution.resource_id,
        &user,
    );
    Ok(created(distribution))
}

/// PATCH /api/distributions/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<DistributionPatch>, JsonRejection>,
) -> ApiResult<Json<Distribution>> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    patch.validate()?;

    let distribution = state.store.update_distribution(id, &patch).await?;
    notify(&state, EntityKind::Distribution, ChangeAction::Updated, distribution.id, &user);
    Ok(Json(distribution))
}
