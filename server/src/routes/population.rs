use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use relief_core::model::{AffectedPerson, AffectedPersonPatch, NewAffectedPerson, PopulationFilter};
use relief_core::{ChangeAction, EntityKind, Validate};
use tracing::info;

use super::{created, notify, Created};
use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/affected-population
pub async fn list(
    State(state): State<AppState>,
    filter: Result<Query<PopulationFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<AffectedPerson>>> {
    let Query(filter) = filter?;
    Ok(Json(state.store.list_population(&filter).await?))
}

/// GET /api/affected-population/:id
pub async fn get_one(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<AffectedPerson>> {
    let Path(id) = id?;
    Ok(Json(state.store.get_person(id).await?))
}

/// POST /api/affected-population
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<NewAffectedPerson>, JsonRejection>,
) -> ApiResult<Created<AffectedPerson>> {
    let Json(person) = payload?;
    person.validate()?;

    let person = state.store.create_person(&person, Some(&user.0.id)).await?;
    info!(
        target: "http",
        person_id = person.id,
        priority = %person.priority,
        "Affected person registered"
    );
    notify(&state, EntityKind::AffectedPerson, ChangeAction::Created, person.id, &user);
    Ok(created(person))
}

/// PATCH /api/affected-population/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<AffectedPersonPatch>, JsonRejection>,
) -> ApiResult<Json<AffectedPerson>> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    patch.validate()?;

    let person = state.store.update_person(id, &patch).await?;
    notify(&state, EntityKind::AffectedPerson, ChangeAction::Updated, person.id, &user);
    Ok(Json(person))
}
