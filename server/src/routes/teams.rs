use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use relief_core::model::{NewResponseTeam, ResponseTeam, ResponseTeamPatch, TeamFilter};
use relief_core::{ChangeAction, EntityKind, Validate};
use tracing::info;

use super::{created, notify, Created};
use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/response-teams
pub async fn list(
    State(state): State<AppState>,
    filter: Result<Query<TeamFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<ResponseTeam>>> {
    let Query(filter) = filter?;
    Ok(Json(state.store.list_teams(&filter).await?))
}

/// GET /api/response-teams/:id
pub async fn get_one(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ResponseTeam>> {
    let Path(id) = id?;
    Ok(Json(state.store.get_team(id).await?))
}

/// POST /api/response-teams
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<NewResponseTeam>, JsonRejection>,
) -> ApiResult<Created<ResponseTeam>> {
    let Json(team) = payload?;
    team.validate()?;

    let team = state.store.create_team(&team).await?;
    info!(
        target: "http",
        team_id = team.id,
        status = %team.status,
        "Response team registered"
    );
    notify(&state, EntityKind::ResponseTeam, ChangeAction::Created, team.id, &user);
    Ok(created(team))
}

/// PATCH /api/response-teams/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ResponseTeamPatch>, JsonRejection>,
) -> ApiResult<Json<ResponseTeam>> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    patch.validate()?;

    let team = state.store.update_team(id, &patch).await?;
    notify(&state, EntityKind::ResponseTeam, ChangeAction::Updated, team.id, &user);
    Ok(Json(team))
}
