//! REST handlers, one module per table
//!
//! Every handler takes its extractors as `Result<_, Rejection>` so malformed
//! input comes back in the same JSON error shape as validation failures.

pub mod alerts;
pub mod dashboard;
pub mod distributions;
pub mod population;
pub mod resources;
pub mod teams;
pub mod zones;

use axum::{http::StatusCode, Json};
use relief_core::{ChangeAction, ChangeEvent, EntityKind};

use crate::auth::CurrentUser;
use crate::AppState;

pub type Created<T> = (StatusCode, Json<T>);

pub(crate) fn created<T>(value: T) -> Created<T> {
    (StatusCode::CREATED, Json(value))
}

/// Tell open dashboards that a row changed.
pub(crate) fn notify(
    state: &AppState,
    entity: EntityKind,
    action: ChangeAction,
    id: i64,
    user: &CurrentUser,
) {
    state
        .events
        .broadcast(ChangeEvent::new(entity, action, id, Some(&user.0.id)));
}
