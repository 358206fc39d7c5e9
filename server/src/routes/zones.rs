use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use relief_core::model::{FloodZone, FloodZonePatch, NewFloodZone, ZoneFilter};
use relief_core::{ChangeAction, EntityKind, Validate};
use serde_json::{json, Value};
use tracing::info;

use super::{created, notify, Created};
use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/flood-zones
pub async fn list(
    State(state): State<AppState>,
    filter: Result<Query<ZoneFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<FloodZone>>> {
    let Query(filter) = filter?;
    Ok(Json(state.store.list_zones(&filter).await?))
}

/// GET /api/flood-zones/:id
pub async fn get_one(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<FloodZone>> {
    let Path(id) = id?;
    Ok(Json(state.store.get_zone(id).await?))
}

/// POST /api/flood-zones
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<NewFloodZone>, JsonRejection>,
) -> ApiResult<Created<FloodZone>> {
    let Json(zone) = payload?;
    zone.validate()?;

    let zone = state.store.create_zone(&zone).await?;
    info!(
        target: "http",
        zone_id = zone.id,
        district = %zone.district,
        risk = %zone.risk_level,
        "Flood zone created"
    );
    notify(&state, EntityKind::FloodZone, ChangeAction::Created, zone.id, &user);
    Ok(created(zone))
}

/// PATCH /api/flood-zones/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<FloodZonePatch>, JsonRejection>,
) -> ApiResult<Json<FloodZone>> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    patch.validate()?;

    let zone = state.store.update_zone(id, &patch).await?;
    notify(&state, EntityKind::FloodZone, ChangeAction::Updated, zone.id, &user);
    Ok(Json(zone))
}

/// GET /api/flood-zones/map
pub async fn map(
    State(state): State<AppState>,
    filter: Result<Query<ZoneFilter>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(filter) = filter?;
    let zones = state.store.list_zones(&filter).await?;
    Ok(Json(feature_collection(&zones)))
}

/// GeoJSON points; coordinates are `[longitude, latitude]`.
pub fn feature_collection(zones: &[FloodZone]) -> Value {
    let features: Vec<Value> = zones
        .iter()
        .map(|zone| {
            json!({
                "type": "Feature",
                "id": zone.id,
                "geometry": {
                    "type": "Point",
                    "coordinates": [zone.longitude, zone.latitude],
                },
                "properties": {
                    "name": zone.name,
                    "district": zone.district,
                    "radiusMeters": zone.radius_meters,
                    "riskLevel": zone.risk_level,
                    "waterLevelCm": zone.water_level_cm,
                    "isActive": zone.is_active,
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use relief_core::model::RiskLevel;

    #[test]
    fn points_are_lon_lat() {
        let now = Utc::now();
        let zone = FloodZone {
            id: 4,
            name: "Char island".into(),
            district: "Gaibandha".into(),
            latitude: 25.3,
            longitude: 89.5,
            radius_meters: 1500,
            risk_level: RiskLevel::Critical,
            water_level_cm: None,
            description: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let fc = feature_collection(&[zone]);
        assert_eq!(fc["type"], "FeatureCollection");
        let feature = &fc["features"][0];
        assert_eq!(feature["geometry"]["coordinates"][0], 89.5);
        assert_eq!(feature["geometry"]["coordinates"][1], 25.3);
        assert_eq!(feature["properties"]["riskLevel"], "critical");
        assert_eq!(feature["properties"]["radiusMeters"], 1500);
    }
}
