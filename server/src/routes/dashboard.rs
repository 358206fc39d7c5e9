use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use relief_core::{DashboardStats, Units, WeatherQuery, WeatherReport};
use serde::Deserialize;
use std::convert::Infallible;
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/dashboard/stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.store.dashboard_stats().await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct WeatherParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub location: Option<String>,
    #[serde(default)]
    pub units: Units,
}

impl WeatherParams {
    /// Coordinates win over a place name when both are given.
    pub fn to_query(&self) -> ApiResult<WeatherQuery> {
        match (self.lat, self.lon, self.location.as_deref()) {
            (Some(latitude), Some(longitude), _) => Ok(WeatherQuery::Coordinates {
                latitude,
                longitude,
            }),
            (None, None, Some(place)) => Ok(WeatherQuery::Place(place.to_string())),
            (Some(_), None, _) | (None, Some(_), _) => Err(ApiError::BadRequest(
                "lat and lon must be given together".to_string(),
            )),
            (None, None, None) => Err(ApiError::BadRequest(
                "either lat and lon or location is required".to_string(),
            )),
        }
    }
}

/// GET /api/weather
pub async fn weather(
    State(state): State<AppState>,
    params: Result<Query<WeatherParams>, QueryRejection>,
) -> ApiResult<Json<WeatherReport>> {
    let Query(params) = params?;
    let query = params.to_query()?;
    query.validate()?;

    debug!(target: "weather", query = ?query, units = ?params.units, "Weather requested");
    let report = state.weather.current(&query, params.units).await?;
    Ok(Json(report))
}

/// GET /api/events/stream
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!(
        target: "http",
        subscribers = state.events.subscriber_count() + 1,
        "Dashboard subscribed to change feed"
    );

    let rx = state.events.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(change) => match Event::default().event("change").json_data(&change) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                warn!(target: "http", error = %e, "Failed to serialize change event");
                None
            }
        },
        Err(e) => {
            // Lagged receivers skip ahead; clients refetch on the next event.
            warn!(target: "http", error = %e, "Change feed lagged");
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_take_precedence() {
        let params = WeatherParams {
            lat: Some(23.7),
            lon: Some(90.4),
            location: Some("Dhaka".into()),
            ..Default::default()
        };
        assert!(matches!(
            params.to_query().unwrap(),
            WeatherQuery::Coordinates { .. }
        ));
    }

    #[test]
    fn place_name_alone() {
        let params = WeatherParams {
            location: Some("Sylhet".into()),
            ..Default::default()
        };
        assert_eq!(
            params.to_query().unwrap(),
            WeatherQuery::Place("Sylhet".into())
        );
    }

    #[test]
    fn half_a_coordinate_is_rejected() {
        let params = WeatherParams {
            lat: Some(23.7),
            ..Default::default()
        };
        assert!(matches!(params.to_query(), Err(ApiError::BadRequest(_))));
        assert!(matches!(
            WeatherParams::default().to_query(),
            Err(ApiError::BadRequest(_))
        ));
    }
}
