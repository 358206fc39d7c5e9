/// Weather proxy
///
/// Fetches current conditions from the Open-Meteo API (free, no API key
/// required) and reshapes them for the dashboard. Place names are geocoded
/// first. Results are cached per coordinate rounded to two decimals.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::validation::Violations;
use crate::{ReliefError, Result};

/// Configuration for weather provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// API endpoint (default: Open-Meteo)
    pub api_endpoint: String,
    /// Geocoding API endpoint
    pub geocoding_endpoint: String,
    /// Timeout for API requests in milliseconds
    pub timeout_ms: u64,
    pub user_agent: String,
    /// How long a report is reused; 0 disables caching
    pub cache_ttl_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "https://api.open-meteo.com/v1/forecast".to_string(),
            geocoding_endpoint: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            timeout_ms: 10_000,
            user_agent: "relief-dashboard/0.1".to_string(),
            cache_ttl_secs: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    fn temperature_unit(self) -> &'static str {
        match self {
            Units::Metric => "celsius",
            Units::Imperial => "fahrenheit",
        }
    }

    fn wind_speed_unit(self) -> &'static str {
        match self {
            Units::Metric => "kmh",
            Units::Imperial => "mph",
        }
    }

    fn precipitation_unit(self) -> &'static str {
        match self {
            Units::Metric => "mm",
            Units::Imperial => "inch",
        }
    }
}

/// What to look up
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    Coordinates { latitude: f64, longitude: f64 },
    Place(String),
}

impl WeatherQuery {
    pub fn validate(&self) -> Result<()> {
        let mut v = Violations::new();
        match self {
            WeatherQuery::Coordinates {
                latitude,
                longitude,
            } => {
                v.latitude("lat", Some(*latitude));
                v.longitude("lon", Some(*longitude));
            }
            WeatherQuery::Place(name) => v.required("location", name),
        }
        v.finish()
    }
}

/// Current conditions as served to the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub temperature: f64,
    pub humidity: Option<i32>,
    pub wind_speed: Option<f64>,
    pub precipitation: Option<f64>,
    pub conditions: String,
    pub units: Units,
    pub fetched_at: DateTime<Utc>,
}

/// Anything that can answer a weather query. The HTTP layer depends on this
/// rather than on the network client.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, query: &WeatherQuery, units: Units) -> Result<WeatherReport>;
}

/// Geocoding response from Open-Meteo
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeoLocation>>,
}

#[derive(Debug, Deserialize)]
struct GeoLocation {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    admin1: Option<String>,
}

/// Forecast response from Open-Meteo
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentWeather,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature_2m: f64,
    relative_humidity_2m: Option<i32>,
    wind_speed_10m: Option<f64>,
    precipitation: Option<f64>,
    weather_code: i32,
}

/// Open-Meteo backed weather source
pub struct WeatherProvider {
    config: WeatherConfig,
    http_client: reqwest::Client,
    cache: Arc<DashMap<String, (Instant, WeatherReport)>>,
}

impl WeatherProvider {
    pub fn new() -> Self {
        Self::with_config(WeatherConfig::default())
    }

    pub fn with_config(config: WeatherConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(&config.user_agent)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            config,
            http_client,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Geocode location name to coordinates
    async fn geocode(&self, location: &str) -> Result<(f64, f64, String)> {
        debug!(target: "weather", location = %location, "Geocoding location");

        let response = self
            .http_client
            .get(&self.config.geocoding_endpoint)
            .query(&[
                ("name", location),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!(target: "weather", error = %e, "Geocoding API request failed");
                ReliefError::UpstreamError(format!("Geocoding request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(target: "weather", status = %status, "Geocoding API returned error");
            return Err(ReliefError::UpstreamError(format!(
                "Geocoding API returned status: {status}"
            )));
        }

        let geo_response: GeocodingResponse = response.json().await.map_err(|e| {
            warn!(target: "weather", error = %e, "Failed to parse geocoding response");
            ReliefError::UpstreamError(format!("Failed to parse geocoding response: {e}"))
        })?;

        let place = geo_response
            .results
            .and_then(|mut r| r.pop())
            .ok_or_else(|| ReliefError::NotFound(format!("location not found: {location}")))?;

        Ok((place.latitude, place.longitude, display_name(&place)))
    }

    async fn fetch_current(&self, lat: f64, lon: f64, units: Units) -> Result<CurrentWeather> {
        debug!(target: "weather", lat = %lat, lon = %lon, "Fetching current weather");

        let response = self
            .http_client
            .get(&self.config.api_endpoint)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                (
                    "current",
                    "temperature_2m,relative_humidity_2m,wind_speed_10m,precipitation,weather_code"
                        .to_string(),
                ),
                ("temperature_unit", units.temperature_unit().to_string()),
                ("wind_speed_unit", units.wind_speed_unit().to_string()),
                ("precipitation_unit", units.precipitation_unit().to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!(target: "weather", error = %e, "Weather API request failed");
                ReliefError::UpstreamError(format!("Weather API request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(target: "weather", status = %status, "Weather API returned error");
            return Err(ReliefError::UpstreamError(format!(
                "Weather API returned status: {status}"
            )));
        }

        let forecast: ForecastResponse = response.json().await.map_err(|e| {
            warn!(target: "weather", error = %e, "Failed to parse weather response");
            ReliefError::UpstreamError(format!("Failed to parse weather response: {e}"))
        })?;

        Ok(forecast.current)
    }

    fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.config.cache_ttl_secs)
    }

    fn cached(&self, key: &str) -> Option<WeatherReport> {
        let entry = self.cache.get(key)?;
        let (stored_at, report) = entry.value();
        if stored_at.elapsed() < self.cache_ttl() {
            Some(report.clone())
        } else {
            None
        }
    }

    /// Stores a fresh report and drops every expired one.
    fn remember(&self, key: String, report: WeatherReport) {
        let ttl = self.cache_ttl();
        if ttl.is_zero() {
            return;
        }
        self.cache.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
        self.cache.insert(key, (Instant::now(), report));
    }
}

impl Default for WeatherProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeatherSource for WeatherProvider {
    async fn current(&self, query: &WeatherQuery, units: Units) -> Result<WeatherReport> {
        query.validate()?;

        let (lat, lon, location) = match query {
            WeatherQuery::Coordinates {
                latitude,
                longitude,
            } => (*latitude, *longitude, format!("{latitude:.4}, {longitude:.4}")),
            WeatherQuery::Place(name) => self.geocode(name.trim()).await?,
        };

        let key = cache_key(lat, lon, units);
        if let Some(mut report) = self.cached(&key) {
            debug!(target: "weather", key = %key, "Serving cached weather");
            report.location = location;
            return Ok(report);
        }

        let current = self.fetch_current(lat, lon, units).await?;
        let report = WeatherReport {
            location,
            latitude: lat,
            longitude: lon,
            temperature: current.temperature_2m,
            humidity: current.relative_humidity_2m,
            wind_speed: current.wind_speed_10m,
            precipitation: current.precipitation,
            conditions: weather_code_to_description(current.weather_code),
            units,
            fetched_at: Utc::now(),
        };

        self.remember(key, report.clone());
        Ok(report)
    }
}

fn display_name(place: &GeoLocation) -> String {
    match (&place.admin1, &place.country) {
        (Some(region), Some(country)) => format!("{}, {}, {}", place.name, region, country),
        (None, Some(country)) => format!("{}, {}", place.name, country),
        _ => place.name.clone(),
    }
}

/// Roughly 1 km resolution
fn cache_key(lat: f64, lon: f64, units: Units) -> String {
    format!("{lat:.2}:{lon:.2}:{units:?}")
}

/// Convert WMO weather code to human-readable description
pub fn weather_code_to_description(code: i32) -> String {
    match code {
        0 => "clear sky",
        1 => "mainly clear",
        2 => "partly cloudy",
        3 => "overcast",
        45 | 48 => "foggy",
        51 | 53 | 55 => "drizzle",
        56 | 57 => "freezing drizzle",
        61 => "light rain",
        63 => "rain",
        65 => "heavy rain",
        66 | 67 => "freezing rain",
        71 | 73 | 75 => "snow",
        77 => "snow grains",
        80 | 81 => "rain showers",
        82 => "violent rain showers",
        85 | 86 => "snow showers",
        95 => "thunderstorm",
        96 | 99 => "thunderstorm with hail",
        _ => "unknown",
    }
    .to_string()
}
