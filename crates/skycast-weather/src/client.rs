//! Open-Meteo client: geocoding, current conditions, forecast, archive.
//!
//! Two-step lookups (city name -> coordinates -> data), memoized through
//! [`ResponseCache`]. Concurrent identical requests are not coalesced: two
//! simultaneous callers missing the cache both go to the network. Accepted
//! at this scale; results are idempotent and keyed by city.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::cache::{CachedResponse, ResponseCache};
use crate::error::WeatherError;
use crate::types::{
    Coordinates, DayForecast, ForecastSeries, HistoricalSeries, WeatherCondition, WeatherSnapshot,
};

const CURRENT_FIELDS: &str = "temperature_2m,weather_code,wind_speed_10m,wind_direction_10m,\
                              relative_humidity_2m,apparent_temperature,is_day";
const HOURLY_FIELDS: &str = "pressure_msl";
const FORECAST_DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,\
                                     temperature_2m_mean,precipitation_sum,wind_speed_10m_max,\
                                     sunrise,sunset";
const ARCHIVE_DAILY_FIELDS: &str =
    "temperature_2m_max,temperature_2m_min,precipitation_sum,wind_speed_10m_max";

/// Endpoint URLs and request parameters for the weather client.
#[derive(Debug, Clone)]
pub struct WeatherSettings {
    pub geocoding_url: String,
    pub forecast_url: String,
    pub archive_url: String,
    pub language: String,
    pub fallback_timezone: String,
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            archive_url: "https://archive-api.open-meteo.com/v1/archive".to_string(),
            language: "en".to_string(),
            fallback_timezone: "auto".to_string(),
            request_timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(300),
        }
    }
}

/// Cache occupancy, for debugging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub cached_responses: usize,
    pub cached_cities: Vec<String>,
}

/// Client for the weather and geocoding collaborators.
pub struct WeatherClient {
    http: reqwest::Client,
    settings: WeatherSettings,
    cache: Mutex<ResponseCache>,
    coordinates: Mutex<HashMap<String, Coordinates>>,
}

impl WeatherClient {
    /// Build a client with an enforced per-request timeout.
    pub fn new(settings: WeatherSettings) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| WeatherError::Fetch {
                operation: "client setup",
                message: e.to_string(),
            })?;

        let cache = Mutex::new(ResponseCache::new(settings.cache_ttl));

        Ok(Self { http, settings, cache, coordinates: Mutex::new(HashMap::new()) })
    }

    /// Resolve a city name to coordinates.
    ///
    /// Exact-name hits come from the session-lifetime coordinate cache;
    /// misses take the provider's first match and cache it permanently.
    pub async fn geocode(&self, city: &str) -> Result<Coordinates, WeatherError> {
        if let Some(coords) = self.coordinates.lock().get(city) {
            tracing::debug!("Coordinates from cache: {}", city);
            return Ok(coords.clone());
        }

        tracing::info!("Geocoding: {}", city);
        let response = self
            .http
            .get(&self.settings.geocoding_url)
            .query(&[
                ("name", city),
                ("count", "1"),
                ("language", self.settings.language.as_str()),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::from_reqwest("geocode", e))?;

        if !response.status().is_success() {
            return Err(WeatherError::NotFound(city.to_string()));
        }

        let body: GeocodingResponse = response.json().await.map_err(|e| WeatherError::Fetch {
            operation: "geocode",
            message: format!("invalid payload: {}", e),
        })?;

        let first = body
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::NotFound(city.to_string()))?;

        let coords = Coordinates {
            latitude: first.latitude,
            longitude: first.longitude,
            name: first.name,
            country: first.country.unwrap_or_default(),
            timezone: first.timezone.unwrap_or_else(|| self.settings.fallback_timezone.clone()),
        };

        self.coordinates.lock().insert(city.to_string(), coords.clone());
        Ok(coords)
    }

    /// Fetch current conditions for a city, serving from cache when fresh.
    pub async fn current_weather(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
        let key = ResponseCache::current_key(city);
        if let Some(CachedResponse::Current(snapshot)) = self.cache.lock().get(&key) {
            tracing::debug!("Current weather from cache: {}", city);
            return Ok(snapshot.clone());
        }

        let coords = self.geocode(city).await?;

        tracing::info!("Fetching current weather: {}", city);
        let response = self
            .http
            .get(&self.settings.forecast_url)
            .query(&[
                ("latitude", coords.latitude.to_string().as_str()),
                ("longitude", coords.longitude.to_string().as_str()),
                ("current", CURRENT_FIELDS),
                ("hourly", HOURLY_FIELDS),
                ("timezone", coords.timezone.as_str()),
                ("temperature_unit", "celsius"),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::from_reqwest("current weather", e))?;

        if !response.status().is_success() {
            return Err(WeatherError::Fetch {
                operation: "current weather",
                message: format!("status {}", response.status()),
            });
        }

        let body: ForecastResponse = response.json().await.map_err(|e| WeatherError::Fetch {
            operation: "current weather",
            message: format!("invalid payload: {}", e),
        })?;

        let snapshot = normalize_current(body, &coords)?;
        self.cache.lock().insert(key, CachedResponse::Current(snapshot.clone()));
        Ok(snapshot)
    }

    /// Fetch the multi-day forecast for a city (same caching discipline).
    pub async fn forecast(&self, city: &str) -> Result<ForecastSeries, WeatherError> {
        let key = ResponseCache::forecast_key(city);
        if let Some(CachedResponse::Forecast(series)) = self.cache.lock().get(&key) {
            tracing::debug!("Forecast from cache: {}", city);
            return Ok(series.clone());
        }

        let coords = self.geocode(city).await?;

        tracing::info!("Fetching forecast: {}", city);
        let response = self
            .http
            .get(&self.settings.forecast_url)
            .query(&[
                ("latitude", coords.latitude.to_string().as_str()),
                ("longitude", coords.longitude.to_string().as_str()),
                ("daily", FORECAST_DAILY_FIELDS),
                ("timezone", coords.timezone.as_str()),
                ("temperature_unit", "celsius"),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::from_reqwest("forecast", e))?;

        if !response.status().is_success() {
            return Err(WeatherError::Fetch {
                operation: "forecast",
                message: format!("status {}", response.status()),
            });
        }

        let body: ForecastResponse = response.json().await.map_err(|e| WeatherError::Fetch {
            operation: "forecast",
            message: format!("invalid payload: {}", e),
        })?;

        let series = normalize_forecast(body, &coords)?;
        self.cache.lock().insert(key, CachedResponse::Forecast(series.clone()));
        Ok(series)
    }

    /// Fetch historical daily aggregates for a bounded date range.
    ///
    /// The provider's `daily` block is validated explicitly; a response
    /// without it is a fetch error, not a panic downstream.
    pub async fn historical(
        &self,
        city: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HistoricalSeries, WeatherError> {
        let start_s = start.format("%Y-%m-%d").to_string();
        let end_s = end.format("%Y-%m-%d").to_string();
        let key = ResponseCache::historical_key(city, &start_s, &end_s);

        if let Some(CachedResponse::Historical(series)) = self.cache.lock().get(&key) {
            tracing::debug!("Historical data from cache: {}", city);
            return Ok(series.clone());
        }

        let coords = self.geocode(city).await?;

        tracing::info!("Fetching historical data: {} {} to {}", city, start_s, end_s);
        let response = self
            .http
            .get(&self.settings.archive_url)
            .query(&[
                ("latitude", coords.latitude.to_string().as_str()),
                ("longitude", coords.longitude.to_string().as_str()),
                ("start_date", start_s.as_str()),
                ("end_date", end_s.as_str()),
                ("daily", ARCHIVE_DAILY_FIELDS),
                ("timezone", coords.timezone.as_str()),
                ("temperature_unit", "celsius"),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::from_reqwest("historical data", e))?;

        if !response.status().is_success() {
            return Err(WeatherError::Fetch {
                operation: "historical data",
                message: format!("status {}", response.status()),
            });
        }

        let body: ArchiveResponse = response.json().await.map_err(|e| WeatherError::Fetch {
            operation: "historical data",
            message: format!("invalid payload: {}", e),
        })?;

        let series = normalize_historical(body, coords)?;
        self.cache.lock().insert(key, CachedResponse::Historical(series.clone()));
        Ok(series)
    }

    /// Fetch current conditions for several cities concurrently.
    ///
    /// All-or-nothing join: a single failure fails the whole batch.
    /// Callers needing partial results should call `current_weather` per
    /// city themselves.
    pub async fn multiple_cities(
        &self,
        cities: &[String],
    ) -> Result<Vec<WeatherSnapshot>, WeatherError> {
        futures::future::try_join_all(cities.iter().map(|city| self.current_weather(city))).await
    }

    /// Discard the timed response cache and the coordinate cache.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
        self.coordinates.lock().clear();
        tracing::info!("Weather caches cleared");
    }

    /// Cache occupancy for debugging.
    pub fn cache_stats(&self) -> CacheStats {
        let mut cached_cities: Vec<String> = self.coordinates.lock().keys().cloned().collect();
        cached_cities.sort();
        CacheStats { cached_responses: self.cache.lock().len(), cached_cities }
    }
}

// --- Provider payloads ---

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeoResult>>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    latitude: f64,
    longitude: f64,
    name: String,
    country: Option<String>,
    timezone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentBlock>,
    hourly: Option<HourlyBlock>,
    daily: Option<DailyBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: f64,
    apparent_temperature: f64,
    relative_humidity_2m: f64,
    wind_speed_10m: f64,
    wind_direction_10m: f64,
    weather_code: i32,
    is_day: i32,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    #[serde(default)]
    pressure_msl: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<NaiveDate>,
    #[serde(default)]
    weather_code: Vec<i32>,
    #[serde(default)]
    temperature_2m_max: Vec<f64>,
    #[serde(default)]
    temperature_2m_min: Vec<f64>,
    #[serde(default)]
    temperature_2m_mean: Vec<f64>,
    #[serde(default)]
    precipitation_sum: Vec<f64>,
    #[serde(default)]
    wind_speed_10m_max: Vec<f64>,
    #[serde(default)]
    sunrise: Vec<String>,
    #[serde(default)]
    sunset: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: Option<DailyBlock>,
}

// --- Normalization ---

fn normalize_current(
    body: ForecastResponse,
    coords: &Coordinates,
) -> Result<WeatherSnapshot, WeatherError> {
    let current = body.current.ok_or(WeatherError::Fetch {
        operation: "current weather",
        message: "current block missing from response".to_string(),
    })?;

    let pressure = body
        .hourly
        .and_then(|h| h.pressure_msl.first().copied())
        .unwrap_or(1013.0);

    Ok(WeatherSnapshot {
        city: coords.name.clone(),
        country: coords.country.clone(),
        timezone: coords.timezone.clone(),
        temperature: current.temperature_2m,
        feels_like: current.apparent_temperature,
        humidity: current.relative_humidity_2m,
        pressure,
        wind_speed: current.wind_speed_10m,
        wind_direction: current.wind_direction_10m,
        is_day: current.is_day != 0,
        condition: WeatherCondition::from_wmo_code(current.weather_code),
        wmo_code: current.weather_code,
        fetched_at: Utc::now(),
    })
}

fn normalize_forecast(
    body: ForecastResponse,
    coords: &Coordinates,
) -> Result<ForecastSeries, WeatherError> {
    let daily = body.daily.ok_or(WeatherError::Fetch {
        operation: "forecast",
        message: "daily block missing from response".to_string(),
    })?;

    let days = daily
        .time
        .iter()
        .enumerate()
        .map(|(i, date)| {
            let max = value_at(&daily.temperature_2m_max, i);
            let min = value_at(&daily.temperature_2m_min, i);
            // The provider omits the mean series for some locations.
            let mean = daily.temperature_2m_mean.get(i).copied().unwrap_or((max + min) / 2.0);

            DayForecast {
                date: *date,
                temp_min: min,
                temp_mean: mean,
                temp_max: max,
                condition: WeatherCondition::from_wmo_code(
                    daily.weather_code.get(i).copied().unwrap_or(-1),
                ),
                wind_speed: value_at(&daily.wind_speed_10m_max, i),
                precipitation: value_at(&daily.precipitation_sum, i),
                sunrise: daily.sunrise.get(i).and_then(|s| parse_local_instant(s)),
                sunset: daily.sunset.get(i).and_then(|s| parse_local_instant(s)),
            }
        })
        .collect();

    Ok(ForecastSeries {
        city: coords.name.clone(),
        country: coords.country.clone(),
        latitude: coords.latitude,
        longitude: coords.longitude,
        days,
    })
}

fn normalize_historical(
    body: ArchiveResponse,
    coords: Coordinates,
) -> Result<HistoricalSeries, WeatherError> {
    let daily = body.daily.ok_or(WeatherError::Fetch {
        operation: "historical data",
        message: "daily data missing from response".to_string(),
    })?;

    if daily.time.is_empty() {
        return Err(WeatherError::Fetch {
            operation: "historical data",
            message: "empty daily data in response".to_string(),
        });
    }

    let len = daily.time.len();
    let temperature_max: Vec<f64> = (0..len).map(|i| value_at(&daily.temperature_2m_max, i)).collect();
    let temperature_min: Vec<f64> = (0..len).map(|i| value_at(&daily.temperature_2m_min, i)).collect();
    // Mean of max and min; the archive API has no mean series.
    let temperature = temperature_max
        .iter()
        .zip(&temperature_min)
        .map(|(max, min)| (max + min) / 2.0)
        .collect();

    tracing::debug!("Historical data normalized: {} days for {}", len, coords.name);

    Ok(HistoricalSeries {
        timestamps: daily.time,
        temperature,
        temperature_max,
        temperature_min,
        precipitation: (0..len).map(|i| value_at(&daily.precipitation_sum, i)).collect(),
        wind_speed: (0..len).map(|i| value_at(&daily.wind_speed_10m_max, i)).collect(),
        coordinates: coords,
    })
}

fn value_at(values: &[f64], index: usize) -> f64 {
    values.get(index).copied().unwrap_or(0.0)
}

/// Sunrise/sunset arrive as local ISO datetimes, e.g. `2024-06-21T04:14`.
fn parse_local_instant(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> WeatherClient {
        test_client_with_timeout(server, Duration::from_secs(5))
    }

    fn test_client_with_timeout(server: &MockServer, timeout: Duration) -> WeatherClient {
        WeatherClient::new(WeatherSettings {
            geocoding_url: format!("{}/geocode", server.uri()),
            forecast_url: format!("{}/forecast", server.uri()),
            archive_url: format!("{}/archive", server.uri()),
            request_timeout: timeout,
            ..WeatherSettings::default()
        })
        .unwrap()
    }

    fn geocode_body(name: &str) -> serde_json::Value {
        serde_json::json!({
            "results": [{
                "latitude": 52.2297,
                "longitude": 21.0122,
                "name": name,
                "country": "Poland",
                "timezone": "Europe/Warsaw"
            }]
        })
    }

    fn current_body() -> serde_json::Value {
        serde_json::json!({
            "current": {
                "temperature_2m": 21.5,
                "apparent_temperature": 20.1,
                "relative_humidity_2m": 48.0,
                "wind_speed_10m": 12.3,
                "wind_direction_10m": 230.0,
                "weather_code": 61,
                "is_day": 1
            },
            "hourly": { "pressure_msl": [1017.2, 1016.8] }
        })
    }

    fn forecast_body() -> serde_json::Value {
        serde_json::json!({
            "daily": {
                "time": ["2024-06-20", "2024-06-21"],
                "weather_code": [0, 95],
                "temperature_2m_max": [24.0, 19.0],
                "temperature_2m_min": [14.0, 11.0],
                "temperature_2m_mean": [19.0, 15.0],
                "precipitation_sum": [0.0, 7.4],
                "wind_speed_10m_max": [10.0, 22.0],
                "sunrise": ["2024-06-20T04:14", "2024-06-21T04:14"],
                "sunset": ["2024-06-20T21:01", "2024-06-21T21:01"]
            }
        })
    }

    async fn mount_geocode(server: &MockServer, city: &str, expect: u64) {
        Mock::given(method("GET"))
            .and(path("/geocode"))
            .and(query_param("name", city))
            .respond_with(ResponseTemplate::new(200).set_body_json(geocode_body(city)))
            .expect(expect)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_geocode_takes_first_result_and_caches_it() {
        let server = MockServer::start().await;
        mount_geocode(&server, "Warsaw", 1).await;

        let client = test_client(&server);
        let first = client.geocode("Warsaw").await.unwrap();
        let second = client.geocode("Warsaw").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.name, "Warsaw");
        assert_eq!(first.timezone, "Europe/Warsaw");
        assert_eq!(client.cache_stats().cached_cities, vec!["Warsaw".to_string()]);
    }

    #[tokio::test]
    async fn test_geocode_zero_results_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": []
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.current_weather("Xyzzyqqq123").await.unwrap_err();

        assert!(matches!(err, WeatherError::NotFound(_)));
        assert!(err.to_string().contains("Xyzzyqqq123"));
        // Failed lookups must not populate any cache entry.
        let stats = client.cache_stats();
        assert_eq!(stats.cached_responses, 0);
        assert!(stats.cached_cities.is_empty());
    }

    #[tokio::test]
    async fn test_geocode_http_error_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.geocode("Warsaw").await.unwrap_err();
        assert!(matches!(err, WeatherError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_current_weather_normalizes_payload() {
        let server = MockServer::start().await;
        mount_geocode(&server, "Warsaw", 1).await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let snapshot = client.current_weather("Warsaw").await.unwrap();

        assert_eq!(snapshot.city, "Warsaw");
        assert_eq!(snapshot.country, "Poland");
        assert!((snapshot.temperature - 21.5).abs() < f64::EPSILON);
        assert!((snapshot.pressure - 1017.2).abs() < f64::EPSILON);
        assert_eq!(snapshot.condition, WeatherCondition::Rain);
        assert!(snapshot.is_day);
    }

    #[tokio::test]
    async fn test_current_weather_cache_hit_skips_network() {
        let server = MockServer::start().await;
        mount_geocode(&server, "Warsaw", 1).await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let first = client.current_weather("Warsaw").await.unwrap();
        let second = client.current_weather("Warsaw").await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_forecast_and_current_do_not_share_cache_entries() {
        let server = MockServer::start().await;
        mount_geocode(&server, "Paris", 1).await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("daily", FORECAST_DAILY_FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("current", CURRENT_FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let series = client.forecast("Paris").await.unwrap();
        // Populating the forecast entry must not satisfy the current lookup.
        let snapshot = client.current_weather("Paris").await.unwrap();

        assert_eq!(series.days.len(), 2);
        assert_eq!(snapshot.city, "Paris");
        assert_eq!(client.cache_stats().cached_responses, 2);
    }

    #[tokio::test]
    async fn test_forecast_parses_days_in_order() {
        let server = MockServer::start().await;
        mount_geocode(&server, "Warsaw", 1).await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let series = client.forecast("Warsaw").await.unwrap();

        assert_eq!(series.days[0].condition, WeatherCondition::Clear);
        assert_eq!(series.days[1].condition, WeatherCondition::Thunderstorm);
        assert!(series.days[0].date < series.days[1].date);
        assert!((series.days[1].temp_mean - 15.0).abs() < f64::EPSILON);
        let sunrise = series.days[0].sunrise.unwrap();
        assert_eq!(sunrise.format("%H:%M").to_string(), "04:14");
    }

    #[tokio::test]
    async fn test_historical_parses_parallel_arrays() {
        let server = MockServer::start().await;
        mount_geocode(&server, "Warsaw", 1).await;
        Mock::given(method("GET"))
            .and(path("/archive"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "daily": {
                    "time": ["2020-01-01", "2020-01-02"],
                    "temperature_2m_max": [4.0, 6.0],
                    "temperature_2m_min": [-2.0, 0.0],
                    "precipitation_sum": [1.2, 0.0],
                    "wind_speed_10m_max": [18.0, 9.0]
                }
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        let series = client.historical("Warsaw", start, end).await.unwrap();

        assert_eq!(series.timestamps.len(), 2);
        assert_eq!(series.temperature.len(), 2);
        assert_eq!(series.precipitation.len(), 2);
        assert_eq!(series.wind_speed.len(), 2);
        assert!((series.temperature[0] - 1.0).abs() < f64::EPSILON); // (4 + -2) / 2
    }

    #[tokio::test]
    async fn test_historical_missing_daily_is_fetch_error() {
        let server = MockServer::start().await;
        mount_geocode(&server, "Warsaw", 1).await;
        Mock::given(method("GET"))
            .and(path("/archive"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        let err = client.historical("Warsaw", start, end).await.unwrap_err();

        assert!(matches!(err, WeatherError::Fetch { operation: "historical data", .. }));
        assert!(err.to_string().contains("daily"));
    }

    #[tokio::test]
    async fn test_server_error_is_fetch_error_with_operation() {
        let server = MockServer::start().await;
        mount_geocode(&server, "Warsaw", 1).await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.current_weather("Warsaw").await.unwrap_err();
        assert!(matches!(err, WeatherError::Fetch { operation: "current weather", .. }));
    }

    #[tokio::test]
    async fn test_slow_response_surfaces_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(geocode_body("Warsaw"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = test_client_with_timeout(&server, Duration::from_millis(100));
        let err = client.current_weather("Warsaw").await.unwrap_err();
        assert!(matches!(err, WeatherError::Timeout));
    }

    #[tokio::test]
    async fn test_multiple_cities_is_all_or_nothing() {
        let server = MockServer::start().await;
        // No request-count expectation here: the failing city cancels the
        // batch and may abort the other city's requests mid-flight.
        Mock::given(method("GET"))
            .and(path("/geocode"))
            .and(query_param("name", "Warsaw"))
            .respond_with(ResponseTemplate::new(200).set_body_json(geocode_body("Warsaw")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/geocode"))
            .and(query_param("name", "Nowhere"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": []
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .multiple_cities(&["Warsaw".to_string(), "Nowhere".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_clear_cache_drops_both_caches() {
        let server = MockServer::start().await;
        mount_geocode(&server, "Warsaw", 1).await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .mount(&server)
            .await;

        let client = test_client(&server);
        client.current_weather("Warsaw").await.unwrap();
        assert_eq!(client.cache_stats().cached_responses, 1);

        client.clear_cache();
        let stats = client.cache_stats();
        assert_eq!(stats.cached_responses, 0);
        assert!(stats.cached_cities.is_empty());
    }
}
