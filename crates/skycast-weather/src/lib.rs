//! Weather data layer for Skycast.
//!
//! Wraps the Open-Meteo geocoding, forecast and archive APIs, memoizes
//! responses with a time-based expiry, and normalizes provider payloads
//! into the internal shapes the rest of the app consumes.

pub mod cache;
pub mod client;
pub mod error;
pub mod types;

pub use client::{CacheStats, WeatherClient, WeatherSettings};
pub use error::WeatherError;
pub use types::{
    Coordinates, DayForecast, ForecastSeries, HistoricalSeries, WeatherCondition, WeatherSnapshot,
};
