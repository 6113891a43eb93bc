use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use skycast_auth::types::UserInfo;
use skycast_weather::types::{ForecastSeries, HistoricalSeries, WeatherSnapshot};

/// UI color theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Everything the dashboard renders from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub current_city: Option<String>,
    pub current_weather: Option<WeatherSnapshot>,
    pub forecast: Option<ForecastSeries>,
    pub historical_data: Option<HistoricalSeries>,
    pub favorites: Vec<String>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub theme: Theme,
    pub user: Option<UserInfo>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// One field of [`AppState`], used to scope subscriptions and label changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateField {
    CurrentCity,
    CurrentWeather,
    Forecast,
    HistoricalData,
    Favorites,
    IsLoading,
    Error,
    Theme,
    User,
    LastUpdated,
}

/// A recorded state transition. Values are kept as JSON so the change log
/// stays uniform across field types.
#[derive(Debug, Clone, Serialize)]
pub struct StateChange {
    pub timestamp: DateTime<Utc>,
    pub field: StateField,
    pub old_value: Value,
    pub new_value: Value,
}

/// A pending write, for applying several fields in one call.
#[derive(Debug, Clone)]
pub enum StateUpdate {
    CurrentCity(Option<String>),
    CurrentWeather(Option<WeatherSnapshot>),
    Forecast(Option<ForecastSeries>),
    HistoricalData(Option<HistoricalSeries>),
    Favorites(Vec<String>),
    IsLoading(bool),
    Error(Option<String>),
    Theme(Theme),
    User(Option<UserInfo>),
    LastUpdated(Option<DateTime<Utc>>),
}

impl StateUpdate {
    pub fn field(&self) -> StateField {
        match self {
            StateUpdate::CurrentCity(_) => StateField::CurrentCity,
            StateUpdate::CurrentWeather(_) => StateField::CurrentWeather,
            StateUpdate::Forecast(_) => StateField::Forecast,
            StateUpdate::HistoricalData(_) => StateField::HistoricalData,
            StateUpdate::Favorites(_) => StateField::Favorites,
            StateUpdate::IsLoading(_) => StateField::IsLoading,
            StateUpdate::Error(_) => StateField::Error,
            StateUpdate::Theme(_) => StateField::Theme,
            StateUpdate::User(_) => StateField::User,
            StateUpdate::LastUpdated(_) => StateField::LastUpdated,
        }
    }
}
