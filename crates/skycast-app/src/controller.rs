use chrono::NaiveDate;
use std::sync::Arc;

use skycast_auth::types::UserInfo;
use skycast_auth::AuthService;
use skycast_core::LocalStore;
use skycast_state::{StateStore, Theme};
use skycast_weather::WeatherClient;

use crate::events::AppEvent;

const THEME_KEY: &str = "theme";

/// Connects events to the weather client, the credential store and the
/// state store. Holds shared handles; all collaborators are passed in.
pub struct AppController {
    store: Arc<StateStore>,
    weather: Arc<WeatherClient>,
    auth: Arc<AuthService>,
    storage: Arc<LocalStore>,
}

impl AppController {
    pub fn new(
        store: Arc<StateStore>,
        weather: Arc<WeatherClient>,
        auth: Arc<AuthService>,
        storage: Arc<LocalStore>,
    ) -> Self {
        // Theme is persisted outside the state mirror.
        match storage.get::<Theme>(THEME_KEY) {
            Ok(Some(theme)) => store.set_theme(theme),
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring persisted theme: {}", e),
        }

        Self { store, weather, auth, storage }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Dispatch one event.
    pub async fn handle(&self, event: AppEvent) {
        tracing::debug!(?event, "Handling event");
        match event {
            AppEvent::Search { city }
            | AppEvent::HistorySelect { city }
            | AppEvent::FavoriteSelected { city } => self.load_city(&city).await,
            AppEvent::HistoricalRequested { city, start, end } => {
                self.load_historical(&city, start, end).await;
            }
            AppEvent::AuthComplete { user } => self.complete_auth(user),
        }
    }

    /// Fetch current weather and the forecast for a city and publish both.
    ///
    /// Loading is raised before the fetch and always cleared afterwards;
    /// failures land in the `error` field as a user-facing message.
    pub async fn load_city(&self, city: &str) {
        self.store.set_loading(true);
        self.store.set_error(None);

        let result =
            tokio::try_join!(self.weather.current_weather(city), self.weather.forecast(city));

        match result {
            Ok((current, forecast)) => {
                self.store.set_current_city(Some(current.city.clone()));
                if let Err(e) = self.auth.add_history(
                    &current.city,
                    current.temperature,
                    current.condition.description(),
                ) {
                    tracing::warn!("Failed to record search: {}", e);
                }
                self.store.set_current_weather(Some(current));
                self.store.set_forecast(Some(forecast));
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", city, e);
                self.store.set_error(Some(e.user_message()));
            }
        }

        self.store.set_loading(false);
    }

    /// Fetch historical daily aggregates for the charts.
    pub async fn load_historical(&self, city: &str, start: NaiveDate, end: NaiveDate) {
        self.store.set_loading(true);
        self.store.set_error(None);

        match self.weather.historical(city, start, end).await {
            Ok(series) => self.store.set_historical_data(Some(series)),
            Err(e) => {
                tracing::warn!("Failed to load history for {}: {}", city, e);
                self.store.set_error(Some(e.user_message()));
            }
        }

        self.store.set_loading(false);
    }

    /// Mirror a freshly signed-in user and their favorites into state.
    fn complete_auth(&self, user: UserInfo) {
        self.store.set_user(Some(user));
        match self.auth.favorites() {
            Ok(favorites) => self.store.set_favorites(favorites),
            Err(e) => tracing::warn!("Failed to read favorites: {}", e),
        }
    }

    /// Flip the theme and persist the choice.
    pub fn toggle_theme(&self) -> Theme {
        let theme = self.store.theme().toggled();
        self.store.set_theme(theme);
        if let Err(e) = self.storage.set(THEME_KEY, &theme) {
            tracing::warn!("Failed to persist theme: {}", e);
        }
        theme
    }
}
