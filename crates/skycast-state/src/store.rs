use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use skycast_auth::types::UserInfo;
use skycast_auth::{AuthError, AuthService};
use skycast_core::LocalStore;
use skycast_weather::types::{ForecastSeries, HistoricalSeries, WeatherSnapshot};

use crate::state::{AppState, StateChange, StateField, StateUpdate, Theme};

/// Persisted mirror keys.
const USER_KEY: &str = "user";
const LAST_CITY_KEY: &str = "last_city";

/// The change log keeps the most recent transitions only.
const CHANGE_HISTORY_CAP: usize = 50;

type Callback = dyn Fn(&StateChange) + Send + Sync;

struct SubscriberEntry {
    id: u64,
    /// `None` subscribes to every field.
    field: Option<StateField>,
    callback: Arc<Callback>,
}

#[derive(Default)]
struct SubscriberList {
    next_id: u64,
    entries: Vec<SubscriberEntry>,
}

/// Handle returned by [`StateStore::subscribe`]. Dropping it does NOT
/// cancel the registration; call [`Subscription::unsubscribe`].
pub struct Subscription {
    registry: Arc<Mutex<SubscriberList>>,
    id: u64,
}

impl Subscription {
    /// Remove exactly this registration. Other subscriptions, including
    /// ones sharing the same callback, are untouched.
    pub fn unsubscribe(self) {
        self.registry.lock().entries.retain(|e| e.id != self.id);
    }
}

/// Observable holder of [`AppState`].
///
/// Writes notify subscribers synchronously before the setter returns, field
/// subscribers first, then wildcard subscribers, each group in registration
/// order. A subscriber may write back into the store from its callback;
/// there is no cycle guard, so a callback that unconditionally writes the
/// field it observes will loop.
pub struct StateStore {
    state: Mutex<AppState>,
    changes: Mutex<VecDeque<StateChange>>,
    subscribers: Arc<Mutex<SubscriberList>>,
    storage: Arc<LocalStore>,
}

impl StateStore {
    /// Build the store, seeding `user` and `current_city` from storage.
    pub fn new(storage: Arc<LocalStore>) -> Self {
        let mut state = AppState::default();

        match storage.get::<UserInfo>(USER_KEY) {
            Ok(user) => state.user = user,
            Err(e) => tracing::warn!("Ignoring persisted user: {}", e),
        }
        match storage.get::<String>(LAST_CITY_KEY) {
            Ok(city) => state.current_city = city,
            Err(e) => tracing::warn!("Ignoring persisted city: {}", e),
        }

        Self {
            state: Mutex::new(state),
            changes: Mutex::new(VecDeque::new()),
            subscribers: Arc::new(Mutex::new(SubscriberList::default())),
            storage,
        }
    }

    // --- Subscriptions ---

    /// Observe one field.
    pub fn subscribe<F>(&self, field: StateField, callback: F) -> Subscription
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        self.register(Some(field), Arc::new(callback))
    }

    /// Observe every field.
    pub fn subscribe_all<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        self.register(None, Arc::new(callback))
    }

    fn register(&self, field: Option<StateField>, callback: Arc<Callback>) -> Subscription {
        let mut list = self.subscribers.lock();
        let id = list.next_id;
        list.next_id += 1;
        list.entries.push(SubscriberEntry { id, field, callback });
        Subscription { registry: Arc::clone(&self.subscribers), id }
    }

    // --- Reads ---

    pub fn state(&self) -> AppState {
        self.state.lock().clone()
    }

    pub fn current_city(&self) -> Option<String> {
        self.state.lock().current_city.clone()
    }

    pub fn current_weather(&self) -> Option<WeatherSnapshot> {
        self.state.lock().current_weather.clone()
    }

    pub fn forecast(&self) -> Option<ForecastSeries> {
        self.state.lock().forecast.clone()
    }

    pub fn historical_data(&self) -> Option<HistoricalSeries> {
        self.state.lock().historical_data.clone()
    }

    pub fn favorites(&self) -> Vec<String> {
        self.state.lock().favorites.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn theme(&self) -> Theme {
        self.state.lock().theme
    }

    pub fn user(&self) -> Option<UserInfo> {
        self.state.lock().user.clone()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.state.lock().last_updated
    }

    /// Recent changes, oldest first, at most 50.
    pub fn change_history(&self) -> Vec<StateChange> {
        self.changes.lock().iter().cloned().collect()
    }

    // --- Writes ---
    //
    // Each setter compares the incoming value with the current one and
    // returns without side effects when they are equal. Effective writes
    // record a change, mirror persisted fields, and notify.

    pub fn set_current_city(&self, city: Option<String>) {
        let changed = self.write(StateField::CurrentCity, |s| {
            replace_if_changed(&mut s.current_city, city)
        });
        if changed {
            self.persist_city();
        }
    }

    /// Also bumps `last_updated` when the snapshot actually changed.
    pub fn set_current_weather(&self, weather: Option<WeatherSnapshot>) {
        let changed = self.write(StateField::CurrentWeather, |s| {
            replace_if_changed(&mut s.current_weather, weather)
        });
        if changed {
            self.set_last_updated(Some(Utc::now()));
        }
    }

    pub fn set_forecast(&self, forecast: Option<ForecastSeries>) {
        self.write(StateField::Forecast, |s| replace_if_changed(&mut s.forecast, forecast));
    }

    pub fn set_historical_data(&self, data: Option<HistoricalSeries>) {
        self.write(StateField::HistoricalData, |s| {
            replace_if_changed(&mut s.historical_data, data)
        });
    }

    pub fn set_favorites(&self, favorites: Vec<String>) {
        self.write(StateField::Favorites, |s| replace_if_changed(&mut s.favorites, favorites));
    }

    pub fn set_loading(&self, loading: bool) {
        self.write(StateField::IsLoading, |s| replace_if_changed(&mut s.is_loading, loading));
    }

    pub fn set_error(&self, error: Option<String>) {
        self.write(StateField::Error, |s| replace_if_changed(&mut s.error, error));
    }

    pub fn set_theme(&self, theme: Theme) {
        self.write(StateField::Theme, |s| replace_if_changed(&mut s.theme, theme));
    }

    pub fn set_user(&self, user: Option<UserInfo>) {
        let changed = self.write(StateField::User, |s| replace_if_changed(&mut s.user, user));
        if changed {
            self.persist_user();
        }
    }

    pub fn set_last_updated(&self, at: Option<DateTime<Utc>>) {
        self.write(StateField::LastUpdated, |s| replace_if_changed(&mut s.last_updated, at));
    }

    /// Apply one pending update through the matching setter.
    pub fn apply(&self, update: StateUpdate) {
        tracing::trace!(field = ?update.field(), "Applying update");
        match update {
            StateUpdate::CurrentCity(v) => self.set_current_city(v),
            StateUpdate::CurrentWeather(v) => self.set_current_weather(v),
            StateUpdate::Forecast(v) => self.set_forecast(v),
            StateUpdate::HistoricalData(v) => self.set_historical_data(v),
            StateUpdate::Favorites(v) => self.set_favorites(v),
            StateUpdate::IsLoading(v) => self.set_loading(v),
            StateUpdate::Error(v) => self.set_error(v),
            StateUpdate::Theme(v) => self.set_theme(v),
            StateUpdate::User(v) => self.set_user(v),
            StateUpdate::LastUpdated(v) => self.set_last_updated(v),
        }
    }

    /// Apply updates in order. Each one fires its own notification, so
    /// observers can see intermediate combinations.
    pub fn apply_all(&self, updates: Vec<StateUpdate>) {
        for update in updates {
            self.apply(update);
        }
    }

    /// Put every field back to its default value, notifying per field.
    pub fn reset(&self) {
        self.apply_all(vec![
            StateUpdate::CurrentCity(None),
            StateUpdate::CurrentWeather(None),
            StateUpdate::Forecast(None),
            StateUpdate::HistoricalData(None),
            StateUpdate::Favorites(Vec::new()),
            StateUpdate::IsLoading(false),
            StateUpdate::Error(None),
            StateUpdate::Theme(Theme::default()),
            StateUpdate::User(None),
            StateUpdate::LastUpdated(None),
        ]);
    }

    // --- Domain mutators ---

    /// Add or remove a favorite through the credential store, then mirror
    /// its authoritative list into state.
    ///
    /// Membership is decided from the credential store's list, not the
    /// in-memory mirror, so a stale mirror cannot flip the direction.
    pub fn toggle_favorite(&self, auth: &AuthService, city: &str) -> Result<(), AuthError> {
        let currently_favorite = auth.favorites()?.iter().any(|c| c == city);
        if currently_favorite {
            auth.remove_favorite(city)?;
        } else {
            auth.add_favorite(city)?;
        }
        self.set_favorites(auth.favorites()?);
        Ok(())
    }

    /// Log in and mirror the user and their favorites into state.
    pub fn login_user(
        &self,
        auth: &AuthService,
        username_or_email: &str,
        password: &str,
    ) -> Result<UserInfo, AuthError> {
        let user = auth.login(username_or_email, password)?;
        self.set_user(Some(user.clone()));
        self.set_favorites(auth.favorites()?);
        Ok(user)
    }

    /// Log out and clear the mirrored user and favorites.
    pub fn logout_user(&self, auth: &AuthService) -> Result<(), AuthError> {
        auth.logout()?;
        self.set_user(None);
        self.set_favorites(Vec::new());
        Ok(())
    }

    // --- Internals ---

    /// Run the mutation under the state lock; when it reports a change,
    /// record it and notify with both locks released.
    fn write<F>(&self, field: StateField, mutate: F) -> bool
    where
        F: FnOnce(&mut AppState) -> Option<(Value, Value)>,
    {
        let change = {
            let mut state = self.state.lock();
            let Some((old_value, new_value)) = mutate(&mut *state) else {
                return false;
            };
            StateChange { timestamp: Utc::now(), field, old_value, new_value }
        };

        {
            let mut changes = self.changes.lock();
            if changes.len() == CHANGE_HISTORY_CAP {
                changes.pop_front();
            }
            changes.push_back(change.clone());
        }

        self.notify(&change);
        true
    }

    fn notify(&self, change: &StateChange) {
        // Snapshot the callbacks so subscribers can subscribe, unsubscribe
        // or write state from inside their callback without deadlocking.
        let callbacks: Vec<Arc<Callback>> = {
            let list = self.subscribers.lock();
            list.entries
                .iter()
                .filter(|e| e.field == Some(change.field))
                .map(|e| Arc::clone(&e.callback))
                .chain(
                    list.entries
                        .iter()
                        .filter(|e| e.field.is_none())
                        .map(|e| Arc::clone(&e.callback)),
                )
                .collect()
        };

        for callback in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(change))).is_err() {
                tracing::error!(field = ?change.field, "State subscriber panicked");
            }
        }
    }

    fn persist_user(&self) {
        let user = self.state.lock().user.clone();
        let result = match &user {
            Some(user) => self.storage.set(USER_KEY, user),
            None => self.storage.remove(USER_KEY),
        };
        if let Err(e) = result {
            tracing::warn!("Failed to persist user: {}", e);
        }
    }

    fn persist_city(&self) {
        let city = self.state.lock().current_city.clone();
        let result = match &city {
            Some(city) => self.storage.set(LAST_CITY_KEY, city),
            None => self.storage.remove(LAST_CITY_KEY),
        };
        if let Err(e) = result {
            tracing::warn!("Failed to persist city: {}", e);
        }
    }
}

/// Swap in `new` when it differs from `*slot`, returning the old and new
/// values as JSON for the change log.
fn replace_if_changed<T>(slot: &mut T, new: T) -> Option<(Value, Value)>
where
    T: PartialEq + serde::Serialize,
{
    if *slot == new {
        return None;
    }
    let old_value = to_json(&*slot);
    let new_value = to_json(&new);
    *slot = new;
    Some((old_value, new_value))
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
