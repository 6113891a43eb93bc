use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use skycast_app::{AppController, AppEvent};
use skycast_auth::AuthService;
use skycast_core::{Config, LocalStore};
use skycast_state::StateStore;
use skycast_weather::{WeatherClient, WeatherSettings};

#[tokio::main]
async fn main() -> Result<()> {
    skycast_core::init();

    let config = Config::load().context("loading configuration")?;
    let validation = config.validate();
    if !validation.is_valid() {
        anyhow::bail!("invalid configuration: {}", validation.error_summary());
    }

    let storage = Arc::new(
        LocalStore::open(&config.config_dir.join("data")).context("opening local storage")?,
    );
    let auth = Arc::new(AuthService::new(Arc::clone(&storage))?);
    let store = Arc::new(StateStore::new(Arc::clone(&storage)));
    let weather = Arc::new(WeatherClient::new(WeatherSettings {
        geocoding_url: config.api.geocoding_url.clone(),
        forecast_url: config.api.forecast_url.clone(),
        archive_url: config.api.archive_url.clone(),
        language: config.api.language.clone(),
        fallback_timezone: config.api.timezone.clone(),
        request_timeout: Duration::from_secs(config.app.request_timeout_secs),
        cache_ttl: Duration::from_secs(config.app.cache_duration_secs),
    })?);

    let controller =
        AppController::new(Arc::clone(&store), weather, auth, Arc::clone(&storage));

    tracing::info!("Skycast started");

    // Last viewed city wins over the configured default.
    let city = store.current_city().unwrap_or_else(|| config.app.default_city.clone());
    controller.handle(AppEvent::Search { city: city.clone() }).await;

    println!("Skycast - Weather Dashboard");
    println!("Config directory: {}", config.config_dir.display());

    let state = store.state();
    match (&state.current_weather, &state.error) {
        (Some(weather), _) => {
            println!(
                "\n{}, {}: {:.1}°C (feels like {:.1}°C), {}",
                weather.city,
                weather.country,
                weather.temperature,
                weather.feels_like,
                weather.condition.description()
            );
            println!(
                "Humidity {:.0}%, wind {:.1} km/h",
                weather.humidity, weather.wind_speed
            );
            if let Some(forecast) = &state.forecast {
                println!("\nNext days:");
                for day in &forecast.days {
                    println!(
                        "  {}  {:>5.1}°C / {:>5.1}°C  {}",
                        day.date,
                        day.temp_min,
                        day.temp_max,
                        day.condition.description()
                    );
                }
            }
        }
        (None, Some(error)) => println!("\nCould not load weather for {}: {}", city, error),
        (None, None) => println!("\nNo weather data for {}", city),
    }

    Ok(())
}
