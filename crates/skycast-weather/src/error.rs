//! Weather layer error types.

use thiserror::Error;

/// Errors surfaced by the fetch layer.
///
/// Timeouts are deliberately distinguishable from other network failures
/// so the UI can suggest a retry instead of reporting a broken city name.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Geocoding found no match for the place name.
    #[error("City not found: {0}")]
    NotFound(String),

    /// The request did not complete within the configured duration.
    #[error("Request timed out")]
    Timeout,

    /// Non-success HTTP status or structurally invalid payload.
    #[error("{operation} failed: {message}")]
    Fetch { operation: &'static str, message: String },
}

impl WeatherError {
    /// Classify a reqwest error, preserving the operation name for logs.
    pub(crate) fn from_reqwest(operation: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WeatherError::Timeout
        } else {
            WeatherError::Fetch { operation, message: err.to_string() }
        }
    }

    /// User-friendly message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::NotFound(city) => {
                format!("City not found: {}. Check the name and try again.", city)
            }
            WeatherError::Timeout => "The request timed out. Please try again.".to_string(),
            WeatherError::Fetch { .. } => "Weather service error. Please try again.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_mentions_city() {
        let err = WeatherError::NotFound("Xyzzyqqq123".into());
        assert!(err.to_string().contains("Xyzzyqqq123"));
        assert!(err.user_message().contains("Xyzzyqqq123"));
    }

    #[test]
    fn test_fetch_mentions_operation() {
        let err = WeatherError::Fetch { operation: "forecast", message: "status 500".into() };
        assert!(err.to_string().starts_with("forecast"));
    }
}
