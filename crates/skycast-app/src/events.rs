use chrono::NaiveDate;

use skycast_auth::types::UserInfo;

/// User-facing events the controller reacts to.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A city was typed into the search box.
    Search { city: String },
    /// A past date range was requested for the charts.
    HistoricalRequested { city: String, start: NaiveDate, end: NaiveDate },
    /// Login or registration finished.
    AuthComplete { user: UserInfo },
    /// A search-history entry was clicked.
    HistorySelect { city: String },
    /// A favorite city was clicked.
    FavoriteSelected { city: String },
}
