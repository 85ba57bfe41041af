use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Availability of a piece of media as reported by Overseerr.
///
/// The backend encodes this as an integer 1-5. Codes outside that range
/// (including an absent field, which defaults to 1) resolve to `Unknown`
/// rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaStatus {
    Unknown,
    Pending,
    Processing,
    PartiallyAvailable,
    Available,
}

impl MediaStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => MediaStatus::Pending,
            3 => MediaStatus::Processing,
            4 => MediaStatus::PartiallyAvailable,
            5 => MediaStatus::Available,
            _ => MediaStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaStatus::Unknown => "UNKNOWN",
            MediaStatus::Pending => "PENDING",
            MediaStatus::Processing => "PROCESSING",
            MediaStatus::PartiallyAvailable => "PARTIALLY_AVAILABLE",
            MediaStatus::Available => "AVAILABLE",
        }
    }
}

impl fmt::Display for MediaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request-list filter accepted by `GET /api/v1/request`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFilter {
    All,
    Approved,
    Available,
    Pending,
    Processing,
    Unavailable,
    Failed,
}

impl RequestFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestFilter::All => "all",
            RequestFilter::Approved => "approved",
            RequestFilter::Available => "available",
            RequestFilter::Pending => "pending",
            RequestFilter::Processing => "processing",
            RequestFilter::Unavailable => "unavailable",
            RequestFilter::Failed => "failed",
        }
    }
}

impl FromStr for RequestFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(RequestFilter::All),
            "approved" => Ok(RequestFilter::Approved),
            "available" => Ok(RequestFilter::Available),
            "pending" => Ok(RequestFilter::Pending),
            "processing" => Ok(RequestFilter::Processing),
            "unavailable" => Ok(RequestFilter::Unavailable),
            "failed" => Ok(RequestFilter::Failed),
            other => Err(format!(
                "unknown status filter '{}', expected one of all, approved, available, pending, processing, unavailable, failed",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRequestSummary {
    pub title: String,
    pub media_availability: MediaStatus,
    pub request_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvEpisodeSummary {
    pub episode_number: String,
    pub episode_name: String,
}

/// One season of one TV request. A single raw request expands into one of
/// these per non-special season, since each season needs its own episode
/// lookup. Season availability mirrors the show-level value; Overseerr is
/// not queried per season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvRequestSummary {
    pub tv_title: String,
    pub tv_title_availability: MediaStatus,
    pub tv_season: String,
    pub tv_season_availability: MediaStatus,
    pub tv_episodes: Vec<TvEpisodeSummary>,
    pub request_date: String,
}
