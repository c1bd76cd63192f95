pub mod export;
pub mod mock;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A `[longitude, latitude]` pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates(pub f64, pub f64);

impl Coordinates {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self(lng, lat)
    }

    pub fn lng(&self) -> f64 {
        self.0
    }

    pub fn lat(&self) -> f64 {
        self.1
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self(lng, lat)
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.0, c.1]
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.1 >= 0.0 { 'N' } else { 'S' };
        let ew = if self.0 >= 0.0 { 'E' } else { 'W' };
        write!(f, "{:.4}°{} {:.4}°{}", self.1.abs(), ns, self.0.abs(), ew)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    pub id: String,
    pub text: String,
    pub username: String,
    pub display_name: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<TweetLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

impl Tweet {
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.location.as_ref().and_then(|l| l.coordinates)
    }

    pub fn place_name(&self) -> Option<&str> {
        self.location
            .as_ref()
            .and_then(|l| l.place_name.as_deref())
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateRange {
    #[serde(rename = "1d")]
    Day,
    #[serde(rename = "3d")]
    ThreeDays,
    #[default]
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl DateRange {
    pub const ALL: [DateRange; 4] = [
        DateRange::Day,
        DateRange::ThreeDays,
        DateRange::Week,
        DateRange::Month,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            DateRange::Day => "1d",
            DateRange::ThreeDays => "3d",
            DateRange::Week => "7d",
            DateRange::Month => "30d",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateRange::Day => "Last 24 hours",
            DateRange::ThreeDays => "Last 3 days",
            DateRange::Week => "Last week",
            DateRange::Month => "Last month",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
    Fr,
    De,
    Any,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::En,
        Language::Es,
        Language::Fr,
        Language::De,
        Language::Any,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
            Language::Any => "any",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Spanish",
            Language::Fr => "French",
            Language::De => "German",
            Language::Any => "Any language",
        }
    }
}

/// Search refinements picked in the search panel. They travel with every
/// search but the mock source does not filter on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub has_location: bool,
    pub date_range: DateRange,
    pub language: Language,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            has_location: true,
            date_range: DateRange::default(),
            language: Language::default(),
        }
    }
}

/// Aggregates shown in the stats row, derived from the current results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_tweets: usize,
    pub geolocated_tweets: usize,
    pub unique_locations: usize,
    pub time_range: &'static str,
}

impl DashboardStats {
    pub fn from_tweets(tweets: &[Tweet]) -> Self {
        let places: HashSet<&str> = tweets.iter().filter_map(Tweet::place_name).collect();

        Self {
            total_tweets: tweets.len(),
            geolocated_tweets: tweets.iter().filter(|t| t.coordinates().is_some()).count(),
            unique_locations: places.len(),
            time_range: "24h",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedMessage {
    pub search_id: u64,
    pub data: FeedData,
}

#[derive(Debug, Clone)]
pub enum FeedData {
    SearchResults { query: String, tweets: Vec<Tweet> },
    Error(String),
}

#[async_trait]
pub trait TweetSource: Send + Sync {
    async fn search(&self, query: &str, filters: &SearchFilters) -> Result<Vec<Tweet>>;
}
