use super::{Coordinates, SearchFilters, Tweet, TweetLocation, TweetSource};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(1500);

fn california_witness(q: &str) -> String {
    format!(
        "Just witnessed a massive {q} event here in California. The emergency services are responding quickly. Stay safe everyone! #{q} #California"
    )
}

fn downtown_breaking(q: &str) -> String {
    format!(
        "Breaking: {q} reported in the downtown area. Evacuation procedures are being followed. Local authorities are on scene."
    )
}

fn shelter_update(q: &str) -> String {
    format!(
        "Update on the {q} situation: Emergency shelters have been set up at the community center. #EmergencyResponse"
    )
}

fn field_report(q: &str) -> String {
    format!(
        "Checking in from the field covering the {q} response. Amazing coordination between first responders. #Journalism"
    )
}

fn community_support(q: &str) -> String {
    format!(
        "Community coming together to help those affected by the {q}. Proud of our resilience! #CommunitySupport"
    )
}

struct Slot {
    template: fn(&str) -> String,
    username: &'static str,
    display_name: &'static str,
    timestamp: &'static str,
    coordinates: [f64; 2],
    place_name: &'static str,
}

const SLOTS: [Slot; 5] = [
    Slot {
        template: california_witness,
        username: "safetywatch",
        display_name: "Safety Watch",
        timestamp: "2 hours ago",
        coordinates: [-118.2437, 34.0522],
        place_name: "Los Angeles, CA",
    },
    Slot {
        template: downtown_breaking,
        username: "newsreporter",
        display_name: "Local News Reporter",
        timestamp: "45 minutes ago",
        coordinates: [-74.0059, 40.7128],
        place_name: "New York, NY",
    },
    Slot {
        template: shelter_update,
        username: "emergencyservices",
        display_name: "Emergency Services",
        timestamp: "1 hour ago",
        coordinates: [-87.6298, 41.8781],
        place_name: "Chicago, IL",
    },
    Slot {
        template: field_report,
        username: "fieldreporter",
        display_name: "Field Reporter",
        timestamp: "30 minutes ago",
        coordinates: [-122.4194, 37.7749],
        place_name: "San Francisco, CA",
    },
    Slot {
        template: community_support,
        username: "volunteer",
        display_name: "Community Volunteer",
        timestamp: "15 minutes ago",
        coordinates: [-95.3698, 29.7604],
        place_name: "Houston, TX",
    },
];

/// Build the five canned results for `query`. Slot order, ids, places and
/// timestamps never change; only the text mentions the query.
pub fn generate_mock_tweets(query: &str) -> Vec<Tweet> {
    SLOTS
        .iter()
        .enumerate()
        .map(|(idx, slot)| Tweet {
            id: (idx + 1).to_string(),
            text: (slot.template)(query),
            username: slot.username.to_string(),
            display_name: slot.display_name.to_string(),
            timestamp: slot.timestamp.to_string(),
            location: Some(TweetLocation {
                coordinates: Some(Coordinates::from(slot.coordinates)),
                place_name: Some(slot.place_name.to_string()),
            }),
            profile_image: None,
        })
        .collect()
}

/// Stand-in for a real search backend: waits `delay`, then answers with
/// [`generate_mock_tweets`]. Filters are accepted and ignored.
pub struct MockTweetSource {
    delay: Duration,
}

impl MockTweetSource {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for MockTweetSource {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

#[async_trait]
impl TweetSource for MockTweetSource {
    async fn search(&self, query: &str, _filters: &SearchFilters) -> Result<Vec<Tweet>> {
        tokio::time::sleep(self.delay).await;
        Ok(generate_mock_tweets(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_five_records_with_sequential_ids() {
        let tweets = generate_mock_tweets("earthquake");
        let ids: Vec<&str> = tweets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_every_text_contains_query() {
        for query in ["wildfire", "a", "two words", "ünïcödé", "#tag"] {
            let tweets = generate_mock_tweets(query);
            assert_eq!(tweets.len(), 5);
            assert!(tweets.iter().all(|t| t.text.contains(query)), "{query}");
        }
    }

    #[test]
    fn test_coordinates_in_fixed_order() {
        let coords: Vec<[f64; 2]> = generate_mock_tweets("storm")
            .iter()
            .map(|t| t.coordinates().unwrap().into())
            .collect();
        assert_eq!(
            coords,
            vec![
                [-118.2437, 34.0522],
                [-74.0059, 40.7128],
                [-87.6298, 41.8781],
                [-122.4194, 37.7749],
                [-95.3698, 29.7604],
            ]
        );
    }

    #[test]
    fn test_place_names_and_timestamps() {
        let tweets = generate_mock_tweets("flooding");
        let places: Vec<&str> = tweets.iter().filter_map(Tweet::place_name).collect();
        assert_eq!(
            places,
            vec![
                "Los Angeles, CA",
                "New York, NY",
                "Chicago, IL",
                "San Francisco, CA",
                "Houston, TX"
            ]
        );
        assert_eq!(tweets[0].timestamp, "2 hours ago");
        assert_eq!(tweets[4].timestamp, "15 minutes ago");
    }

    #[test]
    fn test_first_record_mentions_california() {
        let tweets = generate_mock_tweets("wildfire");
        assert!(tweets[0].text.contains("California"));
        assert!(tweets[0].text.contains("#wildfire"));
    }

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(generate_mock_tweets("storm"), generate_mock_tweets("storm"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_source_waits_for_delay() {
        let source = MockTweetSource::new(Duration::from_millis(1500));
        let start = tokio::time::Instant::now();
        let tweets = source
            .search("storm", &SearchFilters::default())
            .await
            .unwrap();
        assert_eq!(tweets.len(), 5);
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }
}
