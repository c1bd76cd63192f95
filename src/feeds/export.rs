use super::Tweet;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    username: &'a str,
    display_name: &'a str,
    timestamp: &'a str,
    text: &'a str,
    longitude: Option<f64>,
    latitude: Option<f64>,
    place_name: Option<&'a str>,
}

impl<'a> From<&'a Tweet> for CsvRow<'a> {
    fn from(tweet: &'a Tweet) -> Self {
        let coords = tweet.coordinates();
        Self {
            id: &tweet.id,
            username: &tweet.username,
            display_name: &tweet.display_name,
            timestamp: &tweet.timestamp,
            text: &tweet.text,
            longitude: coords.map(|c| c.lng()),
            latitude: coords.map(|c| c.lat()),
            place_name: tweet.place_name(),
        }
    }
}

pub fn write_csv<W: Write>(writer: W, tweets: &[Tweet]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for tweet in tweets {
        csv.serialize(CsvRow::from(tweet))?;
    }
    csv.flush()?;
    Ok(())
}

/// `tweets-<query>-<YYYYmmdd-HHMMSS>.csv`, with the query reduced to a
/// filesystem-safe slug.
pub fn export_file_name(query: &str, now: DateTime<Local>) -> String {
    let slug: String = query
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug.trim_matches('-');
    let slug = if slug.is_empty() { "results" } else { slug };

    format!("tweets-{}-{}.csv", slug, now.format("%Y%m%d-%H%M%S"))
}

/// Write `tweets` into `dir` and return the created path.
pub fn export_to_dir(dir: &Path, query: &str, tweets: &[Tweet]) -> Result<PathBuf> {
    let path = dir.join(export_file_name(query, Local::now()));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("creating export file {}", path.display()))?;
    write_csv(file, tweets).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::mock::generate_mock_tweets;
    use chrono::TimeZone;

    #[test]
    fn test_csv_has_header_and_one_row_per_tweet() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &generate_mock_tweets("storm")).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "id,username,display_name,timestamp,text,longitude,latitude,place_name"
        );
        assert_eq!(lines.len(), 6);
        assert!(lines[1].starts_with("1,safetywatch,Safety Watch,2 hours ago,"));
        assert!(lines[1].ends_with(",-118.2437,34.0522,\"Los Angeles, CA\""));
    }

    #[test]
    fn test_export_file_name_slugs_query() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            export_file_name("#Wild Fire", now),
            "tweets-wild-fire-20240309-140507.csv"
        );
        assert_eq!(export_file_name("  ", now), "tweets-results-20240309-140507.csv");
    }

    #[test]
    fn test_export_to_dir_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_to_dir(dir.path(), "flooding", &generate_mock_tweets("flooding")).unwrap();

        assert!(path.starts_with(dir.path()));
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 6);
        assert!(content.contains("Houston, TX"));
    }
}
