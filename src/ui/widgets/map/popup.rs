use crate::feeds::Tweet;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

pub const EXCERPT_LEN: usize = 100;

/// First `max` characters of `text`, with `...` appended when anything was
/// cut off.
pub fn excerpt(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub username: String,
    pub timestamp: String,
    pub excerpt: String,
    pub place_name: Option<String>,
}

impl Popup {
    pub fn for_tweet(tweet: &Tweet) -> Self {
        Self {
            username: tweet.username.clone(),
            timestamp: tweet.timestamp.clone(),
            excerpt: excerpt(&tweet.text, EXCERPT_LEN),
            place_name: tweet.place_name().map(str::to_string),
        }
    }

    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled(
                format!("@{}", self.username),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                self.timestamp.clone(),
                Style::default().fg(Color::DarkGray),
            )),
        ];
        for wrapped in textwrap::wrap(&self.excerpt, width.max(10)) {
            lines.push(Line::from(wrapped.into_owned()));
        }
        if let Some(place) = &self.place_name {
            lines.push(Line::from(Span::styled(
                format!("⌖ {}", place),
                Style::default().fg(Color::Cyan),
            )));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::mock::generate_mock_tweets;

    #[test]
    fn test_excerpt_short_text_untouched() {
        assert_eq!(excerpt("short", 100), "short");
        let exact = "x".repeat(100);
        assert_eq!(excerpt(&exact, 100), exact);
    }

    #[test]
    fn test_excerpt_truncates_with_ellipsis() {
        let long = "y".repeat(101);
        let out = excerpt(&long, 100);
        assert_eq!(out.len(), 103);
        assert!(out.ends_with("y..."));
    }

    #[test]
    fn test_excerpt_counts_characters_not_bytes() {
        let text = "é".repeat(150);
        let out = excerpt(&text, 100);
        assert_eq!(out.chars().count(), 103);
    }

    #[test]
    fn test_popup_for_mock_tweet() {
        let tweets = generate_mock_tweets("wildfire");
        let popup = Popup::for_tweet(&tweets[0]);

        assert_eq!(popup.username, "safetywatch");
        assert_eq!(popup.timestamp, "2 hours ago");
        assert!(popup.excerpt.ends_with("..."));
        assert_eq!(popup.excerpt.chars().count(), EXCERPT_LEN + 3);
        assert_eq!(popup.place_name.as_deref(), Some("Los Angeles, CA"));
    }

    #[test]
    fn test_popup_lines_include_handle_and_place() {
        let tweets = generate_mock_tweets("storm");
        let lines = Popup::for_tweet(&tweets[4]).lines(30);
        let text: Vec<String> = lines.iter().map(|l| l.to_string()).collect();

        assert_eq!(text[0], "@volunteer");
        assert_eq!(text[1], "15 minutes ago");
        assert_eq!(text.last().map(String::as_str), Some("⌖ Houston, TX"));
    }
}
