use crate::action::Action;
use crate::feeds::Tweet;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::ListItem,
};

const AVATAR_PLACEHOLDER: &str = "(◕)";
const AVATAR_IMAGE: &str = "[▣]";

/// Stateless card for one tweet. Layout:
///
/// ```text
/// (◕) Display Name @handle
///     full text, wrapped to the card width
///     ◷ 2 hours ago   ⌖ Los Angeles, CA   [View on Map]
/// ```
pub struct TweetCard<'a> {
    tweet: &'a Tweet,
}

impl<'a> TweetCard<'a> {
    pub fn new(tweet: &'a Tweet) -> Self {
        Self { tweet }
    }

    /// The location badge and the place label both report the tweet's
    /// coordinates unchanged. Nothing is reported without coordinates.
    pub fn location_click(&self) -> Option<Action> {
        self.tweet.coordinates().map(Action::FocusLocation)
    }

    pub fn lines(&self, width: u16, highlighted: bool) -> Vec<Line<'a>> {
        let tweet = self.tweet;
        let name_style = if highlighted {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        };

        let avatar = if tweet.profile_image.is_some() {
            AVATAR_IMAGE
        } else {
            AVATAR_PLACEHOLDER
        };

        let mut lines = vec![Line::from(vec![
            Span::styled(avatar, Style::default().fg(Color::Cyan)),
            Span::raw(" "),
            Span::styled(tweet.display_name.as_str(), name_style),
            Span::raw(" "),
            Span::styled(
                format!("@{}", tweet.username),
                Style::default().fg(Color::DarkGray),
            ),
        ])];

        let indent = "    ";
        let text_width = (width as usize).saturating_sub(indent.len()).max(10);
        for wrapped in textwrap::wrap(&tweet.text, text_width) {
            lines.push(Line::from(vec![
                Span::raw(indent),
                Span::styled(wrapped.into_owned(), Style::default().fg(Color::White)),
            ]));
        }

        let mut meta = vec![
            Span::raw(indent),
            Span::styled(
                format!("◷ {}", tweet.timestamp),
                Style::default().fg(Color::DarkGray),
            ),
        ];
        if let Some(location) = &tweet.location {
            let place = location
                .place_name
                .as_deref()
                .filter(|p| !p.is_empty())
                .unwrap_or("Coordinates");
            meta.push(Span::raw("   "));
            meta.push(Span::styled(
                format!("⌖ {}", place),
                Style::default().fg(Color::Cyan),
            ));
            meta.push(Span::raw("   "));
            meta.push(Span::styled(
                "[View on Map]",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        lines.push(Line::from(meta));
        lines.push(Line::from(""));

        lines
    }

    pub fn list_item(&self, width: u16, highlighted: bool) -> ListItem<'a> {
        ListItem::new(self.lines(width, highlighted))
    }
}
