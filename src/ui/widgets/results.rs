use crate::action::Action;
use crate::ui::widgets::tweet_card::TweetCard;
use crate::ui::widgets::{border_style, spinner, DashboardView, Panel};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListState, Paragraph, Wrap},
    Frame,
};

pub struct ResultsPanel {
    title: String,
    scroll_state: ListState,
}

impl ResultsPanel {
    pub fn new() -> Self {
        let mut scroll_state = ListState::default();
        scroll_state.select(Some(0));

        Self {
            title: "Results".to_string(),
            scroll_state,
        }
    }

    /// Called whenever the result list is replaced.
    pub fn reset(&mut self) {
        self.scroll_state = ListState::default();
        self.scroll_state.select(Some(0));
    }

    pub fn selected(&self) -> Option<usize> {
        self.scroll_state.selected()
    }

    fn scroll_up(&mut self) {
        if let Some(selected) = self.scroll_state.selected() {
            if selected > 0 {
                self.scroll_state.select(Some(selected - 1));
            }
        }
    }

    fn scroll_down(&mut self, len: usize) {
        if let Some(selected) = self.scroll_state.selected() {
            if selected < len.saturating_sub(1) {
                self.scroll_state.select(Some(selected + 1));
            }
        }
    }

    fn render_empty(&self, frame: &mut Frame, area: Rect) {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "⌕",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Ready to Analyze",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Enter a keyword or hashtag to search for geolocated tweets and visualize them on the interactive map.",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

impl Default for ResultsPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Panel for ResultsPanel {
    fn title(&self) -> &str {
        &self.title
    }

    fn render(&self, frame: &mut Frame, area: Rect, view: &DashboardView, focused: bool) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(focused))
            .title(format!(" {} ", self.title()));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if view.tweets.is_empty() {
            if view.is_loading {
                let loading = Paragraph::new(format!(
                    "{} Searching tweets...",
                    spinner(view.spinner_frame)
                ))
                .alignment(Alignment::Center);
                frame.render_widget(loading, inner);
            } else {
                self.render_empty(frame, inner);
            }
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        let header = Line::from(vec![
            Span::styled(
                format!("Results for \"{}\"", view.current_query),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!(" {} tweets found ", view.tweets.len()),
                Style::default().fg(Color::Black).bg(Color::Gray),
            ),
        ]);
        frame.render_widget(Paragraph::new(header), chunks[0]);

        let width = chunks[1].width.saturating_sub(2);
        let selected = self.scroll_state.selected();
        let items: Vec<_> = view
            .tweets
            .iter()
            .enumerate()
            .map(|(idx, tweet)| TweetCard::new(tweet).list_item(width, Some(idx) == selected))
            .collect();

        let list = List::new(items)
            .highlight_symbol("▌ ")
            .highlight_style(Style::default().add_modifier(Modifier::BOLD));

        let mut state = self.scroll_state.clone();
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    fn handle_key(&mut self, key: KeyEvent, view: &DashboardView) -> Option<Action> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll_up();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll_down(view.tweets.len());
                None
            }
            KeyCode::Enter | KeyCode::Char('l') => {
                let tweet = view.tweets.get(self.scroll_state.selected()?)?;
                TweetCard::new(tweet).location_click()
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::mock::generate_mock_tweets;
    use crate::feeds::{Coordinates, Tweet};
    use crate::ui::widgets::test_support::render_to_string;
    use crossterm::event::KeyModifiers;

    fn view<'a>(tweets: &'a [Tweet], query: &'a str, is_loading: bool) -> DashboardView<'a> {
        DashboardView {
            tweets,
            is_loading,
            current_query: query,
            map_center: None,
            spinner_frame: 0,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_initial_state() {
        let panel = ResultsPanel::new();
        assert_eq!(panel.selected(), Some(0));
        assert_eq!(panel.title(), "Results");
    }

    #[test]
    fn test_scroll_is_bounded() {
        let tweets = generate_mock_tweets("storm");
        let v = view(&tweets, "storm", false);
        let mut panel = ResultsPanel::new();

        for _ in 0..10 {
            panel.handle_key(key(KeyCode::Down), &v);
        }
        assert_eq!(panel.selected(), Some(4));

        for _ in 0..10 {
            panel.handle_key(key(KeyCode::Up), &v);
        }
        assert_eq!(panel.selected(), Some(0));
    }

    #[test]
    fn test_location_key_reports_selected_card_coordinates() {
        let tweets = generate_mock_tweets("storm");
        let v = view(&tweets, "storm", false);
        let mut panel = ResultsPanel::new();

        panel.handle_key(key(KeyCode::Down), &v);
        panel.handle_key(key(KeyCode::Down), &v);
        let action = panel.handle_key(key(KeyCode::Char('l')), &v);
        assert_eq!(
            action,
            Some(Action::FocusLocation(Coordinates::new(-87.6298, 41.8781)))
        );
    }

    #[test]
    fn test_location_key_with_no_results() {
        let mut panel = ResultsPanel::new();
        assert_eq!(panel.handle_key(key(KeyCode::Enter), &view(&[], "", false)), None);
    }

    #[test]
    fn test_reset_returns_to_top() {
        let tweets = generate_mock_tweets("storm");
        let mut panel = ResultsPanel::new();
        panel.handle_key(key(KeyCode::Down), &view(&tweets, "storm", false));
        panel.reset();
        assert_eq!(panel.selected(), Some(0));
    }

    #[test]
    fn test_render_empty_state() {
        let panel = ResultsPanel::new();
        let out = render_to_string(80, 12, |f, area| {
            panel.render(f, area, &view(&[], "", false), false)
        });
        assert!(out.contains("Ready to Analyze"));
    }

    #[test]
    fn test_render_results_header() {
        let tweets = generate_mock_tweets("wildfire");
        let panel = ResultsPanel::new();
        let out = render_to_string(100, 30, |f, area| {
            panel.render(f, area, &view(&tweets, "wildfire", false), true)
        });
        assert!(out.contains("Results for \"wildfire\""));
        assert!(out.contains("5 tweets found"));
        assert!(out.contains("Safety Watch"));
    }
}
