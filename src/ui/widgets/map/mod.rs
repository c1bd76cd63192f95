pub mod globe;
pub mod popup;
pub mod surface;

use crate::action::Action;
use crate::config::MapConfig;
use crate::feeds::{Coordinates, Tweet};
use crate::ui::widgets::{border_style, center_rect, DashboardView, Panel};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use globe::CanvasGlobe;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::fmt;
use std::time::Instant;
use surface::{MapSurface, MarkerCallback};
use tracing::info;

pub const TOKEN_HELP_URL: &str = "https://mapbox.com/";

/// Pan step in degrees at zoom 2.
const PAN_STEP: f64 = 10.0;

/// Bearer credential for the map backend. Held in memory only and never
/// printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// `None` for blank input. There is no format check beyond that.
    pub fn parse(input: &str) -> Option<Self> {
        if input.trim().is_empty() {
            None
        } else {
            Some(Self(input.to_string()))
        }
    }

    pub fn masked(&self) -> String {
        let head: String = self.0.trim().chars().take(4).collect();
        format!("{}…", head)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken({})", self.masked())
    }
}

pub struct MapPanel {
    title: String,
    config: MapConfig,
    token_input: String,
    surface: Option<Box<dyn MapSurface>>,
    on_activate: Option<MarkerCallback>,
}

impl MapPanel {
    pub fn new(config: MapConfig) -> Self {
        Self {
            title: "Map".to_string(),
            config,
            token_input: String::new(),
            surface: None,
            on_activate: None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.surface.is_some()
    }

    pub fn token_input(&self) -> &str {
        &self.token_input
    }

    pub fn surface(&self) -> Option<&dyn MapSurface> {
        self.surface.as_deref()
    }

    /// Register the handler for marker activation. It is handed to the
    /// surface once the map is configured.
    pub fn on_marker_activate(&mut self, callback: MarkerCallback) {
        if let Some(surface) = self.surface.as_mut() {
            surface.on_marker_activate(callback.clone());
        }
        self.on_activate = Some(callback);
    }

    /// Bring the map up with `token` and catch it up with the current
    /// results and focus.
    pub fn configure(&mut self, token: AccessToken, tweets: &[Tweet], focus: Option<Coordinates>) {
        let surface = Box::new(CanvasGlobe::new(token, &self.config));
        self.install(surface, tweets, focus);
    }

    fn install(
        &mut self,
        mut surface: Box<dyn MapSurface>,
        tweets: &[Tweet],
        focus: Option<Coordinates>,
    ) {
        info!("map configured");
        if let Some(callback) = &self.on_activate {
            surface.on_marker_activate(callback.clone());
        }
        surface.render_markers(tweets);
        if let Some(center) = focus {
            surface.recenter(center);
        }
        self.surface = Some(surface);
    }

    pub fn sync_markers(&mut self, tweets: &[Tweet]) {
        if let Some(surface) = self.surface.as_mut() {
            surface.render_markers(tweets);
        }
    }

    pub fn focus(&mut self, center: Coordinates) {
        if let Some(surface) = self.surface.as_mut() {
            surface.recenter(center);
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if let Some(surface) = self.surface.as_mut() {
            surface.tick(now);
        }
    }

    fn cycle_hover(&mut self, forward: bool) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let len = surface.markers().len();
        if len == 0 {
            return;
        }
        let next = match (surface.hovered(), forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        surface.hover(Some(next));
    }

    fn render_token_form(&self, frame: &mut Frame, area: Rect) {
        let form_area = center_rect(90, 90, area);
        frame.render_widget(Clear, form_area);

        let input = if self.token_input.is_empty() {
            Span::styled(
                "pk.eyJ1IjoieW91cnVzZXJuYW1lIiwi...",
                Style::default().fg(Color::DarkGray),
            )
        } else {
            Span::styled(self.token_input.as_str(), Style::default().fg(Color::White))
        };

        let text = vec![
            Line::from(Span::styled(
                "⌖",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Configure Map",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Enter your Mapbox public token to display the interactive map with geolocated tweets.",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(""),
            Line::from(vec![Span::raw("Token: "), input, Span::raw("▏")]),
            Line::from(""),
            Line::from(Span::styled(
                "Enter: Initialize Map",
                Style::default().fg(Color::Cyan),
            )),
            Line::from(Span::styled(
                format!("Get your free token at {} (Ctrl-O to open)", TOKEN_HELP_URL),
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, form_area);
    }

    fn render_overlay(&self, frame: &mut Frame, area: Rect, view: &DashboardView) {
        if view.tweets.is_empty() || area.height < 1 {
            return;
        }
        let geolocated = view
            .tweets
            .iter()
            .filter(|t| t.coordinates().is_some())
            .count();
        let label = format!(" {} Geolocated Tweets ", geolocated);
        let width = (label.chars().count() as u16).min(area.width);
        let overlay_area = Rect::new(area.x, area.y, width, 1);
        frame.render_widget(
            Paragraph::new(Span::styled(
                label,
                Style::default()
                    .fg(Color::White)
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )),
            overlay_area,
        );
    }
}

impl Panel for MapPanel {
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

        match &self.surface {
            None => self.render_token_form(frame, inner),
            Some(surface) => {
                surface.draw(frame, inner);
                self.render_overlay(frame, inner, view);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent, _view: &DashboardView) -> Option<Action> {
        if self.surface.is_none() {
            return match key.code {
                KeyCode::Char('o') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    Some(Action::OpenTokenHelp)
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.token_input.push(c);
                    None
                }
                KeyCode::Backspace => {
                    self.token_input.pop();
                    None
                }
                KeyCode::Enter => AccessToken::parse(&self.token_input).map(Action::ConfigureMap),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char(']') | KeyCode::Char('n') => self.cycle_hover(true),
            KeyCode::Char('[') | KeyCode::Char('N') => self.cycle_hover(false),
            KeyCode::Enter => {
                if let Some(surface) = self.surface.as_mut() {
                    if let Some(idx) = surface.hovered() {
                        surface.activate(idx);
                    }
                }
            }
            KeyCode::Esc => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.hover(None);
                }
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down => {
                let (d_lng, d_lat) = match key.code {
                    KeyCode::Left => (-PAN_STEP, 0.0),
                    KeyCode::Right => (PAN_STEP, 0.0),
                    KeyCode::Up => (0.0, PAN_STEP),
                    _ => (0.0, -PAN_STEP),
                };
                if let Some(surface) = self.surface.as_mut() {
                    surface.pan(d_lng, d_lat);
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.zoom_by(1.0);
                }
            }
            KeyCode::Char('-') => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.zoom_by(-1.0);
                }
            }
            KeyCode::Char('p') => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.toggle_projection();
                }
            }
            _ => {}
        }
        None
    }

    fn captures_text(&self) -> bool {
        self.surface.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::mock::generate_mock_tweets;
    use crate::ui::widgets::test_support::render_to_string;
    use std::sync::{Arc, Mutex};

    const NO_TWEETS: &[Tweet] = &[];

    fn view(tweets: &[Tweet]) -> DashboardView<'_> {
        DashboardView {
            tweets,
            is_loading: false,
            current_query: "",
            map_center: None,
            spinner_frame: 0,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_token(panel: &mut MapPanel, token: &str) {
        for c in token.chars() {
            panel.handle_key(key(KeyCode::Char(c)), &view(NO_TWEETS));
        }
    }

    #[test]
    fn test_access_token_rejects_blank() {
        assert!(AccessToken::parse("").is_none());
        assert!(AccessToken::parse("   ").is_none());
        assert_eq!(AccessToken::parse("x").unwrap().masked(), "x…");
    }

    #[test]
    fn test_access_token_debug_is_masked() {
        let token = AccessToken::parse("pk.eyJ1IjoiabcdefSECRET").unwrap();
        let debug = format!("{:?}", token);
        assert_eq!(debug, "AccessToken(pk.e…)");
        assert!(!debug.contains("SECRET"));
    }

    #[test]
    fn test_unconfigured_panel_makes_no_surface_calls() {
        let mut panel = MapPanel::new(MapConfig::default());
        panel.sync_markers(&generate_mock_tweets("storm"));
        panel.focus(Coordinates::new(1.0, 1.0));
        panel.tick(Instant::now());
        assert!(!panel.is_configured());
        assert!(panel.surface().is_none());
        assert!(panel.captures_text());
    }

    #[test]
    fn test_blank_token_does_not_configure() {
        let mut panel = MapPanel::new(MapConfig::default());
        type_token(&mut panel, "   ");
        assert_eq!(panel.handle_key(key(KeyCode::Enter), &view(NO_TWEETS)), None);
    }

    #[test]
    fn test_token_entry_emits_configure() {
        let mut panel = MapPanel::new(MapConfig::default());
        type_token(&mut panel, "pk.abcd");
        panel.handle_key(key(KeyCode::Backspace), &view(NO_TWEETS));
        assert_eq!(panel.token_input(), "pk.abc");

        let action = panel.handle_key(key(KeyCode::Enter), &view(NO_TWEETS));
        assert_eq!(
            action,
            Some(Action::ConfigureMap(AccessToken::parse("pk.abc").unwrap()))
        );
    }

    #[test]
    fn test_ctrl_o_opens_help() {
        let mut panel = MapPanel::new(MapConfig::default());
        let action = panel.handle_key(
            KeyEvent::new(KeyCode::Char('o'), KeyModifiers::CONTROL),
            &view(NO_TWEETS),
        );
        assert_eq!(action, Some(Action::OpenTokenHelp));
        assert_eq!(panel.token_input(), "");
    }

    #[test]
    fn test_configure_catches_up_with_results_and_focus() {
        let tweets = generate_mock_tweets("storm");
        let mut panel = MapPanel::new(MapConfig::default());
        panel.configure(
            AccessToken::parse("pk.x").unwrap(),
            &tweets,
            Some(Coordinates::new(-74.0059, 40.7128)),
        );

        assert!(panel.is_configured());
        assert!(!panel.captures_text());
        let surface = panel.surface().unwrap();
        assert_eq!(surface.markers().len(), 5);
    }

    #[test]
    fn test_marker_keys_report_hovered_tweet() {
        let tweets = generate_mock_tweets("storm");
        let seen: Arc<Mutex<Vec<String>>> = Default::default();
        let sink = seen.clone();

        let mut panel = MapPanel::new(MapConfig::default());
        panel.on_marker_activate(Arc::new(move |t: &Tweet| {
            sink.lock().unwrap().push(t.id.clone());
        }));
        panel.configure(AccessToken::parse("pk.x").unwrap(), &tweets, None);

        let v = view(&tweets);
        panel.handle_key(key(KeyCode::Enter), &v);
        assert!(seen.lock().unwrap().is_empty());

        panel.handle_key(key(KeyCode::Char(']')), &v);
        panel.handle_key(key(KeyCode::Char(']')), &v);
        panel.handle_key(key(KeyCode::Enter), &v);
        panel.handle_key(key(KeyCode::Char('[')), &v);
        panel.handle_key(key(KeyCode::Char('[')), &v);
        panel.handle_key(key(KeyCode::Enter), &v);

        assert_eq!(*seen.lock().unwrap(), vec!["2".to_string(), "5".to_string()]);
    }

    #[test]
    fn test_render_token_form_before_configuration() {
        let panel = MapPanel::new(MapConfig::default());
        let out = render_to_string(100, 20, |f, area| {
            panel.render(f, area, &view(NO_TWEETS), true)
        });
        assert!(out.contains("Configure Map"));
        assert!(out.contains("Initialize Map"));
    }

    #[test]
    fn test_render_overlay_counts_geolocated() {
        let mut tweets = generate_mock_tweets("storm");
        tweets[2].location = None;
        let mut panel = MapPanel::new(MapConfig::default());
        panel.configure(AccessToken::parse("pk.x").unwrap(), &tweets, None);

        let out = render_to_string(100, 24, |f, area| panel.render(f, area, &view(&tweets), false));
        assert!(out.contains("4 Geolocated Tweets"));
    }
}
