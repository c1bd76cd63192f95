use crate::action::Action;
use crate::config::Config;
use crate::feeds::export::export_to_dir;
use crate::feeds::mock::MockTweetSource;
use crate::feeds::{
    Coordinates, DashboardStats, FeedData, FeedMessage, SearchFilters, Tweet, TweetSource,
};
use crate::ui;
use crate::ui::widgets::map::{AccessToken, MapPanel, TOKEN_HELP_URL};
use crate::ui::widgets::results::ResultsPanel;
use crate::ui::widgets::search::SearchPanel;
use crate::ui::widgets::{DashboardView, Panel};
use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPanel {
    Search,
    Map,
    Results,
}

impl FocusedPanel {
    fn next(self) -> Self {
        match self {
            FocusedPanel::Search => FocusedPanel::Map,
            FocusedPanel::Map => FocusedPanel::Results,
            FocusedPanel::Results => FocusedPanel::Search,
        }
    }

    fn prev(self) -> Self {
        match self {
            FocusedPanel::Search => FocusedPanel::Results,
            FocusedPanel::Map => FocusedPanel::Search,
            FocusedPanel::Results => FocusedPanel::Map,
        }
    }
}

/// The only mutable state of the dashboard. Panels get a read-only
/// [`DashboardView`] of it.
#[derive(Debug, Default)]
pub struct DashboardState {
    pub tweets: Vec<Tweet>,
    pub is_loading: bool,
    pub map_center: Option<Coordinates>,
    pub current_query: String,
    pub last_search: Option<(String, SearchFilters)>,
    pub status_message: Option<String>,
    pub spinner_frame: usize,
}

impl DashboardState {
    pub fn view(&self) -> DashboardView<'_> {
        DashboardView {
            tweets: &self.tweets,
            is_loading: self.is_loading,
            current_query: &self.current_query,
            map_center: self.map_center,
            spinner_frame: self.spinner_frame,
        }
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::from_tweets(&self.tweets)
    }
}

pub struct App {
    pub state: DashboardState,
    pub search: SearchPanel,
    pub map: MapPanel,
    pub results: ResultsPanel,
    pub focus: FocusedPanel,
    source: Arc<dyn TweetSource>,
    feed_tx: UnboundedSender<FeedMessage>,
    feed_rx: UnboundedReceiver<FeedMessage>,
    action_rx: UnboundedReceiver<Action>,
    next_search_id: u64,
    tick_rate: Duration,
    export_dir: PathBuf,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        let source = Arc::new(MockTweetSource::new(config.search.delay()));
        Self::with_source(config, source)
    }

    pub fn with_source(config: Config, source: Arc<dyn TweetSource>) -> Self {
        let (feed_tx, feed_rx) = mpsc::unbounded_channel();
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let mut map = MapPanel::new(config.map.clone());
        map.on_marker_activate(Arc::new(move |tweet: &Tweet| {
            let _ = action_tx.send(Action::TweetActivated(tweet.clone()));
        }));

        Self {
            state: DashboardState::default(),
            search: SearchPanel::new(config.search.default_filters()),
            map,
            results: ResultsPanel::new(),
            focus: FocusedPanel::Search,
            source,
            feed_tx,
            feed_rx,
            action_rx,
            next_search_id: 0,
            tick_rate: Duration::from_millis(config.general.tick_rate_ms),
            export_dir: PathBuf::from("."),
            should_quit: false,
        }
    }

    pub fn set_export_dir(&mut self, dir: PathBuf) {
        self.export_dir = dir;
    }

    /// Fill the search box with `query` and submit it as if typed.
    pub fn start_search(&mut self, query: &str) {
        self.search.set_query(query);
        if let Some(action) = self.search.submit(self.state.is_loading) {
            self.dispatch(action);
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn view(&self) -> DashboardView<'_> {
        self.state.view()
    }

    fn focused_captures_text(&self) -> bool {
        match self.focus {
            FocusedPanel::Search => self.search.captures_text(),
            FocusedPanel::Map => self.map.captures_text(),
            FocusedPanel::Results => self.results.captures_text(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return self.dispatch(Action::Quit),
            KeyCode::Char('r') if ctrl => return self.dispatch(Action::Refresh),
            KeyCode::Char('e') if ctrl => return self.dispatch(Action::Export),
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return;
            }
            _ => {}
        }

        if !self.focused_captures_text() {
            match key.code {
                KeyCode::Char('q') => return self.dispatch(Action::Quit),
                KeyCode::Char('r') => return self.dispatch(Action::Refresh),
                KeyCode::Char('e') => return self.dispatch(Action::Export),
                _ => {}
            }
        }

        let view = self.state.view();
        let action = match self.focus {
            FocusedPanel::Search => self.search.handle_key(key, &view),
            FocusedPanel::Map => self.map.handle_key(key, &view),
            FocusedPanel::Results => self.results.handle_key(key, &view),
        };
        if let Some(action) = action {
            self.dispatch(action);
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Search { query, filters } => self.handle_search(query, filters),
            Action::FocusLocation(coordinates) => self.focus_location(coordinates),
            Action::TweetActivated(tweet) => {
                debug!(id = %tweet.id, "tweet activated on map");
                if let Some(coordinates) = tweet.coordinates() {
                    self.focus_location(coordinates);
                }
            }
            Action::ConfigureMap(token) => self.configure_map(token),
            Action::OpenTokenHelp => {
                if let Err(e) = open::that(TOKEN_HELP_URL) {
                    warn!(error = %e, "failed to open browser");
                    self.state.status_message = Some(format!("Could not open browser: {}", e));
                }
            }
            Action::Refresh => self.refresh(),
            Action::Export => self.export(),
            Action::Quit => self.should_quit = true,
        }
    }

    /// Start a search. The result arrives later on the feed channel; nothing
    /// cancels an earlier search still in flight, so whichever completes
    /// last decides what is shown.
    fn handle_search(&mut self, query: String, filters: SearchFilters) {
        self.next_search_id += 1;
        let search_id = self.next_search_id;

        info!(
            search_id,
            query = %query,
            has_location = filters.has_location,
            date_range = filters.date_range.code(),
            language = filters.language.code(),
            "search submitted"
        );

        self.state.is_loading = true;
        self.state.current_query = query.clone();
        self.state.last_search = Some((query.clone(), filters));
        self.state.status_message = None;

        let source = Arc::clone(&self.source);
        let tx = self.feed_tx.clone();
        tokio::spawn(async move {
            let data = match source.search(&query, &filters).await {
                Ok(tweets) => FeedData::SearchResults { query, tweets },
                Err(e) => FeedData::Error(format!("{:#}", e)),
            };
            let _ = tx.send(FeedMessage { search_id, data });
        });
    }

    pub fn apply_feed(&mut self, message: FeedMessage) {
        self.state.is_loading = false;
        match message.data {
            FeedData::SearchResults { query, tweets } => {
                info!(
                    search_id = message.search_id,
                    query = %query,
                    count = tweets.len(),
                    "search completed"
                );
                self.state.tweets = tweets;
                self.results.reset();
                self.map.sync_markers(&self.state.tweets);
            }
            FeedData::Error(e) => {
                warn!(search_id = message.search_id, error = %e, "search failed");
                self.state.status_message = Some(format!("Search error: {}", e));
            }
        }
    }

    fn focus_location(&mut self, coordinates: Coordinates) {
        debug!(lng = coordinates.lng(), lat = coordinates.lat(), "map focus changed");
        self.state.map_center = Some(coordinates);
        self.map.focus(coordinates);
    }

    fn configure_map(&mut self, token: AccessToken) {
        info!(token = ?token, "map credential entered");
        self.map
            .configure(token, &self.state.tweets, self.state.map_center);
    }

    fn refresh(&mut self) {
        if self.state.is_loading || self.state.tweets.is_empty() {
            return;
        }
        if let Some((query, filters)) = self.state.last_search.clone() {
            self.handle_search(query, filters);
        }
    }

    fn export(&mut self) {
        if self.state.tweets.is_empty() {
            self.state.status_message = Some("Nothing to export yet".to_string());
            return;
        }
        match export_to_dir(&self.export_dir, &self.state.current_query, &self.state.tweets) {
            Ok(path) => {
                info!(path = %path.display(), count = self.state.tweets.len(), "results exported");
                self.state.status_message = Some(format!("Exported to {}", path.display()));
            }
            Err(e) => {
                warn!(error = %e, "export failed");
                self.state.status_message = Some(format!("Export failed: {:#}", e));
            }
        }
    }

    pub fn on_tick(&mut self) {
        if self.state.is_loading {
            self.state.spinner_frame = self.state.spinner_frame.wrapping_add(1);
        }
        self.map.tick(Instant::now());
    }

    pub async fn next_feed(&mut self) -> Option<FeedMessage> {
        self.feed_rx.recv().await
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let mut events = EventStream::new();
        let mut ticker = tokio::time::interval(self.tick_rate);

        while !self.should_quit {
            terminal.draw(|frame| ui::draw(frame, self))?;

            tokio::select! {
                _ = ticker.tick() => self.on_tick(),
                Some(message) = self.feed_rx.recv() => self.apply_feed(message),
                Some(action) = self.action_rx.recv() => self.dispatch(action),
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key)
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
            }
        }

        Ok(())
    }
}
