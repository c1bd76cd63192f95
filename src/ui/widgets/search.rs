use crate::action::Action;
use crate::feeds::{DateRange, Language, SearchFilters};
use crate::ui::widgets::{border_style, spinner, DashboardView, Panel};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub struct Suggestion {
    pub text: &'static str,
    pub icon: &'static str,
}

pub const POPULAR_QUERIES: [Suggestion; 5] = [
    Suggestion { text: "wildfire", icon: "🔥" },
    Suggestion { text: "earthquake", icon: "🌍" },
    Suggestion { text: "flooding", icon: "🌊" },
    Suggestion { text: "storm", icon: "⛈" },
    Suggestion { text: "emergency", icon: "🚨" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Query,
    Suggestions,
    Location,
    DateRange,
    Language,
    Submit,
}

impl SearchField {
    const ORDER: [SearchField; 6] = [
        SearchField::Query,
        SearchField::Suggestions,
        SearchField::Location,
        SearchField::DateRange,
        SearchField::Language,
        SearchField::Submit,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

pub struct SearchPanel {
    title: String,
    query: String,
    filters: SearchFilters,
    field: SearchField,
    suggestion_index: usize,
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    let next = if forward {
        (idx + 1) % all.len()
    } else {
        (idx + all.len() - 1) % all.len()
    };
    all[next]
}

impl SearchPanel {
    pub fn new(filters: SearchFilters) -> Self {
        Self {
            title: "Search Geolocated Tweets".to_string(),
            query: String::new(),
            filters,
            field: SearchField::Query,
            suggestion_index: 0,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filters(&self) -> SearchFilters {
        self.filters
    }

    pub fn field(&self) -> SearchField {
        self.field
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    /// Fill the query field with the literal text of a popular query.
    pub fn apply_suggestion(&mut self, index: usize) {
        if let Some(suggestion) = POPULAR_QUERIES.get(index) {
            self.query = suggestion.text.to_string();
            self.suggestion_index = index;
        }
    }

    pub fn can_submit(&self, is_loading: bool) -> bool {
        !self.query.trim().is_empty() && !is_loading
    }

    /// Emit a search for the current query and filters. Blank queries and
    /// submissions while a search is running are dropped.
    pub fn submit(&self, is_loading: bool) -> Option<Action> {
        if !self.can_submit(is_loading) {
            return None;
        }
        Some(Action::Search {
            query: self.query.clone(),
            filters: self.filters,
        })
    }

    fn adjust(&mut self, forward: bool) {
        match self.field {
            SearchField::Suggestions => {
                let len = POPULAR_QUERIES.len();
                self.suggestion_index = if forward {
                    (self.suggestion_index + 1) % len
                } else {
                    (self.suggestion_index + len - 1) % len
                };
            }
            SearchField::Location => {
                self.filters.has_location = !self.filters.has_location;
            }
            SearchField::DateRange => {
                self.filters.date_range =
                    cycle(&DateRange::ALL, self.filters.date_range, forward);
            }
            SearchField::Language => {
                self.filters.language = cycle(&Language::ALL, self.filters.language, forward);
            }
            SearchField::Query | SearchField::Submit => {}
        }
    }

    fn location_label(&self) -> &'static str {
        if self.filters.has_location {
            "Geolocated only"
        } else {
            "All tweets"
        }
    }

    fn field_style(&self, field: SearchField, focused: bool) -> Style {
        if focused && self.field == field {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        }
    }

    fn render_selector(
        &self,
        frame: &mut Frame,
        area: Rect,
        field: SearchField,
        label: &str,
        value: &str,
        focused: bool,
    ) {
        let line = Line::from(vec![
            Span::styled(format!("{:<11}", label), Style::default().fg(Color::DarkGray)),
            Span::styled(format!("‹ {} ›", value), self.field_style(field, focused)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

impl Panel for SearchPanel {
    fn title(&self) -> &str {
        &self.title
    }

    fn render(&self, frame: &mut Frame, area: Rect, view: &DashboardView, focused: bool) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(focused))
            .title(format!(" ⌕ {} ", self.title()));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // subtitle
                Constraint::Length(3), // query input
                Constraint::Length(1), // "Popular searches:"
                Constraint::Length(2), // suggestions
                Constraint::Length(1), // location
                Constraint::Length(1), // time range
                Constraint::Length(1), // language
                Constraint::Length(1), // spacer
                Constraint::Length(1), // submit
                Constraint::Min(0),    // note
            ])
            .split(inner);

        frame.render_widget(
            Paragraph::new(Span::styled(
                "Find tweets with location data",
                Style::default().fg(Color::DarkGray),
            )),
            chunks[0],
        );

        let input_focused = focused && self.field == SearchField::Query;
        let input_text = if self.query.is_empty() {
            Line::from(Span::styled(
                "# keywords or hashtags (e.g., #earthquake, wildfire)",
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            let mut spans = vec![Span::raw("# "), Span::raw(self.query.as_str())];
            if input_focused {
                spans.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
            }
            Line::from(spans)
        };
        let input = Paragraph::new(input_text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(if input_focused {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default().fg(Color::DarkGray)
                }),
        );
        frame.render_widget(input, chunks[1]);

        frame.render_widget(
            Paragraph::new(Span::styled(
                "Popular searches:",
                Style::default().fg(Color::DarkGray),
            )),
            chunks[2],
        );

        let suggestions_focused = focused && self.field == SearchField::Suggestions;
        let mut spans = Vec::new();
        for (idx, suggestion) in POPULAR_QUERIES.iter().enumerate() {
            let style = if suggestions_focused && idx == self.suggestion_index {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            };
            spans.push(Span::styled(
                format!(" {} {} ", suggestion.icon, suggestion.text),
                style,
            ));
            spans.push(Span::raw(" "));
        }
        frame.render_widget(
            Paragraph::new(Line::from(spans)).wrap(Wrap { trim: true }),
            chunks[3],
        );

        self.render_selector(
            frame,
            chunks[4],
            SearchField::Location,
            "Location",
            self.location_label(),
            focused,
        );
        self.render_selector(
            frame,
            chunks[5],
            SearchField::DateRange,
            "Time Range",
            self.filters.date_range.label(),
            focused,
        );
        self.render_selector(
            frame,
            chunks[6],
            SearchField::Language,
            "Language",
            self.filters.language.label(),
            focused,
        );

        let submit = if view.is_loading {
            Span::styled(
                format!(" {} Searching... ", spinner(view.spinner_frame)),
                Style::default().fg(Color::DarkGray),
            )
        } else if !self.can_submit(view.is_loading) {
            Span::styled(" ⌕ Search Tweets ", Style::default().fg(Color::DarkGray))
        } else {
            let style = if focused && self.field == SearchField::Submit {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            };
            Span::styled(" ⌕ Search Tweets ", style)
        };
        frame.render_widget(Paragraph::new(Line::from(submit)), chunks[8]);

        let note = Paragraph::new(Line::from(vec![
            Span::styled("Note: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::styled(
                "This demo uses mock data. Plug a real source in behind TweetSource for live analysis.",
                Style::default().fg(Color::Cyan),
            ),
        ]))
        .wrap(Wrap { trim: true });
        frame.render_widget(note, chunks[9]);
    }

    fn handle_key(&mut self, key: KeyEvent, view: &DashboardView) -> Option<Action> {
        match key.code {
            KeyCode::Up => {
                self.field = self.field.prev();
                None
            }
            KeyCode::Down => {
                self.field = self.field.next();
                None
            }
            KeyCode::Left => {
                self.adjust(false);
                None
            }
            KeyCode::Right => {
                self.adjust(true);
                None
            }
            KeyCode::Enter => match self.field {
                SearchField::Suggestions => {
                    self.apply_suggestion(self.suggestion_index);
                    self.field = SearchField::Query;
                    None
                }
                SearchField::Location | SearchField::DateRange | SearchField::Language => {
                    self.adjust(true);
                    None
                }
                SearchField::Query | SearchField::Submit => self.submit(view.is_loading),
            },
            KeyCode::Char(' ') if self.field == SearchField::Location => {
                self.adjust(true);
                None
            }
            KeyCode::Char(c)
                if self.field == SearchField::Query
                    && !key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.query.push(c);
                None
            }
            KeyCode::Backspace if self.field == SearchField::Query => {
                self.query.pop();
                None
            }
            KeyCode::Esc if self.field == SearchField::Query => {
                self.query.clear();
                None
            }
            _ => None,
        }
    }

    fn captures_text(&self) -> bool {
        self.field == SearchField::Query
    }
}
