pub mod map;
pub mod results;
pub mod search;
pub mod tweet_card;

use crate::action::Action;
use crate::feeds::{Coordinates, Tweet};
use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    Frame,
};

/// Read-only slice of dashboard state handed to panels for rendering and
/// key handling.
#[derive(Debug, Clone, Copy)]
pub struct DashboardView<'a> {
    pub tweets: &'a [Tweet],
    pub is_loading: bool,
    pub current_query: &'a str,
    pub map_center: Option<Coordinates>,
    pub spinner_frame: usize,
}

pub trait Panel {
    fn title(&self) -> &str;

    fn render(&self, frame: &mut Frame, area: Rect, view: &DashboardView, focused: bool);

    fn handle_key(&mut self, key: KeyEvent, view: &DashboardView) -> Option<Action>;

    /// True while the panel is consuming printable characters, so global
    /// single-letter shortcuts must not fire.
    fn captures_text(&self) -> bool {
        false
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    }
}

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

pub fn spinner(frame: usize) -> &'static str {
    SPINNER[frame % SPINNER.len()]
}

pub fn center_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
