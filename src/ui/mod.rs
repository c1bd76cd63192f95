pub mod widgets;

use crate::app::{App, FocusedPanel};
use crate::feeds::DashboardStats;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use widgets::Panel;

const STATS_HEIGHT: u16 = 4;
const ACTIONS_HEIGHT: u16 = 6;

pub fn draw(frame: &mut Frame, app: &App) {
    let view = app.view();
    let has_results = !view.tweets.is_empty();

    let mut constraints = vec![Constraint::Length(3)];
    if has_results {
        constraints.push(Constraint::Length(STATS_HEIGHT));
    }
    constraints.push(Constraint::Min(10));
    constraints.push(Constraint::Length(1));

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    draw_header(frame, rows[0]);

    let (body, footer) = if has_results {
        draw_stats(frame, rows[1], &app.state.stats());
        (rows[2], rows[3])
    } else {
        (rows[1], rows[2])
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(33), Constraint::Percentage(67)])
        .split(body);

    let left = if has_results {
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(ACTIONS_HEIGHT)])
            .split(columns[0]);
        draw_actions(frame, split[1]);
        split[0]
    } else {
        columns[0]
    };

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(columns[1]);

    app.search
        .render(frame, left, &view, app.focus == FocusedPanel::Search);
    app.map
        .render(frame, right[0], &view, app.focus == FocusedPanel::Map);
    app.results
        .render(frame, right[1], &view, app.focus == FocusedPanel::Results);

    draw_footer(frame, footer, app);
}

fn draw_header(frame: &mut Frame, area: Rect) {
    let badge = |label: &'static str, color: Color| {
        Span::styled(
            format!(" {} ", label),
            Style::default().fg(Color::Black).bg(color),
        )
    };

    let title = Line::from(vec![
        Span::styled(
            "◍ Twitter Geolocation Analytics",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        badge("Real-time Analysis", Color::Green),
        Span::raw(" "),
        badge("Interactive Maps", Color::Blue),
    ]);

    let header = Paragraph::new(title).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn draw_stats(frame: &mut Frame, area: Rect, stats: &DashboardStats) {
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let entries = [
        ("Total Tweets", stats.total_tweets.to_string(), Color::Cyan),
        ("Geolocated", stats.geolocated_tweets.to_string(), Color::Green),
        ("Locations", stats.unique_locations.to_string(), Color::Yellow),
        ("Time Range", stats.time_range.to_string(), Color::Magenta),
    ];

    for ((label, value, color), cell) in entries.into_iter().zip(cells.iter()) {
        let text = vec![
            Line::from(Span::styled(
                value,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(label, Style::default().fg(Color::DarkGray))),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        frame.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block),
            *cell,
        );
    }
}

fn draw_actions(frame: &mut Frame, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Cyan));
    let text = vec![
        Line::from(vec![key("r"), Span::raw("  Refresh Data")]),
        Line::from(vec![key("e"), Span::raw("  Export CSV")]),
        Line::from(Span::styled(
            "Ctrl-R / Ctrl-E work while typing",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray))
        .title(" Export & Actions ");
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let hints = match app.focus {
        FocusedPanel::Search => "type to search · ↑↓ field · ←→ change · Enter submit",
        FocusedPanel::Map if !app.map.is_configured() => "type token · Enter initialize · Ctrl-O help",
        FocusedPanel::Map => "[ ] pin · Enter open · arrows pan · +/- zoom · p projection",
        FocusedPanel::Results => "↑↓ select · l view on map · q quit",
    };

    let mut spans = vec![
        Span::styled(" Tab", Style::default().fg(Color::Cyan)),
        Span::raw(" switch panel · "),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ];
    if let Some(status) = &app.state.status_message {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            status.as_str(),
            Style::default().fg(Color::Yellow),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ui::widgets::test_support::render_to_string;

    #[tokio::test]
    async fn test_initial_screen() {
        let app = App::new(Config::default());
        let out = render_to_string(140, 40, |f, _| draw(f, &app));

        assert!(out.contains("Twitter Geolocation Analytics"));
        assert!(out.contains("Real-time Analysis"));
        assert!(out.contains("Interactive Maps"));
        assert!(out.contains("Configure Map"));
        assert!(out.contains("Ready to Analyze"));
        assert!(out.contains(" ⌕ Search Geolocated Tweets "));
        assert!(out.contains(" Map "));
        assert!(out.contains(" Results "));
        assert!(!out.contains("Total Tweets"));
        assert!(!out.contains("Export & Actions"));
    }

    #[tokio::test]
    async fn test_status_message_in_footer() {
        let mut app = App::new(Config::default());
        app.state.status_message = Some("Exported to ./tweets.csv".to_string());
        let out = render_to_string(140, 40, |f, _| draw(f, &app));
        assert!(out.contains("Exported to ./tweets.csv"));
    }
}
