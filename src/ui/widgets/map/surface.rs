use crate::feeds::{Coordinates, Tweet};
use ratatui::{layout::Rect, Frame};
use std::sync::Arc;
use std::time::Instant;

pub type MarkerCallback = Arc<dyn Fn(&Tweet) + Send + Sync>;

/// One pin on the map. Owns a copy of the tweet so the popup and the
/// activation callback do not depend on the dashboard's list.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: Coordinates,
    pub tweet: Tweet,
}

impl Marker {
    /// `None` for tweets that carry no coordinate pair.
    pub fn for_tweet(tweet: &Tweet) -> Option<Self> {
        tweet.coordinates().map(|position| Self {
            position,
            tweet: tweet.clone(),
        })
    }
}

/// What the dashboard needs from a map widget. Everything else (tiles,
/// projection, styling) stays behind the implementation.
pub trait MapSurface: Send {
    /// Drop every existing marker and add one per tweet with coordinates.
    fn render_markers(&mut self, tweets: &[Tweet]);

    /// Animate the camera to `center` at the focus zoom.
    fn recenter(&mut self, center: Coordinates);

    fn on_marker_activate(&mut self, callback: MarkerCallback);

    fn markers(&self) -> &[Marker];

    fn hovered(&self) -> Option<usize>;

    fn hover(&mut self, index: Option<usize>);

    /// Fire the activation callback for marker `index`.
    fn activate(&mut self, index: usize);

    fn pan(&mut self, d_lng: f64, d_lat: f64);

    fn zoom_by(&mut self, delta: f64);

    fn toggle_projection(&mut self);

    /// Advance animations to `now`.
    fn tick(&mut self, now: Instant);

    fn draw(&self, frame: &mut Frame, area: Rect);
}
