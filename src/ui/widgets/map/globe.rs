use super::popup::Popup;
use super::surface::{MapSurface, Marker, MarkerCallback};
use super::AccessToken;
use crate::config::{MapConfig, Projection};
use crate::feeds::{Coordinates, Tweet};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Map, MapResolution, Points},
        Block, Borders, Clear, Paragraph,
    },
    Frame,
};
use std::time::{Duration, Instant};
use tracing::{debug, info};

const MIN_ZOOM: f64 = 0.0;
const MAX_ZOOM: f64 = 18.0;
const MAX_LAT: f64 = 85.0;

/// Half-height of the view at zoom 2, in unit-sphere units for the globe
/// and in degrees for the flat map.
const GLOBE_HALF_HEIGHT: f64 = 1.15;
const FLAT_HALF_HEIGHT: f64 = 90.0;

const GRATICULE_STEP: i32 = 30;
const SAMPLE_STEP: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: Coordinates,
    pub zoom: f64,
}

#[derive(Debug, Clone, Copy)]
struct Flight {
    from: Camera,
    to: Camera,
    started: Instant,
    duration: Duration,
}

impl Flight {
    /// Camera position `elapsed` into the flight, and whether it landed.
    fn camera_at(&self, elapsed: Duration) -> (Camera, bool) {
        if self.duration.is_zero() || elapsed >= self.duration {
            return (self.to, true);
        }
        let t = ease_in_out(elapsed.as_secs_f64() / self.duration.as_secs_f64());

        let d_lng = wrap_lng(self.to.center.lng() - self.from.center.lng());
        let lng = wrap_lng(self.from.center.lng() + d_lng * t);
        let lat = lerp(self.from.center.lat(), self.to.center.lat(), t);
        let zoom = lerp(self.from.zoom, self.to.zoom, t);

        (
            Camera {
                center: Coordinates::new(lng, lat),
                zoom,
            },
            false,
        )
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Normalise a longitude into `[-180, 180)`.
pub fn wrap_lng(lng: f64) -> f64 {
    if (-180.0..180.0).contains(&lng) {
        return lng;
    }
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

/// Orthographic projection onto the unit disc as seen from above `center`.
/// Points on the far hemisphere are not visible and yield `None`.
pub fn project_orthographic(point: Coordinates, center: Coordinates) -> Option<(f64, f64)> {
    let lat = point.lat().to_radians();
    let lat0 = center.lat().to_radians();
    let d_lng = (point.lng() - center.lng()).to_radians();

    let cos_c = lat0.sin() * lat.sin() + lat0.cos() * lat.cos() * d_lng.cos();
    if cos_c < 0.0 {
        return None;
    }

    let x = lat.cos() * d_lng.sin();
    let y = lat0.cos() * lat.sin() - lat0.sin() * lat.cos() * d_lng.cos();
    Some((x, y))
}

/// Map surface drawn on a ratatui braille canvas. The globe view is an
/// orthographic projection with a graticule; the flat view uses ratatui's
/// bundled world outline.
pub struct CanvasGlobe {
    token: AccessToken,
    projection: Projection,
    camera: Camera,
    flight: Option<Flight>,
    focus_zoom: f64,
    fly_duration: Duration,
    markers: Vec<Marker>,
    hovered: Option<usize>,
    on_activate: Option<MarkerCallback>,
}

impl CanvasGlobe {
    pub fn new(token: AccessToken, config: &MapConfig) -> Self {
        info!(
            projection = ?config.projection,
            zoom = config.initial_zoom,
            "map surface initialised"
        );
        Self {
            token,
            projection: config.projection,
            camera: Camera {
                center: Coordinates::from(config.initial_center),
                zoom: config.initial_zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            },
            flight: None,
            focus_zoom: config.focus_zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            fly_duration: config.fly_duration(),
            markers: Vec::new(),
            hovered: None,
            on_activate: None,
        }
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    fn scale(&self) -> f64 {
        2f64.powf(self.camera.zoom - 2.0)
    }

    /// Canvas bounds for `area`, keeping braille dots roughly square.
    fn bounds(&self, area: Rect) -> ([f64; 2], [f64; 2]) {
        let aspect = if area.height == 0 {
            1.0
        } else {
            (area.width as f64 * 2.0) / (area.height as f64 * 4.0)
        };
        let base = match self.projection {
            Projection::Globe => GLOBE_HALF_HEIGHT,
            Projection::Flat => FLAT_HALF_HEIGHT,
        };
        let half_h = base / self.scale();
        let half_w = half_h * aspect;

        match self.projection {
            Projection::Globe => ([-half_w, half_w], [-half_h, half_h]),
            Projection::Flat => {
                let c = self.camera.center;
                (
                    [c.lng() - half_w, c.lng() + half_w],
                    [c.lat() - half_h, c.lat() + half_h],
                )
            }
        }
    }

    /// Canvas position of `point`, or `None` when it is out of sight.
    fn place(&self, point: Coordinates) -> Option<(f64, f64)> {
        match self.projection {
            Projection::Globe => project_orthographic(point, self.camera.center),
            Projection::Flat => {
                let center = self.camera.center.lng();
                let lng = center + wrap_lng(point.lng() - center);
                Some((lng, point.lat()))
            }
        }
    }

    fn paint_globe(&self, ctx: &mut Context) {
        ctx.draw(&Circle {
            x: 0.0,
            y: 0.0,
            radius: 1.0,
            color: Color::Blue,
        });

        let mut graticule = Vec::new();
        for lat in (-90 + GRATICULE_STEP..90).step_by(GRATICULE_STEP as usize) {
            let mut lng = -180.0;
            while lng < 180.0 {
                if let Some(p) = self.place(Coordinates::new(lng, lat as f64)) {
                    graticule.push(p);
                }
                lng += SAMPLE_STEP;
            }
        }
        for lng in (-180..180).step_by(GRATICULE_STEP as usize) {
            let mut lat = -90.0;
            while lat <= 90.0 {
                if let Some(p) = self.place(Coordinates::new(lng as f64, lat)) {
                    graticule.push(p);
                }
                lat += SAMPLE_STEP;
            }
        }
        ctx.draw(&Points {
            coords: &graticule,
            color: Color::DarkGray,
        });
    }

    fn paint_markers(&self, ctx: &mut Context) {
        for (idx, marker) in self.markers.iter().enumerate() {
            let Some((x, y)) = self.place(marker.position) else {
                continue;
            };
            if Some(idx) == self.hovered {
                ctx.print(
                    x,
                    y,
                    Span::styled(
                        "◉",
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                );
            } else {
                ctx.print(x, y, Span::styled("●", Style::default().fg(Color::Cyan)));
            }
        }
    }

    fn draw_popup(&self, frame: &mut Frame, area: Rect) {
        let Some(marker) = self.hovered.and_then(|i| self.markers.get(i)) else {
            return;
        };
        let width = area.width.min(40);
        if width < 14 || area.height < 5 {
            return;
        }

        let lines = Popup::for_tweet(&marker.tweet).lines(width as usize - 2);
        let height = (lines.len() as u16 + 2).min(area.height);
        let popup_area = Rect::new(area.right() - width, area.y, width, height);

        frame.render_widget(Clear, popup_area);
        let popup = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(popup, popup_area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        if area.height < 2 {
            return;
        }
        let status_area = Rect::new(area.x, area.bottom() - 1, area.width, 1);
        let projection = match self.projection {
            Projection::Globe => "globe",
            Projection::Flat => "flat",
        };
        let status = Line::from(vec![
            Span::styled(
                format!(
                    "{} · zoom {:.1} · {}",
                    self.camera.center, self.camera.zoom, projection
                ),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                format!("  ⚿ {}", self.token.masked()),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        frame.render_widget(Paragraph::new(status), status_area);
    }
}

impl MapSurface for CanvasGlobe {
    fn render_markers(&mut self, tweets: &[Tweet]) {
        self.markers.clear();
        self.hovered = None;
        self.markers.extend(tweets.iter().filter_map(Marker::for_tweet));
        debug!(count = self.markers.len(), "markers rebuilt");
    }

    fn recenter(&mut self, center: Coordinates) {
        info!(lng = center.lng(), lat = center.lat(), "flying to focus");
        self.flight = Some(Flight {
            from: self.camera,
            to: Camera {
                center: Coordinates::new(
                    wrap_lng(center.lng()),
                    center.lat().clamp(-MAX_LAT, MAX_LAT),
                ),
                zoom: self.focus_zoom,
            },
            started: Instant::now(),
            duration: self.fly_duration,
        });
    }

    fn on_marker_activate(&mut self, callback: MarkerCallback) {
        self.on_activate = Some(callback);
    }

    fn markers(&self) -> &[Marker] {
        &self.markers
    }

    fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    fn hover(&mut self, index: Option<usize>) {
        self.hovered = index.filter(|i| *i < self.markers.len());
    }

    fn activate(&mut self, index: usize) {
        let Some(marker) = self.markers.get(index) else {
            return;
        };
        self.hovered = Some(index);
        debug!(id = %marker.tweet.id, "marker activated");
        if let Some(callback) = &self.on_activate {
            callback(&marker.tweet);
        }
    }

    /// Deltas are in degrees at zoom 2 and shrink as the view zooms in.
    fn pan(&mut self, d_lng: f64, d_lat: f64) {
        self.flight = None;
        let scale = self.scale();
        let c = self.camera.center;
        self.camera.center = Coordinates::new(
            wrap_lng(c.lng() + d_lng / scale),
            (c.lat() + d_lat / scale).clamp(-MAX_LAT, MAX_LAT),
        );
    }

    fn zoom_by(&mut self, delta: f64) {
        self.flight = None;
        self.camera.zoom = (self.camera.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    fn toggle_projection(&mut self) {
        self.projection = match self.projection {
            Projection::Globe => Projection::Flat,
            Projection::Flat => Projection::Globe,
        };
    }

    fn tick(&mut self, now: Instant) {
        let Some(flight) = self.flight else {
            return;
        };
        let (camera, landed) = flight.camera_at(now.saturating_duration_since(flight.started));
        self.camera = camera;
        if landed {
            self.flight = None;
        }
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let (x_bounds, y_bounds) = self.bounds(area);
        let canvas = Canvas::default()
            .marker(symbols::Marker::Braille)
            .x_bounds(x_bounds)
            .y_bounds(y_bounds)
            .paint(|ctx| {
                match self.projection {
                    Projection::Globe => self.paint_globe(ctx),
                    Projection::Flat => ctx.draw(&Map {
                        resolution: MapResolution::High,
                        color: Color::DarkGray,
                    }),
                }
                ctx.layer();
                self.paint_markers(ctx);
            });
        frame.render_widget(canvas, area);

        self.draw_popup(frame, area);
        self.draw_status(frame, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::mock::generate_mock_tweets;
    use std::sync::Mutex;

    fn globe() -> CanvasGlobe {
        CanvasGlobe::new(
            AccessToken::parse("pk.test-token").unwrap(),
            &MapConfig::default(),
        )
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_initial_camera_from_config() {
        let g = globe();
        assert_eq!(g.camera().center, Coordinates::new(0.0, 20.0));
        assert_eq!(g.camera().zoom, 2.0);
        assert_eq!(g.projection(), Projection::Globe);
        assert!(g.markers().is_empty());
    }

    #[test]
    fn test_orthographic_projection() {
        let center = Coordinates::new(0.0, 0.0);
        let (x, y) = project_orthographic(center, center).unwrap();
        assert!(close(x, 0.0) && close(y, 0.0));

        let (x, y) = project_orthographic(Coordinates::new(90.0, 0.0), center).unwrap();
        assert!(close(x, 1.0) && close(y, 0.0));

        let (x, y) = project_orthographic(Coordinates::new(0.0, 90.0), center).unwrap();
        assert!(close(x, 0.0) && close(y, 1.0));

        assert!(project_orthographic(Coordinates::new(180.0, 0.0), center).is_none());
    }

    #[test]
    fn test_wrap_lng() {
        assert!(close(wrap_lng(190.0), -170.0));
        assert!(close(wrap_lng(-190.0), 170.0));
        assert!(close(wrap_lng(45.0), 45.0));
    }

    #[test]
    fn test_render_markers_replaces_previous_set() {
        let mut g = globe();
        g.render_markers(&generate_mock_tweets("storm"));
        assert_eq!(g.markers().len(), 5);
        g.hover(Some(3));

        let mut tweets = generate_mock_tweets("flood");
        tweets[0].location = None;
        tweets[1].location.as_mut().unwrap().coordinates = None;
        g.render_markers(&tweets);

        assert_eq!(g.markers().len(), 3);
        assert!(g.markers().iter().all(|m| m.tweet.text.contains("flood")));
        assert_eq!(g.hovered(), None);

        g.render_markers(&[]);
        assert!(g.markers().is_empty());
    }

    #[test]
    fn test_hover_ignores_out_of_range() {
        let mut g = globe();
        g.render_markers(&generate_mock_tweets("storm"));
        g.hover(Some(9));
        assert_eq!(g.hovered(), None);
        g.hover(Some(2));
        assert_eq!(g.hovered(), Some(2));
    }

    #[test]
    fn test_activate_reports_the_same_tweet() {
        let tweets = generate_mock_tweets("storm");
        let seen: std::sync::Arc<Mutex<Vec<Tweet>>> = Default::default();
        let sink = seen.clone();

        let mut g = globe();
        g.on_marker_activate(std::sync::Arc::new(move |t: &Tweet| {
            sink.lock().unwrap().push(t.clone());
        }));
        g.render_markers(&tweets);
        g.activate(3);
        g.activate(42);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], tweets[3]);
    }

    #[test]
    fn test_recenter_flies_to_focus_zoom() {
        let mut g = globe();
        let target = Coordinates::new(-122.4194, 37.7749);
        g.recenter(target);
        assert!(g.is_flying());

        g.tick(Instant::now() + Duration::from_millis(2000));
        assert!(!g.is_flying());
        assert_eq!(g.camera().center, target);
        assert_eq!(g.camera().zoom, 10.0);
    }

    #[test]
    fn test_flight_midpoint_is_between_endpoints() {
        let flight = Flight {
            from: Camera {
                center: Coordinates::new(0.0, 0.0),
                zoom: 2.0,
            },
            to: Camera {
                center: Coordinates::new(40.0, 20.0),
                zoom: 10.0,
            },
            started: Instant::now(),
            duration: Duration::from_millis(2000),
        };

        let (start, landed) = flight.camera_at(Duration::ZERO);
        assert!(!landed);
        assert_eq!(start.center, Coordinates::new(0.0, 0.0));

        let (mid, landed) = flight.camera_at(Duration::from_millis(1000));
        assert!(!landed);
        assert!(close(mid.center.lng(), 20.0));
        assert!(close(mid.center.lat(), 10.0));
        assert!(close(mid.zoom, 6.0));
    }

    #[test]
    fn test_flight_takes_short_way_round_antimeridian() {
        let flight = Flight {
            from: Camera {
                center: Coordinates::new(170.0, 0.0),
                zoom: 2.0,
            },
            to: Camera {
                center: Coordinates::new(-170.0, 0.0),
                zoom: 2.0,
            },
            started: Instant::now(),
            duration: Duration::from_millis(1000),
        };
        let (mid, _) = flight.camera_at(Duration::from_millis(500));
        assert!(close(mid.center.lng().abs(), 180.0));
    }

    #[test]
    fn test_pan_and_zoom_cancel_flight() {
        let mut g = globe();
        g.recenter(Coordinates::new(10.0, 10.0));
        g.pan(10.0, 0.0);
        assert!(!g.is_flying());
        assert!(close(g.camera().center.lng(), 10.0));

        g.zoom_by(100.0);
        assert_eq!(g.camera().zoom, MAX_ZOOM);
        g.zoom_by(-100.0);
        assert_eq!(g.camera().zoom, MIN_ZOOM);
    }

    #[test]
    fn test_pan_clamps_latitude() {
        let mut g = globe();
        g.pan(0.0, 500.0);
        assert_eq!(g.camera().center.lat(), MAX_LAT);
    }

    #[test]
    fn test_toggle_projection() {
        let mut g = globe();
        g.toggle_projection();
        assert_eq!(g.projection(), Projection::Flat);
        g.toggle_projection();
        assert_eq!(g.projection(), Projection::Globe);
    }

    #[test]
    fn test_far_side_marker_is_hidden_on_globe() {
        let mut g = globe();
        g.camera.center = Coordinates::new(0.0, 0.0);
        assert!(g.place(Coordinates::new(179.0, 0.0)).is_none());
        g.toggle_projection();
        assert!(g.place(Coordinates::new(179.0, 0.0)).is_some());
    }
}
