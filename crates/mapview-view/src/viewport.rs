//! The viewport controller.
//!
//! Owns the current visible rectangle (the view state) and the outer
//! theoretical bounds it may never escape. All mutation goes through the
//! operations here; after any public operation returns, the view's width and
//! height are within the zoom limits and the view sits inside the bounds
//! (pinned to the bounds origin on any axis where it is larger than them).

use mapview_core::models::{BoundingBox, Point};
use serde::{Deserialize, Serialize};

/// Zoom limits and sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Smallest allowed view width/height, in map units.
    pub min_zoom: f64,
    /// Largest allowed view width/height, in map units.
    pub max_zoom: f64,
    /// Fractional size change per zoom step.
    pub zoom_step: f64,
    /// Rotation per rotate action, in degrees.
    pub rotate_step_degrees: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self { min_zoom: 100.0, max_zoom: 10_000.0, zoom_step: 0.1, rotate_step_degrees: 15.0 }
    }
}

/// The currently visible window, in map coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewState {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1000.0, 1000.0)
    }
}

/// The viewport controller.
#[derive(Debug, Clone)]
pub struct Viewport {
    view: ViewState,
    bounds: BoundingBox,
    rotation_degrees: f64,
    config: ViewportConfig,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

impl Viewport {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            view: ViewState::default(),
            // Placeholder until a document is loaded.
            bounds: BoundingBox::new(-5000.0, -5000.0, 20_000.0, 20_000.0),
            rotation_degrees: 0.0,
            config,
        }
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn rotation_degrees(&self) -> f64 {
        self.rotation_degrees
    }

    /// Frame a newly loaded document.
    ///
    /// Sets the theoretical bounds, resets the view to the default framing
    /// anchored at the bounds origin, and clears any accumulated rotation.
    pub fn initialize(&mut self, bounds: BoundingBox) {
        self.bounds = bounds;
        self.view = ViewState::new(
            bounds.x,
            bounds.y,
            ViewState::default().width,
            ViewState::default().height,
        );
        self.rotation_degrees = 0.0;
        self.clamp();
    }

    /// One wheel-zoom step anchored at the cursor.
    ///
    /// `direction` is positive to zoom out, negative to zoom in. The map
    /// point under `(cursor_x, cursor_y)` (screen pixels) keeps its screen
    /// position. A step that would push the width outside the zoom limits is
    /// rejected without changing state.
    pub fn zoom(
        &mut self,
        cursor_x: f64,
        cursor_y: f64,
        direction: f64,
        screen: (f64, f64),
    ) -> bool {
        let (screen_w, screen_h) = screen;
        if screen_w <= 0.0 || screen_h <= 0.0 {
            tracing::warn!("Zoom ignored: degenerate screen size {}x{}", screen_w, screen_h);
            return false;
        }

        let step = self.config.zoom_step * direction.signum();
        let new_width = self.view.width * (1.0 + step);
        let new_height = self.view.height * (1.0 + step);
        if new_width < self.config.min_zoom || new_width > self.config.max_zoom {
            return false;
        }

        // Cursor position as a fraction of the screen, preserved across the
        // resize so the map point under it stays put.
        let fx = cursor_x / screen_w;
        let fy = cursor_y / screen_h;
        let anchor_x = self.view.x + fx * self.view.width;
        let anchor_y = self.view.y + fy * self.view.height;

        self.view.width = new_width;
        self.view.height = new_height;
        self.view.x = anchor_x - fx * new_width;
        self.view.y = anchor_y - fy * new_height;

        self.clamp();
        true
    }

    /// Translate the view by a screen-pixel delta.
    pub fn pan(&mut self, dx_screen: f64, dy_screen: f64, screen: (f64, f64)) {
        let (screen_w, screen_h) = screen;
        if screen_w <= 0.0 || screen_h <= 0.0 {
            tracing::warn!("Pan ignored: degenerate screen size {}x{}", screen_w, screen_h);
            return;
        }

        self.view.x -= dx_screen * (self.view.width / screen_w);
        self.view.y -= dy_screen * (self.view.height / screen_h);
        self.clamp();
    }

    /// Scale relative to a captured anchor view, for two-finger pinches.
    ///
    /// Unlike [`zoom`](Self::zoom), the scale is absolute against the view
    /// state captured when the second finger landed, not incremental. The
    /// anchor's center stays fixed. The same zoom-limit rejection and
    /// clamping contract applies.
    pub fn pinch_zoom(&mut self, scale: f64, anchor: ViewState) -> bool {
        if !scale.is_finite() || scale <= 0.0 {
            tracing::warn!("Pinch ignored: degenerate scale {}", scale);
            return false;
        }

        let new_width = anchor.width * scale;
        let new_height = anchor.height * scale;
        if new_width < self.config.min_zoom || new_width > self.config.max_zoom {
            return false;
        }

        let center = anchor.center();
        self.view = ViewState::new(
            center.x - new_width / 2.0,
            center.y - new_height / 2.0,
            new_width,
            new_height,
        );
        self.clamp();
        true
    }

    /// Accumulate one rotation step; returns the new total angle in degrees.
    ///
    /// Rotation transforms rendered geometry, never the view rectangle.
    pub fn rotate(&mut self, direction: i32) -> f64 {
        self.rotation_degrees += direction as f64 * self.config.rotate_step_degrees;
        self.rotation_degrees
    }

    /// Apply the accumulated rotation to a point set, about the view center.
    pub fn rotate_points(&self, points: &[Point]) -> Vec<Point> {
        let center = self.view.center();
        let angle = self.rotation_degrees.to_radians();
        let (sin, cos) = angle.sin_cos();

        points
            .iter()
            .map(|p| {
                let dx = p.x - center.x;
                let dy = p.y - center.y;
                Point::new(
                    center.x + dx * cos - dy * sin,
                    center.y + dx * sin + dy * cos,
                )
            })
            .collect()
    }

    /// Pin the view back inside the theoretical bounds.
    ///
    /// When the view is larger than the bounds on an axis, that axis pins to
    /// the bounds origin instead of producing an out-of-range window.
    fn clamp(&mut self) {
        self.view.x =
            clamp_axis(self.view.x, self.bounds.x, self.bounds.max_x() - self.view.width);
        self.view.y =
            clamp_axis(self.view.y, self.bounds.y, self.bounds.max_y() - self.view.height);
    }
}

fn clamp_axis(value: f64, lo: f64, hi: f64) -> f64 {
    if hi < lo {
        lo
    } else {
        value.max(lo).min(hi)
    }
}
