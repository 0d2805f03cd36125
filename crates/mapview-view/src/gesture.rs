//! Gesture disambiguation.
//!
//! A small state machine over an abstract pointer/touch event stream. The
//! host environment translates its native event objects into
//! [`GestureEvent`]s at the boundary; the machine decides whether a press
//! turned into a drag or stayed a click (5 px movement threshold), drives
//! pans and wheel zooms against a borrowed [`Viewport`], and runs the
//! two-finger pinch sub-machine. Malformed event data never throws back into
//! the host loop; the dispatcher no-ops with a warning instead.

use serde::{Deserialize, Serialize};

use crate::viewport::{ViewState, Viewport};

/// One touch point, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Touch {
    pub x: f64,
    pub y: f64,
}

impl Touch {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance_to(&self, other: &Touch) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// The host-independent event stream the machine consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GestureEvent {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64, primary_down: bool },
    PointerUp,
    Wheel { x: f64, y: f64, delta: f64 },
    TouchStart(Vec<Touch>),
    TouchMove(Vec<Touch>),
    TouchEnd,
}

/// What one event amounted to, for the host's benefit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEffect {
    /// Nothing observable happened.
    Ignored,
    /// The view panned.
    Pan,
    /// A wheel zoom was applied (or rejected at the zoom limits).
    Zoom,
    /// A two-finger pinch updated the view.
    PinchZoom,
    /// A press-and-release below the movement threshold.
    Click,
    /// A drag finished.
    DragEnd,
}

/// The drag/click portion of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum DragState {
    #[default]
    Idle,
    /// Button down, movement so far within the threshold.
    PossibleDrag { start: (f64, f64), last: (f64, f64) },
    Dragging { last: (f64, f64) },
}

/// Captured when a second finger lands; pinch scale is always computed
/// against these, never incrementally.
#[derive(Debug, Clone, Copy)]
struct PinchAnchor {
    initial_distance: f64,
    view: ViewState,
}

/// Screen dimensions in pixels, for scaling screen deltas into map units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn as_tuple(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}

/// Movement below this many pixels stays a click.
pub const DRAG_THRESHOLD_PX: f64 = 5.0;

/// The gesture disambiguator.
///
/// Owns no viewport; the controller is borrowed per event, so the host stays
/// in charge of where viewport state lives.
#[derive(Debug, Default)]
pub struct GestureHandler {
    drag: DragState,
    pinch: Option<PinchAnchor>,
}

impl GestureHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> DragState {
        self.drag
    }

    fn set_state(&mut self, state: DragState) {
        self.drag = state;
    }

    /// Feed one event through the machine.
    pub fn handle(
        &mut self,
        event: GestureEvent,
        viewport: &mut Viewport,
        screen: ScreenSize,
    ) -> GestureEffect {
        match event {
            GestureEvent::PointerDown { x, y } => {
                self.set_state(DragState::PossibleDrag { start: (x, y), last: (x, y) });
                GestureEffect::Ignored
            }
            GestureEvent::PointerMove { x, y, primary_down } => {
                self.pointer_move(x, y, primary_down, viewport, screen)
            }
            GestureEvent::PointerUp => self.pointer_up(),
            GestureEvent::Wheel { x, y, delta } => {
                // Wheel zoom does not participate in the drag machine; it
                // fires whatever state we are in.
                let direction = if delta > 0.0 { 1.0 } else { -1.0 };
                viewport.zoom(x, y, direction, screen.as_tuple());
                GestureEffect::Zoom
            }
            GestureEvent::TouchStart(touches) => self.touch_start(&touches, viewport),
            GestureEvent::TouchMove(touches) => self.touch_move(&touches, viewport, screen),
            GestureEvent::TouchEnd => {
                self.pinch = None;
                self.pointer_up()
            }
        }
    }

    fn pointer_move(
        &mut self,
        x: f64,
        y: f64,
        primary_down: bool,
        viewport: &mut Viewport,
        screen: ScreenSize,
    ) -> GestureEffect {
        if !primary_down {
            return GestureEffect::Ignored;
        }

        match self.state() {
            DragState::Idle => GestureEffect::Ignored,
            DragState::PossibleDrag { start, last } => {
                let dx = (x - start.0).abs();
                let dy = (y - start.1).abs();
                if dx > DRAG_THRESHOLD_PX || dy > DRAG_THRESHOLD_PX {
                    viewport.pan(x - last.0, y - last.1, screen.as_tuple());
                    self.set_state(DragState::Dragging { last: (x, y) });
                    GestureEffect::Pan
                } else {
                    self.set_state(DragState::PossibleDrag { start, last });
                    GestureEffect::Ignored
                }
            }
            DragState::Dragging { last } => {
                viewport.pan(x - last.0, y - last.1, screen.as_tuple());
                self.set_state(DragState::Dragging { last: (x, y) });
                GestureEffect::Pan
            }
        }
    }

    fn pointer_up(&mut self) -> GestureEffect {
        let effect = match self.state() {
            DragState::Idle => GestureEffect::Ignored,
            DragState::PossibleDrag { .. } => GestureEffect::Click,
            DragState::Dragging { .. } => GestureEffect::DragEnd,
        };
        self.set_state(DragState::Idle);
        effect
    }

    fn touch_start(&mut self, touches: &[Touch], viewport: &Viewport) -> GestureEffect {
        match touches {
            [] => {
                tracing::warn!("Touch start with empty touch list, ignoring");
                GestureEffect::Ignored
            }
            [only] => {
                // A single finger behaves like a pointer press.
                self.set_state(DragState::PossibleDrag {
                    start: (only.x, only.y),
                    last: (only.x, only.y),
                });
                GestureEffect::Ignored
            }
            [first, second, ..] => {
                let initial_distance = first.distance_to(second);
                if initial_distance <= 0.0 {
                    tracing::warn!("Touch start with coincident fingers, ignoring");
                    return GestureEffect::Ignored;
                }
                // A second finger ends any pending drag.
                self.set_state(DragState::Idle);
                self.pinch = Some(PinchAnchor { initial_distance, view: viewport.view() });
                GestureEffect::Ignored
            }
        }
    }

    fn touch_move(
        &mut self,
        touches: &[Touch],
        viewport: &mut Viewport,
        screen: ScreenSize,
    ) -> GestureEffect {
        match touches {
            [] => {
                tracing::warn!("Touch move with empty touch list, ignoring");
                GestureEffect::Ignored
            }
            [only] => self.pointer_move(only.x, only.y, true, viewport, screen),
            [first, second, ..] => {
                let anchor = match self.pinch {
                    Some(anchor) => anchor,
                    None => return GestureEffect::Ignored,
                };
                let current_distance = first.distance_to(second);
                if current_distance <= 0.0 {
                    tracing::warn!("Touch move with coincident fingers, ignoring");
                    return GestureEffect::Ignored;
                }

                let scale = anchor.initial_distance / current_distance;
                viewport.pinch_zoom(scale, anchor.view);
                GestureEffect::PinchZoom
            }
        }
    }
}
