//! Mapview View - Viewport control and gesture disambiguation
//!
//! This crate owns the visible window over the map (pan, zoom, pinch, and
//! rotation, all clamped to the document's theoretical bounds) and the state
//! machine that turns a raw pointer/touch event stream into viewport
//! operations.

pub mod gesture;
pub mod viewport;

pub use gesture::{GestureEffect, GestureEvent, GestureHandler, ScreenSize, Touch};
pub use viewport::{ViewState, Viewport, ViewportConfig};
