//! Mapview Core - Domain models, classification, and geometric analysis
//!
//! This crate parses map documents exported from autonomous-operations
//! planning tools, classifies their shapes, and runs the analysis passes the
//! viewer layers on top of the rendered map.

pub mod analysis;
pub mod classify;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod models;
pub mod render;

pub use error::{MapviewError, Result};
