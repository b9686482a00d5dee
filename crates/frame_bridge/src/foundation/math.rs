//! Math types for input coordinates
//!
//! Window coordinates come from the native layer in double precision, so
//! these aliases are `f64` rather than the `f32` used for rendering.

pub use nalgebra::{Vector2, Vector3};

/// Point in window coordinates (origin bottom left)
pub type Point2 = nalgebra::Point2<f64>;

/// Scroll / drag delta on three axes
pub type Delta3 = Vector3<f64>;

/// Content size in points
pub type Size2 = Vector2<u32>;
