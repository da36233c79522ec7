//! Map surface abstraction
//!
//! The surface is whatever draws primitives over map tiles. The crate only
//! ever talks to it through [`MapSurface`], and only the view renderer holds
//! one.

use crate::core::LatLng;
use crate::render::GeoBounds;
use serde::{Deserialize, Serialize};

/// Opaque handle for a primitive created on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId(pub u64);

/// Stroke and fill settings for a primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveStyle {
    pub color: String,
    /// Marker radius in pixels
    pub radius: f32,
    /// Line width in pixels
    pub weight: f32,
    pub opacity: f32,
}

impl PrimitiveStyle {
    pub fn marker(color: &str) -> Self {
        Self {
            color: color.to_string(),
            radius: 4.0,
            weight: 1.0,
            opacity: 0.7,
        }
    }

    pub fn path(color: &str) -> Self {
        Self {
            color: color.to_string(),
            radius: 0.0,
            weight: 3.0,
            opacity: 0.7,
        }
    }
}

/// Visible map area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: u8,
}

/// Drawing target for track primitives
pub trait MapSurface {
    /// Create a point marker; new primitives start detached
    fn create_marker(&mut self, at: LatLng, style: &PrimitiveStyle) -> PrimitiveId;

    /// Create a polyline through `vertices`; new primitives start detached
    fn create_path(&mut self, vertices: &[LatLng], style: &PrimitiveStyle) -> PrimitiveId;

    /// Replace the vertex data of an existing path
    fn set_path_vertices(&mut self, path: PrimitiveId, vertices: &[LatLng]);

    /// Show a primitive. Attaching an attached primitive is a no-op.
    fn attach(&mut self, id: PrimitiveId);

    /// Hide a primitive without destroying it
    fn detach(&mut self, id: PrimitiveId);

    /// Detach and destroy a primitive; the id becomes invalid
    fn discard(&mut self, id: PrimitiveId);

    fn is_attached(&self, id: PrimitiveId) -> bool;

    fn set_view(&mut self, center: LatLng, zoom: u8);

    /// Move and zoom so that `bounds` is fully visible
    fn fit_bounds(&mut self, bounds: &GeoBounds);

    fn viewport(&self) -> Viewport;
}
