//! In-memory map surface for headless sessions and testing

use crate::core::{LatLng, MAX_MAP_ZOOM};
use crate::render::{GeoBounds, MapSurface, PrimitiveId, PrimitiveStyle, Viewport};
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

/// Geometry of a stored primitive
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveShape {
    Marker(LatLng),
    Path(Vec<LatLng>),
}

#[derive(Debug, Clone)]
pub struct StoredPrimitive {
    pub shape: PrimitiveShape,
    pub style: PrimitiveStyle,
}

/// Surface that records primitives and attachment state instead of drawing
#[derive(Debug)]
pub struct InMemorySurface {
    primitives: HashMap<PrimitiveId, StoredPrimitive>,
    attached: BTreeSet<PrimitiveId>,
    next_id: u64,
    viewport: Viewport,
    last_fit: Option<GeoBounds>,
    discarded: usize,
}

impl InMemorySurface {
    pub fn new(center: LatLng, zoom: u8) -> Self {
        Self {
            primitives: HashMap::new(),
            attached: BTreeSet::new(),
            next_id: 1,
            viewport: Viewport { center, zoom },
            last_fit: None,
            discarded: 0,
        }
    }

    pub fn primitive(&self, id: PrimitiveId) -> Option<&StoredPrimitive> {
        self.primitives.get(&id)
    }

    /// Ids of every primitive currently shown
    pub fn attached_ids(&self) -> &BTreeSet<PrimitiveId> {
        &self.attached
    }

    pub fn attached_marker_count(&self) -> usize {
        self.count_attached(|shape| matches!(shape, PrimitiveShape::Marker(_)))
    }

    pub fn attached_path_count(&self) -> usize {
        self.count_attached(|shape| matches!(shape, PrimitiveShape::Path(_)))
    }

    /// Coordinates of all attached markers, ordered by creation
    pub fn attached_marker_positions(&self) -> Vec<LatLng> {
        self.attached
            .iter()
            .filter_map(|id| match self.primitives.get(id).map(|p| &p.shape) {
                Some(PrimitiveShape::Marker(at)) => Some(*at),
                _ => None,
            })
            .collect()
    }

    /// Vertices of the first attached path, if any
    pub fn attached_path_vertices(&self) -> Option<Vec<LatLng>> {
        self.attached
            .iter()
            .find_map(|id| match self.primitives.get(id).map(|p| &p.shape) {
                Some(PrimitiveShape::Path(vertices)) => Some(vertices.clone()),
                _ => None,
            })
    }

    /// Number of live (not discarded) primitives, attached or not
    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    pub fn discarded_count(&self) -> usize {
        self.discarded
    }

    pub fn last_fit(&self) -> Option<&GeoBounds> {
        self.last_fit.as_ref()
    }

    fn count_attached(&self, predicate: impl Fn(&PrimitiveShape) -> bool) -> usize {
        self.attached
            .iter()
            .filter(|id| self.primitives.get(id).map_or(false, |p| predicate(&p.shape)))
            .count()
    }

    fn insert(&mut self, shape: PrimitiveShape, style: &PrimitiveStyle) -> PrimitiveId {
        let id = PrimitiveId(self.next_id);
        self.next_id += 1;
        self.primitives.insert(
            id,
            StoredPrimitive {
                shape,
                style: style.clone(),
            },
        );
        id
    }
}

impl Default for InMemorySurface {
    fn default() -> Self {
        let (lat, lon) = crate::core::DEFAULT_MAP_CENTER;
        Self::new(LatLng::new(lat, lon), crate::core::DEFAULT_MAP_ZOOM)
    }
}

impl MapSurface for InMemorySurface {
    fn create_marker(&mut self, at: LatLng, style: &PrimitiveStyle) -> PrimitiveId {
        self.insert(PrimitiveShape::Marker(at), style)
    }

    fn create_path(&mut self, vertices: &[LatLng], style: &PrimitiveStyle) -> PrimitiveId {
        self.insert(PrimitiveShape::Path(vertices.to_vec()), style)
    }

    fn set_path_vertices(&mut self, path: PrimitiveId, vertices: &[LatLng]) {
        match self.primitives.get_mut(&path) {
            Some(StoredPrimitive {
                shape: PrimitiveShape::Path(current),
                ..
            }) => {
                current.clear();
                current.extend_from_slice(vertices);
            }
            _ => warn!(id = path.0, "set_path_vertices on a primitive that is not a path"),
        }
    }

    fn attach(&mut self, id: PrimitiveId) {
        if self.primitives.contains_key(&id) {
            self.attached.insert(id);
        } else {
            warn!(id = id.0, "attach of unknown primitive");
        }
    }

    fn detach(&mut self, id: PrimitiveId) {
        self.attached.remove(&id);
    }

    fn discard(&mut self, id: PrimitiveId) {
        self.attached.remove(&id);
        if self.primitives.remove(&id).is_some() {
            self.discarded += 1;
        }
    }

    fn is_attached(&self, id: PrimitiveId) -> bool {
        self.attached.contains(&id)
    }

    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.viewport = Viewport {
            center,
            zoom: zoom.min(MAX_MAP_ZOOM),
        };
    }

    fn fit_bounds(&mut self, bounds: &GeoBounds) {
        // Web-mercator tiles halve their span per zoom level
        let span = bounds.max_span();
        let zoom = if span <= 0.0 {
            MAX_MAP_ZOOM
        } else {
            (360.0 / span).log2().floor().clamp(0.0, MAX_MAP_ZOOM as f64) as u8
        };
        self.viewport = Viewport {
            center: bounds.center(),
            zoom,
        };
        self.last_fit = Some(*bounds);
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_primitives_start_detached() {
        let mut surface = InMemorySurface::default();
        let marker = surface.create_marker(LatLng::new(1.0, 2.0), &PrimitiveStyle::marker("blue"));
        assert!(!surface.is_attached(marker));
        surface.attach(marker);
        assert!(surface.is_attached(marker));
        assert_eq!(surface.attached_marker_count(), 1);
    }

    #[test]
    fn test_detach_keeps_primitive() {
        let mut surface = InMemorySurface::default();
        let marker = surface.create_marker(LatLng::new(1.0, 2.0), &PrimitiveStyle::marker("blue"));
        surface.attach(marker);
        surface.detach(marker);
        assert!(!surface.is_attached(marker));
        assert!(surface.primitive(marker).is_some());
    }

    #[test]
    fn test_discard_removes_primitive() {
        let mut surface = InMemorySurface::default();
        let marker = surface.create_marker(LatLng::new(1.0, 2.0), &PrimitiveStyle::marker("blue"));
        surface.attach(marker);
        surface.discard(marker);
        assert!(surface.primitive(marker).is_none());
        assert_eq!(surface.attached_marker_count(), 0);
        assert_eq!(surface.discarded_count(), 1);
    }

    #[test]
    fn test_path_vertices_replaced_in_place() {
        let mut surface = InMemorySurface::default();
        let path = surface.create_path(&[LatLng::new(0.0, 0.0)], &PrimitiveStyle::path("green"));
        surface.attach(path);
        surface.set_path_vertices(path, &[LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0)]);
        assert_eq!(surface.attached_path_vertices().unwrap().len(), 2);
        assert_eq!(surface.primitive_count(), 1);
    }

    #[test]
    fn test_fit_bounds_centers_viewport() {
        let mut surface = InMemorySurface::default();
        let bounds = GeoBounds::from_coordinates(vec![LatLng::new(10.0, 10.0), LatLng::new(20.0, 20.0)]).unwrap();
        surface.fit_bounds(&bounds);
        let viewport = surface.viewport();
        assert!((viewport.center.lat - 15.0).abs() < 1e-9);
        assert!((viewport.center.lon - 15.0).abs() < 1e-9);
        assert_eq!(viewport.zoom, 5);
        assert!(surface.last_fit().is_some());
    }
}
