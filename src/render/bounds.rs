//! Geographic bounding boxes for viewport fitting

use crate::core::LatLng;
use nalgebra::{Point2, Vector2};

/// Axis-aligned box in degrees; `x` is longitude, `y` is latitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    south_west: Point2<f64>,
    north_east: Point2<f64>,
}

impl GeoBounds {
    pub fn from_corner(corner: LatLng) -> Self {
        let p = Point2::new(corner.lon, corner.lat);
        Self {
            south_west: p,
            north_east: p,
        }
    }

    /// Smallest box holding every coordinate, `None` for an empty input
    pub fn from_coordinates<I>(coordinates: I) -> Option<Self>
    where
        I: IntoIterator<Item = LatLng>,
    {
        let mut iter = coordinates.into_iter();
        let mut bounds = Self::from_corner(iter.next()?);
        for coordinate in iter {
            bounds.extend(coordinate);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, coordinate: LatLng) {
        let p = Point2::new(coordinate.lon, coordinate.lat);
        self.south_west = self.south_west.inf(&p);
        self.north_east = self.north_east.sup(&p);
    }

    /// Widen every side by `ratio` of the span, clamped to the valid ranges
    pub fn padded(&self, ratio: f64) -> Self {
        let pad: Vector2<f64> = (self.north_east - self.south_west) * ratio;
        let sw = self.south_west - pad;
        let ne = self.north_east + pad;
        Self {
            south_west: Point2::new(sw.x.max(-180.0), sw.y.max(-90.0)),
            north_east: Point2::new(ne.x.min(180.0), ne.y.min(90.0)),
        }
    }

    pub fn south(&self) -> f64 {
        self.south_west.y
    }

    pub fn west(&self) -> f64 {
        self.south_west.x
    }

    pub fn north(&self) -> f64 {
        self.north_east.y
    }

    pub fn east(&self) -> f64 {
        self.north_east.x
    }

    pub fn center(&self) -> LatLng {
        let c = nalgebra::center(&self.south_west, &self.north_east);
        LatLng::new(c.y, c.x)
    }

    /// Larger of the two side lengths in degrees
    pub fn max_span(&self) -> f64 {
        let span = self.north_east - self.south_west;
        span.x.max(span.y)
    }

    pub fn contains(&self, coordinate: LatLng) -> bool {
        coordinate.lat >= self.south()
            && coordinate.lat <= self.north()
            && coordinate.lon >= self.west()
            && coordinate.lon <= self.east()
    }
}
