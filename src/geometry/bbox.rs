use geo::{BoundingRect, MultiPoint, Point};

use crate::domain::Coordinate;

/// Geographic bounding box in degrees (WGS84)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Square box of `half_size_deg` on each side of `center`.
    ///
    /// 0.45 degrees is roughly 50 km of latitude.
    pub fn around(center: Coordinate, half_size_deg: f64) -> Self {
        Self {
            south: center.lat - half_size_deg,
            west: center.lon - half_size_deg,
            north: center.lat + half_size_deg,
            east: center.lon + half_size_deg,
        }
    }

    /// Tight box around all points, or `None` when there are none
    pub fn from_coordinates<'a>(points: impl IntoIterator<Item = &'a Coordinate>) -> Option<Self> {
        let multi: MultiPoint<f64> = points
            .into_iter()
            .map(|c| Point::new(c.lon, c.lat))
            .collect();

        let rect = multi.bounding_rect()?;
        Some(Self {
            south: rect.min().y,
            west: rect.min().x,
            north: rect.max().y,
            east: rect.max().x,
        })
    }

    /// Grow each side by `factor` of the extent plus `min_pad_deg`
    pub fn padded(&self, factor: f64, min_pad_deg: f64) -> Self {
        let pad_lon = (self.east - self.west) * factor + min_pad_deg;
        let pad_lat = (self.north - self.south) * factor + min_pad_deg;

        Self {
            south: self.south - pad_lat,
            west: self.west - pad_lon,
            north: self.north + pad_lat,
            east: self.east + pad_lon,
        }
    }

    pub fn contains(&self, point: &Coordinate) -> bool {
        (self.south..=self.north).contains(&point.lat) && (self.west..=self.east).contains(&point.lon)
    }

    /// Overpass QL bbox filter body: `south,west,north,east`
    pub fn to_overpass(&self) -> String {
        format!("{},{},{},{}", self.south, self.west, self.north, self.east)
    }
}
