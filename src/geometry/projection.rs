use crate::domain::Coordinate;

/// Equirectangular projection from WGS84 to local meters
///
/// - x = (lon - center_lon) * cos(center_lat) * 111320
/// - y = (lat - center_lat) * 111320
///
/// Accurate enough for buffer tests along a road within a ~100 km search
/// area, without pulling in a full projection library.
#[derive(Debug, Clone)]
pub struct Projector {
    center: Coordinate,
    cos_lat: f64,
}

impl Projector {
    /// Meters per degree at the equator
    const METERS_PER_DEGREE: f64 = 111_320.0;

    pub fn new(center: Coordinate) -> Self {
        Self {
            center,
            cos_lat: center.lat.to_radians().cos(),
        }
    }

    /// Projector centered on the mean of `points`
    pub fn centered_on(points: &[Coordinate]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let lat = points.iter().map(|c| c.lat).sum::<f64>() / n;
        let lon = points.iter().map(|c| c.lon).sum::<f64>() / n;
        Some(Self::new(Coordinate::new(lat, lon)))
    }

    /// Project a point to (x, y) meters from the center
    pub fn project(&self, point: Coordinate) -> (f64, f64) {
        let x = (point.lon - self.center.lon) * self.cos_lat * Self::METERS_PER_DEGREE;
        let y = (point.lat - self.center.lat) * Self::METERS_PER_DEGREE;
        (x, y)
    }

    pub fn project_points(&self, points: &[Coordinate]) -> Vec<(f64, f64)> {
        points.iter().map(|&p| self.project(p)).collect()
    }
}
