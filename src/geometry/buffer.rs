use geo::{Closest, ClosestPoint, LineString, Point};

use super::Projector;
use crate::domain::{Coordinate, RoadSegment};

/// Corridor of `radius_m` meters around a set of road segments
#[derive(Debug, Clone)]
pub struct RoadBuffer {
    projector: Projector,
    lines: Vec<LineString<f64>>,
    points: Vec<Point<f64>>,
    radius_m: f64,
}

impl RoadBuffer {
    /// Build a buffer around every segment's geometry.
    ///
    /// Returns `None` when no segment has any coordinates.
    pub fn new(segments: &[RoadSegment], radius_m: f64) -> Option<Self> {
        let all: Vec<Coordinate> = segments
            .iter()
            .flat_map(|s| s.geometry.iter().copied())
            .collect();
        let projector = Projector::centered_on(&all)?;

        let mut lines = Vec::new();
        let mut points = Vec::new();
        for segment in segments {
            let projected = projector.project_points(&segment.geometry);
            match projected.len() {
                0 => {}
                1 => points.push(Point::from(projected[0])),
                _ => lines.push(LineString::from(projected)),
            }
        }

        Some(Self {
            projector,
            lines,
            points,
            radius_m,
        })
    }

    /// Distance in meters from `point` to the nearest segment
    pub fn distance_m(&self, point: Coordinate) -> f64 {
        let p = Point::from(self.projector.project(point));

        let to_lines = self.lines.iter().filter_map(|line| match line.closest_point(&p) {
            Closest::Intersection(c) | Closest::SinglePoint(c) => Some(c),
            Closest::Indeterminate => None,
        });

        to_lines
            .chain(self.points.iter().copied())
            .map(|c| (c.x() - p.x()).hypot(c.y() - p.y()))
            .fold(f64::INFINITY, f64::min)
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        self.distance_m(point) <= self.radius_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn segment(points: &[(f64, f64)]) -> RoadSegment {
        RoadSegment {
            kind: "way".to_string(),
            id: 1,
            tags: BTreeMap::new(),
            geometry: points
                .iter()
                .map(|&(lat, lon)| Coordinate::new(lat, lon))
                .collect(),
        }
    }

    #[test]
    fn test_point_on_road_is_inside() {
        // North-south road about 2.2 km long
        let road = segment(&[(25.75, -80.20), (25.77, -80.20)]);
        let buffer = RoadBuffer::new(&[road], 500.0).unwrap();

        assert!(buffer.distance_m(Coordinate::new(25.76, -80.20)) < 1.0);
        assert!(buffer.contains(Coordinate::new(25.76, -80.20)));
    }

    #[test]
    fn test_buffer_edge() {
        let road = segment(&[(25.75, -80.20), (25.77, -80.20)]);
        let buffer = RoadBuffer::new(&[road], 500.0).unwrap();

        // 0.004 degrees of longitude at 25.76N is about 400 m
        assert!(buffer.contains(Coordinate::new(25.76, -80.196)));
        // 0.01 degrees is about 1 km
        assert!(!buffer.contains(Coordinate::new(25.76, -80.19)));
    }

    #[test]
    fn test_past_the_end_measures_to_endpoint() {
        let road = segment(&[(25.75, -80.20), (25.77, -80.20)]);
        let buffer = RoadBuffer::new(&[road], 500.0).unwrap();

        let d = buffer.distance_m(Coordinate::new(25.779, -80.20));
        assert!((d - 1000.0).abs() < 20.0);
    }

    #[test]
    fn test_single_point_segment() {
        let buffer = RoadBuffer::new(&[segment(&[(25.76, -80.20)])], 500.0).unwrap();
        assert!(buffer.contains(Coordinate::new(25.762, -80.20)));
        assert!(!buffer.contains(Coordinate::new(25.77, -80.20)));
    }

    #[test]
    fn test_empty_geometry() {
        assert!(RoadBuffer::new(&[segment(&[])], 500.0).is_none());
        assert!(RoadBuffer::new(&[], 500.0).is_none());
    }
}
