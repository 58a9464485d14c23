use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A WGS84 position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A matched road element as returned by Overpass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    /// OSM element type, `way` or `relation`
    #[serde(rename = "type")]
    pub kind: String,
    pub id: u64,
    /// Tags, sorted by key
    pub tags: BTreeMap<String, String>,
    pub geometry: Vec<Coordinate>,
}

impl RoadSegment {
    pub fn name(&self) -> Option<&str> {
        self.tags.get("name").map(String::as_str)
    }

    pub fn reference(&self) -> Option<&str> {
        self.tags.get("ref").map(String::as_str)
    }

    /// Road classification: the `highway` tag for ways, `route` for relations
    pub fn road_type(&self) -> Option<&str> {
        self.tags
            .get("highway")
            .or_else(|| self.tags.get("route"))
            .map(String::as_str)
    }

    /// Label for console output, preferring `name` then `ref`
    pub fn label(&self) -> &str {
        self.name().or_else(|| self.reference()).unwrap_or("(unnamed)")
    }
}

/// Whether a search matched anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Matches(usize),
    NoResultsFound,
}

/// Ordered road segments from one search. Built once, then read only.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    segments: Vec<RoadSegment>,
}

impl ResultSet {
    pub fn new(segments: Vec<RoadSegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[RoadSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn status(&self) -> SearchStatus {
        if self.segments.is_empty() {
            SearchStatus::NoResultsFound
        } else {
            SearchStatus::Matches(self.segments.len())
        }
    }

    /// Total number of coordinates across all segments
    pub fn point_count(&self) -> usize {
        self.segments.iter().map(|s| s.geometry.len()).sum()
    }
}
