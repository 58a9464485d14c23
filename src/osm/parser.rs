use crate::api::OverpassResponse;
use crate::api::overpass::Element;
use crate::domain::{Coordinate, ResultSet, RoadSegment};
use std::collections::HashSet;

/// Parse an `out geom` road response into a result set
///
/// # Algorithm
/// 1. Keep way and relation elements, in response order
/// 2. Ways carry their own `geometry`; relations concatenate their members'
///    geometries in member order
/// 3. Skip elements that end up with no coordinates
/// 4. Tags pass through unchanged
pub fn parse_road_segments(response: &OverpassResponse) -> ResultSet {
    let segments = response
        .elements
        .iter()
        .filter_map(|element| {
            let geometry = match element.type_.as_str() {
                "way" => element.geometry.clone().unwrap_or_default(),
                "relation" => relation_geometry(element),
                _ => return None,
            };

            if geometry.is_empty() {
                return None;
            }

            Some(RoadSegment {
                kind: element.type_.clone(),
                id: element.id,
                tags: element
                    .tags
                    .as_ref()
                    .map(|t| t.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                    .unwrap_or_default(),
                geometry,
            })
        })
        .collect();

    ResultSet::new(segments)
}

fn relation_geometry(element: &Element) -> Vec<Coordinate> {
    element
        .members
        .iter()
        .flatten()
        .filter_map(|m| m.geometry.as_ref())
        .flatten()
        .copied()
        .collect()
}

/// A city or town element before buffer filtering and reverse geocoding
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceCandidate {
    pub placename: String,
    pub placename_ascii: String,
    pub placename_en: String,
    pub placetag: String,
    pub position: Coordinate,
}

impl PlaceCandidate {
    /// Identity used for deduplication: name plus position at 6 decimals
    pub fn dedup_key(&self) -> (String, i64, i64) {
        (
            self.placename.clone(),
            (self.position.lat * 1e6).round() as i64,
            (self.position.lon * 1e6).round() as i64,
        )
    }
}

/// Remove repeated candidates, keeping the first occurrence
pub fn dedup_candidates(candidates: Vec<PlaceCandidate>) -> Vec<PlaceCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.dedup_key()))
        .collect()
}

/// Parse an `out center tags` place response
///
/// Nodes use their own position, ways and relations their `center`.
/// Elements with no position are dropped.
pub fn parse_place_candidates(response: &OverpassResponse) -> Vec<PlaceCandidate> {
    response
        .elements
        .iter()
        .filter_map(|element| {
            let position = if element.type_ == "node" {
                Coordinate::new(element.lat?, element.lon?)
            } else {
                element.center?
            };

            let tag = |key: &str| {
                element
                    .tags
                    .as_ref()
                    .and_then(|t| t.get(key))
                    .filter(|v| !v.is_empty())
                    .cloned()
            };

            let placename = tag("name").or_else(|| tag("name:en")).unwrap_or_default();
            let placename_ascii = tag("name:ascii").unwrap_or_else(|| placename.clone());
            let placename_en = tag("name:en").unwrap_or_else(|| placename.clone());
            let placetag = tag("place").unwrap_or_else(|| "town".to_string());

            Some(PlaceCandidate {
                placename,
                placename_ascii,
                placename_en,
                placetag,
                position,
            })
        })
        .collect()
}
