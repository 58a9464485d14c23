use crate::api::{
    OverpassTransport, Region, build_places_query, build_road_query, execute_with_fallback,
};
use crate::config::OverpassConfig;
use crate::domain::{Coordinate, NearbyPlace, Query, ResultSet};
use crate::error::SearchError;
use crate::geometry::{BoundingBox, RoadBuffer};
use crate::osm::{dedup_candidates, parse_place_candidates, parse_road_segments};

/// Padding applied around the matched road geometry when searching places
const PLACE_AREA_FACTOR: f64 = 0.02;
const PLACE_AREA_MIN_PAD_DEG: f64 = 0.01;

/// Everything one run produces, gathered before any file is written
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub results: ResultSet,
    /// `Some` only when the nearby-places report was requested
    pub places: Option<Vec<NearbyPlace>>,
}

/// Run the road search and, when `places_buffer_m` is set, the nearby-places
/// search.
///
/// Both network phases finish before this returns, so a failure in either
/// one leaves nothing to write.
pub fn run_search(
    transport: &dyn OverpassTransport,
    config: &OverpassConfig,
    query: &Query,
    area: &BoundingBox,
    places_buffer_m: Option<f64>,
    lookup_region: impl FnMut(Coordinate) -> Region,
) -> Result<SearchReport, SearchError> {
    let results = search_roads(transport, config, query, area)?;

    let places = match places_buffer_m {
        Some(buffer_m) => Some(find_nearby_places(
            transport,
            config,
            query,
            &results,
            buffer_m,
            lookup_region,
        )?),
        None => None,
    };

    Ok(SearchReport { results, places })
}

/// Find road segments matching `query` inside `area`.
///
/// An empty result set is not an error; see `ResultSet::status`.
pub fn search_roads(
    transport: &dyn OverpassTransport,
    config: &OverpassConfig,
    query: &Query,
    area: &BoundingBox,
) -> Result<ResultSet, SearchError> {
    let ql = build_road_query(query.roadway_name(), area, config.server_timeout_secs);
    let response = execute_with_fallback(transport, config, &ql)?;
    Ok(parse_road_segments(&response))
}

/// Find cities and towns within `buffer_m` meters of the matched segments.
///
/// Candidates are deduplicated before `lookup_region` resolves state and
/// country, so it runs once per distinct place inside the buffer.
pub fn find_nearby_places(
    transport: &dyn OverpassTransport,
    config: &OverpassConfig,
    query: &Query,
    results: &ResultSet,
    buffer_m: f64,
    mut lookup_region: impl FnMut(Coordinate) -> Region,
) -> Result<Vec<NearbyPlace>, SearchError> {
    let Some(buffer) = RoadBuffer::new(results.segments(), buffer_m) else {
        return Ok(Vec::new());
    };
    let Some(extent) =
        BoundingBox::from_coordinates(results.segments().iter().flat_map(|s| &s.geometry))
    else {
        return Ok(Vec::new());
    };

    let area = extent.padded(PLACE_AREA_FACTOR, PLACE_AREA_MIN_PAD_DEG);
    let ql = build_places_query(&area, config.server_timeout_secs);
    let response = execute_with_fallback(transport, config, &ql)?;

    let inside = parse_place_candidates(&response)
        .into_iter()
        .filter(|candidate| buffer.contains(candidate.position))
        .collect();

    let places = dedup_candidates(inside)
        .into_iter()
        .map(|candidate| {
            let region = lookup_region(candidate.position);
            NearbyPlace {
                roadway: query.roadway_name().to_string(),
                placename: candidate.placename,
                placename_ascii: candidate.placename_ascii,
                placename_en: candidate.placename_en,
                placetag: candidate.placetag,
                latitude: candidate.position.lat,
                longitude: candidate.position.lon,
                state: region.state.clone(),
                state_ascii: region.state,
                country: region.country,
            }
        })
        .collect();

    Ok(places)
}
