pub mod parser;

pub use parser::{PlaceCandidate, dedup_candidates, parse_place_candidates, parse_road_segments};
