pub mod nominatim;
pub mod overpass;
pub mod transport;

pub(crate) const USER_AGENT: &str = "roadsearch/0.1.0 (Overpass road lookup)";

pub use nominatim::{Region, geocode_city, reverse_geocode};
pub use overpass::{OverpassResponse, build_places_query, build_road_query, execute_with_fallback};
pub use transport::{OverpassTransport, TransportKind, build_transport};
