pub mod place;
pub mod query;
pub mod road;
pub mod states;

pub use place::NearbyPlace;
pub use query::Query;
pub use road::{Coordinate, ResultSet, RoadSegment, SearchStatus};
pub use states::resolve_state;
