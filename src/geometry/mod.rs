pub mod bbox;
pub mod buffer;
pub mod projection;

pub use bbox::BoundingBox;
pub use buffer::RoadBuffer;
pub use projection::Projector;
