//! roadsearch - Find OpenStreetMap road segments by name near a US city

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod osm;
pub mod output;
pub mod search;

pub use error::{SearchError, TransportError};
