use serde::{Deserialize, Serialize};

/// A city or town found near a matched roadway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyPlace {
    pub roadway: String,
    pub placename: String,
    pub placename_ascii: String,
    pub placename_en: String,
    pub placetag: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "state/province")]
    pub state: String,
    #[serde(rename = "state/province-ascii")]
    pub state_ascii: String,
    pub country: String,
}
