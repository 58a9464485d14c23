use serde::Deserialize;
use std::collections::HashMap;

use super::transport::OverpassTransport;
use crate::config::OverpassConfig;
use crate::domain::Coordinate;
use crate::error::SearchError;
use crate::geometry::BoundingBox;

/// Raw Overpass API response
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub remark: Option<String>,
}

impl OverpassResponse {
    /// Whether the server gave up on the query at runtime
    pub fn timed_out(&self) -> bool {
        self.remark
            .as_deref()
            .is_some_and(|r| r.contains("timed out"))
    }

    /// Any other server-side failure, e.g. running out of memory.
    ///
    /// The element list of such a response may be empty or truncated.
    pub fn runtime_error(&self) -> Option<&str> {
        self.remark
            .as_deref()
            .filter(|r| r.trim_start().starts_with("runtime error") && !r.contains("timed out"))
    }
}

/// A single element from Overpass (node, way or relation)
#[derive(Debug, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub type_: String,
    pub id: u64,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    /// Present on ways with `out geom`
    #[serde(default)]
    pub geometry: Option<Vec<Coordinate>>,
    /// Present on relations with `out geom`
    #[serde(default)]
    pub members: Option<Vec<Member>>,
    /// Present on ways and relations with `out center`
    #[serde(default)]
    pub center: Option<Coordinate>,
}

/// A relation member with its resolved geometry
#[derive(Debug, Deserialize)]
pub struct Member {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(rename = "ref")]
    pub ref_: u64,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub geometry: Option<Vec<Coordinate>>,
}

/// Escape a roadway name for use inside an Overpass `~"..."` regex literal.
///
/// Regex metacharacters are escaped first so the name matches literally,
/// then backslashes and quotes are escaped for the QL string literal.
pub fn escape_pattern(name: &str) -> String {
    let mut regex = String::with_capacity(name.len());
    for c in name.chars() {
        if "\\.^$|?*+()[]{}".contains(c) {
            regex.push('\\');
        }
        regex.push(c);
    }

    regex.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Build the road search query
///
/// Matches route relations by `ref`, and highway ways by `ref` or `name`,
/// case-insensitively inside `bbox`. `out geom` inlines coordinates so no
/// second node lookup is needed.
pub fn build_road_query(roadway_name: &str, bbox: &BoundingBox, server_timeout_secs: u64) -> String {
    let pattern = escape_pattern(roadway_name);
    let area = bbox.to_overpass();

    format!(
        r#"[out:json][timeout:{timeout}];
(
  relation["ref"~"{pattern}",i]["type"="route"]["route"="road"]({area});
  way["ref"~"{pattern}",i]["highway"]({area});
  way["name"~"{pattern}",i]["highway"]({area});
);
out geom;"#,
        timeout = server_timeout_secs,
        pattern = pattern,
        area = area
    )
}

/// Build the query for cities and towns inside `bbox`
pub fn build_places_query(bbox: &BoundingBox, server_timeout_secs: u64) -> String {
    let area = bbox.to_overpass();

    format!(
        r#"[out:json][timeout:{timeout}];
(
  node["place"~"city|town"]({area});
  way["place"~"city|town"]({area});
  relation["place"~"city|town"]({area});
);
out center tags;"#,
        timeout = server_timeout_secs,
        area = area
    )
}

/// Run `query` on the primary endpoint, falling back to the mirror once.
///
/// Only timeout-class failures (see `TransportError::is_timeout_class`) move
/// on to the mirror. Any other primary failure is returned as is.
pub fn execute_with_fallback(
    transport: &dyn OverpassTransport,
    config: &OverpassConfig,
    query: &str,
) -> Result<OverpassResponse, SearchError> {
    match transport.execute(&config.primary, query) {
        Ok(response) => return Ok(response),
        Err(e) if e.is_timeout_class() => {
            eprintln!(
                "Overpass endpoint {} did not answer ({}), retrying on mirror {}",
                config.primary, e, config.mirror
            );
        }
        Err(e) => {
            return Err(SearchError::Upstream {
                endpoint: config.primary.clone(),
                source: e,
            });
        }
    }

    transport.execute(&config.mirror, query).map_err(|e| {
        if e.is_timeout_class() {
            SearchError::QueryTimeout {
                primary: config.primary.clone(),
                mirror: config.mirror.clone(),
            }
        } else {
            SearchError::Upstream {
                endpoint: config.mirror.clone(),
                source: e,
            }
        }
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::TransportError;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned results and records which endpoints were hit
    pub(crate) struct ScriptedTransport {
        replies: RefCell<VecDeque<Result<OverpassResponse, TransportError>>>,
        pub calls: RefCell<Vec<String>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new(replies: Vec<Result<OverpassResponse, TransportError>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl OverpassTransport for ScriptedTransport {
        fn execute(&self, endpoint: &str, _query: &str) -> Result<OverpassResponse, TransportError> {
            self.calls.borrow_mut().push(endpoint.to_string());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(TransportError::Client("no scripted reply".into())))
        }
    }

    pub(crate) fn empty_response() -> OverpassResponse {
        OverpassResponse {
            elements: Vec::new(),
            remark: None,
        }
    }

    fn config() -> OverpassConfig {
        OverpassConfig {
            primary: "https://primary.example/api/interpreter".to_string(),
            mirror: "https://mirror.example/api/interpreter".to_string(),
            ..OverpassConfig::default()
        }
    }

    #[test]
    fn test_primary_success_skips_mirror() {
        let transport = ScriptedTransport::new(vec![Ok(empty_response())]);
        execute_with_fallback(&transport, &config(), "q").unwrap();
        assert_eq!(
            *transport.calls.borrow(),
            vec!["https://primary.example/api/interpreter"]
        );
    }

    #[test]
    fn test_primary_timeout_retries_mirror_once() {
        let transport =
            ScriptedTransport::new(vec![Err(TransportError::Timeout), Ok(empty_response())]);
        execute_with_fallback(&transport, &config(), "q").unwrap();
        assert_eq!(
            *transport.calls.borrow(),
            vec![
                "https://primary.example/api/interpreter",
                "https://mirror.example/api/interpreter"
            ]
        );
    }

    #[test]
    fn test_both_timeouts_is_query_timeout() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Timeout),
            Err(TransportError::Status(504)),
            Ok(empty_response()),
        ]);
        let err = execute_with_fallback(&transport, &config(), "q").unwrap_err();
        assert!(matches!(err, SearchError::QueryTimeout { .. }));
        assert_eq!(transport.calls.borrow().len(), 2);
    }

    #[test]
    fn test_primary_bad_request_does_not_fall_back() {
        let transport =
            ScriptedTransport::new(vec![Err(TransportError::Status(400)), Ok(empty_response())]);
        let err = execute_with_fallback(&transport, &config(), "q").unwrap_err();
        match err {
            SearchError::Upstream { endpoint, source } => {
                assert_eq!(endpoint, "https://primary.example/api/interpreter");
                assert!(matches!(source, TransportError::Status(400)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(transport.calls.borrow().len(), 1);
    }

    #[test]
    fn test_mirror_decode_failure_is_upstream() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Unreachable("refused".into())),
            Err(TransportError::Decode("eof".into())),
        ]);
        let err = execute_with_fallback(&transport, &config(), "q").unwrap_err();
        assert!(matches!(
            err,
            SearchError::Upstream { ref endpoint, .. } if endpoint.contains("mirror")
        ));
    }

    #[test]
    fn test_escape_pattern() {
        assert_eq!(escape_pattern("I 95"), "I 95");
        assert_eq!(escape_pattern("St. John's"), r"St\\. John's");
        assert_eq!(escape_pattern(r#"a"b"#), r#"a\"b"#);
        assert_eq!(escape_pattern("US-1 (Alt)"), r"US-1 \\(Alt\\)");
    }

    #[test]
    fn test_build_road_query() {
        let bbox = BoundingBox::new(25.0, -80.5, 26.0, -80.0);
        let query = build_road_query("I 95", &bbox, 60);

        assert!(query.starts_with("[out:json][timeout:60];"));
        assert!(query.contains(
            r#"relation["ref"~"I 95",i]["type"="route"]["route"="road"](25,-80.5,26,-80);"#
        ));
        assert!(query.contains(r#"way["ref"~"I 95",i]["highway"](25,-80.5,26,-80);"#));
        assert!(query.contains(r#"way["name"~"I 95",i]["highway"](25,-80.5,26,-80);"#));
        assert!(query.ends_with("out geom;"));
    }

    #[test]
    fn test_build_places_query() {
        let bbox = BoundingBox::new(25.0, -80.5, 26.0, -80.0);
        let query = build_places_query(&bbox, 60);
        assert!(query.contains(r#"node["place"~"city|town"](25,-80.5,26,-80);"#));
        assert!(query.ends_with("out center tags;"));
    }

    #[test]
    fn test_parse_overpass_response() {
        let json = r#"{
            "elements": [
                {"type": "way", "id": 2, "tags": {"highway": "motorway", "ref": "I 95"},
                 "geometry": [{"lat": 25.77, "lon": -80.19}, {"lat": 25.78, "lon": -80.20}]},
                {"type": "relation", "id": 3, "tags": {"route": "road"},
                 "members": [{"type": "way", "ref": 2, "role": "",
                              "geometry": [{"lat": 25.77, "lon": -80.19}]}]},
                {"type": "node", "id": 4, "lat": 25.7, "lon": -80.1}
            ]
        }"#;

        let response: OverpassResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.elements.len(), 3);
        assert_eq!(response.elements[0].geometry.as_ref().unwrap().len(), 2);
        assert_eq!(response.elements[1].members.as_ref().unwrap()[0].ref_, 2);
        assert_eq!(response.elements[2].lat, Some(25.7));
        assert!(!response.timed_out());
        assert!(response.runtime_error().is_none());
    }

    #[test]
    fn test_informational_remark_is_not_an_error() {
        let response: OverpassResponse =
            serde_json::from_str(r#"{"elements":[],"remark":"note: area data is stale"}"#).unwrap();
        assert!(!response.timed_out());
        assert!(response.runtime_error().is_none());
    }
}
