use crate::domain::states::resolve_state;
use crate::error::SearchError;

/// A single road search request: which roadway, near which US city.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    roadway_name: String,
    city: String,
    state: String,
    state_name: &'static str,
}

impl Query {
    /// Validate the three positional inputs.
    ///
    /// Each value is trimmed. Missing or blank values, and states that are not
    /// one of the US states (or DC), are rejected with `InvalidInput`.
    pub fn new(
        roadway_name: Option<&str>,
        city: Option<&str>,
        state: Option<&str>,
    ) -> Result<Self, SearchError> {
        let roadway_name = required("roadway name", roadway_name)?;
        let city = required("city", city)?;
        let state = required("state", state)?;

        let state_name = resolve_state(&state).ok_or_else(|| {
            SearchError::InvalidInput(format!("'{}' is not a US state", state))
        })?;

        Ok(Self {
            roadway_name,
            city,
            state,
            state_name,
        })
    }

    pub fn roadway_name(&self) -> &str {
        &self.roadway_name
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// The state as the user typed it
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Canonical state name, e.g. "Florida" for "FL"
    pub fn state_name(&self) -> &'static str {
        self.state_name
    }

    /// Free-text location used for geocoding the city area
    pub fn location_text(&self) -> String {
        format!("{}, {}, USA", self.city, self.state_name)
    }

    /// Output file name derived from the inputs, e.g. `I_95_Miami_Florida.json`.
    ///
    /// Parts that sanitize to nothing are left out. The state part is a
    /// validated US state, so the stem is never empty.
    pub fn output_file_name(&self) -> String {
        let stem = [&self.roadway_name, &self.city, &self.state]
            .iter()
            .map(|part| sanitize(part))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");

        format!("{}.json", stem)
    }
}

fn required(field: &str, value: Option<&str>) -> Result<String, SearchError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(SearchError::InvalidInput(format!("missing {}", field))),
    }
}

fn sanitize(part: &str) -> String {
    part.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_query() {
        let q = Query::new(Some(" I 95 "), Some("Miami"), Some("FL")).unwrap();
        assert_eq!(q.roadway_name(), "I 95");
        assert_eq!(q.state(), "FL");
        assert_eq!(q.state_name(), "Florida");
        assert_eq!(q.location_text(), "Miami, Florida, USA");
    }

    #[test]
    fn test_missing_arguments() {
        for (r, c, s) in [
            (None, Some("Miami"), Some("Florida")),
            (Some("I 95"), None, Some("Florida")),
            (Some("I 95"), Some("Miami"), None),
            (Some("   "), Some("Miami"), Some("Florida")),
        ] {
            let err = Query::new(r, c, s).unwrap_err();
            assert!(matches!(err, SearchError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_non_us_state_rejected() {
        let err = Query::new(Some("401"), Some("Toronto"), Some("Ontario")).unwrap_err();
        assert!(matches!(err, SearchError::InvalidInput(_)));
    }

    #[test]
    fn test_output_file_name() {
        let q = Query::new(Some("I 95"), Some("Miami"), Some("Florida")).unwrap();
        assert_eq!(q.output_file_name(), "I_95_Miami_Florida.json");

        let q = Query::new(Some("US-1"), Some("St. Augustine"), Some("fl")).unwrap();
        assert_eq!(q.output_file_name(), "US-1_St_Augustine_fl.json");
    }

    #[test]
    fn test_output_file_name_strips_path_separators() {
        let q = Query::new(Some("../../etc"), Some("Miami"), Some("Florida")).unwrap();
        assert_eq!(q.output_file_name(), "etc_Miami_Florida.json");
    }

    #[test]
    fn test_output_file_name_skips_empty_parts() {
        let q = Query::new(Some("???"), Some("!!"), Some("Florida")).unwrap();
        assert_eq!(q.output_file_name(), "Florida.json");

        let q = Query::new(Some("I 95"), Some("***"), Some("fl")).unwrap();
        assert_eq!(q.output_file_name(), "I_95_fl.json");

        assert_eq!(sanitize("///"), "");
    }
}
