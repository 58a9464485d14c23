use serde::Serialize;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::{NearbyPlace, Query, ResultSet, SearchStatus};
use crate::error::SearchError;
use crate::search::SearchReport;

/// Write the result set as a pretty-printed JSON array.
///
/// An empty result set writes `[]`.
pub fn write_results(path: &Path, results: &ResultSet) -> Result<(), SearchError> {
    write_json(path, results.segments())
}

/// Write the road results to `output`, and the places report next to it
/// when one was produced.
///
/// Returns the places file path, if written.
pub fn write_report(output: &Path, report: &SearchReport) -> Result<Option<PathBuf>, SearchError> {
    write_results(output, &report.results)?;

    match &report.places {
        Some(places) => {
            let path = places_path(output);
            write_places(&path, places)?;
            Ok(Some(path))
        }
        None => Ok(None),
    }
}

/// Write the nearby-places report as a pretty-printed JSON array
pub fn write_places(path: &Path, places: &[NearbyPlace]) -> Result<(), SearchError> {
    write_json(path, places)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), SearchError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}

/// `I_95_Miami_Florida.json` -> `I_95_Miami_Florida_places.json`
pub fn places_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "roadsearch".to_string());
    output.with_file_name(format!("{}_places.json", stem))
}

/// Human-readable listing of the matched segments
pub fn render_results(query: &Query, results: &ResultSet) -> String {
    let mut out = String::new();

    match results.status() {
        SearchStatus::NoResultsFound => {
            let _ = writeln!(
                out,
                "No road segments matching '{}' found near {}, {}",
                query.roadway_name(),
                query.city(),
                query.state_name()
            );
        }
        SearchStatus::Matches(count) => {
            let _ = writeln!(
                out,
                "Found {} road segment(s) matching '{}' near {}, {} ({} points)",
                count,
                query.roadway_name(),
                query.city(),
                query.state_name(),
                results.point_count()
            );
            for segment in results.segments() {
                let _ = writeln!(
                    out,
                    "  {:<8} {:>12}  {:<30} {:<14} {:>5} pts",
                    segment.kind,
                    segment.id,
                    segment.label(),
                    segment.road_type().unwrap_or("-"),
                    segment.geometry.len()
                );
            }
        }
    }

    out
}

/// Human-readable listing of nearby places
pub fn render_places(places: &[NearbyPlace]) -> String {
    let mut out = String::new();

    if places.is_empty() {
        out.push_str("No cities or towns found along the roadway\n");
        return out;
    }

    let _ = writeln!(out, "Cities and towns along the roadway: {}", places.len());
    for place in places {
        let _ = writeln!(
            out,
            "  {:<6} {:<30} ({:.5}, {:.5})  {}, {}",
            place.placetag,
            place.placename,
            place.latitude,
            place.longitude,
            place.state,
            place.country
        );
    }

    out
}
