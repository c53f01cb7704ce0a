use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use log::warn;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{CloseApproach, NearEarthObject};

/// Calendar-datetime format used by the JPL close-approach feed,
/// e.g. `2020-Jan-01 12:30`.
const CAD_TIME_FORMAT: &str = "%Y-%b-%d %H:%M";

// ---------------------------------------------------------------------------
// NEO catalog loader (CSV)
// ---------------------------------------------------------------------------

/// Load near-Earth objects from a JPL small-body catalog CSV export.
///
/// Only the `pdes`, `name`, `diameter`, and `pha` columns are consumed; any
/// others are ignored. Rows without a designation are skipped with a warning;
/// a missing or unparsable diameter becomes the unknown sentinel, not an
/// error.
pub fn load_neos(path: &Path) -> Result<Vec<NearEarthObject>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening NEO catalog {}", path.display()))?;
    read_neos(file)
}

/// Same as [`load_neos`], from any reader. Used directly by tests.
pub fn read_neos<R: Read>(reader: R) -> Result<Vec<NearEarthObject>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()
        .context("reading NEO CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("NEO CSV missing '{name}' column"))
    };
    let pdes_idx = column("pdes")?;
    let name_idx = column("name")?;
    let diameter_idx = column("diameter")?;
    let pha_idx = column("pha")?;

    let mut neos = Vec::new();
    for (row_no, result) in csv_reader.records().enumerate() {
        let record = result.with_context(|| format!("NEO CSV row {row_no}"))?;

        let designation = record.get(pdes_idx).unwrap_or("").trim();
        if designation.is_empty() {
            warn!("skipping NEO CSV row {row_no}: empty designation");
            continue;
        }

        let name = record
            .get(name_idx)
            .filter(|n| !n.is_empty())
            .map(|n| n.to_string());
        let diameter = record
            .get(diameter_idx)
            .filter(|d| !d.is_empty())
            .and_then(|d| d.parse::<f64>().ok());
        let hazardous = record.get(pha_idx) == Some("Y");

        neos.push(NearEarthObject::new(designation, name, diameter, hazardous));
    }
    Ok(neos)
}

// ---------------------------------------------------------------------------
// Close-approach loader (JSON)
// ---------------------------------------------------------------------------

/// Shape of the JPL CAD API response: a flat `data` table of rows, with the
/// column layout fixed by the API (`des` at 0, `cd` at 3, `dist` at 4,
/// `v_rel` at 7).
#[derive(Debug, Deserialize)]
struct CadFeed {
    #[serde(default)]
    data: Vec<Vec<JsonValue>>,
}

/// Load close approaches from a JPL CAD API JSON file.
///
/// Rows missing a designation, distance, or velocity are skipped with a
/// warning while the rest of the file continues to load. A row whose
/// timestamp fails to parse is kept with no time.
pub fn load_approaches(path: &Path) -> Result<Vec<CloseApproach>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening close-approach file {}", path.display()))?;
    read_approaches(file)
}

/// Same as [`load_approaches`], from any reader. Used directly by tests.
pub fn read_approaches<R: Read>(reader: R) -> Result<Vec<CloseApproach>> {
    let feed: CadFeed =
        serde_json::from_reader(reader).context("parsing close-approach JSON")?;

    let mut approaches = Vec::with_capacity(feed.data.len());
    for (row_no, row) in feed.data.iter().enumerate() {
        match approach_from_row(row) {
            Some(approach) => approaches.push(approach),
            None => warn!("skipping close-approach row {row_no}: {row:?}"),
        }
    }
    Ok(approaches)
}

fn approach_from_row(row: &[JsonValue]) -> Option<CloseApproach> {
    let designation = row.first()?.as_str()?;
    if designation.is_empty() {
        return None;
    }
    let time = row.get(3).and_then(|v| v.as_str()).and_then(parse_cad_time);
    let distance = field_as_f64(row.get(4)?)?;
    let velocity = field_as_f64(row.get(7)?)?;
    Some(CloseApproach::new(designation, time, distance, velocity))
}

/// The CAD feed serializes numbers as strings; tolerate both.
fn field_as_f64(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_cad_time(s: &str) -> Option<NaiveDateTime> {
    match NaiveDateTime::parse_from_str(s, CAD_TIME_FORMAT) {
        Ok(t) => Some(t),
        Err(err) => {
            warn!("unparsable approach time '{s}': {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEO_CSV: &str = "\
id,pdes,name,pha,diameter\n\
a0000433,433,Eros,N,16.84\n\
a0002101,2101,Adonis,Y,0.60\n\
a0000000,,Ghost,N,1.0\n\
a0001036,1036,Ganymed,N,\n";

    #[test]
    fn reads_neos_and_skips_designationless_rows() {
        let neos = read_neos(NEO_CSV.as_bytes()).unwrap();
        assert_eq!(neos.len(), 3);

        assert_eq!(neos[0].designation, "433");
        assert_eq!(neos[0].name.as_deref(), Some("Eros"));
        assert_eq!(neos[0].diameter, 16.84);
        assert!(!neos[0].hazardous);

        assert!(neos[1].hazardous);
    }

    #[test]
    fn missing_diameter_becomes_unknown() {
        let neos = read_neos(NEO_CSV.as_bytes()).unwrap();
        let ganymed = neos.iter().find(|n| n.designation == "1036").unwrap();
        assert!(!ganymed.diameter_known());
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let err = read_neos("id,name\n1,Eros\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("pdes"));
    }

    #[test]
    fn reads_approaches_from_cad_feed() {
        let json = r#"{
            "fields": ["des", "orbit_id", "jd", "cd", "dist", "dist_min", "dist_max", "v_rel", "v_inf"],
            "data": [
                ["433", "659", "2458902.7", "2020-Jan-01 00:54", "0.15", "0.14", "0.16", "5.62", "5.61"],
                ["2101", "41", "2458963.5", "not-a-date", "0.02", "0.01", "0.03", "11.0", "10.9"],
                ["bad", "1", "0", "2020-Feb-01 00:00", "oops", "0", "0", "1.0", "1.0"]
            ]
        }"#;
        let approaches = read_approaches(json.as_bytes()).unwrap();
        // The unparsable-distance row is dropped, the bad-date row is kept.
        assert_eq!(approaches.len(), 2);

        assert_eq!(approaches[0].designation, "433");
        assert_eq!(approaches[0].time_str(), "2020-01-01 00:54");
        assert_eq!(approaches[0].distance, 0.15);
        assert_eq!(approaches[0].velocity, 5.62);

        assert_eq!(approaches[1].designation, "2101");
        assert!(approaches[1].time.is_none());
    }

    #[test]
    fn empty_feed_yields_no_approaches() {
        let approaches = read_approaches(r#"{"data": []}"#.as_bytes()).unwrap();
        assert!(approaches.is_empty());
        let approaches = read_approaches("{}".as_bytes()).unwrap();
        assert!(approaches.is_empty());
    }
}
