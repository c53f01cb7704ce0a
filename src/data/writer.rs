use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::database::NeoDatabase;
use super::model::{ApproachRecord, CloseApproach};

/// Column order of the CSV output, matching the serialization view.
const FIELDNAMES: [&str; 7] = [
    "datetime_utc",
    "distance_au",
    "velocity_km_s",
    "designation",
    "name",
    "diameter_km",
    "potentially_hazardous",
];

// ---------------------------------------------------------------------------
// CSV output
// ---------------------------------------------------------------------------

/// Write query results to a CSV file, one row per close approach.
pub fn write_csv<'a, I>(db: &NeoDatabase, results: I, path: &Path) -> Result<()>
where
    I: IntoIterator<Item = &'a CloseApproach>,
{
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating output file {}", path.display()))?;
    write_csv_to(db, results, file)
}

/// Same as [`write_csv`], to any writer. Used directly by tests.
pub fn write_csv_to<'a, I, W>(db: &NeoDatabase, results: I, writer: W) -> Result<()>
where
    I: IntoIterator<Item = &'a CloseApproach>,
    W: Write,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(FIELDNAMES)
        .context("writing CSV header")?;

    for approach in results {
        let record = db.record(approach);
        let distance = record.distance_au.to_string();
        let velocity = record.velocity_km_s.to_string();
        let diameter = match record.diameter_km {
            Some(d) => d.to_string(),
            // Unknown diameter stays non-numeric in the output.
            None => "nan".to_string(),
        };
        csv_writer
            .write_record([
                record.datetime_utc.as_str(),
                distance.as_str(),
                velocity.as_str(),
                record.designation.as_str(),
                record.name.as_str(),
                diameter.as_str(),
                if record.potentially_hazardous { "true" } else { "false" },
            ])
            .context("writing CSV row")?;
    }
    csv_writer.flush().context("flushing CSV output")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON output
// ---------------------------------------------------------------------------

/// Write query results to a JSON file: a top-level array of flattened
/// approach records. Unknown diameters serialize as `null`.
pub fn write_json<'a, I>(db: &NeoDatabase, results: I, path: &Path) -> Result<()>
where
    I: IntoIterator<Item = &'a CloseApproach>,
{
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating output file {}", path.display()))?;
    write_json_to(db, results, file)
}

/// Same as [`write_json`], to any writer. Used directly by tests.
pub fn write_json_to<'a, I, W>(db: &NeoDatabase, results: I, writer: W) -> Result<()>
where
    I: IntoIterator<Item = &'a CloseApproach>,
    W: Write,
{
    let records: Vec<ApproachRecord> = results
        .into_iter()
        .map(|approach| db.record(approach))
        .collect();
    serde_json::to_writer(writer, &records).context("writing JSON output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::NearEarthObject;

    fn sample_db() -> NeoDatabase {
        let neos = vec![
            NearEarthObject::new("2000433", Some("Eros".to_string()), Some(16.84), false),
            NearEarthObject::new("2010PK9", None, None, true),
        ];
        let approaches = vec![
            CloseApproach::new("2000433", None, 0.15, 5.0),
            CloseApproach::new("2010PK9", None, 0.25, 7.5),
        ];
        NeoDatabase::new(neos, approaches)
    }

    #[test]
    fn csv_output_has_header_and_nan_sentinel() {
        let db = sample_db();
        let mut buf = Vec::new();
        write_csv_to(&db, db.approaches(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], FIELDNAMES.join(","));
        assert!(lines[1].contains("2000433"));
        assert!(lines[1].contains("Eros"));
        assert!(lines[1].contains("16.84"));
        // Unnamed NEO with unknown diameter: empty name cell, nan diameter.
        assert!(lines[2].contains(",,nan,"));
        assert!(lines[2].ends_with("true"));
    }

    #[test]
    fn json_output_nulls_unknown_diameter() {
        let db = sample_db();
        let mut buf = Vec::new();
        write_json_to(&db, db.approaches(), &mut buf).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        let rows = parsed.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["diameter_km"], 16.84);
        assert_eq!(rows[0]["name"], "Eros");
        assert!(rows[1]["diameter_km"].is_null());
        assert_eq!(rows[1]["potentially_hazardous"], true);
    }
}
