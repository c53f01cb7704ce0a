use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

/// Output format for approach timestamps (`datetime_utc`).
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

// ---------------------------------------------------------------------------
// NearEarthObject – one row of the NEO catalog
// ---------------------------------------------------------------------------

/// A near-Earth object: a small body whose orbit brings it close to Earth.
///
/// `diameter` is in kilometers; an unknown diameter is stored as `f64::NAN`,
/// never as zero, so a missing measurement stays distinguishable from a
/// genuinely tiny object.
#[derive(Debug, Clone)]
pub struct NearEarthObject {
    /// Primary designation, the stable unique identifier.
    pub designation: String,
    /// IAU name; most NEOs have none.
    pub name: Option<String>,
    /// Diameter in kilometers, `NAN` when unknown.
    pub diameter: f64,
    /// Potentially-hazardous flag from the source catalog.
    pub hazardous: bool,
    /// Indexes into the database's approach arena, in load order.
    /// Empty until `NeoDatabase` links the collections.
    pub(crate) approaches: Vec<usize>,
}

impl NearEarthObject {
    pub fn new(
        designation: impl Into<String>,
        name: Option<String>,
        diameter: Option<f64>,
        hazardous: bool,
    ) -> Self {
        NearEarthObject {
            designation: designation.into(),
            // Treat an empty name cell the same as a missing one.
            name: name.filter(|n| !n.is_empty()),
            diameter: diameter.unwrap_or(f64::NAN),
            hazardous,
            approaches: Vec::new(),
        }
    }

    /// `designation (name)` when the NEO has a name, bare designation otherwise.
    pub fn fullname(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({name})", self.designation),
            None => self.designation.clone(),
        }
    }

    /// Whether the diameter is a real measurement rather than the unknown sentinel.
    pub fn diameter_known(&self) -> bool {
        !self.diameter.is_nan()
    }
}

impl fmt::Display for NearEarthObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NEO {} has a diameter of {:.3} km and {} hazardous.",
            self.fullname(),
            self.diameter,
            if self.hazardous { "is" } else { "is not" }
        )
    }
}

// ---------------------------------------------------------------------------
// CloseApproach – one recorded pass near Earth
// ---------------------------------------------------------------------------

/// A single close approach of an NEO to Earth.
///
/// The `designation` is a foreign key into the NEO catalog; it may not resolve
/// (recent close-approach feeds often run ahead of the object catalog). The
/// link to the owning NEO is an arena index set once by `NeoDatabase` and left
/// `None` for such orphans.
#[derive(Debug, Clone)]
pub struct CloseApproach {
    /// Designation of the NEO this approach belongs to.
    pub designation: String,
    /// Approach instant, timezone-naive UTC; `None` when the source value
    /// was missing or unparsable.
    pub time: Option<NaiveDateTime>,
    /// Nominal approach distance in astronomical units.
    pub distance: f64,
    /// Relative approach velocity in km/s.
    pub velocity: f64,
    /// Index of the owning NEO in the database arena, `None` for orphans.
    pub(crate) neo: Option<usize>,
}

impl CloseApproach {
    pub fn new(
        designation: impl Into<String>,
        time: Option<NaiveDateTime>,
        distance: f64,
        velocity: f64,
    ) -> Self {
        CloseApproach {
            designation: designation.into(),
            time,
            distance,
            velocity,
            neo: None,
        }
    }

    /// The approach time formatted as `YYYY-MM-DD HH:MM`, or `unknown`.
    pub fn time_str(&self) -> String {
        match self.time {
            Some(t) => t.format(TIME_FORMAT).to_string(),
            None => "unknown".to_string(),
        }
    }
}

impl fmt::Display for CloseApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "At {}, {} approaches Earth at a distance of {:.2} au and a velocity of {:.2} km/s.",
            self.time_str(),
            self.designation,
            self.distance,
            self.velocity
        )
    }
}

// ---------------------------------------------------------------------------
// ApproachRecord – flattened serialization view of an approach and its NEO
// ---------------------------------------------------------------------------

/// The output shape consumed by the CSV and JSON writers: approach fields
/// joined with the linked NEO's fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApproachRecord {
    pub datetime_utc: String,
    pub distance_au: f64,
    pub velocity_km_s: f64,
    pub designation: String,
    /// Empty string when the NEO is unnamed or unresolved.
    pub name: String,
    /// `None` marks an unknown diameter; serializes as `null` in JSON and
    /// as the literal cell `nan` in CSV, never as a numeric stand-in.
    pub diameter_km: Option<f64>,
    pub potentially_hazardous: bool,
}

impl ApproachRecord {
    /// Flatten an approach and its (possibly absent) NEO into one record.
    pub fn new(approach: &CloseApproach, neo: Option<&NearEarthObject>) -> Self {
        ApproachRecord {
            datetime_utc: approach.time_str(),
            distance_au: approach.distance,
            velocity_km_s: approach.velocity,
            designation: approach.designation.clone(),
            name: neo.and_then(|n| n.name.clone()).unwrap_or_default(),
            diameter_km: neo.filter(|n| n.diameter_known()).map(|n| n.diameter),
            potentially_hazardous: neo.map(|n| n.hazardous).unwrap_or(false),
        }
    }
}
