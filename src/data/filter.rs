use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

use super::model::{CloseApproach, NearEarthObject};

// ---------------------------------------------------------------------------
// Comparator – the binary relation a filter applies
// ---------------------------------------------------------------------------

/// The comparison a filter applies between the extracted attribute (left)
/// and the reference value captured at construction (right).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Ge,
    Le,
}

impl Comparator {
    fn compare<T: PartialOrd>(self, attribute: &T, reference: &T) -> bool {
        match self {
            Comparator::Eq => attribute == reference,
            Comparator::Ge => attribute >= reference,
            Comparator::Le => attribute <= reference,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Comparator::Eq => "==",
            Comparator::Ge => ">=",
            Comparator::Le => "<=",
        })
    }
}

// ---------------------------------------------------------------------------
// Filter – attribute family + comparator + reference value
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    /// Raised at construction time, never during per-approach evaluation:
    /// asking for an ordering on an attribute that has none is a programming
    /// error, not a data error.
    #[error("comparator {comparator} is not supported for {family} filters")]
    UnsupportedComparator {
        family: &'static str,
        comparator: Comparator,
    },
}

/// The attribute family a filter inspects, carrying its typed reference value.
///
/// Date, distance, and velocity come from the approach itself; diameter and
/// hazard come from the linked NEO. The set is closed: the query engine only
/// ever sees "predicate over a close approach", so adding a family here needs
/// no change on the query side.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    /// Calendar date of the approach instant.
    Date(NaiveDate),
    /// Approach distance in astronomical units.
    Distance(f64),
    /// Relative velocity in km/s.
    Velocity(f64),
    /// Diameter of the linked NEO in kilometers.
    Diameter(f64),
    /// Hazardous flag of the linked NEO.
    Hazard(bool),
}

impl FilterKind {
    fn family(&self) -> &'static str {
        match self {
            FilterKind::Date(_) => "date",
            FilterKind::Distance(_) => "distance",
            FilterKind::Velocity(_) => "velocity",
            FilterKind::Diameter(_) => "diameter",
            FilterKind::Hazard(_) => "hazard",
        }
    }
}

/// A single query criterion: one attribute family compared against one
/// reference value. Evaluation never mutates the approach.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    kind: FilterKind,
    comparator: Comparator,
}

impl Filter {
    /// Build a filter, rejecting combinations with no defined semantics
    /// (the hazardous flag has no ordering).
    pub fn new(kind: FilterKind, comparator: Comparator) -> Result<Self, FilterError> {
        if matches!(kind, FilterKind::Hazard(_)) && comparator != Comparator::Eq {
            return Err(FilterError::UnsupportedComparator {
                family: kind.family(),
                comparator,
            });
        }
        Ok(Filter { kind, comparator })
    }

    // For combinations the criteria table already guarantees are valid.
    fn unchecked(kind: FilterKind, comparator: Comparator) -> Self {
        Filter { kind, comparator }
    }

    /// Whether the approach satisfies this criterion.
    ///
    /// `neo` is the approach's resolved NEO, if any. NEO-side filters
    /// (diameter, hazard) treat an orphan approach as a non-match rather than
    /// an error, and date filters do the same for an approach whose time
    /// failed to parse upstream. An unknown diameter is `NAN`, which no
    /// comparison accepts, so NEOs without a measured diameter never match
    /// diameter filters.
    pub fn matches(&self, approach: &CloseApproach, neo: Option<&NearEarthObject>) -> bool {
        match &self.kind {
            FilterKind::Date(date) => approach
                .time
                .is_some_and(|t| self.comparator.compare(&t.date(), date)),
            FilterKind::Distance(dist) => self.comparator.compare(&approach.distance, dist),
            FilterKind::Velocity(vel) => self.comparator.compare(&approach.velocity, vel),
            FilterKind::Diameter(diam) => {
                neo.is_some_and(|n| self.comparator.compare(&n.diameter, diam))
            }
            FilterKind::Hazard(flag) => {
                neo.is_some_and(|n| self.comparator.compare(&n.hazardous, flag))
            }
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FilterKind::Date(v) => write!(f, "date {} {v}", self.comparator),
            FilterKind::Distance(v) => write!(f, "distance {} {v} au", self.comparator),
            FilterKind::Velocity(v) => write!(f, "velocity {} {v} km/s", self.comparator),
            FilterKind::Diameter(v) => write!(f, "diameter {} {v} km", self.comparator),
            FilterKind::Hazard(v) => write!(f, "hazardous {} {v}", self.comparator),
        }
    }
}

// ---------------------------------------------------------------------------
// QueryCriteria – the user-facing bundle of optional constraints
// ---------------------------------------------------------------------------

/// User-specified query constraints. Every field is optional; an absent field
/// leaves that attribute unconstrained. All bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryCriteria {
    /// Approaches on exactly this date.
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub distance_min: Option<f64>,
    pub distance_max: Option<f64>,
    pub velocity_min: Option<f64>,
    pub velocity_max: Option<f64>,
    pub diameter_min: Option<f64>,
    pub diameter_max: Option<f64>,
    /// Match only (non-)hazardous NEOs.
    pub hazardous: Option<bool>,
}

/// Build the filter list for a set of criteria.
///
/// Filters come out in a fixed order (the field order of [`QueryCriteria`]);
/// the order is deterministic but irrelevant to correctness since `query`
/// conjoins them all.
pub fn create_filters(criteria: &QueryCriteria) -> Vec<Filter> {
    let mut filters = Vec::new();
    if let Some(date) = criteria.date {
        filters.push(Filter::unchecked(FilterKind::Date(date), Comparator::Eq));
    }
    if let Some(date) = criteria.start_date {
        filters.push(Filter::unchecked(FilterKind::Date(date), Comparator::Ge));
    }
    if let Some(date) = criteria.end_date {
        filters.push(Filter::unchecked(FilterKind::Date(date), Comparator::Le));
    }
    if let Some(dist) = criteria.distance_min {
        filters.push(Filter::unchecked(FilterKind::Distance(dist), Comparator::Ge));
    }
    if let Some(dist) = criteria.distance_max {
        filters.push(Filter::unchecked(FilterKind::Distance(dist), Comparator::Le));
    }
    if let Some(vel) = criteria.velocity_min {
        filters.push(Filter::unchecked(FilterKind::Velocity(vel), Comparator::Ge));
    }
    if let Some(vel) = criteria.velocity_max {
        filters.push(Filter::unchecked(FilterKind::Velocity(vel), Comparator::Le));
    }
    if let Some(diam) = criteria.diameter_min {
        filters.push(Filter::unchecked(FilterKind::Diameter(diam), Comparator::Ge));
    }
    if let Some(diam) = criteria.diameter_max {
        filters.push(Filter::unchecked(FilterKind::Diameter(diam), Comparator::Le));
    }
    if let Some(flag) = criteria.hazardous {
        filters.push(Filter::unchecked(FilterKind::Hazard(flag), Comparator::Eq));
    }
    filters
}

// ---------------------------------------------------------------------------
// limit – cap a result stream
// ---------------------------------------------------------------------------

/// Yield at most `max_elements` items from `iter`, preserving order and
/// laziness; the source is not pulled past the cap.
///
/// `None` and `Some(0)` both mean unlimited pass-through — zero is "no limit",
/// not "no results".
pub fn limit<I>(iter: I, max_elements: Option<usize>) -> impl Iterator<Item = I::Item>
where
    I: Iterator,
{
    let cap = match max_elements {
        None | Some(0) => usize::MAX,
        Some(n) => n,
    };
    iter.take(cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn approach_at(datetime: &str, distance: f64, velocity: f64) -> CloseApproach {
        let time = NaiveDateTime::parse_from_str(datetime, "%Y-%m-%d %H:%M").unwrap();
        CloseApproach::new("2000433", Some(time), distance, velocity)
    }

    #[test]
    fn comparators_on_floats() {
        let approach = approach_at("2020-01-01 00:00", 0.15, 5.0);
        let le = Filter::new(FilterKind::Distance(0.15), Comparator::Le).unwrap();
        let ge = Filter::new(FilterKind::Distance(0.2), Comparator::Ge).unwrap();
        assert!(le.matches(&approach, None));
        assert!(!ge.matches(&approach, None));
    }

    #[test]
    fn date_filter_compares_calendar_date_only() {
        let approach = approach_at("2020-01-01 23:59", 0.15, 5.0);
        let eq = Filter::new(FilterKind::Date(date(2020, 1, 1)), Comparator::Eq).unwrap();
        assert!(eq.matches(&approach, None));
    }

    #[test]
    fn date_filter_skips_approach_without_time() {
        let approach = CloseApproach::new("2000433", None, 0.15, 5.0);
        let eq = Filter::new(FilterKind::Date(date(2020, 1, 1)), Comparator::Eq).unwrap();
        assert!(!eq.matches(&approach, None));
    }

    #[test]
    fn neo_side_filters_skip_orphans() {
        let approach = CloseApproach::new("9999999", None, 0.15, 5.0);
        let diam = Filter::new(FilterKind::Diameter(0.0), Comparator::Ge).unwrap();
        let hazard = Filter::new(FilterKind::Hazard(false), Comparator::Eq).unwrap();
        assert!(!diam.matches(&approach, None));
        assert!(!hazard.matches(&approach, None));
    }

    #[test]
    fn unknown_diameter_never_matches_diameter_filters() {
        let neo = NearEarthObject::new("2010PK9", None, None, true);
        let approach = CloseApproach::new("2010PK9", None, 0.15, 5.0);
        let ge = Filter::new(FilterKind::Diameter(0.0), Comparator::Ge).unwrap();
        let le = Filter::new(FilterKind::Diameter(f64::MAX), Comparator::Le).unwrap();
        assert!(!ge.matches(&approach, Some(&neo)));
        assert!(!le.matches(&approach, Some(&neo)));
    }

    #[test]
    fn hazard_filter_rejects_ordering_comparators() {
        let err = Filter::new(FilterKind::Hazard(true), Comparator::Ge).unwrap_err();
        assert_eq!(
            err,
            FilterError::UnsupportedComparator {
                family: "hazard",
                comparator: Comparator::Ge,
            }
        );
        assert!(Filter::new(FilterKind::Hazard(true), Comparator::Eq).is_ok());
    }

    #[test]
    fn create_filters_skips_absent_criteria() {
        assert!(create_filters(&QueryCriteria::default()).is_empty());

        let criteria = QueryCriteria {
            start_date: Some(date(2020, 1, 1)),
            distance_max: Some(0.2),
            hazardous: Some(true),
            ..QueryCriteria::default()
        };
        let filters = create_filters(&criteria);
        assert_eq!(filters.len(), 3);
        // Fixed criteria-table order.
        assert_eq!(filters[0].to_string(), "date >= 2020-01-01");
        assert_eq!(filters[1].to_string(), "distance <= 0.2 au");
        assert_eq!(filters[2].to_string(), "hazardous == true");
    }

    #[test]
    fn conjunction_is_order_independent() {
        let approaches = vec![
            approach_at("2020-01-01 00:00", 0.1, 5.0),
            approach_at("2020-01-01 00:00", 0.4, 5.0),
            approach_at("2020-02-15 00:00", 0.1, 5.0),
        ];
        let a = Filter::new(FilterKind::Date(date(2020, 1, 1)), Comparator::Eq).unwrap();
        let b = Filter::new(FilterKind::Distance(0.2), Comparator::Le).unwrap();

        let pick = |filters: &[Filter]| -> Vec<usize> {
            approaches
                .iter()
                .enumerate()
                .filter(|(_, ap)| filters.iter().all(|f| f.matches(ap, None)))
                .map(|(i, _)| i)
                .collect()
        };
        assert_eq!(pick(&[a.clone(), b.clone()]), vec![0]);
        assert_eq!(pick(&[b, a]), vec![0]);
    }

    #[test]
    fn limit_none_and_zero_pass_through() {
        let items = vec![1, 2, 3, 4];
        let all: Vec<i32> = limit(items.iter().copied(), None).collect();
        assert_eq!(all, items);
        let all: Vec<i32> = limit(items.iter().copied(), Some(0)).collect();
        assert_eq!(all, items);
    }

    #[test]
    fn limit_caps_and_stops_pulling_the_source() {
        let mut pulled = 0usize;
        let source = (0..100).inspect(|_| pulled += 1);
        let first: Vec<i32> = limit(source, Some(3)).collect();
        assert_eq!(first, vec![0, 1, 2]);
        assert_eq!(pulled, 3);
    }
}
