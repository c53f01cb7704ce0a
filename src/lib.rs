//! Query close approaches of near-Earth objects (NEOs).
//!
//! The crate loads NEO and close-approach records from NASA JPL data files,
//! links the two collections into an in-memory [`data::database::NeoDatabase`],
//! and answers filtered queries over the joined data.

pub mod data;

pub use data::database::NeoDatabase;
pub use data::filter::{create_filters, limit, Comparator, Filter, FilterKind, QueryCriteria};
pub use data::model::{ApproachRecord, CloseApproach, NearEarthObject};
