/// Data layer: core types, loading, linking, filtering, and output.
///
/// Architecture:
/// ```text
///  neos.csv   cad.json
///     │          │
///     ▼          ▼
///   ┌──────────────┐
///   │    loader     │  parse files → Vec<NearEarthObject>, Vec<CloseApproach>
///   └──────────────┘
///          │
///          ▼
///   ┌──────────────┐
///   │  NeoDatabase  │  index by designation/name, link approaches to NEOs
///   └──────────────┘
///          │
///          ▼
///   ┌──────────────┐
///   │    filter     │  query(filters) → lazy stream of matching approaches
///   └──────────────┘
///          │
///          ▼
///   ┌──────────────┐
///   │    writer     │  serialize results to CSV or JSON
///   └──────────────┘
/// ```

pub mod database;
pub mod filter;
pub mod loader;
pub mod model;
pub mod writer;
