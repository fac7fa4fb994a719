/// Data layer: core types, loading, cleaning and enrichment.
///
/// Architecture:
/// ```text
///  .json / .csv / .parquet          (or the fallback payload)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → raw ColumnTable (recognized columns only)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  drop rows with any invalid cell → aligned ColumnTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  enrich   │  roles + next transit + colour → EnrichedRecord list
///   └──────────┘
/// ```

pub mod enrich;
pub mod fallback;
pub mod filter;
pub mod loader;
pub mod model;
