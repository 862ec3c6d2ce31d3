/// Data layer: raw tables, normalization, filtering and export.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet / USGS feed
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse source → RawRecordSet (untyped columns)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  resolve columns, coerce, range-check → NormalizedRecordSet
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  magnitude / date bounds → FilteredRecordSet
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  CSV bytes
///   └──────────┘
/// ```

pub mod columns;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
