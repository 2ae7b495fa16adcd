/// Data layer: raw trace loading and the 1D → 2D reshaping core.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv / .tsv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  columns 0, 1 → RawSeries (time, intensity)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  axes     │  time + sampling time → D1 axis [min], D2 axis [s]
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  reshape  │  shift → cut rows → subtract blank → IntensityMatrix
///   └──────────┘
/// ```
///
/// `axes` and `reshape` are pure and hold no state; `pipeline` chains them
/// and logs what it does.

pub mod axes;
pub mod error;
pub mod loader;
pub mod model;
pub mod params;
pub mod pipeline;
pub mod reshape;
