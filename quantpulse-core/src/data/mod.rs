//! Data acquisition — source adapters, normalization, fallback orchestration.

pub mod fallback;
pub mod normalize;
pub mod source;
pub mod sources;

pub use fallback::{ChainEntry, HistoryFetcher};
pub use normalize::normalize;
pub use source::{BarSource, RawBarBatch, RawRow, SourceError};
