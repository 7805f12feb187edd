//! Core snow classification modules

pub mod binning;
pub mod classify;
pub mod session;
pub mod statistics;
pub mod tile;
pub mod zones;

// Re-export main types
pub use binning::ClassBins;
pub use classify::{
    classify_snow_presence, screen_persistent_snow, PersistentSnowClassifier,
    SnowCoverClassifier, StackClassifier, StackOutcome, WetDryClassifier,
};
pub use session::{PersistentSnowSession, SnowCoverSession, WetDrySession};
pub use statistics::{AggregateKind, Contribution, ZonalStatistics, ZoneAggregate, ZoneRecord};
pub use tile::{classify_snow_presence_tile, screen_persistent_snow_tile, TerrainTile};
pub use zones::{ZoneKey, ZoneTable};
