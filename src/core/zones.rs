use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::core::binning::ClassBins;
use crate::types::SnowResult;

/// Composite terrain zone identifier: aspect class x elevation class.
///
/// Kept as a typed pair rather than a concatenated string so that two
/// distinct label pairs can never collide on a shared separator. The
/// `"{aspect}_{elevation}"` rendering exists only at the metadata
/// export boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ZoneKey {
    /// Aspect class label in degrees clockwise from North
    pub aspect: u16,
    /// Elevation class label in meters
    pub elevation: u16,
}

impl ZoneKey {
    pub fn new(aspect: u16, elevation: u16) -> Self {
        Self { aspect, elevation }
    }
}

impl fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.aspect, self.elevation)
    }
}

/// Aspect and elevation binning tables for one zonal product.
///
/// Aspect classes are eight 45-degree sectors centered on the compass
/// directions; the sector around North spans [337.5, 360) and [0, 22.5)
/// and both edges carry the label 0, so the distinct label product has
/// eight aspect classes even though the table has nine bins.
#[derive(Debug, Clone)]
pub struct ZoneTable {
    aspect_bins: ClassBins<f32, u16>,
    elevation_bins: ClassBins<f32, u16>,
}

impl ZoneTable {
    /// Build a zone table from custom aspect and elevation bins
    pub fn new(
        aspect_bins: ClassBins<f32, u16>,
        elevation_bins: ClassBins<f32, u16>,
    ) -> Self {
        Self {
            aspect_bins,
            elevation_bins,
        }
    }

    /// Standard alpine configuration: compass aspect sectors and 500 m
    /// elevation belts from 1500 m to 4000 m.
    pub fn alpine() -> SnowResult<Self> {
        Ok(Self::new(
            Self::compass_aspect_bins()?,
            ClassBins::new(
                vec![1500.0, 2000.0, 2500.0, 3000.0, 3500.0, 4000.0],
                vec![1500, 2000, 2500, 3000, 3500, 4000, 4500],
            )?,
        ))
    }

    /// Fine alpine configuration: compass aspect sectors and 100 m
    /// elevation belts from 1500 m to 4000 m (persistent snow product).
    pub fn alpine_fine() -> SnowResult<Self> {
        let thresholds: Vec<f32> = (0..26).map(|i| 1500.0 + 100.0 * i as f32).collect();
        let mut labels: Vec<u16> = (0..26).map(|i| 1500 + 100 * i as u16).collect();
        labels.push(4500);

        Ok(Self::new(
            Self::compass_aspect_bins()?,
            ClassBins::new(thresholds, labels)?,
        ))
    }

    /// Eight 45-degree compass sectors with the North sector wrapping
    /// across 0 degrees.
    fn compass_aspect_bins() -> SnowResult<ClassBins<f32, u16>> {
        let thresholds: Vec<f32> = (0..8).map(|i| 22.5 + 45.0 * i as f32).collect();
        let mut labels: Vec<u16> = (0..8).map(|i| 45 * i as u16).collect();
        labels.push(0); // [337.5, 360) wraps back to North

        ClassBins::new(thresholds, labels)
    }

    /// Zone for one pixel's static aspect/elevation readings
    pub fn zone_for(&self, aspect: f32, elevation: f32) -> ZoneKey {
        ZoneKey::new(
            self.aspect_bins.map_value(aspect),
            self.elevation_bins.map_value(elevation),
        )
    }

    /// The distinct cartesian product of aspect and elevation labels,
    /// in key order. Duplicate labels (the North wrap) collapse to one
    /// zone.
    pub fn distinct_keys(&self) -> Vec<ZoneKey> {
        let mut keys = BTreeSet::new();
        for &aspect in self.aspect_bins.labels() {
            for &elevation in self.elevation_bins.labels() {
                keys.insert(ZoneKey::new(aspect, elevation));
            }
        }
        keys.into_iter().collect()
    }
}
