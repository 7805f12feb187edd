use chrono::{DateTime, Utc};
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

/// Discrete product code as delivered by the host (GF, SSC, PSA bands)
pub type SnowCode = u8;

/// Classification value written back to the host raster (INT8 sample type)
pub type ClassValue = i8;

/// 2D classification raster for one tile (rows x cols)
pub type ClassImage = Array2<ClassValue>;

/// 2D single-band code raster (rows x cols)
pub type CodeImage = Array2<SnowCode>;

/// Temporal code stack for one tile (scene x rows x cols)
pub type CodeStack = Array3<SnowCode>;

/// Sentinel returned to the host when a pixel could not be classified.
/// Pixels carrying this value must never reach the zonal accumulator.
pub const UNCLASSIFIED: ClassValue = -1;

/// Gap-filled fractional snow cover: full snow cover code
pub const GF_FULL_SNOW: SnowCode = 100;

/// Wet/dry snow state: wet snow code
pub const SSC_WET_SNOW: SnowCode = 110;

/// Wet/dry snow state: dry snow code
pub const SSC_DRY_SNOW: SnowCode = 115;

/// Shared no-data code across the snow product family
pub const NO_DATA: SnowCode = 255;

/// Static terrain reading for one pixel (aspect/DEM datasource).
///
/// `data_mask` is the host's validity flag for the terrain layers; a
/// masked pixel has no usable aspect or elevation and is excluded from
/// zonal accounting entirely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainSample {
    /// Slope aspect in degrees clockwise from North, [0, 360)
    pub aspect: f32,
    /// Elevation above sea level in meters
    pub elevation: f32,
    /// 1 = terrain layers valid, 0 = no terrain data
    pub data_mask: u8,
}

impl TerrainSample {
    pub fn new(aspect: f32, elevation: f32, data_mask: u8) -> Self {
        Self {
            aspect,
            elevation,
            data_mask,
        }
    }

    /// Whether the terrain layers carry usable data for this pixel
    pub fn is_valid(&self) -> bool {
        self.data_mask != 0
    }
}

/// One product reading paired with the host's per-scene validity mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskedReading {
    pub value: SnowCode,
    /// 1 = reading valid, 0 = gap in this scene
    pub data_mask: u8,
}

impl MaskedReading {
    pub fn new(value: SnowCode, data_mask: u8) -> Self {
        Self { value, data_mask }
    }
}

/// Sample group shape delivered by the host for one datasource.
///
/// Static layers arrive as a single reading; moving datasources arrive
/// as an ordered temporal stack with zero or more scenes. The tag makes
/// the shape explicit at the call site instead of relying on length
/// checks against an ambiguous sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleGroup {
    /// One reading from a static layer (SIMPLE mosaicking)
    Single(SnowCode),
    /// Ordered temporal stack, newest scene first (TILE mosaicking)
    Stack(Vec<SnowCode>),
}

impl SampleGroup {
    /// View the group as a temporal slice; a single reading is a
    /// one-element stack.
    pub fn readings(&self) -> &[SnowCode] {
        match self {
            SampleGroup::Single(code) => std::slice::from_ref(code),
            SampleGroup::Stack(codes) => codes.as_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.readings().len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings().is_empty()
    }
}

/// Scene-level metadata forwarded by the host alongside the sample stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneInfo {
    /// Scene or tile identifier as issued by the host
    pub id: String,
    /// Sensing time of the acquisition
    pub acquisition: DateTime<Utc>,
}

/// Paired classification/validity output for the non-zonal products.
///
/// The host mosaics these directly: `data_mask == 0` excludes the pixel
/// downstream even though a value is present (distinct channel from the
/// `-1` sentinel used by the zonal products).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskedOutput {
    pub value: ClassValue,
    pub data_mask: u8,
}

/// Error types for the snow classification core
#[derive(Debug, thiserror::Error)]
pub enum SnowError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Tile shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for snow classification operations
pub type SnowResult<T> = Result<T, SnowError>;
