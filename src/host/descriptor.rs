use serde::{Deserialize, Serialize};

/// How the host combines overlapping acquisitions before handing
/// samples to the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mosaicking {
    /// One flattened reading per datasource
    Simple,
    /// One reading per contributing tile, ordered newest first
    Tile,
    /// One reading per orbit
    Orbit,
}

/// Raster sample type of an output band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SampleType {
    Int8,
    Uint8,
    Uint16,
    Float32,
}

/// One input datasource and the bands requested from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceSpec {
    pub id: String,
    pub bands: Vec<String>,
}

impl DatasourceSpec {
    pub fn new(id: &str, bands: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            bands: bands.iter().map(|b| b.to_string()).collect(),
        }
    }
}

/// One declared output raster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub id: String,
    pub bands: usize,
    pub sample_type: SampleType,
}

impl OutputSpec {
    pub fn new(id: &str, bands: usize, sample_type: SampleType) -> Self {
        Self {
            id: id.to_string(),
            bands,
            sample_type,
        }
    }
}

/// Registration record the host reads before a run: which datasources
/// and bands to fetch, which outputs to allocate, and how to mosaic.
/// Pure declaration; no evaluation logic depends on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDescriptor {
    pub datasources: Vec<DatasourceSpec>,
    pub outputs: Vec<OutputSpec>,
    pub mosaicking: Mosaicking,
}

impl ProductDescriptor {
    /// Wet/dry snow classification with zonal statistics
    pub fn wet_dry_snow() -> Self {
        Self {
            datasources: vec![
                DatasourceSpec::new("wds", &["SSC"]),
                DatasourceSpec::new("asp", &["aspect", "dem", "dataMask"]),
            ],
            outputs: vec![OutputSpec::new("default", 1, SampleType::Int8)],
            mosaicking: Mosaicking::Tile,
        }
    }

    /// Terrain-gated binary snow cover with zonal statistics
    pub fn snow_cover_fraction() -> Self {
        Self {
            datasources: vec![
                DatasourceSpec::new("gfsc", &["GF"]),
                DatasourceSpec::new("asp", &["aspect", "dem", "dataMask"]),
            ],
            outputs: vec![OutputSpec::new("default", 1, SampleType::Int8)],
            mosaicking: Mosaicking::Tile,
        }
    }

    /// Zonal persistent snow area over the fine elevation belts
    pub fn persistent_snow() -> Self {
        Self {
            datasources: vec![
                DatasourceSpec::new("psa", &["PSA"]),
                DatasourceSpec::new("asp", &["aspect", "dem", "dataMask"]),
            ],
            outputs: vec![OutputSpec::new("default", 1, SampleType::Int8)],
            mosaicking: Mosaicking::Simple,
        }
    }

    /// Binary snow presence with a companion validity band
    /// (host-mosaicked, no zonal statistics)
    pub fn snow_presence() -> Self {
        Self {
            datasources: vec![DatasourceSpec::new("gfsc", &["GF", "dataMask"])],
            outputs: vec![
                OutputSpec::new("fractional_snow", 1, SampleType::Int8),
                OutputSpec::new("dataMask", 1, SampleType::Uint8),
            ],
            mosaicking: Mosaicking::Tile,
        }
    }

    /// Persistent snow pass-through with mask correction
    /// (host-mosaicked, no zonal statistics)
    pub fn persistent_snow_screen() -> Self {
        Self {
            datasources: vec![DatasourceSpec::new("psa", &["PSA", "dataMask"])],
            outputs: vec![
                OutputSpec::new("persistent_snow", 1, SampleType::Int8),
                OutputSpec::new("dataMask", 1, SampleType::Uint8),
            ],
            mosaicking: Mosaicking::Simple,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zonal_products_declare_terrain_datasource() {
        for descriptor in [
            ProductDescriptor::wet_dry_snow(),
            ProductDescriptor::snow_cover_fraction(),
            ProductDescriptor::persistent_snow(),
        ] {
            assert!(descriptor.datasources.iter().any(|d| d.id == "asp"));
            assert_eq!(descriptor.outputs.len(), 1);
            assert_eq!(descriptor.outputs[0].sample_type, SampleType::Int8);
        }
    }

    #[test]
    fn test_descriptor_serialization() {
        let descriptor = ProductDescriptor::wet_dry_snow();
        let json = serde_json::to_value(&descriptor).unwrap();

        assert_eq!(json["mosaicking"], "TILE");
        assert_eq!(json["datasources"][0]["id"], "wds");
        assert_eq!(json["datasources"][0]["bands"][0], "SSC");
    }

    #[test]
    fn test_masked_products_declare_validity_band() {
        for descriptor in [
            ProductDescriptor::snow_presence(),
            ProductDescriptor::persistent_snow_screen(),
        ] {
            assert!(descriptor.outputs.iter().any(|o| o.id == "dataMask"));
        }
    }
}
