//! Boundary with the pixel-evaluation host: product registration
//! descriptors and the run-metadata export shapes.

pub mod descriptor;
pub mod metadata;

// Re-export main types
pub use descriptor::{
    DatasourceSpec, Mosaicking, OutputSpec, ProductDescriptor, SampleType,
};
pub use metadata::RunSummary;
