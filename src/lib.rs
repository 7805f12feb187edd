//! Snowzone: A Fast, Modular Zonal Snow Classification Core
//!
//! This library reduces per-pixel temporal stacks of Copernicus snow products
//! (gap-filled snow cover, wet/dry snow state, persistent snow area) to discrete
//! classification rasters and aspect/elevation zonal statistics inside a
//! host-controlled datacube pixel-evaluation engine.

use numpy::{PyArray2, PyReadonlyArray2, PyReadonlyArray3};
use pyo3::prelude::*;

pub mod types;
pub mod host;
pub mod core;

// Re-export main types and functions for easier access
pub use types::{
    ClassImage, ClassValue, CodeImage, CodeStack, MaskedOutput, MaskedReading, SampleGroup,
    SceneInfo, SnowCode, SnowError, SnowResult, TerrainSample, UNCLASSIFIED,
};

pub use self::core::{
    classify_snow_presence, classify_snow_presence_tile, screen_persistent_snow,
    screen_persistent_snow_tile, ClassBins, PersistentSnowSession, SnowCoverSession,
    TerrainTile, WetDrySession, ZonalStatistics, ZoneKey, ZoneRecord, ZoneTable,
};

pub use host::{ProductDescriptor, RunSummary};

/// Python module definition
#[pymodule]
fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyWetDrySession>()?;
    m.add_class::<PySnowCoverSession>()?;
    m.add_class::<PyPersistentSnowSession>()?;
    m.add_function(wrap_pyfunction!(snow_presence, m)?)?;
    m.add_function(wrap_pyfunction!(persistent_snow_screen, m)?)?;
    Ok(())
}

fn build_terrain(
    aspect: PyReadonlyArray2<f32>,
    elevation: PyReadonlyArray2<f32>,
    data_mask: PyReadonlyArray2<u8>,
) -> PyResult<TerrainTile> {
    TerrainTile::new(
        aspect.as_array().to_owned(),
        elevation.as_array().to_owned(),
        data_mask.as_array().to_owned(),
    )
    .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("{}", e)))
}

/// Python wrapper for WetDrySession
#[pyclass(name = "WetDrySession")]
struct PyWetDrySession {
    inner: WetDrySession,
}

#[pymethods]
impl PyWetDrySession {
    #[new]
    fn new() -> PyResult<Self> {
        let inner = WetDrySession::new()
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e)))?;

        Ok(PyWetDrySession { inner })
    }

    fn evaluate_pixel(
        &mut self,
        aspect: f32,
        elevation: f32,
        terrain_mask: u8,
        ssc: Vec<u8>,
    ) -> PyResult<i8> {
        self.inner
            .evaluate_pixel(
                TerrainSample::new(aspect, elevation, terrain_mask),
                &SampleGroup::Stack(ssc),
            )
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e)))
    }

    fn evaluate_tile<'py>(
        &mut self,
        py: Python<'py>,
        aspect: PyReadonlyArray2<f32>,
        elevation: PyReadonlyArray2<f32>,
        terrain_mask: PyReadonlyArray2<u8>,
        ssc: PyReadonlyArray3<u8>,
    ) -> PyResult<&'py PyArray2<i8>> {
        let terrain = build_terrain(aspect, elevation, terrain_mask)?;
        let stack = ssc.as_array().to_owned();

        let output = self
            .inner
            .evaluate_tile(&terrain, &stack)
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e)))?;

        Ok(PyArray2::from_owned_array(py, output))
    }

    fn user_data(&self) -> PyResult<String> {
        self.inner
            .export_metadata(&[])
            .user_data()
            .map(|v| v.to_string())
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e)))
    }
}

/// Python wrapper for SnowCoverSession
#[pyclass(name = "SnowCoverSession")]
struct PySnowCoverSession {
    inner: SnowCoverSession,
}

#[pymethods]
impl PySnowCoverSession {
    #[new]
    fn new() -> PyResult<Self> {
        let inner = SnowCoverSession::new()
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e)))?;

        Ok(PySnowCoverSession { inner })
    }

    fn evaluate_pixel(
        &mut self,
        aspect: f32,
        elevation: f32,
        terrain_mask: u8,
        gf: Vec<u8>,
    ) -> PyResult<i8> {
        self.inner
            .evaluate_pixel(
                TerrainSample::new(aspect, elevation, terrain_mask),
                &SampleGroup::Stack(gf),
            )
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e)))
    }

    fn evaluate_tile<'py>(
        &mut self,
        py: Python<'py>,
        aspect: PyReadonlyArray2<f32>,
        elevation: PyReadonlyArray2<f32>,
        terrain_mask: PyReadonlyArray2<u8>,
        gf: PyReadonlyArray3<u8>,
    ) -> PyResult<&'py PyArray2<i8>> {
        let terrain = build_terrain(aspect, elevation, terrain_mask)?;
        let stack = gf.as_array().to_owned();

        let output = self
            .inner
            .evaluate_tile(&terrain, &stack)
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e)))?;

        Ok(PyArray2::from_owned_array(py, output))
    }

    fn user_data(&self) -> PyResult<String> {
        self.inner
            .export_metadata(&[])
            .user_data()
            .map(|v| v.to_string())
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e)))
    }
}

/// Python wrapper for PersistentSnowSession
#[pyclass(name = "PersistentSnowSession")]
struct PyPersistentSnowSession {
    inner: PersistentSnowSession,
}

#[pymethods]
impl PyPersistentSnowSession {
    #[new]
    fn new() -> PyResult<Self> {
        let inner = PersistentSnowSession::new()
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e)))?;

        Ok(PyPersistentSnowSession { inner })
    }

    fn evaluate_pixel(
        &mut self,
        aspect: f32,
        elevation: f32,
        terrain_mask: u8,
        psa: u8,
    ) -> PyResult<i8> {
        self.inner
            .evaluate_pixel(
                TerrainSample::new(aspect, elevation, terrain_mask),
                &SampleGroup::Single(psa),
            )
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e)))
    }

    fn evaluate_tile<'py>(
        &mut self,
        py: Python<'py>,
        aspect: PyReadonlyArray2<f32>,
        elevation: PyReadonlyArray2<f32>,
        terrain_mask: PyReadonlyArray2<u8>,
        psa: PyReadonlyArray2<u8>,
    ) -> PyResult<&'py PyArray2<i8>> {
        let terrain = build_terrain(aspect, elevation, terrain_mask)?;
        let layer = psa.as_array().to_owned();

        let output = self
            .inner
            .evaluate_tile(&terrain, &layer)
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e)))?;

        Ok(PyArray2::from_owned_array(py, output))
    }

    fn user_data(&self) -> PyResult<String> {
        self.inner
            .export_metadata(&[])
            .user_data()
            .map(|v| v.to_string())
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e)))
    }
}

/// Binary snow presence for one pixel's scene stack
#[pyfunction]
fn snow_presence(gf: Vec<u8>, data_mask: Vec<u8>) -> PyResult<(i8, u8)> {
    if gf.len() != data_mask.len() {
        return Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
            "Band length mismatch: {} GF readings, {} mask readings",
            gf.len(),
            data_mask.len()
        )));
    }

    let out = classify_snow_presence(
        gf.iter()
            .zip(data_mask.iter())
            .map(|(&value, &mask)| MaskedReading::new(value, mask)),
    );
    Ok((out.value, out.data_mask))
}

/// Persistent snow pass-through with mask correction for one pixel
#[pyfunction]
fn persistent_snow_screen(psa: u8, data_mask: u8) -> PyResult<(i8, u8)> {
    let out = screen_persistent_snow(MaskedReading::new(psa, data_mask));
    Ok((out.value, out.data_mask))
}
