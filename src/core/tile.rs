use ndarray::{s, Array2, Array3, ArrayView3};

use crate::core::classify::{classify_snow_presence, screen_persistent_snow, StackClassifier};
use crate::core::session::{evaluate_readings, ZonalRun};
use crate::types::{
    ClassImage, ClassValue, CodeImage, CodeStack, MaskedReading, SnowError, SnowResult,
    TerrainSample, UNCLASSIFIED,
};

/// Minimum pixel count before the parallel tile path pays off
#[cfg(feature = "parallel")]
const PARALLEL_MIN_PIXELS: usize = 250_000;

/// Static terrain layers for one tile: aspect, elevation and the
/// terrain validity mask, all on the same grid.
#[derive(Debug, Clone)]
pub struct TerrainTile {
    aspect: Array2<f32>,
    elevation: Array2<f32>,
    data_mask: Array2<u8>,
}

impl TerrainTile {
    pub fn new(
        aspect: Array2<f32>,
        elevation: Array2<f32>,
        data_mask: Array2<u8>,
    ) -> SnowResult<Self> {
        if aspect.dim() != elevation.dim() {
            return Err(SnowError::ShapeMismatch {
                expected: aspect.dim(),
                actual: elevation.dim(),
            });
        }
        if aspect.dim() != data_mask.dim() {
            return Err(SnowError::ShapeMismatch {
                expected: aspect.dim(),
                actual: data_mask.dim(),
            });
        }
        Ok(Self {
            aspect,
            elevation,
            data_mask,
        })
    }

    /// Tile dimensions (rows, cols)
    pub fn dim(&self) -> (usize, usize) {
        self.aspect.dim()
    }

    /// Terrain reading for one pixel
    pub fn sample(&self, row: usize, col: usize) -> TerrainSample {
        TerrainSample::new(
            self.aspect[[row, col]],
            self.elevation[[row, col]],
            self.data_mask[[row, col]],
        )
    }
}

fn check_stack_shape(terrain: &TerrainTile, stack: &ArrayView3<u8>) -> SnowResult<()> {
    let (_, rows, cols) = stack.dim();
    if (rows, cols) != terrain.dim() {
        return Err(SnowError::ShapeMismatch {
            expected: terrain.dim(),
            actual: (rows, cols),
        });
    }
    Ok(())
}

/// Classify a whole tile against a zonal run: one output value per
/// pixel, statistics folded into the run's table.
///
/// An empty scene axis is a valid degenerate input; every pixel is then
/// unclassifiable. With the `parallel` feature, large tiles are split
/// into row bands that accumulate into partial statistics tables,
/// merged after the scan, so no two workers ever touch the same zone
/// record.
pub(crate) fn evaluate_stack_tile<C>(
    classifier: &C,
    run: &mut ZonalRun,
    terrain: &TerrainTile,
    stack: ArrayView3<u8>,
) -> SnowResult<ClassImage>
where
    C: StackClassifier + Sync,
{
    check_stack_shape(terrain, &stack)?;

    let (rows, cols) = terrain.dim();
    log::debug!(
        "Evaluating {}x{} tile with {} scenes",
        rows,
        cols,
        stack.dim().0
    );

    #[cfg(feature = "parallel")]
    {
        if rows * cols >= PARALLEL_MIN_PIXELS && rows > 1 {
            return evaluate_stack_tile_parallel(classifier, run, terrain, stack);
        }
    }

    evaluate_stack_tile_sequential(classifier, run, terrain, stack)
}

pub(crate) fn evaluate_stack_tile_sequential<C>(
    classifier: &C,
    run: &mut ZonalRun,
    terrain: &TerrainTile,
    stack: ArrayView3<u8>,
) -> SnowResult<ClassImage>
where
    C: StackClassifier,
{
    let (rows, cols) = terrain.dim();
    let mut output = ClassImage::from_elem((rows, cols), UNCLASSIFIED);

    for row in 0..rows {
        for col in 0..cols {
            let readings = stack.slice(s![.., row, col]);
            output[[row, col]] = evaluate_readings(
                classifier,
                &run.zones,
                &mut run.stats,
                terrain.sample(row, col),
                readings.iter().copied(),
            )?;
        }
    }

    Ok(output)
}

#[cfg(feature = "parallel")]
pub(crate) fn evaluate_stack_tile_parallel<C>(
    classifier: &C,
    run: &mut ZonalRun,
    terrain: &TerrainTile,
    stack: ArrayView3<u8>,
) -> SnowResult<ClassImage>
where
    C: StackClassifier + Sync,
{
    use rayon::prelude::*;

    let (rows, cols) = terrain.dim();
    let num_bands = rayon::current_num_threads().max(1).min(rows);
    let band_rows = (rows + num_bands - 1) / num_bands;

    let bands: Vec<(usize, usize)> = (0..rows)
        .step_by(band_rows)
        .map(|start| (start, (start + band_rows).min(rows)))
        .collect();

    log::debug!("Parallel tile scan over {} row bands", bands.len());

    let zones = &run.zones;
    let template = run.stats.zeroed();

    let partials: Vec<(Vec<ClassValue>, crate::core::statistics::ZonalStatistics)> = bands
        .par_iter()
        .map(|&(start, end)| {
            let mut local = template.clone();
            let mut band_out = vec![UNCLASSIFIED; (end - start) * cols];
            for row in start..end {
                for col in 0..cols {
                    let readings = stack.slice(s![.., row, col]);
                    band_out[(row - start) * cols + col] = evaluate_readings(
                        classifier,
                        zones,
                        &mut local,
                        terrain.sample(row, col),
                        readings.iter().copied(),
                    )?;
                }
            }
            Ok((band_out, local))
        })
        .collect::<SnowResult<Vec<_>>>()?;

    let mut flat = Vec::with_capacity(rows * cols);
    for (band_out, partial) in partials {
        flat.extend_from_slice(&band_out);
        run.stats.merge(&partial)?;
    }

    ClassImage::from_shape_vec((rows, cols), flat)
        .map_err(|e| SnowError::Processing(format!("Tile assembly failed: {}", e)))
}

/// Binary snow presence over a whole tile: gap-filled codes plus the
/// matching per-scene data masks, producing the classification band and
/// its companion validity band (non-zonal, host-mosaicked).
pub fn classify_snow_presence_tile(
    gf: &CodeStack,
    masks: &Array3<u8>,
) -> SnowResult<(ClassImage, Array2<u8>)> {
    if gf.dim() != masks.dim() {
        let (_, rows, cols) = gf.dim();
        let (_, mrows, mcols) = masks.dim();
        return Err(SnowError::ShapeMismatch {
            expected: (rows, cols),
            actual: (mrows, mcols),
        });
    }

    let (_, rows, cols) = gf.dim();
    let mut values = ClassImage::zeros((rows, cols));
    let mut validity = Array2::<u8>::zeros((rows, cols));

    for row in 0..rows {
        for col in 0..cols {
            let codes = gf.slice(s![.., row, col]);
            let scene_masks = masks.slice(s![.., row, col]);
            let out = classify_snow_presence(
                codes
                    .iter()
                    .zip(scene_masks.iter())
                    .map(|(&value, &data_mask)| MaskedReading::new(value, data_mask)),
            );
            values[[row, col]] = out.value;
            validity[[row, col]] = out.data_mask;
        }
    }

    Ok((values, validity))
}

/// Persistent snow pass-through over a whole tile, forcing the validity
/// mask off wherever the scalar is not a persistent-snow indicator
/// (non-zonal, host-mosaicked).
pub fn screen_persistent_snow_tile(
    psa: &CodeImage,
    masks: &Array2<u8>,
) -> SnowResult<(ClassImage, Array2<u8>)> {
    if psa.dim() != masks.dim() {
        return Err(SnowError::ShapeMismatch {
            expected: psa.dim(),
            actual: masks.dim(),
        });
    }

    let (rows, cols) = psa.dim();
    let mut values = ClassImage::zeros((rows, cols));
    let mut validity = Array2::<u8>::zeros((rows, cols));

    for ((row, col), &value) in psa.indexed_iter() {
        let out = screen_persistent_snow(MaskedReading::new(value, masks[[row, col]]));
        values[[row, col]] = out.value;
        validity[[row, col]] = out.data_mask;
    }

    Ok((values, validity))
}
