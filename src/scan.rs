use crate::error::{LacunarityError, Result};
use crate::estimator::{estimate, EstimatorOptions, Window};
use crate::geotransform::GeoTransform;
use log::{debug, info};
use ndarray::Array2;

/// Sweep of gliding box sizes over a whole raster.
///
/// Nothing is computed until iterated; every call to [`iter`](Self::iter)
/// restarts the sweep from `box_min`.
pub struct GlobalScan<'a> {
    data: &'a Array2<i64>,
    options: EstimatorOptions,
    box_min: usize,
    box_max: usize,
    box_step: usize,
}

impl<'a> GlobalScan<'a> {
    pub fn new(
        data: &'a Array2<i64>,
        options: EstimatorOptions,
        box_min: usize,
        box_max: usize,
        box_step: usize,
    ) -> Result<Self> {
        if box_step == 0 {
            return Err(LacunarityError::InvalidBoxStep(box_step));
        }

        debug!(
            "GlobalScan: boxes {}..={} step {} over {}x{} raster",
            box_min,
            box_max,
            box_step,
            data.ncols(),
            data.nrows()
        );

        Ok(Self {
            data,
            options,
            box_min,
            box_max,
            box_step,
        })
    }

    /// Box sizes visited by the sweep, ascending
    pub fn box_sizes(&self) -> impl Iterator<Item = usize> {
        (self.box_min..=self.box_max).step_by(self.box_step)
    }

    pub fn iter(&self) -> GlobalScanIter<'_, 'a> {
        GlobalScanIter {
            scan: self,
            next_box: Some(self.box_min),
        }
    }
}

impl<'s, 'a> IntoIterator for &'s GlobalScan<'a> {
    type Item = Result<(usize, f64)>;
    type IntoIter = GlobalScanIter<'s, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct GlobalScanIter<'s, 'a> {
    scan: &'s GlobalScan<'a>,
    next_box: Option<usize>,
}

impl Iterator for GlobalScanIter<'_, '_> {
    type Item = Result<(usize, f64)>;

    fn next(&mut self) -> Option<Self::Item> {
        let box_size = self.next_box.filter(|&b| b <= self.scan.box_max)?;
        self.next_box = box_size.checked_add(self.scan.box_step);

        let window = Window::full(self.scan.data);
        Some(estimate(self.scan.data, box_size, window, &self.scan.options).map(|l| (box_size, l)))
    }
}

/// Result of a moving-window scan, ready for writing
#[derive(Debug, Clone)]
pub struct SpatialLacunarity {
    /// `(height - window + 1) x (width - window + 1)` lacunarity values
    pub data: Array2<f64>,
    /// Input georeference with its origin moved by `window - 1` pixels
    pub geotransform: GeoTransform,
}

impl SpatialLacunarity {
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}

/// Output size of a moving-window scan, or an error when the window does not fit
pub fn output_dims(width: usize, height: usize, window_size: usize) -> Result<(usize, usize)> {
    if window_size == 0 || window_size > width || window_size > height {
        return Err(LacunarityError::WindowTooLarge {
            window: window_size,
            width,
            height,
        });
    }
    Ok((width - window_size + 1, height - window_size + 1))
}

/// Compute the lacunarity of every `window_size` square window of the raster.
///
/// Output cell `(row, col)` holds the lacunarity of the window whose upper-left
/// input cell is `(row, col)`. `progress` receives 10, 20, ... 90 as each tenth
/// of the output cells completes, then 100 once at the end.
pub fn spatial_scan(
    data: &Array2<i64>,
    geotransform: &GeoTransform,
    box_size: usize,
    window_size: usize,
    options: &EstimatorOptions,
    progress: &mut dyn FnMut(u32),
) -> Result<SpatialLacunarity> {
    let (nrows, ncols) = data.dim();
    let (out_width, out_height) = output_dims(ncols, nrows, window_size)?;
    if box_size == 0 || box_size > window_size {
        return Err(LacunarityError::InvalidBoxSize {
            box_size,
            width: window_size,
            height: window_size,
        });
    }

    info!(
        "Spatial lacunarity: {}x{} output, window {}, gliding box {}",
        out_width, out_height, window_size, box_size
    );

    let total = out_width * out_height;
    let mut values: Vec<f64> = Vec::new();
    values
        .try_reserve_exact(total)
        .map_err(|_| LacunarityError::AllocationFailed {
            table: "lacunarity raster",
            len: total,
        })?;

    let mut last_decile = 0;
    for row in 0..out_height {
        for col in 0..out_width {
            let window = Window::new(col, row, window_size, window_size);
            values.push(estimate(data, box_size, window, options)?);

            let decile = (10 * values.len() / total) as u32;
            if decile > last_decile && decile < 10 {
                last_decile = decile;
                progress(decile * 10);
            }
        }
    }
    progress(100);

    let data = Array2::from_shape_vec((out_height, out_width), values)?;
    let geotransform = geotransform.shifted(window_size - 1, window_size - 1);

    Ok(SpatialLacunarity { data, geotransform })
}
