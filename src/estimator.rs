use crate::error::{LacunarityError, Result};
use log::{debug, warn};
use ndarray::Array2;

/// Default ceiling on the number of intensity levels of a single window
pub const DEFAULT_MAX_LEVELS: u64 = 65_536;

/// How cell values are stacked into levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelMode {
    /// Layered gliding box (Myint & Lam 2005): each level absorbs up to
    /// `box_size` units of the remaining column height
    #[default]
    Layered,
    /// True 3D gliding box: one level per unit of intensity
    Volumetric,
}

/// What a scan does when a window's transient tables cannot be allocated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowFailurePolicy {
    /// Abort the whole scan with the allocation error
    #[default]
    Fail,
    /// Log the failure and record a lacunarity of 0.0 for the window.
    /// Under memory pressure this yields misleading rasters.
    Zero,
}

#[derive(Debug, Clone, Copy)]
pub struct EstimatorOptions {
    pub mode: LevelMode,
    pub max_levels: u64,
    pub failure_policy: WindowFailurePolicy,
}

impl Default for EstimatorOptions {
    fn default() -> Self {
        Self {
            mode: LevelMode::Layered,
            max_levels: DEFAULT_MAX_LEVELS,
            failure_policy: WindowFailurePolicy::Fail,
        }
    }
}

/// Sub-rectangle of a raster, in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Window {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Window covering a whole raster
    pub fn full(data: &Array2<i64>) -> Self {
        let (nrows, ncols) = data.dim();
        Self::new(0, 0, ncols, nrows)
    }

    fn check_bounds(&self, raster_width: usize, raster_height: usize) -> Result<()> {
        let fits_x = self.x.checked_add(self.width).is_some_and(|end| end <= raster_width);
        let fits_y = self.y.checked_add(self.height).is_some_and(|end| end <= raster_height);
        if fits_x && fits_y {
            Ok(())
        } else {
            Err(LacunarityError::WindowOutOfBounds {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
                raster_width,
                raster_height,
            })
        }
    }
}

/// Per-level contribution of one cell to a gliding box.
trait LevelAccumulator {
    fn level_count(max_value: i64, box_size: i64) -> i64;

    /// Add the contribution of a cell of `height` to `levels`, one slot per level
    fn accumulate(levels: &mut [i64], height: i64, box_size: i64);
}

struct Layered;

impl LevelAccumulator for Layered {
    fn level_count(max_value: i64, box_size: i64) -> i64 {
        // ceil(max_value / box_size), both positive here
        (max_value - 1) / box_size + 1
    }

    #[inline]
    fn accumulate(levels: &mut [i64], height: i64, box_size: i64) {
        let mut remaining = height.max(0);
        for slot in levels.iter_mut() {
            if remaining == 0 {
                break;
            }
            let absorbed = remaining.min(box_size);
            *slot += absorbed;
            remaining -= absorbed;
        }
    }
}

struct Volumetric;

impl LevelAccumulator for Volumetric {
    fn level_count(max_value: i64, _box_size: i64) -> i64 {
        max_value
    }

    #[inline]
    fn accumulate(levels: &mut [i64], height: i64, box_size: i64) {
        // Levels at or above the cell height contribute nothing
        let reached = height.clamp(0, levels.len() as i64) as usize;
        for (k, slot) in levels[..reached].iter_mut().enumerate() {
            *slot += (height - k as i64).min(box_size);
        }
    }
}

/// Allocate a zeroed table, reporting failure instead of aborting
fn try_zeroed<T: Clone + Default>(table: &'static str, len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| LacunarityError::AllocationFailed { table, len })?;
    v.resize(len, T::default());
    Ok(v)
}

/// Compute the gliding-box lacunarity of `window` for a box of `box_size` cells.
///
/// Returns exactly `0.0` when no cell of the window is positive. Fails when the
/// window leaves the raster, when the box does not fit the window, when the
/// window needs more than `max_levels` levels, or when a transient table cannot
/// be allocated.
pub fn lacunarity_in_window(
    data: &Array2<i64>,
    mode: LevelMode,
    box_size: usize,
    window: Window,
    max_levels: u64,
) -> Result<f64> {
    let (nrows, ncols) = data.dim();
    window.check_bounds(ncols, nrows)?;

    if box_size == 0 || box_size > window.width || box_size > window.height {
        return Err(LacunarityError::InvalidBoxSize {
            box_size,
            width: window.width,
            height: window.height,
        });
    }

    match mode {
        LevelMode::Layered => gliding_box::<Layered>(data, box_size, window, max_levels),
        LevelMode::Volumetric => gliding_box::<Volumetric>(data, box_size, window, max_levels),
    }
}

fn gliding_box<A: LevelAccumulator>(
    data: &Array2<i64>,
    box_size: usize,
    window: Window,
    max_levels: u64,
) -> Result<f64> {
    let max_value = data
        .slice(ndarray::s![
            window.y..window.y + window.height,
            window.x..window.x + window.width
        ])
        .iter()
        .copied()
        .max()
        .unwrap_or(0);

    if max_value <= 0 {
        return Ok(0.0);
    }

    let gbox = box_size as i64;
    let n_levels = A::level_count(max_value, gbox) as u64;
    if n_levels > max_levels {
        return Err(LacunarityError::TooManyLevels {
            levels: n_levels,
            max: max_levels,
        });
    }
    let n_levels = n_levels as usize;

    let steps_x = window.width - box_size + 1;
    let steps_y = window.height - box_size + 1;
    let n_positions = steps_x * steps_y;
    let n_samples = n_positions
        .checked_mul(n_levels)
        .ok_or(LacunarityError::AllocationFailed {
            table: "intensity sum",
            len: usize::MAX,
        })?;

    // One row of n_levels sums per gliding box position
    let mut sums: Vec<i64> = try_zeroed("intensity sum", n_samples)?;

    for gy in 0..steps_y {
        for gx in 0..steps_x {
            let position = gy * steps_x + gx;
            let levels = &mut sums[position * n_levels..(position + 1) * n_levels];

            let top = window.y + gy;
            let left = window.x + gx;
            for row in top..top + box_size {
                for col in left..left + box_size {
                    A::accumulate(levels, data[[row, col]], gbox);
                }
            }
        }
    }

    let max_sum = sums.iter().copied().max().unwrap_or(0) as usize;

    let mut density: Vec<f64> = try_zeroed("probability density", max_sum + 1)?;
    for &sum in &sums {
        density[sum as usize] += 1.0;
    }
    let total = n_samples as f64;
    for p in density.iter_mut() {
        *p /= total;
    }

    let mut m1 = 0.0;
    let mut m2 = 0.0;
    for (i, &p) in density.iter().enumerate() {
        let i = i as f64;
        m1 += i * p;
        m2 += i * i * p;
    }

    debug!(
        "Window [{},{}]+{}x{}, box {}: {} levels, {} positions, M={:.6}, M2={:.6}",
        window.x, window.y, window.width, window.height, box_size, n_levels, n_positions, m1, m2
    );

    if m1 == 0.0 {
        return Ok(0.0);
    }
    Ok(m2 / (m1 * m1))
}

/// Like [`lacunarity_in_window`], but applies the options' failure policy to
/// transient allocation failures.
pub fn estimate(
    data: &Array2<i64>,
    box_size: usize,
    window: Window,
    options: &EstimatorOptions,
) -> Result<f64> {
    match lacunarity_in_window(data, options.mode, box_size, window, options.max_levels) {
        Err(err @ LacunarityError::AllocationFailed { .. })
            if options.failure_policy == WindowFailurePolicy::Zero =>
        {
            warn!(
                "{} in window [{},{}]+{}x{}, recording lacunarity 0.0",
                err,
                window.x,
                window.y,
                window.width,
                window.height
            );
            Ok(0.0)
        }
        other => other,
    }
}
