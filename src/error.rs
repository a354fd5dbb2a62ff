use thiserror::Error;

#[derive(Error, Debug)]
pub enum LacunarityError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Array shape error: {0}")]
    ShapeError(#[from] ndarray::ShapeError),

    #[error("Input raster has invalid dimensions: {0}x{1}")]
    InvalidDimensions(usize, usize),

    #[error("Invalid band index: {band} (raster has {count} bands)")]
    InvalidBand { band: usize, count: usize },

    #[error("Invalid gliding box size: {box_size} (window is {width}x{height})")]
    InvalidBoxSize {
        box_size: usize,
        width: usize,
        height: usize,
    },

    #[error("Invalid gliding box step: {0} (must be positive)")]
    InvalidBoxStep(usize),

    #[error("Window [{x},{y}]+{width}x{height} exceeds raster of {raster_width}x{raster_height}")]
    WindowOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        raster_width: usize,
        raster_height: usize,
    },

    #[error("Moving window of {window} cells does not fit a {width}x{height} raster")]
    WindowTooLarge {
        window: usize,
        width: usize,
        height: usize,
    },

    #[error("Window needs {levels} levels, above the limit of {max}")]
    TooManyLevels { levels: u64, max: u64 },

    #[error("Not enough memory for the {table} table ({len} entries)")]
    AllocationFailed { table: &'static str, len: usize },

    #[error("No driver found for raster format {0}")]
    UnknownDriver(String),

    #[error("Existing output band is {0}x{1}, lacunarity raster is {2}x{3}")]
    OutputSizeMismatch(usize, usize, usize, usize),

    #[error("Spatial mode requires an output raster path (--output)")]
    MissingOutput,
}

pub type Result<T> = std::result::Result<T, LacunarityError>;
