use crate::estimator::{EstimatorOptions, LevelMode, WindowFailurePolicy, DEFAULT_MAX_LEVELS};
use clap::{Parser, ValueEnum};

const DEFAULT_GBOX_MIN: usize = 3;
const DEFAULT_GBOX_MAX: usize = 30;

#[derive(Parser, Debug)]
#[command(name = "lacunarity")]
#[command(about = "Compute the gliding-box lacunarity index of a GDAL-compatible raster")]
#[command(version)]
pub struct Args {
    /// Input raster path
    #[arg(short, long, value_name = "FILE")]
    pub input: String,

    /// Input band (1-based)
    #[arg(short, long, default_value_t = 1)]
    pub band: usize,

    /// Treat the input as a binary image (see --binary-threshold)
    #[arg(long)]
    pub binary: bool,

    /// Cells >= threshold become 1, others 0; ignored without --binary
    #[arg(long, alias = "binaryThreshold", default_value_t = 1, allow_negative_numbers = true)]
    pub binary_threshold: i64,

    /// Use the true 3D gliding box instead of the layered one; --binary takes precedence
    #[arg(long = "3d")]
    pub three_d: bool,

    /// Produce a lacunarity raster with a moving window (requires --output)
    #[arg(short, long)]
    pub spatial: bool,

    /// Moving window size for --spatial
    #[arg(short, long, default_value_t = 5)]
    pub mwin: usize,

    /// Gliding box size
    #[arg(short, long, default_value_t = 3)]
    pub gbox: usize,

    /// Smallest gliding box of a sweep (global mode only)
    #[arg(long, alias = "gboxMin")]
    pub gbox_min: Option<usize>,

    /// Largest gliding box of a sweep (global mode only)
    #[arg(long, alias = "gboxMax")]
    pub gbox_max: Option<usize>,

    /// Gliding box increment of a sweep
    #[arg(long, alias = "gboxStep", default_value_t = 1)]
    pub gbox_step: usize,

    /// Output raster path for --spatial
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<String>,

    /// GDAL driver of the output raster (GTiff, HFA, AAIGrid, ENVI, ...)
    #[arg(short, long, default_value = "HFA")]
    pub format: String,

    /// Reject windows needing more intensity levels than this
    #[arg(long, default_value_t = DEFAULT_MAX_LEVELS)]
    pub max_levels: u64,

    /// What to do when a window's working tables cannot be allocated
    #[arg(long, value_enum, default_value_t = AllocFailure::Fail)]
    pub on_window_alloc_failure: AllocFailure,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocFailure {
    /// Abort the scan
    Fail,
    /// Record 0.0 for the window and continue
    Zero,
}

impl Args {
    /// Gliding box sweep `(min, max, step)` for the global scan
    pub fn box_sweep(&self) -> (usize, usize, usize) {
        if self.gbox_min.is_none() && self.gbox_max.is_none() {
            return (self.gbox, self.gbox, 1);
        }
        (
            self.gbox_min.unwrap_or(DEFAULT_GBOX_MIN),
            self.gbox_max.unwrap_or(DEFAULT_GBOX_MAX),
            self.gbox_step,
        )
    }

    pub fn level_mode(&self) -> LevelMode {
        if self.three_d && !self.binary {
            LevelMode::Volumetric
        } else {
            LevelMode::Layered
        }
    }

    pub fn estimator_options(&self) -> EstimatorOptions {
        EstimatorOptions {
            mode: self.level_mode(),
            max_levels: self.max_levels,
            failure_policy: match self.on_window_alloc_failure {
                AllocFailure::Fail => WindowFailurePolicy::Fail,
                AllocFailure::Zero => WindowFailurePolicy::Zero,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("lacunarity").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["-i", "in.tif"]);
        assert_eq!(args.band, 1);
        assert_eq!(args.mwin, 5);
        assert_eq!(args.gbox, 3);
        assert_eq!(args.binary_threshold, 1);
        assert_eq!(args.format, "HFA");
        assert!(!args.spatial);
        assert_eq!(args.box_sweep(), (3, 3, 1));
        assert_eq!(args.level_mode(), LevelMode::Layered);
    }

    #[test]
    fn test_missing_input_is_usage_error() {
        assert!(Args::try_parse_from(["lacunarity", "--gbox", "4"]).is_err());
    }

    #[test]
    fn test_single_gbox_ignores_step() {
        let args = parse(&["-i", "in.tif", "-g", "7", "--gbox-step", "2"]);
        assert_eq!(args.box_sweep(), (7, 7, 1));
    }

    #[test]
    fn test_sweep_fills_missing_bound() {
        let args = parse(&["-i", "in.tif", "--gbox-max", "12", "--gbox-step", "3"]);
        assert_eq!(args.box_sweep(), (3, 12, 3));

        let args = parse(&["-i", "in.tif", "--gboxMin", "10"]);
        assert_eq!(args.box_sweep(), (10, 30, 1));
    }

    #[test]
    fn test_binary_takes_precedence_over_3d() {
        let args = parse(&["-i", "in.tif", "--3d"]);
        assert_eq!(args.level_mode(), LevelMode::Volumetric);

        let args = parse(&["-i", "in.tif", "--3d", "--binary"]);
        assert_eq!(args.level_mode(), LevelMode::Layered);
    }

    #[test]
    fn test_negative_threshold_and_policy() {
        let args = parse(&[
            "-i",
            "in.tif",
            "--binary-threshold",
            "-3",
            "--on-window-alloc-failure",
            "zero",
        ]);
        assert_eq!(args.binary_threshold, -3);
        assert_eq!(
            args.estimator_options().failure_policy,
            WindowFailurePolicy::Zero
        );
    }
}
