use clap::Parser;
use env_logger::Env;
use log::{info, warn};

use raster_lacunarity::binary::binarize;
use raster_lacunarity::cli::Args;
use raster_lacunarity::error::{LacunarityError, Result};
use raster_lacunarity::{io, scan};

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    if args.three_d && args.binary {
        warn!("--3d is ignored for binary images");
    }

    // Spatial mode needs somewhere to write before any work starts
    let spatial_output = match (args.spatial, args.output.as_deref()) {
        (true, None) => return Err(LacunarityError::MissingOutput),
        (true, Some(path)) => Some(path),
        (false, _) => None,
    };

    let (mut data, metadata) = io::read_band_i64(&args.input, args.band)?;
    info!("Raster size: {}x{}", metadata.width, metadata.height);

    if args.binary {
        info!("Binarizing with threshold {}", args.binary_threshold);
        binarize(&mut data, args.binary_threshold);
    }

    let options = args.estimator_options();
    info!("Level mode: {:?}", options.mode);

    if let Some(output) = spatial_output {
        let result = scan::spatial_scan(
            &data,
            &metadata.geotransform,
            args.gbox,
            args.mwin,
            &options,
            &mut |pct: u32| println!("{}% done.", pct),
        )?;

        println!("Writing lacunarity image to file...");
        io::write_band_f64(
            output,
            &args.format,
            1,
            &result.geotransform,
            &metadata.projection,
            &result.data,
        )?;
    } else {
        let (box_min, box_max, box_step) = args.box_sweep();
        let global = scan::GlobalScan::new(&data, options, box_min, box_max, box_step)?;

        println!("Lacunarity index for {}:", args.input);
        println!("Gliding box size\tLacunarity index");
        for entry in &global {
            let (box_size, lacunarity) = entry?;
            println!("{}\t{:.6}", box_size, lacunarity);
        }
    }

    println!("r.lacunarity done.");
    Ok(())
}
