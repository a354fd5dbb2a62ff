use crate::error::{LacunarityError, Result};
use crate::geotransform::GeoTransform;
use gdal::raster::{Buffer, GdalType};
use gdal::{Dataset, DatasetOptions, DriverManager, GdalOpenFlags};
use log::{debug, info, warn};
use ndarray::Array2;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct RasterMetadata {
    pub width: usize,
    pub height: usize,
    pub band_count: usize,
    pub geotransform: GeoTransform,
    pub projection: String,
}

/// Read the georeference and size of a raster without reading any band
pub fn read_metadata(dataset: &Dataset) -> Result<RasterMetadata> {
    let (width, height) = dataset.raster_size();
    if width == 0 || height == 0 {
        return Err(LacunarityError::InvalidDimensions(width, height));
    }

    let geotransform = match dataset.geo_transform() {
        Ok(gt) => GeoTransform::from_gdal(gt),
        Err(e) => {
            warn!("Raster has no georeference ({}), using pixel coordinates", e);
            GeoTransform::default()
        }
    };

    Ok(RasterMetadata {
        width,
        height,
        band_count: dataset.raster_count(),
        geotransform,
        projection: dataset.projection(),
    })
}

/// Read a whole band (1-based) into a `height x width` array
pub fn read_band<T, P>(path: P, band: usize) -> Result<(Array2<T>, RasterMetadata)>
where
    T: GdalType + Copy,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    info!("Opening input raster: {}", path.display());
    let dataset = Dataset::open(path)?;
    let metadata = read_metadata(&dataset)?;

    if band == 0 || band > metadata.band_count {
        return Err(LacunarityError::InvalidBand {
            band,
            count: metadata.band_count,
        });
    }

    let rasterband = dataset.rasterband(band)?;
    let (width, height) = (metadata.width, metadata.height);
    debug!("Reading band {} ({}x{})", band, width, height);

    let buffer = rasterband.read_as::<T>((0, 0), (width, height), (width, height), None)?;
    let data_vec: Vec<T> = buffer.into_iter().collect();
    let data = Array2::from_shape_vec((height, width), data_vec)?;

    Ok((data, metadata))
}

/// Read a band as Int32 cells widened to `i64`
pub fn read_band_i64<P: AsRef<Path>>(path: P, band: usize) -> Result<(Array2<i64>, RasterMetadata)> {
    let (data, metadata) = read_band::<i32, _>(path, band)?;
    Ok((data.mapv(i64::from), metadata))
}

/// Write `data` as a Float64 band.
///
/// A missing `path` is created with the `format` driver as a one-band raster
/// carrying `geotransform` and `projection`. An existing `path` is opened for
/// update and only the pixels of `band` are overwritten.
pub fn write_band_f64<P: AsRef<Path>>(
    path: P,
    format: &str,
    band: usize,
    geotransform: &GeoTransform,
    projection: &str,
    data: &Array2<f64>,
) -> Result<()> {
    let path = path.as_ref();
    let (height, width) = data.dim();

    let (dataset, band) = if path.exists() {
        info!("Updating band {} of existing raster: {}", band, path.display());
        let dataset = Dataset::open_ex(
            path,
            DatasetOptions {
                open_flags: GdalOpenFlags::GDAL_OF_UPDATE | GdalOpenFlags::GDAL_OF_RASTER,
                ..Default::default()
            },
        )?;

        let count = dataset.raster_count();
        if band == 0 || band > count {
            return Err(LacunarityError::InvalidBand { band, count });
        }
        (dataset, band)
    } else {
        info!("Creating output raster ({}): {}", format, path.display());
        if band != 1 {
            warn!("New rasters have a single band, writing band 1 instead of {}", band);
        }

        let driver = DriverManager::get_driver_by_name(format)
            .map_err(|_| LacunarityError::UnknownDriver(format.to_string()))?;
        let mut dataset = driver.create_with_band_type::<f64, _>(path, width, height, 1)?;

        dataset.set_geo_transform(&geotransform.to_gdal())?;
        if !projection.is_empty() {
            dataset.set_projection(projection)?;
        }
        (dataset, 1)
    };

    let mut raster_band = dataset.rasterband(band)?;

    let (band_width, band_height) = raster_band.size();
    if (band_width, band_height) != (width, height) {
        return Err(LacunarityError::OutputSizeMismatch(
            band_width,
            band_height,
            width,
            height,
        ));
    }

    let values: Vec<f64> = data.iter().copied().collect();
    let mut buffer = Buffer::new((width, height), values);
    raster_band.write((0, 0), (width, height), &mut buffer)?;

    debug!("Wrote {}x{} lacunarity values to band {}", width, height, band);
    Ok(())
}
