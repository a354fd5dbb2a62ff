//! Affine georeference of a raster.

/// Affine coefficients mapping pixel coordinates to georeferenced ones:
/// ```text
/// x = origin_x + px * pixel_width + py * row_rotation
/// y = origin_y + px * col_rotation + py * pixel_height
/// ```
/// Pixel `(0, 0)` is the upper-left corner of the first cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub row_rotation: f64,
    pub origin_y: f64,
    pub col_rotation: f64,
    pub pixel_height: f64,
}

impl Default for GeoTransform {
    /// GDAL's default for rasters without a georeference.
    fn default() -> Self {
        Self::from_gdal([0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
    }
}

impl GeoTransform {
    /// Build from GDAL order `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`
    pub fn from_gdal(coeffs: [f64; 6]) -> Self {
        Self {
            origin_x: coeffs[0],
            pixel_width: coeffs[1],
            row_rotation: coeffs[2],
            origin_y: coeffs[3],
            col_rotation: coeffs[4],
            pixel_height: coeffs[5],
        }
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rotation,
            self.origin_y,
            self.col_rotation,
            self.pixel_height,
        ]
    }

    /// Georeferenced position of fractional pixel coordinates
    pub fn pixel_to_geo(&self, px: f64, py: f64) -> (f64, f64) {
        let x = self.origin_x + px * self.pixel_width + py * self.row_rotation;
        let y = self.origin_y + px * self.col_rotation + py * self.pixel_height;
        (x, y)
    }

    /// Inverse of [`pixel_to_geo`](Self::pixel_to_geo).
    ///
    /// Returns `(NaN, NaN)` when the transform is singular.
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let det = self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation;
        if det == 0.0 {
            return (f64::NAN, f64::NAN);
        }

        let dx = x - self.origin_x;
        let dy = y - self.origin_y;

        let px = (self.pixel_height * dx - self.row_rotation * dy) / det;
        let py = (self.pixel_width * dy - self.col_rotation * dx) / det;
        (px, py)
    }

    /// Bounding box `[min_x, min_y, max_x, max_y]` of a `width x height` raster
    pub fn bbox(&self, width: usize, height: usize) -> [f64; 4] {
        let (w, h) = (width as f64, height as f64);
        let corners = [
            self.pixel_to_geo(0.0, 0.0),
            self.pixel_to_geo(0.0, h),
            self.pixel_to_geo(w, h),
            self.pixel_to_geo(w, 0.0),
        ];

        let mut bbox = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
        for (x, y) in corners {
            bbox[0] = bbox[0].min(x);
            bbox[1] = bbox[1].min(y);
            bbox[2] = bbox[2].max(x);
            bbox[3] = bbox[3].max(y);
        }
        bbox
    }

    /// Same transform with its origin moved to pixel `(dx, dy)`
    pub fn shifted(&self, dx: usize, dy: usize) -> Self {
        let (origin_x, origin_y) = self.pixel_to_geo(dx as f64, dy as f64);
        Self {
            origin_x,
            origin_y,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn north_up() -> GeoTransform {
        GeoTransform::from_gdal([2_500_000.0, 25.0, 0.0, 1_200_000.0, 0.0, -25.0])
    }

    #[test]
    fn test_gdal_order_roundtrip() {
        let coeffs = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert_eq!(GeoTransform::from_gdal(coeffs).to_gdal(), coeffs);
    }

    #[test]
    fn test_pixel_to_geo_north_up() {
        let gt = north_up();
        let (x, y) = gt.pixel_to_geo(4.0, 2.0);
        assert!((x - 2_500_100.0).abs() < 1e-9);
        assert!((y - 1_199_950.0).abs() < 1e-9);
    }

    #[test]
    fn test_geo_to_pixel_inverts_rotated_transform() {
        let gt = GeoTransform::from_gdal([100.0, 2.0, 0.5, 300.0, -0.25, -3.0]);
        let (x, y) = gt.pixel_to_geo(7.5, 3.25);
        let (px, py) = gt.geo_to_pixel(x, y);
        assert!((px - 7.5).abs() < 1e-9);
        assert!((py - 3.25).abs() < 1e-9);
    }

    #[test]
    fn test_geo_to_pixel_singular() {
        let gt = GeoTransform::from_gdal([0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let (px, py) = gt.geo_to_pixel(1.0, 1.0);
        assert!(px.is_nan() && py.is_nan());
    }

    #[test]
    fn test_bbox_north_up() {
        let bbox = north_up().bbox(10, 4);
        assert_eq!(bbox, [2_500_000.0, 1_199_900.0, 2_500_250.0, 1_200_000.0]);
    }

    #[test]
    fn test_shift_moves_origin_only() {
        let shifted = north_up().shifted(4, 4);
        assert!((shifted.origin_x - 2_500_100.0).abs() < 1e-9);
        assert!((shifted.origin_y - 1_199_900.0).abs() < 1e-9);
        assert_eq!(shifted.pixel_width, 25.0);
        assert_eq!(shifted.pixel_height, -25.0);
    }
}
