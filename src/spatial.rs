//! Georeferencing of the raster grid.

/// Placement of the raster in its spatial reference system.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialInfo {
    /// X coordinate of the top-left corner.
    pub tl_x: f64,
    /// Y coordinate of the top-left corner.
    pub tl_y: f64,
    /// Pixel width.
    pub x_res: f32,
    /// Pixel height, usually negative.
    pub y_res: f32,
    /// Row rotation term.
    pub x_rot: f32,
    /// Column rotation term.
    pub y_rot: f32,
    /// Raster width in pixels.
    pub x_size: u64,
    /// Raster height in pixels.
    pub y_size: u64,
    /// Spatial reference string; stored and returned verbatim.
    pub wkt: String,
}

impl Default for SpatialInfo {
    fn default() -> Self {
        Self {
            tl_x: 0.0,
            tl_y: 0.0,
            x_res: 1.0,
            y_res: -1.0,
            x_rot: 0.0,
            y_rot: 0.0,
            x_size: 0,
            y_size: 0,
            wkt: String::new(),
        }
    }
}

impl SpatialInfo {
    /// Affine transform from pixel (column, row) to map coordinates.
    pub fn transform(&self) -> AffineTransform {
        AffineTransform::new(
            self.x_res as f64,
            self.x_rot as f64,
            self.tl_x,
            self.y_rot as f64,
            self.y_res as f64,
            self.tl_y,
        )
    }

    /// Replace corner, resolution and rotation from `transform`.
    pub fn set_transform(&mut self, transform: &AffineTransform) {
        self.tl_x = transform.c();
        self.tl_y = transform.f();
        self.x_res = transform.a() as f32;
        self.y_res = transform.e() as f32;
        self.x_rot = transform.b() as f32;
        self.y_rot = transform.d() as f32;
    }
}

/// Affine transformation values.
///
/// `x = a * col + b * row + c` and `y = d * col + e * row + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform(f64, f64, f64, f64, f64, f64);

impl AffineTransform {
    /// Construct from the six coefficients.
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self(a, b, c, d, e, f)
    }

    /// Construct from a GDAL-ordered geotransform
    /// `[tl_x, x_res, x_rot, tl_y, y_rot, y_res]`.
    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self(gt[1], gt[2], gt[0], gt[4], gt[5], gt[3])
    }

    /// GDAL-ordered geotransform.
    pub fn to_gdal(&self) -> [f64; 6] {
        [self.2, self.0, self.1, self.5, self.3, self.4]
    }

    #[allow(missing_docs)]
    pub fn a(&self) -> f64 {
        self.0
    }

    #[allow(missing_docs)]
    pub fn b(&self) -> f64 {
        self.1
    }

    #[allow(missing_docs)]
    pub fn c(&self) -> f64 {
        self.2
    }

    #[allow(missing_docs)]
    pub fn d(&self) -> f64 {
        self.3
    }

    #[allow(missing_docs)]
    pub fn e(&self) -> f64 {
        self.4
    }

    #[allow(missing_docs)]
    pub fn f(&self) -> f64 {
        self.5
    }

    /// Map coordinates of the pixel corner at (`col`, `row`).
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.0 * col + self.1 * row + self.2,
            self.3 * col + self.4 * row + self.5,
        )
    }
}
