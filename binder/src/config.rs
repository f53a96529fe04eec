use raster::Crs;
use std::path::PathBuf;

/// Everything a binding run needs to know up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory containing DEM tiles (`.hgt`, `.tif`).
    pub raster_dir: PathBuf,

    /// Directory node and edge datasets are written to.
    pub output_dir: PathBuf,

    /// Reference tile matching and sampling happen in.
    pub working_crs: Crs,

    /// Reference outputs are reprojected to, if different from
    /// `working_crs`.
    pub output_crs: Option<Crs>,

    /// Keep every loaded tile in memory until the run ends instead of
    /// releasing each one once its nodes are sampled.
    pub retain_tiles: bool,
}

impl Config {
    pub fn new(raster_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            raster_dir,
            output_dir,
            working_crs: Crs::WebMercator,
            output_crs: None,
            retain_tiles: false,
        }
    }

    pub fn working_crs(mut self, crs: Crs) -> Self {
        self.working_crs = crs;
        self
    }

    pub fn output_crs(mut self, crs: Option<Crs>) -> Self {
        self.output_crs = crs;
        self
    }

    pub fn retain_tiles(mut self, retain: bool) -> Self {
        self.retain_tiles = retain;
        self
    }
}
