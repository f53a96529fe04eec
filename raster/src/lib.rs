//! Elevation raster tiles.
//!
//! Tiles are read from SRTM/NASADEM `.hgt` files or single band
//! GeoTIFFs into a [Grid], which answers nearest-cell queries and can
//! be resampled into another [Crs].

mod crs;
mod error;
pub mod geotiff;
mod grid;
pub mod hgt;

pub use crate::{
    crs::{Crs, MAX_MERCATOR_LAT},
    error::RasterError,
    grid::Grid,
};
pub use geo;
use geo::geometry::Rect;
use std::{ffi::OsStr, path::Path};

/// Base floating point type used for all coordinates.
pub type C = f64;

/// Raster file formats this crate can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Hgt,
    GeoTiff,
}

impl Format {
    /// Returns the format implied by `path`'s extension, if any.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension().and_then(OsStr::to_str)?;
        if ext.eq_ignore_ascii_case("hgt") {
            Some(Self::Hgt)
        } else if ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff") {
            Some(Self::GeoTiff)
        } else {
            None
        }
    }
}

/// Returns the coordinate reference and extent of the raster at
/// `path`, reading metadata only.
pub fn read_extent<P: AsRef<Path>>(path: P) -> Result<(Crs, Rect<C>), RasterError> {
    let path = path.as_ref();
    match Format::from_path(path) {
        Some(Format::Hgt) => hgt::read_extent(path),
        Some(Format::GeoTiff) => geotiff::read_extent(path),
        None => Err(RasterError::Format(path.to_owned())),
    }
}

/// Reads the raster at `path` into memory.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Grid, RasterError> {
    let path = path.as_ref();
    match Format::from_path(path) {
        Some(Format::Hgt) => hgt::load(path),
        Some(Format::GeoTiff) => geotiff::load(path),
        None => Err(RasterError::Format(path.to_owned())),
    }
}
