use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("tiff error in {1}: {0}")]
    Tiff(#[source] tiff::TiffError, PathBuf),

    #[error("invalid HGT name {0}")]
    HgtName(PathBuf),

    #[error("invalid HGT file len {0} for {1}")]
    HgtLen(u64, PathBuf),

    #[error("missing georeferencing tags in {0}")]
    Georeference(PathBuf),

    #[error("unsupported coordinate reference EPSG:{0}")]
    UnsupportedCrs(u32),

    #[error("unrecognized coordinate reference {0:?}, expected an EPSG code like \"EPSG:3857\"")]
    CrsName(String),

    #[error("unrecognized raster format {0}")]
    Format(PathBuf),

    #[error("grid has {len} samples, expected {cols}x{rows}")]
    Dimensions { len: usize, cols: usize, rows: usize },
}
