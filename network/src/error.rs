use raster::RasterError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid place {0:?}, expected a comma separated description like \"City, County, State, Country\"")]
    InvalidPlace(String),

    #[error("{0} does not exist")]
    NotFound(PathBuf),

    #[error("{path}: {source}")]
    GeoJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: unrecognized crs member {member}")]
    CrsMember { path: PathBuf, member: String },

    #[error("{path}: expected a FeatureCollection")]
    NotFeatureCollection { path: PathBuf },

    #[error("{path}: feature {index}: {reason}")]
    Feature {
        path: PathBuf,
        index: usize,
        reason: String,
    },

    #[error("{0}")]
    Crs(#[from] RasterError),
}
