use clap::{Parser, Subcommand};
use raster::Crs;
use std::path::PathBuf;

/// Bind DEM elevation to road networks.
#[derive(Parser, Debug)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Bind elevation to a place's nodes and edges.
    Bind {
        /// Place "City, County, State, Country".
        place: String,

        /// Directory containing one network dataset directory per
        /// place.
        #[arg(short, long)]
        networks: PathBuf,

        /// Directory containing DEM tiles (.hgt, .tif).
        #[arg(short, long)]
        rasters: PathBuf,

        /// Directory to write nodes.geojson and edges.geojson to.
        #[arg(short, long)]
        out: PathBuf,

        /// Reference tiles are matched and sampled in.
        #[arg(long, default_value = "EPSG:3857")]
        working_crs: Crs,

        /// Reference to write outputs in, e.g. "EPSG:4326".
        #[arg(long)]
        output_crs: Option<Crs>,

        /// Keep tiles in memory for the whole run.
        #[arg(long)]
        retain_tiles: bool,
    },

    /// Render exported edges as a PNG coloured by a numeric column.
    Plot {
        /// Exported edges.geojson.
        edges: PathBuf,

        /// Edge column to colour by.
        #[arg(short, long, default_value = "from_elev")]
        column: String,

        /// PNG file path.
        #[arg(short, long)]
        out: PathBuf,

        #[arg(long, default_value_t = 1024)]
        width: u32,

        #[arg(long, default_value_t = 1024)]
        height: u32,
    },
}
