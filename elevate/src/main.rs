mod options;
mod plot;

use anyhow::Error as AnyError;
use binder::Config;
use clap::Parser;
use network::{GeoJsonDir, Place};
use options::{Cli, Command as CliCmd};
use serde::Serialize;

fn main() -> Result<(), AnyError> {
    env_logger::init();
    let Cli { cmd } = Cli::parse();

    match cmd {
        CliCmd::Bind {
            place,
            networks,
            rasters,
            out,
            working_crs,
            output_crs,
            retain_tiles,
        } => {
            let place = Place::parse(&place)?;
            let source = GeoJsonDir::new(networks)?;
            let config = Config::new(rasters, out)
                .working_crs(working_crs)
                .output_crs(output_crs)
                .retain_tiles(retain_tiles);
            let outputs = binder::run(config, &source, &place)?;
            summary(&place, &outputs)
        }
        CliCmd::Plot {
            edges,
            column,
            out,
            width,
            height,
        } => {
            plot::plot(&edges, &column, &out, (width, height))?;
            println!("{}", out.display());
            Ok(())
        }
    }
}

/// Prints what a bind run wrote as JSON on stdout.
fn summary(place: &Place, outputs: &binder::Outputs) -> Result<(), AnyError> {
    #[derive(Serialize)]
    struct Summary<'a> {
        place: String,
        outputs: &'a binder::Outputs,
    }

    let json = serde_json::to_string(&Summary {
        place: place.to_string(),
        outputs,
    })?;
    println!("{json}");
    Ok(())
}
