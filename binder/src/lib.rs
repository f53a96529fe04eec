//! Binds DEM elevation to the nodes and edges of a road network.
//!
//! A run indexes the tiles in a directory, assigns every node to the
//! tile containing it, samples each node's elevation from its tile
//! and finally copies node elevation onto both ends of every edge.

mod config;
mod error;
mod index;
mod join;
mod locate;
mod propagate;
mod run;
mod sample;

pub use crate::{
    config::Config,
    error::{BindError, NodeIds},
    index::TileIndex,
    join::{narrow_join, ElevationLookup, Endpoint, FROM_ELEV, TO_ELEV},
    locate::{assign, locate, Assignment},
    propagate::{cast_float, propagate},
    run::{export, run, Binder, Outputs},
    sample::{Sampler, TileCache},
};
