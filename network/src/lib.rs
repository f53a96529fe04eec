//! Road network tables and the services that acquire and persist them.

mod error;
pub mod io;
mod place;
mod source;
mod table;

pub use crate::{
    error::NetworkError,
    place::Place,
    source::{GeoJsonDir, Network, NetworkSource},
    table::{
        Attributes, Edge, EdgeTable, Node, NodeId, NodeTable, ELEVATION, FROM, OSMID, TO,
    },
};
