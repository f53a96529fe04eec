use geo::geometry::Rect;
use network::{NetworkError, NodeId};
use raster::{Crs, RasterError, C};
use std::{fmt, path::PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BindError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Raster(#[from] RasterError),

    #[error("{0}")]
    Network(#[from] NetworkError),

    #[error("{0} does not exist")]
    NotFound(PathBuf),

    #[error("nodes are in {nodes} but tiles are in {tiles}")]
    CrsMismatch { nodes: Crs, tiles: Crs },

    #[error(
        "{count} node(s) outside every raster tile, spanning x [{}, {}] y [{}, {}]; osmids: {ids}",
        .extent.min().x, .extent.max().x, .extent.min().y, .extent.max().y
    )]
    Coverage {
        count: usize,
        ids: NodeIds,
        extent: Rect<C>,
    },

    #[error("assignment covers a table of {assigned} nodes, got {nodes}")]
    AssignmentMismatch { assigned: usize, nodes: usize },

    #[error("no elevation data for node {osmid} in {tile}")]
    NoData { osmid: NodeId, tile: PathBuf },
}

/// Node identifiers, displayed up to a readable length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIds(pub Vec<NodeId>);

impl NodeIds {
    const MAX_DISPLAYED: usize = 10;
}

impl fmt::Display for NodeIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().take(Self::MAX_DISPLAYED).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{id}")?;
        }
        if self.0.len() > Self::MAX_DISPLAYED {
            write!(f, ", ... ({} more)", self.0.len() - Self::MAX_DISPLAYED)?;
        }
        Ok(())
    }
}
