use crate::{error::NodeIds, BindError, TileIndex};
use geo::{geometry::MultiPoint, BoundingRect};
use log::{debug, info};
use network::{Node, NodeTable};
use raster::C;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Which tile every node samples from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    /// Tile path to indices (into the node table) of its nodes.
    tiles: BTreeMap<PathBuf, Vec<usize>>,

    /// Length of the node table this assignment indexes into.
    table_len: usize,
}

impl Assignment {
    /// Iterates (tile, node indices) in tile path order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &[usize])> + '_ {
        self.tiles
            .iter()
            .map(|(path, nodes)| (path.as_path(), nodes.as_slice()))
    }

    /// Number of distinct tiles referenced.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Number of assigned nodes.
    pub fn node_count(&self) -> usize {
        self.tiles.values().map(Vec::len).sum()
    }

    /// Number of nodes in the table this was built from.
    pub fn table_len(&self) -> usize {
        self.table_len
    }
}

/// Matches every node to a tile.
///
/// Returns the assignment of matched nodes and the indices (into
/// `nodes`) of nodes no tile contains.
pub fn assign(nodes: &NodeTable, index: &TileIndex) -> Result<(Assignment, Vec<usize>), BindError> {
    if nodes.crs() != index.crs() {
        return Err(BindError::CrsMismatch {
            nodes: nodes.crs(),
            tiles: index.crs(),
        });
    }
    let mut assignment = Assignment {
        tiles: BTreeMap::new(),
        table_len: nodes.len(),
    };
    let mut unresolved = Vec::new();
    for (node_idx, node) in nodes.nodes().iter().enumerate() {
        match index.lookup(node.coord) {
            Some(tile) => assignment
                .tiles
                .entry(tile.to_owned())
                .or_default()
                .push(node_idx),
            None => unresolved.push(node_idx),
        }
    }
    debug!(
        "{} nodes assigned to {} tiles, {} unresolved",
        assignment.node_count(),
        assignment.tile_count(),
        unresolved.len()
    );
    Ok((assignment, unresolved))
}

/// Like [assign], but fails unless every node has a tile.
pub fn locate(nodes: &NodeTable, index: &TileIndex) -> Result<Assignment, BindError> {
    let (assignment, unresolved) = assign(nodes, index)?;
    let unresolved: Vec<&Node> = unresolved.into_iter().map(|idx| &nodes.nodes()[idx]).collect();
    let outside: MultiPoint<C> = unresolved.iter().map(|node| node.coord).collect();
    let Some(extent) = outside.bounding_rect() else {
        info!(
            "located {} nodes in {} tiles",
            assignment.node_count(),
            assignment.tile_count()
        );
        return Ok(assignment);
    };
    Err(BindError::Coverage {
        count: unresolved.len(),
        ids: NodeIds(unresolved.iter().map(|node| node.osmid).collect()),
        extent,
    })
}
