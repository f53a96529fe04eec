//! Narrow left join of node elevation onto edges.
//!
//! A general purpose join would pull every node column into the edge
//! table and need suffix cleanup afterwards. Here only the node
//! elevation crosses over, stored under a column named after the edge
//! endpoint, so the edge schema is never renamed.

use log::warn;
use network::{io::float, Edge, EdgeTable, NodeId, NodeTable};
use std::collections::HashMap;

/// Edge column holding the elevation of the start node.
pub const FROM_ELEV: &str = "from_elev";
/// Edge column holding the elevation of the end node.
pub const TO_ELEV: &str = "to_elev";

/// Which end of an edge to join on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    From,
    To,
}

impl Endpoint {
    /// Returns the column this endpoint's elevation is stored in.
    pub fn column(self) -> &'static str {
        match self {
            Self::From => FROM_ELEV,
            Self::To => TO_ELEV,
        }
    }

    /// Returns the node `edge` references at this endpoint.
    pub fn key(self, edge: &Edge) -> NodeId {
        match self {
            Self::From => edge.from,
            Self::To => edge.to,
        }
    }
}

/// Node identifier to (possibly absent) elevation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElevationLookup(HashMap<NodeId, Option<f64>>);

impl ElevationLookup {
    pub fn new(nodes: &NodeTable) -> Self {
        Self(
            nodes
                .nodes()
                .iter()
                .map(|node| (node.osmid, node.elevation))
                .collect(),
        )
    }

    /// `None` if no node has identifier `osmid`, `Some(None)` if it
    /// exists without elevation.
    pub fn get(&self, osmid: NodeId) -> Option<Option<f64>> {
        self.0.get(&osmid).copied()
    }
}

/// Returns `edges` with `endpoint`'s node elevation added.
///
/// Every edge is kept. Edges whose endpoint has no matching node get
/// a null elevation. An existing column with the same name is
/// overwritten in place.
pub fn narrow_join(edges: &EdgeTable, endpoint: Endpoint, nodes: &ElevationLookup) -> EdgeTable {
    let column = endpoint.column();
    let mut dangling = 0_usize;
    let joined = edges
        .edges()
        .iter()
        .map(|edge| {
            let elevation = nodes.get(endpoint.key(edge)).unwrap_or_else(|| {
                dangling += 1;
                None
            });
            let mut edge = edge.clone();
            edge.attrs.insert(column.to_owned(), float(elevation));
            edge
        })
        .collect();
    if dangling > 0 {
        warn!("{dangling} edges reference a missing {column} node");
    }

    let mut columns = edges.columns().to_vec();
    if !edges.has_column(column) {
        columns.push(column.to_owned());
    }
    EdgeTable::with_columns(edges.crs(), columns, joined)
}
