use geo::{
    geometry::{Coord, LineString},
    MapCoords,
};
use raster::{Crs, C};
use serde_json::Value;

/// Free-form attributes of a node or edge, keyed by column name.
pub type Attributes = serde_json::Map<String, Value>;

/// OpenStreetMap node identifier.
pub type NodeId = i64;

/// Node identifier column.
pub const OSMID: &str = "osmid";
/// Node elevation column.
pub const ELEVATION: &str = "elevation";
/// Edge start node column.
pub const FROM: &str = "from";
/// Edge end node column.
pub const TO: &str = "to";

/// A road network intersection or point.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub osmid: NodeId,

    /// Location in the owning table's coordinate reference.
    pub coord: Coord<C>,

    /// Ground elevation in meters, once bound.
    pub elevation: Option<f64>,

    pub attrs: Attributes,
}

/// A directed road segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub geometry: LineString<C>,
    pub attrs: Attributes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeTable {
    crs: Crs,
    /// Attribute columns, excluding `osmid` and `elevation`.
    columns: Vec<String>,
    nodes: Vec<Node>,
}

impl NodeTable {
    pub fn new(crs: Crs, nodes: Vec<Node>) -> Self {
        let columns = collect_columns(nodes.iter().map(|node| &node.attrs));
        Self {
            crs,
            columns,
            nodes,
        }
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Mutable access to nodes. Coordinates must stay in
    /// [`NodeTable::crs`].
    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns this table with every coordinate expressed in `crs`.
    pub fn to_crs(mut self, crs: Crs) -> Self {
        if crs != self.crs {
            let from = self.crs;
            for node in &mut self.nodes {
                node.coord = from.transform(crs, node.coord);
            }
            self.crs = crs;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeTable {
    crs: Crs,
    /// Attribute columns, excluding `from` and `to`.
    columns: Vec<String>,
    edges: Vec<Edge>,
}

impl EdgeTable {
    /// Returns a table whose schema is derived from `edges`'
    /// attributes.
    pub fn new(crs: Crs, edges: Vec<Edge>) -> Self {
        let columns = collect_columns(edges.iter().map(|edge| &edge.attrs));
        Self::with_columns(crs, columns, edges)
    }

    /// Returns a table with an explicit schema.
    pub fn with_columns(crs: Crs, columns: Vec<String>, edges: Vec<Edge>) -> Self {
        Self {
            crs,
            columns,
            edges,
        }
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns (crs, columns, edges).
    pub fn into_parts(self) -> (Crs, Vec<String>, Vec<Edge>) {
        (self.crs, self.columns, self.edges)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Returns this table with every geometry expressed in `crs`.
    pub fn to_crs(mut self, crs: Crs) -> Self {
        if crs != self.crs {
            let from = self.crs;
            for edge in &mut self.edges {
                edge.geometry = edge.geometry.map_coords(|coord| from.transform(crs, coord));
            }
            self.crs = crs;
        }
        self
    }
}

/// Returns every attribute name in first-seen order.
fn collect_columns<'a>(rows: impl Iterator<Item = &'a Attributes>) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for attrs in rows {
        for name in attrs.keys() {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
    }
    columns
}
