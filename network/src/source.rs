use crate::{io, EdgeTable, NetworkError, NodeTable, Place};
use log::info;
use std::path::PathBuf;

/// A road network: node and edge tables in the same reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    pub nodes: NodeTable,
    pub edges: EdgeTable,
}

/// Something that can produce the road network for a place.
pub trait NetworkSource {
    fn fetch(&self, place: &Place) -> Result<Network, NetworkError>;
}

/// An already acquired network serves itself for any place.
impl NetworkSource for Network {
    fn fetch(&self, _place: &Place) -> Result<Network, NetworkError> {
        Ok(self.clone())
    }
}

/// Networks previously extracted to disk, one directory per place:
///
/// ```text
/// <root>/<place name>/nodes.geojson
/// <root>/<place name>/edges.geojson
/// ```
///
/// where `<place name>` is the first component of the place
/// description (e.g. `Madison` for `"Madison, Dane County, Wisconsin,
/// USA"`).
#[derive(Debug, Clone)]
pub struct GeoJsonDir {
    root: PathBuf,
}

impl GeoJsonDir {
    pub const NODES: &'static str = "nodes.geojson";
    pub const EDGES: &'static str = "edges.geojson";

    pub fn new(root: PathBuf) -> Result<Self, NetworkError> {
        if root.is_dir() {
            Ok(Self { root })
        } else {
            Err(NetworkError::NotFound(root))
        }
    }

    /// Returns the directory holding `place`'s network.
    pub fn place_dir(&self, place: &Place) -> PathBuf {
        self.root.join(place.name())
    }
}

impl NetworkSource for GeoJsonDir {
    fn fetch(&self, place: &Place) -> Result<Network, NetworkError> {
        let dir = self.place_dir(place);
        if !dir.is_dir() {
            return Err(NetworkError::NotFound(dir));
        }
        let nodes = io::read_nodes(dir.join(Self::NODES))?;
        let edges = io::read_edges(dir.join(Self::EDGES))?;
        // Edges are only meaningful in the nodes' reference.
        let edges = edges.to_crs(nodes.crs());
        info!(
            "{place}: {} nodes, {} edges in {}",
            nodes.len(),
            edges.len(),
            nodes.crs()
        );
        Ok(Network { nodes, edges })
    }
}

#[cfg(test)]
mod tests {
    use super::{GeoJsonDir, Network, NetworkSource};
    use crate::{
        io,
        table::{Attributes, Edge, EdgeTable, Node, NodeTable},
        NetworkError, Place,
    };
    use geo::geometry::{Coord, LineString};
    use raster::Crs;

    fn network() -> Network {
        let node = |osmid, x, y| Node {
            osmid,
            coord: Coord { x, y },
            elevation: None,
            attrs: Attributes::new(),
        };
        Network {
            nodes: NodeTable::new(Crs::Wgs84, vec![node(1, -89.40, 43.07), node(2, -89.39, 43.08)]),
            edges: EdgeTable::new(
                Crs::Wgs84,
                vec![Edge {
                    from: 1,
                    to: 2,
                    geometry: LineString::from(vec![(-89.40, 43.07), (-89.39, 43.08)]),
                    attrs: Attributes::new(),
                }],
            ),
        }
    }

    #[test]
    fn test_fetch_from_dir() {
        let root = tempfile::tempdir().unwrap();
        let expected = network();
        let dir = root.path().join("Madison");
        std::fs::create_dir(&dir).unwrap();
        io::write_nodes(&expected.nodes, dir.join(GeoJsonDir::NODES)).unwrap();
        io::write_edges(&expected.edges, dir.join(GeoJsonDir::EDGES)).unwrap();

        let source = GeoJsonDir::new(root.path().to_owned()).unwrap();
        let place = Place::parse("Madison, Dane County, Wisconsin, USA").unwrap();
        assert_eq!(source.fetch(&place).unwrap(), expected);
    }

    #[test]
    fn test_unknown_place() {
        let root = tempfile::tempdir().unwrap();
        let source = GeoJsonDir::new(root.path().to_owned()).unwrap();
        let place = Place::parse("Atlantis, Ocean").unwrap();
        assert!(matches!(source.fetch(&place), Err(NetworkError::NotFound(_))));
    }

    #[test]
    fn test_missing_root() {
        let root = tempfile::tempdir().unwrap();
        assert!(GeoJsonDir::new(root.path().join("missing")).is_err());
    }

    #[test]
    fn test_network_is_its_own_source() {
        let network = network();
        let place = Place::parse("Anywhere").unwrap();
        assert_eq!(network.fetch(&place).unwrap(), network);
    }
}
