use crate::{locate, propagate, BindError, Config, Sampler, TileIndex};
use log::info;
use network::{io, GeoJsonDir, Network, NetworkSource, Place};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Files written by a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outputs {
    pub nodes: PathBuf,
    pub edges: PathBuf,
}

/// Runs every binding stage for one configuration.
#[derive(Debug, Clone)]
pub struct Binder {
    config: Config,
}

impl Binder {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns `network` with elevation on every node and on both ends
    /// of every edge.
    ///
    /// Fails without a partial result if any node lies outside every
    /// tile or lands on a no-data cell.
    pub fn bind(&self, network: Network) -> Result<Network, BindError> {
        let crs = self.config.working_crs;
        let mut nodes = network.nodes.to_crs(crs);
        let edges = network.edges.to_crs(crs);

        let index = TileIndex::build(&self.config.raster_dir, crs)?;
        let assignment = locate(&nodes, &index)?;
        Sampler::new(crs, self.config.retain_tiles).sample(&mut nodes, &assignment)?;
        let edges = propagate(&edges, &nodes);

        Ok(match self.config.output_crs {
            Some(out) if out != crs => Network {
                nodes: nodes.to_crs(out),
                edges: edges.to_crs(out),
            },
            _ => Network { nodes, edges },
        })
    }

    /// Acquires `place`'s network from `source`, binds it and writes
    /// the result to the configured output directory.
    pub fn run<S: NetworkSource + ?Sized>(&self, source: &S, place: &Place) -> Result<Outputs, BindError> {
        let network = source.fetch(place)?;
        let bound = self.bind(network)?;
        let outputs = export(&bound, &self.config.output_dir)?;
        info!("{place}: wrote {:?} and {:?}", outputs.nodes, outputs.edges);
        Ok(outputs)
    }
}

/// Binds `place`'s network from `source` with `config`.
pub fn run<S: NetworkSource + ?Sized>(config: Config, source: &S, place: &Place) -> Result<Outputs, BindError> {
    Binder::new(config).run(source, place)
}

/// Writes `network` to `dir`, creating it if needed.
///
/// Both files are written under temporary names first and only moved
/// into place once both writes succeed.
pub fn export(network: &Network, dir: &Path) -> Result<Outputs, BindError> {
    std::fs::create_dir_all(dir)?;
    let outputs = Outputs {
        nodes: dir.join(GeoJsonDir::NODES),
        edges: dir.join(GeoJsonDir::EDGES),
    };
    let (nodes_tmp, edges_tmp) = (tmp_path(&outputs.nodes), tmp_path(&outputs.edges));

    let written = io::write_nodes(&network.nodes, &nodes_tmp)
        .and_then(|()| io::write_edges(&network.edges, &edges_tmp));
    if let Err(e) = written {
        for tmp in [&nodes_tmp, &edges_tmp] {
            if tmp.is_file() {
                let _ = std::fs::remove_file(tmp);
            }
        }
        return Err(e.into());
    }

    std::fs::rename(&nodes_tmp, &outputs.nodes)?;
    std::fs::rename(&edges_tmp, &outputs.edges)?;
    Ok(outputs)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_owned();
    tmp.set_extension("geojson.tmp");
    tmp
}

#[cfg(test)]
mod tests {
    use super::{export, run, Binder};
    use crate::{fixtures, BindError, Config, FROM_ELEV, TO_ELEV};
    use approx::assert_relative_eq;
    use network::{io, EdgeTable, GeoJsonDir, Network, NodeTable, Place};
    use raster::Crs;
    use serde_json::json;
    use std::path::Path;

    /// Two adjacent tiles: `a.tif` covers [-90, -89] x [43, 44] with
    /// values from 100, `b.tif` covers [-89, -88] x [43, 44] with
    /// values from 200.
    fn tiles(dir: &Path) {
        fixtures::write_tile(dir, "a.tif", -90.0, 43.0, 100.0);
        fixtures::write_tile(dir, "b.tif", -89.0, 43.0, 200.0);
    }

    fn network(with_outside_node: bool) -> Network {
        let mut nodes = vec![
            // Cell (col 2, row 3) of a.tif.
            fixtures::node(1, -89.75, 43.65),
            // Cell (col 7, row 1) of b.tif.
            fixtures::node(2, -88.25, 43.85),
        ];
        let mut edges = vec![fixtures::edge(1, 2, json!({"name": "Johnson St", "lanes": 2}))];
        if with_outside_node {
            nodes.push(fixtures::node(3, -85.5, 42.5));
            edges.push(fixtures::edge(2, 3, json!({"name": "Gorham St", "lanes": 1})));
        }
        Network {
            nodes: NodeTable::new(Crs::Wgs84, nodes),
            edges: EdgeTable::new(Crs::Wgs84, edges),
        }
    }

    #[test]
    fn test_outside_node_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let rasters = dir.path().join("dem");
        std::fs::create_dir(&rasters).unwrap();
        tiles(&rasters);
        let out = dir.path().join("out");

        let place = Place::parse("Madison, Dane County, Wisconsin, USA").unwrap();
        let result = run(Config::new(rasters, out.clone()), &network(true), &place);
        match result {
            Err(BindError::Coverage { count, ids, .. }) => {
                assert_eq!(count, 1);
                assert_eq!(ids.0, vec![3]);
            }
            other => panic!("expected coverage error, got {other:?}"),
        }
        assert!(!out.join(GeoJsonDir::NODES).exists());
        assert!(!out.join(GeoJsonDir::EDGES).exists());
    }

    #[test]
    fn test_bind_two_tiles() {
        let dir = tempfile::tempdir().unwrap();
        tiles(dir.path());
        let config = Config::new(dir.path().to_owned(), dir.path().join("out"));
        let bound = Binder::new(config).bind(network(false)).unwrap();

        assert_eq!(bound.nodes.crs(), Crs::WebMercator);
        let elevations: Vec<_> = bound.nodes.nodes().iter().map(|n| n.elevation).collect();
        assert_eq!(elevations, vec![Some(132.0), Some(217.0)]);

        assert_eq!(bound.edges.columns(), ["lanes", "name", FROM_ELEV, TO_ELEV]);
        let edge = &bound.edges.edges()[0];
        assert_eq!(edge.attrs[FROM_ELEV], json!(132.0));
        assert_eq!(edge.attrs[TO_ELEV], json!(217.0));
    }

    #[test]
    fn test_run_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let rasters = dir.path().join("dem");
        std::fs::create_dir(&rasters).unwrap();
        tiles(&rasters);

        // Acquire from a dataset directory, as the command line does.
        let root = dir.path().join("networks");
        let place_dir = root.join("Madison");
        std::fs::create_dir_all(&place_dir).unwrap();
        let input = network(false);
        io::write_nodes(&input.nodes, place_dir.join(GeoJsonDir::NODES)).unwrap();
        io::write_edges(&input.edges, place_dir.join(GeoJsonDir::EDGES)).unwrap();
        let source = GeoJsonDir::new(root).unwrap();

        let out = dir.path().join("out");
        let config = Config::new(rasters, out.clone()).output_crs(Some(Crs::Wgs84));
        let place: Place = "Madison, Wisconsin".parse().unwrap();
        let outputs = run(config, &source, &place).unwrap();
        assert_eq!(outputs.nodes, out.join(GeoJsonDir::NODES));
        assert_eq!(outputs.edges, out.join(GeoJsonDir::EDGES));

        let nodes = io::read_nodes(&outputs.nodes).unwrap();
        assert_eq!(nodes.crs(), Crs::Wgs84);
        assert_relative_eq!(nodes.nodes()[0].coord.x, -89.75, epsilon = 1e-9);
        assert_relative_eq!(nodes.nodes()[0].coord.y, 43.65, epsilon = 1e-9);
        assert_eq!(nodes.nodes()[1].elevation, Some(217.0));

        let edges = io::read_edges(&outputs.edges).unwrap();
        assert_eq!(edges.crs(), Crs::Wgs84);
        assert_eq!(edges.edges()[0].attrs[FROM_ELEV], json!(132.0));
        assert_eq!(edges.edges()[0].attrs[TO_ELEV], json!(217.0));
    }

    #[test]
    fn test_missing_raster_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path().join("missing"), dir.path().join("out"));
        assert!(matches!(
            Binder::new(config).bind(network(false)),
            Err(BindError::NotFound(_))
        ));
    }

    #[test]
    fn test_failed_export_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        // A directory squatting on the temporary edges path makes the
        // second write fail.
        std::fs::create_dir(dir.path().join("edges.geojson.tmp")).unwrap();
        let result = export(&network(false), dir.path());
        assert!(matches!(result, Err(BindError::Network(_))));
        assert!(!dir.path().join(GeoJsonDir::NODES).exists());
        assert!(!dir.path().join(GeoJsonDir::EDGES).exists());
        assert!(!dir.path().join("nodes.geojson.tmp").exists());
    }

    #[test]
    fn test_export_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");
        let outputs = export(&network(false), &out).unwrap();
        assert!(outputs.nodes.is_file());
        assert!(outputs.edges.is_file());
    }
}
