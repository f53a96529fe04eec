//! Nearest-cell elevation sampling with a per-run tile cache.

use crate::{Assignment, BindError};
use geo::geometry::Coord;
use log::{debug, info};
use network::NodeTable;
use raster::{Crs, Grid, C};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

/// Tiles loaded during a run, already reprojected into the working
/// reference.
#[derive(Debug)]
pub struct TileCache {
    /// Reference every cached grid is in.
    crs: Crs,

    /// Tiles which have been loaded on demand.
    grids: HashMap<PathBuf, Grid>,
}

impl TileCache {
    pub fn new(crs: Crs) -> Self {
        Self {
            crs,
            grids: HashMap::new(),
        }
    }

    /// Returns the grid for `tile`, reading and reprojecting it the
    /// first time it is asked for.
    pub fn get_or_load(&mut self, tile: &Path) -> Result<&Grid, BindError> {
        if !self.grids.contains_key(tile) {
            let grid = Self::load(tile, self.crs)?;
            self.grids.insert(tile.to_owned(), grid);
        }
        Ok(&self.grids[tile])
    }

    /// Drops `tile`'s grid, returning whether it was cached.
    pub fn release(&mut self, tile: &Path) -> bool {
        let released = self.grids.remove(tile).is_some();
        if released {
            debug!("released {tile:?}");
        }
        released
    }

    pub fn contains(&self, tile: &Path) -> bool {
        self.grids.contains_key(tile)
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    fn load(tile: &Path, crs: Crs) -> Result<Grid, BindError> {
        if !tile.exists() {
            return Err(BindError::NotFound(tile.to_owned()));
        }
        debug!("loading {tile:?}");
        Ok(raster::open(tile)?.reproject(crs))
    }
}

/// Writes elevation onto located nodes, one tile at a time.
#[derive(Debug)]
pub struct Sampler {
    cache: TileCache,

    /// Keep tiles cached after their nodes are sampled.
    retain_tiles: bool,
}

impl Sampler {
    pub fn new(crs: Crs, retain_tiles: bool) -> Self {
        Self {
            cache: TileCache::new(crs),
            retain_tiles,
        }
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    /// Sets the elevation of every node in `assignment`.
    ///
    /// `assignment` must come from [locate] or [assign] over `nodes`.
    /// Each referenced tile is loaded once and all of its nodes are
    /// looked up in one pass. A node whose nearest cell holds no data
    /// fails the whole run.
    ///
    /// [locate]: crate::locate
    /// [assign]: crate::assign
    pub fn sample(&mut self, nodes: &mut NodeTable, assignment: &Assignment) -> Result<(), BindError> {
        if nodes.crs() != self.cache.crs {
            return Err(BindError::CrsMismatch {
                nodes: nodes.crs(),
                tiles: self.cache.crs,
            });
        }
        if nodes.len() != assignment.table_len() {
            return Err(BindError::AssignmentMismatch {
                assigned: assignment.table_len(),
                nodes: nodes.len(),
            });
        }

        for (tile, node_indices) in assignment.iter() {
            let coords: Vec<Coord<C>> = node_indices
                .iter()
                .map(|&node_idx| nodes.nodes()[node_idx].coord)
                .collect();
            let elevations = self.cache.get_or_load(tile)?.nearest_many(&coords);

            for (&node_idx, elevation) in node_indices.iter().zip(elevations) {
                let node = &mut nodes.nodes_mut()[node_idx];
                match elevation {
                    Some(elevation) => node.elevation = Some(f64::from(elevation)),
                    None => {
                        return Err(BindError::NoData {
                            osmid: node.osmid,
                            tile: tile.to_owned(),
                        })
                    }
                }
            }
            debug!("sampled {} nodes from {tile:?}", node_indices.len());

            if !self.retain_tiles {
                self.cache.release(tile);
            }
        }

        info!(
            "sampled {} nodes from {} tiles",
            assignment.node_count(),
            assignment.tile_count()
        );
        Ok(())
    }
}
