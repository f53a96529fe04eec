//! Bounding rectangles of every DEM tile in a directory.

use crate::BindError;
use geo::geometry::{Coord, Rect};
use log::{debug, info, warn};
use raster::{Crs, Format, C};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, PartialEq)]
pub struct TileIndex {
    /// Reference of every rectangle in `tiles`.
    crs: Crs,

    /// Tile path to bounding rectangle, ordered by path.
    tiles: BTreeMap<PathBuf, Rect<C>>,
}

impl TileIndex {
    /// Indexes every raster in `tile_dir`, skipping other files.
    ///
    /// Only raster metadata is read here; samples are loaded later,
    /// on demand.
    pub fn build(tile_dir: &Path, crs: Crs) -> Result<Self, BindError> {
        if !tile_dir.is_dir() {
            return Err(BindError::NotFound(tile_dir.to_owned()));
        }

        let mut tiles = BTreeMap::new();
        for entry in std::fs::read_dir(tile_dir)? {
            let path = entry?.path();
            if !path.is_file() || Format::from_path(&path).is_none() {
                continue;
            }
            let (tile_crs, extent) = raster::read_extent(&path)?;
            let rect = tile_crs.transform_rect(crs, extent);
            debug!("indexed {path:?}: {rect:?}");
            tiles.insert(path, rect);
        }

        if tiles.is_empty() {
            warn!("no raster tiles in {tile_dir:?}");
        } else {
            info!("indexed {} tiles in {tile_dir:?}", tiles.len());
        }
        Ok(Self { crs, tiles })
    }

    pub fn from_tiles<I>(crs: Crs, tiles: I) -> Self
    where
        I: IntoIterator<Item = (PathBuf, Rect<C>)>,
    {
        Self {
            crs,
            tiles: tiles.into_iter().collect(),
        }
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, tile: &Path) -> Option<&Rect<C>> {
        self.tiles.get(tile)
    }

    /// Iterates tiles in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &Rect<C>)> + '_ {
        self.tiles.iter().map(|(path, rect)| (path.as_path(), rect))
    }

    /// Returns the tile containing `coord`, edges included.
    ///
    /// Where tiles overlap, the first in path order wins.
    pub fn lookup(&self, coord: Coord<C>) -> Option<&Path> {
        self.iter()
            .find(|(_, rect)| contains(rect, coord))
            .map(|(path, _)| path)
    }
}

fn contains(rect: &Rect<C>, Coord { x, y }: Coord<C>) -> bool {
    let (min, max) = (rect.min(), rect.max());
    min.x <= x && x <= max.x && min.y <= y && y <= max.y
}
