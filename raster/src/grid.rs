use crate::{Crs, RasterError, C};
use geo::geometry::{Coord, Rect};
use log::debug;

/// A north-up elevation raster.
///
/// Samples are stored row-major, north to south and west to east.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Coordinate reference of `origin` and `cell_size`.
    crs: Crs,

    /// North-west corner of the north-west most cell.
    ///
    /// Specifically, the outer _edge_ of the cell, not its center.
    origin: Coord<C>,

    /// (width, height) of a single cell, both positive.
    cell_size: (C, C),

    /// Number of (columns, rows) in this grid.
    dimensions: (usize, usize),

    /// Sample value marking missing data, if any.
    nodata: Option<f32>,

    /// Elevation samples.
    samples: Box<[f32]>,
}

impl Grid {
    pub fn new(
        crs: Crs,
        origin: Coord<C>,
        cell_size: (C, C),
        dimensions: (usize, usize),
        nodata: Option<f32>,
        samples: Vec<f32>,
    ) -> Result<Self, RasterError> {
        let (cols, rows) = dimensions;
        if samples.len() != cols * rows || samples.is_empty() {
            return Err(RasterError::Dimensions {
                len: samples.len(),
                cols,
                rows,
            });
        }
        Ok(Self {
            crs,
            origin,
            cell_size,
            dimensions,
            nodata,
            samples: samples.into_boxed_slice(),
        })
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn origin(&self) -> Coord<C> {
        self.origin
    }

    pub fn cell_size(&self) -> (C, C) {
        self.cell_size
    }

    /// Returns (columns, rows).
    pub fn dimensions(&self) -> (usize, usize) {
        self.dimensions
    }

    pub fn nodata(&self) -> Option<f32> {
        self.nodata
    }

    /// Returns the number of samples in this grid.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns the area covered by this grid, cell edges included.
    pub fn extent(&self) -> Rect<C> {
        extent(self.origin, self.cell_size, self.dimensions)
    }

    /// Returns the sample at (`col`, `row`), `None` for out of range
    /// indices and no-data cells.
    pub fn get_xy(&self, (col, row): (usize, usize)) -> Option<f32> {
        let (cols, rows) = self.dimensions;
        if col < cols && row < rows {
            self.valid(self.samples[row * cols + col])
        } else {
            None
        }
    }

    /// Returns the (column, row) of the cell whose center is closest
    /// to `coord`.
    ///
    /// Coordinates beyond the grid clamp to the closest edge cell.
    pub fn nearest_xy(&self, coord: Coord<C>) -> (usize, usize) {
        let (cols, rows) = self.dimensions;
        let col = cell_index((coord.x - self.origin.x) / self.cell_size.0, cols);
        let row = cell_index((self.origin.y - coord.y) / self.cell_size.1, rows);
        (col, row)
    }

    /// Returns the sample of the cell nearest to `coord`, `None` if
    /// that cell holds no data.
    pub fn nearest(&self, coord: Coord<C>) -> Option<f32> {
        self.get_xy(self.nearest_xy(coord))
    }

    /// Bulk version of [`Grid::nearest`].
    pub fn nearest_many(&self, coords: &[Coord<C>]) -> Vec<Option<f32>> {
        coords.iter().map(|coord| self.nearest(*coord)).collect()
    }

    /// Returns a copy of this grid resampled (nearest neighbor) into
    /// `to`, covering the projected extent with the same dimensions.
    pub fn reproject(&self, to: Crs) -> Grid {
        if to == self.crs {
            return self.clone();
        }
        let (cols, rows) = self.dimensions;
        let target = self.crs.transform_rect(to, self.extent());
        #[allow(clippy::cast_precision_loss)]
        let cell_size = (target.width() / cols as C, target.height() / rows as C);
        let origin = Coord {
            x: target.min().x,
            y: target.max().y,
        };
        let center = target.center();

        // Both supported projections are separable, so a target column
        // maps to one source column regardless of row (and vice versa).
        #[allow(clippy::cast_precision_loss)]
        let src_cols: Vec<usize> = (0..cols)
            .map(|col| {
                let x = origin.x + (col as C + 0.5) * cell_size.0;
                let src = to.transform(self.crs, Coord { x, y: center.y });
                self.nearest_xy(src).0
            })
            .collect();
        #[allow(clippy::cast_precision_loss)]
        let src_rows: Vec<usize> = (0..rows)
            .map(|row| {
                let y = origin.y - (row as C + 0.5) * cell_size.1;
                let src = to.transform(self.crs, Coord { x: center.x, y });
                self.nearest_xy(src).1
            })
            .collect();

        let mut samples = Vec::with_capacity(self.samples.len());
        for src_row in &src_rows {
            let row_start = src_row * cols;
            samples.extend(src_cols.iter().map(|src_col| self.samples[row_start + src_col]));
        }

        debug!(
            "reprojected {cols}x{rows} grid from {} to {to}",
            self.crs
        );

        Self {
            crs: to,
            origin,
            cell_size,
            dimensions: self.dimensions,
            nodata: self.nodata,
            samples: samples.into_boxed_slice(),
        }
    }

    pub(crate) fn samples(&self) -> &[f32] {
        &self.samples
    }

    fn valid(&self, sample: f32) -> Option<f32> {
        if !sample.is_finite() || Some(sample) == self.nodata {
            None
        } else {
            Some(sample)
        }
    }
}

/// Returns the area covered by a grid, cell edges included.
pub(crate) fn extent(origin: Coord<C>, cell_size: (C, C), (cols, rows): (usize, usize)) -> Rect<C> {
    #[allow(clippy::cast_precision_loss)]
    let se = Coord {
        x: origin.x + cols as C * cell_size.0,
        y: origin.y - rows as C * cell_size.1,
    };
    Rect::new(origin, se)
}

/// Returns the cell index for fractional cell offset `offset`,
/// clamped to `[0, len)`.
fn cell_index(offset: C, len: usize) -> usize {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let idx = offset.floor().max(0.0) as usize;
    idx.min(len - 1)
}
