//! SRTM/NASADEM elevation (`.hgt`) file format.
//!
//! # References
//!
//! 1. [30-Meter SRTM Tile Downloader](https://dwtkns.com/srtm30m)
//! 1. [Archive Team](http://fileformats.archiveteam.org/index.php?title=HGT&oldid=17250)
//! 1. [SRTM Collection User Guide](https://lpdaac.usgs.gov/documents/179/SRTM_User_Guide_V3.pdf)

use crate::{grid, Crs, Grid, RasterError, C};
use byteorder::{BigEndian as BE, ReadBytesExt};
use geo::geometry::{Coord, Rect};
use std::{fs::File, io::BufReader, mem::size_of, path::Path};

const ARCSEC_PER_DEG: C = 3600.0;

/// Void marker used by SRTM.
pub const VOID: i16 = i16::MIN;

/// Returns the area covered by the `.hgt` file at `path` without
/// reading its samples.
pub fn read_extent<P: AsRef<Path>>(path: P) -> Result<(Crs, Rect<C>), RasterError> {
    let (origin, cell_size, dimensions) = layout(path.as_ref())?;
    Ok((Crs::Wgs84, grid::extent(origin, cell_size, dimensions)))
}

/// Returns a [Grid] read into memory from the `.hgt` file at `path`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Grid, RasterError> {
    let path = path.as_ref();
    let (origin, cell_size, dimensions @ (cols, rows)) = layout(path)?;

    let mut file = BufReader::new(File::open(path)?);
    let mut samples = Vec::with_capacity(cols * rows);
    for _ in 0..(cols * rows) {
        let sample = file.read_i16::<BE>()?;
        samples.push(f32::from(sample));
    }

    Grid::new(
        Crs::Wgs84,
        origin,
        cell_size,
        dimensions,
        Some(f32::from(VOID)),
        samples,
    )
}

/// Returns (origin, cell size, dimensions) of the file at `path`.
///
/// HGT samples are centered on the tile's integer degree lines, so
/// the covered area extends half a cell beyond them.
fn layout(path: &Path) -> Result<(Coord<C>, (C, C), (usize, usize)), RasterError> {
    let (resolution, dimensions) = extract_resolution(path)?;
    let sw_corner = parse_sw_corner(path)?;
    let cell = C::from(resolution) / ARCSEC_PER_DEG;
    let half_cell = cell / 2.0;
    let origin = Coord {
        x: C::from(sw_corner.x) - half_cell,
        y: C::from(sw_corner.y) + 1.0 + half_cell,
    };
    Ok((origin, (cell, cell), dimensions))
}

fn extract_resolution(path: &Path) -> Result<(u8, (usize, usize)), RasterError> {
    const RES_1_ARCSECONDS_FILE_LEN: u64 = 3601 * 3601 * size_of::<u16>() as u64;
    const RES_3_ARCSECONDS_FILE_LEN: u64 = 1201 * 1201 * size_of::<u16>() as u64;
    match path.metadata().map(|m| m.len())? {
        RES_1_ARCSECONDS_FILE_LEN => Ok((1, (3601, 3601))),
        RES_3_ARCSECONDS_FILE_LEN => Ok((3, (1201, 1201))),
        invalid_len => Err(RasterError::HgtLen(invalid_len, path.to_owned())),
    }
}

fn parse_sw_corner(path: &Path) -> Result<Coord<i16>, RasterError> {
    let mk_err = || RasterError::HgtName(path.to_owned());
    let name = path
        .file_stem()
        .and_then(std::ffi::OsStr::to_str)
        .ok_or_else(mk_err)?;
    if name.len() != 7 || !name.is_ascii() {
        return Err(mk_err());
    }
    let lat_sign = match &name[0..1] {
        "N" | "n" => 1,
        "S" | "s" => -1,
        _ => return Err(mk_err()),
    };
    let lat = lat_sign * name[1..3].parse::<i16>().map_err(|_| mk_err())?;
    let lon_sign = match &name[3..4] {
        "E" | "e" => 1,
        "W" | "w" => -1,
        _ => return Err(mk_err()),
    };
    let lon = lon_sign * name[4..7].parse::<i16>().map_err(|_| mk_err())?;
    Ok(Coord { x: lon, y: lat })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{extract_resolution, load, parse_sw_corner, read_extent, Coord, VOID};
    use byteorder::{BigEndian as BE, WriteBytesExt};
    use std::{
        fs::File,
        io::{BufWriter, Write},
        path::{Path, PathBuf},
    };

    /// Writes a 3 arc-second tile whose samples encode their own
    /// (column, row) as `col + row`, with a void in the NE corner.
    pub(crate) fn write_3_arcsecond(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut wtr = BufWriter::new(File::create(&path).unwrap());
        for row in 0..1201_i16 {
            for col in 0..1201_i16 {
                let sample = if row == 0 && col == 1200 {
                    VOID
                } else {
                    col + row
                };
                wtr.write_i16::<BE>(sample).unwrap();
            }
        }
        wtr.flush().unwrap();
        path
    }

    #[test]
    fn test_parse_hgt_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_3_arcsecond(dir.path(), "N44W072.hgt");
        assert_eq!(parse_sw_corner(&path).unwrap(), Coord { x: -72, y: 44 });
        assert_eq!(extract_resolution(&path).unwrap(), (3, (1201, 1201)));
        assert_eq!(
            parse_sw_corner(Path::new("S01E000.hgt")).unwrap(),
            Coord { x: 0, y: -1 }
        );
        assert!(parse_sw_corner(Path::new("X44W072.hgt")).is_err());
        assert!(parse_sw_corner(Path::new("N44W72.hgt")).is_err());
    }

    #[test]
    fn test_invalid_len() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("N44W072.hgt");
        std::fs::write(&path, [0_u8; 10]).unwrap();
        assert!(load(&path).is_err());
    }

    #[test]
    fn test_extent_matches_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_3_arcsecond(dir.path(), "N44W072.hgt");
        let (_, extent) = read_extent(&path).unwrap();
        let grid = load(&path).unwrap();
        assert_eq!(extent, grid.extent());
        let half_cell = 3.0 / 3600.0 / 2.0;
        assert!((extent.min().x - (-72.0 - half_cell)).abs() < 1e-12);
        assert!((extent.max().y - (45.0 + half_cell)).abs() < 1e-12);
    }

    #[test]
    fn test_tile_geo_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_3_arcsecond(dir.path(), "N44W072.hgt");
        let grid = load(path).unwrap();
        // NW most sample is centered on (-72, 45).
        assert_eq!(grid.nearest(Coord { x: -72.0, y: 45.0 }), Some(0.0));
        // SW most sample is centered on (-72, 44) and is in the last row.
        assert_eq!(grid.nearest(Coord { x: -72.0, y: 44.0 }), Some(1200.0));
        // Sample centered 10 cells east and 20 cells south of the NW corner.
        let cell = 3.0 / 3600.0;
        let coord = Coord {
            x: -72.0 + 10.0 * cell,
            y: 45.0 - 20.0 * cell,
        };
        assert_eq!(grid.nearest(coord), Some(30.0));
        // Void in the NE corner.
        assert_eq!(grid.nearest(Coord { x: -71.0, y: 45.0 }), None);
    }
}
