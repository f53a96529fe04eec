//! Single band GeoTIFF elevation rasters.
//!
//! Only the georeferencing needed for north-up grids is understood:
//! `ModelTiepointTag` plus `ModelPixelScaleTag` for placement, the
//! GeoKey directory for the EPSG code and `GDAL_NODATA` for voids.

use crate::{grid, Crs, Grid, RasterError, C};
use geo::geometry::{Coord, Rect};
use log::debug;
use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Seek},
    path::Path,
};
use tiff::{
    decoder::{Decoder, DecodingResult, Limits},
    encoder::{colortype::Gray32Float, TiffEncoder},
    tags::Tag,
};

// The decoder files these under their named variants, so lookups must
// not use `Tag::Unknown` with the raw codes.
const MODEL_PIXEL_SCALE: Tag = Tag::ModelPixelScaleTag;
const MODEL_TIEPOINT: Tag = Tag::ModelTiepointTag;
const GEO_KEY_DIRECTORY: Tag = Tag::GeoKeyDirectoryTag;
const GDAL_NODATA: Tag = Tag::GdalNodata;

const GT_MODEL_TYPE_KEY: u16 = 1024;
const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_KEY: u16 = 3072;

/// Returns the area covered by the GeoTIFF at `path` without decoding
/// its samples.
pub fn read_extent<P: AsRef<Path>>(path: P) -> Result<(Crs, Rect<C>), RasterError> {
    let path = path.as_ref();
    let mut decoder = open_decoder(path)?;
    let header = read_header(&mut decoder, path)?;
    Ok((
        header.crs,
        grid::extent(header.origin, header.cell_size, header.dimensions),
    ))
}

/// Returns a [Grid] read into memory from the GeoTIFF at `path`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Grid, RasterError> {
    let path = path.as_ref();
    let mut decoder = open_decoder(path)?;
    let header = read_header(&mut decoder, path)?;
    let samples = decode_samples(&mut decoder).map_err(|e| RasterError::Tiff(e, path.to_owned()))?;
    Grid::new(
        header.crs,
        header.origin,
        header.cell_size,
        header.dimensions,
        header.nodata,
        samples,
    )
}

/// Writes `grid` as a single band `f32` GeoTIFF.
pub fn write<P: AsRef<Path>>(grid: &Grid, path: P) -> Result<(), RasterError> {
    let path = path.as_ref();
    let tiff_err = |e| RasterError::Tiff(e, path.to_owned());
    let (cols, rows) = grid.dimensions();
    let (cols_u32, rows_u32) = (
        u32::try_from(cols).map_err(|_| dimension_err(grid))?,
        u32::try_from(rows).map_err(|_| dimension_err(grid))?,
    );

    let wtr = BufWriter::new(File::create(path)?);
    let mut encoder = TiffEncoder::new(wtr).map_err(tiff_err)?;
    let mut image = encoder
        .new_image::<Gray32Float>(cols_u32, rows_u32)
        .map_err(tiff_err)?;

    let (dx, dy) = grid.cell_size();
    let origin = grid.origin();
    let scale = [dx, dy, 0.0];
    let tiepoint = [0.0, 0.0, 0.0, origin.x, origin.y, 0.0];
    let geokeys: [u16; 12] = match grid.crs() {
        Crs::Wgs84 => [
            1, 1, 0, 2, //
            GT_MODEL_TYPE_KEY, 0, 1, 2, //
            GEOGRAPHIC_TYPE_KEY, 0, 1, 4326,
        ],
        Crs::WebMercator => [
            1, 1, 0, 2, //
            GT_MODEL_TYPE_KEY, 0, 1, 1, //
            PROJECTED_CS_TYPE_KEY, 0, 1, 3857,
        ],
    };
    image
        .encoder()
        .write_tag(MODEL_PIXEL_SCALE, &scale[..])
        .map_err(tiff_err)?;
    image
        .encoder()
        .write_tag(MODEL_TIEPOINT, &tiepoint[..])
        .map_err(tiff_err)?;
    image
        .encoder()
        .write_tag(GEO_KEY_DIRECTORY, &geokeys[..])
        .map_err(tiff_err)?;
    if let Some(nodata) = grid.nodata() {
        image
            .encoder()
            .write_tag(GDAL_NODATA, nodata.to_string().as_str())
            .map_err(tiff_err)?;
    }
    image.write_data(grid.samples()).map_err(tiff_err)?;
    Ok(())
}

struct Header {
    crs: Crs,
    origin: Coord<C>,
    cell_size: (C, C),
    dimensions: (usize, usize),
    nodata: Option<f32>,
}

fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>, RasterError> {
    let file = BufReader::new(File::open(path)?);
    // 1 arc-second DEM tiles easily exceed the default buffer limits.
    let mut limits = Limits::default();
    limits.decoding_buffer_size = 1024 * 1024 * 1024;
    limits.intermediate_buffer_size = 1024 * 1024 * 1024;
    limits.ifd_value_size = 1024 * 1024 * 1024;
    Decoder::new(file)
        .map(|decoder| decoder.with_limits(limits))
        .map_err(|e| RasterError::Tiff(e, path.to_owned()))
}

fn read_header<R: Read + Seek>(decoder: &mut Decoder<R>, path: &Path) -> Result<Header, RasterError> {
    let (width, height) = decoder
        .dimensions()
        .map_err(|e| RasterError::Tiff(e, path.to_owned()))?;
    let scale = decoder.get_tag_f64_vec(MODEL_PIXEL_SCALE).ok();
    let tiepoint = decoder.get_tag_f64_vec(MODEL_TIEPOINT).ok();
    let (Some(scale), Some(tiepoint)) = (scale, tiepoint) else {
        return Err(RasterError::Georeference(path.to_owned()));
    };
    if scale.len() < 2 || tiepoint.len() < 6 || scale[0] <= 0.0 || scale[1] <= 0.0 {
        return Err(RasterError::Georeference(path.to_owned()));
    }

    // Tiepoint format: [i, j, k, x, y, z] where raster (i, j) sits at
    // model (x, y).
    let (dx, dy) = (scale[0], scale[1]);
    let origin = Coord {
        x: tiepoint[3] - tiepoint[0] * dx,
        y: tiepoint[4] + tiepoint[1] * dy,
    };

    let crs = match decoder.get_tag_u16_vec(GEO_KEY_DIRECTORY) {
        Ok(keys) => crs_from_geokeys(&keys)?,
        Err(_) => {
            debug!("{path:?} has no GeoKey directory, assuming EPSG:4326");
            Crs::Wgs84
        }
    };

    let nodata = decoder
        .get_tag_ascii_string(GDAL_NODATA)
        .ok()
        .and_then(|s| s.trim_matches(char::from(0)).trim().parse::<f32>().ok());

    Ok(Header {
        crs,
        origin,
        cell_size: (dx, dy),
        dimensions: (width as usize, height as usize),
        nodata,
    })
}

/// Returns the coordinate reference declared by a GeoKey directory.
fn crs_from_geokeys(keys: &[u16]) -> Result<Crs, RasterError> {
    let mut model_type = None;
    let mut epsg = None;
    // Skip the 4 word header, then walk (id, location, count, value)
    // entries. A zero location means the value is stored inline.
    for entry in keys.get(4..).unwrap_or_default().chunks_exact(4) {
        let (id, location, value) = (entry[0], entry[1], entry[3]);
        if location != 0 {
            continue;
        }
        match id {
            GT_MODEL_TYPE_KEY => model_type = Some(value),
            GEOGRAPHIC_TYPE_KEY if epsg.is_none() => epsg = Some(value),
            PROJECTED_CS_TYPE_KEY => epsg = Some(value),
            _ => {}
        }
    }
    match (epsg, model_type) {
        (Some(code), _) => Crs::from_epsg(u32::from(code)),
        // Geographic model without an explicit datum.
        (None, Some(2) | None) => Ok(Crs::Wgs84),
        (None, Some(_)) => Err(RasterError::UnsupportedCrs(0)),
    }
}

fn decode_samples<R: Read + Seek>(decoder: &mut Decoder<R>) -> tiff::TiffResult<Vec<f32>> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    let samples = match decoder.read_image()? {
        DecodingResult::F32(data) => data,
        DecodingResult::F64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::I16(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::I32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U8(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::U16(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::U32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U64(data) => data.into_iter().map(|v| v as f32).collect(),
    };
    Ok(samples)
}

fn dimension_err(grid: &Grid) -> RasterError {
    let (cols, rows) = grid.dimensions();
    RasterError::Dimensions {
        len: grid.len(),
        cols,
        rows,
    }
}
