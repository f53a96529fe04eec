//! The two coordinate references elevation binding works in.
//!
//! Network data and most DEM tiles arrive in geographic WGS84
//! (EPSG:4326). Spatial matching and sampling happen in spherical
//! Web Mercator (EPSG:3857), whose units are meters.

use crate::{RasterError, C};
use geo::{
    geometry::{Coord, MultiPoint, Rect},
    BoundingRect,
};
use std::{fmt, str::FromStr};

/// WGS84 semi-major axis in meters, the Web Mercator sphere radius.
const EARTH_RADIUS: C = 6_378_137.0;

/// Latitude at which Web Mercator becomes square.
pub const MAX_MERCATOR_LAT: C = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Crs {
    /// Geographic longitude/latitude in degrees.
    Wgs84,
    /// Spherical Web Mercator in meters.
    WebMercator,
}

impl Crs {
    pub fn from_epsg(code: u32) -> Result<Self, RasterError> {
        match code {
            4326 => Ok(Self::Wgs84),
            3857 | 900_913 => Ok(Self::WebMercator),
            other => Err(RasterError::UnsupportedCrs(other)),
        }
    }

    pub fn epsg(self) -> u32 {
        match self {
            Self::Wgs84 => 4326,
            Self::WebMercator => 3857,
        }
    }

    /// Returns `coord`, expressed in `self`, expressed in `to`.
    pub fn transform(self, to: Self, coord: Coord<C>) -> Coord<C> {
        match (self, to) {
            (Self::Wgs84, Self::WebMercator) => to_mercator(coord),
            (Self::WebMercator, Self::Wgs84) => from_mercator(coord),
            _ => coord,
        }
    }

    /// Returns the envelope of `rect`'s corners after transforming
    /// them into `to`.
    pub fn transform_rect(self, to: Self, rect: Rect<C>) -> Rect<C> {
        if self == to {
            return rect;
        }
        let (min, max) = (rect.min(), rect.max());
        let corners: MultiPoint<C> = [
            Coord { x: min.x, y: min.y },
            Coord { x: min.x, y: max.y },
            Coord { x: max.x, y: min.y },
            Coord { x: max.x, y: max.y },
        ]
        .into_iter()
        .map(|corner| self.transform(to, corner))
        .collect();
        corners.bounding_rect().unwrap_or(rect)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

impl FromStr for Crs {
    type Err = RasterError;

    /// Parses `"3857"` or `"EPSG:3857"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let code = match s.get(..5) {
            Some(prefix) if prefix.eq_ignore_ascii_case("epsg:") => &s[5..],
            _ => s,
        };
        let code = code
            .parse::<u32>()
            .map_err(|_| RasterError::CrsName(s.to_owned()))?;
        Self::from_epsg(code)
    }
}

fn to_mercator(Coord { x: lon, y: lat }: Coord<C>) -> Coord<C> {
    let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    Coord {
        x: EARTH_RADIUS * lon.to_radians(),
        y: EARTH_RADIUS * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln(),
    }
}

fn from_mercator(Coord { x, y }: Coord<C>) -> Coord<C> {
    Coord {
        x: (x / EARTH_RADIUS).to_degrees(),
        y: (2.0 * (y / EARTH_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees(),
    }
}
