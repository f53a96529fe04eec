//! GeoJSON node and edge datasets.
//!
//! Nodes are `Point` features carrying an `osmid` property, edges are
//! `LineString` features carrying `from` and `to` properties. Files in
//! a reference other than EPSG:4326 carry a legacy `crs` member.

use crate::{
    table::{Edge, EdgeTable, Node, NodeId, NodeTable, ELEVATION, FROM, OSMID, TO},
    NetworkError,
};
use geo::geometry::{Coord, LineString};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value as GeomValue};
use log::debug;
use raster::{Crs, C};
use serde_json::{json, Value};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

pub fn read_nodes<P: AsRef<Path>>(path: P) -> Result<NodeTable, NetworkError> {
    let path = path.as_ref();
    let (crs, features) = read_features(path)?;
    let nodes = features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| {
            let bad = |reason: &str| NetworkError::Feature {
                path: path.to_owned(),
                index,
                reason: reason.to_owned(),
            };
            let coord = match feature.geometry.map(|geometry| geometry.value) {
                Some(GeomValue::Point(position)) => position_to_coord(&position).ok_or_else(|| bad("bad position"))?,
                _ => return Err(bad("expected a Point geometry")),
            };
            let mut attrs = feature.properties.unwrap_or_default();
            let osmid = attrs
                .remove(OSMID)
                .as_ref()
                .and_then(node_id)
                .ok_or_else(|| bad("missing or non-integer osmid"))?;
            let elevation = attrs.remove(ELEVATION).as_ref().and_then(Value::as_f64);
            Ok(Node {
                osmid,
                coord,
                elevation,
                attrs,
            })
        })
        .collect::<Result<Vec<Node>, NetworkError>>()?;
    debug!("read {} nodes from {path:?}", nodes.len());
    Ok(NodeTable::new(crs, nodes))
}

pub fn read_edges<P: AsRef<Path>>(path: P) -> Result<EdgeTable, NetworkError> {
    let path = path.as_ref();
    let (crs, features) = read_features(path)?;
    let edges = features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| {
            let bad = |reason: &str| NetworkError::Feature {
                path: path.to_owned(),
                index,
                reason: reason.to_owned(),
            };
            let geometry = match feature.geometry.map(|geometry| geometry.value) {
                Some(GeomValue::LineString(positions)) => positions
                    .iter()
                    .map(|position| position_to_coord(position))
                    .collect::<Option<Vec<Coord<C>>>>()
                    .map(LineString::new)
                    .ok_or_else(|| bad("bad position"))?,
                _ => return Err(bad("expected a LineString geometry")),
            };
            let mut attrs = feature.properties.unwrap_or_default();
            let from = attrs
                .remove(FROM)
                .as_ref()
                .and_then(node_id)
                .ok_or_else(|| bad("missing or non-integer from"))?;
            let to = attrs
                .remove(TO)
                .as_ref()
                .and_then(node_id)
                .ok_or_else(|| bad("missing or non-integer to"))?;
            Ok(Edge {
                from,
                to,
                geometry,
                attrs,
            })
        })
        .collect::<Result<Vec<Edge>, NetworkError>>()?;
    debug!("read {} edges from {path:?}", edges.len());
    Ok(EdgeTable::new(crs, edges))
}

pub fn write_nodes<P: AsRef<Path>>(table: &NodeTable, path: P) -> Result<(), NetworkError> {
    let features = table
        .nodes()
        .iter()
        .map(|node| {
            let mut properties = JsonObject::new();
            properties.insert(OSMID.to_owned(), Value::from(node.osmid));
            properties.extend(node.attrs.clone());
            properties.insert(ELEVATION.to_owned(), float(node.elevation));
            feature(GeomValue::Point(vec![node.coord.x, node.coord.y]), properties)
        })
        .collect();
    write_features(path.as_ref(), table.crs(), features)
}

pub fn write_edges<P: AsRef<Path>>(table: &EdgeTable, path: P) -> Result<(), NetworkError> {
    let features = table
        .edges()
        .iter()
        .map(|edge| {
            let mut properties = JsonObject::new();
            properties.insert(FROM.to_owned(), Value::from(edge.from));
            properties.insert(TO.to_owned(), Value::from(edge.to));
            properties.extend(edge.attrs.clone());
            let positions = edge
                .geometry
                .coords()
                .map(|coord| vec![coord.x, coord.y])
                .collect();
            feature(GeomValue::LineString(positions), properties)
        })
        .collect();
    write_features(path.as_ref(), table.crs(), features)
}

/// Returns `value` as JSON, with absent and non-finite values as null.
pub fn float(value: Option<f64>) -> Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

/// Accepts integers, integral floats and numeric strings.
fn node_id(value: &Value) -> Option<NodeId> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0)
                .map(|f| f as NodeId)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn position_to_coord(position: &[f64]) -> Option<Coord<C>> {
    match position {
        [x, y, ..] => Some(Coord { x: *x, y: *y }),
        _ => None,
    }
}

fn feature(geometry: GeomValue, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geometry)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn read_features(path: &Path) -> Result<(Crs, Vec<Feature>), NetworkError> {
    if !path.exists() {
        return Err(NetworkError::NotFound(path.to_owned()));
    }
    let rdr = BufReader::new(File::open(path)?);
    let geojson = GeoJson::from_reader(rdr).map_err(|source| NetworkError::GeoJson {
        path: path.to_owned(),
        source,
    })?;
    match geojson {
        GeoJson::FeatureCollection(FeatureCollection {
            features,
            foreign_members,
            ..
        }) => {
            let crs = match foreign_members.as_ref().and_then(|members| members.get("crs")) {
                Some(crs) => parse_crs_member(crs).ok_or_else(|| NetworkError::CrsMember {
                    path: path.to_owned(),
                    member: crs.to_string(),
                })??,
                None => Crs::Wgs84,
            };
            Ok((crs, features))
        }
        _ => Err(NetworkError::NotFeatureCollection {
            path: path.to_owned(),
        }),
    }
}

fn write_features(path: &Path, crs: Crs, features: Vec<Feature>) -> Result<(), NetworkError> {
    let foreign_members = (crs != Crs::Wgs84).then(|| {
        let mut members = JsonObject::new();
        members.insert("crs".to_owned(), crs_member(crs));
        members
    });
    let collection = GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members,
    });
    let mut wtr = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut wtr, &collection).map_err(std::io::Error::from)?;
    wtr.flush()?;
    debug!("wrote {path:?}");
    Ok(())
}

fn crs_member(crs: Crs) -> Value {
    json!({
        "type": "name",
        "properties": { "name": format!("urn:ogc:def:crs:EPSG::{}", crs.epsg()) }
    })
}

/// Parses a legacy `{"type": "name", "properties": {"name": ...}}`
/// member whose name ends in an EPSG code.
fn parse_crs_member(member: &Value) -> Option<Result<Crs, raster::RasterError>> {
    let name = member.pointer("/properties/name")?.as_str()?;
    let code = name.rsplit(':').next()?.parse::<u32>().ok()?;
    Some(Crs::from_epsg(code))
}
