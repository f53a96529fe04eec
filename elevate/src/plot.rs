//! Map of exported edges coloured by one numeric column.

use geo::{geometry::MultiLineString, BoundingRect};
use log::debug;
use network::{io, EdgeTable, NetworkError};
use plotters::prelude::*;
use std::{
    ops::Range,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Hue of the lowest value (blue); the highest value is red (0).
const LOW_HUE: f64 = 240.0 / 360.0;
const NULL_COLOR: RGBColor = RGBColor(160, 160, 160);

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("{0} does not exist")]
    NotFound(PathBuf),

    #[error("no column {column:?}, available columns: {}", .available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("no edges to plot in {0}")]
    Empty(PathBuf),

    #[error("{0}")]
    Network(#[from] NetworkError),

    #[error("drawing failed: {0}")]
    Draw(String),
}

/// Renders the edges in `edges_path` to a PNG at `out`.
pub fn plot(edges_path: &Path, column: &str, out: &Path, (width, height): (u32, u32)) -> Result<(), PlotError> {
    if !edges_path.exists() {
        return Err(PlotError::NotFound(edges_path.to_owned()));
    }
    let edges = io::read_edges(edges_path)?;
    let values = column_values(&edges, column)?;
    let (x_range, y_range) = bounds(&edges).ok_or_else(|| PlotError::Empty(edges_path.to_owned()))?;
    let scale = value_range(&values);
    debug!("plotting {} edges by {column}, range {scale:?}", edges.len());

    let draw_err = |e: &dyn std::fmt::Display| PlotError::Draw(e.to_string());
    let root = BitMapBackend::new(out, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| draw_err(&e))?;
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(x_range, y_range)
        .map_err(|e| draw_err(&e))?;
    chart
        .draw_series(edges.edges().iter().zip(&values).map(|(edge, value)| {
            let points: Vec<(f64, f64)> = edge.geometry.coords().map(|c| (c.x, c.y)).collect();
            let style = match (value, scale) {
                (Some(value), Some(scale)) => color(*value, scale).stroke_width(2),
                _ => NULL_COLOR.stroke_width(1),
            };
            PathElement::new(points, style)
        }))
        .map_err(|e| draw_err(&e))?;
    root.present().map_err(|e| draw_err(&e))?;
    Ok(())
}

/// Returns `column`'s numeric value for every edge, `None` where the
/// value is null or not a number.
pub fn column_values(edges: &EdgeTable, column: &str) -> Result<Vec<Option<f64>>, PlotError> {
    if !edges.has_column(column) {
        return Err(PlotError::MissingColumn {
            column: column.to_owned(),
            available: edges.columns().to_vec(),
        });
    }
    Ok(edges
        .edges()
        .iter()
        .map(|edge| {
            edge.attrs
                .get(column)
                .and_then(|value| value.as_f64())
                .filter(|value| value.is_finite())
        })
        .collect())
}

/// Blue at `lo`, red at `hi`.
fn color(value: f64, (lo, hi): (f64, f64)) -> HSLColor {
    let t = if hi > lo { (value - lo) / (hi - lo) } else { 0.5 };
    HSLColor(LOW_HUE * (1.0 - t.clamp(0.0, 1.0)), 0.9, 0.45)
}

fn value_range(values: &[Option<f64>]) -> Option<(f64, f64)> {
    values.iter().flatten().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn bounds(edges: &EdgeTable) -> Option<(Range<f64>, Range<f64>)> {
    let lines: MultiLineString<f64> = edges
        .edges()
        .iter()
        .map(|edge| edge.geometry.clone())
        .collect();
    let rect = lines.bounding_rect()?;
    let (lo, hi) = (rect.min(), rect.max());
    // Keep a single point or straight line drawable.
    let pad = |lo: f64, hi: f64| if hi > lo { (hi - lo) * 0.02 } else { 1.0 };
    let (px, py) = (pad(lo.x, hi.x), pad(lo.y, hi.y));
    Some((lo.x - px..hi.x + px, lo.y - py..hi.y + py))
}

#[cfg(test)]
mod tests {
    use super::{bounds, color, column_values, plot, value_range, PlotError, LOW_HUE};
    use geo::geometry::LineString;
    use network::{io, Attributes, Edge, EdgeTable};
    use raster::Crs;
    use serde_json::json;

    fn edges() -> EdgeTable {
        let attrs = |value: serde_json::Value| {
            let mut attrs = Attributes::new();
            attrs.insert("name".to_owned(), json!("University Ave"));
            attrs.insert("from_elev".to_owned(), value);
            attrs
        };
        EdgeTable::new(
            Crs::Wgs84,
            vec![
                Edge {
                    from: 1,
                    to: 2,
                    geometry: LineString::from(vec![(-89.40, 43.07), (-89.39, 43.07)]),
                    attrs: attrs(json!(262.0)),
                },
                Edge {
                    from: 2,
                    to: 3,
                    geometry: LineString::from(vec![(-89.39, 43.07), (-89.38, 43.08)]),
                    attrs: attrs(json!(null)),
                },
            ],
        )
    }

    #[test]
    fn test_missing_column_lists_available() {
        match column_values(&edges(), "grade") {
            Err(err @ PlotError::MissingColumn { .. }) => {
                assert_eq!(
                    err.to_string(),
                    "no column \"grade\", available columns: from_elev, name"
                );
            }
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn test_column_values() {
        assert_eq!(
            column_values(&edges(), "from_elev").unwrap(),
            vec![Some(262.0), None]
        );
        // Text is not a number.
        assert_eq!(column_values(&edges(), "name").unwrap(), vec![None, None]);
    }

    #[test]
    fn test_color_ramp() {
        assert_eq!(color(0.0, (0.0, 10.0)).0, LOW_HUE);
        assert_eq!(color(10.0, (0.0, 10.0)).0, 0.0);
        assert_eq!(value_range(&[None, Some(3.0), Some(-1.0)]), Some((-1.0, 3.0)));
        assert_eq!(value_range(&[None]), None);
    }

    #[test]
    fn test_bounds() {
        let (x, y) = bounds(&edges()).unwrap();
        let pad = 0.02 * 0.02;
        assert!((x.start - (-89.40 - pad)).abs() < 1e-9);
        assert!((x.end - (-89.38 + pad)).abs() < 1e-9);
        assert!((y.start - (43.07 - 0.01 * 0.02)).abs() < 1e-9);
        assert!((y.end - (43.08 + 0.01 * 0.02)).abs() < 1e-9);

        // A flat extent gets a fixed margin.
        let (crs, columns, mut rows) = edges().into_parts();
        rows.truncate(1);
        let flat = EdgeTable::with_columns(crs, columns, rows);
        let (_, y) = bounds(&flat).unwrap();
        assert!((y.start - 42.07).abs() < 1e-9);
        assert!(bounds(&EdgeTable::new(Crs::Wgs84, Vec::new())).is_none());
    }

    #[test]
    fn test_plot_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = plot(
            &dir.path().join("edges.geojson"),
            "from_elev",
            &dir.path().join("map.png"),
            (64, 64),
        );
        assert!(matches!(result, Err(PlotError::NotFound(_))));
    }

    #[test]
    fn test_plot_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edges.geojson");
        io::write_edges(&edges(), &path).unwrap();
        let out = dir.path().join("map.png");
        plot(&path, "from_elev", &out, (64, 64)).unwrap();
        assert!(out.is_file());

        assert!(matches!(
            plot(&path, "grade", &out, (64, 64)),
            Err(PlotError::MissingColumn { .. })
        ));
    }
}
