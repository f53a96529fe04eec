use crate::join::{narrow_join, ElevationLookup, Endpoint, FROM_ELEV, TO_ELEV};
use log::info;
use network::{io::float, EdgeTable, NodeTable};
use serde_json::Value;

/// Returns `edges` with `from_elev` and `to_elev` taken from `nodes`.
///
/// The `from` join fully completes before the `to` join starts, and
/// both columns are normalized to floating point (or null) at the end.
pub fn propagate(edges: &EdgeTable, nodes: &NodeTable) -> EdgeTable {
    let lookup = ElevationLookup::new(nodes);
    let joined = narrow_join(edges, Endpoint::From, &lookup);
    let joined = narrow_join(&joined, Endpoint::To, &lookup);
    let joined = cast_float(joined, &[FROM_ELEV, TO_ELEV]);
    info!("propagated elevation onto {} edges", joined.len());
    joined
}

/// Returns `table` with every value in `columns` converted to a
/// float, or null where no number can be recovered.
pub fn cast_float(table: EdgeTable, columns: &[&str]) -> EdgeTable {
    let (crs, schema, mut edges) = table.into_parts();
    for edge in &mut edges {
        for &column in columns {
            if let Some(value) = edge.attrs.get_mut(column) {
                *value = to_float(value);
            }
        }
    }
    EdgeTable::with_columns(crs, schema, edges)
}

fn to_float(value: &Value) -> Value {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    float(number)
}

#[cfg(test)]
mod tests {
    use super::{cast_float, propagate};
    use crate::{fixtures, FROM_ELEV, TO_ELEV};
    use network::{EdgeTable, NodeTable};
    use raster::Crs;
    use serde_json::{json, Value};

    #[test]
    fn test_schema_and_values() {
        let mut nodes = Vec::new();
        for (osmid, elevation) in [(1, 250.0), (2, 262.5), (3, 270.0)] {
            let mut node = fixtures::node(osmid, 0.0, 0.0);
            node.elevation = Some(elevation);
            node.attrs.insert("street_count".to_owned(), json!(3));
            nodes.push(node);
        }
        let nodes = NodeTable::new(Crs::WebMercator, nodes);
        let edges = EdgeTable::new(
            Crs::WebMercator,
            vec![
                fixtures::edge(1, 2, json!({"name": "State St", "length": 90.1, "oneway": false})),
                fixtures::edge(2, 3, json!({"name": "Gorham St", "length": 45.0, "oneway": true})),
                fixtures::edge(3, 1, json!({"name": "Mifflin St", "length": 70.0, "oneway": false})),
            ],
        );

        let bound = propagate(&edges, &nodes);

        let mut expected_schema = edges.columns().to_vec();
        expected_schema.extend([FROM_ELEV.to_owned(), TO_ELEV.to_owned()]);
        assert_eq!(bound.columns(), expected_schema);
        assert_eq!(bound.crs(), Crs::WebMercator);

        let elevation_of = |osmid| {
            nodes
                .nodes()
                .iter()
                .find(|node| node.osmid == osmid)
                .and_then(|node| node.elevation)
                .unwrap()
        };
        for edge in bound.edges() {
            assert_eq!(edge.attrs[FROM_ELEV], json!(elevation_of(edge.from)));
            assert_eq!(edge.attrs[TO_ELEV], json!(elevation_of(edge.to)));
            // Node columns never cross over.
            assert!(edge.attrs.get("street_count").is_none());
            let mut keys: Vec<&String> = edge.attrs.keys().collect();
            keys.sort();
            assert_eq!(keys, ["from_elev", "length", "name", "oneway", "to_elev"]);
        }
    }

    #[test]
    fn test_cast_float() {
        let edges = EdgeTable::new(
            Crs::Wgs84,
            vec![
                fixtures::edge(1, 2, json!({"from_elev": 12, "to_elev": "13.5", "name": "12"})),
                fixtures::edge(2, 3, json!({"from_elev": null, "to_elev": "n/a"})),
                fixtures::edge(3, 1, json!({"from_elev": [1.0], "to_elev": true})),
            ],
        );
        let cast = cast_float(edges, &[FROM_ELEV, TO_ELEV]);
        let values: Vec<(Value, Value)> = cast
            .edges()
            .iter()
            .map(|edge| (edge.attrs["from_elev"].clone(), edge.attrs["to_elev"].clone()))
            .collect();
        assert_eq!(
            values,
            vec![
                (json!(12.0), json!(13.5)),
                (Value::Null, Value::Null),
                (Value::Null, Value::Null),
            ]
        );
        // Columns outside the cast list are untouched.
        assert_eq!(cast.edges()[0].attrs["name"], json!("12"));
        for edge in cast.edges() {
            for column in [FROM_ELEV, TO_ELEV] {
                let value = &edge.attrs[column];
                assert!(value.is_null() || value.is_f64());
            }
        }
    }
}
