use serde_json::{Map, Value};

pub const INDENT: &str = "  ";

/// Copy of `value` with object keys sorted at every level.
pub fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::with_capacity(map.len());
            for key in keys {
                out.insert(key.clone(), sorted(&map[key]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        scalar => scalar.clone(),
    }
}

/// Pretty JSON with sorted keys, used for saved snapshots.
pub fn to_canonical_json(value: &Value) -> String {
    format!("{:#}", sorted(value))
}

/// Line-oriented canonical form used for comparison.
///
/// Same layout as [`to_canonical_json`] minus the separating commas, so that
/// inserting a member only ever adds lines.
pub fn canonical_lines(value: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    render(&sorted(value), 0, None, &mut lines);
    lines
}

fn render(value: &Value, depth: usize, key: Option<&str>, out: &mut Vec<String>) {
    let pad = INDENT.repeat(depth);
    let label = key.map(|k| format!("{}: ", Value::String(k.to_owned()))).unwrap_or_default();

    match value {
        Value::Object(map) if !map.is_empty() => {
            out.push(format!("{pad}{label}{{"));
            for (k, v) in map {
                render(v, depth + 1, Some(k), out);
            }
            out.push(format!("{pad}}}"));
        }
        Value::Array(items) if !items.is_empty() => {
            out.push(format!("{pad}{label}["));
            for item in items {
                render(item, depth + 1, None, out);
            }
            out.push(format!("{pad}]"));
        }
        other => out.push(format!("{pad}{label}{other}")),
    }
}
