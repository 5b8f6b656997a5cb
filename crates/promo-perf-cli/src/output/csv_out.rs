use serde_json::Value;
use std::io;

use super::{flatten, scalar};

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => {
                if let Some(Value::Array(outcomes)) = result.get("outcomes") {
                    write_array_csv(&mut wtr, outcomes);
                } else if let Some(Value::Array(matrix)) = result.get("matrix") {
                    write_matrix_csv(&mut wtr, result, matrix);
                } else {
                    write_fields(&mut wtr, result);
                }
            }
            _ => match map.get("results") {
                Some(Value::Array(results)) => {
                    let rows: Vec<Value> = results
                        .iter()
                        .map(|r| r.get("result").cloned().unwrap_or_else(|| r.clone()))
                        .collect();
                    write_array_csv(&mut wtr, &rows);
                }
                _ => write_fields(&mut wtr, map),
            },
        },
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([scalar(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_fields(wtr: &mut StdoutWriter<'_>, map: &serde_json::Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in flatten(map) {
        let _ = wtr.write_record([key, scalar(&val)]);
    }
}

/// Long format: one row per grid point.
fn write_matrix_csv(
    wtr: &mut StdoutWriter<'_>,
    result: &serde_json::Map<String, Value>,
    matrix: &[Value],
) {
    let values = |key: &str| match result.get(key) {
        Some(Value::Array(v)) => v.iter().map(scalar).collect::<Vec<_>>(),
        _ => Vec::new(),
    };
    let rows = values("variable_1_values");
    let cols = values("variable_2_values");

    let _ = wtr.write_record(["variable_1_value", "variable_2_value", "value"]);
    for (i, row) in matrix.iter().enumerate() {
        if let Value::Array(cells) = row {
            for (j, cell) in cells.iter().enumerate() {
                let _ = wtr.write_record([
                    rows.get(i).cloned().unwrap_or_default(),
                    cols.get(j).cloned().unwrap_or_default(),
                    scalar(cell),
                ]);
            }
        }
    }
}

fn write_array_csv(wtr: &mut StdoutWriter<'_>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = flatten(first).into_iter().map(|(k, _)| k).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let flat = flatten(map);
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| {
                        flat.iter()
                            .find(|(k, _)| k == h)
                            .map(|(_, v)| scalar(v))
                            .unwrap_or_default()
                    })
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([scalar(item)]);
        }
    }
}
