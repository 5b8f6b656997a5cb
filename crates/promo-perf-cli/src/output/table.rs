use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten, scalar};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else if let Some(Value::Array(results)) = map.get("results") {
                for item in results {
                    print_table(item);
                    println!();
                }
                if let Some(Value::Object(cache)) = map.get("cache") {
                    println!("Cache:");
                    print_fields(cache);
                }
            } else {
                print_fields(map);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => {
            if let Some(Value::Array(outcomes)) = res_map.get("outcomes") {
                print_array_table(outcomes);
                let rest: Map<String, Value> = res_map
                    .iter()
                    .filter(|(k, _)| k.as_str() != "outcomes")
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                print_fields(&rest);
            } else if let Some(Value::Array(matrix)) = res_map.get("matrix") {
                print_matrix(res_map, matrix);
            } else {
                print_fields(res_map);
            }
        }
        _ => print_fields(envelope),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in flatten(map) {
        builder.push_record([key, scalar(&val)]);
    }
    println!("{}", Table::from(builder));
}

/// Sensitivity grid: rows are variable_1 values, columns variable_2 values.
fn print_matrix(res_map: &Map<String, Value>, matrix: &[Value]) {
    let label = |key: &str| res_map.get(key).map(scalar).unwrap_or_default();
    let row_values = match res_map.get("variable_1_values") {
        Some(Value::Array(v)) => v.clone(),
        _ => Vec::new(),
    };
    let col_values = match res_map.get("variable_2_values") {
        Some(Value::Array(v)) if !v.is_empty() => v.iter().map(scalar).collect(),
        _ => vec![label("metric")],
    };

    let mut builder = Builder::default();
    let mut header = vec![format!("{} \\ {}", label("variable_1"), label("variable_2"))];
    header.extend(col_values);
    builder.push_record(header);
    for (i, row) in matrix.iter().enumerate() {
        let mut record = vec![row_values.get(i).map(scalar).unwrap_or_default()];
        if let Value::Array(cells) = row {
            record.extend(cells.iter().map(scalar));
        }
        builder.push_record(record);
    }
    println!("{}", Table::from(builder));
    println!(
        "\nBase case: {} ({})",
        label("base_case_value"),
        label("metric")
    );
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = flatten(first).into_iter().map(|(k, _)| k).collect();
        let mut builder = Builder::default();
        builder.push_record(headers.clone());

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
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", scalar(item));
        }
    }
}
