use serde_json::Value;

use super::scalar;

/// Key answer fields, most significant first.
const PRIORITY_KEYS: [&str; 9] = [
    "roi",
    "recommendation",
    "base_case_value",
    "total_cost",
    "volume_lift_pct",
    "roi_category",
    "lift_category",
    "estimate",
    "profitability",
];

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in priority order, descending one
/// level into the winning object if it is itself structured, then falls
/// back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    println!("{}", pick(result_obj));
}

fn pick(value: &Value) -> String {
    if let Value::Object(map) = value {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key) {
                if !val.is_null() {
                    return if val.is_object() { pick(val) } else { scalar(val) };
                }
            }
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, scalar(val));
        }
    }
    scalar(value)
}
