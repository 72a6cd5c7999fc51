use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Heuristic: the schedule envelope nests its headline numbers in the
/// summary row; look there first, then for well-known result fields, then
/// fall back to the first field present.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let focus = result
        .as_object()
        .and_then(|m| m.get("summary"))
        .unwrap_or(result);

    // Priority list of key output fields
    let priority_keys = [
        "payoff_date",
        "total_net_interest",
        "period_payment",
        "total_interest",
    ];

    if let Value::Object(map) = focus {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    if let Value::Array(arr) = focus {
        println!("{} rows", arr.len());
        return;
    }

    println!("{}", format_minimal(focus));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
