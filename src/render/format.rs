use serde_json::Value;

/// Render an answer payload for the transcript. String content passes
/// through untouched; an object carrying a `sql` field is shown as the
/// labeled query plus its result rows; everything else is pretty-printed.
pub fn format_content(content: &Value) -> String {
    match content {
        Value::String(text) => text.clone(),
        Value::Object(map) if map.contains_key("sql") => {
            let sql = match map.get("sql") {
                Some(Value::String(query)) => query.clone(),
                Some(other) => pretty(other),
                None => String::new(),
            };
            let mut out = format!("SQL Query: {}", sql);
            if let Some(results) = map.get("results") {
                out.push_str("\nResults:\n");
                out.push_str(&pretty(results));
            }
            out
        }
        other => pretty(other),
    }
}

pub fn format_error(content: &Value) -> String {
    match content {
        Value::String(text) => format!("Error: {}", text),
        other => format!("Error: {}", pretty(other)),
    }
}

pub fn format_tool_call(content: &Value) -> String {
    pretty(content)
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
