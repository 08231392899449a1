use serde_json::Value;

/// First candidate key holding non-blank text. Numbers are accepted and
/// stringified, since ids and phone numbers arrive as either.
pub fn first_text(data: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match data.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First candidate key holding a finite number, or a string that parses as one.
/// A zero is a value, not a missing field.
pub fn first_number(data: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| {
        let n = match data.get(*key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;
        n.is_finite().then_some(n)
    })
}

/// First candidate key holding a non-negative count.
pub fn first_count(data: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|key| match data.get(*key)? {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.trunc() as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}
