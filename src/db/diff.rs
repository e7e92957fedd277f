use serde_json::Value;

use crate::models::Changes;

/// Drops every proposed change whose value already matches the existing record.
///
/// A key missing from `existing` compares as `null`, so `{"field": null}` against
/// a record without that field is not a change.
pub fn prune_unchanged(existing: &Changes, mut changes: Changes) -> Changes {
    changes.retain(|key, proposed| {
        let current = existing.get(key).unwrap_or(&Value::Null);
        !values_equal(current, proposed)
    });
    changes
}

/// Narrows integral floats (`2.0`) to integers for the given fields. Other values,
/// including non-integral floats, are left for record validation to reject.
pub fn normalize_integral(changes: &mut Changes, fields: &[&str]) {
    for field in fields {
        let Some(Value::Number(n)) = changes.get(*field) else {
            continue;
        };
        let Some(f) = n.as_f64().filter(|_| n.is_f64()) else {
            continue;
        };
        if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
            changes.insert(field.to_string(), Value::from(f as i64));
        }
    }
}

/// Value equality where numbers compare by numeric value (`1 == 1.0`).
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_f64() || y.is_f64() => {
            matches!((x.as_f64(), y.as_f64()), (Some(x), Some(y)) if x == y)
        }
        _ => a == b,
    }
}
