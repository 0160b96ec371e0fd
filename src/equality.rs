use serde_json::Value;


/// One-level structural equality over JSON snapshot values.
///
/// This is the default acceptance test used by [`Selector`](crate::Selector)
/// for dynamic engine snapshots:
///
/// 1. equal primitives (null, bool, number, string) compare equal;
/// 2. two objects compare key by key, one level deep;
/// 3. two arrays compare element by element, one level deep;
/// 4. everything else compares unequal.
///
/// Intentionally not recursive: a nested object or array held under a key is
/// compared by identity, and owned JSON trees have no aliasing identity, so
/// freshly-built nested containers never compare equal. Deep changes below
/// the first level therefore require a custom equality function
/// ([`Selector::with_eq`](crate::Selector::with_eq)).
pub fn shallow_eq(a: &Value, b: &Value) -> bool {
    if primitive_eq(a, b) {
        return true;
    }
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, va)| b.get(k).is_some_and(|vb| primitive_eq(va, vb)))
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(va, vb)| primitive_eq(va, vb))
        }
        _ => false,
    }
}

fn primitive_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        _ => false,
    }
}
