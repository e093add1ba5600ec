use serde_json::{Map, Value};

/// A stored record: an ordered JSON object.
pub type Record = Map<String, Value>;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Field added to a record while it sits in the trash.
pub const DELETED_AT_FIELD: &str = "deletedAt";

/// Field stamped on create.
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Field stamped on create and on every update.
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Render a key value as the string used for lookups.
///
/// Keys may be stored as JSON strings or numbers; both compare by their
/// string form. Any other JSON type is not a usable key.
pub fn key_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Current time formatted as RFC 3339, the format used for every stored timestamp.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
