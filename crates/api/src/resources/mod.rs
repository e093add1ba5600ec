//! Per-resource parameters for the generic CRUD handlers.
//!
//! Each resource is a zero-sized type implementing [`Resource`]; the
//! handlers in [`crate::handlers::resource`] and the router in
//! [`crate::routes::resource`] are instantiated once per type.

mod blog;
mod categories;
mod listings;
mod users;

pub use blog::Blog;
pub use categories::{Categories, ShopCategories};
pub use listings::{Cafes, Jewellers};
pub use users::{Users, PASSWORD_HASH_FIELD, USERNAME_FIELD};

use bizdir_core::error::CoreError;
use bizdir_core::slug::slugify;
use bizdir_core::types::{key_string, Record, CREATED_AT_FIELD, UPDATED_AT_FIELD};
use bizdir_db::Collection;
use serde_json::Value;

use crate::config::ServerConfig;

/// Path segments the resource router claims ahead of `/{key}`; a record
/// keyed by one of these could never be addressed.
pub const RESERVED_KEYS: &[&str] = &["trash"];

/// A collection exposed over the generic CRUD routes.
pub trait Resource: Send + Sync + 'static {
    /// Human-readable entity name used in messages (e.g. `"Cafe"`).
    const ENTITY: &'static str;

    /// Backing collection and its key field.
    const COLLECTION: Collection;

    /// Field slugified into the key when a create request carries none.
    const KEY_SOURCE: &'static str;

    /// Fields that must be non-empty strings on create, and may not be
    /// blanked by an update.
    const REQUIRED: &'static [&'static str];

    /// Fill resource-specific defaults for fields the caller left out.
    ///
    /// Runs after the key has been assigned.
    fn apply_defaults(record: &mut Record, now: &str);

    /// Validate or rewrite an incoming create/update payload.
    fn prepare(_payload: &mut Record) -> Result<(), CoreError> {
        Ok(())
    }

    /// Reject create/update payloads that clash with server configuration.
    fn check_reserved(_payload: &Record, _config: &ServerConfig) -> Result<(), CoreError> {
        Ok(())
    }

    /// Shape a stored record for a response.
    fn present(record: Record) -> Record {
        record
    }
}

/// Insert `value` under `field` unless the record already has a non-null value there.
pub fn set_default(record: &mut Record, field: &str, value: Value) {
    match record.get(field) {
        Some(existing) if !existing.is_null() => {}
        _ => {
            record.insert(field.to_string(), value);
        }
    }
}

/// Assign the record's key, deriving it from [`Resource::KEY_SOURCE`] if absent.
pub fn ensure_key<R: Resource>(record: &mut Record) -> Result<String, CoreError> {
    let collection = R::COLLECTION;
    if let Some(key) = record.get(collection.key_field).and_then(key_string) {
        reject_reserved_key(collection.key_field, &key)?;
        return Ok(key);
    }

    let derived = record
        .get(R::KEY_SOURCE)
        .and_then(Value::as_str)
        .map(slugify)
        .unwrap_or_default();
    if derived.is_empty() {
        return Err(CoreError::Validation(format!(
            "`{}` is required to derive `{}`",
            R::KEY_SOURCE,
            collection.key_field
        )));
    }

    reject_reserved_key(collection.key_field, &derived)?;

    record.insert(
        collection.key_field.to_string(),
        Value::String(derived.clone()),
    );
    Ok(derived)
}

fn reject_reserved_key(field: &str, key: &str) -> Result<(), CoreError> {
    if RESERVED_KEYS.contains(&key) {
        return Err(CoreError::Validation(format!(
            "`{field}` cannot be '{key}'; choose a different name"
        )));
    }
    Ok(())
}

/// Check that every required field holds a non-empty string.
pub fn require_fields(record: &Record, fields: &[&str]) -> Result<(), CoreError> {
    for field in fields {
        if !is_filled_string(record.get(*field)) {
            return Err(CoreError::Validation(format!("`{field}` is required")));
        }
    }
    Ok(())
}

/// Check that a patch does not blank any required field it mentions.
pub fn reject_blanked_fields(patch: &Record, fields: &[&str]) -> Result<(), CoreError> {
    for field in fields {
        if patch.contains_key(*field) && !is_filled_string(patch.get(*field)) {
            return Err(CoreError::Validation(format!("`{field}` cannot be empty")));
        }
    }
    Ok(())
}

fn is_filled_string(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if !s.trim().is_empty())
}

/// Build a new record from a create request: key, resource defaults, timestamps.
pub fn build_new<R: Resource>(mut record: Record, now: &str) -> Result<Record, CoreError> {
    require_fields(&record, R::REQUIRED)?;
    R::prepare(&mut record)?;
    ensure_key::<R>(&mut record)?;
    R::apply_defaults(&mut record, now);
    set_default(&mut record, CREATED_AT_FIELD, Value::String(now.to_string()));
    record.insert(UPDATED_AT_FIELD.to_string(), Value::String(now.to_string()));
    Ok(record)
}

/// Build a patch from an update request: validation plus `updatedAt`.
pub fn build_patch<R: Resource>(mut patch: Record, now: &str) -> Result<Record, CoreError> {
    reject_blanked_fields(&patch, R::REQUIRED)?;
    let key_field = R::COLLECTION.key_field;
    if let Some(key) = patch.get(key_field).and_then(key_string) {
        reject_reserved_key(key_field, &key)?;
    }
    R::prepare(&mut patch)?;
    patch.remove(CREATED_AT_FIELD);
    patch.insert(UPDATED_AT_FIELD.to_string(), Value::String(now.to_string()));
    Ok(patch)
}
