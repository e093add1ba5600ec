//! Back-office user accounts.
//!
//! Passwords arrive as `password` and are stored only as an Argon2
//! `passwordHash`, which is never returned to clients.

use bizdir_core::collections;
use bizdir_core::error::CoreError;
use bizdir_core::roles::{is_known_role, ROLE_EDITOR};
use bizdir_core::types::Record;
use bizdir_db::Collection;
use serde_json::{json, Value};
use validator::ValidateEmail;

use super::{set_default, Resource};
use crate::auth::password::{check_new_password, hash_password};
use crate::config::ServerConfig;

/// Stored password hash field; never sent to clients.
pub const PASSWORD_HASH_FIELD: &str = "passwordHash";

/// Login name; unique across active and trashed users.
pub const USERNAME_FIELD: &str = "username";

/// Plaintext password field accepted on create/update.
const PASSWORD_FIELD: &str = "password";

pub struct Users;

impl Resource for Users {
    const ENTITY: &'static str = "User";
    const COLLECTION: Collection =
        Collection::new(collections::USERS, "id").with_unique(&[USERNAME_FIELD]);
    const KEY_SOURCE: &'static str = USERNAME_FIELD;
    const REQUIRED: &'static [&'static str] = &[USERNAME_FIELD, "email"];

    fn apply_defaults(record: &mut Record, _now: &str) {
        set_default(record, "role", json!(ROLE_EDITOR));
        set_default(record, "active", json!(true));
    }

    fn prepare(payload: &mut Record) -> Result<(), CoreError> {
        // Hashes are only ever produced here.
        payload.remove(PASSWORD_HASH_FIELD);

        if let Some(email) = payload.get("email").and_then(Value::as_str) {
            if !email.validate_email() {
                return Err(CoreError::Validation(format!(
                    "`{email}` is not a valid email address"
                )));
            }
        }

        if let Some(role) = payload.get("role") {
            match role.as_str() {
                Some(role) if is_known_role(role) => {}
                _ => {
                    return Err(CoreError::Validation(format!(
                        "`role` must be one of: {}",
                        bizdir_core::roles::ALL_ROLES.join(", ")
                    )))
                }
            }
        }

        if let Some(password) = payload.remove(PASSWORD_FIELD) {
            let Value::String(password) = password else {
                return Err(CoreError::Validation("`password` must be a string".into()));
            };
            check_new_password(&password)?;
            let hash = hash_password(&password)
                .map_err(|e| CoreError::Internal(format!("Password hashing error: {e}")))?;
            payload.insert(PASSWORD_HASH_FIELD.to_string(), Value::String(hash));
        }

        Ok(())
    }

    fn check_reserved(payload: &Record, config: &ServerConfig) -> Result<(), CoreError> {
        match payload.get(USERNAME_FIELD).and_then(Value::as_str) {
            Some(username) if username == config.admin.username => Err(CoreError::Conflict(
                format!("`username` {username} is reserved for the administrator"),
            )),
            _ => Ok(()),
        }
    }

    fn present(mut record: Record) -> Record {
        record.remove(PASSWORD_HASH_FIELD);
        record
    }
}
