//! Business listings: cafes and jewellers share one field layout.

use bizdir_core::collections;
use bizdir_core::types::Record;
use bizdir_db::Collection;
use serde_json::json;

use super::{set_default, Resource};

/// Rating given to a listing before any reviews come in.
pub const DEFAULT_RATING: f64 = 4.5;

fn listing_defaults(record: &mut Record, category: &str) {
    set_default(record, "description", json!(""));
    set_default(record, "address", json!(""));
    set_default(record, "phone", json!(""));
    set_default(record, "image", json!(""));
    set_default(record, "category", json!(category));
    set_default(record, "rating", json!(DEFAULT_RATING));
    set_default(record, "reviews", json!(0));
    set_default(record, "featured", json!(false));
}

pub struct Cafes;

impl Resource for Cafes {
    const ENTITY: &'static str = "Cafe";
    const COLLECTION: Collection = Collection::new(collections::CAFES, "slug");
    const KEY_SOURCE: &'static str = "name";
    const REQUIRED: &'static [&'static str] = &["name"];

    fn apply_defaults(record: &mut Record, _now: &str) {
        listing_defaults(record, "Cafe");
    }
}

pub struct Jewellers;

impl Resource for Jewellers {
    const ENTITY: &'static str = "Jeweller";
    const COLLECTION: Collection = Collection::new(collections::JEWELLERS, "slug");
    const KEY_SOURCE: &'static str = "name";
    const REQUIRED: &'static [&'static str] = &["name"];

    fn apply_defaults(record: &mut Record, _now: &str) {
        listing_defaults(record, "Jewellers");
        set_default(record, "verified", json!(false));
    }
}
