//! Directory categories and shop categories, both keyed by `id`.

use bizdir_core::collections;
use bizdir_core::types::Record;
use bizdir_db::Collection;
use serde_json::{json, Value};

use super::{set_default, Resource};

fn category_defaults(record: &mut Record) {
    let id = record.get("id").cloned().unwrap_or(Value::Null);
    set_default(record, "slug", id);
    set_default(record, "description", json!(""));
    set_default(record, "icon", json!(""));
    set_default(record, "count", json!(0));
}

pub struct Categories;

impl Resource for Categories {
    const ENTITY: &'static str = "Category";
    const COLLECTION: Collection = Collection::new(collections::CATEGORIES, "id");
    const KEY_SOURCE: &'static str = "name";
    const REQUIRED: &'static [&'static str] = &["name"];

    fn apply_defaults(record: &mut Record, _now: &str) {
        category_defaults(record);
    }
}

pub struct ShopCategories;

impl Resource for ShopCategories {
    const ENTITY: &'static str = "Shop category";
    const COLLECTION: Collection = Collection::new(collections::SHOP_CATEGORIES, "id");
    const KEY_SOURCE: &'static str = "name";
    const REQUIRED: &'static [&'static str] = &["name"];

    fn apply_defaults(record: &mut Record, _now: &str) {
        category_defaults(record);
    }
}
