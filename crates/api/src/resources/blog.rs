use bizdir_core::collections;
use bizdir_core::types::Record;
use bizdir_db::Collection;
use serde_json::{json, Value};

use super::{set_default, Resource};

/// Blog posts, keyed by a slug of the title.
pub struct Blog;

impl Resource for Blog {
    const ENTITY: &'static str = "Blog post";
    const COLLECTION: Collection = Collection::new(collections::BLOG, "slug");
    const KEY_SOURCE: &'static str = "title";
    const REQUIRED: &'static [&'static str] = &["title"];

    fn apply_defaults(record: &mut Record, now: &str) {
        set_default(record, "excerpt", json!(""));
        set_default(record, "content", json!(""));
        set_default(record, "author", json!("Admin"));
        set_default(record, "category", json!("General"));
        set_default(record, "image", json!(""));
        set_default(record, "featured", json!(false));
        set_default(record, "published", json!(true));
        set_default(record, "publishedAt", Value::String(now.to_string()));
    }
}
