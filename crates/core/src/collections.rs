//! Names of the persisted collections and singleton documents.

pub const BLOG: &str = "blog";
pub const CAFES: &str = "cafes";
pub const JEWELLERS: &str = "jewellers";
pub const CATEGORIES: &str = "categories";
pub const SHOP_CATEGORIES: &str = "shop_categories";
pub const USERS: &str = "users";

/// Singleton document holding site-wide settings.
pub const SETTINGS: &str = "settings";
