//! Role names carried in tokens and users records.
//!
//! Every authenticated role may write; the role is reported by `/verify`
//! and recorded in logs.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EDITOR: &str = "editor";

/// Every role a user record may carry.
pub const ALL_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_EDITOR];

pub fn is_known_role(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_listed_roles_are_known() {
        assert!(is_known_role("admin"));
        assert!(is_known_role("editor"));
        assert!(!is_known_role("viewer"));
        assert!(!is_known_role("Admin"));
    }
}
