//! Well-known role names.
//!
//! These must match the `CHECK` constraint on `users.role` in
//! `20260301000001_create_users_table.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Returns `true` if `role` is one of the roles accepted by the account store.
pub fn is_known_role(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_USER
}
