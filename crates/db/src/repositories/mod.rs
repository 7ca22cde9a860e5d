//! Stateless repositories. Every method takes the pool explicitly.

mod session_repo;
mod user_repo;

pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;

/// SQL expression producing the current UTC time in RFC 3339 form.
pub(crate) const NOW_SQL: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";
