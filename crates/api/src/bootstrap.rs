//! Default administrator account.
//!
//! A fresh account store has no way to sign in, so the server seeds one
//! admin on first start and the `reset-admin` binary can restore it.

use srd_core::roles::ROLE_ADMIN;
use srd_db::models::user::{CreateUser, User};
use srd_db::repositories::UserRepo;
use srd_db::DbPool;

use crate::auth::password::hash_password;

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@srd.local";
pub const DEFAULT_ADMIN_PASSWORD: &str = "ChangeMe123!";
const DEFAULT_ADMIN_NAME: &str = "Admin";

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    Hash(argon2::password_hash::Error),
}

/// What [`reset_or_create_admin`] did.
#[derive(Debug)]
pub enum AdminReset {
    PasswordReset(User),
    Created(User),
}

/// Create the default admin if the users table is empty.
///
/// Returns the new account, or `None` when any user already exists.
pub async fn ensure_default_admin(pool: &DbPool) -> Result<Option<User>, BootstrapError> {
    if UserRepo::count(pool).await? > 0 {
        return Ok(None);
    }

    let admin = create_default_admin(pool).await?;
    tracing::warn!(
        email = DEFAULT_ADMIN_EMAIL,
        "Created default admin with the default password; change it after first login"
    );
    Ok(Some(admin))
}

/// Reset the default admin's password to the default, creating the account
/// if it does not exist. The account is also reactivated.
pub async fn reset_or_create_admin(pool: &DbPool) -> Result<AdminReset, BootstrapError> {
    let Some(existing) = UserRepo::find_by_email(pool, DEFAULT_ADMIN_EMAIL).await? else {
        return Ok(AdminReset::Created(create_default_admin(pool).await?));
    };

    let password_hash = hash_password(DEFAULT_ADMIN_PASSWORD).map_err(BootstrapError::Hash)?;
    UserRepo::update_password(pool, existing.id, &password_hash).await?;
    if !existing.is_active {
        UserRepo::toggle_active(pool, existing.id).await?;
    }

    let user = UserRepo::find_by_id(pool, existing.id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    Ok(AdminReset::PasswordReset(user))
}

async fn create_default_admin(pool: &DbPool) -> Result<User, BootstrapError> {
    let password_hash = hash_password(DEFAULT_ADMIN_PASSWORD).map_err(BootstrapError::Hash)?;
    let admin = UserRepo::create(
        pool,
        &CreateUser {
            email: DEFAULT_ADMIN_EMAIL.to_string(),
            name: DEFAULT_ADMIN_NAME.to_string(),
            password_hash,
            role: ROLE_ADMIN.to_string(),
        },
    )
    .await?;
    Ok(admin)
}
