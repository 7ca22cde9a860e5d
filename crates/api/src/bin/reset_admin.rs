//! Reset `admin@srd.local` to the default password, creating it if missing.
//!
//! Reads `DATABASE_URL` (default `sqlite://srd_users.db?mode=rwc`) and
//! applies pending migrations first.

use srd_api::bootstrap::{self, AdminReset, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reset_admin=info,srd_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://srd_users.db?mode=rwc".into());

    let pool = srd_db::create_pool(&database_url)
        .await
        .expect("Failed to open database");
    srd_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    match bootstrap::reset_or_create_admin(&pool).await {
        Ok(AdminReset::PasswordReset(user)) => tracing::info!(
            user_id = user.id,
            email = DEFAULT_ADMIN_EMAIL,
            "Reset admin password to {DEFAULT_ADMIN_PASSWORD}"
        ),
        Ok(AdminReset::Created(user)) => tracing::info!(
            user_id = user.id,
            email = DEFAULT_ADMIN_EMAIL,
            "Created admin with password {DEFAULT_ADMIN_PASSWORD}"
        ),
        Err(e) => {
            tracing::error!(error = %e, "Admin reset failed");
            std::process::exit(1);
        }
    }
}
