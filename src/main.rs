mod app;
mod articles;
mod auth;
mod config;
mod error;
mod profiles;
mod state;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "conduit=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;

    if let Err(e) = sqlx::migrate!("./migrations").run(&app_state.db).await {
        tracing::warn!(error = %e, "migrations folder not found or migration failed; continuing");
    }

    bootstrap_admin(&app_state).await;

    let app = app::build_app(app_state);
    app::serve(app).await
}

/// Create the staff account on first boot when the admin env vars are set.
/// A rerun reports "already exists" validation errors, which is fine.
async fn bootstrap_admin(state: &AppState) {
    let (Ok(username), Ok(email), Ok(password)) = (
        std::env::var("ADMIN_USERNAME"),
        std::env::var("ADMIN_EMAIL"),
        std::env::var("ADMIN_PASSWORD"),
    ) else {
        return;
    };

    match auth::services::create_superuser(&state.db, &username, &email, &password).await {
        Ok(user) => tracing::info!(user_id = %user.id, "admin account ready"),
        Err(e) => tracing::warn!(error = %e, "admin bootstrap skipped"),
    }
}
