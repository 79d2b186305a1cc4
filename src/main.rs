mod app;
mod auth;
mod config;
mod error;
mod images;
mod meals;
mod state;
mod storage;
#[cfg(test)]
mod test_support;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // `mealbox hash-password <password>` prints a value for ADMIN_PASSWORD_HASH.
    let mut args = std::env::args().skip(1);
    if args.next().as_deref() == Some("hash-password") {
        let password = args
            .next()
            .ok_or_else(|| anyhow::anyhow!("usage: mealbox hash-password <password>"))?;
        println!("{}", auth::services::hash_password(&password)?);
        return Ok(());
    }

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "mealbox=debug,axum=info,tower_http=info".to_string());
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

    let (app_state, db) = AppState::init(AppConfig::from_env()?).await?;

    sqlx::migrate!("./migrations").run(&db).await?;

    let app = app::build_app(app_state);
    app::serve(app).await
}
