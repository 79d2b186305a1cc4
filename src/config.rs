use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub photos_dir: PathBuf,
    pub thumbnails_dir: PathBuf,
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// Argon2 PHC string of the admin password.
    pub admin_password_hash: String,
    pub storage: StorageConfig,
}

fn required(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("{name} must be set"))
}

fn or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = required("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: or_default("JWT_ISSUER", "mealbox"),
            audience: or_default("JWT_AUDIENCE", "mealbox-admin"),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(180),
        };
        let storage = StorageConfig {
            photos_dir: or_default("PHOTOS_DIR", "./static/photos").into(),
            thumbnails_dir: or_default("THUMBNAILS_DIR", "./static/thumbnails").into(),
            public_base_url: or_default("PUBLIC_BASE_URL", "http://localhost:8080"),
        };
        Ok(Self {
            database_url,
            jwt,
            admin_password_hash: required("ADMIN_PASSWORD_HASH")?,
            storage,
        })
    }
}
