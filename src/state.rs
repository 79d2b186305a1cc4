use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::meals::repo::PgMealRepository;
use crate::meals::saga::TracingReporter;
use crate::meals::services::MealService;
use crate::storage::{LocalFileStore, PublicUrls};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub meals: Arc<MealService>,
}

impl AppState {
    /// Connects to Postgres and wires the meal service over the configured roots.
    pub async fn init(config: AppConfig) -> anyhow::Result<(Self, PgPool)> {
        let config = Arc::new(config);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let storage = &config.storage;
        for dir in [&storage.photos_dir, &storage.thumbnails_dir] {
            if !dir.is_dir() {
                tracing::warn!(dir = %dir.display(), "storage root does not exist; uploads will fail");
            }
        }

        let meals = Arc::new(MealService::new(
            Arc::new(PgMealRepository::new(db.clone())),
            Arc::new(LocalFileStore::new(
                storage.photos_dir.clone(),
                storage.thumbnails_dir.clone(),
            )),
            PublicUrls::new(&storage.public_base_url),
            Arc::new(TracingReporter),
        ));

        Ok((Self::from_parts(config, meals), db))
    }

    pub fn from_parts(config: Arc<AppConfig>, meals: Arc<MealService>) -> Self {
        Self { config, meals }
    }
}
