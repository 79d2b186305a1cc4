use std::future::Future;
use std::sync::Arc;

use rand::{distributions::Alphanumeric, Rng};
use tracing::{error, info, instrument, warn, Instrument};

use super::commands::{CreateMeal, UpdateMeta, UpdatePhoto};
use super::locks::KeyedLocks;
use super::repo::MealRepository;
use super::repo_types::{Meal, MealId, NewMeal};
use super::saga::{discard, CleanupReporter, Operation, Saga};
use crate::error::MealError;
use crate::images::{derive_blocking, DerivedAsset};
use crate::storage::{FileStore, PublicUrls, Root, StorageError};

pub const FILENAME_EXTENSION: &str = "jpeg";
const FILENAME_TOKEN_LEN: usize = 32;
const FILENAME_ATTEMPTS: usize = 3;

pub fn generate_filename() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(FILENAME_TOKEN_LEN)
        .map(char::from)
        .collect();
    format!("{token}.{FILENAME_EXTENSION}")
}

/// Keeps meal rows and their photo/thumbnail files consistent.
///
/// Creation and photo replacement write files before the row, so a readable row
/// always points at existing files. Deletion removes the row before the files.
/// A failed row write undoes the files it wrote; cleanup of files that are no
/// longer referenced is best effort and goes to the [`CleanupReporter`].
pub struct MealService {
    repo: Arc<dyn MealRepository>,
    files: Arc<dyn FileStore>,
    urls: PublicUrls,
    reporter: Arc<dyn CleanupReporter>,
    locks: KeyedLocks,
}

impl MealService {
    pub fn new(
        repo: Arc<dyn MealRepository>,
        files: Arc<dyn FileStore>,
        urls: PublicUrls,
        reporter: Arc<dyn CleanupReporter>,
    ) -> Self {
        Self {
            repo,
            files,
            urls,
            reporter,
            locks: KeyedLocks::default(),
        }
    }

    /// Runs `op` on its own task. Dropping the returned future does not stop
    /// the operation; it still commits or compensates.
    pub async fn detached<T, F, Fut>(self: &Arc<Self>, op: F) -> Result<T, MealError>
    where
        F: FnOnce(Arc<Self>) -> Fut + Send,
        Fut: Future<Output = Result<T, MealError>> + Send + 'static,
        T: Send + 'static,
    {
        let task = tokio::spawn(op(Arc::clone(self)).in_current_span());
        task.await.map_err(|e| {
            error!(error = %e, "meal task did not finish");
            MealError::Internal(e.to_string())
        })?
    }

    pub async fn list(&self) -> Result<Vec<Meal>, MealError> {
        Ok(self.repo.list_all().await?)
    }

    pub async fn get(&self, id: MealId) -> Result<Meal, MealError> {
        Ok(self.repo.get_by_id(id).await?)
    }

    #[instrument(skip(self, cmd), fields(name = %cmd.name))]
    pub async fn create(&self, cmd: CreateMeal) -> Result<Meal, MealError> {
        let asset = derive_blocking(cmd.photo).await?;
        let filename = self.fresh_filename().await?;

        let mut saga = Saga::new(Operation::Create);
        if let Err(e) = self.write_asset(&filename, asset, &mut saga).await {
            saga.compensate(&*self.files, &*self.reporter).await;
            return Err(e);
        }

        let new_meal = NewMeal {
            name: cmd.name,
            photo_url: self.urls.photo(&filename),
            thumbnail_url: self.urls.thumbnail(&filename),
            filename,
            recipe: cmd.recipe,
        };
        match self.repo.create(new_meal).await {
            Ok(meal) => {
                saga.commit();
                info!(id = meal.id, filename = %meal.filename, "meal created");
                Ok(meal)
            }
            Err(e) => {
                error!(error = %e, "meal insert failed");
                saga.compensate(&*self.files, &*self.reporter).await;
                Err(e.into())
            }
        }
    }

    /// Changes name and recipe. Never touches files or the filename.
    #[instrument(skip(self, cmd))]
    pub async fn update_meta(&self, id: MealId, cmd: UpdateMeta) -> Result<Meal, MealError> {
        let _guard = self.locks.acquire(id).await;
        let mut meal = self.repo.get_by_id(id).await?;
        if let Some(name) = cmd.name {
            meal.name = name;
        }
        meal.recipe = cmd.recipe.apply(meal.recipe.take())?;
        let meal = self.repo.update(&meal).await?;
        info!(id, "meal updated");
        Ok(meal)
    }

    #[instrument(skip(self, cmd))]
    pub async fn update_photo(&self, id: MealId, cmd: UpdatePhoto) -> Result<Meal, MealError> {
        let _guard = self.locks.acquire(id).await;
        let current = self.repo.get_by_id(id).await?;
        let asset = derive_blocking(cmd.photo).await?;
        let filename = self.fresh_filename().await?;

        let mut saga = Saga::new(Operation::UpdatePhoto);
        if let Err(e) = self.write_asset(&filename, asset, &mut saga).await {
            saga.compensate(&*self.files, &*self.reporter).await;
            return Err(e);
        }

        let replaced = Meal {
            photo_url: self.urls.photo(&filename),
            thumbnail_url: self.urls.thumbnail(&filename),
            filename,
            ..current.clone()
        };
        let meal = match self.repo.update(&replaced).await {
            Ok(meal) => meal,
            Err(e) => {
                error!(error = %e, id, "photo swap not persisted");
                saga.compensate(&*self.files, &*self.reporter).await;
                return Err(e.into());
            }
        };
        saga.commit();
        discard(
            &*self.files,
            &*self.reporter,
            Operation::UpdatePhoto,
            &current.filename,
        )
        .await;
        info!(id, old = %current.filename, new = %meal.filename, "meal photo replaced");
        Ok(meal)
    }

    /// Removes the meal and its recipe, then its files.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: MealId) -> Result<(), MealError> {
        let _guard = self.locks.acquire(id).await;
        let meal = self.repo.get_by_id(id).await?;
        self.repo.delete(&meal).await?;
        discard(&*self.files, &*self.reporter, Operation::Delete, &meal.filename).await;
        info!(id, filename = %meal.filename, "meal deleted");
        Ok(())
    }

    /// Writes the original, then the thumbnail, recording each success in `saga`.
    async fn write_asset(
        &self,
        filename: &str,
        asset: DerivedAsset,
        saga: &mut Saga,
    ) -> Result<(), MealError> {
        for (root, body) in [
            (Root::Photos, asset.original),
            (Root::Thumbnails, asset.thumbnail),
        ] {
            if let Err(e) = self.files.write(root, filename, body).await {
                error!(error = %e, %root, filename, "file write failed");
                return Err(e.into());
            }
            saga.record(root, filename);
        }
        Ok(())
    }

    /// A filename free in both roots.
    async fn fresh_filename(&self) -> Result<String, MealError> {
        for _ in 0..FILENAME_ATTEMPTS {
            let candidate = generate_filename();
            let mut taken = false;
            for root in Root::ALL {
                if self.files.exists(root, &candidate).await? {
                    taken = true;
                    break;
                }
            }
            if !taken {
                return Ok(candidate);
            }
            warn!(filename = %candidate, "generated filename already taken");
        }
        Err(StorageError::NoFreeName(FILENAME_ATTEMPTS).into())
    }
}
