use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;

use super::repo_types::{Meal, MealId, MealRow, NewMeal, Recipe};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("meal {0} not found")]
    NotFound(MealId),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Meal persistence. Every write that carries a recipe commits meal and recipe together.
#[async_trait]
pub trait MealRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Meal>, RepoError>;
    async fn get_by_id(&self, id: MealId) -> Result<Meal, RepoError>;
    async fn create(&self, meal: NewMeal) -> Result<Meal, RepoError>;
    /// Stores every field of `meal`. `recipe: None` removes a stored recipe.
    async fn update(&self, meal: &Meal) -> Result<Meal, RepoError>;
    /// Removes the meal and its recipe.
    async fn delete(&self, meal: &Meal) -> Result<(), RepoError>;
}

const SELECT_MEALS: &str = r#"
    SELECT m.id, m.name, m.filename, m.photo_url, m.thumbnail_url,
           r.meal_id AS recipe_meal_id, r.types, r.difficulty, r.cooking_time,
           r.is_vegetarian, r.servings, r.ingredients, r.directions
      FROM meals m
      LEFT JOIN recipes r ON r.meal_id = m.id
"#;

#[derive(Clone)]
pub struct PgMealRepository {
    db: PgPool,
}

impl PgMealRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

async fn upsert_recipe_tx(
    tx: &mut Transaction<'_, Postgres>,
    meal_id: MealId,
    recipe: &Recipe,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO recipes (meal_id, types, difficulty, cooking_time, is_vegetarian,
                             servings, ingredients, directions)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (meal_id) DO UPDATE
           SET types = EXCLUDED.types,
               difficulty = EXCLUDED.difficulty,
               cooking_time = EXCLUDED.cooking_time,
               is_vegetarian = EXCLUDED.is_vegetarian,
               servings = EXCLUDED.servings,
               ingredients = EXCLUDED.ingredients,
               directions = EXCLUDED.directions
        "#,
    )
    .bind(meal_id)
    .bind(&recipe.types)
    .bind(recipe.difficulty)
    .bind(recipe.cooking_time)
    .bind(recipe.is_vegetarian)
    .bind(recipe.servings)
    .bind(&recipe.ingredients)
    .bind(&recipe.directions)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn delete_recipe_tx(
    tx: &mut Transaction<'_, Postgres>,
    meal_id: MealId,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM recipes WHERE meal_id = $1")
        .bind(meal_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[async_trait]
impl MealRepository for PgMealRepository {
    async fn list_all(&self) -> Result<Vec<Meal>, RepoError> {
        let sql = format!("{SELECT_MEALS} ORDER BY m.id ASC");
        let rows = sqlx::query_as::<_, MealRow>(&sql)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Meal::from).collect())
    }

    async fn get_by_id(&self, id: MealId) -> Result<Meal, RepoError> {
        let sql = format!("{SELECT_MEALS} WHERE m.id = $1");
        let row = sqlx::query_as::<_, MealRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        row.map(Meal::from).ok_or(RepoError::NotFound(id))
    }

    async fn create(&self, meal: NewMeal) -> Result<Meal, RepoError> {
        let mut tx = self.db.begin().await?;
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO meals (name, filename, photo_url, thumbnail_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&meal.name)
        .bind(&meal.filename)
        .bind(&meal.photo_url)
        .bind(&meal.thumbnail_url)
        .fetch_one(&mut *tx)
        .await?;
        if let Some(recipe) = &meal.recipe {
            upsert_recipe_tx(&mut tx, id, recipe).await?;
        }
        tx.commit().await?;
        Ok(meal.with_id(id))
    }

    async fn update(&self, meal: &Meal) -> Result<Meal, RepoError> {
        let mut tx = self.db.begin().await?;
        let done = sqlx::query(
            r#"
            UPDATE meals
               SET name = $2, filename = $3, photo_url = $4, thumbnail_url = $5,
                   updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(meal.id)
        .bind(&meal.name)
        .bind(&meal.filename)
        .bind(&meal.photo_url)
        .bind(&meal.thumbnail_url)
        .execute(&mut *tx)
        .await?;
        if done.rows_affected() == 0 {
            return Err(RepoError::NotFound(meal.id));
        }
        match &meal.recipe {
            Some(recipe) => upsert_recipe_tx(&mut tx, meal.id, recipe).await?,
            None => delete_recipe_tx(&mut tx, meal.id).await?,
        }
        tx.commit().await?;
        Ok(meal.clone())
    }

    async fn delete(&self, meal: &Meal) -> Result<(), RepoError> {
        let mut tx = self.db.begin().await?;
        delete_recipe_tx(&mut tx, meal.id).await?;
        let done = sqlx::query("DELETE FROM meals WHERE id = $1")
            .bind(meal.id)
            .execute(&mut *tx)
            .await?;
        if done.rows_affected() == 0 {
            return Err(RepoError::NotFound(meal.id));
        }
        tx.commit().await?;
        Ok(())
    }
}
