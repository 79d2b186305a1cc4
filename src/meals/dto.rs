use serde::{Deserialize, Deserializer, Serialize};

use super::repo_types::{Meal, MealId, Recipe};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecipeBody {
    pub types: Vec<i32>,
    pub difficulty: i32,
    pub cooking_time: i32,
    pub is_vegetarian: bool,
    pub servings: i32,
    pub ingredients: String,
    pub directions: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecipePatchBody {
    pub types: Option<Vec<i32>>,
    pub difficulty: Option<i32>,
    pub cooking_time: Option<i32>,
    pub is_vegetarian: Option<bool>,
    pub servings: Option<i32>,
    pub ingredients: Option<String>,
    pub directions: Option<String>,
}

/// POST /meals
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMealRequest {
    pub name: String,
    pub photo: String,
    #[serde(default)]
    pub recipe: Option<RecipeBody>,
}

/// PATCH /meals/:id. Photo fields are not accepted here.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMealRequest {
    #[serde(default)]
    pub name: Option<String>,
    /// Absent: keep. `null`: remove. Object: merge.
    #[serde(default, deserialize_with = "present")]
    pub recipe: Option<Option<RecipePatchBody>>,
}

/// PUT /meals/:id/photo
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePhotoRequest {
    pub photo: String,
}

// Only runs when the key is present, so `null` becomes `Some(None)`.
fn present<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResponse {
    pub types: Vec<i32>,
    pub difficulty: i32,
    pub cooking_time: i32,
    pub is_vegetarian: bool,
    pub servings: i32,
    pub ingredients: String,
    pub directions: String,
}

#[derive(Debug, Serialize)]
pub struct MealResponse {
    pub id: MealId,
    pub name: String,
    pub filename: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    #[serde(rename = "thumbnailURL")]
    pub thumbnail_url: String,
    pub recipe: Option<RecipeResponse>,
}

impl From<Recipe> for RecipeResponse {
    fn from(r: Recipe) -> Self {
        Self {
            types: r.types,
            difficulty: r.difficulty,
            cooking_time: r.cooking_time,
            is_vegetarian: r.is_vegetarian,
            servings: r.servings,
            ingredients: r.ingredients,
            directions: r.directions,
        }
    }
}

impl From<Meal> for MealResponse {
    fn from(m: Meal) -> Self {
        Self {
            id: m.id,
            name: m.name,
            filename: m.filename,
            photo_url: m.photo_url,
            thumbnail_url: m.thumbnail_url,
            recipe: m.recipe.map(RecipeResponse::from),
        }
    }
}
