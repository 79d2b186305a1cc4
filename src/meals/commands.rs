//! Validated commands consumed by [`MealService`](super::services::MealService).

use super::repo_types::Recipe;
use crate::error::MealError;

#[derive(Debug, Clone)]
pub struct CreateMeal {
    pub name: String,
    /// Data-URI JPEG, decoded by the image pipeline.
    pub photo: String,
    pub recipe: Option<Recipe>,
}

#[derive(Debug, Clone)]
pub struct UpdatePhoto {
    pub photo: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateMeta {
    pub name: Option<String>,
    pub recipe: RecipeChange,
}

/// What an `UpdateMeta` does to the meal's recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RecipeChange {
    /// Key absent from the request: leave the recipe as it is.
    #[default]
    Keep,
    /// Explicit `null`: detach and delete the recipe.
    Remove,
    Merge(RecipePatch),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipePatch {
    pub types: Option<Vec<i32>>,
    pub difficulty: Option<i32>,
    pub cooking_time: Option<i32>,
    pub is_vegetarian: Option<bool>,
    pub servings: Option<i32>,
    pub ingredients: Option<String>,
    pub directions: Option<String>,
}

impl RecipePatch {
    /// Overlays the present fields on `base`.
    pub fn merge_into(self, mut base: Recipe) -> Recipe {
        if let Some(v) = self.types {
            base.types = v;
        }
        if let Some(v) = self.difficulty {
            base.difficulty = v;
        }
        if let Some(v) = self.cooking_time {
            base.cooking_time = v;
        }
        if let Some(v) = self.is_vegetarian {
            base.is_vegetarian = v;
        }
        if let Some(v) = self.servings {
            base.servings = v;
        }
        if let Some(v) = self.ingredients {
            base.ingredients = v;
        }
        if let Some(v) = self.directions {
            base.directions = v;
        }
        base
    }

    /// Builds a fresh recipe; every field must be present.
    pub fn into_recipe(self) -> Result<Recipe, MealError> {
        Ok(Recipe {
            types: self.types.ok_or(MealError::IncompleteRecipe("types"))?,
            difficulty: self
                .difficulty
                .ok_or(MealError::IncompleteRecipe("difficulty"))?,
            cooking_time: self
                .cooking_time
                .ok_or(MealError::IncompleteRecipe("cookingTime"))?,
            is_vegetarian: self
                .is_vegetarian
                .ok_or(MealError::IncompleteRecipe("isVegetarian"))?,
            servings: self.servings.ok_or(MealError::IncompleteRecipe("servings"))?,
            ingredients: self
                .ingredients
                .ok_or(MealError::IncompleteRecipe("ingredients"))?,
            directions: self
                .directions
                .ok_or(MealError::IncompleteRecipe("directions"))?,
        })
    }
}

impl RecipeChange {
    pub fn apply(self, current: Option<Recipe>) -> Result<Option<Recipe>, MealError> {
        match (self, current) {
            (RecipeChange::Keep, current) => Ok(current),
            (RecipeChange::Remove, _) => Ok(None),
            (RecipeChange::Merge(patch), Some(existing)) => Ok(Some(patch.merge_into(existing))),
            (RecipeChange::Merge(patch), None) => patch.into_recipe().map(Some),
        }
    }
}
