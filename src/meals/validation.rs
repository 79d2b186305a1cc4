use thiserror::Error;

use super::commands::{CreateMeal, RecipeChange, RecipePatch, UpdateMeta, UpdatePhoto};
use super::dto::{
    CreateMealRequest, RecipeBody, RecipePatchBody, UpdateMealRequest, UpdatePhotoRequest,
};
use super::repo_types::Recipe;

pub const NAME_LEN: (usize, usize) = (1, 100);
pub const TYPE_CODE: (i32, i32) = (0, 15);
pub const DIFFICULTY: (i32, i32) = (1, 5);
pub const COOKING_TIME: (i32, i32) = (1, 1440);
pub const SERVINGS: (i32, i32) = (0, 100);
pub const TEXT_MAX: usize = 10_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name must be between {min} and {max} characters")]
    NameLength { min: usize, max: usize },
    #[error("photo must not be empty")]
    EmptyPhoto,
    #[error("recipe types must not be empty")]
    EmptyTypes,
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i32,
        max: i32,
        value: i32,
    },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

fn name(raw: String) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    let (min, max) = NAME_LEN;
    if len < min || len > max {
        return Err(ValidationError::NameLength { min, max });
    }
    Ok(trimmed.to_string())
}

fn photo(raw: String) -> Result<String, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::EmptyPhoto);
    }
    Ok(raw)
}

fn in_range(field: &'static str, value: i32, (min, max): (i32, i32)) -> Result<i32, ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            value,
        });
    }
    Ok(value)
}

fn text(field: &'static str, value: String) -> Result<String, ValidationError> {
    if value.chars().count() > TEXT_MAX {
        return Err(ValidationError::TooLong {
            field,
            max: TEXT_MAX,
        });
    }
    Ok(value)
}

/// Non-empty set of category codes, sorted and deduplicated.
fn types(mut codes: Vec<i32>) -> Result<Vec<i32>, ValidationError> {
    if codes.is_empty() {
        return Err(ValidationError::EmptyTypes);
    }
    for &code in &codes {
        in_range("types", code, TYPE_CODE)?;
    }
    codes.sort_unstable();
    codes.dedup();
    Ok(codes)
}

impl RecipeBody {
    pub fn validate(self) -> Result<Recipe, ValidationError> {
        Ok(Recipe {
            types: types(self.types)?,
            difficulty: in_range("difficulty", self.difficulty, DIFFICULTY)?,
            cooking_time: in_range("cookingTime", self.cooking_time, COOKING_TIME)?,
            is_vegetarian: self.is_vegetarian,
            servings: in_range("servings", self.servings, SERVINGS)?,
            ingredients: text("ingredients", self.ingredients)?,
            directions: text("directions", self.directions)?,
        })
    }
}

impl RecipePatchBody {
    pub fn validate(self) -> Result<RecipePatch, ValidationError> {
        Ok(RecipePatch {
            types: self.types.map(types).transpose()?,
            difficulty: self
                .difficulty
                .map(|v| in_range("difficulty", v, DIFFICULTY))
                .transpose()?,
            cooking_time: self
                .cooking_time
                .map(|v| in_range("cookingTime", v, COOKING_TIME))
                .transpose()?,
            is_vegetarian: self.is_vegetarian,
            servings: self
                .servings
                .map(|v| in_range("servings", v, SERVINGS))
                .transpose()?,
            ingredients: self
                .ingredients
                .map(|v| text("ingredients", v))
                .transpose()?,
            directions: self
                .directions
                .map(|v| text("directions", v))
                .transpose()?,
        })
    }
}

impl CreateMealRequest {
    pub fn validate(self) -> Result<CreateMeal, ValidationError> {
        Ok(CreateMeal {
            name: name(self.name)?,
            photo: photo(self.photo)?,
            recipe: self.recipe.map(RecipeBody::validate).transpose()?,
        })
    }
}

impl UpdateMealRequest {
    pub fn validate(self) -> Result<UpdateMeta, ValidationError> {
        let recipe = match self.recipe {
            None => RecipeChange::Keep,
            Some(None) => RecipeChange::Remove,
            Some(Some(patch)) => RecipeChange::Merge(patch.validate()?),
        };
        Ok(UpdateMeta {
            name: self.name.map(name).transpose()?,
            recipe,
        })
    }
}

impl UpdatePhotoRequest {
    pub fn validate(self) -> Result<UpdatePhoto, ValidationError> {
        Ok(UpdatePhoto {
            photo: photo(self.photo)?,
        })
    }
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    fn recipe_body() -> RecipeBody {
        RecipeBody {
            types: vec![3, 1, 3],
            difficulty: 2,
            cooking_time: 20,
            is_vegetarian: true,
            servings: 2,
            ingredients: "tomato".into(),
            directions: "slice".into(),
        }
    }

    #[test]
    fn empty_name_is_rejected() {
        let req = CreateMealRequest {
            name: "".into(),
            photo: "data:image/jpeg;base64,AA==".into(),
            recipe: None,
        };
        assert_eq!(
            req.validate().unwrap_err(),
            ValidationError::NameLength { min: 1, max: 100 }
        );

        let blank = CreateMealRequest {
            name: "   ".into(),
            photo: "x".into(),
            recipe: None,
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn name_is_trimmed_and_types_deduplicated() {
        let cmd = CreateMealRequest {
            name: "  Salade ".into(),
            photo: "x".into(),
            recipe: Some(recipe_body()),
        }
        .validate()
        .unwrap();
        assert_eq!(cmd.name, "Salade");
        assert_eq!(cmd.recipe.unwrap().types, vec![1, 3]);
    }

    #[test]
    fn recipe_bounds_are_enforced() {
        let mut body = recipe_body();
        body.types = vec![];
        assert_eq!(body.validate().unwrap_err(), ValidationError::EmptyTypes);

        let mut body = recipe_body();
        body.difficulty = 9;
        assert!(matches!(
            body.validate().unwrap_err(),
            ValidationError::OutOfRange { field: "difficulty", value: 9, .. }
        ));

        let mut body = recipe_body();
        body.servings = -1;
        assert!(matches!(
            body.validate().unwrap_err(),
            ValidationError::OutOfRange { field: "servings", .. }
        ));

        let mut body = recipe_body();
        body.directions = "x".repeat(TEXT_MAX + 1);
        assert!(matches!(
            body.validate().unwrap_err(),
            ValidationError::TooLong { field: "directions", .. }
        ));
    }

    #[test]
    fn update_maps_recipe_key_to_change() {
        let keep = UpdateMealRequest::default().validate().unwrap();
        assert_eq!(keep.recipe, RecipeChange::Keep);

        let remove = UpdateMealRequest {
            name: None,
            recipe: Some(None),
        }
        .validate()
        .unwrap();
        assert_eq!(remove.recipe, RecipeChange::Remove);

        let bad = UpdateMealRequest {
            name: None,
            recipe: Some(Some(RecipePatchBody {
                cooking_time: Some(0),
                ..Default::default()
            })),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn empty_photo_is_rejected() {
        let req = UpdatePhotoRequest { photo: " ".into() };
        assert_eq!(req.validate().unwrap_err(), ValidationError::EmptyPhoto);
    }
}
