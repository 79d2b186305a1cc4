use sqlx::FromRow;

pub type MealId = i64;

/// Recipe owned by exactly one meal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub types: Vec<i32>,
    pub difficulty: i32,
    pub cooking_time: i32,
    pub is_vegetarian: bool,
    pub servings: i32,
    pub ingredients: String,
    pub directions: String,
}

/// Persisted meal. `filename` names both the photo and the thumbnail file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meal {
    pub id: MealId,
    pub name: String,
    pub filename: String,
    pub photo_url: String,
    pub thumbnail_url: String,
    pub recipe: Option<Recipe>,
}

/// Meal not yet persisted; the repository assigns the id.
#[derive(Debug, Clone)]
pub struct NewMeal {
    pub name: String,
    pub filename: String,
    pub photo_url: String,
    pub thumbnail_url: String,
    pub recipe: Option<Recipe>,
}

impl NewMeal {
    pub fn with_id(self, id: MealId) -> Meal {
        Meal {
            id,
            name: self.name,
            filename: self.filename,
            photo_url: self.photo_url,
            thumbnail_url: self.thumbnail_url,
            recipe: self.recipe,
        }
    }
}

/// `meals LEFT JOIN recipes` row.
#[derive(Debug, FromRow)]
pub struct MealRow {
    pub id: i64,
    pub name: String,
    pub filename: String,
    pub photo_url: String,
    pub thumbnail_url: String,
    pub recipe_meal_id: Option<i64>,
    pub types: Option<Vec<i32>>,
    pub difficulty: Option<i32>,
    pub cooking_time: Option<i32>,
    pub is_vegetarian: Option<bool>,
    pub servings: Option<i32>,
    pub ingredients: Option<String>,
    pub directions: Option<String>,
}

impl From<MealRow> for Meal {
    fn from(r: MealRow) -> Self {
        let recipe = r.recipe_meal_id.map(|_| Recipe {
            types: r.types.unwrap_or_default(),
            difficulty: r.difficulty.unwrap_or_default(),
            cooking_time: r.cooking_time.unwrap_or_default(),
            is_vegetarian: r.is_vegetarian.unwrap_or_default(),
            servings: r.servings.unwrap_or_default(),
            ingredients: r.ingredients.unwrap_or_default(),
            directions: r.directions.unwrap_or_default(),
        });
        Self {
            id: r.id,
            name: r.name,
            filename: r.filename,
            photo_url: r.photo_url,
            thumbnail_url: r.thumbnail_url,
            recipe,
        }
    }
}
