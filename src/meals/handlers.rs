use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, patch, post, put},
    Json, Router,
};
use tracing::{error, instrument, warn};

use super::dto::{CreateMealRequest, MealResponse, UpdateMealRequest, UpdatePhotoRequest};
use super::repo_types::MealId;
use super::validation::ValidationError;
use crate::{auth::services::AdminSession, error::MealError, state::AppState};

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals))
        .route("/meals/:id", get(get_meal))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", post(create_meal))
        .route("/meals/:id", patch(update_meal).delete(delete_meal))
        .route("/meals/:id/photo", put(update_photo))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

// --- handlers ---

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
) -> Result<Json<Vec<MealResponse>>, (StatusCode, String)> {
    let meals = state.meals.list().await.map_err(reject)?;
    Ok(Json(meals.into_iter().map(MealResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    Path(id): Path<MealId>,
) -> Result<Json<MealResponse>, (StatusCode, String)> {
    let meal = state.meals.get(id).await.map_err(reject)?;
    Ok(Json(meal.into()))
}

/// POST /meals { name, photo: "data:image/jpeg;base64,...", recipe? }
#[instrument(skip(state, session, body), fields(session = %session.0))]
pub async fn create_meal(
    State(state): State<AppState>,
    session: AdminSession,
    Json(body): Json<CreateMealRequest>,
) -> Result<(StatusCode, HeaderMap, Json<MealResponse>), (StatusCode, String)> {
    let cmd = body.validate().map_err(bad_request)?;
    let meal = state
        .meals
        .detached(move |meals| async move { meals.create(cmd).await })
        .await
        .map_err(reject)?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/meals/{}", meal.id).parse() {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(meal.into())))
}

/// PATCH /meals/:id { name?, recipe?: {..} | null }
#[instrument(skip(state, session, body), fields(session = %session.0))]
pub async fn update_meal(
    State(state): State<AppState>,
    session: AdminSession,
    Path(id): Path<MealId>,
    Json(body): Json<UpdateMealRequest>,
) -> Result<Json<MealResponse>, (StatusCode, String)> {
    let cmd = body.validate().map_err(bad_request)?;
    let meal = state
        .meals
        .detached(move |meals| async move { meals.update_meta(id, cmd).await })
        .await
        .map_err(reject)?;
    Ok(Json(meal.into()))
}

/// PUT /meals/:id/photo { photo }
#[instrument(skip(state, session, body), fields(session = %session.0))]
pub async fn update_photo(
    State(state): State<AppState>,
    session: AdminSession,
    Path(id): Path<MealId>,
    Json(body): Json<UpdatePhotoRequest>,
) -> Result<Json<MealResponse>, (StatusCode, String)> {
    let cmd = body.validate().map_err(bad_request)?;
    let meal = state
        .meals
        .detached(move |meals| async move { meals.update_photo(id, cmd).await })
        .await
        .map_err(reject)?;
    Ok(Json(meal.into()))
}

#[instrument(skip(state, session), fields(session = %session.0))]
pub async fn delete_meal(
    State(state): State<AppState>,
    session: AdminSession,
    Path(id): Path<MealId>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .meals
        .detached(move |meals| async move { meals.delete(id).await })
        .await
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

fn bad_request(e: ValidationError) -> (StatusCode, String) {
    warn!(error = %e, "request rejected");
    (StatusCode::BAD_REQUEST, e.to_string())
}

fn reject(e: MealError) -> (StatusCode, String) {
    let status = e.status();
    if status.is_server_error() {
        // Internals stay in the log.
        error!(error = %e, "meal operation failed");
        (status, "Internal server error".into())
    } else {
        (status, e.to_string())
    }
}
