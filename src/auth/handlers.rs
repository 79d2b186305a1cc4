use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, TokenResponse},
        services::{verify_password, JwtKeys},
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth", post(login))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, (StatusCode, String)> {
    let ok = match verify_password(&payload.password, &state.config.admin_password_hash) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "verify_password failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    if !ok {
        warn!("login invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Password is invalid".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign().map_err(|e| {
        error!(error = %e, "jwt sign failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    info!("admin logged in");
    Ok(Json(TokenResponse { token }))
}
