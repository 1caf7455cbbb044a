use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::models::{user::hash_password, User};
use crate::store;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

// POST /api/signup
#[derive(Debug, Deserialize)]
struct SignupRequest {
    username: String,
    email: String,
    password: String,
}

async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.username.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "username, email and password are required".to_string(),
        ));
    }

    let mut users = state.store.load_users().await;
    if users.iter().any(|u| u.email == req.email) {
        return Err((
            StatusCode::CONFLICT,
            "An account with this email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!("password hashing failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Signup failed, please retry".to_string(),
        )
    })?;

    let user = User {
        id: store::next_user_id(&users),
        username: req.username.trim().to_string(),
        email: req.email.trim().to_string(),
        password_hash,
    };
    let user_id = user.id;
    users.push(user);

    if let Err(e) = state.store.save_users(&users).await {
        tracing::error!("failed to save users: {}", e);
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Signup failed, please retry".to_string(),
        ));
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Account created, you can now log in",
            "user": { "id": user_id }
        })),
    ))
}

// POST /api/login
#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let users = state.store.load_users().await;
    let user = users
        .iter()
        .find(|u| u.email == req.email)
        .filter(|u| u.verify_password(&req.password))
        .ok_or((
            StatusCode::UNAUTHORIZED,
            "Invalid email or password".to_string(),
        ))?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Logged in",
            "user": {
                "id": user.id,
                "username": user.username,
                "email": user.email
            }
        })),
    ))
}

// POST /api/logout
//
// Authentication is per-request Basic auth, so there is no server-side
// session to tear down; the client simply drops its credentials.
async fn logout() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "success": true, "message": "Logged out" })),
    )
}
