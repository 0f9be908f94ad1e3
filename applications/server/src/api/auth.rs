/// Authentication API routes
use crate::{
    error::Result,
    middleware::ApiJson,
    services::auth::{Registration, TokenPair},
    state::AppState,
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tunebox_core::{User, UserId};

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub user_id: UserId,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
}

/// POST /signup
pub async fn signup(
    State(app_state): State<AppState>,
    ApiJson(req): ApiJson<Registration>,
) -> Result<Json<SignupResponse>> {
    let user = app_state
        .auth_service
        .register(app_state.users.as_ref(), req)
        .await?;

    Ok(Json(SignupResponse {
        message: "User created successfully".to_string(),
        user_id: user.id.clone(),
        user,
    }))
}

/// POST /signin
pub async fn signin(
    State(app_state): State<AppState>,
    ApiJson(req): ApiJson<SigninRequest>,
) -> Result<Json<TokenPair>> {
    let tokens = app_state
        .auth_service
        .authenticate(app_state.users.as_ref(), &req.email, &req.password)
        .await?;

    Ok(Json(tokens))
}

/// POST /auth/refresh
pub async fn refresh(
    State(app_state): State<AppState>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> Result<Json<RefreshResponse>> {
    let access_token = app_state.auth_service.refresh(&req.refresh_token)?;

    Ok(Json(RefreshResponse {
        access_token,
        token_type: "Bearer".to_string(),
    }))
}
