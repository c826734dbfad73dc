//! Demo identity: registration with echoed verification codes, bearer-token
//! sessions and the checksum "blockchain" ID check

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use safety_core::{ChecksumVerification, SafetyError, UserProfile};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/verify", post(verify_email))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", get(logout))
        .route("/api/auth/status", get(auth_status))
        .route("/api/blockchain/verify", post(verify_blockchain_id))
}

type BearerHeader = TypedHeader<Authorization<Bearer>>;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: String,
}

pub async fn register(State(state): State<AppState>, ApiJson(req): ApiJson<RegisterRequest>) -> ApiResult<Json<RegisterResponse>> {
    let registration = state
        .identity
        .write()
        .await
        .register(&req.name, &req.email, &req.password)?;

    Ok(Json(RegisterResponse {
        message: format!("Verification code sent to {}: {}", registration.email, registration.code),
        user_id: registration.user_id,
    }))
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub code: String,
}

pub async fn verify_email(State(state): State<AppState>, ApiJson(req): ApiJson<VerifyRequest>) -> ApiResult<Json<MessageResponse>> {
    state.identity.write().await.verify(&req.email, &req.code)?;
    Ok(MessageResponse::new("Email verified successfully"))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserProfile,
}

pub async fn login(State(state): State<AppState>, ApiJson(req): ApiJson<LoginRequest>) -> ApiResult<Json<LoginResponse>> {
    let session = state.identity.write().await.login(&req.email, &req.password)?;
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token: session.token,
        user: session.user,
    }))
}

/// Always succeeds, with or without a live session
pub async fn logout(State(state): State<AppState>, bearer: Option<BearerHeader>) -> Json<MessageResponse> {
    if let Some(TypedHeader(Authorization(token))) = bearer {
        let removed = state.identity.write().await.logout(token.token());
        tracing::debug!(removed, "logout");
    }
    MessageResponse::new("Logged out successfully")
}

#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

pub async fn auth_status(State(state): State<AppState>, bearer: Option<BearerHeader>) -> Json<AuthStatus> {
    let user = match bearer {
        Some(TypedHeader(Authorization(token))) => state.identity.read().await.session_user(token.token()).cloned(),
        None => None,
    };
    Json(AuthStatus {
        logged_in: user.is_some(),
        user,
    })
}

#[derive(Debug, Deserialize)]
pub struct ChecksumRequest {
    pub email: Option<String>,
}

pub async fn verify_blockchain_id(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ChecksumRequest>,
) -> ApiResult<Json<ChecksumVerification>> {
    let email = req.email.ok_or(SafetyError::MissingField("email"))?;
    let verification = state.identity.write().await.verify_checksum(&email)?;
    Ok(Json(verification))
}
