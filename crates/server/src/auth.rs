//! Session endpoints and the authenticated-caller extractor.
//!
//! Tokens travel either as a `Bearer` header or as the `auth_token`
//! cookie set by login; `AuthUser` accepts both so browser and API
//! clients share one router.
use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{request::Parts, StatusCode},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::JsonApiError;
use service::auth::{self, LoginInput, RegisterInput};
use service::errors::ServiceError;

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub jwt_secret: String,
}

/// The verified caller of a request. Extraction fails with 401 when no
/// valid token is presented.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[async_trait]
impl FromRequestParts<ServerState> for AuthUser {
    type Rejection = JsonApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string);
        let token = match bearer {
            Some(t) => t,
            None => CookieJar::from_headers(&parts.headers)
                .get("auth_token")
                .map(|c| c.value().to_string())
                .ok_or_else(|| {
                    JsonApiError::from(ServiceError::Unauthorized("missing token".into()))
                })?,
        };
        let user_id = auth::verify_token(&token, &state.jwt_secret)?;
        Ok(AuthUser { user_id })
    }
}

#[derive(Serialize)]
pub struct RegisterOutput {
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct MeOutput {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
}

pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<RegisterOutput>), JsonApiError> {
    let created = auth::register(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(RegisterOutput { user_id: created.id })))
}

pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<MeOutput>), JsonApiError> {
    let session = auth::login(&state.db, &input, &state.jwt_secret).await?;
    let mut cookie = Cookie::new("auth_token", session.token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    let jar = jar.add(cookie);
    let me = MeOutput {
        user_id: session.user.id,
        email: session.user.email,
        name: session.user.name,
    };
    Ok((jar, Json(me)))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::from("auth_token"));
    (jar, StatusCode::NO_CONTENT)
}

pub async fn me(
    State(state): State<ServerState>,
    caller: AuthUser,
) -> Result<Json<MeOutput>, JsonApiError> {
    let user = service::user_directory::get_user(&state.db, caller.user_id)
        .await?
        .ok_or_else(|| JsonApiError::from(ServiceError::not_found("user")))?;
    Ok(Json(MeOutput { user_id: user.id, email: user.email, name: user.name }))
}
