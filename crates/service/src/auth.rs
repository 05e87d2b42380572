//! Registration, login, and token verification. Passwords are hashed with
//! argon2; sessions are HS256 JWTs that expire after 12 hours.
use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;
use models::{user, user_credentials};

const PASSWORD_ALGORITHM: &str = "argon2";
const TOKEN_TTL_HOURS: i64 = 12;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// A logged-in user plus their freshly issued token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: user::Model,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub uid: String,
    pub exp: usize,
}

/// Create a user with hashed credentials. Duplicate emails conflict.
#[instrument(skip(db, input), fields(email = %input.email))]
pub async fn register(
    db: &DatabaseConnection,
    input: &RegisterInput,
) -> Result<user::Model, ServiceError> {
    user::validate_email(&input.email)?;
    user::validate_name(&input.name)?;
    if input.password.len() < 8 {
        return Err(ServiceError::Validation("password too short (>=8)".into()));
    }
    if crate::user_directory::exists_by_email(db, &input.email).await? {
        return Err(ServiceError::Validation("email already registered".into()));
    }

    let created =
        crate::user_directory::register_user(db, &input.email, &input.name, input.phone.as_deref())
            .await?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(input.password.as_bytes(), &salt)
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .to_string();
    user_credentials::upsert_password(db, created.id, hash, PASSWORD_ALGORITHM).await?;

    info!(user_id = %created.id, "user_registered");
    Ok(created)
}

/// Verify a password and issue a session token. Unknown email and wrong
/// password are indistinguishable to the caller.
#[instrument(skip(db, input, jwt_secret), fields(email = %input.email))]
pub async fn login(
    db: &DatabaseConnection,
    input: &LoginInput,
    jwt_secret: &str,
) -> Result<AuthSession, ServiceError> {
    let user = user::find_by_email(db, &input.email)
        .await?
        .ok_or_else(|| ServiceError::Unauthorized("invalid credentials".into()))?;
    let cred = user_credentials::get_for_user(db, user.id)
        .await?
        .ok_or_else(|| ServiceError::Unauthorized("invalid credentials".into()))?;

    let parsed =
        PasswordHash::new(&cred.password_hash).map_err(|e| ServiceError::Db(e.to_string()))?;
    if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
        return Err(ServiceError::Unauthorized("invalid credentials".into()));
    }

    let token = issue_token(&user, jwt_secret)?;
    info!(user_id = %user.id, "user_logged_in");
    Ok(AuthSession { user, token })
}

pub fn issue_token(user: &user::Model, jwt_secret: &str) -> Result<String, ServiceError> {
    let exp = (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize;
    let claims = Claims { sub: user.email.clone(), uid: user.id.to_string(), exp };
    encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(jwt_secret.as_bytes()))
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// Decode a session token back to its user id. Expired or tampered tokens
/// come back `Unauthorized`.
pub fn verify_token(token: &str, jwt_secret: &str) -> Result<Uuid, ServiceError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ServiceError::Unauthorized("invalid token".into()))?;
    Uuid::parse_str(&data.claims.uid)
        .map_err(|_| ServiceError::Unauthorized("invalid token".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[test]
    fn token_roundtrip_and_tamper_rejection() {
        let user = user::Model {
            id: Uuid::new_v4(),
            email: "token@example.com".into(),
            name: "Token User".into(),
            phone: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
            deleted_at: None,
        };
        let token = issue_token(&user, "secret").unwrap();
        assert_eq!(verify_token(&token, "secret").unwrap(), user.id);
        assert!(verify_token(&token, "other-secret").is_err());
        assert!(verify_token("not-a-jwt", "secret").is_err());
    }

    #[tokio::test]
    async fn register_then_login() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let email = format!("auth_{}@example.com", Uuid::new_v4());
        let input = RegisterInput {
            email: email.clone(),
            name: "Auth User".into(),
            password: "correct horse".into(),
            phone: None,
        };
        let created = register(&db, &input).await?;

        // Duplicate registration conflicts
        let err = register(&db, &input).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let session = login(
            &db,
            &LoginInput { email: email.clone(), password: "correct horse".into() },
            "secret",
        )
        .await?;
        assert_eq!(session.user.id, created.id);
        assert_eq!(verify_token(&session.token, "secret")?, created.id);

        let err = login(
            &db,
            &LoginInput { email, password: "wrong password".into() },
            "secret",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        use sea_orm::{EntityTrait, ModelTrait};
        let cred = user_credentials::get_for_user(&db, created.id).await?.unwrap();
        cred.delete(&db).await?;
        user::Entity::delete_by_id(created.id).exec(&db).await?;
        Ok(())
    }
}
