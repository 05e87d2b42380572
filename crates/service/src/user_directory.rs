//! Lookup interface over the user table. The lifecycle engine only ever
//! reads from here; registration is driven by the auth flow.
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::errors::ServiceError;
use models::user;

/// Fetch an active user by id.
pub async fn get_user(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<user::Model>, ServiceError> {
    Ok(user::find_active(db, id).await?)
}

pub async fn exists_by_email(db: &DatabaseConnection, email: &str) -> Result<bool, ServiceError> {
    Ok(user::find_by_email(db, email).await?.is_some())
}

pub async fn register_user(
    db: &DatabaseConnection,
    email: &str,
    name: &str,
    phone: Option<&str>,
) -> Result<user::Model, ServiceError> {
    let created = user::create(db, email, name, phone).await?;
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn lookup_roundtrip() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;

        let email = format!("dir_{}@example.com", Uuid::new_v4());
        let u = register_user(&db, &email, "Directory User", Some("+5511999990000")).await?;

        let found = get_user(&db, u.id).await?.expect("user should exist");
        assert_eq!(found.email, email);
        assert!(exists_by_email(&db, &email).await?);
        assert!(!exists_by_email(&db, "nobody@example.com").await?);

        user::soft_delete(&db, u.id).await?;
        assert!(get_user(&db, u.id).await?.is_none());

        use sea_orm::EntityTrait;
        user::Entity::delete_by_id(u.id).exec(&db).await?;
        Ok(())
    }
}
