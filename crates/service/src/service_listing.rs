//! Posted-job management: creation with owned material lines, owner-guarded
//! updates, soft deletion and the public query surface.
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::user_directory;
use common::pagination::Pagination;
use models::service::{self, ServiceFields};
use models::service_material::{self, ServiceMaterialFields};
use models::status::ServiceStatus;

/// A service together with its active material lines.
pub type ServiceWithMaterials = (service::Model, Vec<service_material::Model>);

/// Create a service owned by `owner`, inserting any material lines in the
/// same transaction so readers never observe a service without them.
#[instrument(skip(db, fields, materials), fields(owner = %owner))]
pub async fn create_service(
    db: &DatabaseConnection,
    owner: Uuid,
    fields: &ServiceFields,
    materials: &[ServiceMaterialFields],
) -> Result<ServiceWithMaterials, ServiceError> {
    if user_directory::get_user(db, owner).await?.is_none() {
        return Err(ServiceError::not_found("user"));
    }

    let txn = db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let created = service::create(&txn, owner, fields).await?;
    let mut lines = Vec::with_capacity(materials.len());
    for m in materials {
        lines.push(service_material::create(&txn, created.id, m).await?);
    }
    txn.commit().await.map_err(|e| ServiceError::Db(e.to_string()))?;

    info!(service_id = created.id, owner = %owner, "service_created");
    Ok((created, lines))
}

/// Replace caller-editable fields; status is never touched here.
pub async fn update_service(
    db: &DatabaseConnection,
    id: i32,
    caller: Uuid,
    fields: &ServiceFields,
) -> Result<service::Model, ServiceError> {
    let existing = find_active(db, id).await?.ok_or_else(|| ServiceError::not_found("service"))?;
    if existing.user_id != caller {
        return Err(ServiceError::forbidden("only the owner may edit this service"));
    }
    let am = service::apply_update(existing, fields)?;
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(updated)
}

/// Soft delete. The row and its children stay behind the is_active filter.
pub async fn delete_service(
    db: &DatabaseConnection,
    id: i32,
    caller: Uuid,
) -> Result<(), ServiceError> {
    let existing = find_active(db, id).await?.ok_or_else(|| ServiceError::not_found("service"))?;
    if existing.user_id != caller {
        return Err(ServiceError::forbidden("only the owner may delete this service"));
    }
    service::deactivate(existing)
        .update(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(())
}

/// Explicit terminal cancellation; only legal while still Active.
#[instrument(skip(db), fields(service_id = id, caller = %caller))]
pub async fn cancel_service(
    db: &DatabaseConnection,
    id: i32,
    caller: Uuid,
) -> Result<service::Model, ServiceError> {
    let existing = find_active(db, id).await?.ok_or_else(|| ServiceError::not_found("service"))?;
    if existing.user_id != caller {
        return Err(ServiceError::forbidden("only the owner may cancel this service"));
    }
    if existing.status_id != ServiceStatus::Active.id() {
        return Err(ServiceError::invalid_state("only active services can be cancelled"));
    }
    let updated = service::transition(existing, ServiceStatus::Cancelled)
        .update(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(service_id = id, "service_cancelled");
    Ok(updated)
}

pub async fn get_service(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<ServiceWithMaterials>, ServiceError> {
    let mut rows = service::Entity::find_by_id(id)
        .filter(service::Column::IsActive.eq(true))
        .find_with_related(service_material::Entity)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(rows.pop().map(|(svc, mats)| (svc, active_only(mats))))
}

pub async fn list_services(
    db: &DatabaseConnection,
) -> Result<Vec<ServiceWithMaterials>, ServiceError> {
    let rows = service::Entity::find()
        .filter(service::Column::IsActive.eq(true))
        .order_by_desc(service::Column::CreatedAt)
        .find_with_related(service_material::Entity)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(with_active_materials(rows))
}

/// Newest first, plain page of services without their material lines.
pub async fn list_services_paginated(
    db: &DatabaseConnection,
    opts: Pagination,
) -> Result<Vec<service::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let rows = service::Entity::find()
        .filter(service::Column::IsActive.eq(true))
        .order_by_desc(service::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(rows)
}

pub async fn list_services_by_owner(
    db: &DatabaseConnection,
    owner: Uuid,
) -> Result<Vec<ServiceWithMaterials>, ServiceError> {
    let rows = service::Entity::find()
        .filter(service::Column::UserId.eq(owner))
        .filter(service::Column::IsActive.eq(true))
        .order_by_desc(service::Column::CreatedAt)
        .find_with_related(service_material::Entity)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(with_active_materials(rows))
}

/// Services still accepting proposals.
pub async fn list_active_services(
    db: &DatabaseConnection,
) -> Result<Vec<ServiceWithMaterials>, ServiceError> {
    let rows = service::Entity::find()
        .filter(service::Column::IsActive.eq(true))
        .filter(service::Column::StatusId.eq(ServiceStatus::Active.id()))
        .order_by_desc(service::Column::CreatedAt)
        .find_with_related(service_material::Entity)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(with_active_materials(rows))
}

pub async fn list_services_by_type(
    db: &DatabaseConnection,
    service_type: &str,
) -> Result<Vec<ServiceWithMaterials>, ServiceError> {
    let rows = service::Entity::find()
        .filter(service::Column::ServiceType.eq(service_type))
        .filter(service::Column::IsActive.eq(true))
        .filter(service::Column::StatusId.eq(ServiceStatus::Active.id()))
        .order_by_desc(service::Column::CreatedAt)
        .find_with_related(service_material::Entity)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(with_active_materials(rows))
}

pub async fn list_services_by_location(
    db: &DatabaseConnection,
    location: &str,
) -> Result<Vec<ServiceWithMaterials>, ServiceError> {
    let rows = service::Entity::find()
        .filter(service::Column::Location.contains(location))
        .filter(service::Column::IsActive.eq(true))
        .filter(service::Column::StatusId.eq(ServiceStatus::Active.id()))
        .order_by_desc(service::Column::CreatedAt)
        .find_with_related(service_material::Entity)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(with_active_materials(rows))
}

/// Append a material line to an existing service.
pub async fn add_service_material(
    db: &DatabaseConnection,
    service_id: i32,
    caller: Uuid,
    fields: &ServiceMaterialFields,
) -> Result<service_material::Model, ServiceError> {
    let existing =
        find_active(db, service_id).await?.ok_or_else(|| ServiceError::not_found("service"))?;
    if existing.user_id != caller {
        return Err(ServiceError::forbidden("only the owner may edit this service"));
    }
    let created = service_material::create(db, service_id, fields).await?;
    Ok(created)
}

/// Material lines are never removed, only deactivated.
pub async fn remove_service_material(
    db: &DatabaseConnection,
    material_id: i32,
    caller: Uuid,
) -> Result<(), ServiceError> {
    let material = service_material::Entity::find_by_id(material_id)
        .filter(service_material::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("material"))?;
    let parent = find_active(db, material.service_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("service"))?;
    if parent.user_id != caller {
        return Err(ServiceError::forbidden("only the owner may edit this service"));
    }
    service_material::deactivate(material)
        .update(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(())
}

pub(crate) async fn find_active(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<service::Model>, ServiceError> {
    service::Entity::find_by_id(id)
        .filter(service::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

fn active_only(mats: Vec<service_material::Model>) -> Vec<service_material::Model> {
    mats.into_iter().filter(|m| m.is_active).collect()
}

fn with_active_materials(
    rows: Vec<(service::Model, Vec<service_material::Model>)>,
) -> Vec<ServiceWithMaterials> {
    rows.into_iter().map(|(svc, mats)| (svc, active_only(mats))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, sample_service_fields, unique_user};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn service_crud_with_materials() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let owner = unique_user(&db, "listing_owner").await?;

        let materials = vec![ServiceMaterialFields {
            name: "paint".into(),
            brand: Some("Acme".into()),
            quantity: 4,
            unit: "gal".into(),
            estimated_price: Some(Decimal::new(8000, 2)),
            notes: None,
        }];
        let (svc, lines) =
            create_service(&db, owner.id, &sample_service_fields(), &materials).await?;
        assert_eq!(svc.status_id, ServiceStatus::Active.id());
        assert_eq!(lines.len(), 1);

        let (found, found_lines) = get_service(&db, svc.id).await?.expect("service exists");
        assert_eq!(found.id, svc.id);
        assert_eq!(found_lines.len(), 1);

        let mut fields = sample_service_fields();
        fields.title = "updated title".into();
        let updated = update_service(&db, svc.id, owner.id, &fields).await?;
        assert_eq!(updated.title, "updated title");
        // Update never touches status
        assert_eq!(updated.status_id, ServiceStatus::Active.id());

        let stranger = unique_user(&db, "listing_stranger").await?;
        let err = update_service(&db, svc.id, stranger.id, &fields).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        remove_service_material(&db, found_lines[0].id, owner.id).await?;
        let (_, after_removal) = get_service(&db, svc.id).await?.expect("service exists");
        assert!(after_removal.is_empty());

        delete_service(&db, svc.id, owner.id).await?;
        assert!(get_service(&db, svc.id).await?.is_none());

        use sea_orm::EntityTrait;
        models::user::Entity::delete_by_id(owner.id).exec(&db).await?;
        models::user::Entity::delete_by_id(stranger.id).exec(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn cancel_requires_active_status() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let owner = unique_user(&db, "cancel_owner").await?;
        let (svc, _) = create_service(&db, owner.id, &sample_service_fields(), &[]).await?;

        let cancelled = cancel_service(&db, svc.id, owner.id).await?;
        assert_eq!(cancelled.status_id, ServiceStatus::Cancelled.id());

        // A second cancel finds the service no longer Active
        let err = cancel_service(&db, svc.id, owner.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        use sea_orm::EntityTrait;
        models::user::Entity::delete_by_id(owner.id).exec(&db).await?;
        Ok(())
    }
}
