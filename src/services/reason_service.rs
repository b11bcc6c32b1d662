//! Reason catalog management. Creation is idempotent on business equality;
//! updates require the id to exist. The built-in physical inventory reasons
//! are seeded at startup so reconciliation always has reasons to reference.

use crate::db::DbPool;
use crate::dto::ReasonRequest;
use crate::entities::stock_line_item_reason;
use crate::errors::{keys, ServiceError};
use crate::events::{Event, EventSender};
use crate::models::reason::{built_in_reasons, Reason};
use crate::services::permission::PermissionService;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Insert the built-in physical inventory reasons if they are not present.
pub async fn seed_built_in_reasons(db: &DbPool) -> Result<(), ServiceError> {
    for reason in built_in_reasons() {
        let exists = stock_line_item_reason::Entity::find_by_id(reason.id)
            .one(db)
            .await?
            .is_some();
        if !exists {
            info!(name = %reason.name, "seeding built-in reason");
            to_active_model(&reason).insert(db).await?;
        }
    }
    Ok(())
}

fn to_active_model(reason: &Reason) -> stock_line_item_reason::ActiveModel {
    let model = stock_line_item_reason::Model::from(reason);
    stock_line_item_reason::ActiveModel {
        id: Set(model.id),
        name: Set(model.name),
        description: Set(model.description),
        reason_type: Set(model.reason_type),
        reason_category: Set(model.reason_category),
        is_free_text_allowed: Set(model.is_free_text_allowed),
    }
}

pub struct ReasonService {
    db: Arc<DbPool>,
    permissions: Arc<dyn PermissionService>,
    event_sender: EventSender,
}

impl ReasonService {
    pub fn new(
        db: Arc<DbPool>,
        permissions: Arc<dyn PermissionService>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            db,
            permissions,
            event_sender,
        }
    }

    /// Create a reason. Submitting a reason whose business fields match an
    /// existing one returns that existing reason instead of a duplicate row;
    /// the boolean reports whether a row was created.
    pub async fn create_reason(
        &self,
        user_id: Uuid,
        request: ReasonRequest,
    ) -> Result<(Reason, bool), ServiceError> {
        self.permissions.can_manage_reasons(user_id).await?;

        let candidate = Reason {
            id: Uuid::new_v4(),
            name: request.name,
            description: request.description,
            reason_type: request.reason_type,
            reason_category: request.reason_category,
            is_free_text_allowed: request.is_free_text_allowed,
        };

        for existing in self.find_reasons().await? {
            if existing.same_business_meaning(&candidate) {
                return Ok((existing, false));
            }
        }

        to_active_model(&candidate).insert(self.db.as_ref()).await?;
        info!(reason_id = %candidate.id, name = %candidate.name, "reason created");
        if let Err(error) = self.event_sender.send(Event::ReasonCreated(candidate.id)).await {
            warn!("failed to publish reason event: {}", error);
        }
        Ok((candidate, true))
    }

    /// Update an existing reason; an unknown id is a hard error, unlike
    /// reads.
    pub async fn update_reason(
        &self,
        user_id: Uuid,
        reason_id: Uuid,
        request: ReasonRequest,
    ) -> Result<Reason, ServiceError> {
        self.permissions.can_manage_reasons(user_id).await?;

        stock_line_item_reason::Entity::find_by_id(reason_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "{}: reason {} not found",
                    keys::ERROR_REASON_NOT_FOUND,
                    reason_id
                ))
            })?;

        let updated = Reason {
            id: reason_id,
            name: request.name,
            description: request.description,
            reason_type: request.reason_type,
            reason_category: request.reason_category,
            is_free_text_allowed: request.is_free_text_allowed,
        };
        let model = stock_line_item_reason::Model::from(&updated);
        stock_line_item_reason::ActiveModel {
            id: Set(model.id),
            name: Set(model.name),
            description: Set(model.description),
            reason_type: Set(model.reason_type),
            reason_category: Set(model.reason_category),
            is_free_text_allowed: Set(model.is_free_text_allowed),
        }
        .update(self.db.as_ref())
        .await?;

        info!(%reason_id, "reason updated");
        if let Err(error) = self.event_sender.send(Event::ReasonUpdated(reason_id)).await {
            warn!("failed to publish reason event: {}", error);
        }
        Ok(updated)
    }

    pub async fn find_reasons(&self) -> Result<Vec<Reason>, ServiceError> {
        stock_line_item_reason::Entity::find()
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(Reason::try_from)
            .collect()
    }

    pub async fn find_reason(&self, reason_id: Uuid) -> Result<Option<Reason>, ServiceError> {
        stock_line_item_reason::Entity::find_by_id(reason_id)
            .one(self.db.as_ref())
            .await?
            .map(Reason::try_from)
            .transpose()
    }
}
