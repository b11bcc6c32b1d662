//! Test harness: application services over an in-memory SQLite database with
//! seeded reference data and allow-all permissions.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use medstock_api::{
    db::{establish_connection_with_config, DbConfig, DbPool},
    dto::StockEventDto,
    entities::{node, organization, stock_line_item_reason, valid_destination_assignment,
        valid_reason_assignment, valid_source_assignment},
    events::{process_events, EventSender},
    handlers::AppServices,
    models::{Reason, ReasonCategory, ReasonType},
    services::permission::{AllowAllPermissions, PermissionService},
    services::reason_service::seed_built_in_reasons,
    services::reference_data::{
        FacilityInfo, InMemoryReferenceData, OrderableInfo, ProgramInfo, ReferenceDataService,
    },
};
use sea_orm::{ActiveModelTrait, Set};
use tokio::sync::mpsc;
use uuid::Uuid;

pub struct TestApp {
    pub db: Arc<DbPool>,
    pub services: AppServices,
    pub reference_data: Arc<InMemoryReferenceData>,
    pub user_id: Uuid,
    pub program_id: Uuid,
    pub facility_id: Uuid,
    pub facility_type_id: Uuid,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Fresh database, one seeded program and facility, allow-all
    /// permissions.
    pub async fn new() -> Self {
        // A single connection keeps every session on the same in-memory
        // database.
        let db = establish_connection_with_config(&DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(5),
        })
        .await
        .expect("failed to open test database");
        medstock_api::db::run_migrations(&db)
            .await
            .expect("failed to run migrations");
        seed_built_in_reasons(&db)
            .await
            .expect("failed to seed built-in reasons");
        let db = Arc::new(db);

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(process_events(event_rx));

        let reference_data = Arc::new(InMemoryReferenceData::new());
        let program_id = Uuid::new_v4();
        let facility_id = Uuid::new_v4();
        let facility_type_id = Uuid::new_v4();
        reference_data.put_program(ProgramInfo {
            id: program_id,
            name: "Essential Medicines".to_string(),
        });
        reference_data.put_facility(FacilityInfo {
            id: facility_id,
            name: "Balaka District Hospital".to_string(),
            facility_type_id,
        });

        let permissions: Arc<dyn PermissionService> = Arc::new(AllowAllPermissions);
        let services = AppServices::new(
            db.clone(),
            reference_data.clone() as Arc<dyn ReferenceDataService>,
            permissions,
            event_sender,
        );

        Self {
            db,
            services,
            reference_data,
            user_id: Uuid::new_v4(),
            program_id,
            facility_id,
            facility_type_id,
            _event_task: event_task,
        }
    }

    /// Build services over the same database with a different permission
    /// implementation.
    pub fn services_with_permissions(
        &self,
        permissions: Arc<dyn PermissionService>,
    ) -> AppServices {
        let (event_tx, event_rx) = mpsc::channel(64);
        tokio::spawn(process_events(event_rx));
        AppServices::new(
            self.db.clone(),
            self.reference_data.clone() as Arc<dyn ReferenceDataService>,
            permissions,
            EventSender::new(event_tx),
        )
    }

    /// Seed an approved orderable for the default program/facility.
    pub fn seed_orderable(&self, code: &str, use_vvm: bool) -> Uuid {
        let orderable_id = Uuid::new_v4();
        self.reference_data.put_orderable(OrderableInfo {
            id: orderable_id,
            product_code: code.to_string(),
            full_product_name: format!("{} (test)", code),
            use_vvm,
        });
        self.reference_data
            .approve(self.program_id, self.facility_id, orderable_id);
        orderable_id
    }

    /// Insert a reason and whitelist it for the default program/facility
    /// type.
    pub async fn seed_reason(
        &self,
        name: &str,
        reason_type: ReasonType,
        reason_category: ReasonCategory,
    ) -> Reason {
        let reason = Reason {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            reason_type,
            reason_category,
            is_free_text_allowed: true,
        };
        stock_line_item_reason::ActiveModel {
            id: Set(reason.id),
            name: Set(reason.name.clone()),
            description: Set(None),
            reason_type: Set(reason.reason_type.to_string()),
            reason_category: Set(reason.reason_category.to_string()),
            is_free_text_allowed: Set(true),
        }
        .insert(self.db.as_ref())
        .await
        .expect("failed to insert reason");

        valid_reason_assignment::ActiveModel {
            id: Set(Uuid::new_v4()),
            program_id: Set(self.program_id),
            facility_type_id: Set(self.facility_type_id),
            reason_id: Set(reason.id),
        }
        .insert(self.db.as_ref())
        .await
        .expect("failed to insert reason assignment");

        reason
    }

    pub async fn seed_credit_adjustment_reason(&self) -> Reason {
        self.seed_reason("Donation", ReasonType::Credit, ReasonCategory::Adjustment)
            .await
    }

    /// Insert an organization-backed node and whitelist it as a destination.
    pub async fn seed_destination(&self, name: &str) -> Uuid {
        let node_id = self.seed_organization_node(name).await;
        valid_destination_assignment::ActiveModel {
            id: Set(Uuid::new_v4()),
            program_id: Set(self.program_id),
            facility_type_id: Set(self.facility_type_id),
            node_id: Set(node_id),
        }
        .insert(self.db.as_ref())
        .await
        .expect("failed to insert destination assignment");
        node_id
    }

    /// Insert an organization-backed node and whitelist it as a source.
    pub async fn seed_source(&self, name: &str) -> Uuid {
        let node_id = self.seed_organization_node(name).await;
        valid_source_assignment::ActiveModel {
            id: Set(Uuid::new_v4()),
            program_id: Set(self.program_id),
            facility_type_id: Set(self.facility_type_id),
            node_id: Set(node_id),
        }
        .insert(self.db.as_ref())
        .await
        .expect("failed to insert source assignment");
        node_id
    }

    async fn seed_organization_node(&self, name: &str) -> Uuid {
        let organization_id = Uuid::new_v4();
        organization::ActiveModel {
            id: Set(organization_id),
            name: Set(name.to_string()),
        }
        .insert(self.db.as_ref())
        .await
        .expect("failed to insert organization");

        let node_id = Uuid::new_v4();
        node::ActiveModel {
            id: Set(node_id),
            reference_id: Set(organization_id),
            is_ref_data_facility: Set(false),
        }
        .insert(self.db.as_ref())
        .await
        .expect("failed to insert node");
        node_id
    }

    /// A complete adjustment event for the default program/facility.
    pub fn adjustment_event(
        &self,
        orderable_id: Uuid,
        reason_id: Uuid,
        quantity: i32,
        occurred: DateTime<Utc>,
    ) -> StockEventDto {
        StockEventDto {
            quantity,
            reason_id: Some(reason_id),
            program_id: Some(self.program_id),
            facility_id: Some(self.facility_id),
            orderable_id: Some(orderable_id),
            occurred_date: Some(occurred),
            ..StockEventDto::default()
        }
    }

    /// An issue to a destination node.
    pub fn issue_event(
        &self,
        orderable_id: Uuid,
        destination_id: Uuid,
        quantity: i32,
        occurred: DateTime<Utc>,
    ) -> StockEventDto {
        StockEventDto {
            quantity,
            program_id: Some(self.program_id),
            facility_id: Some(self.facility_id),
            orderable_id: Some(orderable_id),
            destination_id: Some(destination_id),
            occurred_date: Some(occurred),
            ..StockEventDto::default()
        }
    }

    /// Current balance for an orderable, read through the summaries path.
    pub async fn stock_on_hand(&self, orderable_id: Uuid) -> Option<i64> {
        self.services
            .stock_cards
            .find_card_summaries(self.user_id, self.program_id, self.facility_id)
            .await
            .expect("failed to read summaries")
            .into_iter()
            .find(|summary| summary.orderable_id == orderable_id)
            .map(|summary| summary.stock_on_hand)
    }
}
