//! Stock card read path: recalculated balances, ordering, and resolved
//! source/destination display names.

mod common;

use chrono::{Duration, Utc};
use common::TestApp;
use medstock_api::entities::stock_card;
use medstock_api::errors::ServiceError;
use medstock_api::services::permission::{DenyRights, STOCK_CARDS_VIEW};
use sea_orm::EntityTrait;
use std::sync::Arc;

#[tokio::test]
async fn card_view_carries_line_items_and_resolved_destination_name() {
    let app = TestApp::new().await;
    let orderable_id = app.seed_orderable("ORS-200", false);
    let reason = app.seed_credit_adjustment_reason().await;
    let destination_id = app.seed_destination("NGO Warehouse").await;

    let occurred = Utc::now() - Duration::hours(4);
    app.services
        .processor
        .process(
            app.user_id,
            app.adjustment_event(orderable_id, reason.id, 10, occurred),
        )
        .await
        .unwrap();
    app.services
        .processor
        .process(
            app.user_id,
            app.issue_event(orderable_id, destination_id, 4, Utc::now()),
        )
        .await
        .unwrap();

    let card_model = stock_card::Entity::find()
        .one(app.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    let view = app
        .services
        .stock_cards
        .find_card(app.user_id, card_model.id)
        .await
        .unwrap()
        .expect("card view should exist");

    assert_eq!(view.stock_on_hand, 6);
    assert_eq!(view.line_items.len(), 2);
    // Chronological order with running balances.
    assert_eq!(view.line_items[0].stock_on_hand, 10);
    assert_eq!(view.line_items[1].stock_on_hand, 6);

    let destination = view.line_items[1]
        .destination
        .as_ref()
        .expect("issue line should resolve its destination");
    assert_eq!(destination.name, "NGO Warehouse");
    assert!(!destination.is_ref_data_facility);

    assert_eq!(
        view.program.as_ref().map(|program| program.name.as_str()),
        Some("Essential Medicines")
    );
}

#[tokio::test]
async fn unknown_card_reads_as_absent() {
    let app = TestApp::new().await;
    let found = app
        .services
        .stock_cards
        .find_card(app.user_id, uuid::Uuid::new_v4())
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn viewing_cards_requires_the_right() {
    let app = TestApp::new().await;
    let orderable_id = app.seed_orderable("ORS-200", false);
    let reason = app.seed_credit_adjustment_reason().await;
    app.services
        .processor
        .process(
            app.user_id,
            app.adjustment_event(orderable_id, reason.id, 10, Utc::now()),
        )
        .await
        .unwrap();

    let services = app.services_with_permissions(Arc::new(DenyRights {
        denied: vec![STOCK_CARDS_VIEW],
    }));
    let card_model = stock_card::Entity::find()
        .one(app.db.as_ref())
        .await
        .unwrap()
        .unwrap();

    let err = services
        .stock_cards
        .find_card(app.user_id, card_model.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));
}
