//! Physical inventory lifecycle: starter drafts, draft replacement,
//! reconciled submission, and the coverage rule.

mod common;

use chrono::{Duration, Utc};
use common::TestApp;
use medstock_api::dto::{PhysicalInventoryDto, PhysicalInventoryLineItemDto, StockAdjustmentDto};
use medstock_api::entities::physical_inventory;
use medstock_api::errors::keys;
use medstock_api::models::reason::{PHYSICAL_CREDIT_REASON_ID, PHYSICAL_DEBIT_REASON_ID};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

fn counted_line(
    orderable_id: Uuid,
    quantity: Option<i32>,
    adjustments: Vec<StockAdjustmentDto>,
) -> PhysicalInventoryLineItemDto {
    PhysicalInventoryLineItemDto {
        orderable_id: Some(orderable_id),
        lot_id: None,
        quantity,
        stock_on_hand: None,
        stock_adjustments: adjustments,
        vvm_status: None,
    }
}

fn inventory(app: &TestApp, line_items: Vec<PhysicalInventoryLineItemDto>) -> PhysicalInventoryDto {
    PhysicalInventoryDto {
        program_id: app.program_id,
        facility_id: app.facility_id,
        occurred_date: Some(Utc::now()),
        document_number: Some("PI-2024-03".to_string()),
        signature: Some("jane".to_string()),
        is_starter: false,
        line_items,
    }
}

async fn seed_balance(app: &TestApp, orderable_id: Uuid, quantity: i32) {
    let reason = app.seed_credit_adjustment_reason().await;
    app.services
        .processor
        .process(
            app.user_id,
            app.adjustment_event(
                orderable_id,
                reason.id,
                quantity,
                Utc::now() - Duration::days(1),
            ),
        )
        .await
        .expect("failed to seed balance");
}

#[tokio::test]
async fn starter_draft_lists_every_active_card_with_current_balance() {
    let app = TestApp::new().await;
    let orderable_id = app.seed_orderable("ORS-200", false);
    seed_balance(&app, orderable_id, 10).await;

    let draft = app
        .services
        .physical_inventories
        .find_draft(app.user_id, app.program_id, app.facility_id)
        .await
        .unwrap();

    assert!(draft.is_starter);
    assert_eq!(draft.line_items.len(), 1);
    let line = &draft.line_items[0];
    assert_eq!(line.orderable_id, Some(orderable_id));
    assert_eq!(line.stock_on_hand, Some(10));
    assert_eq!(line.quantity, None);
}

#[tokio::test]
async fn saving_twice_leaves_exactly_one_draft() {
    let app = TestApp::new().await;
    let orderable_id = app.seed_orderable("ORS-200", false);

    let draft = inventory(&app, vec![counted_line(orderable_id, Some(5), Vec::new())]);
    app.services
        .physical_inventories
        .save_draft(app.user_id, draft.clone())
        .await
        .unwrap();
    app.services
        .physical_inventories
        .save_draft(app.user_id, draft)
        .await
        .unwrap();

    let drafts = physical_inventory::Entity::find()
        .filter(physical_inventory::Column::IsDraft.eq(true))
        .all(app.db.as_ref())
        .await
        .unwrap();
    assert_eq!(drafts.len(), 1);

    // Saved draft is returned on the next find, not a starter.
    let found = app
        .services
        .physical_inventories
        .find_draft(app.user_id, app.program_id, app.facility_id)
        .await
        .unwrap();
    assert!(!found.is_starter);
    assert_eq!(found.line_items.len(), 1);
    assert_eq!(found.document_number.as_deref(), Some("PI-2024-03"));
}

#[tokio::test]
async fn deleting_a_missing_draft_is_a_no_op() {
    let app = TestApp::new().await;
    app.services
        .physical_inventories
        .delete_draft(app.user_id, app.program_id, app.facility_id)
        .await
        .expect("deleting a missing draft must not fail");
}

#[tokio::test]
async fn submission_reconciles_overstock_and_deletes_the_draft() {
    let app = TestApp::new().await;
    let orderable_id = app.seed_orderable("ORS-200", false);
    seed_balance(&app, orderable_id, 10).await;

    // Park a draft first; submission must clean it up.
    app.services
        .physical_inventories
        .save_draft(
            app.user_id,
            inventory(&app, vec![counted_line(orderable_id, None, Vec::new())]),
        )
        .await
        .unwrap();

    // Counted 15 against 10 on hand, reconciled with +5 overstock.
    let submission = inventory(
        &app,
        vec![counted_line(
            orderable_id,
            Some(15),
            vec![StockAdjustmentDto {
                reason_id: PHYSICAL_CREDIT_REASON_ID,
                quantity: 5,
            }],
        )],
    );
    let inventory_id = app
        .services
        .physical_inventories
        .submit(app.user_id, submission)
        .await
        .expect("reconciled submission should pass");

    assert_eq!(app.stock_on_hand(orderable_id).await, Some(15));

    let rows = physical_inventory::Entity::find()
        .all(app.db.as_ref())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, inventory_id);
    assert!(!rows[0].is_draft);
}

#[tokio::test]
async fn discrepancy_without_adjustments_is_rejected() {
    let app = TestApp::new().await;
    let orderable_id = app.seed_orderable("ORS-200", false);
    seed_balance(&app, orderable_id, 10).await;

    let err = app
        .services
        .physical_inventories
        .submit(
            app.user_id,
            inventory(&app, vec![counted_line(orderable_id, Some(15), Vec::new())]),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.validation_key(),
        Some(keys::ERROR_PHYSICAL_INVENTORY_STOCK_ADJUSTMENTS_NOT_PROVIDED)
    );

    // Nothing committed.
    assert_eq!(app.stock_on_hand(orderable_id).await, Some(10));
}

#[tokio::test]
async fn wrong_adjustment_sum_is_rejected() {
    let app = TestApp::new().await;
    let orderable_id = app.seed_orderable("ORS-200", false);
    seed_balance(&app, orderable_id, 10).await;

    let err = app
        .services
        .physical_inventories
        .submit(
            app.user_id,
            inventory(
                &app,
                vec![counted_line(
                    orderable_id,
                    Some(15),
                    vec![StockAdjustmentDto {
                        reason_id: PHYSICAL_DEBIT_REASON_ID,
                        quantity: 5,
                    }],
                )],
            ),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.validation_key(),
        Some(keys::ERROR_PHYSICAL_INVENTORY_SOH_DIFFER)
    );
}

#[tokio::test]
async fn submission_must_cover_every_active_card() {
    let app = TestApp::new().await;
    let counted = app.seed_orderable("ORS-200", false);
    let omitted = app.seed_orderable("AMOX-250", false);
    seed_balance(&app, counted, 10).await;
    seed_balance(&app, omitted, 4).await;

    let err = app
        .services
        .physical_inventories
        .submit(
            app.user_id,
            inventory(&app, vec![counted_line(counted, Some(10), Vec::new())]),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.validation_key(),
        Some(keys::ERROR_PHYSICAL_INVENTORY_ACTIVE_CARD_NOT_COVERED)
    );
}

#[tokio::test]
async fn duplicate_orderable_lines_are_rejected() {
    let app = TestApp::new().await;
    let orderable_id = app.seed_orderable("ORS-200", false);

    let err = app
        .services
        .physical_inventories
        .save_draft(
            app.user_id,
            inventory(
                &app,
                vec![
                    counted_line(orderable_id, Some(1), Vec::new()),
                    counted_line(orderable_id, Some(2), Vec::new()),
                ],
            ),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.validation_key(),
        Some(keys::ERROR_PHYSICAL_INVENTORY_ORDERABLE_DUPLICATED)
    );
}

#[tokio::test]
async fn empty_submission_is_rejected() {
    let app = TestApp::new().await;
    let err = app
        .services
        .physical_inventories
        .submit(app.user_id, inventory(&app, Vec::new()))
        .await
        .unwrap_err();
    assert_eq!(
        err.validation_key(),
        Some(keys::ERROR_PHYSICAL_INVENTORY_LINE_ITEMS_MISSING)
    );
}
