use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240115_000001_create_reason_tables::Migration),
            Box::new(m20240115_000002_create_node_tables::Migration),
            Box::new(m20240115_000003_create_stock_event_table::Migration),
            Box::new(m20240115_000004_create_stock_card_tables::Migration),
            Box::new(m20240115_000005_create_physical_inventory_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240115_000001_create_reason_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240115_000001_create_reason_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Aligned with entities::stock_line_item_reason Model
            manager
                .create_table(
                    Table::create()
                        .table(StockLineItemReasons::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockLineItemReasons::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockLineItemReasons::Name).string().not_null())
                        .col(ColumnDef::new(StockLineItemReasons::Description).string().null())
                        .col(
                            ColumnDef::new(StockLineItemReasons::ReasonType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockLineItemReasons::ReasonCategory)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockLineItemReasons::IsFreeTextAllowed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ValidReasonAssignments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ValidReasonAssignments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ValidReasonAssignments::ProgramId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ValidReasonAssignments::FacilityTypeId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ValidReasonAssignments::ReasonId)
                                .uuid()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_valid_reason_assignments_program_facility_type")
                        .table(ValidReasonAssignments::Table)
                        .col(ValidReasonAssignments::ProgramId)
                        .col(ValidReasonAssignments::FacilityTypeId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ValidReasonAssignments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StockLineItemReasons::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum StockLineItemReasons {
        Table,
        Id,
        Name,
        Description,
        ReasonType,
        ReasonCategory,
        IsFreeTextAllowed,
    }

    #[derive(DeriveIden)]
    pub(super) enum ValidReasonAssignments {
        Table,
        Id,
        ProgramId,
        FacilityTypeId,
        ReasonId,
    }
}

mod m20240115_000002_create_node_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240115_000002_create_node_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Organizations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Organizations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Organizations::Name).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Nodes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Nodes::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Nodes::ReferenceId).uuid().not_null())
                        .col(
                            ColumnDef::new(Nodes::IsRefDataFacility)
                                .boolean()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ValidSourceAssignments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ValidSourceAssignments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ValidSourceAssignments::ProgramId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ValidSourceAssignments::FacilityTypeId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ValidSourceAssignments::NodeId)
                                .uuid()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ValidDestinationAssignments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ValidDestinationAssignments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ValidDestinationAssignments::ProgramId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ValidDestinationAssignments::FacilityTypeId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ValidDestinationAssignments::NodeId)
                                .uuid()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_valid_source_assignments_program_facility_type")
                        .table(ValidSourceAssignments::Table)
                        .col(ValidSourceAssignments::ProgramId)
                        .col(ValidSourceAssignments::FacilityTypeId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_valid_destination_assignments_program_facility_type")
                        .table(ValidDestinationAssignments::Table)
                        .col(ValidDestinationAssignments::ProgramId)
                        .col(ValidDestinationAssignments::FacilityTypeId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(
                    Table::drop()
                        .table(ValidDestinationAssignments::Table)
                        .to_owned(),
                )
                .await?;
            manager
                .drop_table(Table::drop().table(ValidSourceAssignments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Nodes::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Organizations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Organizations {
        Table,
        Id,
        Name,
    }

    #[derive(DeriveIden)]
    pub(super) enum Nodes {
        Table,
        Id,
        ReferenceId,
        IsRefDataFacility,
    }

    #[derive(DeriveIden)]
    pub(super) enum ValidSourceAssignments {
        Table,
        Id,
        ProgramId,
        FacilityTypeId,
        NodeId,
    }

    #[derive(DeriveIden)]
    pub(super) enum ValidDestinationAssignments {
        Table,
        Id,
        ProgramId,
        FacilityTypeId,
        NodeId,
    }
}

mod m20240115_000003_create_stock_event_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240115_000003_create_stock_event_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockEvents::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(StockEvents::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(StockEvents::Quantity).integer().not_null())
                        .col(ColumnDef::new(StockEvents::ReasonId).uuid().null())
                        .col(ColumnDef::new(StockEvents::FacilityId).uuid().not_null())
                        .col(ColumnDef::new(StockEvents::ProgramId).uuid().not_null())
                        .col(ColumnDef::new(StockEvents::OrderableId).uuid().not_null())
                        .col(ColumnDef::new(StockEvents::LotId).uuid().null())
                        .col(ColumnDef::new(StockEvents::UserId).uuid().not_null())
                        .col(ColumnDef::new(StockEvents::SourceNodeId).uuid().null())
                        .col(ColumnDef::new(StockEvents::DestinationNodeId).uuid().null())
                        .col(
                            ColumnDef::new(StockEvents::OccurredDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockEvents::NoticedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockEvents::SavedDate).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(StockEvents::Signature).string().null())
                        .col(ColumnDef::new(StockEvents::ReasonFreeText).string().null())
                        .col(ColumnDef::new(StockEvents::SourceFreeText).string().null())
                        .col(
                            ColumnDef::new(StockEvents::DestinationFreeText)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(StockEvents::DocumentNumber).string().null())
                        .col(
                            ColumnDef::new(StockEvents::IsPhysicalInventory)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_events_facility_program")
                        .table(StockEvents::Table)
                        .col(StockEvents::FacilityId)
                        .col(StockEvents::ProgramId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockEvents::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum StockEvents {
        Table,
        Id,
        Quantity,
        ReasonId,
        FacilityId,
        ProgramId,
        OrderableId,
        LotId,
        UserId,
        SourceNodeId,
        DestinationNodeId,
        OccurredDate,
        NoticedDate,
        SavedDate,
        Signature,
        ReasonFreeText,
        SourceFreeText,
        DestinationFreeText,
        DocumentNumber,
        IsPhysicalInventory,
    }
}

mod m20240115_000004_create_stock_card_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240115_000004_create_stock_card_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockCards::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(StockCards::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(StockCards::OriginEventId).uuid().not_null())
                        .col(ColumnDef::new(StockCards::FacilityId).uuid().not_null())
                        .col(ColumnDef::new(StockCards::ProgramId).uuid().not_null())
                        .col(ColumnDef::new(StockCards::OrderableId).uuid().not_null())
                        .col(ColumnDef::new(StockCards::LotId).uuid().null())
                        .col(ColumnDef::new(StockCards::CreatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            // Card identity lookup is the hot path for event processing.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_cards_identity")
                        .table(StockCards::Table)
                        .col(StockCards::FacilityId)
                        .col(StockCards::ProgramId)
                        .col(StockCards::OrderableId)
                        .col(StockCards::LotId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StockCardLineItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockCardLineItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockCardLineItems::StockCardId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockCardLineItems::OriginEventId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockCardLineItems::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockCardLineItems::ReasonId).uuid().null())
                        .col(ColumnDef::new(StockCardLineItems::SourceNodeId).uuid().null())
                        .col(
                            ColumnDef::new(StockCardLineItems::DestinationNodeId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(StockCardLineItems::OccurredDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockCardLineItems::ProcessedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockCardLineItems::UserId).uuid().not_null())
                        .col(
                            ColumnDef::new(StockCardLineItems::StockOnHand)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockCardLineItems::ReasonFreeText)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(StockCardLineItems::SourceFreeText)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(StockCardLineItems::DestinationFreeText)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(StockCardLineItems::DocumentNumber)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(StockCardLineItems::Signature).string().null())
                        .col(ColumnDef::new(StockCardLineItems::VvmStatus).string().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_card_line_items_card")
                                .from(StockCardLineItems::Table, StockCardLineItems::StockCardId)
                                .to(StockCards::Table, StockCards::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_card_line_items_card")
                        .table(StockCardLineItems::Table)
                        .col(StockCardLineItems::StockCardId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_card_line_items_dates")
                        .table(StockCardLineItems::Table)
                        .col(StockCardLineItems::OccurredDate)
                        .col(StockCardLineItems::ProcessedDate)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockCardLineItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StockCards::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum StockCards {
        Table,
        Id,
        OriginEventId,
        FacilityId,
        ProgramId,
        OrderableId,
        LotId,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum StockCardLineItems {
        Table,
        Id,
        StockCardId,
        OriginEventId,
        Quantity,
        ReasonId,
        SourceNodeId,
        DestinationNodeId,
        OccurredDate,
        ProcessedDate,
        UserId,
        StockOnHand,
        ReasonFreeText,
        SourceFreeText,
        DestinationFreeText,
        DocumentNumber,
        Signature,
        VvmStatus,
    }
}

mod m20240115_000005_create_physical_inventory_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240115_000005_create_physical_inventory_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PhysicalInventories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PhysicalInventories::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PhysicalInventories::ProgramId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PhysicalInventories::FacilityId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PhysicalInventories::OccurredDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PhysicalInventories::DocumentNumber)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(PhysicalInventories::Signature).string().null())
                        .col(
                            ColumnDef::new(PhysicalInventories::IsDraft)
                                .boolean()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PhysicalInventories::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_physical_inventories_key")
                        .table(PhysicalInventories::Table)
                        .col(PhysicalInventories::ProgramId)
                        .col(PhysicalInventories::FacilityId)
                        .col(PhysicalInventories::IsDraft)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PhysicalInventoryLineItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PhysicalInventoryLineItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PhysicalInventoryLineItems::PhysicalInventoryId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PhysicalInventoryLineItems::OrderableId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PhysicalInventoryLineItems::LotId).uuid().null())
                        .col(
                            ColumnDef::new(PhysicalInventoryLineItems::Quantity)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PhysicalInventoryLineItems::VvmStatus)
                                .string()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_physical_inventory_line_items_inventory")
                                .from(
                                    PhysicalInventoryLineItems::Table,
                                    PhysicalInventoryLineItems::PhysicalInventoryId,
                                )
                                .to(PhysicalInventories::Table, PhysicalInventories::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StockAdjustments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockAdjustments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustments::StockCardLineItemId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustments::PhysicalInventoryLineItemId)
                                .uuid()
                                .null(),
                        )
                        .col(ColumnDef::new(StockAdjustments::ReasonId).uuid().not_null())
                        .col(
                            ColumnDef::new(StockAdjustments::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_adjustments_card_line_item")
                        .table(StockAdjustments::Table)
                        .col(StockAdjustments::StockCardLineItemId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_adjustments_inventory_line_item")
                        .table(StockAdjustments::Table)
                        .col(StockAdjustments::PhysicalInventoryLineItemId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockAdjustments::Table).to_owned())
                .await?;
            manager
                .drop_table(
                    Table::drop()
                        .table(PhysicalInventoryLineItems::Table)
                        .to_owned(),
                )
                .await?;
            manager
                .drop_table(Table::drop().table(PhysicalInventories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum PhysicalInventories {
        Table,
        Id,
        ProgramId,
        FacilityId,
        OccurredDate,
        DocumentNumber,
        Signature,
        IsDraft,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum PhysicalInventoryLineItems {
        Table,
        Id,
        PhysicalInventoryId,
        OrderableId,
        LotId,
        Quantity,
        VvmStatus,
    }

    #[derive(DeriveIden)]
    pub(super) enum StockAdjustments {
        Table,
        Id,
        StockCardLineItemId,
        PhysicalInventoryLineItemId,
        ReasonId,
        Quantity,
    }
}
