pub mod node;
pub mod organization;
pub mod physical_inventory;
pub mod physical_inventory_line_item;
pub mod stock_adjustment;
pub mod stock_card;
pub mod stock_card_line_item;
pub mod stock_event;
pub mod stock_line_item_reason;
pub mod valid_destination_assignment;
pub mod valid_reason_assignment;
pub mod valid_source_assignment;
