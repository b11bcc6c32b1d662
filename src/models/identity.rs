use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The orderable/lot part of a stock card identity. Events are grouped by
/// this key when locating the card they act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderableLotIdentity {
    pub orderable_id: Uuid,
    pub lot_id: Option<Uuid>,
}

impl OrderableLotIdentity {
    pub fn new(orderable_id: Uuid, lot_id: Option<Uuid>) -> Self {
        Self {
            orderable_id,
            lot_id,
        }
    }
}
