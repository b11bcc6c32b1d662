use crate::entities::node;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a movement endpoint points at: a reference-data facility or a locally
/// administered organization. The storage row keeps a flag plus foreign id;
/// this is the typed view the rest of the crate works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "referenceId", rename_all = "camelCase")]
pub enum NodeRef {
    RefDataFacility(Uuid),
    Organization(Uuid),
}

impl NodeRef {
    pub fn from_entity(model: &node::Model) -> Self {
        if model.is_ref_data_facility {
            NodeRef::RefDataFacility(model.reference_id)
        } else {
            NodeRef::Organization(model.reference_id)
        }
    }

    pub fn reference_id(&self) -> Uuid {
        match self {
            NodeRef::RefDataFacility(id) | NodeRef::Organization(id) => *id,
        }
    }

    pub fn is_ref_data_facility(&self) -> bool {
        matches!(self, NodeRef::RefDataFacility(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_flag_selects_variant() {
        let reference_id = Uuid::new_v4();
        let facility = node::Model {
            id: Uuid::new_v4(),
            reference_id,
            is_ref_data_facility: true,
        };
        let organization = node::Model {
            id: Uuid::new_v4(),
            reference_id,
            is_ref_data_facility: false,
        };

        assert_eq!(
            NodeRef::from_entity(&facility),
            NodeRef::RefDataFacility(reference_id)
        );
        assert_eq!(
            NodeRef::from_entity(&organization),
            NodeRef::Organization(reference_id)
        );
        assert!(NodeRef::from_entity(&facility).is_ref_data_facility());
    }
}
