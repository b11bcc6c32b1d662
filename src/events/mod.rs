use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// A stock event passed validation and its line item was committed.
    StockEventProcessed {
        event_id: Uuid,
        program_id: Uuid,
        facility_id: Uuid,
        orderable_id: Uuid,
        stock_on_hand: i64,
    },
    /// A card's recalculated balance reached zero.
    StockoutOccurred {
        stock_card_id: Uuid,
        program_id: Uuid,
        facility_id: Uuid,
        orderable_id: Uuid,
    },
    /// A physical inventory was submitted and converted into stock events.
    PhysicalInventorySubmitted {
        inventory_id: Uuid,
        program_id: Uuid,
        facility_id: Uuid,
        line_count: usize,
    },
    ReasonCreated(Uuid),
    ReasonUpdated(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel. Stockouts are the one event with a downstream
/// consumer (the notification service); the rest are logged for audit.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::StockoutOccurred {
                stock_card_id,
                program_id,
                facility_id,
                orderable_id,
            } => {
                warn!(
                    %stock_card_id,
                    %program_id,
                    %facility_id,
                    %orderable_id,
                    "Stockout: card balance reached zero"
                );
            }
            other => {
                info!("Received event: {:?}", other);
            }
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sender_delivers_events() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        sender
            .send(Event::ReasonCreated(Uuid::new_v4()))
            .await
            .unwrap();

        assert!(matches!(rx.recv().await, Some(Event::ReasonCreated(_))));
    }

    #[tokio::test]
    async fn send_fails_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        assert!(sender
            .send(Event::ReasonUpdated(Uuid::new_v4()))
            .await
            .is_err());
    }
}
