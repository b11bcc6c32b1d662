use crate::models::identity::OrderableLotIdentity;
use crate::models::reason::Reason;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Upper limit for any running balance. Balances are folded in i64 so the
/// ceiling is detectable without wrapping; the persisted column is i32.
pub const STOCK_ON_HAND_CEILING: i64 = i32::MAX as i64;

/// A signed reconciliation entry: non-negative magnitude, sign taken from the
/// reason type (DEBIT subtracts, anything else adds).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedAdjustment {
    pub reason: Reason,
    pub quantity: i32,
}

impl SignedAdjustment {
    pub fn signed_quantity(&self) -> i64 {
        if self.reason.is_debit() {
            -i64::from(self.quantity)
        } else {
            i64::from(self.quantity)
        }
    }
}

/// One movement on a card, in domain form. `stock_on_hand` is filled in by
/// `StockCard::recalculate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLineItem {
    pub id: Uuid,
    pub quantity: i32,
    pub reason: Option<Reason>,
    pub source_node_id: Option<Uuid>,
    pub destination_node_id: Option<Uuid>,
    pub occurred_date: DateTime<Utc>,
    pub processed_date: DateTime<Utc>,
    pub adjustments: Vec<SignedAdjustment>,
    pub stock_on_hand: Option<i64>,
}

impl CardLineItem {
    /// Signed contribution of this movement to the running balance.
    ///
    /// An item carrying stock adjustments (physical inventory reconciliation,
    /// balance-adjustment reasons) contributes the sum of the adjustments'
    /// signed quantities; its own quantity only participates in the
    /// reconciliation check. Otherwise the reason type decides the sign, and
    /// reasonless transfers fall back to receive (+) for sources and issue
    /// (-) for destinations.
    pub fn signed_delta(&self) -> i64 {
        if !self.adjustments.is_empty() {
            return self.adjustments.iter().map(SignedAdjustment::signed_quantity).sum();
        }
        match &self.reason {
            Some(reason) if reason.is_credit() => i64::from(self.quantity),
            Some(reason) if reason.is_debit() => -i64::from(self.quantity),
            Some(_) => 0,
            None if self.source_node_id.is_some() => i64::from(self.quantity),
            None if self.destination_node_id.is_some() => -i64::from(self.quantity),
            None => 0,
        }
    }

    pub fn is_debit_like(&self) -> bool {
        self.destination_node_id.is_some()
            || self.reason.as_ref().map(Reason::is_debit).unwrap_or(false)
    }
}

/// Running ledger for one (facility, program, orderable, lot). The cached
/// `stock_on_hand` is valid only after `recalculate`; it is never persisted.
///
/// `Clone` is the copy contract used for speculative recalculation: the
/// quantity validator clones the aggregate, appends candidate items, and
/// recalculates on the copy so a rejection can never leak mutations into
/// persisted state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockCard {
    pub id: Uuid,
    pub facility_id: Uuid,
    pub program_id: Uuid,
    pub orderable_id: Uuid,
    pub lot_id: Option<Uuid>,
    pub line_items: Vec<CardLineItem>,
    pub stock_on_hand: Option<i64>,
}

impl StockCard {
    /// An empty, not-yet-persisted card for an identity with no history.
    pub fn empty(
        facility_id: Uuid,
        program_id: Uuid,
        orderable_id: Uuid,
        lot_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            facility_id,
            program_id,
            orderable_id,
            lot_id,
            line_items: Vec::new(),
            stock_on_hand: None,
        }
    }

    pub fn identity(&self) -> OrderableLotIdentity {
        OrderableLotIdentity::new(self.orderable_id, self.lot_id)
    }

    /// Reorder line items into the canonical total order and fold the running
    /// balance onto every item and the card itself.
    ///
    /// Order: occurred date, then processed date for same-day entries
    /// recorded at different times, then line item id so that identical
    /// timestamps still sort deterministically and repeated recalculation is
    /// idempotent. An empty item list leaves the cached balance untouched.
    ///
    /// The fold never rejects; non-negativity and the i32 ceiling are
    /// enforced by validators inspecting the result.
    pub fn recalculate(&mut self) {
        if self.line_items.is_empty() {
            return;
        }

        self.line_items.sort_by(|a, b| {
            (a.occurred_date, a.processed_date, a.id).cmp(&(
                b.occurred_date,
                b.processed_date,
                b.id,
            ))
        });

        let mut running: i64 = 0;
        for item in &mut self.line_items {
            running += item.signed_delta();
            item.stock_on_hand = Some(running);
        }
        self.stock_on_hand = Some(running);
    }

    /// The balance the committed history adds up to, without reordering or
    /// mutating anything. Zero for a card with no items.
    pub fn computed_stock_on_hand(&self) -> i64 {
        self.line_items.iter().map(CardLineItem::signed_delta).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reason::{physical_credit, physical_debit, Reason, ReasonCategory, ReasonType};
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, hour, 0, 0).unwrap()
    }

    fn credit_reason() -> Reason {
        Reason {
            id: Uuid::new_v4(),
            name: "Donation".to_string(),
            description: None,
            reason_type: ReasonType::Credit,
            reason_category: ReasonCategory::Adjustment,
            is_free_text_allowed: true,
        }
    }

    fn debit_reason() -> Reason {
        Reason {
            id: Uuid::new_v4(),
            name: "Damage".to_string(),
            description: None,
            reason_type: ReasonType::Debit,
            reason_category: ReasonCategory::Adjustment,
            is_free_text_allowed: true,
        }
    }

    fn item(quantity: i32, reason: Option<Reason>, occurred: DateTime<Utc>) -> CardLineItem {
        CardLineItem {
            id: Uuid::new_v4(),
            quantity,
            reason,
            source_node_id: None,
            destination_node_id: None,
            occurred_date: occurred,
            processed_date: occurred,
            adjustments: Vec::new(),
            stock_on_hand: None,
        }
    }

    fn card_with(items: Vec<CardLineItem>) -> StockCard {
        let mut card = StockCard::empty(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), None);
        card.line_items = items;
        card
    }

    #[test]
    fn empty_card_recalculation_is_a_no_op() {
        let mut card = card_with(Vec::new());
        card.recalculate();
        assert_eq!(card.stock_on_hand, None);
    }

    #[test]
    fn folds_running_balance_onto_each_item_and_the_card() {
        let mut card = card_with(vec![
            item(10, Some(credit_reason()), at(8)),
            item(3, Some(debit_reason()), at(9)),
            item(5, Some(credit_reason()), at(10)),
        ]);

        card.recalculate();

        let balances: Vec<i64> = card
            .line_items
            .iter()
            .map(|item| item.stock_on_hand.unwrap())
            .collect();
        assert_eq!(balances, vec![10, 7, 12]);
        assert_eq!(card.stock_on_hand, Some(12));
    }

    #[test]
    fn orders_by_occurred_then_processed_date() {
        let mut early = item(10, Some(credit_reason()), at(8));
        early.processed_date = at(15); // recorded late
        let mut late = item(4, Some(debit_reason()), at(12));
        late.processed_date = at(13);

        // Inserted out of business order.
        let mut card = card_with(vec![late, early]);
        card.recalculate();

        assert_eq!(card.line_items[0].quantity, 10);
        assert_eq!(card.line_items[0].stock_on_hand, Some(10));
        assert_eq!(card.line_items[1].stock_on_hand, Some(6));
    }

    #[test]
    fn same_timestamp_ties_break_on_id_deterministically() {
        let mut a = item(10, Some(credit_reason()), at(8));
        let mut b = item(2, Some(debit_reason()), at(8));
        a.id = Uuid::from_u128(1);
        b.id = Uuid::from_u128(2);

        let mut forward = card_with(vec![a.clone(), b.clone()]);
        let mut reversed = card_with(vec![b, a]);
        forward.recalculate();
        reversed.recalculate();

        assert_eq!(forward.line_items, reversed.line_items);
        assert_eq!(forward.stock_on_hand, Some(8));
    }

    #[test]
    fn sourceless_receive_and_destination_issue_resolve_signs() {
        let mut receive = item(7, None, at(8));
        receive.source_node_id = Some(Uuid::new_v4());
        let mut issue = item(2, None, at(9));
        issue.destination_node_id = Some(Uuid::new_v4());

        let mut card = card_with(vec![receive, issue]);
        card.recalculate();

        assert_eq!(card.stock_on_hand, Some(5));
    }

    #[test]
    fn adjustment_list_overrides_item_quantity() {
        // Physical inventory line: counted 15 against 10 on hand, reconciled
        // with a +5 overstock adjustment. The counted quantity itself does
        // not feed the fold.
        let mut inventory_line = item(15, None, at(10));
        inventory_line.adjustments = vec![SignedAdjustment {
            reason: physical_credit(),
            quantity: 5,
        }];

        let mut card = card_with(vec![
            item(10, Some(credit_reason()), at(8)),
            inventory_line,
        ]);
        card.recalculate();

        assert_eq!(card.stock_on_hand, Some(15));
    }

    #[test]
    fn mixed_adjustments_sum_signed() {
        let mut line = item(9, None, at(10));
        line.adjustments = vec![
            SignedAdjustment {
                reason: physical_credit(),
                quantity: 4,
            },
            SignedAdjustment {
                reason: physical_debit(),
                quantity: 5,
            },
        ];
        assert_eq!(line.signed_delta(), -1);
    }

    #[test]
    fn computed_stock_on_hand_matches_recalculated_total() {
        let mut card = card_with(vec![
            item(10, Some(credit_reason()), at(8)),
            item(4, Some(debit_reason()), at(9)),
        ]);
        assert_eq!(card.computed_stock_on_hand(), 6);
        card.recalculate();
        assert_eq!(card.stock_on_hand, Some(card.computed_stock_on_hand()));
    }

    prop_compose! {
        fn arb_item()(
            quantity in 0..500i32,
            credit in any::<bool>(),
            hour in 0..24u32,
            id in any::<u128>(),
        ) -> CardLineItem {
            let mut generated = item(
                quantity,
                Some(if credit { credit_reason() } else { debit_reason() }),
                at(hour % 24),
            );
            generated.id = Uuid::from_u128(id);
            generated
        }
    }

    proptest! {
        #[test]
        fn recalculation_is_idempotent(items in prop::collection::vec(arb_item(), 0..24)) {
            let mut once = card_with(items);
            once.recalculate();
            let mut twice = once.clone();
            twice.recalculate();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn final_balance_is_last_item_balance_and_sum_of_deltas(
            items in prop::collection::vec(arb_item(), 1..24),
        ) {
            let mut card = card_with(items);
            card.recalculate();
            let last = card.line_items.last().unwrap().stock_on_hand;
            prop_assert_eq!(card.stock_on_hand, last);
            let sum: i64 = card.line_items.iter().map(CardLineItem::signed_delta).sum();
            prop_assert_eq!(card.stock_on_hand, Some(sum));
        }

        #[test]
        fn credits_never_decrease_debits_never_increase(
            items in prop::collection::vec(arb_item(), 1..24),
        ) {
            let mut card = card_with(items);
            card.recalculate();
            let mut previous = 0i64;
            for line in &card.line_items {
                let balance = line.stock_on_hand.unwrap();
                let reason = line.reason.as_ref().unwrap();
                if reason.is_credit() {
                    prop_assert!(balance >= previous);
                } else {
                    prop_assert!(balance <= previous);
                }
                previous = balance;
            }
        }
    }
}
