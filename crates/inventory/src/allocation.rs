//! FIFO batch allocation.
//!
//! - [`suggest`] proposes how to cover a required quantity, oldest batch first.
//! - [`review_selection`] compares what the user actually picked with what was required.
//! - [`apply_allocation`] validates a selection and consumes the batches, all or nothing.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use solarworks_core::{AllocationId, BatchId, DomainError, DomainResult, ProductId, ProjectId};

use crate::batch::Batch;

/// Quantity drawn from one batch, priced at the batch's unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationLine {
    pub batch_id: BatchId,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl AllocationLine {
    pub fn cost(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// How much of a requirement is covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fulfillment {
    /// Nothing was allocated (no stock, or nothing was required).
    Nothing,
    /// Some stock was allocated but less than required.
    Partial,
    /// The full requirement is covered.
    Complete,
}

impl Fulfillment {
    fn classify(required: Decimal, allocated: Decimal) -> Self {
        if allocated <= Decimal::ZERO {
            Fulfillment::Nothing
        } else if allocated < required {
            Fulfillment::Partial
        } else {
            Fulfillment::Complete
        }
    }
}

/// Result of [`suggest`]: per-batch quantities, oldest purchase first.
///
/// Behaves as an insertion-ordered map from batch id to quantity. Batches that
/// receive nothing are absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationSuggestion {
    required: Decimal,
    lines: Vec<AllocationLine>,
}

impl AllocationSuggestion {
    pub fn required(&self) -> Decimal {
        self.required
    }

    pub fn lines(&self) -> &[AllocationLine] {
        &self.lines
    }

    /// Quantity suggested for `batch_id`, if any.
    pub fn get(&self, batch_id: BatchId) -> Option<Decimal> {
        self.lines
            .iter()
            .find(|l| l.batch_id == batch_id)
            .map(|l| l.quantity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BatchId, Decimal)> + '_ {
        self.lines.iter().map(|l| (l.batch_id, l.quantity))
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn allocated(&self) -> Decimal {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Unmet part of the requirement (zero when fully covered).
    pub fn shortfall(&self) -> Decimal {
        (self.required - self.allocated()).max(Decimal::ZERO)
    }

    pub fn fulfillment(&self) -> Fulfillment {
        Fulfillment::classify(self.required, self.allocated())
    }

    /// FIFO cost of the suggested quantities.
    pub fn cost(&self) -> Decimal {
        self.lines.iter().map(AllocationLine::cost).sum()
    }

    /// The suggestion expressed as a selection, ready to be committed.
    pub fn to_selections(&self) -> Vec<BatchSelection> {
        self.lines
            .iter()
            .map(|l| BatchSelection {
                batch_id: l.batch_id,
                quantity: l.quantity,
            })
            .collect()
    }
}

/// Suggest a FIFO allocation of `required` across `batches`.
///
/// Batches are visited by ascending purchase date (ties keep input order) and
/// each contributes `min(remaining_quantity, still_required)`. A non-positive
/// requirement yields an empty suggestion; insufficient stock yields a partial
/// one. Never fails. A batch id listed twice only counts once.
pub fn suggest(required: Decimal, batches: &[Batch]) -> AllocationSuggestion {
    let mut lines = Vec::new();
    if required <= Decimal::ZERO {
        return AllocationSuggestion { required, lines };
    }

    let mut ordered: Vec<&Batch> = batches.iter().collect();
    ordered.sort_by_key(|b| b.purchase_date());

    let mut seen = HashSet::new();
    let mut remaining = required;
    for batch in ordered {
        if remaining <= Decimal::ZERO {
            break;
        }
        if !seen.insert(batch.id_typed()) {
            continue;
        }

        let take = batch.remaining_quantity().min(remaining);
        if take > Decimal::ZERO {
            lines.push(AllocationLine {
                batch_id: batch.id_typed(),
                quantity: take,
                unit_price: batch.unit_price(),
            });
            remaining -= take;
        }
    }

    AllocationSuggestion { required, lines }
}

/// A user-chosen quantity from one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSelection {
    pub batch_id: BatchId,
    pub quantity: Decimal,
}

/// Comparison of a selection against the required quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectionReview {
    pub required: Decimal,
    pub selected: Decimal,
}

impl SelectionReview {
    /// `selected - required`: negative when short, positive when over.
    pub fn difference(&self) -> Decimal {
        self.selected.saturating_sub(self.required)
    }

    /// The selected total differs from the requirement; the user has to confirm.
    pub fn needs_confirmation(&self) -> bool {
        self.selected != self.required
    }

    pub fn fulfillment(&self) -> Fulfillment {
        Fulfillment::classify(self.required, self.selected)
    }
}

/// Totals the picks. The total saturates, so absurd client input is reported
/// as a mismatch instead of overflowing.
pub fn review_selection(required: Decimal, selections: &[BatchSelection]) -> SelectionReview {
    SelectionReview {
        required,
        selected: selections
            .iter()
            .fold(Decimal::ZERO, |acc, s| acc.saturating_add(s.quantity)),
    }
}

/// Validate `selections` against `batches` and consume them.
///
/// Every selection is checked before any batch is touched, so on error
/// `batches` is unchanged. Returns the priced lines in selection order.
pub fn apply_allocation(
    batches: &mut [Batch],
    selections: &[BatchSelection],
) -> DomainResult<Vec<AllocationLine>> {
    if selections.is_empty() {
        return Err(DomainError::validation(
            "allocation needs at least one batch selection",
        ));
    }

    let mut seen = HashSet::new();
    let mut planned = Vec::with_capacity(selections.len());
    for sel in selections {
        if sel.quantity <= Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "quantity for batch {} must be positive",
                sel.batch_id
            )));
        }
        if !seen.insert(sel.batch_id) {
            return Err(DomainError::validation(format!(
                "batch {} selected more than once",
                sel.batch_id
            )));
        }

        let idx = batches
            .iter()
            .position(|b| b.id_typed() == sel.batch_id)
            .ok_or_else(|| DomainError::not_found(format!("batch {}", sel.batch_id)))?;

        let available = batches[idx].remaining_quantity();
        if sel.quantity > available {
            return Err(DomainError::invariant(format!(
                "batch {} holds {} but {} was selected",
                sel.batch_id, available, sel.quantity
            )));
        }
        planned.push((idx, sel.quantity));
    }

    let mut lines = Vec::with_capacity(planned.len());
    for (idx, quantity) in planned {
        let batch = &mut batches[idx];
        batch.consume(quantity)?;
        lines.push(AllocationLine {
            batch_id: batch.id_typed(),
            quantity,
            unit_price: batch.unit_price(),
        });
    }

    Ok(lines)
}

/// A committed allocation of one product's stock, optionally to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: AllocationId,
    pub product_id: ProductId,
    pub project_id: Option<ProjectId>,
    pub lines: Vec<AllocationLine>,
    pub committed_at: DateTime<Utc>,
}

impl Allocation {
    pub fn total_quantity(&self) -> Decimal {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn cost(&self) -> Decimal {
        self.lines.iter().map(AllocationLine::cost).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{NewBatch, MAX_QUANTITY, MAX_UNIT_PRICE};
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use solarworks_core::GodownId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn batch(quantity: Decimal, purchase_date: NaiveDate) -> Batch {
        batch_priced(quantity, purchase_date, dec!(10))
    }

    fn batch_priced(quantity: Decimal, purchase_date: NaiveDate, unit_price: Decimal) -> Batch {
        Batch::create(
            BatchId::new(),
            NewBatch {
                product_id: ProductId::new(),
                godown_id: GodownId::new(),
                quantity,
                unit_price,
                purchase_date,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn older_batch_is_used_up_before_newer() {
        let a = batch(dec!(30), date(2024, 1, 1));
        let b = batch(dec!(50), date(2024, 2, 1));

        let s = suggest(dec!(40), &[a.clone(), b.clone()]);

        let got: Vec<(BatchId, Decimal)> = s.iter().collect();
        assert_eq!(got, vec![(a.id_typed(), dec!(30)), (b.id_typed(), dec!(10))]);
        assert_eq!(s.fulfillment(), Fulfillment::Complete);
        assert_eq!(s.shortfall(), dec!(0));
    }

    #[test]
    fn zero_requirement_allocates_nothing() {
        let a = batch(dec!(10), date(2024, 1, 1));
        let s = suggest(dec!(0), &[a]);
        assert!(s.is_empty());
        assert_eq!(s.fulfillment(), Fulfillment::Nothing);
    }

    #[test]
    fn no_batches_allocates_nothing() {
        let s = suggest(dec!(100), &[]);
        assert!(s.is_empty());
        assert_eq!(s.shortfall(), dec!(100));
    }

    #[test]
    fn input_order_does_not_override_purchase_date() {
        let a = batch(dec!(5), date(2024, 3, 1));
        let b = batch(dec!(5), date(2024, 1, 1));

        let s = suggest(dec!(7), &[a.clone(), b.clone()]);

        let got: Vec<(BatchId, Decimal)> = s.iter().collect();
        assert_eq!(got, vec![(b.id_typed(), dec!(5)), (a.id_typed(), dec!(2))]);
    }

    #[test]
    fn same_day_batches_keep_input_order() {
        let y = batch(dec!(5), date(2024, 1, 1));
        let x = batch(dec!(5), date(2024, 1, 1));

        let s = suggest(dec!(7), &[y.clone(), x.clone()]);

        let got: Vec<(BatchId, Decimal)> = s.iter().collect();
        assert_eq!(got, vec![(y.id_typed(), dec!(5)), (x.id_typed(), dec!(2))]);
    }

    #[test]
    fn largest_batches_price_without_overflow() {
        let a = batch_priced(MAX_QUANTITY, date(2024, 1, 1), MAX_UNIT_PRICE);
        let b = batch_priced(MAX_QUANTITY, date(2024, 1, 2), MAX_UNIT_PRICE);

        let s = suggest(Decimal::MAX, &[a, b]);

        assert_eq!(s.allocated(), MAX_QUANTITY * dec!(2));
        assert_eq!(s.cost(), dec!(2000000000000000000));
        assert_eq!(s.fulfillment(), Fulfillment::Partial);
    }

    #[test]
    fn review_of_huge_selection_saturates() {
        let picks = [
            BatchSelection { batch_id: BatchId::new(), quantity: Decimal::MAX },
            BatchSelection { batch_id: BatchId::new(), quantity: Decimal::MAX },
        ];
        let review = review_selection(dec!(5), &picks);
        assert_eq!(review.selected, Decimal::MAX);
        assert!(review.needs_confirmation());
        assert_eq!(review.fulfillment(), Fulfillment::Complete);
    }

    #[test]
    fn insufficient_stock_is_partial_with_shortfall() {
        let a = batch(dec!(4), date(2024, 1, 1));
        let b = batch(dec!(2.5), date(2024, 1, 2));

        let s = suggest(dec!(10), &[a, b]);

        assert_eq!(s.allocated(), dec!(6.5));
        assert_eq!(s.shortfall(), dec!(3.5));
        assert_eq!(s.fulfillment(), Fulfillment::Partial);
    }

    #[test]
    fn exhausted_batches_are_skipped() {
        let mut empty = batch(dec!(3), date(2023, 6, 1));
        empty.consume(dec!(3)).unwrap();
        let b = batch(dec!(8), date(2024, 1, 1));

        let s = suggest(dec!(2), &[empty.clone(), b.clone()]);

        assert_eq!(s.get(empty.id_typed()), None);
        assert_eq!(s.get(b.id_typed()), Some(dec!(2)));
    }

    #[test]
    fn suggestion_cost_uses_each_batch_price() {
        let a = batch_priced(dec!(10), date(2024, 1, 1), dec!(100));
        let b = batch_priced(dec!(10), date(2024, 2, 1), dec!(150));

        let s = suggest(dec!(15), &[b, a]);

        assert_eq!(s.cost(), dec!(1750));
    }

    #[test]
    fn review_flags_mismatched_totals() {
        let id = BatchId::new();
        let exact = review_selection(dec!(5), &[BatchSelection { batch_id: id, quantity: dec!(5) }]);
        assert!(!exact.needs_confirmation());

        let short = review_selection(dec!(5), &[BatchSelection { batch_id: id, quantity: dec!(3) }]);
        assert!(short.needs_confirmation());
        assert_eq!(short.difference(), dec!(-2));
        assert_eq!(short.fulfillment(), Fulfillment::Partial);
    }

    #[test]
    fn apply_consumes_selected_batches_and_prices_lines() {
        let a = batch_priced(dec!(30), date(2024, 1, 1), dec!(2));
        let b = batch_priced(dec!(50), date(2024, 2, 1), dec!(3));
        let mut batches = vec![a.clone(), b.clone()];

        let selections = suggest(dec!(40), &batches).to_selections();
        let lines = apply_allocation(&mut batches, &selections).unwrap();

        assert_eq!(batches[0].remaining_quantity(), dec!(0));
        assert_eq!(batches[1].remaining_quantity(), dec!(40));
        assert_eq!(lines[0].unit_price, dec!(2));
        assert_eq!(lines.iter().map(AllocationLine::cost).sum::<Decimal>(), dec!(90));
    }

    #[test]
    fn apply_is_all_or_nothing() {
        let a = batch(dec!(10), date(2024, 1, 1));
        let b = batch(dec!(1), date(2024, 2, 1));
        let mut batches = vec![a.clone(), b.clone()];
        let before = batches.clone();

        let err = apply_allocation(
            &mut batches,
            &[
                BatchSelection { batch_id: a.id_typed(), quantity: dec!(5) },
                BatchSelection { batch_id: b.id_typed(), quantity: dec!(2) },
            ],
        )
        .unwrap_err();

        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(batches, before);
    }

    #[test]
    fn apply_rejects_bad_selections() {
        let a = batch(dec!(10), date(2024, 1, 1));
        let mut batches = vec![a.clone()];

        let err = apply_allocation(&mut batches, &[]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = apply_allocation(
            &mut batches,
            &[BatchSelection { batch_id: a.id_typed(), quantity: dec!(0) }],
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = apply_allocation(
            &mut batches,
            &[
                BatchSelection { batch_id: a.id_typed(), quantity: dec!(1) },
                BatchSelection { batch_id: a.id_typed(), quantity: dec!(1) },
            ],
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = apply_allocation(
            &mut batches,
            &[BatchSelection { batch_id: BatchId::new(), quantity: dec!(1) }],
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        assert_eq!(batches[0].remaining_quantity(), dec!(10));
    }

    fn batches_from(shape: &[(u32, u32, i64)]) -> Vec<Batch> {
        let base = date(2024, 1, 1);
        shape.iter()
            .map(|&(whole, cents, day)| {
                let mut b = batch(
                    Decimal::from(whole) + Decimal::new(i64::from(cents), 2) + dec!(0.01),
                    base + chrono::Duration::days(day),
                );
                // Leave some batches partially consumed to vary remaining stock.
                if whole > 50 {
                    b.consume(Decimal::from(whole / 2)).unwrap();
                }
                b
            })
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Per-batch quantities never exceed remaining stock and the total never
        /// exceeds the requirement.
        #[test]
        fn never_over_allocates(
            shape in prop::collection::vec((0u32..100, 0u32..100, 0i64..90), 0..12),
            required in -50i64..600
        ) {
            let batches = batches_from(&shape);
            let required = Decimal::from(required);
            let s = suggest(required, &batches);

            for (id, qty) in s.iter() {
                let b = batches.iter().find(|b| b.id_typed() == id).unwrap();
                prop_assert!(qty > Decimal::ZERO);
                prop_assert!(qty <= b.remaining_quantity());
            }
            prop_assert!(s.allocated() <= required.max(Decimal::ZERO));
        }

        /// A batch only receives stock once every strictly older batch is used up.
        #[test]
        fn older_batches_exhausted_first(
            shape in prop::collection::vec((0u32..100, 0u32..100, 0i64..90), 1..12),
            required in 1i64..600
        ) {
            let batches = batches_from(&shape);
            let s = suggest(Decimal::from(required), &batches);

            for (id, _) in s.iter() {
                let taken = batches.iter().find(|b| b.id_typed() == id).unwrap();
                for older in batches.iter().filter(|b| b.purchase_date() < taken.purchase_date()) {
                    prop_assert_eq!(s.get(older.id_typed()).unwrap_or(Decimal::ZERO), older.remaining_quantity());
                }
            }

            let dates: Vec<NaiveDate> = s
                .iter()
                .map(|(id, _)| batches.iter().find(|b| b.id_typed() == id).unwrap().purchase_date())
                .collect();
            prop_assert!(dates.windows(2).all(|w| w[0] <= w[1]));
        }

        #[test]
        fn non_positive_requirement_is_empty(
            shape in prop::collection::vec((0u32..100, 0u32..100, 0i64..90), 0..8),
            required in -1000i64..=0
        ) {
            let batches = batches_from(&shape);
            prop_assert!(suggest(Decimal::from(required), &batches).is_empty());
        }

        /// When demand exceeds supply, all supply is allocated.
        #[test]
        fn short_supply_is_fully_allocated(
            shape in prop::collection::vec((0u32..100, 0u32..100, 0i64..90), 0..8),
            extra in 1i64..100
        ) {
            let batches = batches_from(&shape);
            let supply: Decimal = batches.iter().map(Batch::remaining_quantity).sum();
            let s = suggest(supply + Decimal::from(extra), &batches);

            prop_assert_eq!(s.allocated(), supply);
            prop_assert_eq!(s.shortfall(), Decimal::from(extra));
        }
    }
}
