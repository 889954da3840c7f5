use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use solarworks_core::{BatchId, DomainError, DomainResult, Entity, GodownId, ProductId};

/// Largest accepted batch quantity (1e9). With [`MAX_UNIT_PRICE`] this keeps
/// quantity × price and its sums inside `Decimal` range.
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Largest accepted unit price (1e9).
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Input for recording a purchase batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBatch {
    pub product_id: ProductId,
    pub godown_id: GodownId,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub purchase_date: NaiveDate,
}

/// A discrete lot of purchased stock.
///
/// Everything except `remaining_quantity` is fixed at purchase time.
/// `remaining_quantity` only ever decreases, through [`Batch::consume`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    id: BatchId,
    product_id: ProductId,
    godown_id: GodownId,
    purchased_quantity: Decimal,
    remaining_quantity: Decimal,
    unit_price: Decimal,
    purchase_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl Batch {
    /// Record a new purchase. The whole purchased quantity is available.
    pub fn create(id: BatchId, new: NewBatch, created_at: DateTime<Utc>) -> DomainResult<Self> {
        if new.quantity <= Decimal::ZERO {
            return Err(DomainError::validation("batch quantity must be positive"));
        }
        let remaining = new.quantity;
        Self::restore(id, new, remaining, created_at)
    }

    /// Rebuild a batch from storage.
    pub fn restore(
        id: BatchId,
        new: NewBatch,
        remaining_quantity: Decimal,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if new.unit_price < Decimal::ZERO {
            return Err(DomainError::validation("unit price cannot be negative"));
        }
        if new.quantity > MAX_QUANTITY {
            return Err(DomainError::validation(format!(
                "batch quantity cannot exceed {MAX_QUANTITY}"
            )));
        }
        if new.unit_price > MAX_UNIT_PRICE {
            return Err(DomainError::validation(format!(
                "unit price cannot exceed {MAX_UNIT_PRICE}"
            )));
        }
        if remaining_quantity < Decimal::ZERO {
            return Err(DomainError::invariant("remaining quantity cannot be negative"));
        }
        if remaining_quantity > new.quantity {
            return Err(DomainError::invariant(
                "remaining quantity cannot exceed purchased quantity",
            ));
        }

        Ok(Self {
            id,
            product_id: new.product_id,
            godown_id: new.godown_id,
            purchased_quantity: new.quantity,
            remaining_quantity,
            unit_price: new.unit_price,
            purchase_date: new.purchase_date,
            created_at,
        })
    }

    pub fn id_typed(&self) -> BatchId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Godown the batch is stored in.
    pub fn godown_id(&self) -> GodownId {
        self.godown_id
    }

    pub fn purchased_quantity(&self) -> Decimal {
        self.purchased_quantity
    }

    pub fn remaining_quantity(&self) -> Decimal {
        self.remaining_quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn purchase_date(&self) -> NaiveDate {
        self.purchase_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_quantity <= Decimal::ZERO
    }

    /// Take `quantity` out of the batch.
    pub fn consume(&mut self, quantity: Decimal) -> DomainResult<()> {
        if quantity <= Decimal::ZERO {
            return Err(DomainError::validation("consumed quantity must be positive"));
        }
        if quantity > self.remaining_quantity {
            return Err(DomainError::invariant(format!(
                "batch {} holds {} but {} was requested",
                self.id, self.remaining_quantity, quantity
            )));
        }
        self.remaining_quantity -= quantity;
        Ok(())
    }
}

impl Entity for Batch {
    type Id = BatchId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Order batches oldest purchase first. Stable: equal dates keep their order.
pub fn sort_fifo(batches: &mut [Batch]) {
    batches.sort_by_key(|b| b.purchase_date);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn new_batch(quantity: Decimal) -> NewBatch {
        NewBatch {
            product_id: ProductId::new(),
            godown_id: GodownId::new(),
            quantity,
            unit_price: dec!(12.50),
            purchase_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn create_makes_whole_purchase_available() {
        let batch = Batch::create(BatchId::new(), new_batch(dec!(40)), Utc::now()).unwrap();
        assert_eq!(batch.remaining_quantity(), dec!(40));
        assert_eq!(batch.purchased_quantity(), dec!(40));
        assert!(!batch.is_exhausted());
    }

    #[test]
    fn create_rejects_non_positive_quantity() {
        let err = Batch::create(BatchId::new(), new_batch(dec!(0)), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn create_rejects_negative_price() {
        let mut new = new_batch(dec!(1));
        new.unit_price = dec!(-1);
        let err = Batch::create(BatchId::new(), new, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn create_rejects_out_of_range_magnitudes() {
        let huge = dec!(100000000000000000000);

        let err = Batch::create(BatchId::new(), new_batch(huge), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let mut new = new_batch(dec!(1));
        new.unit_price = huge;
        let err = Batch::create(BatchId::new(), new, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let mut new = new_batch(MAX_QUANTITY);
        new.unit_price = MAX_UNIT_PRICE;
        let batch = Batch::create(BatchId::new(), new, Utc::now()).unwrap();
        assert_eq!(
            batch.remaining_quantity() * batch.unit_price(),
            dec!(1000000000000000000)
        );
    }

    #[test]
    fn restore_rejects_remaining_above_purchase() {
        let err = Batch::restore(BatchId::new(), new_batch(dec!(5)), dec!(6), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn consume_reduces_remaining_until_exhausted() {
        let mut batch = Batch::create(BatchId::new(), new_batch(dec!(10)), Utc::now()).unwrap();
        batch.consume(dec!(4)).unwrap();
        assert_eq!(batch.remaining_quantity(), dec!(6));
        batch.consume(dec!(6)).unwrap();
        assert!(batch.is_exhausted());
    }

    #[test]
    fn consume_more_than_remaining_leaves_batch_untouched() {
        let mut batch = Batch::create(BatchId::new(), new_batch(dec!(3)), Utc::now()).unwrap();
        let err = batch.consume(dec!(3.5)).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(batch.remaining_quantity(), dec!(3));
    }

    #[test]
    fn sort_fifo_is_stable_for_equal_dates() {
        let mut first = new_batch(dec!(1));
        first.purchase_date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let mut second = first.clone();
        second.quantity = dec!(2);
        let mut oldest = first.clone();
        oldest.purchase_date = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();

        let a = Batch::create(BatchId::new(), first, Utc::now()).unwrap();
        let b = Batch::create(BatchId::new(), second, Utc::now()).unwrap();
        let c = Batch::create(BatchId::new(), oldest, Utc::now()).unwrap();
        let mut batches = vec![a.clone(), b.clone(), c.clone()];
        sort_fifo(&mut batches);

        let ids: Vec<BatchId> = batches.iter().map(Batch::id_typed).collect();
        assert_eq!(ids, vec![c.id_typed(), a.id_typed(), b.id_typed()]);
    }
}
