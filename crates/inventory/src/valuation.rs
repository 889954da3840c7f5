//! Stock valuation over a product's batches.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::batch::Batch;

/// Snapshot of the stock held in a set of batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockSummary {
    pub batch_count: usize,
    /// Batches that still hold stock.
    pub active_batches: usize,
    pub total_remaining: Decimal,
    /// Σ remaining × unit price.
    pub total_value: Decimal,
    /// Purchase date of the oldest batch that still holds stock.
    pub oldest_purchase_date: Option<NaiveDate>,
    /// `total_value / total_remaining`, rounded to 4 places. None when no stock remains.
    pub average_unit_cost: Option<Decimal>,
}

impl StockSummary {
    pub fn from_batches(batches: &[Batch]) -> Self {
        let active: Vec<&Batch> = batches.iter().filter(|b| !b.is_exhausted()).collect();

        let total_remaining: Decimal = active.iter().map(|b| b.remaining_quantity()).sum();
        let total_value: Decimal = active
            .iter()
            .map(|b| b.remaining_quantity() * b.unit_price())
            .sum();

        let average_unit_cost = if total_remaining > Decimal::ZERO {
            Some((total_value / total_remaining).round_dp(4))
        } else {
            None
        };

        Self {
            batch_count: batches.len(),
            active_batches: active.len(),
            total_remaining,
            total_value,
            oldest_purchase_date: active.iter().map(|b| b.purchase_date()).min(),
            average_unit_cost,
        }
    }
}
