//! Inventory domain module.
//!
//! Godowns, products and purchase batches, plus the FIFO allocation rules that
//! decide which batches feed a material requirement. Pure domain logic: no IO,
//! no HTTP, no storage.

pub mod allocation;
pub mod batch;
pub mod godown;
pub mod product;
pub mod valuation;

pub use allocation::{
    apply_allocation, review_selection, suggest, Allocation, AllocationLine,
    AllocationSuggestion, BatchSelection, Fulfillment, SelectionReview,
};
pub use batch::{sort_fifo, Batch, NewBatch, MAX_QUANTITY, MAX_UNIT_PRICE};
pub use godown::Godown;
pub use product::Product;
pub use valuation::StockSummary;
