//! `solarworks-core`: shared domain building blocks.
//!
//! Typed identifiers, the domain error model and the `Entity` trait. No IO.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{
    AllocationId, BatchId, CustomerId, GodownId, PaymentId, ProductId, ProjectId, TaskId,
};
