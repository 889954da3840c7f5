//! Project domain module.
//!
//! Customers, installation projects and their tasks, payments, and the
//! schedule arithmetic behind progress and delay reporting. Pure domain logic.

pub mod customer;
pub mod payment;
pub mod progress;
pub mod project;
pub mod report;
pub mod schedule;
pub mod task;

pub use customer::{Customer, NewCustomer};
pub use payment::{NewPayment, Payment, PaymentMethod, PaymentSummary, MAX_AMOUNT};
pub use progress::ProjectProgress;
pub use project::{NewProject, Project};
pub use report::ProjectCostReport;
pub use schedule::{delay_days, delay_days_at, expected_progress};
pub use task::{NewTask, Task, TaskHealth, TaskStatus};
