//! Cost report combining material allocations and customer payments.

use rust_decimal::Decimal;
use serde::Serialize;

use solarworks_core::ProjectId;
use solarworks_inventory::Allocation;

use crate::payment::{Payment, PaymentSummary};
use crate::project::Project;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectCostReport {
    pub project_id: ProjectId,
    pub contract_value: Decimal,
    /// Σ quantity × unit price over stock allocated to the project.
    pub material_cost: Decimal,
    /// Contract value minus material cost.
    pub gross_margin: Decimal,
    pub payments: PaymentSummary,
}

impl ProjectCostReport {
    /// Allocations and payments belonging to other projects are ignored.
    pub fn compute(project: &Project, allocations: &[Allocation], payments: &[Payment]) -> Self {
        let material_cost: Decimal = allocations
            .iter()
            .filter(|a| a.project_id == Some(project.id))
            .map(Allocation::cost)
            .sum();

        let own_payments: Vec<Payment> = payments
            .iter()
            .filter(|p| p.project_id == project.id)
            .cloned()
            .collect();

        Self {
            project_id: project.id,
            contract_value: project.contract_value,
            material_cost,
            gross_margin: project.contract_value - material_cost,
            payments: PaymentSummary::compute(project.contract_value, &own_payments),
        }
    }
}
