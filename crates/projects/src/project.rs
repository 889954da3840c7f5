use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use solarworks_core::{CustomerId, DomainError, DomainResult, Entity, ProjectId};

use crate::payment::MAX_AMOUNT;
use crate::schedule;

/// Input for opening a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub customer_id: CustomerId,
    pub name: String,
    /// Planned plant capacity in kW.
    pub capacity_kw: Decimal,
    pub contract_value: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// An installation project for one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub customer_id: CustomerId,
    pub name: String,
    pub capacity_kw: Decimal,
    pub contract_value: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn create(id: ProjectId, new: NewProject, created_at: DateTime<Utc>) -> DomainResult<Self> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("project name cannot be empty"));
        }
        if new.capacity_kw < Decimal::ZERO {
            return Err(DomainError::validation("capacity cannot be negative"));
        }
        if new.contract_value < Decimal::ZERO {
            return Err(DomainError::validation("contract value cannot be negative"));
        }
        if new.capacity_kw > MAX_AMOUNT || new.contract_value > MAX_AMOUNT {
            return Err(DomainError::validation(format!(
                "capacity and contract value cannot exceed {MAX_AMOUNT}"
            )));
        }
        if new.end_date < new.start_date {
            return Err(DomainError::validation("end date is before start date"));
        }

        Ok(Self {
            id,
            customer_id: new.customer_id,
            name,
            capacity_kw: new.capacity_kw,
            contract_value: new.contract_value,
            start_date: new.start_date,
            end_date: new.end_date,
            created_at,
        })
    }

    /// Share of the planned schedule elapsed by `today`.
    pub fn expected_progress(&self, today: NaiveDate) -> f64 {
        schedule::expected_progress(self.start_date, self.end_date, today)
    }
}

impl Entity for Project {
    type Id = ProjectId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
