use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use solarworks_core::{DomainError, DomainResult, Entity, PaymentId, ProjectId};

/// Largest accepted payment amount or contract value (1e12).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Cheque,
    Card,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Cheque => "cheque",
            PaymentMethod::Card => "card",
            PaymentMethod::Other => "other",
        }
    }
}

impl core::str::FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "cheque" => Ok(PaymentMethod::Cheque),
            "card" => Ok(PaymentMethod::Card),
            "other" => Ok(PaymentMethod::Other),
            other => Err(DomainError::validation(format!("unknown payment method: {other}"))),
        }
    }
}

/// Input for recording a customer payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayment {
    pub amount: Decimal,
    pub paid_on: NaiveDate,
    pub method: PaymentMethod,
    /// Cheque number, transaction id, receipt number...
    pub reference: Option<String>,
}

/// Money received from the customer against a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub project_id: ProjectId,
    pub amount: Decimal,
    pub paid_on: NaiveDate,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn create(
        id: PaymentId,
        project_id: ProjectId,
        new: NewPayment,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if new.amount <= Decimal::ZERO {
            return Err(DomainError::validation("payment amount must be positive"));
        }
        if new.amount > MAX_AMOUNT {
            return Err(DomainError::validation(format!(
                "payment amount cannot exceed {MAX_AMOUNT}"
            )));
        }

        Ok(Self {
            id,
            project_id,
            amount: new.amount,
            paid_on: new.paid_on,
            method: new.method,
            reference: new
                .reference
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            created_at,
        })
    }
}

impl Entity for Payment {
    type Id = PaymentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Collected vs. contracted amounts for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentSummary {
    pub contract_value: Decimal,
    pub total_paid: Decimal,
    pub outstanding: Decimal,
    /// Amount received beyond the contract value.
    pub overpaid: Decimal,
    /// Share of the contract value received, 0-100, two decimal places.
    pub paid_percent: Decimal,
    pub payment_count: usize,
    pub last_paid_on: Option<NaiveDate>,
}

impl PaymentSummary {
    pub fn compute(contract_value: Decimal, payments: &[Payment]) -> Self {
        let total_paid: Decimal = payments.iter().map(|p| p.amount).sum();

        // The ratio is only formed when it is below 1, so it cannot overflow.
        let paid_percent = if contract_value <= Decimal::ZERO {
            if total_paid > Decimal::ZERO {
                Decimal::ONE_HUNDRED
            } else {
                Decimal::ZERO
            }
        } else if total_paid >= contract_value {
            Decimal::ONE_HUNDRED
        } else {
            (total_paid / contract_value * Decimal::ONE_HUNDRED).round_dp(2)
        };

        Self {
            contract_value,
            total_paid,
            outstanding: (contract_value - total_paid).max(Decimal::ZERO),
            overpaid: (total_paid - contract_value).max(Decimal::ZERO),
            paid_percent,
            payment_count: payments.len(),
            last_paid_on: payments.iter().map(|p| p.paid_on).max(),
        }
    }
}
