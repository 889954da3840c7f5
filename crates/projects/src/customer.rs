use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use solarworks_core::{CustomerId, DomainError, DomainResult, Entity};

/// Input for registering a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// A customer who commissions installation projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn create(id: CustomerId, new: NewCustomer, created_at: DateTime<Utc>) -> DomainResult<Self> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("customer name cannot be empty"));
        }

        let email = non_blank(new.email);
        if let Some(email) = &email {
            if !email.contains('@') {
                return Err(DomainError::validation(format!("invalid email: {email}")));
            }
        }

        Ok(Self {
            id,
            name,
            phone: non_blank(new.phone),
            email,
            address: non_blank(new.address),
            created_at,
        })
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
