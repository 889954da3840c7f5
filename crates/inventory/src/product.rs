use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use solarworks_core::{DomainError, DomainResult, Entity, ProductId};

/// A stocked material (panel, inverter, mounting rail, cable...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit of measure quantities are expressed in ("pcs", "m", "kg").
    pub unit: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        unit: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        let unit = unit.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if unit.is_empty() {
            return Err(DomainError::validation("product unit cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            unit,
            created_at,
        })
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_is_required() {
        let err = Product::new(ProductId::new(), "Mono PERC 540W", " ", Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::validation("product unit cannot be empty"));
    }
}
