use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use solarworks_core::{DomainError, DomainResult, Entity, GodownId};

/// Warehouse or yard where purchase batches are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Godown {
    pub id: GodownId,
    pub name: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

impl Godown {
    pub fn new(
        id: GodownId,
        name: impl Into<String>,
        location: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("godown name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            location: location.into().trim().to_string(),
            created_at,
        })
    }
}

impl Entity for Godown {
    type Id = GodownId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
