use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

fn default_quantity() -> u32 {
    1
}

/// A single entry of the player's inventory.
///
/// Two items are distinct when their names differ; quantity never merges
/// entries. Both `name` (non-empty) and `quantity` (at least 1) are enforced on
/// construction and on decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInventoryItem")]
pub struct InventoryItem {
    name: String,
    quantity: u32,
}

#[derive(Deserialize)]
struct RawInventoryItem {
    name: String,
    #[serde(default = "default_quantity")]
    quantity: u32,
}

impl TryFrom<RawInventoryItem> for InventoryItem {
    type Error = DomainError;

    fn try_from(raw: RawInventoryItem) -> Result<Self, Self::Error> {
        InventoryItem::new(raw.name, raw.quantity)
    }
}

impl InventoryItem {
    pub fn new(name: impl Into<String>, quantity: u32) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("item name cannot be empty"));
        }
        if quantity == 0 {
            return Err(DomainError::validation(format!(
                "quantity of {name} must be at least 1"
            )));
        }
        Ok(Self { name, quantity })
    }

    /// Item with the default quantity of one.
    pub fn single(name: impl Into<String>) -> DomainResult<Self> {
        Self::new(name, default_quantity())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

impl ValueObject for InventoryItem {}

impl core::fmt::Display for InventoryItem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} x{}", self.name, self.quantity)
    }
}
