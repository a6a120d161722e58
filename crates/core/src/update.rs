use serde::{Deserialize, Serialize};

use crate::item::InventoryItem;

/// Which part of the game state a classification speaks about.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// Nothing relevant was observed.
    Noop,
    Location,
    Inventory,
    Both,
}

impl UpdateKind {
    /// Whether `new_location` is meaningful for this kind.
    pub fn carries_location(self) -> bool {
        matches!(self, UpdateKind::Location | UpdateKind::Both)
    }

    /// Whether `inventory_items` is meaningful for this kind.
    pub fn carries_items(self) -> bool {
        matches!(self, UpdateKind::Inventory | UpdateKind::Both)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UpdateKind::Noop => "noop",
            UpdateKind::Location => "location",
            UpdateKind::Inventory => "inventory",
            UpdateKind::Both => "both",
        }
    }
}

impl core::fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classification result, produced once and consumed once.
///
/// The value is immutable after construction. `reasoning` is free text kept
/// for observability and never inspected by the merge.
///
/// `inventory_items: Some(vec![])` is a real value ("the inventory is empty"),
/// distinct from `None` ("no inventory was observed").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    update_type: UpdateKind,
    #[serde(default)]
    new_location: Option<String>,
    #[serde(default)]
    inventory_items: Option<Vec<InventoryItem>>,
    #[serde(default)]
    reasoning: String,
}

impl StateUpdate {
    pub fn new(
        update_type: UpdateKind,
        new_location: Option<String>,
        inventory_items: Option<Vec<InventoryItem>>,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            update_type,
            new_location,
            inventory_items,
            reasoning: reasoning.into(),
        }
    }

    pub fn noop(reasoning: impl Into<String>) -> Self {
        Self::new(UpdateKind::Noop, None, None, reasoning)
    }

    pub fn location(location: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self::new(UpdateKind::Location, Some(location.into()), None, reasoning)
    }

    pub fn inventory(items: Vec<InventoryItem>, reasoning: impl Into<String>) -> Self {
        Self::new(UpdateKind::Inventory, None, Some(items), reasoning)
    }

    pub fn both(
        location: Option<String>,
        items: Option<Vec<InventoryItem>>,
        reasoning: impl Into<String>,
    ) -> Self {
        Self::new(UpdateKind::Both, location, items, reasoning)
    }

    pub fn kind(&self) -> UpdateKind {
        self.update_type
    }

    pub fn new_location(&self) -> Option<&str> {
        self.new_location.as_deref()
    }

    pub fn inventory_items(&self) -> Option<&[InventoryItem]> {
        self.inventory_items.as_deref()
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }
}
