use serde::{Deserialize, Serialize};

use crate::item::InventoryItem;
use crate::update::{StateUpdate, UpdateKind};

/// Location reported before anything has been observed.
pub const UNKNOWN_LOCATION: &str = "Unknown";

fn unknown_location() -> String {
    UNKNOWN_LOCATION.to_string()
}

/// Canonical snapshot of the tracked game.
///
/// Mutated only through [`GameState::apply_update`]. The serialized form is
/// the persisted format (`player_location`, `inventory`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    #[serde(default = "unknown_location")]
    player_location: String,
    #[serde(default)]
    inventory: Vec<InventoryItem>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            player_location: unknown_location(),
            inventory: Vec::new(),
        }
    }
}

impl GameState {
    /// Build a state directly, e.g. when restoring from storage.
    pub fn new(player_location: impl Into<String>, inventory: Vec<InventoryItem>) -> Self {
        Self {
            player_location: player_location.into(),
            inventory,
        }
    }

    pub fn location(&self) -> &str {
        &self.player_location
    }

    pub fn inventory(&self) -> &[InventoryItem] {
        &self.inventory
    }

    /// Merge an update into this state and report whether anything changed.
    ///
    /// Rules, in order:
    /// 1. `Noop` returns `false` without touching the state.
    /// 2. A location-bearing update with a non-empty location that differs
    ///    from the current one replaces the location.
    /// 3. An item-bearing update with items present (an empty list counts)
    ///    replaces the inventory wholesale and always reports a change, even
    ///    when the new list equals the old one.
    ///
    /// Location is the only field compared for equality, so repeated
    /// sightings of the same area stay silent while every inventory snapshot
    /// is reported.
    pub fn apply_update(&mut self, update: &StateUpdate) -> bool {
        let kind = update.kind();
        if kind == UpdateKind::Noop {
            return false;
        }

        let mut location_changed = false;
        if kind.carries_location() {
            if let Some(location) = update.new_location() {
                if !location.is_empty() && location != self.player_location {
                    self.player_location = location.to_string();
                    location_changed = true;
                }
            }
        }

        let mut items_changed = false;
        if kind.carries_items() {
            if let Some(items) = update.inventory_items() {
                self.inventory = items.to_vec();
                items_changed = true;
            }
        }

        location_changed || items_changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(name: &str, quantity: u32) -> InventoryItem {
        InventoryItem::new(name, quantity).unwrap()
    }

    fn three_items() -> Vec<InventoryItem> {
        vec![item("Torch", 1), item("Rune Arc", 2), item("Golden Seed", 1)]
    }

    #[test]
    fn default_state_is_unknown_and_empty() {
        let state = GameState::default();
        assert_eq!(state.location(), "Unknown");
        assert!(state.inventory().is_empty());
    }

    #[test]
    fn noop_never_mutates() {
        let mut state = GameState::new("Limgrave", three_items());
        let before = state.clone();
        assert!(!state.apply_update(&StateUpdate::noop("plain gameplay")));
        assert_eq!(state, before);
    }

    #[test]
    fn noop_ignores_populated_payload() {
        let mut state = GameState::default();
        let update = StateUpdate::new(
            UpdateKind::Noop,
            Some("Caelid".into()),
            Some(vec![item("Torch", 1)]),
            "",
        );
        assert!(!state.apply_update(&update));
        assert_eq!(state, GameState::default());
    }

    #[test]
    fn same_location_is_unchanged() {
        let mut state = GameState::new("Limgrave", vec![]);
        assert!(!state.apply_update(&StateUpdate::location("Limgrave", "banner again")));
        assert_eq!(state.location(), "Limgrave");
    }

    #[test]
    fn location_comparison_is_exact() {
        let mut state = GameState::new("Limgrave", vec![]);
        assert!(state.apply_update(&StateUpdate::location("limgrave", "")));
        assert_eq!(state.location(), "limgrave");
    }

    #[test]
    fn empty_location_is_ignored() {
        let mut state = GameState::new("Limgrave", vec![]);
        assert!(!state.apply_update(&StateUpdate::location("", "")));
        assert_eq!(state.location(), "Limgrave");
    }

    #[test]
    fn location_kind_ignores_items() {
        let mut state = GameState::default();
        let update = StateUpdate::new(
            UpdateKind::Location,
            Some("Caelid".into()),
            Some(vec![item("Torch", 1)]),
            "",
        );
        assert!(state.apply_update(&update));
        assert!(state.inventory().is_empty());
    }

    #[test]
    fn inventory_kind_ignores_location() {
        let mut state = GameState::default();
        let update = StateUpdate::new(
            UpdateKind::Inventory,
            Some("Caelid".into()),
            Some(vec![item("Torch", 1)]),
            "",
        );
        assert!(state.apply_update(&update));
        assert_eq!(state.location(), UNKNOWN_LOCATION);
    }

    #[test]
    fn empty_inventory_replaces_existing_items() {
        let mut state = GameState::new("Limgrave", three_items());
        assert!(state.apply_update(&StateUpdate::inventory(vec![], "menu is empty")));
        assert!(state.inventory().is_empty());
    }

    #[test]
    fn absent_inventory_is_not_a_change() {
        let mut state = GameState::new("Limgrave", three_items());
        let update = StateUpdate::new(UpdateKind::Inventory, None, None, "");
        assert!(!state.apply_update(&update));
        assert_eq!(state.inventory(), three_items().as_slice());
    }

    #[test]
    fn both_with_only_location_updates_location() {
        let mut state = GameState::new("Limgrave", three_items());
        assert!(state.apply_update(&StateUpdate::both(Some("Liurnia of the Lakes".into()), None, "")));
        assert_eq!(state.location(), "Liurnia of the Lakes");
        assert_eq!(state.inventory(), three_items().as_slice());
    }

    #[test]
    fn both_same_location_absent_items_is_unchanged() {
        let mut state = GameState::new("Limgrave", three_items());
        assert!(!state.apply_update(&StateUpdate::both(Some("Limgrave".into()), None, "")));
    }

    #[test]
    fn both_same_location_new_items_is_changed() {
        let mut state = GameState::new("Limgrave", vec![]);
        let items = vec![item("Rune Arc", 1)];
        assert!(state.apply_update(&StateUpdate::both(Some("Limgrave".into()), Some(items.clone()), "")));
        assert_eq!(state.location(), "Limgrave");
        assert_eq!(state.inventory(), items.as_slice());
    }

    #[test]
    fn repeated_location_update_reports_change_once() {
        let mut state = GameState::default();
        let update = StateUpdate::location("Roundtable Hold", "");
        assert!(state.apply_update(&update));
        assert!(!state.apply_update(&update));
    }

    #[test]
    fn repeated_inventory_update_always_reports_change() {
        let mut state = GameState::default();
        let update = StateUpdate::inventory(vec![item("Rune Arc", 1)], "");
        assert!(state.apply_update(&update));
        assert!(state.apply_update(&update));
        assert!(state.apply_update(&update));
    }

    #[test]
    fn limgrave_scenario() {
        let mut state = GameState::default();

        assert!(state.apply_update(&StateUpdate::location("Limgrave", "")));
        assert_eq!(state, GameState::new("Limgrave", vec![]));

        assert!(state.apply_update(&StateUpdate::inventory(vec![item("Rune Arc", 1)], "")));
        assert_eq!(state, GameState::new("Limgrave", vec![item("Rune Arc", 1)]));

        let before = state.clone();
        assert!(!state.apply_update(&StateUpdate::noop("")));
        assert_eq!(state, before);
    }

    #[test]
    fn persisted_format_uses_stable_field_names() {
        let state = GameState::new("Caelid", vec![item("Torch", 2)]);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "player_location": "Caelid",
                "inventory": [{"name": "Torch", "quantity": 2}]
            })
        );
    }

    #[test]
    fn decoding_empty_object_yields_default() {
        let state: GameState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, GameState::default());
    }

    fn arb_item() -> impl Strategy<Value = InventoryItem> {
        ("[A-Za-z][A-Za-z ]{0,15}", 1u32..100).prop_map(|(n, q)| item(&n, q))
    }

    fn arb_items() -> impl Strategy<Value = Vec<InventoryItem>> {
        prop::collection::vec(arb_item(), 0..6)
    }

    fn arb_state() -> impl Strategy<Value = GameState> {
        ("[A-Za-z ]{1,20}", arb_items()).prop_map(|(loc, items)| GameState::new(loc, items))
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: noop updates never change anything, whatever their payload.
        #[test]
        fn noop_is_inert(
            mut state in arb_state(),
            location in proptest::option::of("[A-Za-z ]{0,20}"),
            items in proptest::option::of(arb_items()),
        ) {
            let before = state.clone();
            let update = StateUpdate::new(UpdateKind::Noop, location, items, "");
            prop_assert!(!state.apply_update(&update));
            prop_assert_eq!(state, before);
        }

        /// Property: an inventory update leaves exactly the given items behind.
        #[test]
        fn inventory_is_replaced_verbatim(mut state in arb_state(), items in arb_items()) {
            let location = state.location().to_string();
            prop_assert!(state.apply_update(&StateUpdate::inventory(items.clone(), "")));
            prop_assert_eq!(state.inventory(), items.as_slice());
            prop_assert_eq!(state.location(), location.as_str());
        }

        /// Property: a location update reports a change iff the value differs.
        #[test]
        fn location_change_iff_different(mut state in arb_state(), location in "[A-Za-z ]{1,20}") {
            let differs = state.location() != location;
            prop_assert_eq!(state.apply_update(&StateUpdate::location(location.clone(), "")), differs);
            prop_assert_eq!(state.location(), location.as_str());
            prop_assert!(!state.apply_update(&StateUpdate::location(location, "")));
        }
    }
}
