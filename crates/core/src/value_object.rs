//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**; they are defined entirely by their
/// attribute values and are replaced rather than mutated. `InventoryItem` is
/// the canonical example here: an inventory snapshot is swapped wholesale, its
/// items are never edited in place.
///
/// ```ignore
/// let a = InventoryItem::single("Rune Arc");
/// let b = InventoryItem::single("Rune Arc");
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
