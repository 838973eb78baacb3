//! Item snapshots.
//!
//! An item is an opaque, server-tracked property bag. The engine only
//! requires the identifier to be present; everything else is carried
//! verbatim across the wire and eventually handed to the backpack store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Server-assigned item identifier. Never minted locally.
pub type ItemId = String;

/// Property key holding the identifier.
pub const KEY_ID: &str = "id";

/// Property key holding the display label.
pub const KEY_LABEL: &str = "label";

/// Property key holding the transferable flag.
pub const KEY_TRANSFERABLE: &str = "transferable";

/// Placement properties that only make sense where the item currently
/// stands. They are dropped before the recipient stores a received item,
/// so it arrives unplaced in the new backpack.
const TRANSIENT_KEYS: [&str; 4] = ["container", "slot", "x", "y"];

/// One snapshot of an item's properties.
///
/// Snapshots are copies, not live references: mutations to the
/// authoritative backpack item after a transfer started do not affect a
/// snapshot already embedded in a transfer record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemProperties(pub Map<String, Value>);

impl ItemProperties {
    /// Snapshot carrying only the identifier.
    pub fn from_id(id: &str) -> Self {
        let mut map = Map::new();
        map.insert(KEY_ID.to_string(), Value::String(id.to_string()));
        Self(map)
    }

    /// The item identifier, if present and a string.
    pub fn id(&self) -> Option<&str> {
        self.0.get(KEY_ID).and_then(Value::as_str)
    }

    /// Display label for dialogs, falling back to the identifier.
    pub fn label(&self) -> &str {
        self.0
            .get(KEY_LABEL)
            .and_then(Value::as_str)
            .or_else(|| self.id())
            .unwrap_or("item")
    }

    /// Whether the item may be handed to another user. Only an explicit
    /// `false` (boolean or the string "false") blocks a transfer; absent
    /// or malformed flags count as transferable.
    pub fn is_transferable(&self) -> bool {
        match self.0.get(KEY_TRANSFERABLE) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(s)) => s != "false",
            _ => true,
        }
    }

    /// Identifier-only copy, used for every message type that does not
    /// need the full snapshot on the wire.
    pub fn to_id_only(&self) -> Self {
        match self.id() {
            Some(id) => Self::from_id(id),
            None => Self::default(),
        }
    }

    /// Copy without transient placement properties, applied before the
    /// recipient stores a confirmed item.
    pub fn stripped_for_storage(&self) -> Self {
        let mut map = self.0.clone();
        for key in TRANSIENT_KEYS {
            map.remove(key);
        }
        Self(map)
    }

    /// Insert or replace a property. Mainly useful for building snapshots
    /// in the embedding application and in tests.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ItemProperties {
        let mut item = ItemProperties::from_id("item-1");
        item.set(KEY_LABEL, "Blue Lamp");
        item.set("provider", "nine3q");
        item.set("container", "room-7");
        item.set("x", 120);
        item
    }

    #[test]
    fn test_id_and_label() {
        let item = sample();
        assert_eq!(item.id(), Some("item-1"));
        assert_eq!(item.label(), "Blue Lamp");

        let bare = ItemProperties::from_id("item-2");
        assert_eq!(bare.label(), "item-2");
    }

    #[test]
    fn test_transferable_only_blocks_on_explicit_false() {
        let mut item = sample();
        assert!(item.is_transferable());

        item.set(KEY_TRANSFERABLE, false);
        assert!(!item.is_transferable());

        item.set(KEY_TRANSFERABLE, "false");
        assert!(!item.is_transferable());

        item.set(KEY_TRANSFERABLE, "true");
        assert!(item.is_transferable());
    }

    #[test]
    fn test_id_only_drops_everything_else() {
        let reduced = sample().to_id_only();
        assert_eq!(reduced.id(), Some("item-1"));
        assert_eq!(reduced.0.len(), 1);
    }

    #[test]
    fn test_storage_strip_removes_placement() {
        let stored = sample().stripped_for_storage();
        assert_eq!(stored.id(), Some("item-1"));
        assert_eq!(stored.get("provider").and_then(Value::as_str), Some("nine3q"));
        assert!(stored.get("container").is_none());
        assert!(stored.get("x").is_none());
    }
}
