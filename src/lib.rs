//! ItemDrop: a peer-to-peer item handover engine for room-based shared
//! spaces.
//!
//! One user offers a uniquely-identified virtual item to another user in
//! the same room; the recipient accepts or declines; the sender confirms,
//! moving the item from the sender's backpack to the recipient's. The
//! transport is best-effort addressed chat messaging with no delivery
//! guarantees, so the engine is built as a guarded state machine with
//! explicit timeouts, duplicate detection, and exactly-once storage intent.
//!
//! The crate owns only the protocol logic. Room messaging, the backpack
//! store, dialogs/toasts, and timer scheduling are reached through traits
//! ([`core::room::RoomLink`], [`core::inventory::Inventory`],
//! [`ui::dialog::DialogHost`], [`core::timers::TimerHost`]) so the
//! embedding application supplies the actual transport and UI.

pub mod core;
pub mod ui;

pub use crate::core::config::TransferConfig;
pub use crate::core::inventory::Inventory;
pub use crate::core::item::{ItemId, ItemProperties};
pub use crate::core::protocol::{CancelCause, TransferElement, TransferKind, TransferMessage};
pub use crate::core::room::{ChatMessage, Participant, RoomLink};
pub use crate::core::timers::{TimerHandle, TimerHost, TokioTimers};
pub use crate::core::transfer::{ItemTransferEngine, TransferStats};
pub use crate::ui::dialog::{DialogHandle, DialogHost, DialogSpec};
