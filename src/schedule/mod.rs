//! Schedule model and the drag/resize interaction core

mod entry;
mod interaction;
mod layout;
mod store;
pub mod time;

pub use entry::{EntryId, ScheduleEntry};
pub use interaction::{
    InteractionState, PointerEvent, PointerListeners, ResizeEdge,
    ScheduleActions, ScheduleItemInteraction,
};
pub use layout::{LayoutMapper, DAY_END_MINUTES, DAY_START_MINUTES, SLOT_MINUTES, SLOTS_PER_DAY};
pub use store::{ScheduleStore, StoreError};
