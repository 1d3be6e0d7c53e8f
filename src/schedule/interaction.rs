//! Drag/resize state machine for a single schedule entry.
//!
//! Each entry on screen gets its own [`ScheduleItemInteraction`]. While an
//! interaction is in progress the component holds a [`ListenerGuard`] from the
//! shared [`PointerListeners`] registry; the host delivers pointer-move and
//! pointer-release only to registered entries. The guard lives inside the
//! non-idle state, so leaving that state or dropping the component releases it.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use super::entry::{EntryId, ScheduleEntry};
use super::layout::{LayoutMapper, DAY_END_MINUTES, DAY_START_MINUTES, SLOT_MINUTES};
use super::time::minutes_to_time;

/// Collaborator that owns the schedule collection
pub trait ScheduleActions {
    /// Remove the entry from the containing collection
    fn on_delete(&mut self, id: &str);

    /// A drag gesture began; the containing view decides where it lands
    fn on_drag_start(&mut self, event: &PointerEvent, item: &ScheduleEntry);

    /// Persist new times for the entry. Times are already validated.
    fn on_resize(&mut self, id: &str, start_time: &str, end_time: &str);
}

/// Pointer position in host coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
}

impl PointerEvent {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    Top,
    Bottom,
}

/// Observable interaction state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Dragging,
    ResizingTop,
    ResizingBottom,
}

/// Registry of entries currently observing global pointer movement and release
#[derive(Debug, Clone, Default)]
pub struct PointerListeners {
    active: Rc<RefCell<Vec<EntryId>>>,
}

impl PointerListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listen(&self, id: &str) -> ListenerGuard {
        self.active.borrow_mut().push(id.to_string());
        debug!(entry = id, "pointer listener registered");
        ListenerGuard {
            active: Rc::clone(&self.active),
            id: id.to_string(),
        }
    }

    /// Ids that should receive pointer events this frame
    pub fn active(&self) -> Vec<EntryId> {
        self.active.borrow().clone()
    }

    #[cfg(test)]
    pub fn is_listening(&self, id: &str) -> bool {
        self.active.borrow().iter().any(|a| a == id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.active.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.borrow().is_empty()
    }
}

/// Registration held while an entry is dragging or resizing
#[derive(Debug)]
pub struct ListenerGuard {
    active: Rc<RefCell<Vec<EntryId>>>,
    id: EntryId,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let mut active = self.active.borrow_mut();
        if let Some(pos) = active.iter().position(|a| *a == self.id) {
            active.remove(pos);
        }
        debug!(entry = %self.id, "pointer listener released");
    }
}

#[derive(Debug)]
enum Mode {
    Idle,
    Dragging(ListenerGuard),
    ResizingTop(ListenerGuard),
    ResizingBottom(ListenerGuard),
}

#[derive(Debug)]
pub struct ScheduleItemInteraction {
    item: ScheduleEntry,
    layout: LayoutMapper,
    mode: Mode,
}

impl ScheduleItemInteraction {
    pub fn new(item: ScheduleEntry, slot_height: f32) -> Self {
        Self {
            item,
            layout: LayoutMapper::new(slot_height),
            mode: Mode::Idle,
        }
    }

    pub fn state(&self) -> InteractionState {
        match self.mode {
            Mode::Idle => InteractionState::Idle,
            Mode::Dragging(_) => InteractionState::Dragging,
            Mode::ResizingTop(_) => InteractionState::ResizingTop,
            Mode::ResizingBottom(_) => InteractionState::ResizingBottom,
        }
    }

    pub fn item(&self) -> &ScheduleEntry {
        &self.item
    }

    #[cfg(test)]
    pub fn layout(&self) -> LayoutMapper {
        self.layout
    }

    /// Block offset and height inside the day column
    pub fn geometry(&self) -> (f32, f32) {
        (
            self.layout.top(&self.item.start_time),
            self.layout.height(&self.item.start_time, &self.item.end_time),
        )
    }

    /// Replace our view of the entry with the store's copy
    pub fn sync(&mut self, item: &ScheduleEntry) {
        if self.item != *item {
            self.item = item.clone();
        }
    }

    /// Slot height is fixed for the duration of an interaction. Returns false if ignored.
    pub fn set_slot_height(&mut self, slot_height: f32) -> bool {
        if !matches!(self.mode, Mode::Idle) {
            return false;
        }
        self.layout = LayoutMapper::new(slot_height);
        true
    }

    /// Drag-start on the block body. Ignored unless idle.
    pub fn begin_drag(
        &mut self,
        event: &PointerEvent,
        listeners: &PointerListeners,
        actions: &mut dyn ScheduleActions,
    ) -> bool {
        if !matches!(self.mode, Mode::Idle) {
            debug!(entry = %self.item.id, state = ?self.state(), "drag suppressed");
            return false;
        }
        self.mode = Mode::Dragging(listeners.listen(&self.item.id));
        actions.on_drag_start(event, &self.item);
        true
    }

    /// Pointer-down on a resize handle. Ignored unless idle.
    pub fn begin_resize(&mut self, edge: ResizeEdge, listeners: &PointerListeners) -> bool {
        if !matches!(self.mode, Mode::Idle) {
            return false;
        }
        let guard = listeners.listen(&self.item.id);
        self.mode = match edge {
            ResizeEdge::Top => Mode::ResizingTop(guard),
            ResizeEdge::Bottom => Mode::ResizingBottom(guard),
        };
        debug!(entry = %self.item.id, ?edge, "resize started");
        true
    }

    /// Pointer moved while resizing. `column_top` is the y of the day column's top edge.
    ///
    /// Returns true if a new time was accepted and reported.
    pub fn pointer_move(
        &mut self,
        event: &PointerEvent,
        column_top: f32,
        actions: &mut dyn ScheduleActions,
    ) -> bool {
        let edge = match self.mode {
            Mode::ResizingTop(_) => ResizeEdge::Top,
            Mode::ResizingBottom(_) => ResizeEdge::Bottom,
            Mode::Idle | Mode::Dragging(_) => return false,
        };

        let slot = self.layout.slot_at(event.y - column_top);
        let candidate = LayoutMapper::minutes_at_slot(slot);
        let start = self.item.start_minutes();
        let end = self.item.end_minutes();

        let accepted = match edge {
            ResizeEdge::Top => candidate < end - SLOT_MINUTES && candidate >= DAY_START_MINUTES,
            ResizeEdge::Bottom => candidate > start + SLOT_MINUTES && candidate <= DAY_END_MINUTES,
        };
        if !accepted {
            debug!(entry = %self.item.id, ?edge, candidate, start, end, "resize candidate ignored");
            return false;
        }

        match edge {
            ResizeEdge::Top => self.item.start_time = minutes_to_time(candidate),
            ResizeEdge::Bottom => self.item.end_time = minutes_to_time(candidate),
        }
        actions.on_resize(&self.item.id, &self.item.start_time, &self.item.end_time);
        true
    }

    /// Pointer released anywhere. Always returns to idle.
    pub fn pointer_up(&mut self) {
        if !matches!(self.mode, Mode::Idle) {
            debug!(entry = %self.item.id, state = ?self.state(), "interaction finished");
        }
        self.mode = Mode::Idle;
    }

    /// Explicit delete action. Only honoured while idle.
    pub fn delete(&mut self, actions: &mut dyn ScheduleActions) -> bool {
        if !matches!(self.mode, Mode::Idle) {
            return false;
        }
        actions.on_delete(&self.item.id);
        true
    }
}
