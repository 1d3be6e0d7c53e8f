//! Pixel geometry for schedule blocks inside a day column

use super::time::time_to_minutes;

/// First visible minute of a day column (6:00am)
pub const DAY_START_MINUTES: i32 = 360;
/// Latest allowed end time (11:30pm)
pub const DAY_END_MINUTES: i32 = 1410;
pub const SLOT_MINUTES: i32 = 30;
/// Highest slot index a pointer can snap to
pub const MAX_SLOT: i32 = 34;
/// Number of slots drawn in a day column
pub const SLOTS_PER_DAY: i32 = (DAY_END_MINUTES - DAY_START_MINUTES) / SLOT_MINUTES;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMapper {
    slot_height: f32,
}

impl LayoutMapper {
    /// `slot_height` is pixels per 30-minute slot
    pub fn new(slot_height: f32) -> Self {
        Self { slot_height }
    }

    pub fn slot_height(&self) -> f32 {
        self.slot_height
    }

    /// Offset of a block's top edge from the top of the column
    pub fn top(&self, start_time: &str) -> f32 {
        let slots = (time_to_minutes(start_time) - DAY_START_MINUTES) as f32 / SLOT_MINUTES as f32;
        slots * self.slot_height
    }

    pub fn height(&self, start_time: &str, end_time: &str) -> f32 {
        let slots = (time_to_minutes(end_time) - time_to_minutes(start_time)) as f32
            / SLOT_MINUTES as f32;
        slots * self.slot_height
    }

    /// Snap a vertical offset within the column to the nearest slot, clamped to the day window
    pub fn slot_at(&self, offset_y: f32) -> i32 {
        let slot = (offset_y / self.slot_height).round() as i32;
        slot.clamp(0, MAX_SLOT)
    }

    pub fn minutes_at_slot(slot: i32) -> i32 {
        DAY_START_MINUTES + slot * SLOT_MINUTES
    }

    /// Pixel height of a full day column
    pub fn grid_height(&self) -> f32 {
        SLOTS_PER_DAY as f32 * self.slot_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nine_to_ten_at_forty_pixels() {
        let layout = LayoutMapper::new(40.0);
        assert_eq!(layout.top("09:00"), 240.0);
        assert_eq!(layout.height("09:00", "10:00"), 80.0);
    }

    #[test]
    fn day_start_sits_at_the_top() {
        let layout = LayoutMapper::new(25.0);
        assert_eq!(layout.top("06:00"), 0.0);
        assert_eq!(layout.top("23:30"), layout.grid_height());
    }

    #[test]
    fn unaligned_times_map_to_fractional_slots() {
        let layout = LayoutMapper::new(40.0);
        assert_eq!(layout.top("06:15"), 20.0);
        assert_eq!(layout.height("06:15", "06:45"), 40.0);
    }

    #[test]
    fn geometry_is_stable_for_identical_input() {
        let layout = LayoutMapper::new(37.5);
        let first = (layout.top("13:30"), layout.height("13:30", "15:00"));
        let second = (layout.top("13:30"), layout.height("13:30", "15:00"));
        assert_eq!(first, second);
    }

    #[test]
    fn snaps_to_nearest_slot() {
        let layout = LayoutMapper::new(40.0);
        assert_eq!(layout.slot_at(0.0), 0);
        assert_eq!(layout.slot_at(19.0), 0);
        assert_eq!(layout.slot_at(21.0), 1);
        assert_eq!(layout.slot_at(399.0), 10);
        assert_eq!(layout.slot_at(420.0), 11);
    }

    #[test]
    fn snapping_clamps_to_the_day_window() {
        let layout = LayoutMapper::new(40.0);
        assert_eq!(layout.slot_at(-500.0), 0);
        assert_eq!(layout.slot_at(10_000.0), MAX_SLOT);
        assert_eq!(LayoutMapper::minutes_at_slot(MAX_SLOT), 1380);
        assert_eq!(LayoutMapper::minutes_at_slot(10), 660);
    }
}
