use std::collections::HashMap;

use egui::{Color32, RichText, Ui};

use crate::api::{ConfidenceReport, ItemKind, Recommendation, Swipe};
use crate::config::ClockFormat;
use crate::schedule::time::{format_clock_time, format_duration, minutes_to_time};
use crate::schedule::{
    EntryId, InteractionState, LayoutMapper, PointerEvent, PointerListeners, ResizeEdge,
    ScheduleActions, ScheduleEntry, ScheduleItemInteraction, ScheduleStore, DAY_END_MINUTES,
    DAY_START_MINUTES, SLOTS_PER_DAY, SLOT_MINUTES,
};
use super::theme::{card_colors, entry_color, grid_colors, phosphor_fill_family};

const HOUR_LABEL_WIDTH: f32 = 60.0;
const HEADER_HEIGHT: f32 = 32.0;
/// Height of the grab strips at the top and bottom of a block
const HANDLE_HEIGHT: f32 = 6.0;
const BLOCK_MARGIN: f32 = 2.0;
const DELETE_SIZE: f32 = 16.0;

/// Result from schedule view interactions
#[derive(Default)]
pub struct ScheduleResult {
    pub edit_entry: Option<EntryId>,
    pub add_at: Option<(u32, String)>,  // (day, start_time "HH:MM")
    pub moved: Option<EntryId>,
}

/// Action picked on the recommendation card
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardAction {
    Swipe(Swipe),
    AddToSchedule,
}

/// Keep one interaction per stored entry. Components for removed entries are
/// dropped here, which releases any pointer listener they still hold.
pub fn sync_interactions(
    interactions: &mut HashMap<EntryId, ScheduleItemInteraction>,
    store: &ScheduleStore,
    slot_height: f32,
) {
    interactions.retain(|id, _| store.get(id).is_some());
    for entry in store.entries() {
        let interaction = interactions
            .entry(entry.id.clone())
            .or_insert_with(|| ScheduleItemInteraction::new(entry.clone(), slot_height));
        interaction.sync(entry);
        interaction.set_slot_height(slot_height);
    }
}

pub fn render_schedule_view(
    ui: &mut Ui,
    store: &mut ScheduleStore,
    interactions: &mut HashMap<EntryId, ScheduleItemInteraction>,
    listeners: &PointerListeners,
    layout: LayoutMapper,
    trip_days: u32,
    clock_format: ClockFormat,
) -> ScheduleResult {
    let mut result = ScheduleResult::default();
    let trip_days = trip_days.max(1);
    let (grid_line_color, hour_line_color, label_color) = grid_colors();

    let available_width = ui.available_width();
    let day_width = (available_width - HOUR_LABEL_WIDTH) / trip_days as f32;
    let total_grid_height = layout.grid_height();

    // Fixed day headers (outside ScrollArea)
    let (header_rect, _) = ui.allocate_exact_size(
        egui::vec2(available_width, HEADER_HEIGHT),
        egui::Sense::hover(),
    );
    {
        let painter = ui.painter();
        for day in 0..trip_days {
            let x = header_rect.min.x + HOUR_LABEL_WIDTH + day as f32 * day_width;
            let minutes = store.minutes_for_day(day);
            let y = header_rect.center().y;

            painter.text(
                egui::pos2(x + 8.0, y),
                egui::Align2::LEFT_CENTER,
                format!("Day {}", day + 1),
                egui::FontId::proportional(14.0),
                Color32::from_rgb(0xb0, 0xb6, 0xc0),
            );
            if minutes > 0 {
                painter.text(
                    egui::pos2(x + 64.0, y),
                    egui::Align2::LEFT_CENTER,
                    format_duration(minutes),
                    egui::FontId::proportional(14.0),
                    Color32::WHITE,
                );
            }
        }
    }

    egui::ScrollArea::vertical().drag_to_scroll(false).show(ui, |ui| {
        let (grid_rect, _) = ui.allocate_exact_size(
            egui::vec2(available_width, total_grid_height),
            egui::Sense::hover(),
        );
        let columns_left = grid_rect.min.x + HOUR_LABEL_WIDTH;
        let column_rect = |day: u32| {
            egui::Rect::from_min_size(
                egui::pos2(columns_left + day as f32 * day_width, grid_rect.min.y),
                egui::vec2(day_width, total_grid_height),
            )
        };

        // Grid
        {
            let painter = ui.painter();
            for day in 0..=trip_days {
                let x = columns_left + day as f32 * day_width;
                painter.line_segment(
                    [egui::pos2(x, grid_rect.min.y), egui::pos2(x, grid_rect.max.y)],
                    egui::Stroke::new(1.0, grid_line_color),
                );
            }
            for slot in 0..=SLOTS_PER_DAY {
                let minutes = LayoutMapper::minutes_at_slot(slot);
                let y = grid_rect.min.y + slot as f32 * layout.slot_height();
                let on_hour = minutes % 60 == 0;

                if on_hour && slot < SLOTS_PER_DAY {
                    painter.text(
                        egui::pos2(columns_left - 8.0, y),
                        egui::Align2::RIGHT_TOP,
                        format_clock_time(&minutes_to_time(minutes), clock_format),
                        egui::FontId::proportional(11.0),
                        label_color,
                    );
                }
                painter.line_segment(
                    [egui::pos2(columns_left, y), egui::pos2(grid_rect.max.x, y)],
                    egui::Stroke::new(1.0, if on_hour { hour_line_color } else { grid_line_color }),
                );
            }
        }

        // Empty-space clicks open the add dialog. Registered before the blocks so blocks win.
        for day in 0..trip_days {
            let rect = column_rect(day);
            let response = ui.interact(rect, ui.id().with(("day_col", day)), egui::Sense::click());
            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let slot = layout.slot_at(pos.y - grid_rect.min.y - layout.slot_height() / 2.0);
                    let start = LayoutMapper::minutes_at_slot(slot).min(DAY_END_MINUTES - SLOT_MINUTES);
                    result.add_at = Some((day, minutes_to_time(start)));
                }
            }
        }

        let drag_offset_id = ui.id().with("schedule_drag_offset");
        let dragged_id = store.drag_target().map(|e| e.id.clone());

        let ids: Vec<EntryId> = store.entries().iter().map(|e| e.id.clone()).collect();
        for id in ids {
            let Some(interaction) = interactions.get_mut(&id) else {
                continue;
            };
            let day = interaction.item().day;
            if day >= trip_days {
                continue;
            }

            let (top, height) = interaction.geometry();
            let col = column_rect(day);
            let block_rect = egui::Rect::from_min_size(
                egui::pos2(col.min.x + BLOCK_MARGIN, grid_rect.min.y + top),
                egui::vec2(day_width - BLOCK_MARGIN * 2.0, (height - 2.0).max(12.0)),
            );

            let is_dragged = dragged_id.as_deref() == Some(id.as_str());
            let state = interaction.state();
            render_entry_block(ui, block_rect, interaction.item(), clock_format, is_dragged, state);

            let top_handle = egui::Rect::from_min_size(
                block_rect.min,
                egui::vec2(block_rect.width(), HANDLE_HEIGHT),
            );
            let bottom_handle = egui::Rect::from_min_size(
                egui::pos2(block_rect.min.x, block_rect.max.y - HANDLE_HEIGHT),
                egui::vec2(block_rect.width(), HANDLE_HEIGHT),
            );
            let body = egui::Rect::from_min_max(
                egui::pos2(block_rect.min.x, top_handle.max.y),
                egui::pos2(block_rect.max.x, bottom_handle.min.y),
            );
            let delete_rect = egui::Rect::from_min_size(
                egui::pos2(block_rect.max.x - DELETE_SIZE - 4.0, block_rect.min.y + 4.0),
                egui::vec2(DELETE_SIZE, DELETE_SIZE),
            );

            let body_response = ui.interact(body, ui.id().with(("entry_body", &id)), egui::Sense::click_and_drag());
            if body_response.drag_started() {
                if let Some(pos) = body_response.interact_pointer_pos() {
                    let event = PointerEvent::new(pos.x, pos.y);
                    if interaction.begin_drag(&event, listeners, store) {
                        let offset = pos.y - block_rect.min.y;
                        ui.ctx().memory_mut(|mem| mem.data.insert_temp(drag_offset_id, offset));
                    }
                }
            } else if body_response.clicked() {
                result.edit_entry = Some(id.clone());
            }

            for (rect, edge, tag) in [
                (top_handle, ResizeEdge::Top, "top"),
                (bottom_handle, ResizeEdge::Bottom, "bottom"),
            ] {
                let response = ui.interact(rect, ui.id().with(("entry_handle", &id, tag)), egui::Sense::drag());
                if response.is_pointer_button_down_on() && interaction.state() == InteractionState::Idle {
                    interaction.begin_resize(edge, listeners);
                }
                if response.hovered() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeVertical);
                }
            }

            if block_rect.height() > DELETE_SIZE + 8.0 {
                let delete_response = ui.interact(delete_rect, ui.id().with(("entry_delete", &id)), egui::Sense::click());
                let color = if delete_response.hovered() { Color32::WHITE } else { Color32::from_gray(140) };
                ui.painter().text(
                    delete_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    egui_phosphor::regular::X,
                    egui::FontId::proportional(13.0),
                    color,
                );
                if delete_response.clicked() {
                    interaction.delete(store);
                }
            } else if body_response.hovered() && interaction.state() == InteractionState::Idle {
                ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
            }
        }

        // Deliver global pointer movement and release to components that are listening
        let (pointer_pos, pointer_moved, released) = ui.ctx().input(|i| {
            (
                i.pointer.latest_pos(),
                i.pointer.delta() != egui::Vec2::ZERO,
                i.pointer.primary_released() || !i.pointer.primary_down(),
            )
        });

        // Ghost preview and drop location for an in-flight drag
        let drop_target = store.drag_target().and_then(|entry| {
            let pos = pointer_pos?;
            let offset = ui.ctx().memory(|mem| mem.data.get_temp::<f32>(drag_offset_id)).unwrap_or(0.0);
            drop_location(pos, offset, entry, grid_rect, columns_left, day_width, trip_days, layout)
        });
        if let (Some(entry), Some((day, start))) = (store.drag_target(), drop_target) {
            let duration = entry.duration_minutes();
            let ghost_top = layout.top(&minutes_to_time(start));
            let ghost_rect = egui::Rect::from_min_size(
                egui::pos2(column_rect(day).min.x + BLOCK_MARGIN, grid_rect.min.y + ghost_top),
                egui::vec2(
                    day_width - BLOCK_MARGIN * 2.0,
                    (duration as f32 / SLOT_MINUTES as f32 * layout.slot_height() - 2.0).max(12.0),
                ),
            );
            let label = format_clock_time(&minutes_to_time(start), clock_format);
            render_entry_ghost(ui, ghost_rect, entry, &label);
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
        }

        for id in listeners.active() {
            let Some(interaction) = interactions.get_mut(&id) else {
                continue;
            };
            if interaction.state() != InteractionState::Dragging {
                ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeVertical);
            }
            if let (Some(pos), true) = (pointer_pos, pointer_moved) {
                interaction.pointer_move(&PointerEvent::new(pos.x, pos.y), grid_rect.min.y, store);
            }
            if released {
                if interaction.state() == InteractionState::Dragging {
                    match drop_target {
                        Some((day, start)) => result.moved = store.drop_dragged(day, start),
                        None => store.cancel_drag(),
                    }
                }
                interaction.pointer_up();
            }
        }
    }); // end ScrollArea

    result
}

/// Where a dragged entry would land for the given pointer position
#[allow(clippy::too_many_arguments)]
fn drop_location(
    pos: egui::Pos2,
    grab_offset: f32,
    entry: &ScheduleEntry,
    grid_rect: egui::Rect,
    columns_left: f32,
    day_width: f32,
    trip_days: u32,
    layout: LayoutMapper,
) -> Option<(u32, i32)> {
    if pos.x < columns_left || pos.x > grid_rect.max.x {
        return None;
    }
    let day = ((pos.x - columns_left) / day_width).floor() as u32;
    if day >= trip_days {
        return None;
    }

    let slot = layout.slot_at(pos.y - grab_offset - grid_rect.min.y);
    let start = LayoutMapper::minutes_at_slot(slot)
        .min(DAY_END_MINUTES - entry.duration_minutes())
        .max(DAY_START_MINUTES);
    Some((day, start))
}

/// Paint a single entry block (interaction is handled by the caller)
fn render_entry_block(
    ui: &mut Ui,
    rect: egui::Rect,
    entry: &ScheduleEntry,
    clock_format: ClockFormat,
    is_dragged: bool,
    state: InteractionState,
) {
    let painter = ui.painter();
    let (block_bg, text_color, secondary_color) = card_colors();
    let alpha = if is_dragged { 90 } else { 255 };
    let accent = entry_color(&entry.color).gamma_multiply(alpha as f32 / 255.0);
    let corner_radius = 4.0;

    let stroke_width = match state {
        InteractionState::ResizingTop | InteractionState::ResizingBottom => 2.0,
        _ => 1.0,
    };
    painter.rect(
        rect,
        corner_radius,
        block_bg.gamma_multiply(alpha as f32 / 255.0),
        egui::Stroke::new(stroke_width, accent),
    );

    // Left accent stripe
    let accent_width = 3.0;
    painter.rect(
        egui::Rect::from_min_size(rect.min, egui::vec2(accent_width, rect.height())),
        egui::Rounding {
            nw: corner_radius,
            sw: corner_radius,
            ne: 0.0,
            se: 0.0,
        },
        accent,
        egui::Stroke::NONE,
    );

    let text_left = rect.min.x + accent_width + 5.0;
    let clip = painter.with_clip_rect(rect.shrink(1.0));

    let name_galley = clip.layout_no_wrap(entry.name.clone(), egui::FontId::proportional(13.0), text_color);
    let line_y = rect.min.y + 4.0;
    clip.galley(egui::pos2(text_left, line_y), name_galley.clone(), text_color);

    if rect.height() > 36.0 {
        let range = format!(
            "{} - {}",
            format_clock_time(&entry.start_time, clock_format),
            format_clock_time(&entry.end_time, clock_format),
        );
        clip.text(
            egui::pos2(text_left, line_y + name_galley.size().y + 2.0),
            egui::Align2::LEFT_TOP,
            range,
            egui::FontId::proportional(11.0),
            secondary_color,
        );
    }
}

/// Render an entry as a ghost (semi-transparent) at its prospective drop position
fn render_entry_ghost(ui: &mut Ui, rect: egui::Rect, entry: &ScheduleEntry, display_text: &str) {
    let painter = ui.painter();
    let alpha = 180;
    let base = entry_color(&entry.color);
    let accent = Color32::from_rgba_unmultiplied(base.r(), base.g(), base.b(), alpha);

    painter.rect(
        rect,
        4.0,
        Color32::from_rgba_unmultiplied(0x1a, 0x1d, 0x22, alpha),
        egui::Stroke::new(2.0, accent),
    );

    let clip = painter.with_clip_rect(rect.shrink(1.0));
    let time_galley = clip.layout_no_wrap(
        display_text.to_string(),
        egui::FontId::proportional(13.0),
        Color32::from_rgb(0x61, 0xaf, 0xef),
    );
    let x = rect.min.x + 8.0;
    let y = rect.min.y + 4.0;
    clip.galley(egui::pos2(x, y), time_galley.clone(), Color32::WHITE);
    clip.text(
        egui::pos2(x + time_galley.size().x + 6.0, y),
        egui::Align2::LEFT_TOP,
        &entry.name,
        egui::FontId::proportional(13.0),
        Color32::from_rgba_unmultiplied(200, 200, 192, alpha),
    );
}

/// Render the current recommendation as a swipe card
pub fn render_recommendation_card(
    ui: &mut Ui,
    recommendation: Option<&Recommendation>,
    remaining: usize,
    busy: bool,
) -> Option<CardAction> {
    let mut action = None;
    let (card_bg, text_color, secondary_color) = card_colors();

    let Some(rec) = recommendation else {
        ui.add_space(24.0);
        ui.vertical_centered(|ui| {
            if busy {
                ui.spinner();
            } else {
                ui.label(RichText::new("No recommendations yet").color(secondary_color));
            }
        });
        return None;
    };

    egui::Frame::none()
        .fill(card_bg)
        .rounding(8.0)
        .inner_margin(egui::Margin::same(14.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());

            ui.horizontal(|ui| {
                let icon = match rec.kind {
                    ItemKind::Place => egui_phosphor::fill::MAP_PIN,
                    ItemKind::Activity => egui_phosphor::fill::TICKET,
                };
                ui.label(RichText::new(icon).family(phosphor_fill_family()).size(18.0).color(text_color));
                ui.label(RichText::new(&rec.name).size(17.0).strong().color(text_color));
            });

            ui.horizontal(|ui| {
                if !rec.category.is_empty() {
                    ui.label(RichText::new(&rec.category).color(secondary_color));
                }
                if let Some(location) = &rec.location {
                    ui.label(RichText::new(location).color(secondary_color));
                }
                ui.label(RichText::new(format!("{:.0}% match", rec.score * 100.0)).color(secondary_color));
            });

            if !rec.description.is_empty() {
                ui.add_space(4.0);
                ui.label(RichText::new(&rec.description).color(text_color));
            }

            let tags = rec.tags();
            if !tags.is_empty() || rec.energy_level().is_some() {
                ui.horizontal_wrapped(|ui| {
                    for tag in tags {
                        ui.label(RichText::new(format!("#{}", tag)).small().color(secondary_color));
                    }
                    if let Some(energy) = rec.energy_level() {
                        ui.label(RichText::new(format!("{} energy", energy)).small().color(secondary_color));
                    }
                });
            }

            ui.add_space(10.0);
            ui.horizontal(|ui| {
                ui.add_enabled_ui(!busy, |ui| {
                    let dislike = ui.button(RichText::new(format!("{} Pass", egui_phosphor::regular::X)));
                    let like = ui.button(RichText::new(format!("{} Like", egui_phosphor::regular::HEART)));
                    let add = ui.button(RichText::new(format!("{} Add to schedule", egui_phosphor::regular::CALENDAR_PLUS)));
                    if dislike.clicked() {
                        action = Some(CardAction::Swipe(Swipe::Dislike));
                    }
                    if like.clicked() {
                        action = Some(CardAction::Swipe(Swipe::Like));
                    }
                    if add.clicked() {
                        action = Some(CardAction::AddToSchedule);
                    }
                });
            });

            ui.label(RichText::new(format!("{} more in the deck", remaining)).small().color(secondary_color));
        });

    action
}

/// Swipe progress toward a buildable schedule. Returns true when "Build schedule" was clicked.
pub fn render_confidence_strip(ui: &mut Ui, report: Option<&ConfidenceReport>, building: bool) -> bool {
    let Some(report) = report else {
        return false;
    };
    let (_, _, secondary_color) = card_colors();
    let mut clicked = false;

    ui.horizontal(|ui| {
        ui.label(
            RichText::new(format!(
                "{} likes, {} passes ({:.0}% liked)",
                report.likes,
                report.dislikes,
                report.confidence_ratio * 100.0
            ))
            .color(secondary_color),
        );
        if building {
            ui.spinner();
        } else if report.meets_threshold {
            clicked = ui
                .button(format!("{} Build schedule", egui_phosphor::regular::MAGIC_WAND))
                .clicked();
        } else {
            ui.label(RichText::new("keep swiping to build a schedule").small().color(secondary_color));
        }
    });

    clicked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ScheduleStore {
        ScheduleStore::from_entries(vec![
            ScheduleEntry::new("a", "Walk", "09:00", "10:00", "red").unwrap(),
            ScheduleEntry::new("b", "Lunch", "12:00", "13:00", "red").unwrap(),
        ])
    }

    #[test]
    fn sync_creates_and_prunes_interactions() {
        let listeners = PointerListeners::new();
        let mut store = store();
        let mut interactions = HashMap::new();

        sync_interactions(&mut interactions, &store, 40.0);
        assert_eq!(interactions.len(), 2);

        interactions
            .get_mut("b")
            .unwrap()
            .begin_resize(ResizeEdge::Bottom, &listeners);
        assert!(listeners.is_listening("b"));

        // entry removed while its resize is still open
        store.on_delete("b");
        sync_interactions(&mut interactions, &store, 40.0);
        assert_eq!(interactions.len(), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn sync_applies_new_slot_height_when_idle() {
        let store = store();
        let mut interactions = HashMap::new();
        sync_interactions(&mut interactions, &store, 40.0);
        sync_interactions(&mut interactions, &store, 20.0);
        assert_eq!(interactions["a"].geometry(), (120.0, 40.0));
    }

    #[test]
    fn drop_location_snaps_and_clamps() {
        let layout = LayoutMapper::new(40.0);
        let grid = egui::Rect::from_min_size(egui::pos2(0.0, 100.0), egui::vec2(460.0, layout.grid_height()));
        let entry = ScheduleEntry::new("a", "Walk", "09:00", "11:00", "red").unwrap();

        // second column, pointer 10 slots down with no grab offset
        let pos = egui::pos2(60.0 + 150.0, 100.0 + 400.0);
        assert_eq!(drop_location(pos, 0.0, &entry, grid, 60.0, 133.0, 3, layout), Some((1, 660)));

        // far below the grid keeps the two-hour block inside the day
        let pos = egui::pos2(70.0, 5000.0);
        assert_eq!(drop_location(pos, 0.0, &entry, grid, 60.0, 133.0, 3, layout), Some((0, 1290)));

        // over the hour labels is not a drop target
        let pos = egui::pos2(30.0, 300.0);
        assert_eq!(drop_location(pos, 0.0, &entry, grid, 60.0, 133.0, 3, layout), None);
    }
}
