//! Turn a set of confident recommendations into schedule entries

use tracing::{debug, info};

use crate::api::{ItemKind, Recommendation};
use crate::schedule::{EntryId, ScheduleStore};

#[derive(Debug, Default)]
pub struct PlanOutcome {
    pub added: Vec<EntryId>,
    /// Names that found no free slot on any remaining day
    pub skipped: Vec<String>,
    pub already_scheduled: usize,
}

/// Places in the order given, each followed by the activities it hosts, then any leftovers
pub fn visit_order(items: &[Recommendation]) -> Vec<&Recommendation> {
    let mut ordered = Vec::with_capacity(items.len());
    let mut taken = vec![false; items.len()];

    for (i, place) in items.iter().enumerate() {
        if place.kind != ItemKind::Place {
            continue;
        }
        ordered.push(place);
        taken[i] = true;
        for (j, activity) in items.iter().enumerate() {
            if !taken[j] && activity.belongs_to(place) {
                ordered.push(activity);
                taken[j] = true;
            }
        }
    }

    ordered.extend(items.iter().zip(&taken).filter(|(_, t)| !**t).map(|(item, _)| item));
    ordered
}

/// Place every item in the first free slot, filling days front to back.
/// Items whose name is already on the schedule are left alone.
pub fn fill_schedule(
    store: &mut ScheduleStore,
    items: &[Recommendation],
    trip_days: u32,
    colors: &[&str],
) -> PlanOutcome {
    let mut outcome = PlanOutcome::default();
    let mut day = 0;

    for item in visit_order(items) {
        if store.entries().iter().any(|e| e.name == item.name) {
            outcome.already_scheduled += 1;
            continue;
        }

        let color = colors
            .iter()
            .cycle()
            .nth(store.entries().len())
            .copied()
            .unwrap_or("blue");
        let description = (!item.description.is_empty()).then_some(item.description.as_str());
        let minutes = item.suggested_minutes();

        let placed = (day..trip_days).find_map(|d| {
            match store.add(&item.name, description, color, d, minutes) {
                Ok(id) => Some((d, id)),
                Err(e) => {
                    debug!(item = %item.id, day = d, error = %e, "no room");
                    None
                }
            }
        });

        match placed {
            Some((d, id)) => {
                day = d;
                outcome.added.push(id);
            }
            None => outcome.skipped.push(item.name.clone()),
        }
    }

    info!(
        added = outcome.added.len(),
        skipped = outcome.skipped.len(),
        already_scheduled = outcome.already_scheduled,
        "schedule built"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(id: &str) -> Recommendation {
        serde_json::from_value(serde_json::json!({"id": id, "name": format!("Place {}", id), "type": "place"}))
            .unwrap()
    }

    fn activity(id: &str, place_id: Option<&str>) -> Recommendation {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": format!("Activity {}", id),
            "type": "activity",
            "placeId": place_id,
        }))
        .unwrap()
    }

    fn ids(items: &[&Recommendation]) -> Vec<String> {
        items.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn activities_follow_their_place() {
        let items = vec![
            activity("a1", Some("p2")),
            place("p1"),
            activity("a2", None),
            place("p2"),
            activity("a3", Some("p1")),
        ];
        assert_eq!(ids(&visit_order(&items)), vec!["p1", "a3", "p2", "a1", "a2"]);
    }

    #[test]
    fn spills_into_later_days() {
        // Eight two-hour places fill 06:00 to 22:00; the ninth no longer fits
        let items: Vec<_> = (0..10).map(|i| place(&i.to_string())).collect();
        let mut store = ScheduleStore::new();

        let outcome = fill_schedule(&mut store, &items, 2, &["blue", "green"]);
        assert_eq!(outcome.added.len(), 10);
        assert!(outcome.skipped.is_empty());
        assert_eq!(store.entries_for_day(0).count(), 8);
        assert_eq!(store.entries_for_day(1).count(), 2);
        assert_eq!(store.entries_for_day(1).next().unwrap().start_time, "06:00");
    }

    #[test]
    fn reports_items_without_room() {
        let items: Vec<_> = (0..10).map(|i| place(&i.to_string())).collect();
        let mut store = ScheduleStore::new();

        let outcome = fill_schedule(&mut store, &items, 1, &["blue"]);
        assert_eq!(outcome.added.len(), 8);
        assert_eq!(outcome.skipped, vec!["Place 8", "Place 9"]);
    }

    #[test]
    fn leaves_scheduled_items_alone() {
        let items = vec![place("p1"), activity("a1", Some("p1"))];
        let mut store = ScheduleStore::new();
        fill_schedule(&mut store, &items, 3, &["blue"]);

        let again = fill_schedule(&mut store, &items, 3, &["blue"]);
        assert!(again.added.is_empty());
        assert_eq!(again.already_scheduled, 2);
        assert_eq!(store.entries().len(), 2);

        let day: Vec<_> = store.entries_for_day(0).map(|e| (e.start_time.as_str(), e.end_time.as_str())).collect();
        assert_eq!(day, vec![("06:00", "08:00"), ("08:00", "09:00")]);
    }
}
