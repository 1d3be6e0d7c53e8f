use eframe::egui;
use egui::{Color32, RichText};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::api::{
    is_offline_error, ConfidenceCheckRequest, ConfidenceReport, Recommendation,
    RecommendationRequest, Swipe, SwipeAction, TripClient, UserPreferences,
};
use crate::config::{ClockFormat, Config, SLOT_HEIGHT_RANGE, TRIP_DAYS_RANGE};
use crate::export::{self, Itinerary};
use crate::planner;
use crate::schedule::time::{parse_user_time, time_to_minutes};
use crate::schedule::{
    EntryId, LayoutMapper, PointerListeners, ScheduleEntry, ScheduleItemInteraction, ScheduleStore,
};
use super::theme::ENTRY_COLORS;
use super::views::{self, CardAction};

/// How often the hand tracker is polled while gestures are enabled
const GESTURE_POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct TripboardApp {
    config: Config,
    state: AppState,

    // Schedule
    store: ScheduleStore,
    store_path: Option<PathBuf>,
    interactions: HashMap<EntryId, ScheduleItemInteraction>,
    listeners: PointerListeners,
    selected_day: u32,

    // Recommendation deck
    deck: Vec<Recommendation>,
    deck_index: usize,
    liked_items: Vec<String>,
    disliked_items: Vec<String>,
    deck_loading: bool,
    swipe_pending: bool,
    confidence: Option<ConfidenceReport>,
    building_schedule: bool,

    // Gesture polling
    last_gesture_poll: Instant,
    gesture_in_flight: bool,

    // Dialog for add/edit
    show_dialog: bool,
    dialog_mode: DialogMode,
    dialog_entry_id: String,
    dialog_name: String,
    dialog_description: String,
    dialog_start_time: String,
    dialog_end_time: String,
    dialog_day: u32,
    dialog_color: String,
    dialog_error: Option<String>,

    // Settings dialog
    show_settings: bool,
    settings_service_url: String,
    settings_user_id: String,
    settings_destination: String,
    settings_slot_height: f32,
    settings_trip_days: u32,
    settings_clock_format: ClockFormat,
    settings_gestures: bool,

    // Status
    status_message: Option<(String, bool)>, // (message, is_error)
    is_offline: bool,

    // Async communication
    runtime: tokio::runtime::Runtime,
    result_rx: Receiver<AsyncResult>,
    result_tx: Sender<AsyncResult>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AppState {
    Setup,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DialogMode {
    Add,
    Edit,
}

enum AsyncResult {
    RecommendationsLoaded(Vec<Recommendation>),
    SwipeRecorded(String, Swipe),  // (item id, swipe)
    ConfidenceChecked(ConfidenceReport),
    HighConfidenceLoaded(Vec<Recommendation>),
    Gesture(Option<Swipe>),
    ServiceChecked(String),
    Error(String),
    Offline,
}

/// Swipe to apply for a tracker reading. Readings that arrive while the deck is busy are dropped.
fn gesture_swipe(reading: Option<Swipe>, deck_busy: bool) -> Option<Swipe> {
    let swipe = reading?;
    if deck_busy {
        debug!(action = swipe.label(), "gesture ignored while deck is busy");
        return None;
    }
    Some(swipe)
}

impl TripboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> anyhow::Result<Self> {
        let config = Config::load().unwrap_or_else(|e| {
            warn!(error = %e, "falling back to default config");
            Config::default()
        });
        super::setup_fonts(&cc.egui_ctx);
        super::setup_theme(&cc.egui_ctx, config.font_scale);

        let state = if config.is_configured() {
            AppState::Main
        } else {
            AppState::Setup
        };

        let store_path = ScheduleStore::default_path()
            .map_err(|e| warn!(error = %e, "schedule will not be persisted"))
            .ok();
        let (store, status_message) = match store_path.as_deref().map(ScheduleStore::load) {
            Some(Ok(store)) => (store, None),
            Some(Err(e)) => {
                warn!(error = %e, "could not load schedule");
                (ScheduleStore::new(), Some((format!("Could not load schedule: {}", e), true)))
            }
            None => (ScheduleStore::new(), None),
        };

        let runtime = tokio::runtime::Runtime::new()?;
        let (result_tx, result_rx) = channel();

        let mut app = Self {
            settings_service_url: config.service_url.clone(),
            settings_user_id: config.user_id.clone(),
            settings_destination: config.destination.clone(),
            settings_slot_height: config.slot_height,
            settings_trip_days: config.trip_days,
            settings_clock_format: config.clock_format,
            settings_gestures: config.gestures_enabled,
            show_settings: false,
            config,
            state,
            store,
            store_path,
            interactions: HashMap::new(),
            listeners: PointerListeners::new(),
            selected_day: 0,
            deck: Vec::new(),
            deck_index: 0,
            liked_items: Vec::new(),
            disliked_items: Vec::new(),
            deck_loading: false,
            swipe_pending: false,
            confidence: None,
            building_schedule: false,
            last_gesture_poll: Instant::now(),
            gesture_in_flight: false,
            show_dialog: false,
            dialog_mode: DialogMode::Add,
            dialog_entry_id: String::new(),
            dialog_name: String::new(),
            dialog_description: String::new(),
            dialog_start_time: String::new(),
            dialog_end_time: String::new(),
            dialog_day: 0,
            dialog_color: ENTRY_COLORS[0].to_string(),
            dialog_error: None,
            status_message,
            is_offline: false,
            runtime,
            result_rx,
            result_tx,
        };

        if state == AppState::Main {
            app.load_recommendations();
            app.check_confidence();
        }

        Ok(app)
    }

    fn check_async_results(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            match result {
                AsyncResult::RecommendationsLoaded(recommendations) => {
                    info!(count = recommendations.len(), "recommendations loaded");
                    self.deck = recommendations;
                    self.deck_index = 0;
                    self.deck_loading = false;
                    self.is_offline = false;
                    self.status_message = None;
                }
                AsyncResult::SwipeRecorded(item_id, swipe) => {
                    self.swipe_pending = false;
                    info!(item = %item_id, action = swipe.label(), "swipe recorded");
                    self.check_confidence();
                }
                AsyncResult::ConfidenceChecked(report) => {
                    if report.meets_threshold && !self.confidence.as_ref().is_some_and(|c| c.meets_threshold) {
                        info!(likes = report.likes, ratio = report.confidence_ratio, "enough swipes to build a schedule");
                    }
                    self.confidence = Some(report);
                }
                AsyncResult::HighConfidenceLoaded(items) => {
                    self.building_schedule = false;
                    let outcome = planner::fill_schedule(&mut self.store, &items, self.config.trip_days, &ENTRY_COLORS);
                    let mut msg = format!("Scheduled {} of {} items", outcome.added.len(), items.len());
                    if !outcome.skipped.is_empty() {
                        msg.push_str(&format!(", no room for {}", outcome.skipped.join(", ")));
                    }
                    self.status_message = Some((msg, !outcome.skipped.is_empty()));
                }
                AsyncResult::Gesture(swipe) => {
                    self.gesture_in_flight = false;
                    if let Some(swipe) = gesture_swipe(swipe, self.deck_busy()) {
                        self.swipe_current(swipe);
                    }
                }
                AsyncResult::ServiceChecked(summary) => {
                    self.is_offline = false;
                    self.status_message = Some((summary, false));
                }
                AsyncResult::Error(msg) => {
                    self.deck_loading = false;
                    self.building_schedule = false;
                    self.swipe_pending = false;
                    self.gesture_in_flight = false;
                    self.is_offline = false;
                    self.status_message = Some((msg, true));
                }
                AsyncResult::Offline => {
                    self.deck_loading = false;
                    self.building_schedule = false;
                    self.swipe_pending = false;
                    self.gesture_in_flight = false;
                    self.is_offline = true;
                    self.status_message = None;
                }
            }
        }
    }

    /// Forward a failed request to the UI thread as Offline or Error
    fn report_error(tx: &Sender<AsyncResult>, context: &str, e: anyhow::Error) {
        if is_offline_error(&e) {
            let _ = tx.send(AsyncResult::Offline);
        } else {
            warn!(error = %e, "{}", context);
            let _ = tx.send(AsyncResult::Error(format!("{}: {}", context, e)));
        }
    }

    fn preferences(&self) -> UserPreferences {
        UserPreferences {
            user_id: self.config.user_id.clone(),
            age: Some(self.config.user_age),
            liked_items: self.liked_items.clone(),
            disliked_items: self.disliked_items.clone(),
            travel_history: vec![self.config.destination.clone()],
        }
    }

    fn load_recommendations(&mut self) {
        if !self.config.is_configured() || self.deck_loading {
            return;
        }
        self.deck_loading = true;

        let config = self.config.clone();
        let request = RecommendationRequest {
            user: self.preferences(),
            destination: config.destination.clone(),
            top_n: config.recommendation_count,
        };
        let tx = self.result_tx.clone();

        self.runtime.spawn(async move {
            let result = async {
                let client = TripClient::new(&config)?;
                client.recommendations(&request).await
            }
            .await;

            match result {
                Ok(recommendations) => {
                    let _ = tx.send(AsyncResult::RecommendationsLoaded(recommendations));
                }
                Err(e) => Self::report_error(&tx, "Failed to load recommendations", e),
            }
        });
    }

    fn confidence_request(&self) -> ConfidenceCheckRequest {
        ConfidenceCheckRequest {
            user_id: self.config.user_id.clone(),
            destination: self.config.destination.clone(),
        }
    }

    /// Ask whether the swipes so far are decisive enough to build a schedule from
    fn check_confidence(&mut self) {
        let config = self.config.clone();
        let request = self.confidence_request();
        let tx = self.result_tx.clone();

        self.runtime.spawn(async move {
            let result = async {
                let client = TripClient::new(&config)?;
                client.confidence_check(&request).await
            }
            .await;

            match result {
                Ok(report) => {
                    let _ = tx.send(AsyncResult::ConfidenceChecked(report));
                }
                Err(e) => Self::report_error(&tx, "Confidence check failed", e),
            }
        });
    }

    fn build_schedule(&mut self) {
        if self.building_schedule {
            return;
        }
        self.building_schedule = true;

        let config = self.config.clone();
        let request = self.confidence_request();
        let tx = self.result_tx.clone();

        self.runtime.spawn(async move {
            let result = async {
                let client = TripClient::new(&config)?;
                client.high_confidence_items(&request).await
            }
            .await;

            match result {
                Ok(items) => {
                    let _ = tx.send(AsyncResult::HighConfidenceLoaded(items));
                }
                Err(e) => Self::report_error(&tx, "Failed to load items for the schedule", e),
            }
        });
    }

    /// A swipe or reload is in flight, so the top card must not change yet
    fn deck_busy(&self) -> bool {
        self.deck_loading || self.swipe_pending
    }

    fn current_card(&self) -> Option<&Recommendation> {
        self.deck.get(self.deck_index)
    }

    /// Record a like/dislike for the card on top of the deck and advance
    fn swipe_current(&mut self, swipe: Swipe) {
        let Some(card) = self.current_card() else {
            return;
        };
        let item_id = card.id.clone();

        match swipe {
            Swipe::Like => self.liked_items.push(item_id.clone()),
            Swipe::Dislike => self.disliked_items.push(item_id.clone()),
        }
        self.deck_index += 1;
        self.swipe_pending = true;

        let config = self.config.clone();
        let action = SwipeAction {
            user_id: config.user_id.clone(),
            item_id: item_id.clone(),
            action: swipe,
            destination: config.destination.clone(),
        };
        let tx = self.result_tx.clone();

        self.runtime.spawn(async move {
            let result = async {
                let client = TripClient::new(&config)?;
                client.submit_swipe(&action).await
            }
            .await;

            match result {
                Ok(()) => {
                    let _ = tx.send(AsyncResult::SwipeRecorded(item_id, swipe));
                }
                Err(e) => Self::report_error(&tx, "Failed to record swipe", e),
            }
        });

        // Deck exhausted: ask again with the updated preferences
        if self.deck_index >= self.deck.len() {
            self.load_recommendations();
        }
    }

    fn poll_gesture(&mut self, ctx: &egui::Context) {
        if !self.config.gestures_enabled || self.current_card().is_none() {
            return;
        }
        ctx.request_repaint_after(GESTURE_POLL_INTERVAL);
        if self.gesture_in_flight || self.last_gesture_poll.elapsed() < GESTURE_POLL_INTERVAL {
            return;
        }
        self.gesture_in_flight = true;
        self.last_gesture_poll = Instant::now();

        let config = self.config.clone();
        let tx = self.result_tx.clone();
        self.runtime.spawn(async move {
            let result = async {
                let client = TripClient::new(&config)?;
                client.finger_track().await
            }
            .await;

            match result {
                Ok(swipe) => {
                    let _ = tx.send(AsyncResult::Gesture(swipe));
                }
                Err(e) => Self::report_error(&tx, "Gesture tracker unavailable", e),
            }
        });
    }

    /// Ask the service for health and hand-tracker state and report both
    fn check_service(&mut self) {
        let config = self.config.clone();
        let tx = self.result_tx.clone();
        self.runtime.spawn(async move {
            let result = async {
                let client = TripClient::new(&config)?;
                let health = client.health().await?;
                let tracker = client.tracker_status().await?;
                let summary = if tracker.running {
                    let hand = client.hand_position().await?;
                    format!(
                        "Service {}, tracker running (hand at {:.0}%, {:.0}%)",
                        health.status,
                        hand.x_frac * 100.0,
                        hand.y_frac * 100.0
                    )
                } else {
                    match tracker.error {
                        Some(error) => format!("Service {}, tracker stopped: {}", health.status, error),
                        None => format!("Service {}, tracker stopped", health.status),
                    }
                };
                Ok::<_, anyhow::Error>(summary)
            }
            .await;

            match result {
                Ok(summary) => {
                    let _ = tx.send(AsyncResult::ServiceChecked(summary));
                }
                Err(e) => Self::report_error(&tx, "Service check failed", e),
            }
        });
    }

    fn add_current_to_schedule(&mut self) {
        let Some(card) = self.current_card() else {
            return;
        };
        let color = ENTRY_COLORS[self.store.entries().len() % ENTRY_COLORS.len()];
        let description = (!card.description.is_empty()).then(|| card.description.clone());
        let (name, minutes) = (card.name.clone(), card.suggested_minutes());

        match self.store.add(&name, description.as_deref(), color, self.selected_day, minutes) {
            Ok(_) => {
                self.status_message = Some((format!("Added {} to day {}", name, self.selected_day + 1), false));
                self.swipe_current(Swipe::Like);
            }
            Err(e) => {
                self.status_message = Some((e.to_string(), true));
            }
        }
    }

    fn open_add_dialog(&mut self, day: u32, start_time: &str) {
        self.dialog_mode = DialogMode::Add;
        self.dialog_entry_id.clear();
        self.dialog_name.clear();
        self.dialog_description.clear();
        self.dialog_start_time = start_time.to_string();
        self.dialog_end_time = crate::schedule::time::minutes_to_time(time_to_minutes(start_time) + 60);
        self.dialog_day = day;
        self.dialog_color = ENTRY_COLORS[self.store.entries().len() % ENTRY_COLORS.len()].to_string();
        self.dialog_error = None;
        self.show_dialog = true;
    }

    fn open_edit_dialog(&mut self, id: &str) {
        let Some(entry) = self.store.get(id) else {
            return;
        };
        self.dialog_mode = DialogMode::Edit;
        self.dialog_entry_id = entry.id.clone();
        self.dialog_name = entry.name.clone();
        self.dialog_description = entry.description.clone().unwrap_or_default();
        self.dialog_start_time = entry.start_time.clone();
        self.dialog_end_time = entry.end_time.clone();
        self.dialog_day = entry.day;
        self.dialog_color = entry.color.clone();
        self.dialog_error = None;
        self.show_dialog = true;
    }

    fn save_dialog(&mut self) {
        let Some(start) = parse_user_time(&self.dialog_start_time) else {
            self.dialog_error = Some("Start time not recognised (try 9:30am or 14:00)".to_string());
            return;
        };
        let Some(end) = parse_user_time(&self.dialog_end_time) else {
            self.dialog_error = Some("End time not recognised (try 11am or 16:30)".to_string());
            return;
        };

        let id = match self.dialog_mode {
            DialogMode::Add => uuid::Uuid::new_v4().to_string(),
            DialogMode::Edit => self.dialog_entry_id.clone(),
        };

        let result = ScheduleEntry::new(id, self.dialog_name.trim(), &start, &end, self.dialog_color.clone())
            .map_err(crate::schedule::StoreError::from)
            .and_then(|entry| {
                let entry = entry
                    .with_description(self.dialog_description.clone())
                    .on_day(self.dialog_day);
                match self.dialog_mode {
                    DialogMode::Add => self.store.insert(entry),
                    DialogMode::Edit => self.store.update(entry),
                }
            });

        match result {
            Ok(()) => {
                self.show_dialog = false;
                self.dialog_error = None;
            }
            Err(e) => self.dialog_error = Some(e.to_string()),
        }
    }

    fn save_settings(&mut self) {
        self.config.service_url = self.settings_service_url.trim().to_string();
        self.config.user_id = self.settings_user_id.trim().to_string();
        let destination_changed = self.config.destination != self.settings_destination.trim();
        self.config.destination = self.settings_destination.trim().to_string();
        self.config.slot_height = self.settings_slot_height;
        self.config.trip_days = self.settings_trip_days;
        self.config.clock_format = self.settings_clock_format;
        self.config.gestures_enabled = self.settings_gestures;
        self.config = std::mem::take(&mut self.config).clamped();
        self.settings_slot_height = self.config.slot_height;
        self.settings_trip_days = self.config.trip_days;

        if let Err(e) = self.config.save() {
            self.status_message = Some((format!("Failed to save settings: {}", e), true));
            return;
        }
        info!("settings saved");

        self.selected_day = self.selected_day.min(self.config.trip_days - 1);
        self.show_settings = false;

        if self.config.is_configured() {
            self.state = AppState::Main;
            if destination_changed || self.deck.is_empty() {
                self.liked_items.clear();
                self.disliked_items.clear();
                self.confidence = None;
                self.deck.clear();
                self.load_recommendations();
            }
        }
    }

    /// Persist the schedule once no interaction is in progress
    fn persist_schedule(&mut self) {
        if !self.store.is_dirty() || !self.listeners.is_empty() {
            return;
        }
        let Some(path) = self.store_path.clone() else {
            return;
        };
        if let Err(e) = self.store.save(&path) {
            warn!(error = %e, "failed to save schedule");
            self.status_message = Some((format!("Failed to save schedule: {}", e), true));
        }
    }

    fn export_itinerary(&mut self) {
        let itinerary = Itinerary::build(&self.store, &self.config.destination, self.config.trip_days);
        let dir = self
            .store_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(std::env::temp_dir);
        match export::export_itinerary(&itinerary, &dir) {
            Ok(path) => {
                info!(path = %path.display(), "itinerary exported");
                self.status_message = Some((format!("Exported to {}", path.display()), false));
            }
            Err(e) => self.status_message = Some((format!("Export failed: {:#}", e), true)),
        }
    }

    fn render_setup(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(60.0);
            ui.heading("Plan a trip");
            ui.add_space(8.0);
            ui.label("Tell us who you are and where you're going to get recommendations.");
            ui.add_space(20.0);

            egui::Grid::new("setup_grid").num_columns(2).spacing([12.0, 10.0]).show(ui, |ui| {
                ui.label("Your name or id");
                ui.text_edit_singleline(&mut self.settings_user_id);
                ui.end_row();
                ui.label("Destination");
                ui.text_edit_singleline(&mut self.settings_destination);
                ui.end_row();
                ui.label("Service URL");
                ui.text_edit_singleline(&mut self.settings_service_url);
                ui.end_row();
            });

            ui.add_space(16.0);
            let ready = !self.settings_user_id.trim().is_empty() && !self.settings_destination.trim().is_empty();
            if ui.add_enabled(ready, egui::Button::new("Start planning")).clicked() {
                self.save_settings();
            }
        });
    }

    fn render_main(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(RichText::new(&self.config.destination).heading().color(Color32::WHITE));
            ui.add_space(16.0);

            ui.label("Add to");
            egui::ComboBox::from_id_salt("selected_day")
                .selected_text(format!("Day {}", self.selected_day + 1))
                .show_ui(ui, |ui| {
                    for day in 0..self.config.trip_days {
                        ui.selectable_value(&mut self.selected_day, day, format!("Day {}", day + 1));
                    }
                });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button(egui_phosphor::regular::GEAR).on_hover_text("Settings").clicked() {
                    self.show_settings = true;
                }
                if ui.button(egui_phosphor::regular::EXPORT).on_hover_text("Export itinerary").clicked() {
                    self.export_itinerary();
                }
                if ui.button(egui_phosphor::regular::ARROWS_CLOCKWISE).on_hover_text("New recommendations").clicked() {
                    self.load_recommendations();
                }
                if self.is_offline {
                    ui.label(RichText::new(format!("{} Offline", egui_phosphor::regular::WIFI_SLASH)).color(Color32::from_rgb(0xe5, 0xaa, 0x00)));
                }
            });
        });

        if let Some((msg, is_error)) = &self.status_message {
            let color = if *is_error { Color32::from_rgb(0xe5, 0x4d, 0x42) } else { Color32::from_rgb(0x65, 0xba, 0x43) };
            ui.label(RichText::new(msg).color(color));
        }
        ui.separator();

        if views::render_confidence_strip(ui, self.confidence.as_ref(), self.building_schedule) {
            self.build_schedule();
        }

        let remaining = self.deck.len().saturating_sub(self.deck_index + 1);
        let busy = self.deck_busy();
        match views::render_recommendation_card(ui, self.current_card(), remaining, self.deck_loading) {
            Some(CardAction::Swipe(swipe)) if !busy => self.swipe_current(swipe),
            Some(CardAction::AddToSchedule) if !busy => self.add_current_to_schedule(),
            _ => {}
        }
        ui.add_space(8.0);

        let layout = LayoutMapper::new(self.config.slot_height);
        views::sync_interactions(&mut self.interactions, &self.store, self.config.slot_height);
        let result = views::render_schedule_view(
            ui,
            &mut self.store,
            &mut self.interactions,
            &self.listeners,
            layout,
            self.config.trip_days,
            self.config.clock_format,
        );

        if let Some(id) = result.edit_entry {
            self.open_edit_dialog(&id);
        }
        if let Some((day, start)) = result.add_at {
            self.open_add_dialog(day, &start);
        }
        if let Some(id) = result.moved {
            info!(id = %id, "entry moved by drag");
        }
    }

    fn render_dialog(&mut self, ctx: &egui::Context) {
        let title = match self.dialog_mode {
            DialogMode::Add => "Add activity",
            DialogMode::Edit => "Edit activity",
        };
        let mut open = true;
        let mut save = false;
        let mut delete = false;

        egui::Window::new(title)
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                egui::Grid::new("entry_dialog_grid").num_columns(2).spacing([12.0, 10.0]).show(ui, |ui| {
                    ui.label("Name");
                    ui.text_edit_singleline(&mut self.dialog_name);
                    ui.end_row();

                    ui.label("Start");
                    ui.text_edit_singleline(&mut self.dialog_start_time);
                    ui.end_row();

                    ui.label("End");
                    ui.text_edit_singleline(&mut self.dialog_end_time);
                    ui.end_row();

                    ui.label("Day");
                    egui::ComboBox::from_id_salt("dialog_day")
                        .selected_text(format!("Day {}", self.dialog_day + 1))
                        .show_ui(ui, |ui| {
                            for day in 0..self.config.trip_days {
                                ui.selectable_value(&mut self.dialog_day, day, format!("Day {}", day + 1));
                            }
                        });
                    ui.end_row();

                    ui.label("Color");
                    ui.horizontal(|ui| {
                        for token in ENTRY_COLORS {
                            let color = super::theme::entry_color(token);
                            let selected = self.dialog_color == token;
                            let (rect, response) = ui.allocate_exact_size(egui::vec2(18.0, 18.0), egui::Sense::click());
                            ui.painter().rect_filled(rect, 4.0, color);
                            if selected {
                                ui.painter().rect_stroke(rect.expand(2.0), 5.0, egui::Stroke::new(2.0, Color32::WHITE));
                            }
                            if response.clicked() {
                                self.dialog_color = token.to_string();
                            }
                        }
                    });
                    ui.end_row();

                    ui.label("Notes");
                    ui.text_edit_multiline(&mut self.dialog_description);
                    ui.end_row();
                });

                if let Some(error) = &self.dialog_error {
                    ui.label(RichText::new(error).color(Color32::from_rgb(0xe5, 0x4d, 0x42)));
                }

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        save = true;
                    }
                    if self.dialog_mode == DialogMode::Edit && ui.button("Delete").clicked() {
                        delete = true;
                    }
                });
            });

        if save {
            self.save_dialog();
        } else if delete {
            let deleted = match self.interactions.get_mut(&self.dialog_entry_id) {
                Some(interaction) => interaction.delete(&mut self.store),
                None => false,
            };
            if !deleted {
                self.dialog_error = Some("Finish moving the activity before deleting it".to_string());
            } else {
                self.show_dialog = false;
            }
        } else if !open {
            self.show_dialog = false;
        }
    }

    fn render_settings(&mut self, ctx: &egui::Context) {
        let mut open = true;
        let mut save = false;
        let mut check = false;

        egui::Window::new("Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                egui::Grid::new("settings_grid").num_columns(2).spacing([12.0, 10.0]).show(ui, |ui| {
                    ui.label("User id");
                    ui.text_edit_singleline(&mut self.settings_user_id);
                    ui.end_row();

                    ui.label("Destination");
                    ui.text_edit_singleline(&mut self.settings_destination);
                    ui.end_row();

                    ui.label("Service URL");
                    ui.text_edit_singleline(&mut self.settings_service_url);
                    ui.end_row();

                    ui.label("Trip days");
                    ui.add(egui::DragValue::new(&mut self.settings_trip_days).range(TRIP_DAYS_RANGE));
                    ui.end_row();

                    ui.label("Slot height");
                    ui.add(egui::Slider::new(&mut self.settings_slot_height, SLOT_HEIGHT_RANGE).suffix(" px"));
                    ui.end_row();

                    ui.label("Clock");
                    ui.horizontal(|ui| {
                        ui.selectable_value(&mut self.settings_clock_format, ClockFormat::Hour24, "14:30");
                        ui.selectable_value(&mut self.settings_clock_format, ClockFormat::Hour12, "2:30pm");
                    });
                    ui.end_row();

                    ui.label("Gestures");
                    ui.checkbox(&mut self.settings_gestures, "Swipe with hand tracking");
                    ui.end_row();
                });

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        save = true;
                    }
                    if ui.button("Check service").clicked() {
                        check = true;
                    }
                });
            });

        if check {
            self.check_service();
        }
        if save {
            self.save_settings();
        } else if !open {
            self.show_settings = false;
        }
    }
}

impl eframe::App for TripboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_async_results();
        self.poll_gesture(ctx);

        egui::CentralPanel::default().show(ctx, |ui| match self.state {
            AppState::Setup => self.render_setup(ui),
            AppState::Main => self.render_main(ui),
        });

        if self.show_dialog {
            self.render_dialog(ctx);
        }
        if self.show_settings {
            self.render_settings(ctx);
        }

        // Keep delivering pointer events while an interaction is open
        if !self.listeners.is_empty() {
            ctx.request_repaint();
        }
        if self.deck_loading || self.swipe_pending {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        self.persist_schedule();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gestures_wait_for_the_deck() {
        assert_eq!(gesture_swipe(Some(Swipe::Like), false), Some(Swipe::Like));
        assert_eq!(gesture_swipe(Some(Swipe::Dislike), true), None);
        assert_eq!(gesture_swipe(None, false), None);
    }
}
