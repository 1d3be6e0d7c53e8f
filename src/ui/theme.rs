use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};

/// Color tokens an entry may carry, in the order new entries cycle through them
pub const ENTRY_COLORS: [&str; 6] = ["blue", "green", "orange", "pink", "purple", "teal"];

/// Font family for filled Phosphor icons
pub fn phosphor_fill_family() -> FontFamily {
    FontFamily::Name("phosphor-fill".into())
}

pub fn setup_fonts(ctx: &egui::Context) {
    let mut fonts = egui::FontDefinitions::default();

    // Phosphor Regular icons as fallback in the Proportional family
    egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);

    // Phosphor Fill as a separate family, with the default font behind it for text
    fonts.font_data.insert(
        "phosphor-fill".into(),
        egui_phosphor::Variant::Fill.font_data(),
    );
    let mut fill_family = vec!["phosphor-fill".to_owned()];
    if let Some(proportional) = fonts.families.get(&FontFamily::Proportional) {
        fill_family.extend(proportional.iter().cloned());
    }
    fonts.families.insert(phosphor_fill_family(), fill_family);

    ctx.set_fonts(fonts);
}

pub fn setup_theme(ctx: &egui::Context, font_scale: f32) {
    let mut style = Style::default();

    let mut visuals = Visuals::dark();

    let bg = Color32::from_rgb(12, 14, 18);
    visuals.panel_fill = bg;
    visuals.window_fill = Color32::from_rgb(20, 23, 28);
    visuals.faint_bg_color = Color32::from_rgb(22, 25, 30);
    visuals.extreme_bg_color = Color32::from_rgb(8, 9, 12);

    // Cool grays
    visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(36, 40, 46);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, Color32::from_rgb(170, 176, 186));

    visuals.widgets.inactive.bg_fill = Color32::from_rgb(48, 54, 62);
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, Color32::from_rgb(200, 205, 214));

    visuals.widgets.hovered.bg_fill = Color32::from_rgb(70, 78, 90);
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, Color32::WHITE);

    let accent = accent_color();
    visuals.widgets.active.bg_fill = accent;
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, Color32::WHITE);

    visuals.selection.bg_fill = accent;
    visuals.selection.stroke = Stroke::new(1.0, Color32::WHITE);
    visuals.hyperlink_color = accent;

    visuals.widgets.noninteractive.rounding = Rounding::same(6.0);
    visuals.widgets.inactive.rounding = Rounding::same(6.0);
    visuals.widgets.hovered.rounding = Rounding::same(6.0);
    visuals.widgets.active.rounding = Rounding::same(6.0);
    visuals.window_rounding = Rounding::same(8.0);

    style.visuals = visuals;

    let size = 14.0 * font_scale;
    style.text_styles = [
        (TextStyle::Small, FontId::new(size * 0.85, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(size, FontFamily::Proportional)),
        (TextStyle::Button, FontId::new(size, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(size * 1.3, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(size, FontFamily::Monospace)),
    ]
    .into();

    style.spacing.item_spacing = egui::vec2(10.0, 8.0);
    style.spacing.button_padding = egui::vec2(14.0, 8.0);
    style.spacing.window_margin = egui::Margin::same(20.0);

    ctx.set_style(style);
}

pub fn accent_color() -> Color32 {
    Color32::from_rgb(0x2e, 0xa0, 0x8f)
}

/// Display color for an entry's color token. Unknown tokens fall back to blue.
pub fn entry_color(token: &str) -> Color32 {
    match token {
        "green" => Color32::from_rgb(0x65, 0xba, 0x43),
        "orange" => Color32::from_rgb(0xec, 0x71, 0x1b),
        "pink" => Color32::from_rgb(0xe8, 0x28, 0x71),
        "purple" => Color32::from_rgb(0x90, 0x4e, 0xe2),
        "teal" => Color32::from_rgb(0x2e, 0xa0, 0x8f),
        _ => Color32::from_rgb(0x13, 0x98, 0xf4),
    }
}

/// Returns (grid_line, hour_line, label) colors for the schedule grid
pub fn grid_colors() -> (Color32, Color32, Color32) {
    (
        Color32::from_rgb(0x24, 0x27, 0x2c),
        Color32::from_rgb(0x3a, 0x3f, 0x47),
        Color32::from_rgb(0x70, 0x76, 0x80),
    )
}

/// Returns (bg_color, text_color, secondary_text_color) for cards and blocks
pub fn card_colors() -> (Color32, Color32, Color32) {
    (
        Color32::from_rgb(0x1a, 0x1d, 0x22),
        Color32::WHITE,
        Color32::from_rgb(0xb8, 0xbe, 0xc8),
    )
}
