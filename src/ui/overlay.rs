//! Scene overlay: the palette picker and the greeting line
//!
//! The overlay never touches the scene directly. It edits a draft
//! [`SceneSettings`] which the app diffs against the live settings after each
//! frame.

use imgui::{Condition, StyleColor, StyleVar, Ui};

use crate::scene::{Greeting, PaletteIndex, SceneSettings};

pub const HINT_TEXT: &str = "DRAG TO ROTATE | SCROLL TO ZOOM";

const SWATCH_SIZE: f32 = 44.0;
const SWATCH_COLUMNS: usize = 4;
const SCREEN_MARGIN: f32 = 24.0;
const GREETING_FONT_SCALE: f32 = 2.5;
/// Left to right: #ff5555, #ffcc00, #55ff55
const GREETING_GRADIENT: [u32; 3] = [0xff5555, 0xffcc00, 0x55ff55];
/// Plain text color while the greeting is being edited, so the caret shows
const EDITING_TEXT_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const HINT_PULSE_RATE: f32 = 2.0;

/// Opaque RGBA for a `0xRRGGBB` swatch, in the sRGB space ImGui draws in
pub fn swatch_rgba(hex: u32) -> [f32; 4] {
    let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
    [channel(16), channel(8), channel(0), 1.0]
}

/// Color of the greeting at `u` in `[0, 1]` across the text
pub fn greeting_gradient(u: f32) -> [f32; 4] {
    let span = (GREETING_GRADIENT.len() - 1) as f32;
    let scaled = u.clamp(0.0, 1.0) * span;
    let i = (scaled.floor() as usize).min(GREETING_GRADIENT.len() - 2);
    let f = scaled - i as f32;
    let a = swatch_rgba(GREETING_GRADIENT[i]);
    let b = swatch_rgba(GREETING_GRADIENT[i + 1]);
    [
        a[0] + (b[0] - a[0]) * f,
        a[1] + (b[1] - a[1]) * f,
        a[2] + (b[2] - a[2]) * f,
        1.0,
    ]
}

/// Opacity of the control hint, pulsing between 0.4 and 0.8
pub fn hint_alpha(time: f32) -> f32 {
    0.6 + 0.2 * (time * HINT_PULSE_RATE).sin()
}

pub struct SceneOverlay {
    draft: SceneSettings,
    greeting_input: String,
    /// The greeting field held focus last frame
    editing: bool,
}

impl SceneOverlay {
    pub fn new(settings: &SceneSettings) -> Self {
        Self {
            draft: settings.clone(),
            greeting_input: settings.greeting.as_str().to_owned(),
            editing: false,
        }
    }

    /// Settings as edited so far
    pub fn draft(&self) -> &SceneSettings {
        &self.draft
    }

    pub fn select_palette(&mut self, palette: PaletteIndex) {
        self.draft.palette = palette;
    }

    /// Stores the edited greeting, truncating the input box to the cap
    pub fn commit_greeting(&mut self) {
        let greeting = Greeting::new(self.greeting_input.as_str());
        if greeting.as_str() != self.greeting_input {
            self.greeting_input = greeting.as_str().to_owned();
        }
        self.draft.greeting = greeting;
    }

    /// Builds both overlay windows. `time` drives the hint pulse.
    pub fn build(&mut self, ui: &Ui, time: f32) {
        let display_size = ui.io().display_size;
        if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
            return;
        }

        self.palette_window(ui, display_size);
        self.greeting_window(ui, display_size, time);
    }

    fn palette_window(&mut self, ui: &Ui, display_size: [f32; 2]) {
        let _rounding = ui.push_style_var(StyleVar::WindowRounding(14.0));
        ui.window("Theme Color")
            .position(
                [SCREEN_MARGIN, display_size[1] - SCREEN_MARGIN],
                Condition::Always,
            )
            .position_pivot([0.0, 1.0])
            .always_auto_resize(true)
            .title_bar(false)
            .movable(false)
            .resizable(false)
            .bg_alpha(0.5)
            .build(|| {
                let title = "THEME COLOR";
                let spacing = ui.clone_style().item_spacing[0];
                let grid_width = SWATCH_COLUMNS as f32 * (SWATCH_SIZE + spacing) - spacing;
                center_next_item(ui, grid_width, ui.calc_text_size(title)[0]);
                ui.text_colored([1.0, 1.0, 1.0, 0.9], title);
                ui.spacing();

                let active = self.draft.palette;
                for (i, index) in PaletteIndex::all().enumerate() {
                    if i % SWATCH_COLUMNS != 0 {
                        ui.same_line();
                    }
                    if swatch(ui, i, index, index == active) {
                        self.select_palette(index);
                    }
                }
            });
    }

    fn greeting_window(&mut self, ui: &Ui, display_size: [f32; 2], time: f32) {
        let _border = ui.push_style_var(StyleVar::WindowBorderSize(0.0));
        ui.window("##greeting")
            .position(
                [display_size[0] * 0.5, display_size[1] - SCREEN_MARGIN * 2.0],
                Condition::Always,
            )
            .position_pivot([0.5, 1.0])
            .size([display_size[0] * 0.9, 0.0], Condition::Always)
            .no_decoration()
            .movable(false)
            .bg_alpha(0.0)
            .build(|| {
                let avail = ui.content_region_avail()[0];

                ui.set_window_font_scale(GREETING_FONT_SCALE);
                {
                    let text_color = if self.editing {
                        EDITING_TEXT_COLOR
                    } else {
                        [0.0, 0.0, 0.0, 0.0]
                    };
                    let _text = ui.push_style_color(StyleColor::Text, text_color);
                    let _frame = ui.push_style_color(StyleColor::FrameBg, [0.0, 0.0, 0.0, 0.0]);
                    let _hovered =
                        ui.push_style_color(StyleColor::FrameBgHovered, [1.0, 1.0, 1.0, 0.04]);
                    let _active =
                        ui.push_style_color(StyleColor::FrameBgActive, [1.0, 1.0, 1.0, 0.06]);

                    let padding = ui.calc_text_size("MM")[0];
                    let width = (ui.calc_text_size(&self.greeting_input)[0] + padding).min(avail);
                    center_next_item(ui, avail, width);
                    ui.set_next_item_width(width);
                    if ui.input_text("##greeting_text", &mut self.greeting_input).build() {
                        self.commit_greeting();
                    }
                    self.editing = ui.is_item_active();

                    if !self.editing {
                        let [x, y] = ui.item_rect_min();
                        let padding = ui.clone_style().frame_padding;
                        gradient_text(ui, [x + padding[0], y + padding[1]], &self.greeting_input);
                    }
                }
                ui.set_window_font_scale(1.0);

                let hint_width = ui.calc_text_size(HINT_TEXT)[0];
                center_next_item(ui, avail, hint_width);
                ui.text_colored([1.0, 1.0, 1.0, hint_alpha(time)], HINT_TEXT);
            });
    }
}

fn center_next_item(ui: &Ui, avail: f32, width: f32) {
    let [x, y] = ui.cursor_pos();
    ui.set_cursor_pos([x + ((avail - width) * 0.5).max(0.0), y]);
}

/// Draws `text` glyph by glyph, shading each from the greeting gradient
fn gradient_text(ui: &Ui, origin: [f32; 2], text: &str) {
    let total = ui.calc_text_size(text)[0];
    if total <= 0.0 {
        return;
    }

    let draw_list = ui.get_window_draw_list();
    let mut buf = [0u8; 4];
    let mut x = origin[0];
    for ch in text.chars() {
        let glyph: &str = ch.encode_utf8(&mut buf);
        let width = ui.calc_text_size(glyph)[0];
        let u = (x - origin[0] + width * 0.5) / total;
        draw_list.add_text([x, origin[1]], greeting_gradient(u), glyph);
        x += width;
    }
}

/// Draws one palette swatch as vertical stripes and returns whether it was clicked
fn swatch(ui: &Ui, id: usize, index: PaletteIndex, active: bool) -> bool {
    let _id = ui.push_id_usize(id);
    let clicked = ui.invisible_button("##swatch", [SWATCH_SIZE, SWATCH_SIZE]);
    let hovered = ui.is_item_hovered();
    let [x0, y0] = ui.item_rect_min();
    let [x1, y1] = ui.item_rect_max();

    let draw_list = ui.get_window_draw_list();
    let swatches = index.palette().swatches();
    let stripe = (x1 - x0) / swatches.len() as f32;
    for (k, hex) in swatches.iter().enumerate() {
        let left = x0 + stripe * k as f32;
        draw_list
            .add_rect([left, y0], [left + stripe, y1], swatch_rgba(*hex))
            .filled(true)
            .build();
    }

    if active {
        draw_list
            .add_rect([x0 - 3.0, y0 - 3.0], [x1 + 3.0, y1 + 3.0], [1.0, 1.0, 1.0, 1.0])
            .rounding(4.0)
            .thickness(2.0)
            .build();
    } else if hovered {
        draw_list
            .add_rect([x0 - 2.0, y0 - 2.0], [x1 + 2.0, y1 + 2.0], [1.0, 1.0, 1.0, 0.4])
            .rounding(4.0)
            .build();
    }

    if hovered {
        ui.tooltip_text(index.palette().name);
    }

    clicked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::greeting::MAX_GREETING_CHARS;

    #[test]
    fn test_swatch_rgba() {
        assert_eq!(swatch_rgba(0xff0000), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(swatch_rgba(0x00ff00), [0.0, 1.0, 0.0, 1.0]);
        let gray = swatch_rgba(0x808080);
        assert!((gray[2] - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_greeting_gradient_stops() {
        let close = |a: [f32; 4], b: [f32; 4]| a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-6);
        assert!(close(greeting_gradient(0.0), swatch_rgba(0xff5555)));
        assert!(close(greeting_gradient(0.5), swatch_rgba(0xffcc00)));
        assert!(close(greeting_gradient(1.0), swatch_rgba(0x55ff55)));
        // Out-of-range positions clamp to the ends
        assert!(close(greeting_gradient(-1.0), greeting_gradient(0.0)));
        assert!(close(greeting_gradient(2.0), greeting_gradient(1.0)));

        let quarter = greeting_gradient(0.25);
        let red = swatch_rgba(0xff5555);
        let gold = swatch_rgba(0xffcc00);
        assert!((quarter[1] - (red[1] + gold[1]) * 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_hint_alpha_range() {
        for i in 0..200 {
            let alpha = hint_alpha(i as f32 * 0.05);
            assert!((0.39..=0.81).contains(&alpha));
        }
    }

    #[test]
    fn test_draft_starts_from_settings() {
        let settings = SceneSettings::default();
        let overlay = SceneOverlay::new(&settings);
        assert_eq!(overlay.draft(), &settings);
        assert!(!overlay.editing);
    }

    #[test]
    fn test_commit_greeting_truncates_input() {
        let mut overlay = SceneOverlay::new(&SceneSettings::default());
        overlay.greeting_input = "x".repeat(MAX_GREETING_CHARS + 12);
        overlay.commit_greeting();

        assert_eq!(overlay.draft().greeting.char_count(), MAX_GREETING_CHARS);
        assert_eq!(overlay.greeting_input.chars().count(), MAX_GREETING_CHARS);
    }

    #[test]
    fn test_select_palette_only_changes_palette() {
        let settings = SceneSettings::default();
        let mut overlay = SceneOverlay::new(&settings);
        overlay.select_palette(PaletteIndex::clamped(3));

        assert_eq!(overlay.draft().palette.get(), 3);
        assert_eq!(overlay.draft().greeting, settings.greeting);
    }
}
