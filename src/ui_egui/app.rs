use std::time::Instant;

use crate::models::settings::Settings;
use crate::services::countdown::{CountdownEngine, CountdownError, TokioScheduler};
use crate::services::redirect::RedirectService;
use crate::utils::date::format_in_zone;

use super::display::{FrameSink, FrameView};

const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(102, 126, 234);
const BOX_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(26, 26, 26, 26);
const BOX_HOVER_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(38, 38, 38, 38);
const MUTED_TEXT: egui::Color32 = egui::Color32::from_rgb(226, 230, 250);
const ACTION_FILL: egui::Color32 = egui::Color32::from_rgb(255, 107, 107);

const TITLE_SIZE: f32 = 32.0;
const NUMBER_SIZE: f32 = 56.0;
const LABEL_SIZE: f32 = 14.0;
const BUTTON_TEXT_SIZE: f32 = 20.0;
const BOX_ROUNDING: f32 = 12.0;

pub const MIN_ROOT_WIDTH: f32 = 480.0;
pub const MIN_ROOT_HEIGHT: f32 = 320.0;

/// Desktop host for a single countdown.
pub struct CountdownApp {
    settings: Settings,
    display: FrameSink,
    redirect: RedirectService,
    /// Target rendered in the configured display zone
    target_local: String,
    hovered: [bool; 4],
    engine: CountdownEngine<TokioScheduler>,
}

impl eframe::App for CountdownApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_update(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!("Closing countdown window");
        self.engine.stop();
    }
}

impl CountdownApp {
    /// Start the engine on `runtime` with sinks that repaint `cc`'s context.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: Settings,
        runtime: tokio::runtime::Handle,
    ) -> Result<Self, CountdownError> {
        let display = FrameSink::new(cc.egui_ctx.clone());

        let engine = CountdownEngine::builder_for(settings.target_instant()?)
            .tick_interval(settings.tick_interval())
            .render_sink(display.clone())
            .action_sink(display.clone())
            .initialize(TokioScheduler::new(runtime))?;

        let target_local = format_in_zone(&engine.target().as_datetime(), settings.display_timezone());
        log::info!("Target date ({}): {}", settings.timezone, target_local);

        Ok(Self {
            redirect: RedirectService::new(settings.redirect_url.clone()),
            settings,
            display,
            target_local,
            hovered: [false; 4],
            engine,
        })
    }

    fn handle_update(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        let view = self.display.lock().frame(now);

        if view.navigate {
            if let Err(err) = self.redirect.open() {
                log::error!("Failed to redirect: {err:?}");
            }
        }

        let mut clicked = false;
        egui::CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(BACKGROUND)
                    .inner_margin(egui::Margin::same(24.0)),
            )
            .show(ctx, |ui| {
                clicked = self.render_body(ui, &view);
            });

        if clicked && self.display.lock().button.click(Instant::now()) {
            ctx.request_repaint();
        }

        if view.animating {
            ctx.request_repaint();
        } else if !self.engine.is_finished() {
            ctx.request_repaint_after(self.engine.tick_interval());
        }
    }

    /// Draw the page; returns true when the action button was clicked.
    fn render_body(&mut self, ui: &mut egui::Ui, view: &FrameView) -> bool {
        let mut clicked = false;

        ui.vertical_centered(|ui| {
            ui.add_space(12.0);
            ui.label(
                egui::RichText::new(&self.settings.title)
                    .size(TITLE_SIZE)
                    .strong()
                    .color(egui::Color32::WHITE),
            );
            ui.label(
                egui::RichText::new(&self.settings.target_readable)
                    .size(16.0)
                    .color(MUTED_TEXT),
            )
            .on_hover_text(self.target_local.as_str());
            ui.add_space(24.0);
        });

        let values = view.formatted.components();
        let labels = &self.settings.timer_labels;
        let mut hovered = self.hovered;

        ui.columns(4, |columns| {
            for (index, column) in columns.iter_mut().enumerate() {
                let scale = if index == 3 { view.seconds_scale } else { 1.0 };
                hovered[index] =
                    countdown_box(column, values[index], &labels[index], scale, hovered[index]);
            }
        });
        self.hovered = hovered;

        if view.button_visible {
            ui.add_space(32.0);
            ui.vertical_centered(|ui| {
                ui.set_opacity(view.button_opacity);
                let text = egui::RichText::new(view.button_label)
                    .size(BUTTON_TEXT_SIZE * view.button_scale)
                    .strong()
                    .color(egui::Color32::WHITE);
                let button = egui::Button::new(text)
                    .fill(ACTION_FILL)
                    .rounding(24.0)
                    .min_size(egui::vec2(180.0 * view.button_scale, 48.0 * view.button_scale));
                let response = ui
                    .add_enabled(view.button_clickable, button)
                    .on_hover_text(self.redirect.url());
                if response.clicked() {
                    clicked = true;
                }
            });
        }

        clicked
    }
}

/// One of the four number boxes. Returns whether the pointer is over it.
fn countdown_box(ui: &mut egui::Ui, value: &str, label: &str, scale: f32, hovered: bool) -> bool {
    let fill = if hovered { BOX_HOVER_FILL } else { BOX_FILL };

    egui::Frame::none()
        .fill(fill)
        .rounding(BOX_ROUNDING)
        .inner_margin(egui::Margin::symmetric(12.0, 16.0))
        .show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new(value)
                        .size(NUMBER_SIZE * scale)
                        .strong()
                        .color(egui::Color32::WHITE),
                );
                ui.label(
                    egui::RichText::new(label)
                        .size(LABEL_SIZE)
                        .color(MUTED_TEXT),
                );
            });
        })
        .response
        .hovered()
}
