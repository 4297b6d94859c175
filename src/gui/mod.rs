mod canvas_panel;
mod output_panel;

pub use canvas_panel::CanvasPanel;
pub use output_panel::OutputPanel;

use crate::options::{
    ArtStyle, DrawingTool, GenerationParams, Quality, MAX_STROKE_WIDTH, MIN_STROKE_WIDTH,
};
use crate::remote::ImageFetcher;
use crate::session::GenerationSession;
use crate::settings::Settings;
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Fallback repaint cadence while a worker is running.
const PENDING_REPAINT: Duration = Duration::from_millis(250);

pub struct SketchApp {
    session: GenerationSession,
    canvas: CanvasPanel,
    output: OutputPanel,
    params: GenerationParams,
    toasts: Toasts,
    enable_toasts: bool,
    toast_duration: f32,
    error_toasted: bool,
}

impl SketchApp {
    pub fn new(
        ctx: &egui::Context,
        settings: &Settings,
        mut session: GenerationSession,
        fetcher: ImageFetcher,
    ) -> Self {
        let repaint_ctx = ctx.clone();
        session.set_repaint_hook(Some(Arc::new(move || repaint_ctx.request_repaint())));
        let params = settings.initial_params();
        Self {
            session,
            canvas: CanvasPanel::new(&params),
            output: OutputPanel::new(fetcher),
            params,
            toasts: Toasts::new().anchor(egui::Align2::RIGHT_TOP, [10.0, 10.0]),
            enable_toasts: settings.enable_toasts,
            toast_duration: settings.toast_duration,
            error_toasted: false,
        }
    }

    pub fn add_toast(&mut self, text: impl Into<String>, kind: ToastKind) {
        if !self.enable_toasts {
            return;
        }
        self.toasts.add(Toast {
            text: Into::<String>::into(text).into(),
            kind,
            options: ToastOptions::default().duration_in_seconds(self.toast_duration as f64),
        });
    }

    fn options_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Options");
        ui.separator();

        ui.label("Drawing tool");
        egui::ComboBox::from_id_source("drawing_tool")
            .selected_text(self.params.tool.label())
            .show_ui(ui, |ui| {
                for tool in DrawingTool::ALL {
                    ui.selectable_value(&mut self.params.tool, tool, tool.label());
                }
            });
        if self.params.tool == DrawingTool::Polygon {
            ui.small("Click to add points, double or right click to close.");
        }

        ui.add_space(8.0);
        ui.add(
            egui::Slider::new(
                &mut self.params.stroke_width,
                MIN_STROKE_WIDTH..=MAX_STROKE_WIDTH,
            )
            .text("Stroke width"),
        );

        ui.add_space(8.0);
        ui.label("Image quality");
        for quality in Quality::ALL {
            ui.radio_value(&mut self.params.quality, quality, quality.label());
        }

        ui.add_space(8.0);
        ui.label("Art style");
        egui::ComboBox::from_id_source("art_style")
            .selected_text(self.params.style.label())
            .show_ui(ui, |ui| {
                for style in ArtStyle::ALL {
                    ui.selectable_value(&mut self.params.style, style, style.label());
                }
            });
    }

    fn refresh_session(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        if let Err(e) = self
            .session
            .tick(now, Some(self.canvas.snapshot()), &self.params)
        {
            tracing::error!(error = %format!("{e:#}"), "session tick failed");
            self.add_toast(format!("{e:#}"), ToastKind::Error);
        }

        match self.session.output().error.clone() {
            Some(err) if !self.error_toasted => {
                self.error_toasted = true;
                self.add_toast(err, ToastKind::Error);
            }
            Some(_) => {}
            None => self.error_toasted = false,
        }

        if let Some(wait) = self.session.time_until_trigger(now) {
            ctx.request_repaint_after(wait);
        } else if self.session.is_pending() {
            ctx.request_repaint_after(PENDING_REPAINT);
        }
    }
}

impl eframe::App for SketchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.refresh_session(ctx);

        egui::SidePanel::left("options")
            .resizable(false)
            .default_width(200.0)
            .show(ctx, |ui| self.options_panel(ui));
        self.canvas.apply_params(&self.params);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |cols| {
                cols[0].heading("Draw anything on the canvas below");
                self.canvas.ui(&mut cols[0]);
                self.output
                    .ui(&mut cols[1], self.session.output(), self.session.is_pending());
            });
        });

        self.toasts.show(ctx);
    }
}
