use eframe::egui;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;

use crate::remote::{FetchedImage, ImageFetcher};
use crate::session::SessionOutput;

enum Download {
    Idle,
    Loading(Receiver<anyhow::Result<FetchedImage>>),
    Failed(String),
}

/// Shows the latest description and the synthesized image, downloading the
/// image on a background thread whenever its URL changes.
pub struct OutputPanel {
    fetcher: Arc<ImageFetcher>,
    url: Option<String>,
    download: Download,
    texture: Option<egui::TextureHandle>,
}

impl OutputPanel {
    pub fn new(fetcher: ImageFetcher) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            url: None,
            download: Download::Idle,
            texture: None,
        }
    }

    fn sync_url(&mut self, ctx: &egui::Context, url: Option<&str>) {
        if self.url.as_deref() == url {
            return;
        }
        self.url = url.map(str::to_owned);
        self.texture = None;
        let Some(url) = self.url.clone() else {
            self.download = Download::Idle;
            return;
        };
        let (tx, rx) = channel();
        let fetcher = Arc::clone(&self.fetcher);
        let ctx = ctx.clone();
        let spawned = std::thread::Builder::new()
            .name("image-fetch".into())
            .spawn(move || {
                let _ = tx.send(fetcher.fetch(&url));
                ctx.request_repaint();
            });
        self.download = match spawned {
            Ok(_) => Download::Loading(rx),
            Err(e) => Download::Failed(e.to_string()),
        };
    }

    fn poll_download(&mut self, ctx: &egui::Context) {
        let Download::Loading(rx) = &self.download else {
            return;
        };
        let Ok(result) = rx.try_recv() else {
            return;
        };
        match result {
            Ok(image) => {
                let size = [image.width as usize, image.height as usize];
                self.texture = Some(ctx.load_texture(
                    "ai-image",
                    egui::ColorImage::from_rgba_unmultiplied(size, &image.rgba),
                    egui::TextureOptions::LINEAR,
                ));
                self.download = Download::Idle;
            }
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "failed to download generated image");
                self.download = Download::Failed(format!("{e:#}"));
            }
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, output: &SessionOutput, pending: bool) {
        let ctx = ui.ctx().clone();
        self.sync_url(&ctx, output.image_url.as_deref());
        self.poll_download(&ctx);

        ui.horizontal(|ui| {
            ui.heading(output.description.as_deref().unwrap_or("Waiting for a drawing"));
            if pending {
                ui.spinner();
            }
        });
        ui.label(egui::RichText::new("AI Image").strong().size(18.0));

        if let Some(error) = &output.error {
            ui.colored_label(egui::Color32::RED, error);
        }

        let side = ui.available_width().min(512.0);
        match (&self.download, &self.texture) {
            (Download::Loading(_), _) => {
                ui.spinner();
            }
            (Download::Failed(msg), _) => {
                ui.colored_label(egui::Color32::RED, msg);
            }
            (Download::Idle, Some(tex)) => {
                ui.add(egui::Image::new(tex).fit_to_exact_size(egui::vec2(side, side)));
            }
            (Download::Idle, None) => {}
        }
        if let Some(url) = &self.url {
            ui.hyperlink_to("Open full image", url);
        }
    }
}
