use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};

use crate::canvas::model::BACKGROUND_COLOR;

const JPEG_QUALITY: u8 = 90;

/// Snapshot of the canvas contents as height × width × RGBA8 samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl PixelBuffer {
    /// A buffer filled with the canvas background.
    pub fn blank(width: u32, height: u32) -> Self {
        let mut rgba = vec![0; byte_len(width, height)];
        for px in rgba.chunks_exact_mut(4) {
            px.copy_from_slice(&BACKGROUND_COLOR.to_array());
        }
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        let expected = byte_len(width, height);
        if rgba.len() != expected {
            bail!(
                "pixel buffer for {width}x{height} needs {expected} bytes, got {}",
                rgba.len()
            );
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub(crate) fn as_rgba_mut(&mut self) -> &mut [u8] {
        &mut self.rgba
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        let px = self.rgba.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(&self.rgba, self.width, self.height, ColorType::Rgba8)
            .context("encode canvas as png")?;
        Ok(out)
    }

    /// JPEG has no alpha, so samples are flattened onto the background first.
    pub fn encode_jpeg(&self) -> Result<Vec<u8>> {
        let rgb = flatten_to_rgb(&self.rgba);
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
            .write_image(&rgb, self.width, self.height, ColorType::Rgb8)
            .context("encode canvas as jpeg")?;
        Ok(out)
    }

    pub fn png_data_uri(&self) -> Result<String> {
        Ok(data_uri("image/png", &self.encode_png()?))
    }
}

pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", general_purpose::STANDARD.encode(bytes))
}

fn byte_len(width: u32, height: u32) -> usize {
    (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4)
}

fn flatten_to_rgb(rgba: &[u8]) -> Vec<u8> {
    let bg = BACKGROUND_COLOR;
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let a = px[3] as u32;
        for (c, b) in px[..3].iter().zip([bg.r, bg.g, bg.b]) {
            rgb.push(((*c as u32 * a + b as u32 * (255 - a) + 127) / 255) as u8);
        }
    }
    rgb
}
