// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image decoding and fragment rendering, via `image`, `imageproc` and
// `ab_glyph`.
//
// Each fragment gets a hollow rectangle plus its text drawn just above the
// box. Text needs a TrueType font: either an explicit file or the first
// common system font found. Without one only boxes are drawn.

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use lingolens_core::TranslatedFragment;
use lingolens_core::error::{LingolensError, Result};
use tracing::{debug, info, instrument};

/// Outline colour for rendered boxes.
const BOX_COLOUR: Rgb<u8> = Rgb([255, 0, 0]);

/// Colour of the text drawn above each box.
const LABEL_COLOUR: Rgb<u8> = Rgb([0, 0, 255]);

/// Label height in pixels.
pub const DEFAULT_LABEL_SCALE: f32 = 16.0;

/// Gap between the bottom of a label and the top of its box.
const LABEL_GAP: i32 = 10;

const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
    "/System/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

fn system_font() -> Option<FontVec> {
    SYSTEM_FONT_PATHS.iter().find_map(|path| {
        let data = std::fs::read(path).ok()?;
        let font = FontVec::try_from_vec(data).ok()?;
        debug!(path, "label font loaded");
        Some(font)
    })
}

/// Decode an uploaded image (JPEG, PNG, ...).
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn decode_image(data: &[u8]) -> Result<DynamicImage> {
    let img = image::load_from_memory(data)
        .map_err(|err| LingolensError::InputDecode(format!("failed to decode image: {err}")))?;
    debug!(width = img.width(), height = img.height(), "image decoded");
    Ok(img)
}

/// Read and decode an image file.
pub fn load_image(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let data = std::fs::read(path.as_ref())?;
    decode_image(&data)
}

/// Draws fragment boxes and their text onto images.
pub struct Annotator {
    font: Option<FontVec>,
    label_scale: f32,
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("has_font", &self.font.is_some())
            .field("label_scale", &self.label_scale)
            .finish()
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new()
    }
}

impl Annotator {
    /// Labels use the first system font found, if any.
    pub fn new() -> Self {
        Self {
            font: system_font(),
            label_scale: DEFAULT_LABEL_SCALE,
        }
    }

    /// Rectangles only, no text.
    pub fn boxes_only() -> Self {
        Self {
            font: None,
            label_scale: DEFAULT_LABEL_SCALE,
        }
    }

    /// Labels use the TrueType/OpenType font at `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn with_font_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        let font = FontVec::try_from_vec(data).map_err(|err| {
            LingolensError::Config(format!(
                "{} is not a usable font: {err}",
                path.as_ref().display()
            ))
        })?;
        Ok(Self {
            font: Some(font),
            label_scale: DEFAULT_LABEL_SCALE,
        })
    }

    pub fn with_label_scale(mut self, scale: f32) -> Self {
        self.label_scale = scale;
        self
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draw every fragment onto a copy of `image`.
    ///
    /// Boxes are clamped to the image bounds; boxes entirely outside it are
    /// skipped along with their text.
    pub fn annotate(&self, image: &DynamicImage, fragments: &[TranslatedFragment]) -> RgbImage {
        let mut canvas = image.to_rgb8();
        let (width, height) = canvas.dimensions();

        for fragment in fragments {
            let b = &fragment.bbox;
            let x0 = b.x0.min(b.x2).max(0.0);
            let y0 = b.y0.min(b.y2).max(0.0);
            let x2 = b.x0.max(b.x2).min(width as f32);
            let y2 = b.y0.max(b.y2).min(height as f32);
            if x2 - x0 < 1.0 || y2 - y0 < 1.0 {
                continue;
            }
            let rect = Rect::at(x0 as i32, y0 as i32).of_size((x2 - x0) as u32, (y2 - y0) as u32);
            draw_hollow_rect_mut(&mut canvas, rect, BOX_COLOUR);

            if let Some(font) = &self.font {
                let label_y = (y0 as i32 - LABEL_GAP - self.label_scale.ceil() as i32).max(0);
                draw_text_mut(
                    &mut canvas,
                    LABEL_COLOUR,
                    x0 as i32,
                    label_y,
                    PxScale::from(self.label_scale),
                    font,
                    &fragment.original,
                );
            }
        }
        canvas
    }

    /// Render `fragments` onto `image` and write the result to `path`.
    ///
    /// The output format follows the file extension.
    #[instrument(skip(self, image, fragments), fields(path = %path.as_ref().display(), fragments = fragments.len()))]
    pub fn save(
        &self,
        image: &DynamicImage,
        fragments: &[TranslatedFragment],
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let canvas = self.annotate(image, fragments);
        canvas.save(path.as_ref()).map_err(|err| {
            LingolensError::ImageEncode(format!("failed to write {}: {err}", path.as_ref().display()))
        })?;
        info!(labelled = self.has_font(), "annotated image written");
        Ok(())
    }
}
