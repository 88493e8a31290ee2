//! Player card export: a fixed 1200×800 PNG rendered from a form snapshot.
//!
//! Rendering is split in two. [`layout::layout_card`] is a pure function of
//! the snapshot that places every rectangle and text run; `paint` then
//! rasterizes that list with tiny-skia. No fonts are loaded from the system
//! and no anti-aliased text is produced, so the same snapshot and icon always
//! give byte-identical output.

pub mod icon;
pub mod layout;
mod paint;
pub mod text;

use thiserror::Error;
use tiny_skia::Pixmap;

use crate::roster::model::PlayerSnapshot;

pub use icon::{IconBitmap, decode_data_uri};
pub use layout::{CANVAS_HEIGHT, CANVAS_WIDTH};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("not an image data URI")]
    InvalidDataUri,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("cannot allocate a {0}x{1} canvas")]
    Canvas(u32, u32),
    #[error("PNG encode failed: {0}")]
    Encode(String),
}

/// A rendered card.
pub struct CardImage {
    pixmap: Pixmap,
}

impl CardImage {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight-alpha RGBA at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }
}

pub fn render_card(
    player: &PlayerSnapshot,
    icon: Option<&IconBitmap>,
) -> Result<CardImage, RenderError> {
    let layout = layout::layout_card(player, icon.is_some());
    let pixmap = paint::paint(&layout, icon)?;
    Ok(CardImage { pixmap })
}

pub fn render_card_png(
    player: &PlayerSnapshot,
    icon: Option<&IconBitmap>,
) -> Result<Vec<u8>, RenderError> {
    render_card(player, icon)?.encode_png()
}

/// Download name: anything outside `[A-Za-z0-9_-. ]` becomes `_`.
pub fn export_file_name(name: &str) -> String {
    let stem = if name.is_empty() { "player" } else { name };
    let safe: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{safe}.png")
}

#[cfg(test)]
pub(crate) mod test_support {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    /// Solid-colour PNG wrapped in a data URI.
    pub(crate) fn png_data_uri(width: u32, height: u32, color: [u8; 4]) -> String {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        format!("data:image/png;base64,{}", STANDARD.encode(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card_image::layout::{Rgb, palette};
    use crate::roster::model::Gender;
    use test_support::png_data_uri;

    fn sample() -> PlayerSnapshot {
        let mut p = PlayerSnapshot {
            name: "Endo".into(),
            position: "GK".into(),
            gender: Gender::Male,
            attribute: "Mountain".into(),
            memo: "Captain.\nKeeps the goal no matter what.".into(),
            ..Default::default()
        };
        p.skills[0] = "God Hand".into();
        p.base_stats.kick = 70;
        p.trained_stats.guard = 12;
        p
    }

    #[test]
    fn canvas_is_fixed_size() {
        let card = render_card(&sample(), None).unwrap();
        assert_eq!((card.width(), card.height()), (1200, 800));
    }

    #[test]
    fn rendering_is_deterministic() {
        let icon = decode_data_uri(&png_data_uri(30, 50, [200, 40, 40, 255])).unwrap();
        let a = render_card_png(&sample(), Some(&icon)).unwrap();
        let b = render_card_png(&sample(), Some(&icon)).unwrap();
        assert_eq!(a, b);
        let c = render_card_png(&sample(), None).unwrap();
        let d = render_card_png(&sample(), None).unwrap();
        assert_eq!(c, d);
        assert_ne!(a, c);
    }

    #[test]
    fn header_and_body_backgrounds() {
        let card = render_card(&sample(), None).unwrap();
        let Rgb(r, g, b) = palette::HEADER;
        assert_eq!(card.pixel(1190, 5), Some([r, g, b, 255]));
        assert_eq!(card.pixel(1190, 300), Some([255, 255, 255, 255]));
    }

    #[test]
    fn icon_fills_slot() {
        let icon = decode_data_uri(&png_data_uri(40, 20, [255, 0, 0, 255])).unwrap();
        let card = render_card(&sample(), Some(&icon)).unwrap();
        // Centre and near the left/right edges of the 120x82 slot at (40, 14).
        for x in [45, 100, 154] {
            let [r, g, b, a] = card.pixel(x, 55).unwrap();
            assert!(r > 250 && g < 5 && b < 5 && a == 255, "({x}, 55)");
        }
    }

    #[test]
    fn placeholder_without_icon() {
        let card = render_card(&sample(), None).unwrap();
        let Rgb(r, g, b) = palette::PLACEHOLDER;
        assert_eq!(card.pixel(100, 20), Some([r, g, b, 255]));
    }

    #[test]
    fn long_memo_does_not_spill_below_its_box() {
        let player = PlayerSnapshot {
            memo: "word ".repeat(400),
            ..sample()
        };
        let layout = layout::layout_card(&player, false);
        let bg = layout.memo.background;
        let card = render_card(&player, None).unwrap();
        let below = bg.bottom().ceil() as u32 + 1;
        for y in below..below + 5 {
            for x in bg.x.ceil() as u32..bg.right().floor() as u32 {
                assert_eq!(card.pixel(x, y), Some([255, 255, 255, 255]), "({x}, {y})");
            }
        }
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(export_file_name("Endo Mamoru"), "Endo Mamoru.png");
        assert_eq!(export_file_name("a/b:c?"), "a_b_c_.png");
        assert_eq!(export_file_name("円堂"), "__.png");
        assert_eq!(export_file_name(""), "player.png");
    }
}
