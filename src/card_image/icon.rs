//! Icon decoding and cover-fit cropping.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::card_image::RenderError;

/// Decoded straight-alpha RGBA8 bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconBitmap {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl IconBitmap {
    /// `None` for empty dimensions or a buffer of the wrong length.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (width > 0 && height > 0 && rgba.len() == expected).then_some(Self {
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

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

/// Decode a `data:image/...;base64,` URI.
pub fn decode_data_uri(uri: &str) -> Result<IconBitmap, RenderError> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or(RenderError::InvalidDataUri)?;
    let (meta, payload) = rest.split_once(',').ok_or(RenderError::InvalidDataUri)?;
    if !meta.starts_with("image/") || !meta.ends_with(";base64") {
        return Err(RenderError::InvalidDataUri);
    }
    let bytes = STANDARD.decode(payload.trim())?;
    let rgba = image::load_from_memory(&bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    IconBitmap::from_rgba(width, height, rgba.into_raw()).ok_or(RenderError::InvalidDataUri)
}

/// Decode an optional icon, falling back to "no icon" on any failure.
pub fn decode_or_skip(uri: &str) -> Option<IconBitmap> {
    if uri.trim().is_empty() {
        return None;
    }
    match decode_data_uri(uri) {
        Ok(icon) => Some(icon),
        Err(e) => {
            log::warn!("icon could not be decoded, rendering without it: {e}");
            None
        }
    }
}

/// Source region that fills a box without letterboxing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverCrop {
    pub scale: f32,
    pub sx: f32,
    pub sy: f32,
    pub sw: f32,
    pub sh: f32,
}

pub fn cover_crop(img_w: u32, img_h: u32, box_w: f32, box_h: f32) -> CoverCrop {
    let (iw, ih) = (img_w.max(1) as f32, img_h.max(1) as f32);
    let scale = (box_w / iw).max(box_h / ih);
    let sw = box_w / scale;
    let sh = box_h / scale;
    CoverCrop {
        scale,
        sx: ((iw - sw) / 2.0).max(0.0),
        sy: ((ih - sh) / 2.0).max(0.0),
        sw,
        sh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card_image::test_support::png_data_uri;

    #[test]
    fn decodes_png_data_uri() {
        let icon = decode_data_uri(&png_data_uri(3, 2, [10, 20, 30, 255])).unwrap();
        assert_eq!((icon.width(), icon.height()), (3, 2));
        assert_eq!(&icon.rgba()[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn rejects_non_image_uris() {
        assert!(matches!(
            decode_data_uri("https://example.com/a.png"),
            Err(RenderError::InvalidDataUri)
        ));
        assert!(matches!(
            decode_data_uri("data:text/plain;base64,aGk="),
            Err(RenderError::InvalidDataUri)
        ));
        assert!(matches!(
            decode_data_uri("data:image/png;base64,***"),
            Err(RenderError::Base64(_))
        ));
        assert!(matches!(
            decode_data_uri("data:image/png;base64,aGVsbG8="),
            Err(RenderError::Image(_))
        ));
    }

    #[test]
    fn bad_icon_is_skipped() {
        assert!(decode_or_skip("").is_none());
        assert!(decode_or_skip("data:image/png;base64,aGVsbG8=").is_none());
    }

    #[test]
    fn cover_crop_wide_image() {
        // 240x82 into 120x82: height binds, crop the horizontal middle.
        let crop = cover_crop(240, 82, 120.0, 82.0);
        assert_eq!(crop.scale, 1.0);
        assert_eq!((crop.sx, crop.sy, crop.sw, crop.sh), (60.0, 0.0, 120.0, 82.0));
    }

    #[test]
    fn cover_crop_tall_image() {
        // 60x100 into 120x82: width binds at scale 2.
        let crop = cover_crop(60, 100, 120.0, 82.0);
        assert_eq!(crop.scale, 2.0);
        assert_eq!(crop.sw, 60.0);
        assert_eq!(crop.sh, 41.0);
        assert_eq!(crop.sx, 0.0);
        assert_eq!(crop.sy, 29.5);
    }

    #[test]
    fn from_rgba_checks_length() {
        assert!(IconBitmap::from_rgba(2, 2, vec![0; 16]).is_some());
        assert!(IconBitmap::from_rgba(2, 2, vec![0; 15]).is_none());
        assert!(IconBitmap::from_rgba(0, 2, Vec::new()).is_none());
    }
}
